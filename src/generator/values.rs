//! Observation values and the generators that produce them.

use crate::rng::SeededRandom;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A generated cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

fn default_decimals() -> u32 {
    1
}

/// Configurable value producer.
///
/// `constant` consumes no draws, every other kind exactly one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueGenerator {
    /// Uniform integer in `[min, max]`
    Int { min: i64, max: i64 },
    /// Uniform float in `[min, max)` rounded to `decimals` places
    Float {
        min: f64,
        max: f64,
        #[serde(default = "default_decimals")]
        decimals: u32,
    },
    /// One of a fixed list
    Choice { values: Vec<Value> },
    /// Always the same value
    Constant { value: Value },
    /// `1` or `0` with equal probability
    Binary,
}

impl ValueGenerator {
    /// Produce one value, drawing from `rng`
    pub fn generate(&self, rng: &mut SeededRandom) -> Value {
        match self {
            ValueGenerator::Int { min, max } => Value::Int(rng.int_range(*min, *max)),
            ValueGenerator::Float { min, max, decimals } => {
                Value::Float(rng.float_range(*min, *max, *decimals))
            }
            ValueGenerator::Choice { values } => rng.pick(values).cloned().unwrap_or(Value::Null),
            ValueGenerator::Constant { value } => value.clone(),
            ValueGenerator::Binary => Value::Int(rng.binary()),
        }
    }

    /// Validate the generator configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        match self {
            ValueGenerator::Int { min, max } => {
                if min > max {
                    anyhow::bail!("int generator has min {} greater than max {}", min, max);
                }
                Ok(())
            }
            ValueGenerator::Float { min, max, .. } => {
                if !(min.is_finite() && max.is_finite()) {
                    anyhow::bail!("float generator bounds must be finite");
                }
                if min > max {
                    anyhow::bail!("float generator has min {} greater than max {}", min, max);
                }
                Ok(())
            }
            ValueGenerator::Choice { values } => {
                if values.is_empty() {
                    anyhow::bail!("choice generator requires at least one value");
                }
                Ok(())
            }
            ValueGenerator::Constant { .. } => Ok(()),
            ValueGenerator::Binary => Ok(()),
        }
    }

    /// Short kind name, as used in config files
    pub fn kind(&self) -> &'static str {
        match self {
            ValueGenerator::Int { .. } => "int",
            ValueGenerator::Float { .. } => "float",
            ValueGenerator::Choice { .. } => "choice",
            ValueGenerator::Constant { .. } => "constant",
            ValueGenerator::Binary => "binary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_generator_known_seed() {
        let mut rng = SeededRandom::new(42);
        let value = ValueGenerator::Int { min: 1, max: 10 }.generate(&mut rng);
        assert_eq!(value, Value::Int(6));
    }

    #[test]
    fn test_float_generator_rounds() {
        let mut rng = SeededRandom::new(42);
        let gen = ValueGenerator::Float {
            min: 3.0,
            max: 6.5,
            decimals: 1,
        };
        assert_eq!(gen.generate(&mut rng), Value::Float(5.0));
    }

    #[test]
    fn test_constant_draws_nothing() {
        let mut rng = SeededRandom::new(8);
        let gen = ValueGenerator::Constant {
            value: Value::from("positive"),
        };
        assert_eq!(gen.generate(&mut rng), Value::Text("positive".to_string()));
        assert_eq!(rng, SeededRandom::new(8));
    }

    #[test]
    fn test_choice_picks_from_list() {
        let mut rng = SeededRandom::new(8);
        let values = vec![Value::from("a"), Value::from("b"), Value::from("c")];
        let gen = ValueGenerator::Choice {
            values: values.clone(),
        };
        for _ in 0..50 {
            assert!(values.contains(&gen.generate(&mut rng)));
        }
    }

    #[test]
    fn test_validate() {
        assert!(ValueGenerator::Int { min: 5, max: 1 }.validate().is_err());
        let full = ValueGenerator::Int {
            min: 0,
            max: i64::MAX,
        };
        assert!(full.validate().is_ok());
        assert!(full.generate(&mut SeededRandom::new(1)).as_i64().is_some());
        assert!(ValueGenerator::Choice { values: vec![] }.validate().is_err());
        assert!(ValueGenerator::Float {
            min: 0.0,
            max: f64::NAN,
            decimals: 1
        }
        .validate()
        .is_err());
        assert!(ValueGenerator::Binary.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml_generators() {
        let yaml = r#"
- type: int
  min: 5
  max: 120
- type: float
  min: 3.0
  max: 6.5
- type: choice
  values: [neg, trace, "+", "++"]
- type: constant
  value: 1
- type: binary
"#;
        let gens: Vec<ValueGenerator> = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(gens[0], ValueGenerator::Int { min: 5, max: 120 });
        assert_eq!(
            gens[1],
            ValueGenerator::Float {
                min: 3.0,
                max: 6.5,
                decimals: 1
            }
        );
        assert_eq!(gens[2].kind(), "choice");
        assert_eq!(
            gens[3],
            ValueGenerator::Constant {
                value: Value::Int(1)
            }
        );
        assert_eq!(gens[4], ValueGenerator::Binary);
    }
}
