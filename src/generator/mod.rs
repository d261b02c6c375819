//! Fixture generation: EADV source rows and `rout_*` binding rows.
//!
//! Draw order is part of the contract. For one fixture the PRNG is consumed
//! by, in order:
//! 1. wildcard expansion of the attribute set (set order)
//! 2. source rows: entity, then attribute, then dates, then one value per date
//! 3. binding rows: table, then entity, then variable

mod config;
pub mod defaults;
pub mod values;

pub use config::FixtureYamlConfig;
pub use values::{Value, ValueGenerator};

use crate::dates::{generate_dates, DateFormat, DateInterval, DistributionMode};
use crate::deps::wildcard::expand_many;
use crate::deps::{extract_dependencies, AttributeSet, BindingMap};
use crate::rng::SeededRandom;
use crate::rules::RuleBlock;
use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Options for one generation run
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    /// Number of simulated patients
    pub entity_count: usize,
    /// First entity id; ids are consecutive
    pub start_entity_id: i64,
    /// Dates drawn per entity per attribute
    pub observations_per_entity: usize,
    /// Interval all observation dates fall in
    pub interval: DateInterval,
    pub date_format: DateFormat,
    pub distribution: DistributionMode,
    /// Per-attribute overrides, keyed by concrete name or wildcard pattern
    pub attribute_generators: BTreeMap<String, ValueGenerator>,
    /// Generator for attributes without an override
    pub default_generator: Option<ValueGenerator>,
    /// Generate `rout_*` binding rows
    pub include_bindings: bool,
    /// Table -> variable -> generator
    pub binding_generators: BTreeMap<String, BTreeMap<String, ValueGenerator>>,
    /// PRNG seed; wall-clock milliseconds when unset
    pub seed: Option<u64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            entity_count: 3,
            start_entity_id: 1001,
            observations_per_entity: 3,
            interval: DateInterval::last_year(Utc::now()),
            date_format: DateFormat::default(),
            distribution: DistributionMode::default(),
            attribute_generators: BTreeMap::new(),
            default_generator: None,
            include_bindings: true,
            binding_generators: BTreeMap::new(),
            seed: None,
        }
    }
}

impl GenerationOptions {
    /// Validate the entity id range and every configured generator
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.last_entity_id().is_none() {
            anyhow::bail!(
                "{} entities starting at id {} overflow the entity id range",
                self.entity_count,
                self.start_entity_id
            );
        }
        for (attribute, gen) in &self.attribute_generators {
            gen.validate()
                .map_err(|e| anyhow::anyhow!("attribute '{}': {}", attribute, e))?;
        }
        if let Some(ref gen) = self.default_generator {
            gen.validate()
                .map_err(|e| anyhow::anyhow!("default generator: {}", e))?;
        }
        for (table, vars) in &self.binding_generators {
            for (var, gen) in vars {
                gen.validate()
                    .map_err(|e| anyhow::anyhow!("binding '{}.{}': {}", table, var, e))?;
            }
        }
        Ok(())
    }

    /// Generator for a concrete attribute expanded from `pattern`.
    ///
    /// Override for the concrete name, then for the pattern, then the
    /// configured default, then the clinical default table.
    pub fn value_generator(&self, attribute: &str, pattern: &str) -> Cow<'_, ValueGenerator> {
        if let Some(gen) = self
            .attribute_generators
            .get(attribute)
            .or_else(|| self.attribute_generators.get(pattern))
            .or(self.default_generator.as_ref())
        {
            return Cow::Borrowed(gen);
        }
        Cow::Owned(defaults::clinical_default(attribute))
    }

    /// Id of the last entity; `None` when the range passes `i64::MAX`
    fn last_entity_id(&self) -> Option<i64> {
        let offset = i64::try_from(self.entity_count.saturating_sub(1)).ok()?;
        self.start_entity_id.checked_add(offset)
    }

    fn binding_generator(&self, table: &str, variable: &str) -> Option<&ValueGenerator> {
        self.binding_generators
            .get(table)
            .and_then(|vars| vars.get(variable))
    }

    /// The configured seed, or the current time in milliseconds
    pub fn resolve_seed(&self) -> u64 {
        self.seed
            .unwrap_or_else(|| Utc::now().timestamp_millis().unsigned_abs())
    }
}

/// One observation: entity, attribute, date, value
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub entity_id: i64,
    pub attribute: String,
    pub date: DateTime<Utc>,
    pub value: Value,
}

/// Column holding the entity id in every derived table
pub const ENTITY_ID_COLUMN: &str = "eid";

/// Column a bound variable named `eid` is written to
pub const RENAMED_EID_COLUMN: &str = "eid_var";

/// One entity's row in a derived table
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct BindingRow {
    pub eid: i64,
    /// One field per bound variable. A variable named `eid` is stored
    /// under [`RENAMED_EID_COLUMN`].
    #[serde(flatten)]
    pub values: BTreeMap<String, Value>,
}

/// Consecutive entity ids starting at `start_id`.
///
/// Stops at `i64::MAX`; [`GenerationOptions::validate`] rejects ranges
/// that would be cut short.
pub fn generate_entity_ids(count: usize, start_id: i64) -> Vec<i64> {
    (0..count)
        .map_while(|i| i64::try_from(i).ok().and_then(|i| start_id.checked_add(i)))
        .collect()
}

/// Pre-sized row count, or zero when the product overflows
fn row_capacity(entities: usize, columns: usize, observations: usize) -> usize {
    entities
        .checked_mul(columns)
        .and_then(|n| n.checked_mul(observations))
        .unwrap_or(0)
}

fn binding_column(variable: &str) -> String {
    if variable == ENTITY_ID_COLUMN {
        RENAMED_EID_COLUMN.to_string()
    } else {
        variable.to_string()
    }
}

/// Source rows for every entity and attribute.
///
/// Wildcards are expanded once, before the entity loop, so every entity
/// shares the same concrete attribute columns.
pub fn generate_source_rows(
    attributes: &AttributeSet,
    entities: &[i64],
    options: &GenerationOptions,
    rng: &mut SeededRandom,
) -> Vec<ObservationRow> {
    source_rows_with_progress(attributes, entities, options, rng, &mut |_| {})
}

fn source_rows_with_progress(
    attributes: &AttributeSet,
    entities: &[i64],
    options: &GenerationOptions,
    rng: &mut SeededRandom,
    on_entity: &mut dyn FnMut(usize),
) -> Vec<ObservationRow> {
    let concrete = expand_many(attributes, rng);
    let columns: Vec<(&str, &str)> = concrete
        .iter()
        .zip(attributes)
        .map(|(name, pattern)| (name.as_str(), pattern.as_str()))
        .collect();

    let mut rows = Vec::with_capacity(row_capacity(
        entities.len(),
        columns.len(),
        options.observations_per_entity,
    ));

    for (done, &entity_id) in entities.iter().enumerate() {
        for &(attribute, pattern) in &columns {
            let dates = generate_dates(
                options.observations_per_entity,
                &options.interval,
                rng,
                options.distribution,
            );
            let gen = options.value_generator(attribute, pattern);
            for date in dates {
                rows.push(ObservationRow {
                    entity_id,
                    attribute: attribute.to_string(),
                    date,
                    value: gen.generate(rng),
                });
            }
        }
        on_entity(done + 1);
    }

    rows
}

/// One row per entity per derived table, with every bound variable
pub fn generate_binding_rows(
    bindings: &BindingMap,
    entities: &[i64],
    options: &GenerationOptions,
    rng: &mut SeededRandom,
) -> BTreeMap<String, Vec<BindingRow>> {
    bindings
        .iter()
        .map(|(table, variables)| {
            let rows = entities
                .iter()
                .map(|&eid| {
                    let values = variables
                        .iter()
                        .map(|var| {
                            let value = match options.binding_generator(table, var) {
                                Some(gen) => gen.generate(rng),
                                None => Value::Int(rng.binary()),
                            };
                            (binding_column(var), value)
                        })
                        .collect();
                    BindingRow { eid, values }
                })
                .collect();
            (table.clone(), rows)
        })
        .collect()
}

/// A source row with its date rendered in the configured format
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct SourceRecord {
    pub eid: i64,
    pub att: String,
    pub dt: String,
    pub val: Value,
}

/// Summary of what a fixture contains
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct FixtureMetadata {
    pub entity_ids: Vec<i64>,
    /// Attributes as declared by fetch rules (wildcards unexpanded)
    pub attributes: Vec<String>,
    pub derived_tables: Vec<String>,
    pub total_source_rows: usize,
    /// Seed that reproduces this fixture
    pub seed: u64,
    pub date_format: DateFormat,
}

/// Complete generated fixture
#[derive(Debug, Clone, PartialEq, Serialize, JsonSchema)]
pub struct GeneratedFixture {
    pub source_rows: Vec<SourceRecord>,
    pub binding_tables: BTreeMap<String, Vec<BindingRow>>,
    pub metadata: FixtureMetadata,
}

/// Generate a fixture for the given rule blocks
pub fn generate_fixture(blocks: &[RuleBlock], options: &GenerationOptions) -> GeneratedFixture {
    generate_fixture_with_progress(blocks, options, |_, _| {})
}

/// Like [`generate_fixture`], calling `progress(done, total)` after each
/// entity's source rows. Progress reporting does not affect draws.
pub fn generate_fixture_with_progress<F>(
    blocks: &[RuleBlock],
    options: &GenerationOptions,
    mut progress: F,
) -> GeneratedFixture
where
    F: FnMut(usize, usize),
{
    let seed = options.resolve_seed();
    if options.seed.is_none() {
        tracing::info!(seed, "no seed configured, using wall-clock seed");
    }
    let mut rng = SeededRandom::new(seed);

    let deps = extract_dependencies(blocks);
    let entity_ids = generate_entity_ids(options.entity_count, options.start_entity_id);

    let total = entity_ids.len();
    let observations = source_rows_with_progress(
        &deps.attributes,
        &entity_ids,
        options,
        &mut rng,
        &mut |done| progress(done, total),
    );

    let binding_tables = if options.include_bindings {
        generate_binding_rows(&deps.bindings, &entity_ids, options, &mut rng)
    } else {
        BTreeMap::new()
    };

    let source_rows: Vec<SourceRecord> = observations
        .into_iter()
        .map(|row| SourceRecord {
            eid: row.entity_id,
            att: row.attribute,
            dt: options.date_format.format(&row.date),
            val: row.value,
        })
        .collect();

    tracing::debug!(
        seed,
        entities = entity_ids.len(),
        source_rows = source_rows.len(),
        derived_tables = binding_tables.len(),
        distribution = %options.distribution,
        "generated fixture"
    );

    GeneratedFixture {
        metadata: FixtureMetadata {
            attributes: deps.attributes.into_iter().collect(),
            derived_tables: binding_tables.keys().cloned().collect(),
            total_source_rows: source_rows.len(),
            entity_ids,
            seed,
            date_format: options.date_format,
        },
        source_rows,
        binding_tables,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::Rule;
    use chrono::TimeZone;

    fn options() -> GenerationOptions {
        GenerationOptions {
            interval: DateInterval::new(
                Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            )
            .unwrap(),
            seed: Some(42),
            ..Default::default()
        }
    }

    #[test]
    fn test_entity_ids() {
        assert_eq!(generate_entity_ids(3, 2000), vec![2000, 2001, 2002]);
        assert!(generate_entity_ids(0, 1).is_empty());
    }

    #[test]
    fn test_entity_ids_stop_at_max() {
        assert_eq!(generate_entity_ids(2, i64::MAX), vec![i64::MAX]);
        assert_eq!(generate_entity_ids(2, i64::MAX - 1), vec![i64::MAX - 1, i64::MAX]);
    }

    #[test]
    fn test_validate_rejects_entity_id_overflow() {
        let opts = GenerationOptions {
            entity_count: 2,
            start_entity_id: i64::MAX,
            ..options()
        };
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("overflow the entity id range"));

        let fits = GenerationOptions {
            entity_count: 2,
            start_entity_id: i64::MAX - 1,
            ..options()
        };
        assert!(fits.validate().is_ok());

        let empty = GenerationOptions {
            entity_count: 0,
            start_entity_id: i64::MAX,
            ..options()
        };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_row_capacity_overflow() {
        assert_eq!(row_capacity(2, 3, 4), 24);
        assert_eq!(row_capacity(2, 1, usize::MAX), 0);
        assert_eq!(row_capacity(usize::MAX, 2, 1), 0);
    }

    #[test]
    fn test_binding_variable_named_eid_renamed() {
        let mut bindings = BindingMap::new();
        bindings.insert(
            "rout_ckd".to_string(),
            ["eid".to_string(), "ckd".to_string()].into(),
        );
        let mut rng = SeededRandom::new(1);
        let tables = generate_binding_rows(&bindings, &[7], &options(), &mut rng);
        let row = &tables["rout_ckd"][0];
        assert_eq!(row.eid, 7);
        assert!(row.values.contains_key(RENAMED_EID_COLUMN));
        assert!(!row.values.contains_key("eid"));

        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["eid"], 7);
        assert_eq!(json.as_object().unwrap().len(), 3);
    }

    #[test]
    fn test_source_row_count() {
        let attributes: AttributeSet = ["lab_bld_egfr".to_string()].into();
        let opts = GenerationOptions {
            observations_per_entity: 4,
            ..options()
        };
        let mut rng = SeededRandom::new(1);
        let rows = generate_source_rows(&attributes, &[1, 2], &opts, &mut rng);
        assert_eq!(rows.len(), 8);
        assert!(rows.iter().all(|r| r.attribute == "lab_bld_egfr"));
    }

    #[test]
    fn test_wildcard_expanded_once_per_call() {
        let attributes: AttributeSet = ["icd_n18%".to_string()].into();
        let mut rng = SeededRandom::new(5);
        let rows = generate_source_rows(&attributes, &[1, 2, 3], &options(), &mut rng);
        let first = &rows[0].attribute;
        assert!(first.starts_with("icd_n18"));
        assert!(rows.iter().all(|r| &r.attribute == first));
    }

    #[test]
    fn test_pattern_override_applies_to_expansion() {
        let attributes: AttributeSet = ["lab_%".to_string()].into();
        let mut opts = options();
        opts.attribute_generators.insert(
            "lab_%".to_string(),
            ValueGenerator::Constant {
                value: Value::from("x"),
            },
        );
        let mut rng = SeededRandom::new(5);
        let rows = generate_source_rows(&attributes, &[1], &opts, &mut rng);
        assert!(rows.iter().all(|r| r.value == Value::from("x")));
    }

    #[test]
    fn test_value_generator_resolution_order() {
        let mut opts = options();
        assert_eq!(
            opts.value_generator("lab_bld_egfr", "lab_bld_egfr").into_owned(),
            ValueGenerator::Int { min: 5, max: 120 }
        );

        opts.default_generator = Some(ValueGenerator::Binary);
        assert_eq!(
            *opts.value_generator("lab_bld_egfr", "lab_bld_egfr"),
            ValueGenerator::Binary
        );

        opts.attribute_generators
            .insert("lab_bld_egfr".to_string(), ValueGenerator::Int { min: 1, max: 1 });
        assert_eq!(
            *opts.value_generator("lab_bld_egfr", "lab_bld_egfr"),
            ValueGenerator::Int { min: 1, max: 1 }
        );
    }

    #[test]
    fn test_binding_rows_have_every_variable() {
        let mut bindings = BindingMap::new();
        bindings.insert(
            "rout_ckd".to_string(),
            ["ckd".to_string(), "stage".to_string()].into(),
        );
        let mut rng = SeededRandom::new(1);
        let tables = generate_binding_rows(&bindings, &[1, 2, 3], &options(), &mut rng);
        let rows = &tables["rout_ckd"];
        assert_eq!(rows.len(), 3);
        for row in rows {
            assert_eq!(row.values.len(), 2);
            for value in row.values.values() {
                assert!(matches!(value, Value::Int(0) | Value::Int(1)));
            }
        }
    }

    #[test]
    fn test_fixture_without_bindings() {
        let blocks = vec![RuleBlock::new(
            "cx",
            vec![
                Rule::fetch("egfr", ["lab_bld_egfr"]),
                Rule::bind("ckd", "ckd", "ckd"),
            ],
        )];
        let opts = GenerationOptions {
            include_bindings: false,
            ..options()
        };
        let fixture = generate_fixture(&blocks, &opts);
        assert!(fixture.binding_tables.is_empty());
        assert!(fixture.metadata.derived_tables.is_empty());
        assert_eq!(fixture.metadata.total_source_rows, 9);
        assert_eq!(fixture.metadata.seed, 42);
    }

    #[test]
    fn test_progress_reports_each_entity() {
        let blocks = vec![RuleBlock::new("a", vec![Rule::fetch("x", ["lab_bld_hb"])])];
        let mut calls = Vec::new();
        let with_progress =
            generate_fixture_with_progress(&blocks, &options(), |done, total| {
                calls.push((done, total))
            });
        assert_eq!(calls, vec![(1, 3), (2, 3), (3, 3)]);
        assert_eq!(with_progress, generate_fixture(&blocks, &options()));
    }
}
