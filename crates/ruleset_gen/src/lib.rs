//! Rule-block generator for eadv-synth integration tests.
//!
//! Generates deterministic compiled rule blocks (fetch, bind and compute
//! rules over a clinical vocabulary) and renders them as the YAML or JSON
//! documents the rule compiler emits.
//!
//! # Example
//!
//! ```rust
//! use ruleset_gen::{RenderConfig, Renderer, RulesetGenerator, Scale};
//!
//! let ruleset = RulesetGenerator::new(42, Scale::Small).generate();
//! let yaml = Renderer::new(RenderConfig::yaml())
//!     .render_to_string(&ruleset)
//!     .unwrap();
//!
//! println!("{}", yaml);
//! ```

pub mod generator;
pub mod render;
pub mod vocab;

pub use generator::{BlockSpec, ConditionSpec, RuleSpec, Ruleset, RulesetGenerator, Scale};
pub use render::{Format, RenderConfig, Renderer};
