//! Default value ranges per clinical attribute family.
//!
//! Attribute names follow the `<source>_<specimen>_<analyte>` convention
//! (`lab_bld_egfr`, `lab_ua_acr`, `obs_bp_sys`, `icd_n18_3`, ...). The
//! longest matching prefix wins, so `lab_bld_hba1c` is not read as
//! haemoglobin.

use super::values::{Value, ValueGenerator};

#[derive(Debug, Clone, Copy)]
enum Range {
    Int(i64, i64),
    Float(f64, f64, u32),
    /// Presence marker, always 1 (diagnosis and billing codes)
    Flag,
}

impl Range {
    fn to_generator(self) -> ValueGenerator {
        match self {
            Range::Int(min, max) => ValueGenerator::Int { min, max },
            Range::Float(min, max, decimals) => ValueGenerator::Float { min, max, decimals },
            Range::Flag => ValueGenerator::Constant {
                value: Value::Int(1),
            },
        }
    }
}

const CLINICAL_RANGES: &[(&str, Range)] = &[
    // Blood chemistry
    ("lab_bld_egfr", Range::Int(5, 120)),
    ("lab_bld_creatinine", Range::Int(40, 900)),
    ("lab_bld_urea", Range::Float(2.0, 40.0, 1)),
    ("lab_bld_potassium", Range::Float(3.0, 6.5, 1)),
    ("lab_bld_sodium", Range::Int(125, 150)),
    ("lab_bld_bicarbonate", Range::Int(12, 32)),
    ("lab_bld_calcium", Range::Float(1.8, 2.8, 2)),
    ("lab_bld_phosphate", Range::Float(0.5, 2.5, 2)),
    ("lab_bld_pth", Range::Float(1.0, 80.0, 1)),
    ("lab_bld_albumin", Range::Int(20, 50)),
    ("lab_bld_glucose", Range::Float(3.0, 20.0, 1)),
    ("lab_bld_cholesterol", Range::Float(2.5, 8.0, 1)),
    // Haematology
    ("lab_bld_hb", Range::Int(70, 180)),
    ("lab_bld_hba1c", Range::Int(30, 130)),
    ("lab_bld_ferritin", Range::Int(10, 1000)),
    ("lab_bld_tsat", Range::Int(5, 60)),
    ("lab_bld_platelets", Range::Int(50, 450)),
    // Urinalysis
    ("lab_ua_acr", Range::Float(0.1, 300.0, 1)),
    ("lab_ua_pcr", Range::Int(5, 500)),
    ("lab_ua_rbc", Range::Int(0, 500)),
    ("lab_ua_poc_rbc", Range::Int(0, 4)),
    ("lab_ua_leucocytes", Range::Int(0, 4)),
    // Observations
    ("obs_bp_sys", Range::Int(90, 200)),
    ("obs_bp_dia", Range::Int(50, 120)),
    ("obs_weight", Range::Float(40.0, 150.0, 1)),
    ("obs_height", Range::Int(140, 200)),
    ("obs_bmi", Range::Float(16.0, 45.0, 1)),
    // Coded events
    ("icd_", Range::Flag),
    ("icpc_", Range::Flag),
    ("mbs_", Range::Flag),
    ("rxnc_", Range::Int(1, 3)),
];

/// Used when no prefix matches
const FALLBACK: Range = Range::Int(1, 100);

/// Default generator for an attribute
pub fn clinical_default(attribute: &str) -> ValueGenerator {
    let attribute = attribute.to_ascii_lowercase();
    CLINICAL_RANGES
        .iter()
        .filter(|(prefix, _)| attribute.starts_with(prefix))
        .max_by_key(|(prefix, _)| prefix.len())
        .map(|(_, range)| *range)
        .unwrap_or(FALLBACK)
        .to_generator()
}
