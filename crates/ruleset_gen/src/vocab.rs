//! Clinical vocabulary for generated rule blocks.
//!
//! Attribute names follow the EADV `<source>_<specimen>_<analyte>` naming.

use rand::Rng;

/// Concrete attributes fetch rules may read
const ATTRIBUTES: &[&str] = &[
    "lab_bld_egfr",
    "lab_bld_egfr_c",
    "lab_bld_creatinine",
    "lab_bld_potassium",
    "lab_bld_sodium",
    "lab_bld_bicarbonate",
    "lab_bld_calcium",
    "lab_bld_phosphate",
    "lab_bld_pth",
    "lab_bld_albumin",
    "lab_bld_hb",
    "lab_bld_hba1c",
    "lab_bld_ferritin",
    "lab_bld_tsat",
    "lab_ua_acr",
    "lab_ua_pcr",
    "lab_ua_rbc",
    "lab_ua_poc_rbc",
    "obs_bp_sys",
    "obs_bp_dia",
    "obs_weight",
    "obs_bmi",
    "rxnc_c09aa",
    "rxnc_c10aa",
    "mbs_13100",
];

/// Wildcard patterns over code families
const WILDCARD_PATTERNS: &[&str] = &[
    "icd_n18%",
    "icd_e11%",
    "icd_i10%",
    "icd_i50%",
    "icpc_u99%",
    "icpc_t90%",
    "rxnc_a10*",
    "lab_bld_egfr%",
];

/// Rule block topics
const BLOCK_TOPICS: &[&str] = &[
    "ckd",
    "dm",
    "htn",
    "cvd",
    "anaemia",
    "ckd_mbd",
    "acidosis",
    "hyperkalaemia",
    "ckd_stage",
    "ckd_complications",
    "dm_control",
    "bp_control",
    "lipids",
    "obesity",
    "referral",
];

/// Aggregation functions on fetch rules
const FUNCTIONS: &[&str] = &["last", "first", "max", "min", "count", "avg"];

/// Properties read by fetch rules
const PROPERTIES: &[&str] = &["val", "dt"];

/// Deterministic picks from the clinical vocabulary
pub struct Vocabulary<R: Rng> {
    rng: R,
}

impl<R: Rng> Vocabulary<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    fn pick(&mut self, items: &'static [&'static str]) -> &'static str {
        items[self.rng.random_range(0..items.len())]
    }

    pub fn attribute(&mut self) -> &'static str {
        self.pick(ATTRIBUTES)
    }

    pub fn wildcard_pattern(&mut self) -> &'static str {
        self.pick(WILDCARD_PATTERNS)
    }

    pub fn function(&mut self) -> &'static str {
        self.pick(FUNCTIONS)
    }

    pub fn property(&mut self) -> &'static str {
        self.pick(PROPERTIES)
    }

    /// Block name for index `i`; unique per index
    pub fn block_name(&self, i: usize) -> String {
        let topic = BLOCK_TOPICS[i % BLOCK_TOPICS.len()];
        match i / BLOCK_TOPICS.len() {
            0 => topic.to_string(),
            round => format!("{}_{}", topic, round),
        }
    }

    /// Attribute list for one fetch rule, occasionally with a wildcard
    pub fn attribute_list(&mut self, max_len: usize) -> Vec<String> {
        let len = self.rng.random_range(1..=max_len.max(1));
        (0..len)
            .map(|_| {
                if self.rng.random_bool(0.2) {
                    self.wildcard_pattern().to_string()
                } else {
                    self.attribute().to_string()
                }
            })
            .collect()
    }

    /// Threshold for a compute predicate
    pub fn threshold(&mut self) -> i64 {
        self.rng.random_range(1..=120)
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p)
    }

    pub fn index(&mut self, len: usize) -> usize {
        self.rng.random_range(0..len)
    }
}
