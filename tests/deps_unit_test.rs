//! Unit tests for dependency extraction and wildcard expansion.

use eadv_synth::deps::wildcard::{expand_many, expand_one, is_wildcard};
use eadv_synth::deps::{derived_table_name, extract_dependencies};
use eadv_synth::rules::{ComputeBranch, Rule, RuleBlock};
use eadv_synth::SeededRandom;

fn ckd_blocks() -> Vec<RuleBlock> {
    vec![RuleBlock::new(
        "ckd_cx",
        vec![
            Rule::fetch("egfr", ["lab_bld_egfr", "lab_bld_creatinine"]),
            Rule::bind("ckd", "ckd", "ckd"),
            Rule::compute(
                "flag",
                vec![
                    ComputeBranch::new(Some("egfr < 60 and ckd = 1"), 1),
                    ComputeBranch::new(None, 0),
                ],
            ),
        ],
    )]
}

#[test]
fn test_extraction_scenario() {
    let deps = extract_dependencies(&ckd_blocks());

    assert_eq!(
        deps.attributes.iter().map(String::as_str).collect::<Vec<_>>(),
        vec!["lab_bld_creatinine", "lab_bld_egfr"]
    );
    assert_eq!(deps.bindings.len(), 1);
    assert_eq!(
        deps.bindings["rout_ckd"]
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>(),
        vec!["ckd"]
    );
}

#[test]
fn test_empty_input() {
    let deps = extract_dependencies(&[]);
    assert!(deps.is_empty());
}

#[test]
fn test_block_order_does_not_matter() {
    let mut blocks = ckd_blocks();
    blocks.push(RuleBlock::new(
        "anaemia",
        vec![
            Rule::fetch("hb", ["lab_bld_hb"]),
            Rule::bind("stage", "ckd", "stage"),
        ],
    ));
    let forward = extract_dependencies(&blocks);
    blocks.reverse();
    assert_eq!(forward, extract_dependencies(&blocks));
}

#[test]
fn test_derived_table_name() {
    assert_eq!(derived_table_name("dm"), "rout_dm");
}

#[test]
fn test_is_wildcard() {
    assert!(is_wildcard("lab_%"));
    assert!(is_wildcard("lab_*"));
    assert!(!is_wildcard("lab_bld_egfr"));
}

#[test]
fn test_expanding_twice_differs() {
    let mut rng = SeededRandom::new(42);
    let first = expand_one("lab_%", &mut rng);
    let second = expand_one("lab_%", &mut rng);
    assert_eq!(first, "lab_pn");
    assert_eq!(second, "lab_mu");
    assert_ne!(first, second);
}

#[test]
fn test_expand_many_keeps_length_and_concrete_names() {
    let names = vec![
        "icd_n18%".to_string(),
        "lab_bld_egfr".to_string(),
        "icd_n18%".to_string(),
    ];
    let mut rng = SeededRandom::new(9);
    let expanded = expand_many(&names, &mut rng);

    assert_eq!(expanded.len(), 3);
    assert_eq!(expanded[1], "lab_bld_egfr");
    for name in [&expanded[0], &expanded[2]] {
        assert!(name.starts_with("icd_n18"));
        assert_eq!(name.len(), "icd_n18".len() + 2);
        assert!(!is_wildcard(name));
    }
}

#[test]
#[allow(deprecated)]
fn test_filter_concrete_drops_wildcards() {
    use eadv_synth::deps::wildcard::filter_concrete;

    let names = vec!["icd_n18%".to_string(), "lab_bld_hb".to_string()];
    assert_eq!(filter_concrete(&names), vec!["lab_bld_hb".to_string()]);
}
