//! Unit tests for row generation and fixture orchestration.

use chrono::{TimeZone, Utc};
use eadv_synth::dates::{DateFormat, DateInterval, DistributionMode};
use eadv_synth::deps::{AttributeSet, BindingMap};
use eadv_synth::generator::{
    generate_binding_rows, generate_entity_ids, generate_fixture, generate_source_rows,
    GenerationOptions, Value, ValueGenerator,
};
use eadv_synth::rules::{ComputeBranch, Rule, RuleBlock};
use eadv_synth::SeededRandom;

fn options(seed: u64) -> GenerationOptions {
    GenerationOptions {
        interval: DateInterval::new(
            Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
        .unwrap(),
        seed: Some(seed),
        ..Default::default()
    }
}

fn ckd_blocks() -> Vec<RuleBlock> {
    vec![
        RuleBlock::new(
            "ckd",
            vec![
                Rule::fetch("egfr", ["lab_bld_egfr"]),
                Rule::fetch("acr", ["lab_ua_acr"]),
                Rule::fetch("dx", ["icd_n18%"]),
                Rule::compute(
                    "ckd",
                    vec![
                        ComputeBranch::new(Some("egfr < 60"), 1),
                        ComputeBranch::new(None, 0),
                    ],
                ),
            ],
        ),
        RuleBlock::new(
            "ckd_anaemia",
            vec![
                Rule::fetch("hb", ["lab_bld_hb"]),
                Rule::bind("ckd", "ckd", "ckd"),
                Rule::bind("stage", "ckd", "stage"),
            ],
        ),
    ]
}

#[test]
fn test_entity_ids() {
    assert_eq!(generate_entity_ids(3, 2000), vec![2000, 2001, 2002]);
    assert_eq!(generate_entity_ids(1, -5), vec![-5]);
    assert!(generate_entity_ids(0, 2000).is_empty());
}

#[test]
fn test_source_row_count() {
    let attributes: AttributeSet = ["lab_bld_egfr".to_string()].into();
    let opts = GenerationOptions {
        observations_per_entity: 4,
        ..options(1)
    };
    let mut rng = SeededRandom::new(1);
    let rows = generate_source_rows(&attributes, &generate_entity_ids(2, 1001), &opts, &mut rng);
    assert_eq!(rows.len(), 8);
}

#[test]
fn test_source_rows_grouped_by_entity_then_attribute() {
    let attributes: AttributeSet = ["lab_bld_egfr".to_string(), "lab_bld_hb".to_string()].into();
    let opts = options(1);
    let mut rng = SeededRandom::new(1);
    let rows = generate_source_rows(&attributes, &[1, 2], &opts, &mut rng);

    let keys: Vec<(i64, &str)> = rows
        .iter()
        .map(|r| (r.entity_id, r.attribute.as_str()))
        .collect();
    let mut expected = Vec::new();
    for eid in [1i64, 2] {
        for att in ["lab_bld_egfr", "lab_bld_hb"] {
            expected.extend(std::iter::repeat((eid, att)).take(3));
        }
    }
    assert_eq!(keys, expected);

    // each entity/attribute group is most recent first
    for group in rows.chunks(3) {
        assert!(group.windows(2).all(|w| w[0].date >= w[1].date));
    }
}

#[test]
fn test_default_values_in_clinical_range() {
    let attributes: AttributeSet = ["lab_bld_egfr".to_string()].into();
    let mut rng = SeededRandom::new(3);
    let rows = generate_source_rows(&attributes, &[1, 2, 3, 4], &options(3), &mut rng);
    for row in rows {
        let v = row.value.as_i64().unwrap();
        assert!((5..=120).contains(&v));
    }
}

#[test]
fn test_binding_rows() {
    let mut bindings = BindingMap::new();
    bindings.insert(
        "rout_ckd".to_string(),
        ["ckd".to_string(), "stage".to_string()].into(),
    );
    let mut rng = SeededRandom::new(8);
    let tables = generate_binding_rows(&bindings, &generate_entity_ids(3, 1001), &options(8), &mut rng);

    let rows = &tables["rout_ckd"];
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows.iter().map(|r| r.eid).collect::<Vec<_>>(),
        vec![1001, 1002, 1003]
    );
    for row in rows {
        assert!(row.values.contains_key("ckd"));
        assert!(row.values.contains_key("stage"));
    }
}

#[test]
fn test_binding_override() {
    let mut bindings = BindingMap::new();
    bindings.insert("rout_ckd".to_string(), ["stage".to_string()].into());
    let mut opts = options(8);
    opts.binding_generators
        .entry("rout_ckd".to_string())
        .or_default()
        .insert(
            "stage".to_string(),
            ValueGenerator::Choice {
                values: vec![Value::from("3a"), Value::from("3b")],
            },
        );
    let mut rng = SeededRandom::new(8);
    let tables = generate_binding_rows(&bindings, &[1, 2, 3, 4], &opts, &mut rng);
    for row in &tables["rout_ckd"] {
        let stage = row.values["stage"].to_string();
        assert!(stage == "3a" || stage == "3b");
    }
}

#[test]
fn test_fixture_is_deterministic() {
    let blocks = ckd_blocks();
    for mode in [
        DistributionMode::Uniform,
        DistributionMode::RecentWeighted,
        DistributionMode::Clustered,
    ] {
        let opts = GenerationOptions {
            distribution: mode,
            entity_count: 5,
            ..options(2024)
        };
        assert_eq!(generate_fixture(&blocks, &opts), generate_fixture(&blocks, &opts));
    }
}

#[test]
fn test_fixture_metadata() {
    let opts = GenerationOptions {
        entity_count: 4,
        start_entity_id: 500,
        observations_per_entity: 2,
        date_format: DateFormat::Oracle,
        ..options(11)
    };
    let fixture = generate_fixture(&ckd_blocks(), &opts);
    let meta = &fixture.metadata;

    assert_eq!(meta.entity_ids, vec![500, 501, 502, 503]);
    assert_eq!(
        meta.attributes,
        vec!["icd_n18%", "lab_bld_egfr", "lab_bld_hb", "lab_ua_acr"]
    );
    assert_eq!(meta.derived_tables, vec!["rout_ckd"]);
    assert_eq!(meta.total_source_rows, 4 * 4 * 2);
    assert_eq!(fixture.source_rows.len(), meta.total_source_rows);
    assert_eq!(meta.seed, 11);
    assert_eq!(fixture.binding_tables["rout_ckd"].len(), 4);

    // wildcard expanded to one concrete code shared by all entities
    let codes: std::collections::BTreeSet<&str> = fixture
        .source_rows
        .iter()
        .filter(|r| r.att.starts_with("icd_n18"))
        .map(|r| r.att.as_str())
        .collect();
    assert_eq!(codes.len(), 1);
    assert!(!codes.contains("icd_n18%"));

    // oracle dates: DD-MON-YYYY
    assert!(fixture.source_rows.iter().all(|r| r.dt.len() == 11));
}

#[test]
fn test_zero_entities() {
    let opts = GenerationOptions {
        entity_count: 0,
        ..options(1)
    };
    let fixture = generate_fixture(&ckd_blocks(), &opts);
    assert!(fixture.source_rows.is_empty());
    assert!(fixture.binding_tables["rout_ckd"].is_empty());
    assert_eq!(fixture.metadata.total_source_rows, 0);
}

#[test]
fn test_zero_observations() {
    let opts = GenerationOptions {
        entity_count: 3,
        observations_per_entity: 0,
        ..options(1)
    };
    let attributes: AttributeSet = ["lab_bld_egfr".to_string(), "icd_n18%".to_string()].into();
    let mut rng = SeededRandom::new(1);
    assert!(generate_source_rows(&attributes, &[1, 2, 3], &opts, &mut rng).is_empty());

    let fixture = generate_fixture(&ckd_blocks(), &opts);
    assert!(fixture.source_rows.is_empty());
    assert_eq!(fixture.metadata.total_source_rows, 0);
    assert_eq!(fixture.metadata.entity_ids, vec![1001, 1002, 1003]);
    // derived tables still carry one row per entity
    assert_eq!(fixture.binding_tables["rout_ckd"].len(), 3);
}

#[test]
fn test_unseeded_fixture_records_seed() {
    let opts = GenerationOptions {
        seed: None,
        ..options(0)
    };
    let fixture = generate_fixture(&ckd_blocks(), &opts);
    let replay = GenerationOptions {
        seed: Some(fixture.metadata.seed),
        ..options(0)
    };
    assert_eq!(generate_fixture(&ckd_blocks(), &replay), fixture);
}
