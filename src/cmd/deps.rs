//! Deps command CLI handler.

use eadv_synth::deps::extract_dependencies;
use eadv_synth::rules::load_rule_blocks;
use std::path::PathBuf;

pub fn run(rules: PathBuf, json: bool) -> anyhow::Result<()> {
    let blocks = load_rule_blocks(&rules)?;
    let deps = extract_dependencies(&blocks);

    if json {
        println!("{}", serde_json::to_string_pretty(&deps)?);
        return Ok(());
    }

    println!("Rule blocks: {}", blocks.len());
    println!();
    println!("Attributes ({}):", deps.attributes.len());
    for attribute in &deps.attributes {
        let marker = if eadv_synth::deps::wildcard::is_wildcard(attribute) {
            "  (wildcard)"
        } else {
            ""
        };
        println!("  {}{}", attribute, marker);
    }
    println!();
    println!("Derived tables ({}):", deps.bindings.len());
    for (table, vars) in &deps.bindings {
        let vars: Vec<&str> = vars.iter().map(String::as_str).collect();
        println!("  {}: {}", table, vars.join(", "));
    }

    Ok(())
}
