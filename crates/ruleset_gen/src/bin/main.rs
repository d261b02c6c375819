//! CLI for generating rule-block fixtures.
//!
//! Usage:
//!   gen-rulesets --scale small --seed 42 > tests/fixtures/small.yaml
//!   gen-rulesets --format json --wrapped --output medium.json --scale medium

use clap::Parser;
use ruleset_gen::{Format, RenderConfig, Renderer, RulesetGenerator, Scale};
use std::fs::File;
use std::io;

#[derive(Parser, Debug)]
#[command(name = "gen-rulesets")]
#[command(about = "Generate compiled rule-block fixtures for eadv-synth", long_about = None)]
struct Args {
    /// Scale preset: small, medium, large
    #[arg(short, long, default_value = "small")]
    scale: String,

    /// Random seed for reproducibility
    #[arg(long, default_value = "12345")]
    seed: u64,

    /// Document format: yaml or json
    #[arg(short, long, default_value = "yaml")]
    format: String,

    /// Wrap blocks as {ruleblocks: [...]}
    #[arg(long)]
    wrapped: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let scale: Scale = args.scale.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    let format: Format = args.format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let config = RenderConfig {
        format,
        wrapped: args.wrapped,
    };
    let ruleset = RulesetGenerator::new(args.seed, scale).generate();
    let renderer = Renderer::new(config);

    if let Some(ref path) = args.output {
        let file = File::create(path)?;
        renderer.render(&ruleset, file)?;
        eprintln!(
            "Generated {} blocks ({} rules) to {}",
            ruleset.blocks.len(),
            ruleset.rule_count(),
            path
        );
    } else {
        let stdout = io::stdout();
        renderer.render(&ruleset, stdout.lock())?;
    }

    Ok(())
}
