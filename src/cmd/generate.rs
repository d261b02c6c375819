//! Generate command CLI handler.

use anyhow::Context;
use eadv_synth::dates::{parse_date, DateFormat, DateInterval, DistributionMode};
use eadv_synth::generator::{
    generate_fixture_with_progress, FixtureYamlConfig, GeneratedFixture, GenerationOptions,
};
use eadv_synth::output::{write_fixture, OutputFormat, SqlDialect, SqlWriterConfig};
use eadv_synth::rules::load_rule_blocks;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

pub struct GenerateArgs {
    pub rules: PathBuf,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub format: String,
    pub dialect: Option<String>,
    pub source_table: Option<String>,
    pub batch_size: Option<usize>,
    pub seed: Option<u64>,
    pub entities: Option<usize>,
    pub start_id: Option<i64>,
    pub observations: Option<usize>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub date_format: Option<String>,
    pub distribution: Option<String>,
    pub no_bindings: bool,
    pub progress: bool,
    pub dry_run: bool,
}

/// Defaults, then the YAML config, then CLI flags
fn build_options(args: &GenerateArgs) -> anyhow::Result<GenerationOptions> {
    let mut options = GenerationOptions::default();

    if let Some(ref path) = args.config {
        let config = FixtureYamlConfig::load(path)?;
        config.apply_to(&mut options)?;
        tracing::info!(config = %path.display(), "loaded generation config");
    }

    if let Some(seed) = args.seed {
        options.seed = Some(seed);
    }
    if let Some(n) = args.entities {
        options.entity_count = n;
    }
    if let Some(id) = args.start_id {
        options.start_entity_id = id;
    }
    if let Some(n) = args.observations {
        options.observations_per_entity = n;
    }
    if args.start.is_some() || args.end.is_some() {
        let start = match args.start {
            Some(ref s) => parse_date(s)?,
            None => options.interval.start(),
        };
        let end = match args.end {
            Some(ref s) => parse_date(s)?,
            None => options.interval.end(),
        };
        options.interval = DateInterval::new(start, end)?;
    }
    if let Some(ref f) = args.date_format {
        options.date_format = f
            .parse::<DateFormat>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    if let Some(ref d) = args.distribution {
        options.distribution = d
            .parse::<DistributionMode>()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
    }
    if args.no_bindings {
        options.include_bindings = false;
    }

    options.validate()?;
    Ok(options)
}

fn sql_config(args: &GenerateArgs) -> anyhow::Result<SqlWriterConfig> {
    let dialect = match args.dialect {
        Some(ref d) => d
            .parse::<SqlDialect>()
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        None => SqlDialect::default(),
    };
    let mut config = SqlWriterConfig::new(dialect);
    if let Some(ref table) = args.source_table {
        config = config.with_source_table(table.as_str());
    }
    if let Some(size) = args.batch_size {
        if size == 0 {
            anyhow::bail!("--batch-size must be greater than 0");
        }
        config = config.with_batch_size(size);
    }
    Ok(config)
}

fn progress_bar(total: usize) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} entities {msg}",
        )?
        .progress_chars("█▓▒░  ")
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message("Generating...");
    Ok(pb)
}

fn print_summary(fixture: &GeneratedFixture) {
    let meta = &fixture.metadata;
    eprintln!("Fixture Statistics:");
    eprintln!("  Entities: {}", meta.entity_ids.len());
    eprintln!("  Attributes: {}", meta.attributes.len());
    eprintln!("  Source rows: {}", meta.total_source_rows);
    eprintln!("  Derived tables: {}", meta.derived_tables.len());
    for (table, rows) in &fixture.binding_tables {
        eprintln!("    {}: {} rows", table, rows.len());
    }
    eprintln!("  Seed: {}", meta.seed);
}

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let format = args
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    let sql = sql_config(&args)?;
    let options = build_options(&args)?;
    let blocks = load_rule_blocks(&args.rules)?;

    tracing::info!(
        rules = %args.rules.display(),
        blocks = blocks.len(),
        entities = options.entity_count,
        %format,
        "generating fixture"
    );

    let pb = if args.progress {
        Some(progress_bar(options.entity_count)?)
    } else {
        None
    };
    let fixture = generate_fixture_with_progress(&blocks, &options, |done, _| {
        if let Some(ref pb) = pb {
            pb.set_position(done as u64);
        }
    });
    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    if args.progress || args.dry_run {
        print_summary(&fixture);
    }
    if args.dry_run {
        eprintln!("\n(dry run - no output written)");
        return Ok(());
    }

    match args.output {
        Some(ref path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_fixture(&fixture, format, &sql, &mut writer)?;
            tracing::info!(output = %path.display(), "wrote fixture");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = BufWriter::new(stdout.lock());
            write_fixture(&fixture, format, &sql, &mut writer)?;
        }
    }

    Ok(())
}
