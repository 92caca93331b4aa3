// src/main.rs
use anyhow::{anyhow, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use soil_calc::batch::{process_batch, BatchConfig};
use soil_calc::cli::{Cli, Commands};
use soil_calc::io::{load_archive, read_region, write_json};
use soil_calc::processing::IndexEntry;
use soil_calc::scoring::{IndexName, IndexValue};
use soil_calc::{EngineConfig, LocalArchive, SoilAnalyzer, TimeWindow};

fn analyzer(cli: &Cli) -> Result<SoilAnalyzer<LocalArchive>> {
    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::from_env()?,
    };
    if cli.threads.is_some() {
        config.threads = cli.threads;
    }
    let archive = match &cli.archive {
        Some(path) => load_archive(path)?,
        None => return Err(anyhow!("--archive is required for this command")),
    };
    SoilAnalyzer::new(archive, config)
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soil_calc=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let output = cli.output.as_deref();

    match &cli.command {
        Commands::Report { region, start, end } => {
            let analyzer = analyzer(&cli)?;
            let region = read_region(region)?;
            let window = TimeWindow::parse(start, end)?;
            let report = analyzer.analyze(&region, window);
            write_json(&report, output)?;
        }
        Commands::Series {
            region,
            start,
            end,
            period,
        } => {
            let analyzer = analyzer(&cli)?;
            let region = read_region(region)?;
            let window = TimeWindow::parse(start, end)?;
            let series = analyzer.series(&region, window, *period)?;
            write_json(&series, output)?;
        }
        Commands::Batch { file } => {
            let analyzer = analyzer(&cli)?;
            let batch = BatchConfig::from_file(file)?;
            let written = process_batch(&batch, &analyzer)?;
            if let Some(path) = output {
                write_json(&written, Some(path))?;
            }
        }
        Commands::Interpret { index, value } => {
            let index: IndexName = index.parse()?;
            let value = match index {
                IndexName::SoilTexture => IndexValue::Class(class_of(*value)?),
                _ => IndexValue::Number(*value),
            };
            write_json(&IndexEntry::new(index, Some(value)), output)?;
        }
    }

    if let Some(path) = output {
        tracing::info!("Processing complete: {}", path.display());
    }
    Ok(())
}

fn class_of(value: f64) -> Result<u8> {
    if value.fract() == 0.0 && (0.0..=255.0).contains(&value) {
        Ok(value as u8)
    } else {
        Err(anyhow!("texture class must be a whole number, got {value}"))
    }
}
