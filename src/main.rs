use std::path::PathBuf;
use std::time::Instant;

use log::{info, warn};
use pdc_analyzer::{AdherenceAnalyzer, AnalysisConfig, Result};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

const USAGE: &str = "Usage: pdc-analyzer [CDM_DIR] [OUTPUT_DIR] [--config FILE]

Arguments:
  CDM_DIR     Directory with drug_exposure/, concept/ and person/ Parquet
              subdirectories (default: data/cdm)
  OUTPUT_DIR  Directory the CSV results are written to (default: results)
  --config    JSON file overriding the default analysis parameters";

fn main() -> Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut positional: Vec<String> = Vec::new();
    let mut config_path: Option<PathBuf> = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            "--config" => match iter.next() {
                Some(path) => config_path = Some(PathBuf::from(path)),
                None => {
                    warn!("--config requires a file argument");
                    println!("{USAGE}");
                    return Ok(());
                }
            },
            _ => positional.push(arg.clone()),
        }
    }

    let cdm_dir = positional
        .first()
        .map_or_else(|| PathBuf::from("data/cdm"), PathBuf::from);
    let output_dir = positional
        .get(1)
        .map_or_else(|| PathBuf::from("results"), PathBuf::from);

    let config = match &config_path {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    info!("{config}");

    if !cdm_dir.exists() {
        warn!("CDM directory not found: {}", cdm_dir.display());
        return Ok(());
    }

    let analyzer = AdherenceAnalyzer::new(config)?;

    let start = Instant::now();
    let results = analyzer.run_from_dir(&cdm_dir)?;
    info!("Analysis finished in {:?}", start.elapsed());

    if results.rejected_records > 0 {
        info!(
            "{} source rows were rejected during conversion",
            results.rejected_records
        );
    }

    pdc_analyzer::export::write_results(&results, &output_dir)?;

    info!("Done");
    Ok(())
}
