mod cli;
mod config;
mod errors;
mod processing;

use clap::Parser;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::{
    Config,
    InputConfig,
    OutputConfig,
};

#[cfg(target_os = "windows")]
use mimalloc::MiMalloc;

#[cfg(target_os = "windows")]
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> std::result::Result<(), errors::CliError> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        ) // This uses RUST_LOG environment variable
        .init();

    let args = Cli::parse();

    let conf = match std::fs::File::open(&args.config) {
        Ok(x) => x,
        Err(e) => {
            return Err(errors::CliError::Io {
                source: e.to_string(),
                path: Some(args.config.to_string_lossy().to_string()),
            });
        }
    };
    let config: Result<Config, _> = serde_json::from_reader(conf);
    let mut config = match config {
        Ok(x) => x,
        Err(e) => {
            return Err(errors::CliError::ParseError { msg: e.to_string() });
        }
    };

    // Command line arguments win over the config file
    let input = config.input.get_or_insert_with(InputConfig::default);
    if let Some(fasta_file) = args.fasta_file {
        input.fasta = Some(fasta_file);
    }
    if let Some(spectra_file) = args.spectra_file {
        input.spectra = Some(spectra_file);
    }
    if let Some(output_dir) = args.output_dir {
        config.output = Some(OutputConfig {
            directory: output_dir,
        });
    }
    if let Some(threads) = args.threads {
        config.search.threads = threads;
    }
    info!("Parsed configuration: {:#?}", config);

    let (fasta, spectra) = match config.input {
        Some(InputConfig {
            fasta: Some(ref fasta),
            spectra: Some(ref spectra),
        }) => (fasta.clone(), spectra.clone()),
        _ => {
            return Err(errors::CliError::Config {
                source: "Both a FASTA file and a spectra file are required, please provide them in either the config file or with the --fasta-file and --spectra-file flags".to_string(),
            });
        }
    };
    let output_config = match config.output {
        Some(ref x) => x.clone(),
        None => {
            return Err(errors::CliError::Config {
                source: "No output directory provided, please provide one in either the config file or with the --output-dir flag".to_string(),
            });
        }
    };

    match std::fs::create_dir_all(&output_config.directory) {
        Ok(_) => info!("Using output directory {:?}", output_config.directory),
        Err(e) => {
            return Err(errors::CliError::Io {
                source: e.to_string(),
                path: Some(output_config.directory.to_string_lossy().to_string()),
            });
        }
    };

    if config.search.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(config.search.threads)
            .build_global()
            .map_err(|e| errors::CliError::Config {
                source: e.to_string(),
            })?;
    }
    info!("Searching with {} threads", rayon::current_num_threads());

    processing::run(&fasta, &spectra, &config.search, &output_config)
}
