use super::config::{
    OutputConfig,
    SearchConfig,
};
use super::errors::CliError;
use indicatif::{
    ProgressBar,
    ProgressStyle,
};
use pepsearch::data_sources::{
    read_fasta,
    read_spectra,
};
use pepsearch::digest::Protease;
use pepsearch::models::append_reversed_decoys;
use pepsearch::scoring::{
    DatabaseSearcher,
    PsmTsvWriter,
};
use std::path::Path;
use std::time::Instant;
use tracing::{
    debug,
    info,
};

pub fn run(
    fasta: &Path,
    spectra: &Path,
    search: &SearchConfig,
    output: &OutputConfig,
) -> std::result::Result<(), CliError> {
    let st = Instant::now();
    let mut proteins = read_fasta(fasta)?;
    let num_targets = proteins.len();
    if search.digestion.build_decoys {
        append_reversed_decoys(&mut proteins, &search.decoy_prefix);
    }
    info!(
        "Loaded {} target and {} decoy proteins in {:?}",
        num_targets,
        proteins.len() - num_targets,
        st.elapsed()
    );

    let st = Instant::now();
    let spectra = read_spectra(spectra)?;
    info!("Loaded {} spectra in {:?}", spectra.len(), st.elapsed());

    let protease = Protease::try_from(&search.digestion)?;
    let searcher = DatabaseSearcher::try_new(
        &spectra,
        &protease,
        &search.fixed_modifications,
        &search.variable_modifications,
        search.parameters.clone(),
    )?;
    debug!("Search parameters: {:#?}", searcher.parameters());

    let style = ProgressStyle::with_template(
        "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
    )
    .map_err(|e| CliError::Config {
        source: e.to_string(),
    })?;
    let progress = ProgressBar::new(proteins.len() as u64).with_style(style);
    let results = searcher.search(&proteins, &progress)?;
    progress.finish();

    let out_path = output.directory.join("results.tsv");
    let mut writer = PsmTsvWriter::create(&out_path)?;
    writer.write_all(results.psms.iter())?;
    let nwritten = writer.written();
    writer.finish()?;
    info!("Wrote {} matches to {}", nwritten, out_path.display());

    let summary_path = output.directory.join("summary.json");
    let summary_file = std::fs::File::create(&summary_path).map_err(|e| CliError::Io {
        source: e.to_string(),
        path: Some(summary_path.to_string_lossy().to_string()),
    })?;
    serde_json::to_writer_pretty(summary_file, &results.summary).map_err(|e| CliError::Io {
        source: e.to_string(),
        path: Some(summary_path.to_string_lossy().to_string()),
    })?;

    let totals = results.summary.totals;
    println!(
        "Searched {} proteins ({} target, {} decoy peptides) against {} spectra",
        totals.proteins,
        totals.target_peptides,
        totals.decoy_peptides,
        results.summary.num_spectra
    );
    println!(
        "Matched {} spectra, wrote {} results in {:?}",
        results.summary.num_matched_spectra, nwritten, results.summary.elapsed
    );
    Ok(())
}
