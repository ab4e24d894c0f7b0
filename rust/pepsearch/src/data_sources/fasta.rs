use crate::errors::DataReadingError;
use crate::models::Protein;
use regex::Regex;
use std::io::{
    BufRead,
    BufReader,
};
use std::path::{
    Path,
    PathBuf,
};
use std::sync::LazyLock;
use tracing::{
    info,
    warn,
};

static NON_STANDARD_RESIDUES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("[^ACDEFGHIKLMNPQRSTVWY]").expect("residue filter pattern is valid")
});

/// Reads target proteins from FASTA text.
///
/// The description is the header line without its leading `>`. Residues are
/// upper-cased and anything outside the twenty standard amino acids
/// (including `*`, `X`, `B`, `Z`, `U`) is dropped.
pub fn parse_fasta<R: BufRead>(reader: R) -> Result<Vec<Protein>, DataReadingError> {
    let mut proteins = Vec::new();
    let mut description: Option<String> = None;
    let mut sequence = String::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| DataReadingError::FileReadingError {
            source: e,
            context: "Error reading FASTA line",
            path: PathBuf::new(),
        })?;
        let line = line.trim_end();
        if let Some(header) = line.strip_prefix('>') {
            if let Some(previous) = description.take() {
                push_protein(&mut proteins, &sequence, previous);
            }
            sequence.clear();
            description = Some(header.trim().to_string());
        } else if line.is_empty() || line.starts_with(';') {
            continue;
        } else if description.is_some() {
            sequence.push_str(line);
        } else {
            return Err(DataReadingError::FastaParsingError {
                line: line_number + 1,
                context: "sequence data before the first header",
                path: None,
            });
        }
    }
    if let Some(previous) = description {
        push_protein(&mut proteins, &sequence, previous);
    }
    Ok(proteins)
}

fn push_protein(proteins: &mut Vec<Protein>, raw_sequence: &str, description: String) {
    let upper = raw_sequence.to_ascii_uppercase();
    let cleaned = NON_STANDARD_RESIDUES.replace_all(&upper, "");
    if cleaned.is_empty() {
        warn!("Skipping protein '{}' with no standard residues", description);
        return;
    }
    proteins.push(Protein::new(cleaned.into_owned(), description, false));
}

pub fn read_fasta(path: &Path) -> Result<Vec<Protein>, DataReadingError> {
    let file = std::fs::File::open(path).map_err(|e| DataReadingError::FileReadingError {
        source: e,
        context: "Error opening FASTA file",
        path: PathBuf::from(path),
    })?;
    let proteins = parse_fasta(BufReader::new(file)).map_err(|e| match e {
        DataReadingError::FastaParsingError { line, context, .. } => {
            DataReadingError::FastaParsingError {
                line,
                context,
                path: Some(PathBuf::from(path)),
            }
        }
        DataReadingError::FileReadingError { source, context, .. } => {
            DataReadingError::FileReadingError {
                source,
                context,
                path: PathBuf::from(path),
            }
        }
        other => other,
    })?;
    info!("Read {} proteins from {}", proteins.len(), path.display());
    Ok(proteins)
}
