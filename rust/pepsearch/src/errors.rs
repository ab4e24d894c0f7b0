use serde_json;
use std::path::PathBuf;

#[derive(Debug)]
pub enum DataProcessingError {
    ExpectedSlicesSameLength {
        expected: usize,
        other: usize,
        context: String,
    },
    ExpectedFiniteNonNanData {
        context: String,
    },
    InvalidValue {
        field: &'static str,
        context: String,
    },
}

#[derive(Debug)]
pub enum DataReadingError {
    FastaParsingError {
        line: usize,
        context: &'static str,
        path: Option<PathBuf>,
    },
    SpectraParsingError {
        source: serde_json::Error,
        context: &'static str,
    },
    FileReadingError {
        source: std::io::Error,
        context: &'static str,
        path: PathBuf,
    },
}

impl DataProcessingError {
    pub fn append_to_context(mut self, context: &str) -> Self {
        match &mut self {
            DataProcessingError::ExpectedSlicesSameLength {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::ExpectedFiniteNonNanData {
                context: owned_context,
            } => {
                owned_context.push_str(context);
            }
            DataProcessingError::InvalidValue {
                context: owned_context,
                ..
            } => {
                owned_context.push_str(context);
            }
        }
        self
    }
}

#[derive(Debug)]
pub enum SearchError {
    Config {
        msg: String,
    },
    Io {
        source: std::io::Error,
        path: Option<PathBuf>,
    },
    ParseError {
        msg: String,
    },
    DataProcessingError(DataProcessingError),
    DataReadingError(DataReadingError),
}

impl SearchError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config { msg: msg.into() }
    }
}

impl std::fmt::Display for SearchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchError::Config { msg } => write!(f, "Invalid configuration: {}", msg),
            SearchError::ParseError { msg } => write!(f, "Parse error: {}", msg),
            SearchError::Io {
                source,
                path: Some(path),
            } => write!(f, "IO error on {}: {}", path.display(), source),
            _ => write!(f, "{:?}", self),
        }
    }
}

impl std::error::Error for SearchError {}

pub type Result<T> = std::result::Result<T, SearchError>;

impl From<std::num::ParseFloatError> for SearchError {
    fn from(x: std::num::ParseFloatError) -> Self {
        Self::ParseError { msg: x.to_string() }
    }
}

impl From<serde_json::Error> for SearchError {
    fn from(val: serde_json::Error) -> Self {
        SearchError::ParseError {
            msg: val.to_string(),
        }
    }
}

impl From<csv::Error> for SearchError {
    fn from(val: csv::Error) -> Self {
        SearchError::Io {
            source: val.into(),
            path: None,
        }
    }
}

impl From<DataProcessingError> for SearchError {
    fn from(x: DataProcessingError) -> Self {
        Self::DataProcessingError(x)
    }
}

impl From<DataReadingError> for SearchError {
    fn from(x: DataReadingError) -> Self {
        Self::DataReadingError(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_to_context() {
        let err = DataProcessingError::InvalidValue {
            field: "peptide_interval",
            context: "residues 1-100".to_string(),
        }
        .append_to_context(" in protein 'P1'");
        match err {
            DataProcessingError::InvalidValue { field, context } => {
                assert_eq!(field, "peptide_interval");
                assert_eq!(context, "residues 1-100 in protein 'P1'");
            }
            other => panic!("Unexpected error: {:?}", other),
        }
    }
}
