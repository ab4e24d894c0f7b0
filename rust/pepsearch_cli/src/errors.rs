use pepsearch::errors::SearchError;

#[derive(Debug)]
pub enum CliError {
    Config {
        source: String,
    },
    ParseError {
        msg: String,
    },
    Io {
        source: String,
        path: Option<String>,
    },
    DataReading {
        source: String,
    },
    Search {
        source: String,
    },
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Config { source } => write!(f, "Error interpreting the config: {}", source),
            CliError::ParseError { msg } => write!(f, "Error parsing config: {}", msg),
            CliError::Io { source, path } => {
                if let Some(path) = path {
                    write!(f, "Error reading file {}: {}", path, source)
                } else {
                    write!(f, "Error reading file: {}", source)
                }
            }
            CliError::DataReading { source } => write!(f, "Error reading data: {}", source),
            CliError::Search { source } => write!(f, "Error during search: {}", source),
        }
    }
}

impl std::error::Error for CliError {}

impl From<SearchError> for CliError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Config { msg } => CliError::Config { source: msg },
            SearchError::ParseError { msg } => CliError::ParseError { msg },
            SearchError::Io { source, path } => CliError::Io {
                source: source.to_string(),
                path: path.map(|p| p.to_string_lossy().to_string()),
            },
            SearchError::DataReadingError(e) => CliError::DataReading {
                source: format!("{:?}", e),
            },
            other => CliError::Search {
                source: format!("{:?}", other),
            },
        }
    }
}

impl From<pepsearch::errors::DataReadingError> for CliError {
    fn from(e: pepsearch::errors::DataReadingError) -> Self {
        CliError::DataReading {
            source: format!("{:?}", e),
        }
    }
}
