use thiserror::Error;

/// Failure to retrieve or decode a single resource.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },
    #[error("{origin} is not a valid parallels mapping: {source}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Combined failure of the startup load. Either or both resources may have failed.
#[derive(Debug, Error)]
#[error("failed to load data: {}", describe(.failures))]
pub struct LoadError {
    pub failures: Vec<SourceError>,
}

fn describe(failures: &[SourceError]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("could not read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("parallels CSV {0} has no header line")]
    EmptyCsv(String),
    #[error("could not serialize mapping: {0}")]
    Serialize(#[from] serde_json::Error),
}
