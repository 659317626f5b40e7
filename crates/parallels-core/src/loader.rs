use crate::error::{LoadError, SourceError};
use crate::parallels::ParallelMapping;
use std::fmt;
use std::path::PathBuf;

/// Message shown in place of the document when loading fails.
pub const LOAD_FAILURE_MESSAGE: &str =
    "Error loading data files. Please ensure 'luke.txt' and 'full_parallels.json' are available.";

pub const DEFAULT_TEXT_SOURCE: &str = "luke.txt";
pub const DEFAULT_MAPPING_SOURCE: &str = "full_parallels.json";

/// Where a resource comes from: a local file or a plain GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn parse(s: &str) -> Self {
        if s.starts_with("http://") || s.starts_with("https://") {
            Source::Url(s.to_string())
        } else {
            Source::File(PathBuf::from(s))
        }
    }

    pub async fn fetch_text(&self) -> Result<String, SourceError> {
        match self {
            Source::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| SourceError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
            Source::Url(url) => {
                let http = |source| SourceError::Http {
                    url: url.clone(),
                    source,
                };
                let response = reqwest::get(url).await.map_err(http)?;
                if !response.status().is_success() {
                    return Err(SourceError::Status {
                        url: url.clone(),
                        status: response.status().as_u16(),
                    });
                }
                response.text().await.map_err(http)
            }
        }
    }

    pub async fn fetch_mapping(&self) -> Result<ParallelMapping, SourceError> {
        let body = self.fetch_text().await?;
        ParallelMapping::from_json(&body).map_err(|source| SourceError::Json {
            origin: self.to_string(),
            source,
        })
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => f.write_str(url),
        }
    }
}

/// Both resources, available only once both were retrieved.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub text: String,
    pub mapping: ParallelMapping,
}

/// Fetch the mapping and the source text concurrently. Succeeds only if both
/// succeed; otherwise every failure is reported in one `LoadError`.
pub async fn load(text: &Source, mapping: &Source) -> Result<Loaded, LoadError> {
    tracing::info!(%text, %mapping, "loading data");

    let (mapping, text) = tokio::join!(mapping.fetch_mapping(), text.fetch_text());

    match (mapping, text) {
        (Ok(mapping), Ok(text)) => {
            tracing::info!(
                bytes = text.len(),
                parallel_verses = mapping.verse_count(),
                "data loaded"
            );
            Ok(Loaded { text, mapping })
        }
        (mapping, text) => {
            let failures: Vec<SourceError> = [mapping.err(), text.err()].into_iter().flatten().collect();
            let err = LoadError { failures };
            tracing::error!(error = %err, "loading data failed");
            Err(err)
        }
    }
}
