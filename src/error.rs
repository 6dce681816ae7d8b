use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::dns_parser;
use crate::geo::GeoError;

/// Everything that ends a run
///
/// Entry ordinals are 1-based, counted over all lines of the query log.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("geo database: {0}")]
    Geo(#[from] GeoError),
    #[error("failed to read query log {}: {source}", path.display())]
    ReadLog {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("query log entry {entry}: answer is not valid base64: {source}")]
    Base64 {
        entry: usize,
        #[source]
        source: base64::DecodeError,
    },
    #[error("query log entry {entry}: answer is not a valid DNS message: {source}")]
    Dns {
        entry: usize,
        #[source]
        source: dns_parser::Error,
    },
}
