//! Code lookups for domains (geosite) and addresses (geoip)
//!
//! The classifiers only see the `GeositeLookup` and `GeoipLookup` traits.
//! `FixedGeosite`/`FixedGeoip` answer from an in-memory table, the `*Db`
//! types load plain-text databases from disk.

mod fixed;
mod geoip_db;
mod geosite_db;
mod lookup;

pub use self::fixed::{FixedGeoip, FixedGeosite};
pub use self::geoip_db::GeoipDb;
pub use self::geosite_db::{DomainRule, GeositeDb};
pub use self::lookup::{GeoipLookup, GeositeLookup};

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Error loading a geosite or geoip database
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{}:{line}: invalid entry {entry:?}: {reason}", path.display())]
    InvalidEntry {
        path: PathBuf,
        line: usize,
        entry: String,
        reason: String,
    },
}

/// One line of a database file, already split into its code and value
struct Line<'a> {
    number: usize,
    code: &'a str,
    value: &'a str,
}

/// A database source: either a directory of `<code>.txt` files or a single
/// file whose lines start with the code
///
/// Calls `f` for every meaningful line, blank lines and `#` comments are
/// skipped, anything after the value (v2fly style `@attr` tags) is ignored.
fn for_each_line<F>(path: &Path, mut f: F) -> Result<(), GeoError>
where
    F: FnMut(&Path, Line) -> Result<(), GeoError>,
{
    let io_err = |source| GeoError::Io {
        path: path.to_path_buf(),
        source,
    };
    if fs::metadata(path).map_err(io_err)?.is_dir() {
        let mut files = fs::read_dir(path)
            .map_err(io_err)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(io_err)?;
        files.sort();
        for file in files {
            if file.extension().map_or(true, |ext| ext != "txt") {
                continue;
            }
            let code = match file.file_stem().and_then(|s| s.to_str()) {
                Some(stem) => stem.to_lowercase(),
                None => continue,
            };
            let contents = read(&file)?;
            for (number, value) in meaningful_lines(&contents) {
                let line = Line {
                    number,
                    code: &code,
                    value: first_word(value),
                };
                f(&file, line)?;
            }
        }
    } else {
        let contents = read(path)?;
        for (number, text) in meaningful_lines(&contents) {
            let mut words = text.split_whitespace();
            let (code, value) = match (words.next(), words.next()) {
                (Some(code), Some(value)) => (code, value),
                _ => {
                    return Err(GeoError::InvalidEntry {
                        path: path.to_path_buf(),
                        line: number,
                        entry: text.to_string(),
                        reason: "expected `<code> <value>`".to_string(),
                    })
                }
            };
            let code = code.to_lowercase();
            f(
                path,
                Line {
                    number,
                    code: &code,
                    value,
                },
            )?;
        }
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, GeoError> {
    fs::read_to_string(path).map_err(|source| GeoError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn meaningful_lines(contents: &str) -> impl Iterator<Item = (usize, &str)> {
    contents
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn first_word(text: &str) -> &str {
    text.split_whitespace().next().unwrap_or(text)
}
