//! Extracts the domains of a DNS query log that resolve into chosen regions
//!
//! Every logged answer is decoded, its A question is checked against geosite
//! exclusions and its A records against geoip inclusions and exclusions.
//! Domains passing both end up in a `DomainSet` in order of first acceptance.

use std::fs;
use std::path::Path;

use log::{debug, info, warn};

pub mod classify;
pub mod config;
pub mod dns_parser;
pub mod domain_set;
mod error;
pub mod geo;
pub mod output;
pub mod pipeline;
pub mod querylog;

pub use crate::classify::Policy;
pub use crate::config::{Config, ConfigError};
pub use crate::domain_set::DomainSet;
pub use crate::error::Error;
pub use crate::pipeline::{Outcome, Pipeline, Stats};

use crate::geo::{GeoipDb, GeositeDb};

/// Runs the whole job described by `config` and writes the domain list
///
/// Nothing is written unless every step succeeds.
pub fn run(config: &Config) -> Result<Outcome, Error> {
    let output = config.output_path()?;
    let policy = config.policy();
    debug!("{:?}", policy);

    let geosite = GeositeDb::from_path(&config.geosite.path)?;
    check_codes("geosite", geosite.codes(), &policy.geosite_exclude_codes);
    let geoip = GeoipDb::from_path(&config.geoip.path)?;
    check_codes("geoip", geoip.codes(), &policy.geoip_include_codes);
    check_codes("geoip", geoip.codes(), &policy.geoip_exclude_codes);
    let log = read_log(&config.querylog.path)?;

    let outcome = Pipeline::new(&policy, &geosite, &geoip).run(&log)?;

    output::write_domains(output, &outcome.domains).map_err(|source| Error::WriteOutput {
        path: output.to_path_buf(),
        source,
    })?;
    let stats = &outcome.stats;
    info!(
        "{} entries ({} malformed, {} without A question, {} excluded by geosite, {} excluded by geoip), {} domains written to {}",
        stats.entries,
        stats.malformed,
        stats.no_question,
        stats.geosite_rejected,
        stats.geoip_rejected,
        outcome.domains.len(),
        output.display()
    );
    Ok(outcome)
}

/// Warns about configured codes the database doesn't define, they never match
fn check_codes<'a>(kind: &str, known: impl Iterator<Item = &'a str>, configured: &[String]) {
    let known = known.collect::<Vec<_>>();
    debug!("{} codes: {:?}", kind, known);
    for code in configured {
        if !known.iter().any(|&k| k == code.as_str()) {
            warn!("{} code {:?} is not defined in the database", kind, code);
        }
    }
}

/// Reads the whole log, invalid UTF-8 is replaced so that only the entries
/// containing it are affected
fn read_log(path: &Path) -> Result<String, Error> {
    let bytes = fs::read(path).map_err(|source| Error::ReadLog {
        path: path.to_path_buf(),
        source,
    })?;
    match String::from_utf8(bytes) {
        Ok(log) => Ok(log),
        Err(err) => {
            warn!("query log {} contains invalid UTF-8", path.display());
            Ok(String::from_utf8_lossy(err.as_bytes()).into_owned())
        }
    }
}
