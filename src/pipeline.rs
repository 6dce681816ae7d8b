//! One pass over a query log, folding accepted domains into a `DomainSet`

use log::{debug, trace, warn};

use crate::classify::{classify_answer, classify_question, Policy, SiteVerdict};
use crate::dns_parser::Packet;
use crate::domain_set::DomainSet;
use crate::error::Error;
use crate::geo::{GeoipLookup, GeositeLookup};
use crate::querylog::{split_entries, LogEntry};

/// Counters of a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stats {
    pub entries: usize,
    /// Entries skipped because they are not a valid log record
    pub malformed: usize,
    pub no_question: usize,
    pub geosite_rejected: usize,
    pub geoip_rejected: usize,
    /// Entries that contributed a domain, duplicates included
    pub accepted: usize,
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub domains: DomainSet,
    pub stats: Stats,
}

pub struct Pipeline<'a> {
    policy: &'a Policy,
    geosite: &'a dyn GeositeLookup,
    geoip: &'a dyn GeoipLookup,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        policy: &'a Policy,
        geosite: &'a dyn GeositeLookup,
        geoip: &'a dyn GeoipLookup,
    ) -> Pipeline<'a> {
        Pipeline {
            policy,
            geosite,
            geoip,
        }
    }

    /// Processes every entry of `log` in order
    ///
    /// A line that isn't a log record is skipped with a warning. An answer
    /// that fails to decode aborts the whole run, nothing collected so far is
    /// returned in that case.
    pub fn run(&self, log: &str) -> Result<Outcome, Error> {
        let mut stats = Stats::default();
        let mut domains = DomainSet::new();

        for (idx, raw) in split_entries(log).into_iter().enumerate() {
            let ordinal = idx + 1;
            stats.entries += 1;

            let entry = match LogEntry::from_json(raw) {
                Ok(entry) => entry,
                Err(error) => {
                    warn!("skipping query log entry {}: {}", ordinal, error);
                    stats.malformed += 1;
                    continue;
                }
            };
            domains = self.process(ordinal, &entry, domains, &mut stats)?;
        }

        Ok(Outcome { domains, stats })
    }

    fn process(
        &self,
        ordinal: usize,
        entry: &LogEntry,
        domains: DomainSet,
        stats: &mut Stats,
    ) -> Result<DomainSet, Error> {
        let bytes = entry.answer_bytes().map_err(|source| Error::Base64 {
            entry: ordinal,
            source,
        })?;
        let packet = Packet::parse(&bytes).map_err(|source| Error::Dns {
            entry: ordinal,
            source,
        })?;
        trace!(
            "entry {}: {} {} {:?} (ad {}, cd {}) with {} answers",
            ordinal,
            entry.query_type,
            entry.host,
            packet.header.response_code,
            packet.header.authenticated_data,
            packet.header.checking_disabled,
            packet.answers.len()
        );

        let verdict = classify_question(&packet, self.policy, self.geosite);
        let domain = match verdict {
            SiteVerdict::Accepted(domain) => domain,
            SiteVerdict::NoAddressQuestion => {
                stats.no_question += 1;
                return Ok(domains);
            }
            SiteVerdict::ExcludedCode { domain, code } => {
                trace!("entry {}: {} excluded by geosite:{}", ordinal, domain, code);
                stats.geosite_rejected += 1;
                return Ok(domains);
            }
            SiteVerdict::ExcludedSuffix { domain, suffix } => {
                trace!("entry {}: {} excluded by suffix {}", ordinal, domain, suffix);
                stats.geosite_rejected += 1;
                return Ok(domains);
            }
        };

        let matched = packet
            .answers
            .iter()
            .any(|rr| classify_answer(&rr.data, self.policy, self.geoip));
        if !matched {
            stats.geoip_rejected += 1;
            return Ok(domains);
        }

        stats.accepted += 1;
        if !domains.contains(&domain) {
            debug!("{}", domain);
        }
        Ok(domains.append(&domain))
    }
}
