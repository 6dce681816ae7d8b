//! Geosite and geoip classification of logged transactions
//!
//! The domain comes from the first A question of the message, the addresses
//! from the A records of its answer section. Exclusions always win over
//! inclusions.

use std::net::{IpAddr, Ipv4Addr};

use log::trace;

use crate::dns_parser::{Packet, QueryType, RRData};
use crate::geo::{GeoipLookup, GeositeLookup};

/// Which domains and addresses qualify
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// A domain listed under any of these geosite codes is dropped
    pub geosite_exclude_codes: Vec<String>,
    /// A domain ending with any of these is dropped
    pub geosite_exclude_domains: Vec<String>,
    /// An address has to be in one of these regions, an empty list matches
    /// nothing
    pub geoip_include_codes: Vec<String>,
    /// An address in any of these regions never qualifies
    pub geoip_exclude_codes: Vec<String>,
}

/// Outcome of classifying the question of a message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteVerdict {
    /// The message has no A question
    NoAddressQuestion,
    ExcludedCode { domain: String, code: String },
    ExcludedSuffix { domain: String, suffix: String },
    Accepted(String),
}

/// Classifies the first A question of `packet` against the geosite rules
pub fn classify_question(
    packet: &Packet,
    policy: &Policy,
    geosite: &dyn GeositeLookup,
) -> SiteVerdict {
    let question = match packet.questions.iter().find(|q| q.qtype == QueryType::A) {
        Some(question) => question,
        None => return SiteVerdict::NoAddressQuestion,
    };
    let domain = question.qname.to_string();
    let domain = domain.trim_end_matches('.');

    let codes = geosite.lookup_codes(domain);
    if let Some(code) = policy
        .geosite_exclude_codes
        .iter()
        .find(|code| codes.contains(&code.as_str()))
    {
        return SiteVerdict::ExcludedCode {
            domain: domain.to_string(),
            code: code.clone(),
        };
    }
    if let Some(suffix) = policy
        .geosite_exclude_domains
        .iter()
        .find(|suffix| domain.ends_with(suffix.as_str()))
    {
        return SiteVerdict::ExcludedSuffix {
            domain: domain.to_string(),
            suffix: suffix.clone(),
        };
    }
    SiteVerdict::Accepted(domain.to_string())
}

/// `true` when `ip` is in an included region and in no excluded one
pub fn classify_ip(ip: Ipv4Addr, policy: &Policy, geoip: &dyn GeoipLookup) -> bool {
    let codes = geoip.lookup_codes(IpAddr::V4(ip));
    let has = |wanted: &Vec<String>| wanted.iter().any(|code| codes.contains(&code.as_str()));
    let accepted = has(&policy.geoip_include_codes) && !has(&policy.geoip_exclude_codes);
    trace!("geoip verdict for {}: {}", ip, accepted);
    accepted
}

/// Classifies the address of an answer record, anything but a well formed A
/// record is not a match
pub fn classify_answer(data: &RRData, policy: &Policy, geoip: &dyn GeoipLookup) -> bool {
    match *data {
        RRData::A(ip) => classify_ip(ip, policy, geoip),
        _ => false,
    }
}
