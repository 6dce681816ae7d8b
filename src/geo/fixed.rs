use std::collections::HashMap;
use std::net::IpAddr;

use super::{GeoipLookup, GeositeLookup};

/// Geosite answers from an exact-match table
#[derive(Clone, Debug, Default)]
pub struct FixedGeosite {
    codes: HashMap<String, Vec<String>>,
}

impl FixedGeosite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, domain: &str, codes: &[&str]) -> Self {
        self.codes.insert(
            domain.to_lowercase(),
            codes.iter().map(|c| c.to_string()).collect(),
        );
        self
    }
}

impl GeositeLookup for FixedGeosite {
    fn lookup_codes(&self, domain: &str) -> Vec<&str> {
        self.codes
            .get(&domain.to_lowercase())
            .map(|codes| codes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

/// Geoip answers from an exact-match table
#[derive(Clone, Debug, Default)]
pub struct FixedGeoip {
    codes: HashMap<IpAddr, Vec<String>>,
}

impl FixedGeoip {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<A: Into<IpAddr>>(mut self, ip: A, codes: &[&str]) -> Self {
        self.codes
            .insert(ip.into(), codes.iter().map(|c| c.to_string()).collect());
        self
    }
}

impl GeoipLookup for FixedGeoip {
    fn lookup_codes(&self, ip: IpAddr) -> Vec<&str> {
        self.codes
            .get(&ip)
            .map(|codes| codes.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
