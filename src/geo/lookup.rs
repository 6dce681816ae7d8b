use std::fmt::Debug;
use std::net::IpAddr;

pub trait GeositeLookup: Debug {
    /// Codes of every site list that contains `domain`
    fn lookup_codes(&self, domain: &str) -> Vec<&str>;
}

pub trait GeoipLookup: Debug {
    /// Codes of every region whose ranges contain `ip`
    fn lookup_codes(&self, ip: IpAddr) -> Vec<&str>;
}
