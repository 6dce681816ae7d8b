use std::collections::HashSet;
use std::slice;

/// Accepted domains in order of first acceptance, without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainSet {
    domains: Vec<String>,
    /// maps to membership in `domains`
    seen: HashSet<String>,
}

impl DomainSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the set with `domain` at the end, or unchanged if it is
    /// already present (exact, case sensitive comparison)
    pub fn append(mut self, domain: &str) -> DomainSet {
        self.insert(domain);
        self
    }

    /// Appends `domain` in place, `false` if it was already present
    pub fn insert(&mut self, domain: &str) -> bool {
        if self.seen.contains(domain) {
            return false;
        }
        self.seen.insert(domain.to_string());
        self.domains.push(domain.to_string());
        true
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.seen.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<String> {
        self.domains.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.domains
    }
}

impl<'a> IntoIterator for &'a DomainSet {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.domains.iter()
    }
}
