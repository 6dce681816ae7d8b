use std::collections::HashMap;
use std::path::Path;

use log::{debug, trace};
use regex::Regex;

use super::{for_each_line, GeoError, GeositeLookup};

/// A single rule of a site list
#[derive(Debug, Clone)]
pub enum DomainRule {
    /// `full:` matches the name exactly
    Full(String),
    /// `domain:` (or no prefix) matches the name and all its subdomains
    Domain(String),
    /// `keyword:` matches names containing the text
    Keyword(String),
    /// `regexp:` matches names the expression finds a match in
    Regex(Regex),
}

impl DomainRule {
    pub fn parse(text: &str) -> Result<DomainRule, String> {
        let (kind, value) = match text.find(':') {
            Some(pos) => (&text[..pos], &text[pos + 1..]),
            None => ("domain", text),
        };
        if value.is_empty() {
            return Err("empty rule".to_string());
        }
        match kind {
            "full" => Ok(DomainRule::Full(value.to_lowercase())),
            "domain" => Ok(DomainRule::Domain(value.to_lowercase())),
            "keyword" => Ok(DomainRule::Keyword(value.to_lowercase())),
            "regexp" => Regex::new(value)
                .map(DomainRule::Regex)
                .map_err(|e| e.to_string()),
            other => Err(format!("unknown rule type {:?}", other)),
        }
    }

    /// `domain` must already be lower case
    pub fn matches(&self, domain: &str) -> bool {
        match self {
            DomainRule::Full(name) => domain == name,
            DomainRule::Domain(name) => {
                domain == name
                    || (domain.ends_with(name.as_str())
                        && domain.as_bytes()[domain.len() - name.len() - 1] == b'.')
            }
            DomainRule::Keyword(text) => domain.contains(text.as_str()),
            DomainRule::Regex(re) => re.is_match(domain),
        }
    }
}

/// Site lists keyed by code, indexed for lookups by name
#[derive(Debug, Default)]
pub struct GeositeDb {
    codes: Vec<String>,
    full: HashMap<String, Vec<usize>>,
    domain: HashMap<String, Vec<usize>>,
    /// Keyword and regex rules can't be indexed and are scanned
    scanned: Vec<(DomainRule, usize)>,
}

impl GeositeDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a directory of `<code>.txt` site lists, or a single file of
    /// `<code> <rule>` lines
    ///
    /// `include:` lines of v2fly sources are not followed, lists have to be
    /// flattened before use.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<GeositeDb, GeoError> {
        let path = path.as_ref();
        let mut db = GeositeDb::new();
        for_each_line(path, |file, line| {
            if line.value.starts_with("include:") {
                debug!("{}:{}: ignoring {}", file.display(), line.number, line.value);
                return Ok(());
            }
            let rule = DomainRule::parse(line.value).map_err(|reason| GeoError::InvalidEntry {
                path: file.to_path_buf(),
                line: line.number,
                entry: line.value.to_string(),
                reason,
            })?;
            db.insert(line.code, rule);
            Ok(())
        })?;
        debug!(
            "loaded {} geosite codes from {}",
            db.codes.len(),
            path.display()
        );
        Ok(db)
    }

    pub fn insert(&mut self, code: &str, rule: DomainRule) {
        let code = code.to_lowercase();
        let idx = match self.codes.iter().position(|c| *c == code) {
            Some(idx) => idx,
            None => {
                self.codes.push(code);
                self.codes.len() - 1
            }
        };
        match rule {
            DomainRule::Full(name) => self.full.entry(name).or_default().push(idx),
            DomainRule::Domain(name) => self.domain.entry(name).or_default().push(idx),
            rule => self.scanned.push((rule, idx)),
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }
}

impl GeositeLookup for GeositeDb {
    fn lookup_codes(&self, domain: &str) -> Vec<&str> {
        let domain = domain.trim_end_matches('.').to_lowercase();
        let mut hits = vec![false; self.codes.len()];

        if let Some(ids) = self.full.get(&domain) {
            ids.iter().for_each(|&i| hits[i] = true);
        }
        let mut suffix = domain.as_str();
        loop {
            if let Some(ids) = self.domain.get(suffix) {
                ids.iter().for_each(|&i| hits[i] = true);
            }
            match suffix.find('.') {
                Some(pos) => suffix = &suffix[pos + 1..],
                None => break,
            }
        }
        for (rule, idx) in &self.scanned {
            if !hits[*idx] && rule.matches(&domain) {
                hits[*idx] = true;
            }
        }

        let codes = self
            .codes
            .iter()
            .zip(hits)
            .filter(|(_, hit)| *hit)
            .map(|(code, _)| code.as_str())
            .collect::<Vec<_>>();
        trace!("geosite {} -> {:?}", domain, codes);
        codes
    }
}
