use std::fs;
use std::io;
use std::path::Path;

use crate::domain_set::DomainSet;

/// Renders one domain per line, every line terminated by `\n`
pub fn render(domains: &DomainSet) -> String {
    let mut out = String::with_capacity(domains.iter().map(|d| d.len() + 1).sum());
    for domain in domains {
        out.push_str(domain);
        out.push('\n');
    }
    out
}

/// Writes the domain list to `path`
///
/// The list goes to a sibling temporary file first and is renamed over
/// `path`, so a failed write never leaves a truncated list behind.
pub fn write_domains(path: &Path, domains: &DomainSet) -> io::Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, render(domains))?;
    fs::rename(&tmp, path)
}
