use std::net::IpAddr;
use std::path::Path;

use ipnetwork::IpNetwork;
use log::{debug, trace};

use super::{for_each_line, GeoError, GeoipLookup};

/// Sorted, merged inclusive ranges
#[derive(Debug, Clone)]
struct RangeSet<T> {
    ranges: Vec<(T, T)>,
}

impl<T: Ord + Copy> RangeSet<T> {
    fn new() -> Self {
        RangeSet { ranges: Vec::new() }
    }

    fn push(&mut self, start: T, end: T) {
        self.ranges.push((start, end));
    }

    fn normalize(&mut self) {
        self.ranges.sort_unstable();
        let mut merged: Vec<(T, T)> = Vec::with_capacity(self.ranges.len());
        for &(start, end) in &self.ranges {
            match merged.last_mut() {
                Some(last) if start <= last.1 => {
                    if end > last.1 {
                        last.1 = end;
                    }
                }
                _ => merged.push((start, end)),
            }
        }
        self.ranges = merged;
    }

    fn contains(&self, value: T) -> bool {
        let idx = self.ranges.partition_point(|&(start, _)| start <= value);
        idx > 0 && value <= self.ranges[idx - 1].1
    }
}

#[derive(Debug, Clone)]
struct Region {
    code: String,
    v4: RangeSet<u32>,
    v6: RangeSet<u128>,
}

/// CIDR lists keyed by region code
#[derive(Debug, Default)]
pub struct GeoipDb {
    regions: Vec<Region>,
}

impl GeoipDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a directory of `<code>.txt` CIDR lists, or a single file of
    /// `<code> <cidr>` lines
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<GeoipDb, GeoError> {
        let path = path.as_ref();
        let mut db = GeoipDb::new();
        for_each_line(path, |file, line| {
            let network = line
                .value
                .parse::<IpNetwork>()
                .map_err(|e| GeoError::InvalidEntry {
                    path: file.to_path_buf(),
                    line: line.number,
                    entry: line.value.to_string(),
                    reason: e.to_string(),
                })?;
            db.insert(line.code, network);
            Ok(())
        })?;
        db.normalize();
        debug!(
            "loaded {} geoip codes from {}",
            db.regions.len(),
            path.display()
        );
        Ok(db)
    }

    /// Adds a network to the region, call `normalize` once done inserting
    pub fn insert(&mut self, code: &str, network: IpNetwork) {
        let code = code.to_lowercase();
        let region = match self.regions.iter().position(|r| r.code == code) {
            Some(idx) => &mut self.regions[idx],
            None => {
                self.regions.push(Region {
                    code,
                    v4: RangeSet::new(),
                    v6: RangeSet::new(),
                });
                let last = self.regions.len() - 1;
                &mut self.regions[last]
            }
        };
        match network {
            IpNetwork::V4(net) => {
                let mask = u32::MAX.checked_shl(32 - net.prefix() as u32).unwrap_or(0);
                let start = u32::from(net.ip()) & mask;
                region.v4.push(start, start | !mask);
            }
            IpNetwork::V6(net) => {
                let mask = u128::MAX.checked_shl(128 - net.prefix() as u32).unwrap_or(0);
                let start = u128::from(net.ip()) & mask;
                region.v6.push(start, start | !mask);
            }
        }
    }

    pub fn normalize(&mut self) {
        for region in &mut self.regions {
            region.v4.normalize();
            region.v6.normalize();
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.regions.iter().map(|r| r.code.as_str())
    }
}

impl GeoipLookup for GeoipDb {
    fn lookup_codes(&self, ip: IpAddr) -> Vec<&str> {
        let codes = self
            .regions
            .iter()
            .filter(|region| match ip {
                IpAddr::V4(ip) => region.v4.contains(u32::from(ip)),
                IpAddr::V6(ip) => region.v6.contains(u128::from(ip)),
            })
            .map(|region| region.code.as_str())
            .collect::<Vec<_>>();
        trace!("geoip {} -> {:?}", ip, codes);
        codes
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

    use super::{GeoipDb, GeoipLookup, RangeSet};

    fn v4(a: u8, b: u8, c: u8, d: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(a, b, c, d))
    }

    #[test]
    fn range_set_merges_overlaps() {
        let mut set = RangeSet::new();
        set.push(10u32, 20);
        set.push(15, 30);
        set.push(40, 50);
        set.normalize();
        assert_eq!(set.ranges, vec![(10, 30), (40, 50)]);
        assert!(set.contains(10));
        assert!(set.contains(30));
        assert!(!set.contains(35));
        assert!(set.contains(50));
        assert!(!set.contains(9));
        assert!(!set.contains(51));
    }

    #[test]
    fn lookup_overlapping_regions() {
        let mut db = GeoipDb::new();
        db.insert("cn", "1.0.1.0/24".parse().unwrap());
        db.insert("cn", "1.0.2.0/23".parse().unwrap());
        db.insert("private", "10.0.0.0/8".parse().unwrap());
        db.insert("lab", "1.0.1.128/25".parse().unwrap());
        db.normalize();

        assert_eq!(db.lookup_codes(v4(1, 0, 1, 7)), vec!["cn"]);
        assert_eq!(db.lookup_codes(v4(1, 0, 1, 200)), vec!["cn", "lab"]);
        assert_eq!(db.lookup_codes(v4(1, 0, 3, 255)), vec!["cn"]);
        assert_eq!(db.lookup_codes(v4(10, 20, 30, 40)), vec!["private"]);
        assert!(db.lookup_codes(v4(8, 8, 8, 8)).is_empty());
    }

    #[test]
    fn host_bits_and_default_route() {
        let mut db = GeoipDb::new();
        db.insert("net", "192.168.1.77/24".parse().unwrap());
        db.insert("any", "0.0.0.0/0".parse().unwrap());
        db.normalize();

        assert_eq!(db.lookup_codes(v4(192, 168, 1, 1)), vec!["net", "any"]);
        assert_eq!(db.lookup_codes(v4(255, 255, 255, 255)), vec!["any"]);
    }

    #[test]
    fn ipv6_ranges() {
        let mut db = GeoipDb::new();
        db.insert("cn", "240e::/20".parse().unwrap());
        db.normalize();

        let inside = IpAddr::V6("240e:f7:a000::1".parse::<Ipv6Addr>().unwrap());
        let outside = IpAddr::V6("2001:db8::1".parse::<Ipv6Addr>().unwrap());
        assert_eq!(db.lookup_codes(inside), vec!["cn"]);
        assert!(db.lookup_codes(outside).is_empty());
        assert!(db.lookup_codes(v4(36, 0, 0, 1)).is_empty());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("cn.txt"), "# mainland\n1.0.1.0/24\n240e::/20\n").unwrap();
        fs::write(dir.path().join("private.txt"), "10.0.0.0/8\n").unwrap();

        let db = GeoipDb::from_path(dir.path()).unwrap();
        assert_eq!(db.codes().collect::<Vec<_>>(), vec!["cn", "private"]);
        assert_eq!(db.lookup_codes(v4(1, 0, 1, 1)), vec!["cn"]);
    }

    #[test]
    fn invalid_cidr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("geoip.txt");
        fs::write(&path, "cn 1.0.1.0/24\ncn 1.0.1.0/33\n").unwrap();

        let err = GeoipDb::from_path(&path).unwrap_err().to_string();
        assert!(err.contains("geoip.txt:2"), "{}", err);
    }
}
