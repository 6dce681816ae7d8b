use std::fs;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD, Engine};
use byteorder::{BigEndian, WriteBytesExt};
use tempfile::TempDir;

use geolog_domains::{Config, ConfigError, Error};

const TYPE_A: u16 = 1;
const TYPE_AAAA: u16 = 28;

fn write_name(buf: &mut Vec<u8>, domain: &str) {
    for label in domain.split('.') {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
}

/// Base64 of a response to `qname` carrying one A record per address
fn answer(qname: &str, qtype: u16, addrs: &[Ipv4Addr]) -> String {
    let mut wire = Vec::new();
    write_name(&mut wire, qname);
    answer_for_wire_name(&wire, qtype, addrs)
}

/// Same as `answer`, the question name given in wire format
fn answer_for_wire_name(qname: &[u8], qtype: u16, addrs: &[Ipv4Addr]) -> String {
    let mut buf = Vec::new();
    buf.write_u16::<BigEndian>(0x1234).unwrap();
    buf.write_u16::<BigEndian>(0x8180).unwrap();
    buf.write_u16::<BigEndian>(1).unwrap();
    buf.write_u16::<BigEndian>(addrs.len() as u16).unwrap();
    buf.write_u16::<BigEndian>(0).unwrap();
    buf.write_u16::<BigEndian>(0).unwrap();
    buf.extend_from_slice(qname);
    buf.write_u16::<BigEndian>(qtype).unwrap();
    buf.write_u16::<BigEndian>(1).unwrap();
    for addr in addrs {
        buf.write_u16::<BigEndian>(0xc00c).unwrap();
        buf.write_u16::<BigEndian>(TYPE_A).unwrap();
        buf.write_u16::<BigEndian>(1).unwrap();
        buf.write_u32::<BigEndian>(300).unwrap();
        buf.write_u16::<BigEndian>(4).unwrap();
        buf.extend_from_slice(&addr.octets());
    }
    STANDARD.encode(buf)
}

fn entry(qname: &str, qtype: u16, addrs: &[Ipv4Addr]) -> String {
    format!(
        r#"{{"T":"2024-03-01T08:00:00.000000+08:00","QH":"{}","QT":"{}","QC":"IN","Answer":"{}","Result":{{}},"Elapsed":1203456,"Upstream":"https://dns.example/dns-query"}}"#,
        qname,
        if qtype == TYPE_A { "A" } else { "AAAA" },
        answer(qname, qtype, addrs)
    )
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    /// geosite: `domestic` lists example.cn and shop.cn, `ads` lists
    /// tracker.cn; geoip: `domestic` is 1.0.1.0/24, `private` is 1.0.1.128/25
    fn new() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("geosite")).unwrap();
        fs::write(
            dir.path().join("geosite/domestic.txt"),
            "example.cn\nshop.cn\n",
        )
        .unwrap();
        fs::write(dir.path().join("geosite/ads.txt"), "full:tracker.cn\n").unwrap();
        fs::write(
            dir.path().join("geoip.txt"),
            "domestic 1.0.1.0/24\nprivate 1.0.1.128/25\n",
        )
        .unwrap();
        Fixture { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write_log(&self, entries: &[String]) {
        let mut log = entries.join("\n");
        log.push('\n');
        fs::write(self.path("querylog.json"), log).unwrap();
    }

    fn write_raw_log(&self, lines: &[&[u8]]) {
        let mut log = Vec::new();
        for line in lines {
            log.extend_from_slice(line);
            log.push(b'\n');
        }
        fs::write(self.path("querylog.json"), log).unwrap();
    }

    /// Config with the fixture paths and the given policy tables
    fn config(&self, policy: &str) -> Config {
        let dir = self.dir.path().display();
        format!(
            "[querylog]\npath = '{dir}/querylog.json'\n\
             [output]\npath = '{dir}/domains.txt'\n\
             {policy}",
            dir = dir,
            policy = policy
        )
        .replace("GEOSITE", &format!("[geosite]\npath = '{}/geosite'", dir))
        .replace("GEOIP", &format!("[geoip]\npath = '{}/geoip.txt'", dir))
        .parse()
        .unwrap()
    }

    fn output(&self) -> Option<String> {
        fs::read_to_string(self.path("domains.txt")).ok()
    }
}

const DOMESTIC: &str = "GEOSITE\nGEOIP\ninclude_codes = ['domestic']\n";

fn addr(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(1, 0, 1, last)
}

#[test]
fn accepted_domain_is_written() {
    let fx = Fixture::new();
    fx.write_log(&[entry("www.example.cn", TYPE_A, &[addr(1)])]);

    let outcome = geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(outcome.stats.accepted, 1);
    assert_eq!(fx.output().unwrap(), "www.example.cn\n");
}

#[test]
fn geosite_exclusion_empties_output() {
    let fx = Fixture::new();
    fx.write_log(&[entry("www.example.cn", TYPE_A, &[addr(1)])]);

    let config = fx.config(
        "GEOSITE\nexclude_codes = ['domestic']\nGEOIP\ninclude_codes = ['domestic']\n",
    );
    geolog_domains::run(&config).unwrap();
    assert_eq!(fx.output().unwrap(), "");
}

#[test]
fn repeated_domain_is_written_once() {
    let fx = Fixture::new();
    fx.write_log(&[
        entry("example.cn", TYPE_A, &[addr(1)]),
        entry("example.cn", TYPE_A, &[addr(2)]),
    ]);

    let outcome = geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(outcome.stats.accepted, 2);
    assert_eq!(fx.output().unwrap(), "example.cn\n");
}

#[test]
fn entry_without_a_question_contributes_nothing() {
    let fx = Fixture::new();
    fx.write_log(&[entry("example.cn", TYPE_AAAA, &[])]);

    let outcome = geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(outcome.stats.no_question, 1);
    assert_eq!(outcome.stats.malformed, 0);
    assert_eq!(fx.output().unwrap(), "");
}

#[test]
fn first_acceptance_order_is_kept() {
    let fx = Fixture::new();
    fx.write_log(&[
        entry("b.shop.cn", TYPE_A, &[addr(1)]),
        entry("a.example.cn", TYPE_A, &[addr(2)]),
        entry("b.shop.cn", TYPE_A, &[addr(3)]),
        entry("foreign.example", TYPE_A, &[Ipv4Addr::new(93, 184, 216, 34)]),
        entry("c.example.cn", TYPE_A, &[addr(4)]),
    ]);

    let outcome = geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(outcome.stats.geoip_rejected, 1);
    assert_eq!(
        fx.output().unwrap(),
        "b.shop.cn\na.example.cn\nc.example.cn\n"
    );
}

#[test]
fn any_matching_answer_accepts() {
    let fx = Fixture::new();
    fx.write_log(&[entry(
        "cdn.example.cn",
        TYPE_A,
        &[Ipv4Addr::new(8, 8, 8, 8), addr(5)],
    )]);

    geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(fx.output().unwrap(), "cdn.example.cn\n");
}

#[test]
fn geoip_exclusion_beats_inclusion() {
    let fx = Fixture::new();
    fx.write_log(&[
        entry("lan.example.cn", TYPE_A, &[addr(200)]),
        entry("www.example.cn", TYPE_A, &[addr(20)]),
    ]);

    let config = fx.config(
        "GEOSITE\nGEOIP\ninclude_codes = ['domestic']\nexclude_codes = ['private']\n",
    );
    geolog_domains::run(&config).unwrap();
    assert_eq!(fx.output().unwrap(), "www.example.cn\n");
}

#[test]
fn geosite_rejection_is_final() {
    let fx = Fixture::new();
    fx.write_log(&[
        entry("tracker.cn", TYPE_A, &[addr(1)]),
        entry("tracker.cn", TYPE_A, &[addr(2)]),
        entry("static.internal.cn", TYPE_A, &[addr(3)]),
    ]);

    let config = fx.config(
        "GEOSITE\nexclude_codes = ['ADS']\nexclude_domains = ['.internal.cn']\n\
         GEOIP\ninclude_codes = ['domestic']\n",
    );
    let outcome = geolog_domains::run(&config).unwrap();
    assert_eq!(outcome.stats.geosite_rejected, 3);
    assert_eq!(fx.output().unwrap(), "");
}

#[test]
fn malformed_line_is_skipped() {
    let fx = Fixture::new();
    fx.write_log(&[
        "{\"QH\":".to_string(),
        entry("example.cn", TYPE_A, &[addr(1)]),
    ]);

    let outcome = geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(outcome.stats.malformed, 1);
    assert_eq!(fx.output().unwrap(), "example.cn\n");
}

#[test]
fn undecodable_answer_writes_nothing() {
    let fx = Fixture::new();
    fx.write_log(&[
        entry("example.cn", TYPE_A, &[addr(1)]),
        r#"{"QH":"broken.cn","QT":"A","Answer":"***"}"#.to_string(),
    ]);

    match geolog_domains::run(&fx.config(DOMESTIC)) {
        Err(Error::Base64 { entry, .. }) => assert_eq!(entry, 2),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(fx.output(), None);
}

#[test]
fn invalid_dns_message_writes_nothing() {
    let fx = Fixture::new();
    fx.write_log(&[
        entry("example.cn", TYPE_A, &[addr(1)]),
        r#"{"QH":"short.cn","QT":"A","Answer":"AAE="}"#.to_string(),
    ]);

    match geolog_domains::run(&fx.config(DOMESTIC)) {
        Err(Error::Dns { entry, .. }) => assert_eq!(entry, 2),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(fx.output(), None);
}

#[test]
fn invalid_utf8_only_affects_its_line() {
    let fx = Fixture::new();
    let first = entry("example.cn", TYPE_A, &[addr(1)]);
    let mut third = b"{\"Client\":\"\xff".to_vec();
    third.extend_from_slice(
        format!(
            r#"","QH":"shop.cn","QT":"A","Answer":"{}"}}"#,
            answer("shop.cn", TYPE_A, &[addr(2)])
        )
        .as_bytes(),
    );

    fx.write_raw_log(&[first.as_bytes(), &b"\xff\xfe{"[..], third.as_slice()]);

    let outcome = geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(outcome.stats.entries, 3);
    assert_eq!(outcome.stats.malformed, 1);
    assert_eq!(fx.output().unwrap(), "example.cn\nshop.cn\n");
}

#[test]
fn binary_label_does_not_stop_the_run() {
    let fx = Fixture::new();
    let odd = format!(
        r#"{{"QH":"b.example.cn","QT":"A","Answer":"{}"}}"#,
        answer_for_wire_name(b"\x03b\xffd\x07example\x02cn\x00", TYPE_A, &[addr(1)])
    );
    fx.write_log(&[entry("shop.cn", TYPE_A, &[addr(2)]), odd]);

    let outcome = geolog_domains::run(&fx.config(DOMESTIC)).unwrap();
    assert_eq!(outcome.stats.accepted, 2);
    assert_eq!(fx.output().unwrap(), "shop.cn\nb\\255d.example.cn\n");
}

#[test]
fn missing_output_path_is_fatal() {
    let fx = Fixture::new();
    let config: Config = format!(
        "[querylog]\npath = '{0}/querylog.json'\n\
         [geosite]\npath = '{0}/geosite'\n\
         [geoip]\npath = '{0}/geoip.txt'\n",
        fx.dir.path().display()
    )
    .parse()
    .unwrap();

    match geolog_domains::run(&config) {
        Err(Error::Config(ConfigError::MissingOutputPath)) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn missing_log_is_fatal() {
    let fx = Fixture::new();

    match geolog_domains::run(&fx.config(DOMESTIC)) {
        Err(Error::ReadLog { path, .. }) => {
            assert_eq!(path, Path::new(&fx.path("querylog.json")))
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(fx.output(), None);
}
