use std::net::{Ipv4Addr, Ipv6Addr};

use byteorder::{BigEndian, ByteOrder};

use super::{Error, Name, Type};

/// The enumeration that represents known types of DNS resource records data
#[derive(Debug, Clone)]
pub enum RRData<'a> {
    CNAME(Name<'a>),
    NS(Name<'a>),
    PTR(Name<'a>),
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    SRV {
        priority: u16,
        weight: u16,
        port: u16,
        target: Name<'a>,
    },
    MX {
        preference: u16,
        exchange: Name<'a>,
    },
    SOA {
        primary_ns: Name<'a>,
        mailbox: Name<'a>,
        serial: u32,
        refresh: u32,
        retry: u32,
        expire: u32,
        minimum_ttl: u32,
    },
    TXT(&'a [u8]),
    /// Anything that can't be parsed, including address records whose
    /// RDATA has the wrong size
    Unknown { typ: Type, data: &'a [u8] },
}

impl<'a> RRData<'a> {
    pub fn typ(&self) -> Type {
        match *self {
            RRData::CNAME(..) => Type::CNAME,
            RRData::NS(..) => Type::NS,
            RRData::PTR(..) => Type::PTR,
            RRData::A(..) => Type::A,
            RRData::AAAA(..) => Type::AAAA,
            RRData::SRV { .. } => Type::SRV,
            RRData::MX { .. } => Type::MX,
            RRData::SOA { .. } => Type::SOA,
            RRData::TXT(..) => Type::TXT,
            RRData::Unknown { typ, .. } => typ,
        }
    }

    /// Parses RDATA found at `original[start..start + len]`
    ///
    /// Names embedded in the data may point anywhere before them in
    /// `original`, but must not run past the end of the RDATA.
    pub fn parse(
        typ: Type,
        original: &'a [u8],
        start: usize,
        len: usize,
    ) -> Result<RRData<'a>, Error> {
        let end = start + len;
        let rdata = original.get(start..end).ok_or(Error::UnexpectedEOF)?;
        let name_at = |pos: usize| -> Result<(Name<'a>, usize), Error> {
            if pos >= end {
                return Err(Error::WrongRdataLength);
            }
            let (name, name_len) = Name::scan(original, pos)?;
            if pos + name_len > end {
                return Err(Error::WrongRdataLength);
            }
            Ok((name, pos + name_len))
        };
        match typ {
            Type::A => {
                if rdata.len() != 4 {
                    return Ok(RRData::Unknown { typ, data: rdata });
                }
                Ok(RRData::A(Ipv4Addr::from(BigEndian::read_u32(rdata))))
            }
            Type::AAAA => {
                if rdata.len() != 16 {
                    return Ok(RRData::Unknown { typ, data: rdata });
                }
                let mut octets = [0u8; 16];
                octets.copy_from_slice(rdata);
                Ok(RRData::AAAA(Ipv6Addr::from(octets)))
            }
            Type::CNAME => Ok(RRData::CNAME(name_at(start)?.0)),
            Type::NS => Ok(RRData::NS(name_at(start)?.0)),
            Type::PTR => Ok(RRData::PTR(name_at(start)?.0)),
            Type::MX => {
                if rdata.len() < 3 {
                    return Err(Error::WrongRdataLength);
                }
                Ok(RRData::MX {
                    preference: BigEndian::read_u16(&rdata[..2]),
                    exchange: name_at(start + 2)?.0,
                })
            }
            Type::SRV => {
                if rdata.len() < 7 {
                    return Err(Error::WrongRdataLength);
                }
                Ok(RRData::SRV {
                    priority: BigEndian::read_u16(&rdata[..2]),
                    weight: BigEndian::read_u16(&rdata[2..4]),
                    port: BigEndian::read_u16(&rdata[4..6]),
                    target: name_at(start + 6)?.0,
                })
            }
            Type::SOA => {
                let (primary_ns, pos) = name_at(start)?;
                let (mailbox, pos) = name_at(pos)?;
                if end - pos != 20 {
                    return Err(Error::WrongRdataLength);
                }
                let counters = &original[pos..end];
                Ok(RRData::SOA {
                    primary_ns,
                    mailbox,
                    serial: BigEndian::read_u32(&counters[..4]),
                    refresh: BigEndian::read_u32(&counters[4..8]),
                    retry: BigEndian::read_u32(&counters[8..12]),
                    expire: BigEndian::read_u32(&counters[12..16]),
                    minimum_ttl: BigEndian::read_u32(&counters[16..20]),
                })
            }
            Type::TXT => Ok(RRData::TXT(rdata)),
            typ => Ok(RRData::Unknown { typ, data: rdata }),
        }
    }
}
