use byteorder::{BigEndian, ByteOrder};

use super::header::HEADER_SIZE;
use super::{Class, Error, Header, Name, OptRecord, Packet, QueryClass, QueryType, Question};
use super::{RRData, ResourceRecord, Type};

impl<'a> Packet<'a> {
    /// Parse a full DNS Packet and return a structure that has all the
    /// data borrowed from the passed buffer.
    ///
    /// Bytes following the last record announced by the header are ignored.
    pub fn parse(data: &'a [u8]) -> Result<Packet<'a>, Error> {
        let header = Header::parse(data)?;
        let mut offset = HEADER_SIZE;

        let mut questions = Vec::with_capacity(header.questions as usize);
        for _ in 0..header.questions {
            let (qname, len) = Name::scan(data, offset)?;
            offset += len;
            if offset + 4 > data.len() {
                return Err(Error::UnexpectedEOF);
            }
            let qtype = QueryType::from(BigEndian::read_u16(&data[offset..offset + 2]));
            let qclass = QueryClass::from(BigEndian::read_u16(&data[offset + 2..offset + 4]));
            offset += 4;
            questions.push(Question {
                qname,
                qtype,
                qclass,
            });
        }

        let mut answers = Vec::with_capacity(header.answers as usize);
        for _ in 0..header.answers {
            answers.push(parse_record(data, &mut offset)?);
        }

        let mut nameservers = Vec::with_capacity(header.nameservers as usize);
        for _ in 0..header.nameservers {
            nameservers.push(parse_record(data, &mut offset)?);
        }

        let mut additional = Vec::with_capacity(header.additional as usize);
        let mut opt = None;
        for _ in 0..header.additional {
            let raw = RawRecord::read(data, &mut offset)?;
            if raw.typ == Type::OPT {
                if opt.is_some() {
                    return Err(Error::WrongOptRecord);
                }
                opt = Some(raw.into_opt(data)?);
            } else {
                additional.push(raw.into_record(data)?);
            }
        }

        Ok(Packet {
            header,
            questions,
            answers,
            nameservers,
            additional,
            opt,
        })
    }
}

/// Fixed part of a resource record, RDATA not interpreted yet
struct RawRecord<'a> {
    name: Name<'a>,
    typ: Type,
    cls: u16,
    ttl: u32,
    rdata_start: usize,
    rdata_len: usize,
}

impl<'a> RawRecord<'a> {
    fn read(data: &'a [u8], offset: &mut usize) -> Result<RawRecord<'a>, Error> {
        let (name, len) = Name::scan(data, *offset)?;
        *offset += len;
        if *offset + 10 > data.len() {
            return Err(Error::UnexpectedEOF);
        }
        let fixed = &data[*offset..*offset + 10];
        let typ = Type::from(BigEndian::read_u16(&fixed[0..2]));
        let cls = BigEndian::read_u16(&fixed[2..4]);
        let ttl = BigEndian::read_u32(&fixed[4..8]);
        let rdata_len = BigEndian::read_u16(&fixed[8..10]) as usize;
        *offset += 10;
        let rdata_start = *offset;
        if rdata_start + rdata_len > data.len() {
            return Err(Error::UnexpectedEOF);
        }
        *offset += rdata_len;
        Ok(RawRecord {
            name,
            typ,
            cls,
            ttl,
            rdata_start,
            rdata_len,
        })
    }

    fn into_record(self, data: &'a [u8]) -> Result<ResourceRecord<'a>, Error> {
        Ok(ResourceRecord {
            name: self.name,
            cls: Class::from(self.cls),
            ttl: self.ttl,
            data: RRData::parse(self.typ, data, self.rdata_start, self.rdata_len)?,
        })
    }

    fn into_opt(self, data: &'a [u8]) -> Result<OptRecord<'a>, Error> {
        if !self.name.is_root() {
            return Err(Error::WrongOptRecord);
        }
        Ok(OptRecord {
            udp: self.cls,
            extrcode: (self.ttl >> 24) as u8,
            version: (self.ttl >> 16) as u8,
            dnssec_ok: self.ttl & 0x8000 != 0,
            options: &data[self.rdata_start..self.rdata_start + self.rdata_len],
        })
    }
}

fn parse_record<'a>(data: &'a [u8], offset: &mut usize) -> Result<ResourceRecord<'a>, Error> {
    RawRecord::read(data, offset)?.into_record(data)
}
