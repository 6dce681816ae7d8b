//! Read-only parser for DNS messages in RFC 1035 wire format
//!
//! Everything borrows from the input buffer: names are kept as slices of the
//! packet and only rendered to text on demand, so a parsed `Packet` lives no
//! longer than the bytes it was parsed from.

mod enums;
mod error;
mod header;
mod name;
mod parser;
mod rrdata;
mod structs;

pub use self::enums::{Class, Opcode, QueryClass, QueryType, ResponseCode, Type};
pub use self::error::Error;
pub use self::header::Header;
pub use self::name::{Labels, Name};
pub use self::rrdata::RRData;
pub use self::structs::{OptRecord, Packet, Question, ResourceRecord};
