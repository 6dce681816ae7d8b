use thiserror::Error;

/// Error parsing DNS packet
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("packet is smaller than header size")]
    HeaderTooShort,
    #[error("packet has incomplete data")]
    UnexpectedEOF,
    #[error("wrong (too short or too long) size of RDATA")]
    WrongRdataLength,
    #[error("label in domain name has unknown label format")]
    UnknownLabelFormat,
    #[error("compression pointer to offset {0} does not point backwards")]
    BadPointer(usize),
    #[error("additional OPT record is malformed")]
    WrongOptRecord,
}
