use std::fmt;
use std::fmt::Write;

use byteorder::{BigEndian, ByteOrder};

use super::Error;

const POINTER_MASK: u8 = 0b1100_0000;

/// The DNS name as stored in the original packet
///
/// This contains just the offset of the name inside the packet, labels are
/// read on demand and compression pointers are followed transparently.
/// Labels may contain any octet. You may turn this into a string using
/// `.to_string()`, which renders the name without the trailing root dot and
/// escapes label bytes in presentation format (`\.`, `\DDD`).
#[derive(Clone, Copy)]
pub struct Name<'a> {
    start: usize,
    /// The whole packet, compression pointers are offsets into this buffer
    original: &'a [u8],
}

impl<'a> Name<'a> {
    /// Validates the name starting at `start` and returns it together with
    /// the number of bytes it occupies at that position
    ///
    /// A compression pointer has to point before the start of the name that
    /// contains it, which rules out pointer loops.
    pub fn scan(original: &'a [u8], start: usize) -> Result<(Name<'a>, usize), Error> {
        let mut pos = start;
        loop {
            let byte = *original.get(pos).ok_or(Error::UnexpectedEOF)?;
            if byte == 0 {
                return Ok((Name { start, original }, pos + 1 - start));
            } else if byte & POINTER_MASK == POINTER_MASK {
                if original.len() < pos + 2 {
                    return Err(Error::UnexpectedEOF);
                }
                let off = (BigEndian::read_u16(&original[pos..pos + 2]) & !0b1100_0000_0000_0000)
                    as usize;
                if off >= start {
                    return Err(Error::BadPointer(off));
                }
                Name::scan(original, off)?;
                return Ok((Name { start, original }, pos + 2 - start));
            } else if byte & POINTER_MASK == 0 {
                let end = pos + byte as usize + 1;
                if end >= original.len() {
                    return Err(Error::UnexpectedEOF);
                }
                pos = end;
            } else {
                return Err(Error::UnknownLabelFormat);
            }
        }
    }

    pub fn labels(&self) -> Labels<'a> {
        Labels {
            pos: self.start,
            original: self.original,
        }
    }

    /// `true` for the root name, which has no labels
    pub fn is_root(&self) -> bool {
        self.labels().next().is_none()
    }
}

/// Iterator over the labels of a `Name`, most specific first
pub struct Labels<'a> {
    pos: usize,
    original: &'a [u8],
}

impl<'a> Iterator for Labels<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        loop {
            let byte = *self.original.get(self.pos)?;
            if byte == 0 {
                return None;
            } else if byte & POINTER_MASK == POINTER_MASK {
                let pointer = self.original.get(self.pos..self.pos + 2)?;
                self.pos = (BigEndian::read_u16(pointer) & !0b1100_0000_0000_0000) as usize;
            } else {
                let end = self.pos + byte as usize + 1;
                let label = self.original.get(self.pos + 1..end)?;
                self.pos = end;
                return Some(label);
            }
        }
    }
}

impl<'a> fmt::Display for Name<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for (i, label) in self.labels().enumerate() {
            if i != 0 {
                fmt.write_char('.')?;
            }
            for &byte in label {
                write_label_byte(fmt, byte)?;
            }
        }
        Ok(())
    }
}

fn write_label_byte(fmt: &mut fmt::Formatter, byte: u8) -> fmt::Result {
    match byte {
        b'.' | b' ' | b'\'' | b'@' | b';' | b'(' | b')' | b'"' | b'\\' => {
            fmt.write_char('\\')?;
            fmt.write_char(byte as char)
        }
        0x21..=0x7e => fmt.write_char(byte as char),
        _ => write!(fmt, "\\{:03}", byte),
    }
}

impl<'a> fmt::Debug for Name<'a> {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_tuple("Name").field(&self.to_string()).finish()
    }
}
