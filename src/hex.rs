//! Loading hexadecimal text into a byte buffer.
//!
//! Input files carry the data to decode as pairs of hexadecimal digits
//! with arbitrary interspersed whitespace. This module turns such text
//! into the raw bytes, fully materialized in memory before decoding
//! starts.

use std::{error, fmt, fs, io};
use std::path::Path;
use bytes::Bytes;
use log::debug;


//------------ read_file -----------------------------------------------------

/// Reads a file of hexadecimal text into the bytes it describes.
pub fn read_file(path: impl AsRef<Path>) -> Result<Bytes, LoadError> {
    let path = path.as_ref();
    let text = fs::read(path).map_err(|err| {
        LoadError::File { path: path.display().to_string(), err }
    })?;
    let res = decode(&text)?;
    debug!("loaded {} octets from {}", res.len(), path.display());
    Ok(res)
}


//------------ decode --------------------------------------------------------

/// Decodes hexadecimal text into the bytes it describes.
///
/// Whitespace anywhere in the text is ignored. Any other character that is
/// not a hexadecimal digit is refused, as is a text with an odd number of
/// digits overall.
pub fn decode(text: &[u8]) -> Result<Bytes, LoadError> {
    let mut buf = Vec::with_capacity(text.len() / 2);
    let mut pending = None;
    let mut nibbles = 0;
    for (pos, &chr) in text.iter().enumerate() {
        if is_space(chr) {
            continue
        }
        let nibble = match hex_value(chr) {
            Some(nibble) => nibble,
            None => return Err(LoadError::InvalidCharacter { chr, pos }),
        };
        nibbles += 1;
        match pending.take() {
            Some(high) => buf.push(high << 4 | nibble),
            None => pending = Some(nibble),
        }
    }
    if pending.is_some() {
        return Err(LoadError::OddNibbleCount { nibbles })
    }
    Ok(buf.into())
}

/// Returns whether the character counts as whitespace.
///
/// ASCII whitespace, including the vertical tab.
fn is_space(chr: u8) -> bool {
    matches!(chr, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

/// Returns the value of a hexadecimal digit.
fn hex_value(chr: u8) -> Option<u8> {
    match chr {
        b'0'..=b'9' => Some(chr - b'0'),
        b'a'..=b'f' => Some(chr - b'a' + 10),
        b'A'..=b'F' => Some(chr - b'A' + 10),
        _ => None,
    }
}


//------------ LoadError -----------------------------------------------------

/// An error happened while loading hexadecimal text.
#[derive(Debug)]
pub enum LoadError {
    /// The file could not be read.
    File {
        /// The path of the file.
        path: String,

        /// The underlying error.
        err: io::Error,
    },

    /// The text contains a character that is neither digit nor whitespace.
    InvalidCharacter {
        /// The offending character.
        chr: u8,

        /// Its byte offset in the text.
        pos: usize,
    },

    /// The text contains an odd number of hexadecimal digits.
    OddNibbleCount {
        /// The number of digits read.
        nibbles: usize,
    },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            LoadError::File { ref path, ref err } => {
                write!(f, "Error opening file {}: {}", path, err)
            }
            LoadError::InvalidCharacter { chr, pos } => {
                write!(f, "Forbidden character code {:x} at {}", chr, pos)
            }
            LoadError::OddNibbleCount { nibbles } => {
                write!(f, "Number of nibbles read is odd ({})", nibbles)
            }
        }
    }
}

impl error::Error for LoadError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match *self {
            LoadError::File { ref err, .. } => Some(err),
            _ => None
        }
    }
}


//============ Tests =========================================================
