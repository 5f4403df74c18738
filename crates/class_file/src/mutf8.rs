//! The JVM's modified UTF-8 (JVMS §4.4.7). Not plain UTF-8: NUL is encoded
//! as the two-byte sequence `0xC0 0x80`, supplementary characters arrive as
//! CESU-8 surrogate pairs of two 3-byte sequences, and no byte may be zero
//! or lie in `0xF0..=0xFF`.

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub(crate) enum Mutf8Error {
    #[error("truncated sequence at byte {0}")]
    Truncated(usize),
    #[error("forbidden byte 0x{0:02X} at byte {1}")]
    Forbidden(u8, usize),
    #[error("bad continuation byte at byte {0}")]
    BadContinuation(usize),
}

const REPLACEMENT: char = '\u{fffd}';

pub(crate) fn decode(bytes: &[u8]) -> Result<String, Mutf8Error> {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        match b {
            0x01..=0x7f => {
                out.push(b as char);
                i += 1;
            }
            0x00 | 0xf0..=0xff => return Err(Mutf8Error::Forbidden(b, i)),
            0xc0..=0xdf => {
                let b2 = continuation(bytes, i + 1)?;
                let c = ((b as u32 & 0x1f) << 6) | (b2 as u32 & 0x3f);
                out.push(char::from_u32(c).unwrap_or(REPLACEMENT));
                i += 2;
            }
            0xe0..=0xef => {
                let b2 = continuation(bytes, i + 1)?;
                let b3 = continuation(bytes, i + 2)?;
                let c = ((b as u32 & 0x0f) << 12) | ((b2 as u32 & 0x3f) << 6) | (b3 as u32 & 0x3f);
                if (0xd800..=0xdbff).contains(&c) {
                    if let Some(low) = low_surrogate(bytes, i + 3) {
                        let combined = 0x10000 + ((c - 0xd800) << 10) + (low - 0xdc00);
                        out.push(char::from_u32(combined).unwrap_or(REPLACEMENT));
                        i += 6;
                        continue;
                    }
                    // Unpaired high surrogate
                    out.push(REPLACEMENT);
                } else if (0xdc00..=0xdfff).contains(&c) {
                    // Unpaired low surrogate
                    out.push(REPLACEMENT);
                } else {
                    out.push(char::from_u32(c).unwrap_or(REPLACEMENT));
                }
                i += 3;
            }
            // 0x80..=0xbf: a continuation byte with nothing to continue
            _ => return Err(Mutf8Error::BadContinuation(i)),
        }
    }

    Ok(out)
}

fn continuation(bytes: &[u8], i: usize) -> Result<u8, Mutf8Error> {
    let b = *bytes.get(i).ok_or(Mutf8Error::Truncated(i))?;
    if b & 0xc0 != 0x80 {
        return Err(Mutf8Error::BadContinuation(i));
    }
    Ok(b)
}

/// A 3-byte sequence decoding to a low surrogate, if one starts at `i`.
fn low_surrogate(bytes: &[u8], i: usize) -> Option<u32> {
    let b1 = *bytes.get(i)?;
    let b2 = *bytes.get(i + 1)?;
    let b3 = *bytes.get(i + 2)?;
    if b1 & 0xf0 != 0xe0 || b2 & 0xc0 != 0x80 || b3 & 0xc0 != 0x80 {
        return None;
    }
    let c = ((b1 as u32 & 0x0f) << 12) | ((b2 as u32 & 0x3f) << 6) | (b3 as u32 & 0x3f);
    (0xdc00..=0xdfff).contains(&c).then_some(c)
}

#[cfg(test)]
mod decode_tests {
    use super::*;

    #[test]
    fn it_should_decode_ascii() {
        assert_eq!("hello", decode(b"hello").unwrap());
    }

    #[test]
    fn it_should_decode_the_two_byte_nul_encoding() {
        assert_eq!("a\0b", decode(&[0x61, 0xc0, 0x80, 0x62]).unwrap());
    }

    #[test]
    fn it_should_decode_two_byte_sequences() {
        // U+00E9
        assert_eq!("é", decode(&[0xc3, 0xa9]).unwrap());
    }

    #[test]
    fn it_should_decode_three_byte_sequences() {
        // U+20AC
        assert_eq!("€", decode(&[0xe2, 0x82, 0xac]).unwrap());
    }

    #[test]
    fn it_should_recombine_surrogate_pairs() {
        // U+1F600 as CESU-8: D83D DE00
        assert_eq!(
            "\u{1f600}",
            decode(&[0xed, 0xa0, 0xbd, 0xed, 0xb8, 0x80]).unwrap()
        );
    }

    #[test]
    fn it_should_replace_an_unpaired_surrogate() {
        assert_eq!("\u{fffd}!", decode(&[0xed, 0xa0, 0xbd, 0x21]).unwrap());
    }

    #[test]
    fn it_should_reject_a_raw_nul_byte() {
        assert_eq!(Err(Mutf8Error::Forbidden(0x00, 1)), decode(&[0x61, 0x00]));
    }

    #[test]
    fn it_should_reject_forbidden_high_bytes() {
        assert_eq!(Err(Mutf8Error::Forbidden(0xf0, 0)), decode(&[0xf0, 0x9f]));
    }

    #[test]
    fn it_should_reject_a_truncated_sequence() {
        assert_eq!(Err(Mutf8Error::Truncated(1)), decode(&[0xc3]));
    }

    #[test]
    fn it_should_reject_a_lone_continuation_byte() {
        assert_eq!(Err(Mutf8Error::BadContinuation(0)), decode(&[0x80]));
    }
}
