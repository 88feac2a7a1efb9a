//! Minimal ID3v2 walker: just enough to pull `TIT2` (title) and `TPE1`
//! (performer) out of the tag at the start of a file.

use thiserror::Error;

use super::TrackMetadata;

const HEADER_LEN: usize = 10;
const FRAME_HEADER_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Id3Error {
    #[error("truncated frame at byte {0}")]
    Truncated(usize),
    #[error("unsupported text encoding {0:#04x}")]
    UnsupportedEncoding(u8),
}

/// Parse title/artist from an ID3v2 tag. Every failure degrades to empty
/// metadata; callers never see an error.
pub fn parse_id3v2(bytes: &[u8]) -> TrackMetadata {
    match try_parse(bytes) {
        Ok(meta) => meta,
        Err(e) => {
            log::debug!("id3: {e}");
            TrackMetadata::default()
        }
    }
}

fn try_parse(bytes: &[u8]) -> Result<TrackMetadata, Id3Error> {
    let mut meta = TrackMetadata::default();
    if bytes.len() <= HEADER_LEN || &bytes[..3] != b"ID3" {
        return Ok(meta);
    }

    let size = syncsafe(&bytes[6..10]);
    let end = (HEADER_LEN + size).min(bytes.len());
    let mut pos = HEADER_LEN;

    while pos + FRAME_HEADER_LEN < end {
        let id = &bytes[pos..pos + 4];
        let frame_size =
            u32::from_be_bytes([bytes[pos + 4], bytes[pos + 5], bytes[pos + 6], bytes[pos + 7]])
                as usize;
        pos += FRAME_HEADER_LEN;
        if frame_size == 0 || pos + frame_size > end {
            break;
        }

        let body = &bytes[pos..pos + frame_size];
        match id {
            b"TIT2" => meta.title = non_empty(decode_text(body, pos)?),
            b"TPE1" => meta.artist = non_empty(decode_text(body, pos)?),
            _ => {}
        }
        pos += frame_size;
    }

    Ok(meta)
}

/// Decode 28 bits spread over four bytes, high bit of each byte clear.
fn syncsafe(b: &[u8]) -> usize {
    ((b[0] as usize & 0x7f) << 21)
        | ((b[1] as usize & 0x7f) << 14)
        | ((b[2] as usize & 0x7f) << 7)
        | (b[3] as usize & 0x7f)
}

/// Decode a text frame body: one encoding byte, then the string up to its
/// terminator.
fn decode_text(body: &[u8], at: usize) -> Result<String, Id3Error> {
    let (&encoding, text) = body.split_first().ok_or(Id3Error::Truncated(at))?;
    match encoding {
        0 => Ok(until_nul(text).iter().map(|&b| b as char).collect()),
        3 => Ok(String::from_utf8_lossy(until_nul(text)).into_owned()),
        1 => Ok(decode_utf16_bom(text)),
        other => Err(Id3Error::UnsupportedEncoding(other)),
    }
}

fn until_nul(text: &[u8]) -> &[u8] {
    match text.iter().position(|&b| b == 0) {
        Some(n) => &text[..n],
        None => text,
    }
}

fn decode_utf16_bom(text: &[u8]) -> String {
    let (big_endian, payload) = match text {
        [0xfe, 0xff, rest @ ..] => (true, rest),
        [0xff, 0xfe, rest @ ..] => (false, rest),
        _ => (false, text),
    };

    let units = payload
        .chunks_exact(2)
        .map(|c| {
            if big_endian {
                u16::from_be_bytes([c[0], c[1]])
            } else {
                u16::from_le_bytes([c[0], c[1]])
            }
        })
        .take_while(|&u| u != 0);

    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() { None } else { Some(s) }
}
