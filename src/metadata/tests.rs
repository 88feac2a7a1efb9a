use super::*;
use crate::library::Track;
use std::path::Path;

fn frame(id: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(id);
    out.extend_from_slice(&(body.len() as u32).to_be_bytes());
    out.extend_from_slice(&[0, 0]);
    out.extend_from_slice(body);
    out
}

fn tag(frames: &[Vec<u8>]) -> Vec<u8> {
    let body: Vec<u8> = frames.concat();
    let size = body.len();
    let mut out = b"ID3".to_vec();
    out.extend_from_slice(&[3, 0, 0]);
    out.extend_from_slice(&[
        ((size >> 21) & 0x7f) as u8,
        ((size >> 14) & 0x7f) as u8,
        ((size >> 7) & 0x7f) as u8,
        (size & 0x7f) as u8,
    ]);
    out.extend_from_slice(&body);
    // Trailing audio data so the tag is not at the very end of the buffer.
    out.extend_from_slice(&[0xff; 16]);
    out
}

#[test]
fn latin1_title_and_artist() {
    let bytes = tag(&[
        frame(b"TIT2", b"\x00Caf\xe9\x00junk"),
        frame(b"TPE1", b"\x00Band"),
    ]);
    let meta = parse_id3v2(&bytes);
    assert_eq!(meta.title.as_deref(), Some("Café"));
    assert_eq!(meta.artist.as_deref(), Some("Band"));
}

#[test]
fn utf8_frame_stops_at_terminator() {
    let bytes = tag(&[frame(b"TIT2", "\u{3}Ünïcode\u{0}rest".as_bytes())]);
    let meta = parse_id3v2(&bytes);
    assert_eq!(meta.title.as_deref(), Some("Ünïcode"));
    assert_eq!(meta.artist, None);
}

#[test]
fn utf16_with_bom_in_both_byte_orders() {
    let mut le = vec![1u8, 0xff, 0xfe];
    for u in "Hi".encode_utf16() {
        le.extend_from_slice(&u.to_le_bytes());
    }
    le.extend_from_slice(&[0, 0, b'x', 0]);

    let mut be = vec![1u8, 0xfe, 0xff];
    for u in "Yo".encode_utf16() {
        be.extend_from_slice(&u.to_be_bytes());
    }

    let meta = parse_id3v2(&tag(&[frame(b"TIT2", &le), frame(b"TPE1", &be)]));
    assert_eq!(meta.title.as_deref(), Some("Hi"));
    assert_eq!(meta.artist.as_deref(), Some("Yo"));
}

#[test]
fn unsupported_encoding_degrades_to_empty() {
    let bytes = tag(&[
        frame(b"TPE1", b"\x00Band"),
        frame(b"TIT2", b"\x02\x00T"),
    ]);
    assert_eq!(parse_id3v2(&bytes), TrackMetadata::default());
}

#[test]
fn missing_signature_and_short_buffers_are_empty() {
    assert_eq!(parse_id3v2(b""), TrackMetadata::default());
    assert_eq!(parse_id3v2(b"ID3"), TrackMetadata::default());
    assert_eq!(parse_id3v2(b"RIFF0000WAVEfmt "), TrackMetadata::default());
}

#[test]
fn frame_past_declared_size_stops_walk() {
    let mut bytes = tag(&[frame(b"TIT2", b"\x00First")]);
    // Append a frame after the declared tag size; it must be ignored.
    let extra = frame(b"TPE1", b"\x00Outside");
    let insert_at = bytes.len() - 16;
    bytes.splice(insert_at..insert_at, extra);

    let meta = parse_id3v2(&bytes);
    assert_eq!(meta.title.as_deref(), Some("First"));
    assert_eq!(meta.artist, None);
}

#[test]
fn truncated_buffer_does_not_panic() {
    let bytes = tag(&[frame(b"TIT2", b"\x00A long enough title")]);
    for cut in 0..bytes.len() {
        let _ = parse_id3v2(&bytes[..cut]);
    }
}

#[test]
fn display_title_falls_back_to_file_stem() {
    let with_both = TrackMetadata {
        title: Some("Song".into()),
        artist: Some("Band".into()),
    };
    assert_eq!(display_title("x.mp3", &with_both), "Song - Band");
    assert_eq!(display_title("x.mp3", &TrackMetadata::default()), "x");
}

#[test]
fn cache_memoizes_per_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.mp3");
    std::fs::write(&path, tag(&[frame(b"TIT2", b"\x00Before")])).unwrap();

    let track = Track::from_path(&path, None);
    let mut cache = MetadataCache::new();
    assert_eq!(cache.extract(&track).title.as_deref(), Some("Before"));

    std::fs::write(&path, tag(&[frame(b"TIT2", b"\x00After")])).unwrap();
    assert_eq!(cache.extract(&track).title.as_deref(), Some("Before"));
    assert_eq!(cache.label(&track), "Before");
}

#[test]
fn unreadable_file_yields_empty_metadata() {
    let track = Track::from_path(Path::new("/definitely/not/here.mp3"), None);
    let mut cache = MetadataCache::new();
    assert_eq!(cache.extract(&track), &TrackMetadata::default());
    assert_eq!(cache.label(&track), "here");
}
