//! Ogg/Opus comment parsing and duration estimation
//!
//! Ogg page structure (capture pattern "OggS", then version, header type,
//! and an 8-byte little-endian granule position) and the `OpusTags`
//! comment header layout:
//!
//! ```text
//! "OpusTags"
//! vendor_length   (u32 LE)
//! vendor_string   (vendor_length bytes, skipped)
//! comment_count   (u32 LE)
//! comment_count × { length (u32 LE), "KEY=value" (length bytes, UTF-8) }
//! ```
//!
//! Both functions truncate gracefully: a declared length that would read
//! past the buffer ends the scan, and whatever was parsed so far is
//! returned.

use super::EmbeddedTags;
use memchr::memmem;

/// Ogg page capture pattern.
const OGG_CAPTURE_PATTERN: &[u8] = b"OggS";

/// Marker opening the Opus comment header.
const OPUS_TAGS_MARKER: &[u8] = b"OpusTags";

/// Offset of the granule position within an Ogg page header
/// (after capture pattern, version, and header type).
const GRANULE_OFFSET: usize = 6;

/// Opus granule positions count samples at a fixed 48 kHz clock.
const OPUS_SAMPLE_RATE: f64 = 48_000.0;

/// Largest granule value converted to `f64` without precision loss (2^53-1).
const MAX_SAFE_GRANULE: u64 = (1 << 53) - 1;

/// Parse the `OpusTags` comment block found in the head of an Opus file.
///
/// Returns `None` when the marker is absent (the caller falls back to the
/// filename heuristic); otherwise returns the recognized fields, first
/// occurrence winning per key.
pub fn parse_comments(buf: &[u8]) -> Option<EmbeddedTags> {
    let marker = memmem::find(buf, OPUS_TAGS_MARKER)?;
    let mut pos = marker + OPUS_TAGS_MARKER.len();

    // Vendor string: length-prefixed, skipped.
    let vendor_len = read_le_u32(buf, pos)? as usize;
    pos = pos.checked_add(4)?.checked_add(vendor_len)?;

    let comment_count = read_le_u32(buf, pos)? as usize;
    pos += 4;

    let mut tags = EmbeddedTags::default();
    // DATE is preferred over YEAR when both occur; track them separately.
    let mut date: Option<String> = None;
    let mut year: Option<String> = None;

    for _ in 0..comment_count {
        let len = match read_le_u32(buf, pos) {
            Some(len) => len as usize,
            None => break,
        };
        pos += 4;
        let comment = match buf.get(pos..pos + len) {
            Some(bytes) => bytes,
            None => break, // declared length runs past the buffer
        };
        pos += len;

        let Some(eq) = memchr::memchr(b'=', comment) else {
            continue;
        };
        let key = String::from_utf8_lossy(&comment[..eq]).to_uppercase();
        let value = String::from_utf8_lossy(&comment[eq + 1..]).into_owned();

        let slot = match key.as_str() {
            "TITLE" => &mut tags.title,
            "ARTIST" => &mut tags.artist,
            "ALBUM" => &mut tags.album,
            "DATE" => &mut date,
            "YEAR" => &mut year,
            "GENRE" => &mut tags.genre,
            _ => continue,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    tags.year = date.or(year);
    Some(tags)
}

/// Estimate duration in seconds from the tail of an Opus file.
///
/// The final Ogg page carries the stream's total granule position, a
/// sample count at 48 kHz. Returns `None` when no page header is found or
/// the granule field is truncated.
pub fn estimate_duration(tail: &[u8]) -> Option<f64> {
    let page = memmem::rfind(tail, OGG_CAPTURE_PATTERN)?;
    let granule_pos = page + GRANULE_OFFSET;
    let bytes: [u8; 8] = tail.get(granule_pos..granule_pos + 8)?.try_into().ok()?;
    let granule = u64::from_le_bytes(bytes).min(MAX_SAFE_GRANULE);
    Some(granule as f64 / OPUS_SAMPLE_RATE)
}

/// Little-endian u32 at `pos`, or `None` when out of bounds.
fn read_le_u32(buf: &[u8], pos: usize) -> Option<u32> {
    let bytes: [u8; 4] = buf.get(pos..pos + 4)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}
