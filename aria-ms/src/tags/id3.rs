//! ID3v2 text-frame parser
//!
//! Reads the text-information frames needed for display metadata (title,
//! artist, album, year, genre) out of an ID3v2.3 or ID3v2.4 tag at the
//! start of a buffer. Anything else (extended headers, binary frames,
//! pictures) is skipped by size.
//!
//! The parser is total: structural problems (missing signature, truncated
//! frame, oversized declared length) end the frame walk and whatever fields
//! were filled up to that point are returned. It never panics on arbitrary
//! input.

use super::EmbeddedTags;

/// Size of the fixed ID3v2 tag header and of each frame header.
const HEADER_LEN: usize = 10;

/// Parse ID3v2 text frames from the head of `buf`.
///
/// Returns all-`None` fields when `buf` does not start with an "ID3"
/// signature.
pub fn parse(buf: &[u8]) -> EmbeddedTags {
    let mut tags = EmbeddedTags::default();

    if buf.len() < HEADER_LEN || &buf[0..3] != b"ID3" {
        return tags;
    }

    let major_version = buf[3];
    // Tag size is always synchsafe in the header (bytes 6..10).
    let tag_size = synchsafe_u32(&buf[6..10]) as usize;
    let tag_end = HEADER_LEN.saturating_add(tag_size).min(buf.len());

    let mut offset = HEADER_LEN;
    while offset + HEADER_LEN < tag_end {
        let frame_id: [u8; 4] = match buf[offset..offset + 4].try_into() {
            Ok(id) => id,
            Err(_) => break,
        };
        if frame_id == [0, 0, 0, 0] {
            // Padding reached
            break;
        }

        // ID3v2.4 frame sizes are synchsafe; v2.3 uses plain big-endian.
        let size_bytes = &buf[offset + 4..offset + 8];
        let frame_size = if major_version == 4 {
            synchsafe_u32(size_bytes) as usize
        } else {
            u32::from_be_bytes([size_bytes[0], size_bytes[1], size_bytes[2], size_bytes[3]])
                as usize
        };
        // Two flag bytes at offset+8 are ignored.
        offset += HEADER_LEN;

        if frame_size > tag_end - offset {
            // Declared size runs past the tag; treat the rest as garbage.
            break;
        }

        let content = &buf[offset..offset + frame_size];
        if let Some(text) = decode_text_frame(content) {
            match &frame_id {
                b"TIT2" => tags.title = Some(text),
                b"TPE1" => tags.artist = Some(text),
                b"TALB" => tags.album = Some(text),
                b"TYER" | b"TDRC" => tags.year = Some(text),
                b"TCON" => tags.genre = Some(text),
                _ => {}
            }
        }

        offset += frame_size;
    }

    tags
}

/// Decode a synchsafe 32-bit integer: 7 significant bits per byte, high
/// bit always clear.
pub fn synchsafe_u32(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 7) | (b & 0x7f) as u32)
}

/// Decode a text frame body: one encoding marker byte followed by text.
///
/// Markers 0 (ISO-8859-1, treated as a UTF-8-compatible subset) and 3
/// (UTF-8) decode lossily as UTF-8; markers 1 (UTF-16 with BOM) and 2
/// (UTF-16BE) decode as UTF-16, honoring a BOM when present. Embedded NUL
/// terminators are stripped.
fn decode_text_frame(content: &[u8]) -> Option<String> {
    let (&encoding, text_bytes) = content.split_first()?;
    if text_bytes.is_empty() {
        return None;
    }
    let text = match encoding {
        0 | 3 => String::from_utf8_lossy(text_bytes).into_owned(),
        1 | 2 => {
            let (decoded, _, _) = encoding_rs::UTF_16LE.decode(text_bytes);
            decoded.into_owned()
        }
        _ => return None,
    };
    Some(text.replace('\0', ""))
}
