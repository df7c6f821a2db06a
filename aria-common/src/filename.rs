//! Filename-derived metadata fallback
//!
//! Pure, deterministic heuristic used when a file has no embedded tag or an
//! embedded tag is missing fields. Tries, in order:
//!
//! 1. `"Artist - Title"` (split on `" - "`)
//! 2. `"Artist_Title"` (split on `"_"`, underscores become spaces)
//! 3. Strip a leading track-number prefix and any bracketed substrings,
//!    use the remainder as the title with artist "Unknown Artist"
//!
//! The album is always "Unknown Album" on this path. The function is total:
//! it never fails and every field is non-empty.

/// Metadata guessed from a filename. All fields are always populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilenameTags {
    pub title: String,
    pub artist: String,
    pub album: String,
}

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Derive title/artist/album from a filename.
pub fn parse(filename: &str) -> FilenameTags {
    let stem = strip_extension(filename);

    // "Artist - Title" format; extra dashes stay in the title.
    let dash_parts: Vec<&str> = stem.split(" - ").collect();
    if dash_parts.len() >= 2 {
        return FilenameTags {
            title: dash_parts[1..].join(" - ").trim().to_string(),
            artist: dash_parts[0].trim().to_string(),
            album: UNKNOWN_ALBUM.to_string(),
        };
    }

    // "Artist_Title" format, underscores rendered as spaces.
    let underscore_parts: Vec<&str> = stem.split('_').collect();
    if underscore_parts.len() >= 2 {
        return FilenameTags {
            title: underscore_parts[1..]
                .join("_")
                .replace('_', " ")
                .trim()
                .to_string(),
            artist: underscore_parts[0].replace('_', " ").trim().to_string(),
            album: UNKNOWN_ALBUM.to_string(),
        };
    }

    // Last resort: drop a leading track number and bracketed noise.
    let cleaned = strip_bracketed(strip_track_prefix(stem));
    let cleaned = cleaned.trim();
    FilenameTags {
        title: if cleaned.is_empty() {
            stem.to_string()
        } else {
            cleaned.to_string()
        },
        artist: UNKNOWN_ARTIST.to_string(),
        album: UNKNOWN_ALBUM.to_string(),
    }
}

/// Strip a trailing `.ext` (the final dot-separated component, if any).
fn strip_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.contains('/') => stem,
        _ => filename,
    }
}

/// Strip a leading track number: digits followed by whitespace, dashes,
/// or dots (e.g. `"01. "`, `"03 - "`).
fn strip_track_prefix(s: &str) -> &str {
    let after_digits = s.trim_start_matches(|c: char| c.is_ascii_digit());
    if after_digits.len() == s.len() {
        return s;
    }
    after_digits.trim_start_matches(|c: char| c.is_whitespace() || c == '-' || c == '.')
}

/// Remove bracketed or parenthesized substrings, non-greedily: each `(` or
/// `[` is dropped together with everything up to the first `)` or `]`.
/// An unmatched opener leaves the rest of the string untouched.
fn strip_bracketed(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(open) = rest.find(['(', '[']) {
        out.push_str(&rest[..open]);
        match rest[open..].find([')', ']']) {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_separated_artist_title() {
        let tags = parse("Artist - Title.mp3");
        assert_eq!(tags.artist, "Artist");
        assert_eq!(tags.title, "Title");
        assert_eq!(tags.album, "Unknown Album");
    }

    #[test]
    fn extra_dashes_stay_in_title() {
        let tags = parse("Some Band - Song - Live Version.mp3");
        assert_eq!(tags.artist, "Some Band");
        assert_eq!(tags.title, "Song - Live Version");
    }

    #[test]
    fn underscore_separated_artist_title() {
        let tags = parse("Some_Artist_Name_Track.mp3");
        assert_eq!(tags.artist, "Some");
        assert_eq!(tags.title, "Artist Name Track");
    }

    #[test]
    fn track_number_and_brackets_stripped() {
        let tags = parse("01. Track Name (Remix) [Live].mp3");
        assert_eq!(tags.title, "Track Name");
        assert_eq!(tags.artist, "Unknown Artist");
    }

    #[test]
    fn bare_title_survives() {
        let tags = parse("Song.opus");
        assert_eq!(tags.title, "Song");
        assert_eq!(tags.artist, "Unknown Artist");
    }

    #[test]
    fn all_noise_falls_back_to_stem() {
        // Everything is stripped, so the stem itself becomes the title.
        let tags = parse("01(x).mp3");
        assert_eq!(tags.title, "01(x)");
    }

    #[test]
    fn no_extension_is_fine() {
        let tags = parse("Artist - Title");
        assert_eq!(tags.artist, "Artist");
        assert_eq!(tags.title, "Title");
    }

    #[test]
    fn unmatched_bracket_is_kept() {
        let tags = parse("7 Song (unfinished.mp3");
        assert_eq!(tags.title, "Song (unfinished");
    }

    #[test]
    fn deterministic() {
        assert_eq!(parse("A_B.mp3"), parse("A_B.mp3"));
    }
}
