//! Parsing of the `yt-dlp` result line.
//!
//! The fetcher asks `yt-dlp` to print one JSON object per finished item
//! once post-processing has moved the file into place:
//!
//! ```json
//! {"extractor": "youtube", "filepath": "/media/youtube/Some title.mp4"}
//! ```
//!
//! Anything else on stdout (warnings from extractors, stray text) is ignored.
//!
//! Python encodes undecodable filename bytes as lone surrogates, which
//! yt-dlp prints as `\udcXX` escapes. Those are not valid JSON strings for
//! `serde_json`, so such lines are decoded again with each lone surrogate
//! replaced by U+FFFD. The recorded name is then lossy, but the download
//! is not mistaken for a failure.

use std::borrow::Cow;

use serde::Deserialize;

use ytdlm_core::{FetchError, FetchedMedia};

/// Output template passed to `--print`.
pub const PRINT_TEMPLATE: &str = "after_move:%(.{extractor,filepath})j";

/// Extractor label used when `yt-dlp` does not report one.
pub const UNKNOWN_EXTRACTOR: &str = "unknown";

#[derive(Deserialize)]
struct ResultLine {
    extractor: Option<String>,
    filepath: Option<String>,
}

/// Parse a single stdout line. Returns `None` for lines that are not result objects.
pub fn parse_line(line: &str) -> Option<FetchedMedia> {
    let line = line.trim();
    if !line.starts_with('{') {
        return None;
    }

    let parsed: ResultLine = serde_json::from_str(line)
        .ok()
        .or_else(|| match replace_lone_surrogates(line) {
            Cow::Owned(repaired) => serde_json::from_str(&repaired).ok(),
            Cow::Borrowed(_) => None,
        })?;
    let final_filename = parsed.filepath.filter(|p| !p.trim().is_empty())?;
    let extractor = parsed
        .extractor
        .map(|e| e.trim().to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| UNKNOWN_EXTRACTOR.to_string());

    Some(FetchedMedia {
        final_filename,
        extractor,
    })
}

/// Rewrite `\uXXXX` escapes that are unpaired UTF-16 surrogates as `\ufffd`.
///
/// Returns the input unchanged when it has none.
fn replace_lone_surrogates(line: &str) -> Cow<'_, str> {
    fn escape_at(bytes: &[u8], i: usize) -> Option<u16> {
        if bytes.get(i) != Some(&b'\\') || bytes.get(i + 1) != Some(&b'u') {
            return None;
        }
        let hex = std::str::from_utf8(bytes.get(i + 2..i + 6)?).ok()?;
        u16::from_str_radix(hex, 16).ok()
    }

    let bytes = line.as_bytes();
    let mut out: Option<String> = None;
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        let Some(unit) = escape_at(bytes, i) else {
            // Any other escape: skip the backslash and the escaped byte.
            i += 2;
            continue;
        };

        let is_high = (0xD800..0xDC00).contains(&unit);
        let is_low = (0xDC00..0xE000).contains(&unit);
        let paired = is_high
            && escape_at(bytes, i + 6).is_some_and(|next| (0xDC00..0xE000).contains(&next));

        if paired {
            i += 12;
        } else if is_high || is_low {
            let buf = out.get_or_insert_with(|| String::with_capacity(line.len()));
            buf.push_str(&line[copied..i]);
            buf.push_str("\\ufffd");
            i += 6;
            copied = i;
        } else {
            i += 6;
        }
    }

    match out {
        Some(mut buf) => {
            buf.push_str(&line[copied..]);
            Cow::Owned(buf)
        }
        None => Cow::Borrowed(line),
    }
}

/// Pick the result from a complete stdout capture.
///
/// When a URL expands to several items, the last finished item wins.
pub fn parse_output(stdout: &str) -> Result<FetchedMedia, FetchError> {
    stdout
        .lines()
        .rev()
        .find_map(parse_line)
        .ok_or_else(|| {
            let preview: String = stdout.trim().chars().take(200).collect();
            FetchError::MalformedOutput(if preview.is_empty() {
                "no result line on stdout".to_string()
            } else {
                preview
            })
        })
}
