use crate::splitting::domain::timecode::{parse_timecode, TimecodeError};

/// One parsed sheet line: a start time and the raw title text.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetEntry {
    pub start: f64,
    pub title: String,
}

/// One clip to cut. `end` is `None` for the final clip until the caller
/// fills in the probed video duration.
#[derive(Clone, Debug, PartialEq)]
pub struct Clip {
    pub start: f64,
    pub end: Option<f64>,
    pub title: String,
}

/// Parse one `MM:SS Title` / `HH:MM:SS Title` line. Lines that don't
/// match (headers, commentary) yield `None` and are skipped by callers.
pub fn parse_entry_line(line: &str) -> Option<SheetEntry> {
    let line = line.trim();
    let (timecode, title) = line.split_once(char::is_whitespace)?;
    if !timecode.contains(':') || !timecode.chars().all(|c| c.is_ascii_digit() || c == ':') {
        return None;
    }
    let start = parse_timecode(timecode).ok()?;
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    Some(SheetEntry {
        start,
        title: title.to_string(),
    })
}

/// Parse a timestamp sheet into clips.
///
/// Format:
/// ```text
/// START: 01:30
/// 05:16 NCT DOJAEJUNG - PERFUME
/// 09:42 aespa - Supernova
/// ```
///
/// An optional `START:` line gives an offset subtracted from every
/// entry, for sheets whose timestamps were taken from a longer VOD.
/// Each clip ends where the next one begins; the last clip's end is
/// left open for the video duration.
pub fn parse_sheet(text: &str) -> Result<Vec<Clip>, TimecodeError> {
    let mut start_offset = 0.0;
    let mut entries: Vec<SheetEntry> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = strip_start_prefix(line) {
            start_offset = parse_timecode(rest)?;
            continue;
        }

        if let Some(entry) = parse_entry_line(line) {
            entries.push(entry);
        }
    }

    let clips = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| Clip {
            start: entry.start - start_offset,
            end: entries.get(i + 1).map(|next| next.start - start_offset),
            title: entry.title.clone(),
        })
        .collect();

    Ok(clips)
}

fn strip_start_prefix(line: &str) -> Option<&str> {
    let head = line.get(..6)?;
    head.eq_ignore_ascii_case("START:").then(|| line[6..].trim())
}

/// Strip characters that are invalid in filenames.
///
/// Invalid characters become underscores, runs of underscores collapse
/// to one, spaces become underscores, leading/trailing underscores are
/// trimmed, and commas are dropped.
pub fn sanitize_filename(title: &str) -> String {
    const INVALID: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*', ' '];

    let mut collapsed = String::with_capacity(title.len());
    for c in title.chars() {
        let c = if INVALID.contains(&c) { '_' } else { c };
        if c == '_' && collapsed.ends_with('_') {
            continue;
        }
        collapsed.push(c);
    }

    collapsed.trim_matches('_').replace(',', "")
}

/// Output filename for clip number `index` (1-based): `NN_Title.mp4`,
/// optionally prefixed.
pub fn clip_filename(index: usize, title: &str, prefix: &str) -> String {
    let clean = sanitize_filename(title);
    if prefix.is_empty() {
        format!("{index:02}_{clean}.mp4")
    } else {
        format!("{prefix}_{index:02}_{clean}.mp4")
    }
}
