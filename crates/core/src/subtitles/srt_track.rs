//! SRT track generation for random-dance-game recordings.
//!
//! One such video chains several playlists, each with its own timestamp
//! sheet of song starts relative to the playlist. The track shows the
//! current song title: cues are the sheet entries shifted by the
//! playlist's absolute start in the video, each ending where the next
//! song begins.

use std::fs;
use std::path::{Path, PathBuf};

use crate::splitting::domain::timestamp_sheet::{parse_entry_line, SheetEntry};

/// One rendered subtitle cue.
#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

/// Where the playlists sit in the full recording.
#[derive(Clone, Debug)]
pub struct PlaylistTiming {
    /// Seconds of intro before the first playlist starts.
    pub intro_secs: f64,
    /// Gap between one playlist's end and the next one's start.
    pub transition_secs: f64,
    /// Total duration of the recording.
    pub video_duration: f64,
    /// Absolute start times of the second playlist onwards. The first
    /// playlist starts right after the intro.
    pub later_starts: Vec<f64>,
}

/// Seconds as an SRT timestamp: `HH:MM:SS,mmm`.
pub fn srt_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let hours = (total / 3600.0) as u64;
    let minutes = ((total % 3600.0) / 60.0) as u64;
    let secs = (total % 60.0) as u64;
    let millis = ((total % 1.0) * 1000.0) as u64;
    format!("{hours:02}:{minutes:02}:{secs:02},{millis:03}")
}

/// Drop a trailing parenthetical from a song title. Sheets append
/// section info and usernames there, which don't belong on screen.
pub fn clean_title(title: &str) -> String {
    let trimmed = title.trim_end();
    if let Some(inner) = trimmed.strip_suffix(')') {
        if let Some(open) = inner.rfind('(') {
            if !inner[open + 1..].contains(')') {
                return trimmed[..open].trim_end().to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Parse one playlist's song sheet: entry lines only, `START:` lines
/// and commentary skipped, titles cleaned.
pub fn parse_song_sheet(text: &str) -> Vec<SheetEntry> {
    text.lines()
        .filter(|line| !line.trim().get(..6).is_some_and(|h| h.eq_ignore_ascii_case("START:")))
        .filter_map(parse_entry_line)
        .map(|entry| SheetEntry {
            start: entry.start,
            title: clean_title(&entry.title),
        })
        .collect()
}

/// Read numbered playlist sheets (`1.txt`, `2.txt`, …) from a
/// directory, in numeric order.
pub fn load_playlists(dir: &Path) -> Result<Vec<Vec<SheetEntry>>, Box<dyn std::error::Error>> {
    let mut numbered: Vec<(u32, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("txt") {
            continue;
        }
        let Some(number) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u32>().ok())
        else {
            log::warn!("Skipping non-numbered sheet: {}", path.display());
            continue;
        };
        numbered.push((number, path));
    }
    numbered.sort_by_key(|(number, _)| *number);

    let mut playlists = Vec::with_capacity(numbered.len());
    for (_, path) in numbered {
        playlists.push(parse_song_sheet(&fs::read_to_string(path)?));
    }
    Ok(playlists)
}

/// Build the full cue list across all playlists.
///
/// `timing.later_starts` must hold exactly one start per playlist after
/// the first. Each playlist ends one transition before the next one
/// starts; the last ends at the video duration. Within a playlist, a
/// cue ends where the next song starts.
pub fn assemble_cues(
    playlists: &[Vec<SheetEntry>],
    timing: &PlaylistTiming,
) -> Result<Vec<Cue>, Box<dyn std::error::Error>> {
    if timing.later_starts.len() + 1 != playlists.len() {
        return Err(format!(
            "{} playlists need {} later start times, got {}",
            playlists.len(),
            playlists.len().saturating_sub(1),
            timing.later_starts.len()
        )
        .into());
    }

    let mut abs_starts = vec![timing.intro_secs];
    abs_starts.extend_from_slice(&timing.later_starts);

    let mut cues = Vec::new();
    for (i, entries) in playlists.iter().enumerate() {
        if entries.is_empty() {
            log::warn!("Playlist {} has no entries", i + 1);
            continue;
        }

        let abs_start = abs_starts[i];
        let playlist_end = match abs_starts.get(i + 1) {
            Some(next) => next - timing.transition_secs,
            None => timing.video_duration,
        };

        for (j, entry) in entries.iter().enumerate() {
            let end = match entries.get(j + 1) {
                Some(next) => abs_start + next.start,
                None => playlist_end,
            };
            cues.push(Cue {
                index: cues.len() + 1,
                start: abs_start + entry.start,
                end,
                text: entry.title.clone(),
            });
        }
    }

    Ok(cues)
}

/// Render cues as an SRT document.
pub fn render_srt(cues: &[Cue]) -> String {
    let mut out = String::new();
    for cue in cues {
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            srt_timestamp(cue.start),
            srt_timestamp(cue.end),
            cue.text
        ));
    }
    out
}
