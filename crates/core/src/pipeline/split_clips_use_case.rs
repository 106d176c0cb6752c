use std::fs;
use std::path::{Path, PathBuf};

use crate::splitting::domain::clip_cutter::{ClipCutter, EncodeOptions};
use crate::splitting::domain::timestamp_sheet::{clip_filename, parse_sheet};

/// One clip with all times resolved and its output name fixed.
#[derive(Clone, Debug, PartialEq)]
pub struct PlannedClip {
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub title: String,
    pub filename: String,
}

impl PlannedClip {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Result of one split run.
pub struct SplitOutcome {
    pub clips: Vec<PlannedClip>,
    pub created: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Cuts one video into clips along a timestamp sheet.
///
/// The sheet is parsed, the open final end is closed with the probed
/// video duration, and each clip is cut in order. Already-existing
/// outputs are skipped and per-clip cutter failures are counted, not
/// fatal; only probe or parse errors abort the run.
pub struct SplitClipsUseCase {
    cutter: Box<dyn ClipCutter>,
    options: EncodeOptions,
    on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
}

impl SplitClipsUseCase {
    pub fn new(
        cutter: Box<dyn ClipCutter>,
        options: EncodeOptions,
        on_progress: Option<Box<dyn Fn(usize, usize) -> bool + Send>>,
    ) -> Self {
        Self {
            cutter,
            options,
            on_progress,
        }
    }

    /// Plan the clips for `video` without cutting anything.
    pub fn plan(
        &self,
        video: &Path,
        sheet: &str,
        prefix: &str,
    ) -> Result<Vec<PlannedClip>, Box<dyn std::error::Error>> {
        let duration = self.cutter.probe_duration(video)?;
        let clips = parse_sheet(sheet)?;
        if clips.is_empty() {
            return Err("No timestamps found in sheet".into());
        }

        Ok(clips
            .iter()
            .enumerate()
            .map(|(i, clip)| PlannedClip {
                index: i + 1,
                start: clip.start,
                end: clip.end.unwrap_or(duration),
                title: clip.title.clone(),
                filename: clip_filename(i + 1, &clip.title, prefix),
            })
            .collect())
    }

    /// Cut every planned clip into `output_dir`.
    pub fn execute(
        &self,
        video: &Path,
        clips: &[PlannedClip],
        output_dir: &Path,
    ) -> Result<SplitOutcome, Box<dyn std::error::Error>> {
        fs::create_dir_all(output_dir)?;

        let mut outcome = SplitOutcome {
            clips: clips.to_vec(),
            created: 0,
            skipped: 0,
            failed: 0,
        };

        for clip in clips {
            self.report_progress(clip.index, clips.len())?;

            let output: PathBuf = output_dir.join(&clip.filename);
            if output.exists() {
                log::info!("Skipping existing clip: {}", clip.filename);
                outcome.skipped += 1;
                continue;
            }

            match self
                .cutter
                .cut(video, &output, clip.start, clip.duration(), &self.options)
            {
                Ok(()) => outcome.created += 1,
                Err(e) => {
                    log::warn!("Failed to cut {}: {e}", clip.filename);
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }

    fn report_progress(
        &self,
        current: usize,
        total: usize,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if let Some(ref callback) = self.on_progress {
            if !callback(current, total) {
                return Err("Cancelled".into());
            }
        }
        Ok(())
    }
}
