use std::path::Path;
use std::process::{Command, Stdio};

use crate::splitting::domain::clip_cutter::{ClipCutter, Codec, EncodeOptions};

/// Cuts clips by shelling out to `ffmpeg`, probing durations with
/// `ffprobe`.
///
/// Re-encoding through the CLI keeps full audio support and the
/// `+faststart` layout phones expect, which the in-process decoder
/// doesn't provide.
pub struct FfmpegCliCutter;

impl FfmpegCliCutter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegCliCutter {
    fn default() -> Self {
        Self::new()
    }
}

impl ClipCutter for FfmpegCliCutter {
    fn probe_duration(&self, video: &Path) -> Result<f64, Box<dyn std::error::Error>> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(video)
            .output()?;

        if !output.status.success() {
            return Err(format!(
                "ffprobe failed for {}: {}",
                video.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )
            .into());
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn cut(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        duration: f64,
        options: &EncodeOptions,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let args = build_cut_args(input, output, start, duration, options);
        let status = Command::new("ffmpeg")
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;

        if !status.success() {
            return Err(format!("ffmpeg failed cutting {}", output.display()).into());
        }
        Ok(())
    }
}

/// True if both `ffmpeg` and `ffprobe` can be invoked.
pub fn ffmpeg_available() -> bool {
    ["ffmpeg", "ffprobe"].iter().all(|tool| {
        Command::new(tool)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    })
}

fn parse_probe_output(stdout: &str) -> Result<f64, Box<dyn std::error::Error>> {
    stdout
        .trim()
        .parse::<f64>()
        .map_err(|_| format!("ffprobe returned no duration: {stdout:?}").into())
}

/// The full ffmpeg argument list for one cut. Pure so the per-codec
/// argument sets stay testable without invoking ffmpeg.
fn build_cut_args(
    input: &Path,
    output: &Path,
    start: f64,
    duration: f64,
    options: &EncodeOptions,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-ss".into(),
        start.to_string(),
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-t".into(),
        duration.to_string(),
    ];

    if options.codec == Codec::Copy {
        args.extend(["-c".into(), "copy".into()]);
    } else {
        match options.codec {
            Codec::H264 => args.extend([
                "-c:v".into(),
                "libx264".into(),
                "-profile:v".into(),
                "high".into(),
                "-level".into(),
                "5.1".into(),
            ]),
            Codec::H265 => args.extend([
                "-c:v".into(),
                "libx265".into(),
                "-tag:v".into(),
                "hvc1".into(),
            ]),
            Codec::Copy => {}
        }
        args.extend([
            "-crf".into(),
            options.crf.to_string(),
            "-preset".into(),
            options.preset.clone(),
            "-pix_fmt".into(),
            "yuv420p".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "192k".into(),
            "-movflags".into(),
            "+faststart".into(),
        ]);
    }

    args.push(output.to_string_lossy().into_owned());
    args
}
