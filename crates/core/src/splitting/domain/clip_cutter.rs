use std::path::Path;

/// Video codec for cut clips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Codec {
    /// libx264, high profile — plays on virtually everything.
    H264,
    /// libx265 with the hvc1 tag for Apple players.
    H265,
    /// Stream copy, no re-encoding. Fast but cuts land on keyframes.
    Copy,
}

impl Codec {
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "h264" => Some(Self::H264),
            "h265" => Some(Self::H265),
            "copy" => Some(Self::Copy),
            _ => None,
        }
    }
}

/// Encoding parameters for the cutter.
#[derive(Clone, Debug)]
pub struct EncodeOptions {
    pub codec: Codec,
    pub crf: u32,
    pub preset: String,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            codec: Codec::H264,
            crf: 18,
            preset: "medium".to_string(),
        }
    }
}

/// Cuts clips out of a source video.
///
/// The splitter treats re-encoding as an external concern; this port
/// hides whichever transcoding tool does the work.
pub trait ClipCutter: Send {
    /// Duration of the source video in seconds.
    fn probe_duration(&self, video: &Path) -> Result<f64, Box<dyn std::error::Error>>;

    /// Cut `[start, start + duration)` from `input` into `output`.
    fn cut(
        &self,
        input: &Path,
        output: &Path,
        start: f64,
        duration: f64,
        options: &EncodeOptions,
    ) -> Result<(), Box<dyn std::error::Error>>;
}
