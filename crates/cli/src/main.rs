use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use fancam_core::detection::domain::face_analyzer::FaceAnalyzer;
use fancam_core::detection::domain::face_selector::LargestFacePolicy;
use fancam_core::detection::infrastructure::arcface_embedder::ArcFaceEmbedder;
use fancam_core::detection::infrastructure::locator_factory::{create_locator, DetectorBackend};
use fancam_core::detection::infrastructure::model_resolver;
use fancam_core::detection::infrastructure::onnx_face_analyzer::OnnxFaceAnalyzer;
use fancam_core::fingerprint::extractor::{FingerprintExtractor, SamplingConfig};
use fancam_core::fingerprint::video_record::ExtractionStatus;
use fancam_core::organize::infrastructure::file_mover::apply_plan;
use fancam_core::organize::infrastructure::video_scanner::scan_videos;
use fancam_core::pipeline::organize_videos_use_case::{ClusteringConfig, OrganizeVideosUseCase};
use fancam_core::pipeline::split_clips_use_case::SplitClipsUseCase;
use fancam_core::shared::constants::{ARCFACE_MODEL_NAME, ARCFACE_MODEL_URL};
use fancam_core::splitting::domain::batch_sheet::{parse_batch_sheet, BatchPair};
use fancam_core::splitting::domain::clip_cutter::{Codec, EncodeOptions};
use fancam_core::splitting::domain::timecode::{format_timecode, parse_timecode};
use fancam_core::splitting::infrastructure::ffmpeg_cli_cutter::{
    ffmpeg_available, FfmpegCliCutter,
};
use fancam_core::subtitles::srt_track::{
    assemble_cues, load_playlists, render_srt, PlaylistTiming,
};
use fancam_core::video::infrastructure::ffmpeg_reader::FfmpegReader;

const PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// Sort, split, and subtitle fancam videos.
#[derive(Parser)]
#[command(name = "fancam", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sort fancam videos into per-dancer folders by face identity.
    Organize(OrganizeArgs),
    /// Cut a long recording into clips along a timestamp sheet.
    Split(SplitArgs),
    /// Generate an SRT track of song titles from playlist sheets.
    Subtitles(SubtitlesArgs),
}

#[derive(Args)]
struct OrganizeArgs {
    /// Folder containing the fancam videos.
    source: PathBuf,

    /// Destination folder for sorted videos (default: SOURCE/organized).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// DBSCAN cosine-distance threshold.
    #[arg(long, default_value = "0.4")]
    eps: f64,

    /// Minimum neighborhood size (including the point itself) for a
    /// core point.
    #[arg(long, default_value = "1")]
    min_samples: usize,

    /// Frames sampled per video.
    #[arg(long, default_value = "20")]
    frames: usize,

    /// Fraction of the timeline skipped at each end (intros/outros).
    #[arg(long, default_value = "0.10")]
    skip_percent: f64,

    /// Face embedding model.
    #[arg(long, default_value = "ArcFace")]
    embedding_model: String,

    /// Face detection backend: retinaface or yolo.
    #[arg(long, default_value = "retinaface")]
    detector_backend: String,

    /// Detection confidence threshold (0.0-1.0, backend default if omitted).
    #[arg(long)]
    confidence: Option<f64>,

    /// Analyze and print the plan without moving files.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct SplitArgs {
    /// Source video (omit when using --batch).
    video: Option<PathBuf>,

    /// Timestamp sheet for the video (omit when using --batch).
    timestamps: Option<PathBuf>,

    /// Batch sheet of `video | timestamps` lines.
    #[arg(long, conflicts_with_all = ["video", "timestamps"])]
    batch: Option<PathBuf>,

    /// Output directory for the clips.
    #[arg(short, long, default_value = "./clips")]
    output: PathBuf,

    /// Video codec: h264, h265, or copy.
    #[arg(long, default_value = "h264")]
    codec: String,

    /// Encoding quality, 0-51 (lower is better).
    #[arg(long, default_value = "18")]
    crf: u32,

    /// Encoder speed preset.
    #[arg(long, default_value = "medium")]
    preset: String,

    /// Print the clip table without cutting anything.
    #[arg(long)]
    dry_run: bool,

    /// Filename prefix for the clips.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Run the organizer over the output directory afterwards.
    #[arg(long)]
    organize: bool,
}

#[derive(Args)]
struct SubtitlesArgs {
    /// Folder of numbered playlist sheets (1.txt, 2.txt, ...).
    timestamps_dir: PathBuf,

    /// Output .srt file.
    #[arg(short, long, default_value = "output.srt")]
    output: PathBuf,

    /// Total video duration (MM:SS or HH:MM:SS).
    #[arg(long)]
    duration: String,

    /// Seconds of intro before the first playlist.
    #[arg(long, default_value = "6")]
    intro: f64,

    /// Seconds of transition between playlists.
    #[arg(long, default_value = "6")]
    transition: f64,

    /// Absolute start times of playlist 2 onwards, comma-separated
    /// (the first playlist starts right after the intro).
    #[arg(long, value_delimiter = ',')]
    playlist_starts: Vec<String>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {
        Command::Organize(args) => run_organize(&args),
        Command::Split(args) => run_split(&args),
        Command::Subtitles(args) => run_subtitles(&args),
    }
}

// --- organize ---

fn run_organize(args: &OrganizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    validate_organize(args)?;

    let videos = scan_videos(&args.source)?;
    if videos.is_empty() {
        return Err(format!("No video files found in {}", args.source.display()).into());
    }
    println!("Found {} videos in {}", videos.len(), args.source.display());

    let backend = DetectorBackend::parse(&args.detector_backend)
        .ok_or_else(|| format!("Unknown detector backend: {}", args.detector_backend))?;
    let analyzer = build_analyzer(backend, args.confidence)?;

    let extractor = FingerprintExtractor::new(
        Box::new(FfmpegReader::new()),
        analyzer,
        Box::new(LargestFacePolicy),
        SamplingConfig {
            frames_to_extract: args.frames,
            skip_fraction: args.skip_percent,
        },
    );

    let progress: Box<dyn Fn(usize, usize) -> bool + Send> = Box::new(|current, total| {
        eprint!("\rAnalyzing video {current}/{total}");
        true
    });

    let clustering = ClusteringConfig {
        eps: args.eps,
        min_samples: args.min_samples,
    };
    let mut use_case = OrganizeVideosUseCase::new(extractor, clustering, Some(progress));
    let outcome = use_case.execute(&videos)?;
    eprintln!();

    println!(
        "\nDancers found: {}   Unknown: {}   Errors: {}",
        outcome.cluster_count(),
        outcome.unknown_count(),
        outcome.error_count()
    );
    for (folder, count) in outcome.folder_counts() {
        println!("  {folder}: {count} videos");
    }
    for record in &outcome.records {
        if record.status == ExtractionStatus::DetectionFailed {
            println!("  No usable face: {}", record.path.display());
        }
    }

    println!("\nPlan:");
    for entry in &outcome.plan {
        let name = entry.source.file_name().unwrap_or(entry.source.as_os_str());
        println!("  {} -> {}/", name.to_string_lossy(), entry.folder);
    }

    if args.dry_run {
        println!("\n[dry-run] No files were moved.");
        return Ok(());
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.source.join("organized"));
    let moved = apply_plan(&outcome.plan, &output)?;
    println!("\nMoved {} videos to {}", moved.len(), output.display());
    Ok(())
}

fn validate_organize(args: &OrganizeArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.source.is_dir() {
        return Err(format!("Source folder not found: {}", args.source.display()).into());
    }
    if !args.embedding_model.eq_ignore_ascii_case("arcface") {
        return Err(format!(
            "Unknown embedding model '{}' (only ArcFace is available)",
            args.embedding_model
        )
        .into());
    }
    if args.eps < 0.0 {
        return Err(format!("eps must be non-negative, got {}", args.eps).into());
    }
    if args.min_samples == 0 {
        return Err("min-samples must be at least 1".into());
    }
    if args.frames == 0 {
        return Err("frames must be at least 1".into());
    }
    if !(0.0..0.5).contains(&args.skip_percent) {
        return Err(format!(
            "skip-percent must be in [0.0, 0.5), got {}",
            args.skip_percent
        )
        .into());
    }
    if let Some(c) = args.confidence {
        if !(0.0..=1.0).contains(&c) {
            return Err(format!("Confidence must be between 0.0 and 1.0, got {c}").into());
        }
    }
    Ok(())
}

fn build_analyzer(
    backend: DetectorBackend,
    confidence: Option<f64>,
) -> Result<Box<dyn FaceAnalyzer>, Box<dyn std::error::Error>> {
    log::info!("Resolving model: {}", backend.model_name());
    let locator_model = model_resolver::resolve(
        backend.model_name(),
        backend.model_url(),
        None,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();
    let locator = create_locator(
        backend,
        &locator_model,
        confidence.unwrap_or_else(|| backend.default_confidence()),
    )?;

    log::info!("Resolving model: {ARCFACE_MODEL_NAME}");
    let embedder_model = model_resolver::resolve(
        ARCFACE_MODEL_NAME,
        ARCFACE_MODEL_URL,
        None,
        Some(Box::new(download_progress)),
    )?;
    eprintln!();
    let embedder = ArcFaceEmbedder::new(&embedder_model)?;

    Ok(Box::new(OnnxFaceAnalyzer::new(locator, embedder)))
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}

// --- split ---

fn run_split(args: &SplitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let options = validate_split(args)?;

    if !ffmpeg_available() {
        return Err("FFmpeg not found; install ffmpeg and ffprobe first".into());
    }

    let pairs = collect_pairs(args)?;
    let multi = pairs.len() > 1;

    let mut created = 0;
    let mut skipped = 0;
    let mut failed = 0;

    for (i, pair) in pairs.iter().enumerate() {
        if multi {
            println!("\n[{}/{}] {}", i + 1, pairs.len(), pair.video.display());
        }

        if !pair.video.is_file() {
            log::warn!("Video not found: {}", pair.video.display());
            failed += 1;
            continue;
        }
        if !pair.timestamps.is_file() {
            log::warn!("Timestamp sheet not found: {}", pair.timestamps.display());
            failed += 1;
            continue;
        }

        let sheet = fs::read_to_string(&pair.timestamps)?;
        let use_case = SplitClipsUseCase::new(
            Box::new(FfmpegCliCutter::new()),
            options.clone(),
            Some(Box::new(|current, total| {
                eprint!("\rCutting clip {current}/{total}");
                true
            })),
        );

        let clips = match use_case.plan(&pair.video, &sheet, &args.prefix) {
            Ok(clips) => clips,
            Err(e) => {
                log::warn!("Skipping {}: {e}", pair.video.display());
                failed += 1;
                continue;
            }
        };
        print_clip_table(&clips);

        if args.dry_run {
            continue;
        }

        let outcome = use_case.execute(&pair.video, &clips, &args.output)?;
        eprintln!();
        created += outcome.created;
        skipped += outcome.skipped;
        failed += outcome.failed;
    }

    if args.dry_run {
        println!("\n[dry-run] No clips were written.");
        return Ok(());
    }

    println!("\nDone: {created} clips created, {skipped} skipped, {failed} failed.");

    if args.organize {
        println!("\nOrganizing clips in {}", args.output.display());
        run_organize(&OrganizeArgs {
            source: args.output.clone(),
            output: None,
            eps: 0.4,
            min_samples: 1,
            frames: 20,
            skip_percent: 0.10,
            embedding_model: "ArcFace".to_string(),
            detector_backend: "retinaface".to_string(),
            confidence: None,
            dry_run: false,
        })?;
    }

    Ok(())
}

fn validate_split(args: &SplitArgs) -> Result<EncodeOptions, Box<dyn std::error::Error>> {
    if args.batch.is_none() && (args.video.is_none() || args.timestamps.is_none()) {
        return Err("Provide either --batch SHEET or VIDEO TIMESTAMPS".into());
    }
    let codec = Codec::parse(&args.codec)
        .ok_or_else(|| format!("Codec must be h264, h265, or copy, got '{}'", args.codec))?;
    if args.crf > 51 {
        return Err(format!("CRF must be between 0 and 51, got {}", args.crf).into());
    }
    if !PRESETS.contains(&args.preset.as_str()) {
        return Err(format!(
            "Preset must be one of {}, got '{}'",
            PRESETS.join(", "),
            args.preset
        )
        .into());
    }
    Ok(EncodeOptions {
        codec,
        crf: args.crf,
        preset: args.preset.clone(),
    })
}

fn collect_pairs(args: &SplitArgs) -> Result<Vec<BatchPair>, Box<dyn std::error::Error>> {
    match &args.batch {
        Some(batch) => {
            let text = fs::read_to_string(batch)
                .map_err(|e| format!("Cannot read batch sheet {}: {e}", batch.display()))?;
            let sheet_dir = batch.parent().unwrap_or_else(|| std::path::Path::new("."));
            let pairs = parse_batch_sheet(&text, sheet_dir);
            if pairs.is_empty() {
                return Err("No video | timestamp pairs in the batch sheet".into());
            }
            Ok(pairs)
        }
        None => Ok(vec![BatchPair {
            // Presence checked in validate_split.
            video: args.video.clone().unwrap_or_default(),
            timestamps: args.timestamps.clone().unwrap_or_default(),
        }]),
    }
}

fn print_clip_table(clips: &[fancam_core::pipeline::split_clips_use_case::PlannedClip]) {
    println!("{:<4} {:<10} {:<10} {:<8} Title", "No", "Start", "End", "Length");
    for clip in clips {
        println!(
            "{:02}   {:<10} {:<10} {:<8} {}",
            clip.index,
            format_timecode(clip.start),
            format_timecode(clip.end),
            format_timecode(clip.duration()),
            clip.title
        );
    }
}

// --- subtitles ---

fn run_subtitles(args: &SubtitlesArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.timestamps_dir.is_dir() {
        return Err(format!(
            "Timestamp folder not found: {}",
            args.timestamps_dir.display()
        )
        .into());
    }

    let playlists = load_playlists(&args.timestamps_dir)?;
    if playlists.is_empty() {
        return Err(format!(
            "No numbered timestamp sheets (1.txt, 2.txt, ...) in {}",
            args.timestamps_dir.display()
        )
        .into());
    }
    println!("Found {} playlist sheets", playlists.len());

    let later_starts = args
        .playlist_starts
        .iter()
        .map(|s| parse_timecode(s))
        .collect::<Result<Vec<f64>, _>>()?;

    let timing = PlaylistTiming {
        intro_secs: args.intro,
        transition_secs: args.transition,
        video_duration: parse_timecode(&args.duration)?,
        later_starts,
    };

    let cues = assemble_cues(&playlists, &timing)?;
    fs::write(&args.output, render_srt(&cues))?;
    println!("Wrote {} cues to {}", cues.len(), args.output.display());
    Ok(())
}
