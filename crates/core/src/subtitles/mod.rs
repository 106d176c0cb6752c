pub mod srt_track;
