pub mod batch_sheet;
pub mod clip_cutter;
pub mod timecode;
pub mod timestamp_sheet;
