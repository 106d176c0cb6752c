pub mod organize_videos_use_case;
pub mod split_clips_use_case;
