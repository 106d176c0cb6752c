pub mod ffmpeg_cli_cutter;
