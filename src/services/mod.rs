pub mod cue_command;
pub mod log_renderer;
pub mod replay;
