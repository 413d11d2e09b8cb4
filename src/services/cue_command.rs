use std::path::Path;
use std::process::{Command, Stdio};

use crate::ports::{CueError, CuePlayer};

/// Plays the cue file through an external player (`afplay`, `aplay`, `paplay`...).
///
/// Waits for the player to exit, so it must only run off the frame loop.
#[derive(Debug, Clone)]
pub struct CommandCuePlayer {
    program: String,
}

impl CommandCuePlayer {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl CuePlayer for CommandCuePlayer {
    fn play(&self, cue: &str) -> Result<(), CueError> {
        let path = Path::new(cue);
        if !path.exists() {
            return Err(CueError::MissingAsset(path.to_path_buf()));
        }

        let status = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(CueError::Spawn)?;

        if status.success() {
            Ok(())
        } else {
            Err(CueError::PlayerFailed {
                status: status.to_string(),
            })
        }
    }
}
