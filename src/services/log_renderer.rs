use crate::overlay::Overlay;
use crate::ports::Renderer;

/// Headless renderer: logs the status headline whenever it changes.
#[derive(Debug, Default)]
pub struct LogRenderer {
    last_headline: Option<&'static str>,
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_headline(&self) -> Option<&'static str> {
        self.last_headline
    }
}

impl<F> Renderer<F> for LogRenderer {
    fn render(&mut self, _frame: &F, overlay: &Overlay) {
        self.frames += 1;
        let headline = overlay.headline();
        if headline == self.last_headline {
            return;
        }
        self.last_headline = headline;

        match headline {
            Some(text) => tracing::info!(
                frame = self.frames,
                status = text,
                ear = overlay.openness,
                perclos = overlay.perclos,
                "Status"
            ),
            None => tracing::info!(frame = self.frames, "Status cleared (no face)"),
        }
    }
}
