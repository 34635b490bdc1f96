use tuning::{TextOverlay, TextPlacement};

/// Text overlay that renders into the window title.
///
/// Fragments drawn during a frame are collected and joined; the title is only
/// pushed to the window when the joined text changes.
#[derive(Debug)]
pub(crate) struct TitleOverlay {
    base: String,
    fragments: Vec<String>,
    shown: Option<String>,
}

impl TitleOverlay {
    pub(crate) fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            fragments: Vec::new(),
            shown: None,
        }
    }

    pub(crate) fn begin(&mut self) {
        self.fragments.clear();
    }

    /// Returns the new title if this frame's text differs from the last one shown.
    pub(crate) fn finish(&mut self) -> Option<&str> {
        let title = if self.fragments.is_empty() {
            self.base.clone()
        } else {
            format!("{} | {}", self.base, self.fragments.join(" | "))
        };
        if self.shown.as_deref() == Some(title.as_str()) {
            return None;
        }
        self.shown = Some(title);
        self.shown.as_deref()
    }
}

impl TextOverlay for TitleOverlay {
    fn draw_text(&mut self, text: &str, _placement: TextPlacement) {
        if !text.is_empty() {
            self.fragments.push(text.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tuning::{ConsoleSession, Demo};

    #[test]
    fn title_updates_only_on_change() {
        let session = ConsoleSession::new(Demo::Circle.profile(), Some(1)).unwrap();
        let mut overlay = TitleOverlay::new("circles");

        overlay.begin();
        session.draw_overlay(&mut overlay);
        let first = overlay.finish().map(str::to_string).unwrap();
        assert!(first.starts_with("circles | "));
        assert!(first.contains("blink_freq=3.00"));

        overlay.begin();
        session.draw_overlay(&mut overlay);
        assert!(overlay.finish().is_none());
    }

    #[test]
    fn empty_frame_shows_base_title() {
        let mut overlay = TitleOverlay::new("circles");
        overlay.begin();
        assert_eq!(overlay.finish(), Some("circles"));
    }
}
