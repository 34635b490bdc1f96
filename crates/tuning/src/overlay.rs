//! Read-only text output of the console state.

use crate::input::InputMachine;
use crate::registry::ParameterRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Left,
    Bottom,
}

/// Where and how a line of text is drawn, in normalized device coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextPlacement {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub anchor: TextAnchor,
    pub color: [f32; 3],
}

/// Text primitive of a render backend.
pub trait TextOverlay {
    fn draw_text(&mut self, text: &str, placement: TextPlacement);
}

/// How the parameter summary is arranged on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlayLayout {
    /// One `name=value` line per parameter, top-left downwards.
    #[default]
    Lines,
    /// All parameters joined with `, ` on a single line near the bottom.
    SingleLine,
}

const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const LINE_SPACING: f32 = 0.06;

/// Draws the registry summary and, in command mode, the pending command.
pub fn draw_overlay(
    registry: &ParameterRegistry,
    input: &InputMachine,
    layout: OverlayLayout,
    overlay: &mut dyn TextOverlay,
) {
    let summary = registry.summary();
    match layout {
        OverlayLayout::Lines => {
            for (row, line) in summary.iter().enumerate() {
                overlay.draw_text(
                    line,
                    TextPlacement {
                        x: -0.9,
                        y: 0.9 - row as f32 * LINE_SPACING,
                        scale: 0.8,
                        anchor: TextAnchor::Left,
                        color: WHITE,
                    },
                );
            }
        }
        OverlayLayout::SingleLine => overlay.draw_text(
            &summary.join(", "),
            TextPlacement {
                x: 0.0,
                y: -0.8,
                scale: 1.0,
                anchor: TextAnchor::Bottom,
                color: WHITE,
            },
        ),
    }

    if input.in_command_mode() {
        overlay.draw_text(
            &format!(">> {}", input.buffer().text()),
            TextPlacement {
                x: 0.0,
                y: 0.8,
                scale: 1.0,
                anchor: TextAnchor::Bottom,
                color: WHITE,
            },
        );
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::input::press;
    use crate::keys::Modifiers;
    use crate::registry::ParamSpec;

    #[derive(Debug, Default)]
    pub(crate) struct CapturedText {
        pub lines: Vec<(String, TextPlacement)>,
    }

    impl TextOverlay for CapturedText {
        fn draw_text(&mut self, text: &str, placement: TextPlacement) {
            self.lines.push((text.to_string(), placement));
        }
    }

    fn registry() -> ParameterRegistry {
        ParameterRegistry::new([
            ParamSpec::int("wedges", 12),
            ParamSpec::float("blink_freq", 3.0),
        ])
        .unwrap()
    }

    #[test]
    fn lines_layout_stacks_entries() {
        let mut captured = CapturedText::default();
        draw_overlay(&registry(), &InputMachine::new(), OverlayLayout::Lines, &mut captured);
        let texts: Vec<&str> = captured.lines.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, ["wedges=12", "blink_freq=3.00"]);
        assert!(captured.lines[1].1.y < captured.lines[0].1.y);
    }

    #[test]
    fn single_line_layout_and_command_prompt() {
        let mut input = InputMachine::new();
        input.handle(press(';', Modifiers::SHIFT));
        input.handle(press('w', Modifiers::empty()));

        let mut captured = CapturedText::default();
        draw_overlay(&registry(), &input, OverlayLayout::SingleLine, &mut captured);
        let texts: Vec<&str> = captured.lines.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(texts, ["wedges=12, blink_freq=3.00", ">> w"]);
    }
}
