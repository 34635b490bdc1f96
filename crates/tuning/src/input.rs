//! Two-mode keyboard state machine.
//!
//! In normal mode printable keys are hot-keys. Pressing `:` or `;` with a
//! modifier opens command entry, where characters accumulate in a buffer
//! until Enter commits it or Escape cancels it.

use tracing::debug;

use crate::keys::{translate, KeyAction, KeyEvent, Modifiers, RawKey};

/// Characters accepted into the command buffer besides ASCII letters/digits.
const COMMAND_PUNCTUATION: &str = "-_=+.()[], ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    CommandEntry,
}

/// In-progress command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandBuffer {
    chars: Vec<char>,
}

impl CommandBuffer {
    pub fn push(&mut self, ch: char) {
        self.chars.push(ch);
    }

    /// Removes the last character; does nothing when empty.
    pub fn pop(&mut self) -> Option<char> {
        self.chars.pop()
    }

    pub fn clear(&mut self) {
        self.chars.clear();
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    fn take(&mut self) -> String {
        let text = self.text();
        self.chars.clear();
        text
    }
}

/// What the owner of the machine should do in response to a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Shutdown,
    /// A printable key in normal mode. `boosted` is set when any modifier
    /// was held.
    Hotkey { ch: char, boosted: bool },
    Commit(String),
}

#[derive(Debug, Clone, Default)]
pub struct InputMachine {
    mode: InputMode,
    buffer: CommandBuffer,
}

impl InputMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn buffer(&self) -> &CommandBuffer {
        &self.buffer
    }

    pub fn in_command_mode(&self) -> bool {
        self.mode == InputMode::CommandEntry
    }

    /// Feeds one key event through the machine.
    pub fn handle(&mut self, event: KeyEvent) -> Option<InputAction> {
        if event.action != KeyAction::Press {
            return None;
        }
        match self.mode {
            InputMode::Normal => self.handle_normal(event),
            InputMode::CommandEntry => self.handle_command(event),
        }
    }

    fn handle_normal(&mut self, event: KeyEvent) -> Option<InputAction> {
        if event.key == RawKey::ESCAPE {
            return Some(InputAction::Shutdown);
        }
        let ch = translate(event.key, event.mods)?;
        if matches!(ch, ':' | ';') && !event.mods.is_empty() {
            debug!("entering command mode");
            self.buffer.clear();
            self.mode = InputMode::CommandEntry;
            return None;
        }
        Some(InputAction::Hotkey {
            ch,
            boosted: !event.mods.is_empty(),
        })
    }

    fn handle_command(&mut self, event: KeyEvent) -> Option<InputAction> {
        match event.key {
            RawKey::ESCAPE => {
                debug!(buffer = %self.buffer.text(), "command cancelled");
                self.buffer.clear();
                self.mode = InputMode::Normal;
                None
            }
            RawKey::BACKSPACE => {
                self.buffer.pop();
                None
            }
            key if key.is_enter() => {
                self.mode = InputMode::Normal;
                Some(InputAction::Commit(self.buffer.take()))
            }
            key => {
                if let Some(ch) = translate(key, event.mods).filter(|ch| allowed_in_command(*ch)) {
                    self.buffer.push(ch);
                }
                None
            }
        }
    }
}

fn allowed_in_command(ch: char) -> bool {
    ch.is_ascii_lowercase() || ch.is_ascii_digit() || COMMAND_PUNCTUATION.contains(ch)
}

/// Convenience for tests and callers that synthesise presses.
pub fn press(ch: char, mods: Modifiers) -> KeyEvent {
    KeyEvent::press(RawKey::from_char(ch), mods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(machine: &mut InputMachine, text: &str) {
        for ch in text.chars() {
            let mods = if ch == '_' || ch == '+' || ch == '(' || ch == ')' {
                Modifiers::SHIFT
            } else {
                Modifiers::empty()
            };
            let plain = match ch {
                '_' => '-',
                '+' => '=',
                '(' => '9',
                ')' => '0',
                other => other,
            };
            machine.handle(press(plain, mods));
        }
    }

    fn enter_command_mode(machine: &mut InputMachine) {
        assert_eq!(machine.handle(press(';', Modifiers::SHIFT)), None);
        assert!(machine.in_command_mode());
    }

    fn key(key: RawKey) -> KeyEvent {
        KeyEvent::press(key, Modifiers::empty())
    }

    #[test]
    fn starts_in_normal_mode() {
        let machine = InputMachine::new();
        assert_eq!(machine.mode(), InputMode::Normal);
        assert!(machine.buffer().is_empty());
    }

    #[test]
    fn escape_in_normal_mode_requests_shutdown() {
        let mut machine = InputMachine::new();
        assert_eq!(machine.handle(key(RawKey::ESCAPE)), Some(InputAction::Shutdown));
    }

    #[test]
    fn printable_keys_are_hotkeys() {
        let mut machine = InputMachine::new();
        assert_eq!(
            machine.handle(press('b', Modifiers::empty())),
            Some(InputAction::Hotkey {
                ch: 'b',
                boosted: false
            })
        );
        assert_eq!(
            machine.handle(press('=', Modifiers::SHIFT)),
            Some(InputAction::Hotkey {
                ch: '+',
                boosted: true
            })
        );
        assert_eq!(machine.handle(key(RawKey::TAB)), None);
    }

    #[test]
    fn semicolon_without_modifier_stays_normal() {
        let mut machine = InputMachine::new();
        assert_eq!(
            machine.handle(press(';', Modifiers::empty())),
            Some(InputAction::Hotkey {
                ch: ';',
                boosted: false
            })
        );
        assert_eq!(machine.mode(), InputMode::Normal);
    }

    #[test]
    fn entering_command_mode_starts_with_empty_buffer() {
        let mut machine = InputMachine::new();
        enter_command_mode(&mut machine);
        type_text(&mut machine, "abc");
        machine.handle(key(RawKey::ESCAPE));
        assert_eq!(machine.mode(), InputMode::Normal);

        machine.handle(press(';', Modifiers::CONTROL));
        assert!(machine.in_command_mode());
        assert!(machine.buffer().is_empty());
    }

    #[test]
    fn release_and_repeat_are_ignored() {
        let mut machine = InputMachine::new();
        let mut event = press(';', Modifiers::SHIFT);
        event.action = KeyAction::Release;
        assert_eq!(machine.handle(event), None);
        event.action = KeyAction::Repeat;
        assert_eq!(machine.handle(event), None);
        assert_eq!(machine.mode(), InputMode::Normal);
    }

    #[test]
    fn backspace_on_empty_buffer_is_a_no_op() {
        let mut machine = InputMachine::new();
        enter_command_mode(&mut machine);
        for _ in 0..3 {
            machine.handle(key(RawKey::BACKSPACE));
        }
        assert!(machine.buffer().is_empty());

        type_text(&mut machine, "ab");
        for _ in 0..5 {
            machine.handle(key(RawKey::BACKSPACE));
        }
        type_text(&mut machine, "c");
        assert_eq!(machine.buffer().text(), "c");
        assert!(machine.in_command_mode());
    }

    #[test]
    fn enter_commits_and_returns_to_normal() {
        let mut machine = InputMachine::new();
        enter_command_mode(&mut machine);
        type_text(&mut machine, "blink_freq 5");
        assert_eq!(
            machine.handle(key(RawKey::KP_ENTER)),
            Some(InputAction::Commit("blink_freq 5".into()))
        );
        assert_eq!(machine.mode(), InputMode::Normal);
        assert!(machine.buffer().is_empty());
    }

    #[test]
    fn disallowed_characters_are_dropped() {
        let mut machine = InputMachine::new();
        enter_command_mode(&mut machine);
        machine.handle(press('a', Modifiers::SHIFT));
        machine.handle(press('/', Modifiers::empty()));
        machine.handle(press(';', Modifiers::empty()));
        machine.handle(press('1', Modifiers::SHIFT));
        type_text(&mut machine, "x(1, 2)");
        assert_eq!(machine.buffer().text(), "x(1, 2)");
    }
}
