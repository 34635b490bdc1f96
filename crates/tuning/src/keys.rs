//! Raw key codes and their translation into logical characters.
//!
//! Key identifiers follow the GLFW numbering: printable keys carry the ASCII
//! code of their unshifted US-layout legend (letters upper-case), named keys
//! live above 255.

use bitflags::bitflags;

bitflags! {
    /// Modifier keys held while a key event fired.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CONTROL = 0b0010;
        const ALT = 0b0100;
        const SUPER = 0b1000;
    }
}

/// Identifier of a physical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawKey(pub u32);

impl RawKey {
    pub const SPACE: RawKey = RawKey(32);
    pub const ESCAPE: RawKey = RawKey(256);
    pub const ENTER: RawKey = RawKey(257);
    pub const TAB: RawKey = RawKey(258);
    pub const BACKSPACE: RawKey = RawKey(259);
    pub const KP_ENTER: RawKey = RawKey(335);

    /// Key whose unshifted legend is `ch`.
    pub fn from_char(ch: char) -> RawKey {
        RawKey(u32::from(ch.to_ascii_uppercase()))
    }

    pub fn is_enter(self) -> bool {
        self == RawKey::ENTER || self == RawKey::KP_ENTER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
    Repeat,
}

/// A single keyboard event as delivered by the windowing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: RawKey,
    pub action: KeyAction,
    pub mods: Modifiers,
}

impl KeyEvent {
    pub fn press(key: RawKey, mods: Modifiers) -> Self {
        Self {
            key,
            action: KeyAction::Press,
            mods,
        }
    }
}

/// Shifted counterparts of the non-letter keys on a US layout.
const SHIFT_MAP: [(char, char); 21] = [
    ('-', '_'),
    ('=', '+'),
    ('9', '('),
    ('0', ')'),
    ('[', '{'),
    (']', '}'),
    (';', ':'),
    ('\'', '"'),
    (',', '<'),
    ('.', '>'),
    ('/', '?'),
    ('\\', '|'),
    ('`', '~'),
    ('1', '!'),
    ('2', '@'),
    ('3', '#'),
    ('4', '$'),
    ('5', '%'),
    ('6', '^'),
    ('7', '&'),
    ('8', '*'),
];

/// Maps a key plus modifiers to the character it types.
///
/// Keys outside printable ASCII yield `None`; only the shift bit affects
/// the result.
pub fn translate(key: RawKey, mods: Modifiers) -> Option<char> {
    let code = u8::try_from(key.0).ok().filter(|code| (32..=126).contains(code))?;
    let base = char::from(code).to_ascii_lowercase();
    if !mods.contains(Modifiers::SHIFT) {
        return Some(base);
    }
    let shifted = SHIFT_MAP
        .iter()
        .find(|(plain, _)| *plain == base)
        .map(|&(_, shifted)| shifted)
        .unwrap_or_else(|| base.to_ascii_uppercase());
    Some(shifted)
}
