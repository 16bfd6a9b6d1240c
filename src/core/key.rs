//! # Keys and Chords
//!
//! Terminal-independent key model. The TUI adapter translates crossterm
//! events into [`KeyEvent`] values; everything above it (registries, modes,
//! the prompt) only ever sees these types.
//!
//! A chord is written as whitespace-separated keystrokes, each with optional
//! modifier prefixes:
//!
//! ```text
//! C-c        ctrl + c
//! M-x        alt + x          (A-x is accepted too)
//! g g        g, then g
//! C-x C-s    ctrl+x, then ctrl+s
//! S-tab      shift + tab
//! G          upper case G     (same as S-g)
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
    Insert,
    F(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        alt: false,
        shift: false,
    };

    pub const ALT: Self = Self {
        ctrl: false,
        alt: true,
        shift: false,
    };
}

/// A single keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Builds a normalised key event.
    ///
    /// Character keys already carry their case, so shift is dropped for them
    /// (`S-g` and `G` are the same keystroke).
    pub fn new(code: KeyCode, mut modifiers: Modifiers) -> Self {
        let code = match code {
            KeyCode::Char(c) if modifiers.shift => {
                modifiers.shift = false;
                KeyCode::Char(c.to_ascii_uppercase())
            }
            other => other,
        };
        Self { code, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), Modifiers::CTRL)
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, Modifiers::NONE)
    }
}

/// Ordered list of keystrokes forming a chord.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct KeySequence(Vec<KeyEvent>);

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: KeyEvent) {
        self.0.push(key);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> &[KeyEvent] {
        &self.0
    }

    /// True when `self` is shorter than `other` and `other` starts with it.
    pub fn is_strict_prefix_of(&self, other: &KeySequence) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<KeyEvent>> for KeySequence {
    fn from(keys: Vec<KeyEvent>) -> Self {
        Self(keys)
    }
}

impl From<KeyEvent> for KeySequence {
    fn from(key: KeyEvent) -> Self {
        Self(vec![key])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyParseError {
    #[error("empty key chord")]
    Empty,
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("expected a single keystroke, got `{0}`")]
    NotSingle(String),
}

impl FromStr for KeyEvent {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rest = s;
        let mut modifiers = Modifiers::NONE;

        // A lone "-" or "C--" must keep its trailing dash as the key.
        while rest.len() > 2 && rest.as_bytes()[1] == b'-' {
            match rest.as_bytes()[0] {
                b'C' => modifiers.ctrl = true,
                b'M' | b'A' => modifiers.alt = true,
                b'S' => modifiers.shift = true,
                _ => break,
            }
            rest = &rest[2..];
        }

        if rest.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let mut chars = rest.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(KeyEvent::new(KeyCode::Char(c), modifiers));
        }

        let code = match rest.to_ascii_lowercase().as_str() {
            "enter" | "ret" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "tab" if modifiers.shift => {
                modifiers.shift = false;
                KeyCode::BackTab
            }
            "tab" => KeyCode::Tab,
            "backtab" => KeyCode::BackTab,
            "backspace" | "bs" => KeyCode::Backspace,
            "space" | "spc" => KeyCode::Char(' '),
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pgup" | "pageup" => KeyCode::PageUp,
            "pgdn" | "pagedown" => KeyCode::PageDown,
            "delete" | "del" => KeyCode::Delete,
            "insert" | "ins" => KeyCode::Insert,
            name => match name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                Some(n) if (1..=12).contains(&n) => KeyCode::F(n),
                _ => return Err(KeyParseError::UnknownKey(rest.to_string())),
            },
        };

        Ok(KeyEvent::new(code, modifiers))
    }
}

impl FromStr for KeySequence {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let keys = s
            .split_whitespace()
            .map(str::parse)
            .collect::<Result<Vec<KeyEvent>, _>>()?;
        if keys.is_empty() {
            return Err(KeyParseError::Empty);
        }
        Ok(Self(keys))
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("C-")?;
        }
        if self.modifiers.alt {
            f.write_str("M-")?;
        }
        if self.modifiers.shift {
            f.write_str("S-")?;
        }
        match self.code {
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{c}"),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::BackTab => f.write_str("backtab"),
            KeyCode::Backspace => f.write_str("backspace"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdn"),
            KeyCode::Delete => f.write_str("delete"),
            KeyCode::Insert => f.write_str("insert"),
            KeyCode::F(n) => write!(f, "f{n}"),
        }
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ctrl_chord() {
        let keys: KeySequence = "C-c".parse().unwrap();
        assert_eq!(keys, KeySequence::from(KeyEvent::ctrl('c')));
    }

    #[test]
    fn test_parse_multi_key_chord() {
        let keys: KeySequence = "C-x  C-s".parse().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys.keys()[1], KeyEvent::ctrl('s'));
    }

    #[test]
    fn test_shift_letter_is_upper_case() {
        let shifted: KeyEvent = "S-g".parse().unwrap();
        assert_eq!(shifted, KeyEvent::char('G'));
        assert_eq!(KeyEvent::new(KeyCode::Char('g'), Modifiers { shift: true, ..Modifiers::NONE }), shifted);
    }

    #[test]
    fn test_named_keys_case_insensitive() {
        assert_eq!("Enter".parse::<KeyEvent>().unwrap(), KeyEvent::plain(KeyCode::Enter));
        assert_eq!("PgDn".parse::<KeyEvent>().unwrap(), KeyEvent::plain(KeyCode::PageDown));
        assert_eq!("f5".parse::<KeyEvent>().unwrap(), KeyEvent::plain(KeyCode::F(5)));
        assert_eq!("S-tab".parse::<KeyEvent>().unwrap(), KeyEvent::plain(KeyCode::BackTab));
    }

    #[test]
    fn test_dash_keys() {
        assert_eq!("-".parse::<KeyEvent>().unwrap(), KeyEvent::char('-'));
        assert_eq!("C--".parse::<KeyEvent>().unwrap(), KeyEvent::ctrl('-'));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<KeySequence>(), Err(KeyParseError::Empty));
        assert_eq!("   ".parse::<KeySequence>(), Err(KeyParseError::Empty));
        assert_eq!(
            "C-nope".parse::<KeySequence>(),
            Err(KeyParseError::UnknownKey("nope".to_string()))
        );
        assert!("f13".parse::<KeyEvent>().is_err());
    }

    #[test]
    fn test_display_matches_parse_input() {
        for chord in ["C-c", "g g", "M-x", "C-x C-s", "space", "f12", "G"] {
            let keys: KeySequence = chord.parse().unwrap();
            assert_eq!(keys.to_string(), chord);
        }
    }

    #[test]
    fn test_strict_prefix() {
        let g: KeySequence = "g".parse().unwrap();
        let gg: KeySequence = "g g".parse().unwrap();
        assert!(g.is_strict_prefix_of(&gg));
        assert!(!gg.is_strict_prefix_of(&gg));
        assert!(!gg.is_strict_prefix_of(&g));
    }
}
