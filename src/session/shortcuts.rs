/// History command bound to a key chord
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
}

/// A key press with its modifier state
///
/// `primary` is Ctrl on Linux/Windows and Cmd on macOS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyChord {
    pub key: char,
    pub primary: bool,
    pub shift: bool,
}

impl KeyChord {
    /// Map a chord to a history command
    ///
    /// Undo is Primary+Z; redo is Primary+Shift+Z or Primary+Y.
    pub fn command(&self) -> Option<Command> {
        if !self.primary {
            return None;
        }
        match (self.key.to_ascii_lowercase(), self.shift) {
            ('z', false) => Some(Command::Undo),
            ('z', true) | ('y', _) => Some(Command::Redo),
            _ => None,
        }
    }

    /// Parse chords such as `"ctrl+z"`, `"cmd+shift+z"` or `"ctrl+y"`
    pub fn parse(text: &str) -> Option<Self> {
        let mut chord = KeyChord { key: '\0', primary: false, shift: false };
        for part in text.split('+').map(|p| p.trim().to_ascii_lowercase()) {
            match part.as_str() {
                "ctrl" | "control" | "cmd" | "meta" | "super" => chord.primary = true,
                "shift" => chord.shift = true,
                key if key.chars().count() == 1 => chord.key = key.chars().next()?,
                _ => return None,
            }
        }
        (chord.key != '\0').then_some(chord)
    }
}
