//! Keyboard commands of the labeling window

use cloudlabel_core::ClassId;

pub const HELP_MESSAGE: &str = "
classify window keyboard controls:
  Q / Esc: Quit and save the labels.
  A: Make the currently selected point bigger.
  Z: Make the currently selected point smaller.
  C: Center the camera view on the currently selected point.
  U: Undo last classification (lets you reclassify the previous point).
  S: Show statistics. Prints class counts.
  Spacebar: Skip this point (does not add a label for this point).
  0-9: Classify the point as that class and move to the next one.
  Mouse: drag to orbit, right-drag to pan, scroll to zoom, R resets the view.
";

/// Cursor growth factor for `A`
pub const GROW_FACTOR: f32 = 1.1;
/// Cursor shrink factor for `Z`
pub const SHRINK_FACTOR: f32 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Assign(ClassId),
    Skip,
    Undo,
    Resize(f32),
    Center,
    Statistics,
}

impl Command {
    /// Command bound to a key; letters are case-insensitive.
    ///
    /// Quitting is left to the viewer, which saves on exit.
    pub fn from_key(key: char) -> Option<Self> {
        if let Some(class) = ClassId::from_digit(key) {
            return Some(Command::Assign(class));
        }
        match key.to_ascii_uppercase() {
            ' ' => Some(Command::Skip),
            'U' => Some(Command::Undo),
            'A' => Some(Command::Resize(GROW_FACTOR)),
            'Z' => Some(Command::Resize(SHRINK_FACTOR)),
            'C' => Some(Command::Center),
            'S' => Some(Command::Statistics),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_bindings() {
        for digit in '0'..='9' {
            let expected = ClassId::from_digit(digit).unwrap();
            assert_eq!(Command::from_key(digit), Some(Command::Assign(expected)));
        }
        assert_eq!(Command::from_key(' '), Some(Command::Skip));
        assert_eq!(Command::from_key('u'), Some(Command::Undo));
        assert_eq!(Command::from_key('U'), Some(Command::Undo));
        assert_eq!(Command::from_key('a'), Some(Command::Resize(GROW_FACTOR)));
        assert_eq!(Command::from_key('Z'), Some(Command::Resize(SHRINK_FACTOR)));
        assert_eq!(Command::from_key('c'), Some(Command::Center));
        assert_eq!(Command::from_key('s'), Some(Command::Statistics));
        assert_eq!(Command::from_key('q'), None);
        assert_eq!(Command::from_key('x'), None);
    }
}
