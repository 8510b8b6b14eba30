// Discrete drive commands and the input aggregation that selects them
//
// Each logical control can be held by several sources at once (a keyboard key
// and an on-screen cell); a control is pressed while any source holds it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Error types for command parsing
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown drive command: {0:?}")]
    Unknown(String),
}

/// One of the single-character commands understood by the robot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DriveCommand {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
    Rotate,
    #[default]
    Stop,
}

impl DriveCommand {
    pub const ALL: [DriveCommand; 10] = [
        DriveCommand::NorthWest,
        DriveCommand::North,
        DriveCommand::NorthEast,
        DriveCommand::West,
        DriveCommand::East,
        DriveCommand::SouthWest,
        DriveCommand::South,
        DriveCommand::SouthEast,
        DriveCommand::Rotate,
        DriveCommand::Stop,
    ];

    /// Character sent over the wire
    pub fn as_char(self) -> char {
        match self {
            DriveCommand::NorthWest => 'q',
            DriveCommand::North => 'w',
            DriveCommand::NorthEast => 'e',
            DriveCommand::West => 'a',
            DriveCommand::East => 'd',
            DriveCommand::SouthWest => 'z',
            DriveCommand::South => 's',
            DriveCommand::SouthEast => 'c',
            DriveCommand::Rotate => 'x',
            DriveCommand::Stop => ' ',
        }
    }

    /// Byte written to the serial link
    pub fn as_byte(self) -> u8 {
        self.as_char() as u8
    }
}

impl TryFrom<char> for DriveCommand {
    type Error = CommandError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        DriveCommand::ALL
            .into_iter()
            .find(|cmd| cmd.as_char() == c)
            .ok_or_else(|| CommandError::Unknown(c.to_string()))
    }
}

impl FromStr for DriveCommand {
    type Err = CommandError;

    /// Parses exactly one command character
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                DriveCommand::try_from(c).map_err(|_| CommandError::Unknown(s.to_string()))
            }
            _ => Err(CommandError::Unknown(s.to_string())),
        }
    }
}

impl TryFrom<String> for DriveCommand {
    type Error = CommandError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DriveCommand> for String {
    fn from(cmd: DriveCommand) -> Self {
        cmd.as_char().to_string()
    }
}

impl fmt::Display for DriveCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_char())
    }
}

/// Logical controls: 8 compass directions plus the explicit rotate control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
    Rotate,
}

impl Control {
    /// Keyboard binding: q w e / a d / z s c, and x for rotate
    pub fn from_key(key: char) -> Option<Control> {
        let control = match key.to_ascii_lowercase() {
            'q' => Control::NorthWest,
            'w' => Control::North,
            'e' => Control::NorthEast,
            'a' => Control::West,
            'd' => Control::East,
            'z' => Control::SouthWest,
            's' => Control::South,
            'c' => Control::SouthEast,
            'x' => Control::Rotate,
            _ => return None,
        };
        Some(control)
    }
}

/// Where a press came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputSource {
    Keyboard,
    Pointer,
}

/// Pressed state of every control, per source
#[derive(Debug, Clone, Default)]
pub struct InputState {
    held: HashMap<Control, HashSet<InputSource>>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if this changed the state
    pub fn press(&mut self, control: Control, source: InputSource) -> bool {
        self.held.entry(control).or_default().insert(source)
    }

    /// Returns true if this changed the state
    pub fn release(&mut self, control: Control, source: InputSource) -> bool {
        self.held
            .get_mut(&control)
            .is_some_and(|sources| sources.remove(&source))
    }

    /// Drop every control held by `source`
    pub fn release_source(&mut self, source: InputSource) -> bool {
        let mut changed = false;
        for sources in self.held.values_mut() {
            changed |= sources.remove(&source);
        }
        changed
    }

    pub fn is_pressed(&self, control: Control) -> bool {
        self.held.get(&control).is_some_and(|sources| !sources.is_empty())
    }

    fn any_pressed(&self, controls: &[Control]) -> bool {
        controls.iter().any(|&c| self.is_pressed(c))
    }

    /// Returns (x, y): each -1, 0 or 1; +y is north, +x is east
    pub fn axes(&self) -> (i8, i8) {
        use Control::*;
        let y = self.any_pressed(&[NorthWest, North, NorthEast]) as i8
            - self.any_pressed(&[SouthWest, South, SouthEast]) as i8;
        let x = self.any_pressed(&[NorthEast, East, SouthEast]) as i8
            - self.any_pressed(&[NorthWest, West, SouthWest]) as i8;
        (x, y)
    }
}

/// Select the single active command for the current input state
///
/// Rotate overrides everything; opposing directions cancel out.
pub fn encode(input: &InputState) -> DriveCommand {
    if input.is_pressed(Control::Rotate) {
        return DriveCommand::Rotate;
    }

    let (x, y) = input.axes();
    match (y.signum(), x.signum()) {
        (1, -1) => DriveCommand::NorthWest,
        (1, 1) => DriveCommand::NorthEast,
        (1, _) => DriveCommand::North,
        (-1, -1) => DriveCommand::SouthWest,
        (-1, 1) => DriveCommand::SouthEast,
        (-1, _) => DriveCommand::South,
        (_, -1) => DriveCommand::West,
        (_, 1) => DriveCommand::East,
        _ => DriveCommand::Stop,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pressed(controls: &[(Control, InputSource)]) -> InputState {
        let mut input = InputState::new();
        for &(control, source) in controls {
            input.press(control, source);
        }
        input
    }

    #[test]
    fn test_command_characters() {
        let chars: String = DriveCommand::ALL.iter().map(|c| c.as_char()).collect();
        assert_eq!(chars, "qweadzscx ");
        assert_eq!(DriveCommand::Stop.as_byte(), b' ');
    }

    #[test]
    fn test_parse_command() {
        assert_eq!("w".parse::<DriveCommand>(), Ok(DriveCommand::North));
        assert_eq!(" ".parse::<DriveCommand>(), Ok(DriveCommand::Stop));
        assert!("".parse::<DriveCommand>().is_err());
        assert!("ww".parse::<DriveCommand>().is_err());
        assert!("k".parse::<DriveCommand>().is_err());
        assert!(DriveCommand::try_from('W').is_err());
    }

    #[test]
    fn test_serde_as_single_char() {
        let json = serde_json::to_string(&DriveCommand::SouthEast).unwrap();
        assert_eq!(json, "\"c\"");
        let cmd: DriveCommand = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(cmd, DriveCommand::Rotate);
        assert!(serde_json::from_str::<DriveCommand>("\"r\"").is_err());
    }

    #[test]
    fn test_north_from_keyboard_or_pointer() {
        let key = pressed(&[(Control::North, InputSource::Keyboard)]);
        let cell = pressed(&[(Control::North, InputSource::Pointer)]);
        assert_eq!(encode(&key), DriveCommand::North);
        assert_eq!(encode(&cell), DriveCommand::North);
    }

    #[test]
    fn test_nothing_pressed_is_stop() {
        assert_eq!(encode(&InputState::new()), DriveCommand::Stop);

        let mut input = pressed(&[(Control::East, InputSource::Keyboard)]);
        input.release(Control::East, InputSource::Keyboard);
        assert_eq!(encode(&input), DriveCommand::Stop);
    }

    #[test]
    fn test_rotate_overrides_directions() {
        let input = pressed(&[
            (Control::North, InputSource::Keyboard),
            (Control::West, InputSource::Pointer),
            (Control::Rotate, InputSource::Keyboard),
        ]);
        assert_eq!(encode(&input), DriveCommand::Rotate);
    }

    #[test]
    fn test_diagonals_from_combined_controls() {
        use Control::*;
        use InputSource::*;
        let cases = [
            (vec![(North, Keyboard), (West, Pointer)], DriveCommand::NorthWest),
            (vec![(North, Keyboard), (East, Keyboard)], DriveCommand::NorthEast),
            (vec![(South, Keyboard), (West, Keyboard)], DriveCommand::SouthWest),
        ];
        for (controls, expected) in cases {
            assert_eq!(encode(&pressed(&controls)), expected);
        }
        assert_eq!(encode(&pressed(&[(SouthEast, Pointer)])), DriveCommand::SouthEast);
        assert_eq!(encode(&pressed(&[(West, Keyboard)])), DriveCommand::West);
    }

    #[test]
    fn test_opposites_cancel() {
        use Control::*;
        use InputSource::*;
        let input = pressed(&[(North, Keyboard), (South, Pointer)]);
        assert_eq!(input.axes(), (0, 0));
        assert_eq!(encode(&input), DriveCommand::Stop);

        // NE + NW: both x contributions cancel, y stays
        let input = pressed(&[(NorthEast, Keyboard), (NorthWest, Keyboard)]);
        assert_eq!(input.axes(), (0, 1));
        assert_eq!(encode(&input), DriveCommand::North);
    }

    #[test]
    fn test_sources_are_ored() {
        let mut input = pressed(&[
            (Control::East, InputSource::Keyboard),
            (Control::East, InputSource::Pointer),
        ]);
        input.release(Control::East, InputSource::Keyboard);
        assert!(input.is_pressed(Control::East));
        input.release(Control::East, InputSource::Pointer);
        assert!(!input.is_pressed(Control::East));
    }

    #[test]
    fn test_release_source() {
        let mut input = pressed(&[
            (Control::North, InputSource::Keyboard),
            (Control::West, InputSource::Keyboard),
            (Control::East, InputSource::Pointer),
        ]);
        assert!(input.release_source(InputSource::Keyboard));
        assert_eq!(encode(&input), DriveCommand::East);
        assert!(!input.release_source(InputSource::Keyboard));
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Control::from_key('w'), Some(Control::North));
        assert_eq!(Control::from_key('X'), Some(Control::Rotate));
        assert_eq!(Control::from_key('r'), None);
    }

    #[test]
    fn test_input_source_serde() {
        let source: InputSource = serde_json::from_str("\"pointer\"").unwrap();
        assert_eq!(source, InputSource::Pointer);
        assert_eq!(serde_json::to_string(&InputSource::Keyboard).unwrap(), "\"keyboard\"");
    }
}
