//! Represent trip FORMAT codes as Rust types.
//!
//! Every trip header carries a short code such as `DDDDLUDRADLBF` that says
//! which units the trip's values are displayed in, what order the LRUD and
//! shot-measurement columns are listed in, whether the shots carry backsights,
//! and which station the LRUDs belong to. Parse one into a [`FormatCode`] with
//! its `parse` method:
//!
//! ```
//! # use compassformat::format_specs::{FormatCode, LrudItem, StationSide};
//! let fc = FormatCode::parse("DDDDLUDRADLBF").unwrap();
//! assert_eq!(fc.lrud_order, [LrudItem::Left, LrudItem::Up, LrudItem::Down, LrudItem::Right]);
//! assert!(fc.has_backsights);
//! assert_eq!(fc.lrud_association, Some(StationSide::From));
//! ```
//!
//! The [`Display`] implementation writes the code back out, so a header can be
//! re-rendered with the same settings it was read with.
use std::fmt::Display;

use itertools::Itertools;

/// Represents an error decoding a format code.
///
/// `offset` is the byte offset of the offending character within the code
/// (equal to the code's length if a character is missing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatCodeError {
    pub offset: usize,
    pub message: String,
}

impl FormatCodeError {
    fn new(offset: usize, message: String) -> Self {
        Self { offset, message }
    }
}

impl Display for FormatCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl std::error::Error for FormatCodeError {}

/// A setting that is written as a single character in a format code.
pub trait CodeChar: Sized + Copy {
    /// Name used in error messages, e.g. "azimuth unit"
    const ITEM: &'static str;

    /// Decode one character, `None` if it is not in this setting's alphabet.
    fn from_code(c: char) -> Option<Self>;

    /// The character this setting is written as.
    fn code(self) -> char;
}

/// Unit azimuths are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayAzimuthUnit {
    Degrees,
    /// Quadrant bearings, e.g. N45E
    Quads,
    Gradians,
}

impl CodeChar for DisplayAzimuthUnit {
    const ITEM: &'static str = "azimuth unit";

    fn from_code(c: char) -> Option<Self> {
        match c {
            'D' => Some(Self::Degrees),
            'Q' => Some(Self::Quads),
            'G' => Some(Self::Gradians),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            Self::Degrees => 'D',
            Self::Quads => 'Q',
            Self::Gradians => 'G',
        }
    }
}

/// Unit shot lengths and LRUDs are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayLengthUnit {
    DecimalFeet,
    FeetAndInches,
    Meters,
}

impl CodeChar for DisplayLengthUnit {
    const ITEM: &'static str = "length unit";

    fn from_code(c: char) -> Option<Self> {
        match c {
            'D' => Some(Self::DecimalFeet),
            'I' => Some(Self::FeetAndInches),
            'M' => Some(Self::Meters),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            Self::DecimalFeet => 'D',
            Self::FeetAndInches => 'I',
            Self::Meters => 'M',
        }
    }
}

/// Unit inclinations are displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DisplayInclinationUnit {
    Degrees,
    PercentGrade,
    DegreesAndMinutes,
    Gradians,
    DepthGauge,
}

impl CodeChar for DisplayInclinationUnit {
    const ITEM: &'static str = "inclination unit";

    fn from_code(c: char) -> Option<Self> {
        match c {
            'D' => Some(Self::Degrees),
            'G' => Some(Self::PercentGrade),
            'M' => Some(Self::DegreesAndMinutes),
            'R' => Some(Self::Gradians),
            'W' => Some(Self::DepthGauge),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            Self::Degrees => 'D',
            Self::PercentGrade => 'G',
            Self::DegreesAndMinutes => 'M',
            Self::Gradians => 'R',
            Self::DepthGauge => 'W',
        }
    }
}

/// One of the four passage dimensions recorded at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LrudItem {
    Left,
    Right,
    Up,
    Down,
}

impl CodeChar for LrudItem {
    const ITEM: &'static str = "lrud item";

    fn from_code(c: char) -> Option<Self> {
        match c {
            'L' => Some(Self::Left),
            'R' => Some(Self::Right),
            'U' => Some(Self::Up),
            'D' => Some(Self::Down),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            Self::Left => 'L',
            Self::Right => 'R',
            Self::Up => 'U',
            Self::Down => 'D',
        }
    }
}

/// One of the measurements of a shot.
///
/// Lowercase codes (`a`, `d`) are the backsight readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ShotMeasurementItem {
    Length,
    FrontsightAzimuth,
    FrontsightInclination,
    BacksightAzimuth,
    BacksightInclination,
}

impl ShotMeasurementItem {
    /// `true` for the backsight azimuth and inclination
    pub fn is_backsight(&self) -> bool {
        matches!(self, Self::BacksightAzimuth | Self::BacksightInclination)
    }
}

impl CodeChar for ShotMeasurementItem {
    const ITEM: &'static str = "shot measurement item";

    fn from_code(c: char) -> Option<Self> {
        match c {
            'L' => Some(Self::Length),
            'A' => Some(Self::FrontsightAzimuth),
            'D' => Some(Self::FrontsightInclination),
            'a' => Some(Self::BacksightAzimuth),
            'd' => Some(Self::BacksightInclination),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            Self::Length => 'L',
            Self::FrontsightAzimuth => 'A',
            Self::FrontsightInclination => 'D',
            Self::BacksightAzimuth => 'a',
            Self::BacksightInclination => 'd',
        }
    }
}

/// Which end of a shot its LRUDs were measured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StationSide {
    From,
    To,
}

impl CodeChar for StationSide {
    const ITEM: &'static str = "lrud association";

    fn from_code(c: char) -> Option<Self> {
        match c {
            'F' => Some(Self::From),
            'T' => Some(Self::To),
            _ => None,
        }
    }

    fn code(self) -> char {
        match self {
            Self::From => 'F',
            Self::To => 'T',
        }
    }
}

macro_rules! display_code_char {
    ($($t:ty),+) => {
        $(
            impl Display for $t {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.code())
                }
            }
        )+
    };
}

display_code_char!(DisplayAzimuthUnit, DisplayLengthUnit, DisplayInclinationUnit, LrudItem, ShotMeasurementItem, StationSide);

/// A decoded trip format code.
///
/// The display units only describe how the original program shows values;
/// they never change how numbers are stored in a survey file (always feet and
/// degrees) or the physical column order of shot lines.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FormatCode {
    pub display_azimuth_unit: DisplayAzimuthUnit,
    pub display_length_unit: DisplayLengthUnit,
    pub display_lrud_unit: DisplayLengthUnit,
    pub display_inclination_unit: DisplayInclinationUnit,
    /// A permutation of all four LRUD items
    pub lrud_order: [LrudItem; 4],
    /// Three items or five
    pub shot_measurement_order: Vec<ShotMeasurementItem>,
    pub has_backsights: bool,
    pub lrud_association: Option<StationSide>,
}

impl Default for FormatCode {
    fn default() -> Self {
        Self {
            display_azimuth_unit: DisplayAzimuthUnit::Degrees,
            display_length_unit: DisplayLengthUnit::DecimalFeet,
            display_lrud_unit: DisplayLengthUnit::DecimalFeet,
            display_inclination_unit: DisplayInclinationUnit::Degrees,
            lrud_order: [LrudItem::Left, LrudItem::Up, LrudItem::Down, LrudItem::Right],
            shot_measurement_order: vec![
                ShotMeasurementItem::Length,
                ShotMeasurementItem::FrontsightAzimuth,
                ShotMeasurementItem::FrontsightInclination,
            ],
            has_backsights: false,
            lrud_association: None,
        }
    }
}

impl FormatCode {
    /// Decode a format code.
    ///
    /// The layout is positional:
    ///
    /// | chars | meaning |
    /// |-------|---------|
    /// | 0     | azimuth unit (`D`, `Q`, `G`) |
    /// | 1, 2  | length and LRUD units (`D`, `I`, `M`) |
    /// | 3     | inclination unit (`D`, `G`, `M`, `R`, `W`) |
    /// | 4-7   | LRUD order, a permutation of `LRUD` |
    /// | 8-10  | shot measurement order from `L`, `A`, `D`, `a`, `d`; 8-12 if the code has 15 or more characters, or 14 with a measurement letter at 11 |
    /// | next  | `B` if the shots have backsights (only read for codes longer than 11 characters) |
    /// | next  | LRUD association `F` or `T` (only read if the code has a character left) |
    ///
    /// Any characters after these are ignored.
    pub fn parse(code: &str) -> Result<Self, FormatCodeError> {
        let mut rdr = CodeReader { code, chars: code.char_indices().collect(), idx: 0 };
        let n = rdr.chars.len();

        let display_azimuth_unit: DisplayAzimuthUnit = rdr.next_item()?;
        let display_length_unit: DisplayLengthUnit = rdr.next_item()?;
        let display_lrud_unit = rdr.next_item::<DisplayLengthUnit>()
            .map_err(|e| rename_item(e, "length unit", "lrud unit"))?;
        let display_inclination_unit: DisplayInclinationUnit = rdr.next_item()?;

        let mut lrud_order: Vec<LrudItem> = Vec::with_capacity(4);
        for _ in 0..4 {
            let offset = rdr.offset();
            let item: LrudItem = rdr.next_item()?;
            if lrud_order.contains(&item) {
                return Err(FormatCodeError::new(offset, "duplicate lrud item".to_owned()));
            }
            lrud_order.push(item);
        }

        // five items and a backsight flag with no association is 14 characters
        let five_items_no_association = n == 14
            && rdr.chars.get(11).is_some_and(|(_, c)| ShotMeasurementItem::from_code(*c).is_some());
        let n_measurements = if n >= 15 || five_items_no_association { 5 } else { 3 };
        let mut shot_measurement_order: Vec<ShotMeasurementItem> = Vec::with_capacity(n_measurements);
        for _ in 0..n_measurements {
            let offset = rdr.offset();
            let item: ShotMeasurementItem = rdr.next_item()?;
            if shot_measurement_order.contains(&item) {
                return Err(FormatCodeError::new(offset, "duplicate shot measurement item".to_owned()));
            }
            shot_measurement_order.push(item);
        }

        let has_backsights = n > 11 && rdr.next_char() == Some('B');
        let lrud_association = if rdr.idx < n { Some(rdr.next_item::<StationSide>()?) } else { None };

        Ok(Self {
            display_azimuth_unit,
            display_length_unit,
            display_lrud_unit,
            display_inclination_unit,
            lrud_order: [lrud_order[0], lrud_order[1], lrud_order[2], lrud_order[3]],
            shot_measurement_order,
            has_backsights,
            lrud_association,
        })
    }

    /// `true` if the measurement order lists both backsight readings.
    pub fn has_backsight_measurements(&self) -> bool {
        self.shot_measurement_order.iter().filter(|i| i.is_backsight()).count() == 2
    }
}

/// Writes the code back out, always including the backsight flag (`B` or `N`).
impl Display for FormatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}{}{}{}{}{}",
            self.display_azimuth_unit,
            self.display_length_unit,
            self.display_lrud_unit,
            self.display_inclination_unit,
            self.lrud_order.iter().join(""),
            self.shot_measurement_order.iter().join(""),
            if self.has_backsights { 'B' } else { 'N' },
        )?;
        if let Some(side) = self.lrud_association {
            write!(f, "{side}")?;
        }
        Ok(())
    }
}

struct CodeReader<'c> {
    code: &'c str,
    chars: Vec<(usize, char)>,
    idx: usize,
}

impl<'c> CodeReader<'c> {
    fn offset(&self) -> usize {
        self.chars.get(self.idx).map(|(i, _)| *i).unwrap_or(self.code.len())
    }

    fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.idx).map(|(_, c)| *c);
        self.idx += 1;
        c
    }

    fn next_item<T: CodeChar>(&mut self) -> Result<T, FormatCodeError> {
        let offset = self.offset();
        let c = self.chars.get(self.idx).map(|(_, c)| *c)
            .ok_or_else(|| FormatCodeError::new(offset, format!("missing {}", T::ITEM)))?;
        let item = T::from_code(c)
            .ok_or_else(|| FormatCodeError::new(offset, format!("invalid {}", T::ITEM)))?;
        self.idx += 1;
        Ok(item)
    }
}

// LRUD units share their alphabet with length units
fn rename_item(mut err: FormatCodeError, from: &str, to: &str) -> FormatCodeError {
    err.message = err.message.replace(from, to);
    err
}

#[cfg(test)]
mod tests {
    use super::*;
    use ShotMeasurementItem::*;

    #[test]
    fn test_thirteen_char_code() -> Result<(), FormatCodeError> {
        let fc = FormatCode::parse("DDDDLUDRADLBF")?;
        assert_eq!(fc.display_azimuth_unit, DisplayAzimuthUnit::Degrees);
        assert_eq!(fc.display_length_unit, DisplayLengthUnit::DecimalFeet);
        assert_eq!(fc.display_lrud_unit, DisplayLengthUnit::DecimalFeet);
        assert_eq!(fc.display_inclination_unit, DisplayInclinationUnit::Degrees);
        assert_eq!(fc.lrud_order, [LrudItem::Left, LrudItem::Up, LrudItem::Down, LrudItem::Right]);
        assert_eq!(fc.shot_measurement_order, vec![FrontsightAzimuth, FrontsightInclination, Length]);
        assert!(fc.has_backsights);
        assert_eq!(fc.lrud_association, Some(StationSide::From));
        Ok(())
    }

    #[test]
    fn test_fifteen_char_code() -> Result<(), FormatCodeError> {
        let fc = FormatCode::parse("DDDDLUDRADLadBF")?;
        assert_eq!(fc.shot_measurement_order,
                   vec![FrontsightAzimuth, FrontsightInclination, Length, BacksightAzimuth, BacksightInclination]);
        assert!(fc.has_backsight_measurements());
        assert!(fc.has_backsights);
        assert_eq!(fc.lrud_association, Some(StationSide::From));
        Ok(())
    }

    #[test]
    fn test_short_codes() -> Result<(), FormatCodeError> {
        let fc = FormatCode::parse("QMIGULRDLAD")?;
        assert_eq!(fc.display_azimuth_unit, DisplayAzimuthUnit::Quads);
        assert_eq!(fc.display_length_unit, DisplayLengthUnit::Meters);
        assert_eq!(fc.display_lrud_unit, DisplayLengthUnit::FeetAndInches);
        assert_eq!(fc.display_inclination_unit, DisplayInclinationUnit::PercentGrade);
        assert!(!fc.has_backsights, "an 11 character code has no backsight flag");
        assert_eq!(fc.lrud_association, None);

        let fc = FormatCode::parse("DDDDLUDRADLN")?;
        assert!(!fc.has_backsights);
        assert_eq!(fc.lrud_association, None, "a 12 character code has no association");

        let fc = FormatCode::parse("DDDWLUDRADLXT")?;
        assert_eq!(fc.display_inclination_unit, DisplayInclinationUnit::DepthGauge);
        assert!(!fc.has_backsights, "anything other than B means no backsights");
        assert_eq!(fc.lrud_association, Some(StationSide::To));
        Ok(())
    }

    #[test]
    fn test_errors() {
        let e = FormatCode::parse("DDDDLUDRAD").unwrap_err();
        assert_eq!(e.message, "missing shot measurement item");
        assert_eq!(e.offset, 10);

        let e = FormatCode::parse("DXDDLUDRADL").unwrap_err();
        assert_eq!(e.message, "invalid length unit");
        assert_eq!(e.offset, 1);

        let e = FormatCode::parse("DDXDLUDRADL").unwrap_err();
        assert_eq!(e.message, "invalid lrud unit");

        let e = FormatCode::parse("DDDDLUDLADL").unwrap_err();
        assert_eq!(e.message, "duplicate lrud item");
        assert_eq!(e.offset, 7);

        let e = FormatCode::parse("DDDDLUDRADLBX").unwrap_err();
        assert_eq!(e.message, "invalid lrud association");
        assert_eq!(e.offset, 12);
    }

    #[test]
    fn test_display_inverts_parse() -> Result<(), FormatCodeError> {
        for code in ["DDDDLUDRADLBF", "DDDDLUDRADLadBF", "GMIRRLDUdLaNT", "DDDDLUDRLADN"] {
            assert_eq!(FormatCode::parse(code)?.to_string(), code);
        }
        assert_eq!(FormatCode::parse("QDDDLRUDLAD")?.to_string(), "QDDDLRUDLADN");

        let five_items = FormatCode {
            shot_measurement_order: vec![Length, FrontsightAzimuth, FrontsightInclination, BacksightAzimuth, BacksightInclination],
            has_backsights: true,
            ..FormatCode::default()
        };
        assert_eq!(five_items.to_string(), "DDDDLUDRLADadB");
        assert_eq!(FormatCode::parse("DDDDLUDRLADadB")?, five_items, "five items without an association should read back");
        assert_eq!(FormatCode::parse("DDDDLUDRADLBFX")?.shot_measurement_order.len(), 3,
                   "a trailing character after a three item code should be ignored");
        assert_eq!(FormatCode::default().to_string(), "DDDDLUDRLADN");
        Ok(())
    }
}
