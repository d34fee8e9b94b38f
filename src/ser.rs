//! Render trips, headers and shots as survey data text.
//!
//! Output follows the fixed-column layout survey files are written in. Every
//! number is written in feet or degrees with two decimal places, right-aligned
//! in an 8 character column; absent values are written as `-9999.00`. The
//! display units in a header's format code are written into the `FORMAT:`
//! field but never change the numbers.
//!
//! ```
//! use compassformat::survey::Shot;
//! use compassformat::units::{Angle, Length};
//! use compassformat::ser::shot_to_string;
//!
//! let mut shot = Shot::new("A3", "A4", Length::feet(4.25));
//! shot.frontsight_azimuth = Some(Angle::degrees(15.0));
//! assert_eq!(
//!     shot_to_string(&shot, false),
//!     "          A3           A4     4.25    15.00 -9999.00 -9999.00 -9999.00 -9999.00 -9999.00"
//! );
//! ```
//!
//! The `*_to_string` functions use the file format's native `\r\n` line
//! endings. Use the `*_to_string_custom` variants with a [`SerSettings`] to
//! change that.
use std::fmt::Display;

use itertools::Itertools;

use crate::parsing::ABSENT_MEASUREMENT;
use crate::scanner::FORM_FEED;
use crate::survey::{Shot, Trip, TripHeader};
use crate::units::{Angle, AngleUnit, Length, LengthUnit};

const COLUMN_TITLES: &str = "        FROM           TO   LENGTH  BEARING      INC     LEFT       UP     DOWN    RIGHT";
const BACKSIGHT_COLUMN_TITLES: &str = "     AZM2     INC2";
const TRAILING_COLUMN_TITLES: &str = "   FLAGS  COMMENTS";

/// The line terminator written between lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineEnding {
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::CrLf => "\r\n",
            LineEnding::Lf => "\n",
        }
    }
}

/// Settings to modify how survey data is written.
///
/// Create with `default()` and chain the setters:
///
/// ```
/// # use compassformat::ser::{LineEnding, SerSettings};
/// let settings = SerSettings::default().line_ending(LineEnding::Lf);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SerSettings {
    line_ending: LineEnding,
}

impl SerSettings {
    /// Set the line terminator. The default is `\r\n`.
    pub fn line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    fn eol(&self) -> &'static str {
        self.line_ending.as_str()
    }
}

impl Default for SerSettings {
    fn default() -> Self {
        Self { line_ending: LineEnding::CrLf }
    }
}

/// Render a trip header, ending with a line terminator.
pub fn header_to_string(header: &TripHeader) -> String {
    header_to_string_custom(header, SerSettings::default())
}

/// Render a trip header with custom settings.
pub fn header_to_string_custom(header: &TripHeader, settings: SerSettings) -> String {
    let date = header.date;
    let mut declination_line = format!(
        "DECLINATION: {:>7}  FORMAT: {}  CORRECTIONS: {} {} {}",
        format_number(header.declination.get(AngleUnit::Degrees)),
        header.format,
        format_number(header.frontsight_azimuth_correction.get(AngleUnit::Degrees)),
        format_number(header.frontsight_inclination_correction.get(AngleUnit::Degrees)),
        format_number(header.length_correction.get(LengthUnit::Feet)),
    );
    if let (Some(azm), Some(inc)) = (header.backsight_azimuth_correction, header.backsight_inclination_correction) {
        declination_line.push_str(&format!("  CORRECTIONS2: {} {}",
                                           format_number(azm.get(AngleUnit::Degrees)),
                                           format_number(inc.get(AngleUnit::Degrees))));
    }

    let lines = [
        header.cave_name.clone().unwrap_or_default(),
        format!("SURVEY NAME: {}", header.survey_name.as_deref().unwrap_or("")),
        format!("SURVEY DATE: {} {} {}  COMMENT:{}",
                date.month, date.day, date.year, header.comment.as_deref().unwrap_or("")),
        "SURVEY TEAM:".to_owned(),
        format_surveyors(header),
        declination_line,
    ];

    let eol = settings.eol();
    lines.iter().map(|l| format!("{l}{eol}")).collect()
}

/// Choose the text for the line after `SURVEY TEAM:`. Empty raw text counts as missing.
fn format_surveyors(header: &TripHeader) -> String {
    if let Some(raw) = header.raw_surveyors.as_deref().filter(|r| !r.is_empty()) {
        return raw.to_owned();
    }
    if header.surveyors.is_empty() {
        return "?".to_owned();
    }
    let sep = if header.surveyors.iter().any(|s| s.contains(',')) { ";" } else { "," };
    header.surveyors.iter().join(sep)
}

/// Render one shot as a single line with no terminator.
///
/// `include_backsights` should be the owning trip header's backsight flag;
/// the backsight columns are written only if it is `true`.
pub fn shot_to_string(shot: &Shot, include_backsights: bool) -> String {
    let mut line = format!(
        " {:>11} {:>12} {} {} {} {} {} {} {}",
        shot.from_station,
        shot.to_station,
        length_column(Some(shot.length)),
        angle_column(shot.frontsight_azimuth),
        angle_column(shot.frontsight_inclination),
        length_column(shot.left),
        length_column(shot.up),
        length_column(shot.down),
        length_column(shot.right),
    );
    if include_backsights {
        line.push(' ');
        line.push_str(&angle_column(shot.backsight_azimuth));
        line.push(' ');
        line.push_str(&angle_column(shot.backsight_inclination));
    }

    let flags = if shot.has_flags() {
        format!(" #|{}#", flag_letters(shot))
    } else {
        String::new()
    };
    line.push_str(&format!("   {flags:<6} {}", shot.comment.as_deref().unwrap_or("")));

    line.truncate(line.trim_end().len());
    line
}

fn flag_letters(shot: &Shot) -> String {
    [
        (shot.excluded_from_length, 'L'),
        (shot.excluded_from_plotting, 'P'),
        (shot.excluded_from_all_processing, 'X'),
        (shot.do_not_adjust, 'C'),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, c)| c)
    .collect()
}

/// Render a trip: its header, the column titles, and one line per shot.
///
/// The result does not end with a line terminator.
pub fn trip_to_string(trip: &Trip) -> String {
    trip_to_string_custom(trip, SerSettings::default())
}

/// Render a trip with custom settings.
pub fn trip_to_string_custom(trip: &Trip, settings: SerSettings) -> String {
    let eol = settings.eol();
    let header = trip.header();
    let backsights = header.has_backsights();

    let mut out = header_to_string_custom(header, settings);
    out.push_str(eol);
    out.push_str(COLUMN_TITLES);
    if backsights {
        out.push_str(BACKSIGHT_COLUMN_TITLES);
    }
    out.push_str(TRAILING_COLUMN_TITLES);
    out.push_str(eol);
    out.push_str(eol);
    out.push_str(&trip.shots().iter().map(|s| shot_to_string(s, backsights)).join(eol));
    out
}

/// Render a sequence of trips as a whole survey file, with each trip
/// followed by a form feed line.
pub fn trips_to_string<'t, I: IntoIterator<Item = &'t Trip>>(trips: I) -> String {
    trips_to_string_custom(trips, SerSettings::default())
}

/// Render a sequence of trips with custom settings.
pub fn trips_to_string_custom<'t, I: IntoIterator<Item = &'t Trip>>(trips: I, settings: SerSettings) -> String {
    let eol = settings.eol();
    let mut out = String::new();
    for trip in trips {
        out.push_str(&trip_to_string_custom(trip, settings));
        out.push_str(eol);
        out.push(FORM_FEED);
        out.push_str(eol);
    }
    out
}

impl Display for TripHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", header_to_string(self))
    }
}

/// Backsight columns follow the owning trip's header. A shot not in a trip
/// gets them if either backsight value is present.
impl Display for Shot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backsights = self.trip_has_backsights()
            .unwrap_or(self.backsight_azimuth.is_some() || self.backsight_inclination.is_some());
        write!(f, "{}", shot_to_string(self, backsights))
    }
}

impl Display for Trip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", trip_to_string(self))
    }
}

fn length_column(value: Option<Length>) -> String {
    let v = value.map_or(ABSENT_MEASUREMENT, |l| l.get(LengthUnit::Feet));
    format!("{:>8}", format_number(v))
}

fn angle_column(value: Option<Angle>) -> String {
    let v = value.map_or(ABSENT_MEASUREMENT, |a| a.get(AngleUnit::Degrees));
    format!("{:>8}", format_number(v))
}

/// Two decimal places; values that round to zero never get a minus sign.
fn format_number(v: f64) -> String {
    let s = format!("{v:.2}");
    if s == "-0.00" { "0.00".to_owned() } else { s }
}
