//! Parse survey data text into trips.
//!
//! # Basic usage
//!
//! Most callers want every trip in a file. [`parse_trips`] returns a lazy
//! iterator that parses one trip each time it is advanced:
//!
//! ```
//! use compassformat::de::parse_trips;
//!
//! let text = "SECRET CAVE\r\n\
//! SURVEY NAME: A\r\n\
//! SURVEY DATE: 7 10 79  COMMENT:Entrance Passage\r\n\
//! SURVEY TEAM:\r\n\
//! D.SMITH,R.BROWN,S.MURRAY\r\n\
//! DECLINATION: 1.00  FORMAT: DDDDLUDRLADN  CORRECTIONS: 0.00 0.00 0.00\r\n\
//! \r\n\
//!         FROM           TO   LENGTH  BEARING      INC     LEFT       UP     DOWN    RIGHT   FLAGS  COMMENTS\r\n\
//! \r\n\
//!           A1           A2    21.75    63.50   -28.00     2.60     2.60     2.60     2.60\r\n\
//! \x0c\r\n";
//!
//! let trips = parse_trips("SECRET.DAT", text).collect::<Result<Vec<_>, _>>().unwrap();
//! assert_eq!(trips.len(), 1);
//! assert_eq!(trips[0].header().survey_name.as_deref(), Some("A"));
//! assert_eq!(trips[0].shots()[0].to_station, "A2");
//! ```
//!
//! Each item is a `Result`; the first error ends the iteration, so collecting
//! into a `Result<Vec<_>, _>` gives either every trip or the first problem.
//!
//! # Lower level parsing
//!
//! [`parse_trip_header`] and [`parse_shots`] work on a [`Scanner`] directly, for
//! callers that need to parse a header or a shot table on its own.
//!
//! # Header keywords
//!
//! `SURVEY NAME:`, `SURVEY DATE:`, `SURVEY TEAM:` and `DECLINATION:` are
//! required. `FORMAT:` and `CORRECTIONS:` may be left out, in which case the
//! header gets the default [`FormatCode`] and zero corrections. `COMMENT:` may
//! follow the date on the same line or start the next line. Keywords are
//! matched without regard to case.
use std::iter::FusedIterator;

use log::{debug, trace};

use crate::format_specs::FormatCode;
use crate::parsing::{parse_angle, parse_length, parse_lrud, parse_number, parse_unsigned, Rule};
use crate::scanner::{Scanner, Token, END_OF_DATA, FORM_FEED};
use crate::survey::{Shot, SurveyDate, Trip, TripHeader, TripId};
use crate::survey_error::SResult;
use crate::units::{Angle, Length};

const SURVEY_NAME: &str = "SURVEY NAME:";

/// Parse every trip in `text`, lazily.
///
/// `source` names the text (usually its file name) in error messages.
pub fn parse_trips<'a>(source: &'a str, text: &'a str) -> Trips<'a> {
    Trips::new(Scanner::new(source, text))
}

/// Parse one trip header starting at the scanner's cursor.
///
/// On success the cursor is left at the start of the line after the header.
pub fn parse_trip_header(sc: &mut Scanner) -> SResult<TripHeader> {
    sc.skip_inline_whitespace();
    let cave_name = if sc.starts_with_ignore_case(SURVEY_NAME) {
        None
    } else {
        non_empty(sc.rest_of_line())
    };

    sc.skip_inline_whitespace();
    sc.expect_ignore_case(SURVEY_NAME)?;
    let survey_name = non_empty(sc.rest_of_line());

    sc.skip_inline_whitespace();
    sc.expect_ignore_case("SURVEY DATE:")?;
    let date = parse_date(sc)?;
    let comment = parse_comment(sc);

    sc.skip_inline_whitespace();
    sc.expect_ignore_case("SURVEY TEAM:")?;
    sc.rest_of_line();
    let raw_surveyors = sc.rest_of_line().trim().text.to_owned();
    let surveyors = split_surveyors(&raw_surveyors);

    sc.skip_inline_whitespace();
    sc.expect_ignore_case("DECLINATION:")?;
    let declination = Angle::degrees(next_number(sc, "missing declination", "invalid declination")?);

    sc.skip_inline_whitespace();
    let format = if sc.skip_ignore_case("FORMAT:") {
        parse_format_code(sc)?
    } else {
        FormatCode::default()
    };

    sc.skip_inline_whitespace();
    let (frontsight_azimuth_correction, frontsight_inclination_correction, length_correction) =
        if sc.skip_ignore_case("CORRECTIONS:") {
            (
                Angle::degrees(next_number(sc, "missing azimuth correction", "invalid azimuth correction")?),
                Angle::degrees(next_number(sc, "missing inclination correction", "invalid inclination correction")?),
                Length::feet(next_number(sc, "missing length correction", "invalid length correction")?),
            )
        } else {
            (Angle::degrees(0.0), Angle::degrees(0.0), Length::feet(0.0))
        };

    sc.skip_inline_whitespace();
    let (backsight_azimuth_correction, backsight_inclination_correction) = if sc.skip_ignore_case("CORRECTIONS2:") {
        (
            Some(Angle::degrees(next_number(sc, "missing backsight azimuth correction", "invalid backsight azimuth correction")?)),
            Some(Angle::degrees(next_number(sc, "missing backsight inclination correction", "invalid backsight inclination correction")?)),
        )
    } else {
        (None, None)
    };
    sc.rest_of_line();

    let header = TripHeader {
        cave_name,
        survey_name,
        date,
        comment,
        surveyors,
        raw_surveyors: Some(raw_surveyors),
        declination,
        format,
        frontsight_azimuth_correction,
        frontsight_inclination_correction,
        length_correction,
        backsight_azimuth_correction,
        backsight_inclination_correction,
    };
    debug!("parsed header for survey {:?} of {:?} with format {}",
           header.survey_name, header.cave_name, header.format);
    Ok(header)
}

fn parse_date(sc: &mut Scanner) -> SResult<SurveyDate> {
    let tok = sc.next_token("missing month")?;
    let month = parse_unsigned(sc, tok, "invalid month")?;
    if !(1..=12).contains(&month) {
        return Err(sc.error_at("month out of range", tok.start, tok.end()));
    }

    let tok = sc.next_token("missing day")?;
    let day = parse_unsigned(sc, tok, "invalid day")?;
    if !(1..=31).contains(&day) {
        return Err(sc.error_at("day out of range", tok.start, tok.end()));
    }

    let tok = sc.next_token("missing year")?;
    let year = parse_unsigned(sc, tok, "invalid year")?;

    // both range checked above
    Ok(SurveyDate::new(year, month as u8, day as u8))
}

fn parse_comment(sc: &mut Scanner) -> Option<String> {
    sc.skip_inline_whitespace();
    if sc.skip_ignore_case("COMMENT:") {
        return non_empty(sc.rest_of_line());
    }
    sc.rest_of_line();

    let mut ahead = sc.clone();
    ahead.skip_inline_whitespace();
    if ahead.skip_ignore_case("COMMENT:") {
        *sc = ahead;
        non_empty(sc.rest_of_line())
    } else {
        None
    }
}

fn parse_format_code(sc: &mut Scanner) -> SResult<FormatCode> {
    let tok = sc.next_token("missing format")?;
    FormatCode::parse(tok.text).map_err(|e| {
        let start = tok.start + e.offset;
        sc.error_at(e.message, start, start + 1)
    })
}

/// Split a surveyor line into names.
///
/// `?` means nobody was recorded. Names are separated by `;` if the line has
/// one anywhere, otherwise by `,`.
pub fn split_surveyors(raw: &str) -> Vec<String> {
    let raw = raw.trim();
    if raw == "?" {
        return vec![];
    }
    let sep = if raw.contains(';') { ';' } else { ',' };
    raw.split(sep)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse the shot table that follows a header, lazily.
///
/// The returned iterator stops, without consuming anything, at a form feed,
/// the end-of-data marker, the end of the input, or the start of the next
/// trip header.
pub fn parse_shots<'s, 'a>(sc: &'s mut Scanner<'a>, header: &'s TripHeader) -> Shots<'s, 'a> {
    Shots { scanner: sc, header, done: false }
}

/// Iterator over the shot lines of one trip. See [`parse_shots`].
pub struct Shots<'s, 'a> {
    scanner: &'s mut Scanner<'a>,
    header: &'s TripHeader,
    done: bool,
}

impl<'s, 'a> Shots<'s, 'a> {
    fn next_shot(&mut self) -> SResult<Option<Shot>> {
        loop {
            if self.at_table_end() {
                return Ok(None);
            }

            let sc = &mut *self.scanner;
            sc.skip_inline_whitespace();
            if sc.is_at_end_of_line() {
                trace!("skipping blank line at byte {}", sc.index());
                sc.skip_line_break();
                continue;
            }

            if let Some(shot) = parse_shot_line(sc, self.header)? {
                return Ok(Some(shot));
            }
        }
    }

    fn at_table_end(&self) -> bool {
        let mut ahead = self.scanner.clone();
        ahead.skip_inline_whitespace();
        if matches!(ahead.peek_char(), None | Some(FORM_FEED) | Some(END_OF_DATA)) {
            return true;
        }
        if ahead.starts_with_ignore_case(SURVEY_NAME) {
            return true;
        }

        // a cave name line, if the next header is not preceded by a form feed
        ahead.rest_of_line();
        ahead.skip_inline_whitespace();
        if !ahead.starts_with_ignore_case(SURVEY_NAME) {
            return false;
        }
        let mut line = self.scanner.clone();
        parse_shot_line(&mut line, self.header).is_err()
    }
}

impl<'s, 'a> Iterator for Shots<'s, 'a> {
    type Item = SResult<Shot>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_shot() {
            Ok(Some(shot)) => Some(Ok(shot)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<'s, 'a> FusedIterator for Shots<'s, 'a> {}

/// Parse one non-blank shot line. Returns `None` (having consumed the line)
/// for a line whose length is the absent sentinel.
fn parse_shot_line(sc: &mut Scanner, header: &TripHeader) -> SResult<Option<Shot>> {
    let from = sc.next_token("missing from station")?;
    let to = sc.next_token("missing to station")?;

    let tok = sc.next_token("missing length")?;
    let length = match parse_length(sc, tok, "invalid length")? {
        Some(length) => length,
        None => {
            trace!("skipping shot {} to {} with no length", from.text, to.text);
            sc.rest_of_line();
            return Ok(None);
        }
    };

    let mut shot = Shot::new(from.text, to.text, length);

    let tok = sc.next_token("missing frontsight azimuth")?;
    shot.frontsight_azimuth = parse_angle(sc, tok, "invalid frontsight azimuth")?;
    let tok = sc.next_token("missing frontsight inclination")?;
    shot.frontsight_inclination = parse_angle(sc, tok, "invalid frontsight inclination")?;

    // always written in this order, whatever the header's LRUD order says
    let tok = sc.next_token("missing left")?;
    shot.left = parse_lrud(sc, tok, "invalid left")?;
    let tok = sc.next_token("missing up")?;
    shot.up = parse_lrud(sc, tok, "invalid up")?;
    let tok = sc.next_token("missing down")?;
    shot.down = parse_lrud(sc, tok, "invalid down")?;
    let tok = sc.next_token("missing right")?;
    shot.right = parse_lrud(sc, tok, "invalid right")?;

    if header.has_backsights() {
        let tok = sc.next_token("missing backsight azimuth")?;
        shot.backsight_azimuth = parse_angle(sc, tok, "invalid azimuth")?;
        let tok = sc.next_token("missing backsight inclination")?;
        shot.backsight_inclination = parse_angle(sc, tok, "invalid inclination")?;
    }

    sc.skip_inline_whitespace();
    if sc.remaining().starts_with("#|") {
        parse_flags(sc, &mut shot)?;
    }

    shot.comment = non_empty(sc.rest_of_line());
    Ok(Some(shot))
}

fn parse_flags(sc: &mut Scanner, shot: &mut Shot) -> SResult<()> {
    let start = sc.index();
    let flags = sc.match_rule(Rule::flags)
        .ok_or_else(|| sc.error_at("unterminated flags", start, start + 2))?;

    for flag in flags.into_inner() {
        match flag.as_str() {
            "L" => shot.excluded_from_length = true,
            "P" => shot.excluded_from_plotting = true,
            "X" => shot.excluded_from_all_processing = true,
            "C" => shot.do_not_adjust = true,
            _ => {}
        }
    }
    Ok(())
}

/// Lazy iterator over the trips in a survey file. See [`parse_trips`].
///
/// Trips are numbered from 0 in the order they appear; each trip's shots
/// carry its [`TripId`].
pub struct Trips<'a> {
    scanner: Scanner<'a>,
    next_id: u32,
    done: bool,
}

impl<'a> Trips<'a> {
    pub fn new(scanner: Scanner<'a>) -> Self {
        Self { scanner, next_id: 0, done: false }
    }

    /// The cursor, positioned after the last trip parsed.
    pub fn scanner(&self) -> &Scanner<'a> {
        &self.scanner
    }

    fn next_trip(&mut self) -> SResult<Option<Trip>> {
        let sc = &mut self.scanner;
        sc.skip_whitespace();
        if sc.is_at_end() {
            return Ok(None);
        }
        if sc.peek_char() == Some(END_OF_DATA) {
            trace!("end of data marker at byte {}", sc.index());
            return Ok(None);
        }

        let header = parse_trip_header(sc)?;
        sc.skip_blank_lines();
        sc.skip_inline_whitespace();
        if sc.match_rule(Rule::column_header).is_some() {
            sc.skip_line_break();
        }
        let shots = parse_shots(sc, &header).collect::<SResult<Vec<_>>>()?;

        let id = TripId(self.next_id);
        self.next_id += 1;
        debug!("parsed trip {} ({:?}) with {} shots", id.0, header.survey_name, shots.len());
        Ok(Some(Trip::with_id(id, header, shots)))
    }
}

impl<'a> Iterator for Trips<'a> {
    type Item = SResult<Trip>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_trip() {
            Ok(Some(trip)) => Some(Ok(trip)),
            Ok(None) => {
                self.done = true;
                None
            },
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<'a> FusedIterator for Trips<'a> {}

fn next_number(sc: &mut Scanner, missing_msg: &str, invalid_msg: &str) -> SResult<f64> {
    let tok = sc.next_token(missing_msg)?;
    parse_number(sc, tok, invalid_msg)
}

fn non_empty(tok: Token) -> Option<String> {
    let text = tok.trim().text;
    if text.is_empty() { None } else { Some(text.to_owned()) }
}
