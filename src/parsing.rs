//! Lexical rules and the numeric codec.
//!
//! Numeric fields in survey data have no explicit null; absent measurements are
//! written as out-of-range sentinels. The functions here turn raw tokens into
//! typed quantities and decode those sentinels into `None` immediately, so no
//! sentinel value ever leaves this module.
use pest::Parser;

use crate::scanner::{Scanner, Token};
use crate::survey_error::SResult;
use crate::units::{Angle, Length};

#[derive(Parser)]
#[grammar = "survey.pest"]
pub(crate) struct SurveyGrammar;

/// Lengths, azimuths and inclinations at or below this value are absent.
pub const MEASUREMENT_SENTINEL: f64 = -999.0;

/// The value written in place of an absent measurement.
pub const ABSENT_MEASUREMENT: f64 = -9999.0;

/// `true` if `s` is a whole decimal number: `[-+]?(\d+(\.\d*)?|\.\d+)`.
pub(crate) fn is_number(s: &str) -> bool {
    SurveyGrammar::parse(Rule::whole_number, s).is_ok()
}

/// `true` if `s` is a run of ASCII digits.
pub(crate) fn is_unsigned(s: &str) -> bool {
    SurveyGrammar::parse(Rule::whole_unsigned, s).is_ok()
}

/// Parse a token as a decimal number, failing with `invalid_msg` if it does not
/// match the number grammar.
pub(crate) fn parse_number(scanner: &Scanner, token: Token, invalid_msg: &str) -> SResult<f64> {
    if !is_number(token.text) {
        return Err(scanner.error_at(invalid_msg, token.start, token.end()));
    }
    token.text.parse::<f64>()
        .map_err(|_| scanner.error_at(invalid_msg, token.start, token.end()))
}

/// Parse a token of ASCII digits.
pub(crate) fn parse_unsigned(scanner: &Scanner, token: Token, invalid_msg: &str) -> SResult<u32> {
    if !is_unsigned(token.text) {
        return Err(scanner.error_at(invalid_msg, token.start, token.end()));
    }
    token.text.parse::<u32>()
        .map_err(|_| scanner.error_at(invalid_msg, token.start, token.end()))
}

/// Decode a shot length in feet; `None` if the value is the absent sentinel.
pub(crate) fn parse_length(scanner: &Scanner, token: Token, invalid_msg: &str) -> SResult<Option<Length>> {
    let v = parse_number(scanner, token, invalid_msg)?;
    Ok(decode_measurement(v).map(Length::feet))
}

/// Decode an azimuth or inclination in degrees; `None` if the value is the absent sentinel.
pub(crate) fn parse_angle(scanner: &Scanner, token: Token, invalid_msg: &str) -> SResult<Option<Angle>> {
    let v = parse_number(scanner, token, invalid_msg)?;
    Ok(decode_measurement(v).map(Angle::degrees))
}

/// Decode a passage dimension in feet; any negative value means absent.
///
/// LRUDs are always stored in feet, whatever the header says they are displayed in.
pub(crate) fn parse_lrud(scanner: &Scanner, token: Token, invalid_msg: &str) -> SResult<Option<Length>> {
    let v = parse_number(scanner, token, invalid_msg)?;
    Ok(decode_lrud(v).map(Length::feet))
}

/// Apply the measurement sentinel rule to an already-parsed value.
pub fn decode_measurement(v: f64) -> Option<f64> {
    if v <= MEASUREMENT_SENTINEL { None } else { Some(v) }
}

/// Apply the LRUD sentinel rule to an already-parsed value.
pub fn decode_lrud(v: f64) -> Option<f64> {
    if v < 0.0 { None } else { Some(v) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey_error::SResult;
    use crate::units::LengthUnit;

    #[test]
    fn test_number_grammar() {
        for s in ["1", "-1", "+1", "1.", "1.25", ".5", "-.5", "0.00", "-9999.00"] {
            assert!(is_number(s), "'{s}' should be a number");
        }
        for s in ["", ".", "-", "1a", "1.2.3", "1e3", " 1", "1 ", "--1"] {
            assert!(!is_number(s), "'{s}' should not be a number");
        }
    }

    #[test]
    fn test_unsigned_grammar() {
        assert!(is_unsigned("1987"));
        assert!(!is_unsigned("-1"));
        assert!(!is_unsigned("1a"));
        assert!(!is_unsigned(""));
    }

    #[test]
    fn test_measurement_sentinel() {
        assert_eq!(decode_measurement(-999.0), None);
        assert_eq!(decode_measurement(-9999.0), None);
        assert_eq!(decode_measurement(-998.99), Some(-998.99));
        assert_eq!(decode_measurement(0.0), Some(0.0));
    }

    #[test]
    fn test_lrud_sentinel() {
        assert_eq!(decode_lrud(-1.0), None);
        assert_eq!(decode_lrud(-0.01), None);
        assert_eq!(decode_lrud(0.0), Some(0.0));
        assert_eq!(decode_lrud(3.5), Some(3.5));
    }

    #[test]
    fn test_parse_tokens() -> SResult<()> {
        let mut sc = Scanner::new("SURVEY.DAT", "4.25 -1.00 -999.00 x");
        let t = sc.next_token("missing length")?;
        assert_eq!(parse_length(&sc, t, "invalid length")?.map(|l| l.get(LengthUnit::Feet)), Some(4.25));
        let t = sc.next_token("missing left")?;
        assert_eq!(parse_lrud(&sc, t, "invalid left")?, None);
        let t = sc.next_token("missing azimuth")?;
        assert_eq!(parse_angle(&sc, t, "invalid azimuth")?, None);
        let t = sc.next_token("missing up")?;
        let e = parse_lrud(&sc, t, "invalid up").unwrap_err();
        assert_eq!(e.message(), "invalid up");
        assert_eq!(e.column(), 20);
        Ok(())
    }
}
