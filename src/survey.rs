//! The survey data model: trips, their headers, and their shots.
//!
//! Lengths are stored in feet and angles in degrees, as they are in survey
//! files; the display units in a trip's [`FormatCode`] only matter when
//! rendering the header back out.
use crate::format_specs::FormatCode;
use crate::units::{Angle, Length};

/// A calendar date with no time component.
///
/// The year is kept exactly as written; `79` is the year 79, not 1979. Years
/// past `u32::MAX` are rejected by the parser as `invalid year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurveyDate {
    pub year: u32,
    pub month: u8,
    pub day: u8,
}

impl SurveyDate {
    /// Create a date. `month` should be 1-12 and `day` 1-31.
    pub fn new(year: u32, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }
}

/// One survey session's metadata and display configuration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripHeader {
    pub cave_name: Option<String>,
    pub survey_name: Option<String>,
    pub date: SurveyDate,
    pub comment: Option<String>,
    /// Surveyor names in the order they were listed
    pub surveyors: Vec<String>,
    /// The surveyor line exactly as it appeared (trimmed), if this header was parsed
    pub raw_surveyors: Option<String>,
    pub declination: Angle,
    pub format: FormatCode,
    pub frontsight_azimuth_correction: Angle,
    pub frontsight_inclination_correction: Angle,
    pub length_correction: Length,
    pub backsight_azimuth_correction: Option<Angle>,
    pub backsight_inclination_correction: Option<Angle>,
}

impl TripHeader {
    /// A header for `date` with no names, no surveyors, zero declination and
    /// corrections, and the default format code.
    pub fn new(date: SurveyDate) -> Self {
        Self {
            cave_name: None,
            survey_name: None,
            date,
            comment: None,
            surveyors: vec![],
            raw_surveyors: None,
            declination: Angle::degrees(0.0),
            format: FormatCode::default(),
            frontsight_azimuth_correction: Angle::degrees(0.0),
            frontsight_inclination_correction: Angle::degrees(0.0),
            length_correction: Length::feet(0.0),
            backsight_azimuth_correction: None,
            backsight_inclination_correction: None,
        }
    }

    /// `true` if shot lines under this header carry backsight columns.
    pub fn has_backsights(&self) -> bool {
        self.format.has_backsights
    }
}

/// Identifies a [`Trip`] within one parse (or one caller-built collection).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TripId(pub u32);

/// What a shot knows about the trip it was put in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct TripRef {
    pub(crate) id: TripId,
    pub(crate) has_backsights: bool,
}

/// One measured leg between two stations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Shot {
    pub from_station: String,
    pub to_station: String,
    pub length: Length,
    pub frontsight_azimuth: Option<Angle>,
    pub frontsight_inclination: Option<Angle>,
    pub backsight_azimuth: Option<Angle>,
    pub backsight_inclination: Option<Angle>,
    pub left: Option<Length>,
    pub right: Option<Length>,
    pub up: Option<Length>,
    pub down: Option<Length>,
    pub comment: Option<String>,
    pub excluded_from_length: bool,
    pub excluded_from_plotting: bool,
    pub excluded_from_all_processing: bool,
    pub do_not_adjust: bool,
    pub(crate) trip: Option<TripRef>,
}

impl Shot {
    /// A shot with only stations and a length; everything else absent or unset.
    pub fn new(from_station: impl Into<String>, to_station: impl Into<String>, length: Length) -> Self {
        Self {
            from_station: from_station.into(),
            to_station: to_station.into(),
            length,
            frontsight_azimuth: None,
            frontsight_inclination: None,
            backsight_azimuth: None,
            backsight_inclination: None,
            left: None,
            right: None,
            up: None,
            down: None,
            comment: None,
            excluded_from_length: false,
            excluded_from_plotting: false,
            excluded_from_all_processing: false,
            do_not_adjust: false,
            trip: None,
        }
    }

    /// The trip this shot belongs to, once it has been put in one.
    pub fn trip(&self) -> Option<TripId> {
        self.trip.map(|t| t.id)
    }

    /// The backsight flag of the owning trip's header, once this shot has been put in a trip.
    pub fn trip_has_backsights(&self) -> Option<bool> {
        self.trip.map(|t| t.has_backsights)
    }

    /// `true` if any of the four flags is set.
    pub fn has_flags(&self) -> bool {
        self.excluded_from_length || self.excluded_from_plotting
            || self.excluded_from_all_processing || self.do_not_adjust
    }
}

/// A header plus the shots surveyed under it.
///
/// Every shot in a trip is tagged with the trip's [`TripId`] and its header's
/// backsight flag when the trip is built.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Trip {
    id: TripId,
    header: TripHeader,
    shots: Vec<Shot>,
}

impl Trip {
    /// Build a trip with the default id.
    pub fn new(header: TripHeader, shots: Vec<Shot>) -> Self {
        Self::with_id(TripId::default(), header, shots)
    }

    pub fn with_id(id: TripId, header: TripHeader, mut shots: Vec<Shot>) -> Self {
        let trip_ref = TripRef { id, has_backsights: header.has_backsights() };
        for shot in shots.iter_mut() {
            shot.trip = Some(trip_ref);
        }
        Self { id, header, shots }
    }

    pub fn id(&self) -> TripId {
        self.id
    }

    pub fn header(&self) -> &TripHeader {
        &self.header
    }

    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    /// Take the trip apart. The shots keep their trip id.
    pub fn into_parts(self) -> (TripHeader, Vec<Shot>) {
        (self.header, self.shots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trip_tags_shots() {
        let shots = vec![Shot::new("A1", "A2", Length::feet(10.0)), Shot::new("A2", "A3", Length::feet(7.5))];
        assert!(shots.iter().all(|s| s.trip().is_none()));

        let trip = Trip::with_id(TripId(3), TripHeader::new(SurveyDate::new(1979, 7, 10)), shots);
        assert_eq!(trip.id(), TripId(3));
        assert!(trip.shots().iter().all(|s| s.trip() == Some(TripId(3))), "every shot should point back to its trip");

        assert!(trip.shots().iter().all(|s| s.trip_has_backsights() == Some(false)));

        let (_, shots) = trip.into_parts();
        assert_eq!(shots.len(), 2);
    }

    #[test]
    fn test_trip_records_backsight_flag() {
        let mut header = TripHeader::new(SurveyDate::new(1979, 7, 10));
        header.format.has_backsights = true;
        let shot = Shot::new("A1", "A2", Length::feet(3.0));
        assert_eq!(shot.trip_has_backsights(), None);

        let trip = Trip::new(header, vec![shot]);
        assert_eq!(trip.shots()[0].trip_has_backsights(), Some(true));
    }

    #[test]
    fn test_header_defaults() {
        let h = TripHeader::new(SurveyDate::new(2004, 2, 29));
        assert!(!h.has_backsights());
        assert_eq!(h.format, FormatCode::default());
        assert!(h.surveyors.is_empty());
        assert_eq!(h.backsight_azimuth_correction, None);
    }

    #[test]
    fn test_shot_flags() {
        let mut s = Shot::new("A1", "A2", Length::feet(1.0));
        assert!(!s.has_flags());
        s.do_not_adjust = true;
        assert!(s.has_flags());
    }
}
