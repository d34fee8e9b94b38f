//! Read and write cave survey data files.
//!
//! A survey data file is a sequence of trips. Each trip has a header (cave and
//! survey names, date, team, declination, a FORMAT code and corrections)
//! followed by a table of shots between named stations.
//!
//! - [`de`] parses text into [`survey::Trip`]s, lazily.
//! - [`ser`] renders trips, headers and shots back to the fixed-column layout.
//! - [`format_specs`] decodes and encodes the FORMAT code.
//! - [`units`] holds the unit-tagged lengths and angles the data model uses.
//!
//! Parse errors are [`survey_error::GrammarViolation`]s, which point at the
//! offending text:
//!
//! ```
//! use compassformat::de::parse_trips;
//!
//! let err = parse_trips("SECRET.DAT", "SECRET CAVE\nSURVEY NAME: A\nSURVEY DATE: 13 5 14\n")
//!     .next()
//!     .unwrap()
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "month out of range (SECRET.DAT, line 3, col 14)\nSURVEY DATE: 13 5 14\n             ^^");
//! ```
extern crate pest;
#[macro_use]
extern crate pest_derive;
pub mod survey_error;
pub mod units;
pub(crate) mod parsing;
pub mod scanner;
pub mod format_specs;
pub mod survey;
pub mod de;
pub mod ser;
