//! The pre-parsed table contents waiting to be ingested.
use crate::objects::*;

/// Typed rows for every table of one feed, as produced by an external
/// parser, with no intelligence applied yet.
///
/// Field syntax is the parser's problem; key uniqueness and feed-level
/// invariants are checked when the rows are handed to
/// [Feed::from_raw](crate::Feed::from_raw). Optional tables are simply left
/// empty.
#[derive(Debug, Default)]
pub struct RawFeed {
    /// All agencies
    pub agencies: Vec<Agency>,
    /// All stops
    pub stops: Vec<Stop>,
    /// All routes
    pub routes: Vec<Route>,
    /// All trips
    pub trips: Vec<Trip>,
    /// All stop times
    pub stop_times: Vec<StopTime>,
    /// All calendars
    pub calendar: Vec<Calendar>,
    /// All calendar date exceptions
    pub calendar_dates: Vec<CalendarDate>,
    /// All fare attributes
    pub fare_attributes: Vec<FareAttribute>,
    /// All fare rules
    pub fare_rules: Vec<FareRule>,
    /// All shape points
    pub shapes: Vec<Shape>,
    /// All frequencies
    pub frequencies: Vec<Frequency>,
    /// All stop-to-stop transfer rules
    pub transfers: Vec<Transfer>,
    /// Feed meta-data; at most one record is expected
    pub feed_info: Vec<FeedInfo>,
}
