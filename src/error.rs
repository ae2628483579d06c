//! Error management: fatal conditions, recoverable validation errors, and
//! the sink that collects the latter while loaders run in parallel.
use crate::store::StoreError;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::fmt;
use std::sync::Mutex;
use thiserror::Error;

/// The feed table a validation error was detected in
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FeedTable {
    /// agency.txt
    Agencies,
    /// stops.txt
    Stops,
    /// routes.txt
    Routes,
    /// trips.txt
    Trips,
    /// stop_times.txt
    StopTimes,
    /// calendar.txt
    Calendar,
    /// calendar_dates.txt
    CalendarDates,
    /// fare_attributes.txt
    FareAttributes,
    /// fare_rules.txt
    FareRules,
    /// shapes.txt
    Shapes,
    /// frequencies.txt
    Frequencies,
    /// transfers.txt
    Transfers,
    /// feed_info.txt
    FeedInfo,
}

impl fmt::Display for FeedTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            FeedTable::Agencies => "agency.txt",
            FeedTable::Stops => "stops.txt",
            FeedTable::Routes => "routes.txt",
            FeedTable::Trips => "trips.txt",
            FeedTable::StopTimes => "stop_times.txt",
            FeedTable::Calendar => "calendar.txt",
            FeedTable::CalendarDates => "calendar_dates.txt",
            FeedTable::FareAttributes => "fare_attributes.txt",
            FeedTable::FareRules => "fare_rules.txt",
            FeedTable::Shapes => "shapes.txt",
            FeedTable::Frequencies => "frequencies.txt",
            FeedTable::Transfers => "transfers.txt",
            FeedTable::FeedInfo => "feed_info.txt",
        };
        write!(f, "{}", name)
    }
}

/// An error that aborts the whole ingestion
#[derive(Error, Debug)]
pub enum Error {
    /// No agency records were found in the feed
    #[error("no agencies were found in the feed")]
    NoAgencies,
    /// Several agencies are present and the first one carries no agency id,
    /// so records referencing agencies cannot be told apart
    #[error("multiple agencies, no agency id on the first")]
    AmbiguousAgencies,
    /// The composite-key store failed for a reason other than a duplicate
    #[error("composite-key store failure")]
    Store(#[from] StoreError),
    /// A loader worker pool could not be built
    #[error("could not build worker pool")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// A per-record condition that is recorded and skipped over, never aborting
/// the load of its table or any other table
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValidationError {
    /// Two records of a simple-keyed table share one id; the first one is kept
    #[error("{table}: multiple occurrences of id {id}")]
    DuplicateId {
        /// Table the duplicate was found in
        table: FeedTable,
        /// The repeated identifier
        id: String,
    },
    /// Two records of a composite-keyed table share one key pair; the first one is kept
    #[error("{table}: multiple occurrences of key ({first}, {second})")]
    DuplicateKey {
        /// Table the duplicate was found in
        table: FeedTable,
        /// First key component
        first: String,
        /// Second key component
        second: String,
    },
    /// An agency does not share the timezone of the first agency of the feed
    #[error("agency {agency_id} uses timezone {found}, feed uses {expected}")]
    AgencyTimezoneMismatch {
        /// Id of the disagreeing agency
        agency_id: String,
        /// Timezone of the first agency of the feed
        expected: String,
        /// Timezone found on this agency
        found: String,
    },
    /// The feed info declares a start date later than its end date
    #[error("feed starts {start}, after it ends {end}")]
    FeedStartsAfterEnd {
        /// Declared start of the feed validity period
        start: NaiveDate,
        /// Declared end of the feed validity period
        end: NaiveDate,
    },
    /// More than one feed info record was present; only the first is kept
    #[error("feed_info.txt: more than one record, dropping {publisher}")]
    ExtraFeedInfo {
        /// Publisher name of the dropped record
        publisher: String,
    },
}

/// Collects [ValidationError]s from concurrently running table loaders.
///
/// Loaders share a `&ErrorSink` and call [record](ErrorSink::record) without
/// further coordination. Once every loader has joined, the coordinator, as
/// the only owner, takes the accumulated set back with
/// [freeze](ErrorSink::freeze); recording after that point is impossible by
/// construction, since freezing consumes the sink.
#[derive(Debug, Default)]
pub struct ErrorSink {
    errors: Mutex<HashSet<ValidationError>>,
}

impl ErrorSink {
    /// An empty sink
    pub fn new() -> ErrorSink {
        ErrorSink::default()
    }

    /// Records one validation error. Safe to call from any loader thread
    pub fn record(&self, error: ValidationError) {
        log::warn!("{error}");
        self.errors.lock().unwrap().insert(error);
    }

    /// Consumes the sink and returns everything recorded so far
    pub fn freeze(self) -> HashSet<ValidationError> {
        self.errors.into_inner().unwrap()
    }
}
