//! Feed assembly: loading every table, enforcing key uniqueness, and
//! freezing the result into an immutable snapshot.
use crate::error::{Error, ErrorSink, FeedTable, ValidationError};
use crate::objects::*;
use crate::raw::RawFeed;
use crate::store::{StoreError, TupleStore};
use chrono::NaiveDate;
use log::info;
use rayon::ThreadPoolBuilder;
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::HashSet;
use std::fmt::Display;

/// All the tables of one ingested feed, frozen.
///
/// Built with [Feed::from_raw]. Every accessor hands out a shared view;
/// nothing can be mutated once ingestion has finished. The composite-keyed
/// tables sit on temporary databases that are deleted when the feed is
/// dropped or [closed](Feed::close).
pub struct Feed {
    agencies: FxHashMap<String, Agency>,
    stops: FxHashMap<String, Stop>,
    routes: FxHashMap<String, Route>,
    trips: FxHashMap<String, Trip>,
    calendar: FxHashMap<String, Calendar>,
    fare_attributes: FxHashMap<String, FareAttribute>,
    fare_rules: FxHashMap<String, Vec<FareRule>>,
    frequencies: FxHashMap<String, Vec<Frequency>>,
    stop_times: TupleStore<u16, StopTime>,
    shapes: TupleStore<usize, Shape>,
    calendar_dates: TupleStore<NaiveDate, CalendarDate>,
    transfers: TupleStore<String, Transfer>,
    feed_info: Option<FeedInfo>,
    errors: HashSet<ValidationError>,
}

impl std::fmt::Debug for Feed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Feed")
            .field("agencies", &self.agencies.len())
            .field("stops", &self.stops.len())
            .field("routes", &self.routes.len())
            .field("trips", &self.trips.len())
            .field("calendar", &self.calendar.len())
            .field("fare_attributes", &self.fare_attributes.len())
            .field("fare_rules", &self.fare_rules.len())
            .field("frequencies", &self.frequencies.len())
            .field("feed_info", &self.feed_info)
            .field("errors", &self.errors.len())
            .finish_non_exhaustive()
    }
}

impl TryFrom<RawFeed> for Feed {
    type Error = Error;

    /// Same as [Feed::from_raw]
    fn try_from(raw: RawFeed) -> Result<Feed, Error> {
        Feed::from_raw(raw)
    }
}

impl Feed {
    /// Ingests a parsed feed.
    ///
    /// Agencies are loaded first, on the calling thread, since the feed-level
    /// structural checks depend on them. The stop-time table, by far the
    /// largest, then gets a worker of its own while every other table loads
    /// on a shared pool; the call returns once all of them have joined.
    ///
    /// Per-record problems (duplicate keys, timezone disagreements) are
    /// recorded and skipped; see [validation_errors](Feed::validation_errors)
    /// afterwards. Only the structural conditions of [Error] abort.
    pub fn from_raw(raw: RawFeed) -> Result<Feed, Error> {
        let RawFeed {
            agencies,
            stops,
            routes,
            trips,
            stop_times,
            calendar,
            calendar_dates,
            fare_attributes,
            fare_rules,
            shapes,
            frequencies,
            transfers,
            feed_info,
        } = raw;

        let sink = ErrorSink::new();
        let agencies = load_agencies(agencies, &sink)?;

        let general = ThreadPoolBuilder::new()
            .thread_name(|i| format!("feed-load-{i}"))
            .build()?;
        let stop_times_pool = ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|i| format!("feed-load-stop-times-{i}"))
            .build()?;

        let mut stops_result = None;
        let mut routes_result = None;
        let mut trips_result = None;
        let mut calendar_result = None;
        let mut fare_attributes_result = None;
        let mut fare_rules_result = None;
        let mut frequencies_result = None;
        let mut stop_times_result = None;
        let mut shapes_result = None;
        let mut calendar_dates_result = None;
        let mut transfers_result = None;

        // The outer scope owns the dedicated stop-time worker, the inner one
        // fans the remaining tables out on the shared pool; leaving both is
        // the join barrier. A loader panic resurfaces here once every other
        // loader has been joined.
        stop_times_pool.in_place_scope(|dedicated| {
            dedicated.spawn(|_| {
                stop_times_result = Some(load_tuple(
                    FeedTable::StopTimes,
                    "stop_times",
                    stop_times,
                    |st| (st.trip_id.clone(), st.stop_sequence),
                    &sink,
                ));
            });

            general.in_place_scope(|pool| {
                pool.spawn(|_| stops_result = Some(load_keyed(FeedTable::Stops, stops, &sink)));
                pool.spawn(|_| routes_result = Some(load_keyed(FeedTable::Routes, routes, &sink)));
                pool.spawn(|_| trips_result = Some(load_keyed(FeedTable::Trips, trips, &sink)));
                pool.spawn(|_| {
                    calendar_result = Some(load_keyed(FeedTable::Calendar, calendar, &sink))
                });
                pool.spawn(|_| {
                    fare_attributes_result =
                        Some(load_keyed(FeedTable::FareAttributes, fare_attributes, &sink))
                });
                pool.spawn(|_| {
                    fare_rules_result = Some(load_grouped(FeedTable::FareRules, fare_rules, |r| {
                        r.fare_id.clone()
                    }))
                });
                pool.spawn(|_| {
                    frequencies_result =
                        Some(load_grouped(FeedTable::Frequencies, frequencies, |f| {
                            f.trip_id.clone()
                        }))
                });
                pool.spawn(|_| {
                    calendar_dates_result = Some(load_tuple(
                        FeedTable::CalendarDates,
                        "calendar_dates",
                        calendar_dates,
                        |cd| (cd.service_id.clone(), cd.date),
                        &sink,
                    ));
                });
                pool.spawn(|_| {
                    shapes_result = Some(load_tuple(
                        FeedTable::Shapes,
                        "shapes",
                        shapes,
                        |s| (s.id.clone(), s.sequence),
                        &sink,
                    ));
                });
                pool.spawn(|_| {
                    transfers_result = Some(load_tuple(
                        FeedTable::Transfers,
                        "transfers",
                        transfers,
                        |t| (t.from_stop_id.clone(), t.to_stop_id.clone()),
                        &sink,
                    ));
                });
            });
        });

        // Every spawn above ran to completion, so every slot is filled.
        let stops = stops_result.expect("stops loader joined");
        let routes = routes_result.expect("routes loader joined");
        let trips = trips_result.expect("trips loader joined");
        let calendar = calendar_result.expect("calendar loader joined");
        let fare_attributes = fare_attributes_result.expect("fare attributes loader joined");
        let fare_rules = fare_rules_result.expect("fare rules loader joined");
        let frequencies = frequencies_result.expect("frequencies loader joined");
        let stop_times = stop_times_result.expect("stop times loader joined")?;
        let shapes = shapes_result.expect("shapes loader joined")?;
        let calendar_dates = calendar_dates_result.expect("calendar dates loader joined")?;
        let transfers = transfers_result.expect("transfers loader joined")?;

        let feed_info = load_feed_info(feed_info, &sink);

        let errors = sink.freeze();
        info!(
            "feed ingested: {} agencies, {} stops, {} routes, {} trips, {} stop times, {} validation errors",
            agencies.len(),
            stops.len(),
            routes.len(),
            trips.len(),
            stop_times.len()?,
            errors.len()
        );

        Ok(Feed {
            agencies,
            stops,
            routes,
            trips,
            calendar,
            fare_attributes,
            fare_rules,
            frequencies,
            stop_times,
            shapes,
            calendar_dates,
            transfers,
            feed_info,
            errors,
        })
    }

    /// All agencies by agency id. A lone agency without an id sits under `""`
    pub fn agencies(&self) -> &FxHashMap<String, Agency> {
        &self.agencies
    }

    /// All stops by stop id
    pub fn stops(&self) -> &FxHashMap<String, Stop> {
        &self.stops
    }

    /// All routes by route id
    pub fn routes(&self) -> &FxHashMap<String, Route> {
        &self.routes
    }

    /// All trips by trip id
    pub fn trips(&self) -> &FxHashMap<String, Trip> {
        &self.trips
    }

    /// All calendars by service id
    pub fn calendar(&self) -> &FxHashMap<String, Calendar> {
        &self.calendar
    }

    /// All fare attributes by fare id
    pub fn fare_attributes(&self) -> &FxHashMap<String, FareAttribute> {
        &self.fare_attributes
    }

    /// All fare rules grouped by fare id
    pub fn fare_rules(&self) -> &FxHashMap<String, Vec<FareRule>> {
        &self.fare_rules
    }

    /// All frequencies grouped by trip id
    pub fn frequencies(&self) -> &FxHashMap<String, Vec<Frequency>> {
        &self.frequencies
    }

    /// Feed meta-data, when the feed carried any
    pub fn feed_info(&self) -> Option<&FeedInfo> {
        self.feed_info.as_ref()
    }

    /// Everything that was recorded and skipped during ingestion
    pub fn validation_errors(&self) -> &HashSet<ValidationError> {
        &self.errors
    }

    /// The stop times of one trip, in stop-sequence order
    pub fn stop_times_for_trip(&self, trip_id: &str) -> Result<Vec<StopTime>, Error> {
        Ok(self.stop_times.scan_prefix(trip_id)?)
    }

    /// The points of one shape, in sequence order
    pub fn shape_points(&self, shape_id: &str) -> Result<Vec<Shape>, Error> {
        Ok(self.shapes.scan_prefix(shape_id)?)
    }

    /// The date exceptions of one service, in chronological order
    pub fn calendar_dates_for_service(&self, service_id: &str) -> Result<Vec<CalendarDate>, Error> {
        Ok(self.calendar_dates.scan_prefix(service_id)?)
    }

    /// The transfer rules leaving one stop, ordered by destination stop id
    pub fn transfers_from_stop(&self, stop_id: &str) -> Result<Vec<Transfer>, Error> {
        Ok(self.transfers.scan_prefix(stop_id)?)
    }

    /// Releases the temporary databases behind the composite-keyed tables.
    ///
    /// Dropping the feed does the same; this is for callers who want the
    /// disk space back at a known point and an error if that fails.
    pub fn close(self) -> Result<(), Error> {
        self.stop_times.close()?;
        self.shapes.close()?;
        self.calendar_dates.close()?;
        self.transfers.close()?;
        Ok(())
    }
}

/// Loads agency.txt on the calling thread and applies the feed-level checks
/// that make the rest of the ingestion worth running at all.
fn load_agencies(rows: Vec<Agency>, sink: &ErrorSink) -> Result<FxHashMap<String, Agency>, Error> {
    info!("loading {}", FeedTable::Agencies);
    let mut rows = rows.into_iter();
    let first = rows.next().ok_or(Error::NoAgencies)?;
    if rows.len() > 0 && first.id.is_none() {
        return Err(Error::AmbiguousAgencies);
    }
    let feed_timezone = first.timezone.clone();

    let mut agencies = FxHashMap::default();
    agencies.insert(first.id().to_owned(), first);
    for agency in rows {
        match agencies.entry(agency.id().to_owned()) {
            Entry::Occupied(_) => {
                sink.record(ValidationError::DuplicateId {
                    table: FeedTable::Agencies,
                    id: agency.id().to_owned(),
                });
            }
            Entry::Vacant(slot) => {
                if agency.timezone != feed_timezone {
                    sink.record(ValidationError::AgencyTimezoneMismatch {
                        agency_id: agency.id().to_owned(),
                        expected: feed_timezone.clone(),
                        found: agency.timezone.clone(),
                    });
                }
                slot.insert(agency);
            }
        }
    }
    info!("loaded {} ({} rows)", FeedTable::Agencies, agencies.len());
    Ok(agencies)
}

/// Loads a table keyed by a single unique id. On a duplicate the first
/// record wins and the later one is recorded and dropped.
fn load_keyed<T: Id>(table: FeedTable, rows: Vec<T>, sink: &ErrorSink) -> FxHashMap<String, T> {
    info!("loading {table}");
    let mut map = FxHashMap::with_capacity_and_hasher(rows.len(), Default::default());
    for row in rows {
        match map.entry(row.id().to_owned()) {
            Entry::Occupied(_) => sink.record(ValidationError::DuplicateId {
                table,
                id: row.id().to_owned(),
            }),
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }
    info!("loaded {table} ({} rows)", map.len());
    map
}

/// Loads a table where several records may legitimately share a key
fn load_grouped<T>(
    table: FeedTable,
    rows: Vec<T>,
    key: impl Fn(&T) -> String,
) -> FxHashMap<String, Vec<T>> {
    info!("loading {table}");
    let mut map: FxHashMap<String, Vec<T>> = FxHashMap::default();
    for row in rows {
        map.entry(key(&row)).or_default().push(row);
    }
    info!("loaded {table} ({} keys)", map.len());
    map
}

/// Loads a composite-keyed table into its own ordered store. Duplicate key
/// pairs are recorded and dropped; any other storage failure is fatal.
fn load_tuple<K, V>(
    table: FeedTable,
    name: &'static str,
    rows: Vec<V>,
    key: impl Fn(&V) -> (String, K),
    sink: &ErrorSink,
) -> Result<TupleStore<K, V>, Error>
where
    K: rusqlite::ToSql + Display,
    V: Serialize + DeserializeOwned,
{
    info!("loading {table}");
    let mut store = TupleStore::open(name)?;
    for row in rows {
        let (first, second) = key(&row);
        match store.put(&first, &second, &row) {
            Ok(()) => {}
            Err(StoreError::Duplicate) => sink.record(ValidationError::DuplicateKey {
                table,
                first,
                second: second.to_string(),
            }),
            Err(e) => return Err(e.into()),
        }
    }
    info!("loaded {table} ({} rows)", store.len()?);
    Ok(store)
}

/// Takes the zero-or-one feed info record and checks its validity window
fn load_feed_info(rows: Vec<FeedInfo>, sink: &ErrorSink) -> Option<FeedInfo> {
    let mut rows = rows.into_iter();
    let info = rows.next()?;
    for extra in rows {
        sink.record(ValidationError::ExtraFeedInfo {
            publisher: extra.name,
        });
    }
    if let (Some(start), Some(end)) = (info.start_date, info.end_date) {
        if start > end {
            sink.record(ValidationError::FeedStartsAfterEnd { start, end });
        }
    }
    Some(info)
}
