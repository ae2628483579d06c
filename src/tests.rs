use crate::*;
use chrono::NaiveDate;
use std::collections::BTreeSet;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn agency(id: Option<&str>, timezone: &str) -> Agency {
    Agency {
        id: id.map(String::from),
        name: "Test Transit".to_owned(),
        url: "https://transit.example".to_owned(),
        timezone: timezone.to_owned(),
        ..Default::default()
    }
}

fn stop(id: &str, name: &str) -> Stop {
    Stop {
        id: id.to_owned(),
        name: name.to_owned(),
        ..Default::default()
    }
}

fn trip(id: &str, block_id: Option<&str>) -> Trip {
    Trip {
        id: id.to_owned(),
        service_id: "service1".to_owned(),
        route_id: "route1".to_owned(),
        block_id: block_id.map(String::from),
        ..Default::default()
    }
}

fn stop_time(trip_id: &str, stop_sequence: u16, stop_id: &str) -> StopTime {
    StopTime {
        trip_id: trip_id.to_owned(),
        stop_id: stop_id.to_owned(),
        stop_sequence,
        arrival_time: Some(28800),
        departure_time: Some(28860),
        ..Default::default()
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A feed that passes the structural agency checks and nothing else
fn base_feed() -> RawFeed {
    RawFeed {
        agencies: vec![agency(Some("agency1"), "Europe/Paris")],
        ..Default::default()
    }
}

#[test]
fn no_agencies_is_fatal() {
    let err = Feed::from_raw(RawFeed::default()).unwrap_err();
    assert!(matches!(err, Error::NoAgencies));
}

#[test]
fn multiple_agencies_need_an_id_on_the_first() {
    let raw = RawFeed {
        agencies: vec![agency(None, "Europe/Paris"), agency(Some("agency2"), "Europe/Paris")],
        ..Default::default()
    };
    let err = Feed::from_raw(raw).unwrap_err();
    assert!(matches!(err, Error::AmbiguousAgencies));
}

#[test]
fn single_agency_may_omit_its_id() {
    let raw = RawFeed {
        agencies: vec![agency(None, "Europe/Paris")],
        ..Default::default()
    };
    let feed = Feed::from_raw(raw).expect("one id-less agency is fine");
    assert_eq!(1, feed.agencies().len());
    assert_eq!("Test Transit", feed.agencies()[""].name);
}

#[test]
fn agency_timezone_mismatch_is_recorded_not_fatal() {
    init_logging();
    let raw = RawFeed {
        agencies: vec![
            agency(Some("agency1"), "Europe/Paris"),
            agency(Some("agency2"), "America/Toronto"),
        ],
        ..Default::default()
    };
    let feed = Feed::from_raw(raw).expect("timezone mismatch must not abort");
    assert_eq!(2, feed.agencies().len());
    assert_eq!(1, feed.validation_errors().len());
    assert!(feed
        .validation_errors()
        .contains(&ValidationError::AgencyTimezoneMismatch {
            agency_id: "agency2".to_owned(),
            expected: "Europe/Paris".to_owned(),
            found: "America/Toronto".to_owned(),
        }));
}

#[test]
fn duplicate_stop_id_keeps_the_first_record() {
    let mut raw = base_feed();
    raw.stops = vec![
        stop("stop1", "Main St"),
        stop("stop1", "Main St (duplicate)"),
        stop("stop2", "Elm St"),
    ];
    let feed = Feed::from_raw(raw).unwrap();
    assert_eq!(2, feed.stops().len());
    assert_eq!("Main St", feed.stops()["stop1"].name);
    assert_eq!(1, feed.validation_errors().len());
    assert!(feed
        .validation_errors()
        .contains(&ValidationError::DuplicateId {
            table: FeedTable::Stops,
            id: "stop1".to_owned(),
        }));
}

#[test]
fn stop_times_come_back_in_sequence_order() {
    let mut raw = base_feed();
    raw.trips = vec![trip("T1", None), trip("T2", None)];
    raw.stop_times = vec![
        stop_time("T1", 3, "C"),
        stop_time("T1", 1, "A"),
        stop_time("T1", 2, "B"),
        stop_time("T2", 1, "Z"),
    ];
    let feed = Feed::from_raw(raw).unwrap();
    let sequences: Vec<u16> = feed
        .stop_times_for_trip("T1")
        .unwrap()
        .iter()
        .map(|st| st.stop_sequence)
        .collect();
    assert_eq!(vec![1, 2, 3], sequences);
    assert_eq!(1, feed.stop_times_for_trip("T2").unwrap().len());
    assert!(feed.stop_times_for_trip("T3").unwrap().is_empty());
}

#[test]
fn duplicate_stop_time_key_is_recorded() {
    let mut raw = base_feed();
    raw.trips = vec![trip("T1", None)];
    raw.stop_times = vec![
        stop_time("T1", 1, "A"),
        stop_time("T1", 1, "B"),
        stop_time("T1", 2, "B"),
    ];
    let feed = Feed::from_raw(raw).unwrap();
    let stops: Vec<String> = feed
        .stop_times_for_trip("T1")
        .unwrap()
        .into_iter()
        .map(|st| st.stop_id)
        .collect();
    assert_eq!(vec!["A", "B"], stops);
    assert!(feed
        .validation_errors()
        .contains(&ValidationError::DuplicateKey {
            table: FeedTable::StopTimes,
            first: "T1".to_owned(),
            second: "1".to_owned(),
        }));
}

#[test]
fn shape_points_scan_in_sequence_order() {
    let mut raw = base_feed();
    raw.shapes = vec![
        Shape {
            id: "shp1".to_owned(),
            latitude: 45.3,
            sequence: 30,
            ..Default::default()
        },
        Shape {
            id: "shp1".to_owned(),
            latitude: 45.1,
            sequence: 10,
            ..Default::default()
        },
        Shape {
            id: "shp1".to_owned(),
            latitude: 45.2,
            sequence: 20,
            ..Default::default()
        },
    ];
    let feed = Feed::from_raw(raw).unwrap();
    let latitudes: Vec<f64> = feed
        .shape_points("shp1")
        .unwrap()
        .iter()
        .map(|point| point.latitude)
        .collect();
    assert_eq!(vec![45.1, 45.2, 45.3], latitudes);
}

#[test]
fn calendar_dates_scan_chronologically() {
    let mut raw = base_feed();
    raw.calendar_dates = vec![
        CalendarDate {
            service_id: "service1".to_owned(),
            date: date(2023, 3, 1),
            exception_type: Exception::Deleted,
        },
        CalendarDate {
            service_id: "service1".to_owned(),
            date: date(2023, 1, 1),
            exception_type: Exception::Added,
        },
        CalendarDate {
            service_id: "service1".to_owned(),
            date: date(2023, 1, 1),
            exception_type: Exception::Deleted,
        },
    ];
    let feed = Feed::from_raw(raw).unwrap();
    let dates = feed.calendar_dates_for_service("service1").unwrap();
    assert_eq!(2, dates.len());
    assert_eq!(date(2023, 1, 1), dates[0].date);
    // First record wins on the duplicated day.
    assert_eq!(Exception::Added, dates[0].exception_type);
    assert_eq!(date(2023, 3, 1), dates[1].date);
    assert!(feed
        .validation_errors()
        .contains(&ValidationError::DuplicateKey {
            table: FeedTable::CalendarDates,
            first: "service1".to_owned(),
            second: "2023-01-01".to_owned(),
        }));
}

#[test]
fn transfers_scan_by_destination_stop() {
    let mut raw = base_feed();
    for to_stop in ["C", "A", "B"] {
        raw.transfers.push(Transfer {
            from_stop_id: "hub".to_owned(),
            to_stop_id: to_stop.to_owned(),
            ..Default::default()
        });
    }
    let feed = Feed::from_raw(raw).unwrap();
    let destinations: Vec<String> = feed
        .transfers_from_stop("hub")
        .unwrap()
        .into_iter()
        .map(|transfer| transfer.to_stop_id)
        .collect();
    assert_eq!(vec!["A", "B", "C"], destinations);
}

#[test]
fn fare_rules_and_frequencies_accumulate_per_key() {
    let mut raw = base_feed();
    raw.fare_attributes = vec![FareAttribute {
        id: "F1".to_owned(),
        price: "2.75".to_owned(),
        currency: "CAD".to_owned(),
        ..Default::default()
    }];
    raw.fare_rules = vec![
        FareRule {
            fare_id: "F1".to_owned(),
            route_id: Some("route1".to_owned()),
            ..Default::default()
        },
        FareRule {
            fare_id: "F1".to_owned(),
            route_id: Some("route2".to_owned()),
            ..Default::default()
        },
        FareRule {
            fare_id: "F2".to_owned(),
            ..Default::default()
        },
    ];
    raw.frequencies = vec![
        Frequency {
            trip_id: "T1".to_owned(),
            start_time: 21600,
            end_time: 36000,
            headway_secs: 600,
            ..Default::default()
        },
        Frequency {
            trip_id: "T1".to_owned(),
            start_time: 36000,
            end_time: 72000,
            headway_secs: 1200,
            ..Default::default()
        },
    ];
    let feed = Feed::from_raw(raw).unwrap();
    assert_eq!(2, feed.fare_rules()["F1"].len());
    assert_eq!(1, feed.fare_rules()["F2"].len());
    assert_eq!(2, feed.frequencies()["T1"].len());
    assert_eq!("2.75", feed.fare_attributes()["F1"].price);
    assert!(feed.validation_errors().is_empty());
}

#[test]
fn feed_info_date_inversion_is_recorded_not_fatal() {
    let mut raw = base_feed();
    raw.feed_info = vec![FeedInfo {
        name: "Publisher".to_owned(),
        start_date: Some(date(2023, 12, 31)),
        end_date: Some(date(2023, 1, 1)),
        ..Default::default()
    }];
    let feed = Feed::from_raw(raw).expect("an inverted validity window must not abort");
    assert_eq!("Publisher", feed.feed_info().unwrap().name);
    assert!(feed
        .validation_errors()
        .contains(&ValidationError::FeedStartsAfterEnd {
            start: date(2023, 12, 31),
            end: date(2023, 1, 1),
        }));
}

#[test]
fn extra_feed_info_is_dropped_and_recorded() {
    let mut raw = base_feed();
    raw.feed_info = vec![
        FeedInfo {
            name: "First publisher".to_owned(),
            ..Default::default()
        },
        FeedInfo {
            name: "Second publisher".to_owned(),
            ..Default::default()
        },
    ];
    let feed = Feed::from_raw(raw).unwrap();
    assert_eq!("First publisher", feed.feed_info().unwrap().name);
    assert!(feed
        .validation_errors()
        .contains(&ValidationError::ExtraFeedInfo {
            publisher: "Second publisher".to_owned(),
        }));
}

#[test]
fn trips_with_the_same_stops_share_a_pattern() {
    init_logging();
    let mut raw = base_feed();
    raw.trips = vec![trip("T1", None), trip("T2", None), trip("T3", None)];
    for trip_id in ["T1", "T2"] {
        raw.stop_times.push(stop_time(trip_id, 1, "A"));
        raw.stop_times.push(stop_time(trip_id, 2, "B"));
        raw.stop_times.push(stop_time(trip_id, 3, "C"));
    }
    // Same stops, different order: a pattern of its own.
    raw.stop_times.push(stop_time("T3", 1, "A"));
    raw.stop_times.push(stop_time("T3", 2, "C"));
    raw.stop_times.push(stop_time("T3", 3, "B"));

    let feed = Feed::from_raw(raw).unwrap();
    let patterns = feed.find_patterns().unwrap();
    assert_eq!(2, patterns.trips_by_pattern.len());
    assert_eq!(0, patterns.validation_errors);

    let abc: Vec<String> = vec!["A".into(), "B".into(), "C".into()];
    let acb: Vec<String> = vec!["A".into(), "C".into(), "B".into()];
    assert_eq!(
        Some(&BTreeSet::from(["T1".to_owned(), "T2".to_owned()])),
        patterns.trips_by_pattern.get(&abc)
    );
    assert_eq!(
        Some(&BTreeSet::from(["T3".to_owned()])),
        patterns.trips_by_pattern.get(&acb)
    );
}

#[test]
fn patterns_still_derive_over_a_flagged_feed() {
    let mut raw = base_feed();
    raw.trips = vec![trip("T1", None)];
    raw.stops = vec![stop("stop1", "A"), stop("stop1", "A again")];
    raw.stop_times = vec![stop_time("T1", 1, "stop1")];
    let feed = Feed::from_raw(raw).unwrap();
    let patterns = feed.find_patterns().unwrap();
    assert_eq!(1, patterns.trips_by_pattern.len());
    assert_eq!(1, patterns.validation_errors);
}

#[test]
fn blocks_group_interlined_trips() {
    let mut raw = base_feed();
    raw.trips = vec![
        trip("trip1", Some("B1")),
        trip("trip2", Some("B1")),
        trip("trip3", Some("")),
        trip("trip4", None),
        trip("trip5", Some("B2")),
    ];
    let feed = Feed::from_raw(raw).unwrap();
    let blocks = feed.find_blocks();
    assert_eq!(2, blocks.trips_by_block.len());
    assert_eq!(
        BTreeSet::from(["trip1".to_owned(), "trip2".to_owned()]),
        blocks.trips_by_block["B1"]
    );
    // A single-trip block stays in the mapping but is flagged.
    assert_eq!(
        BTreeSet::from(["trip5".to_owned()]),
        blocks.trips_by_block["B2"]
    );
    assert_eq!(BTreeSet::from(["B2".to_owned()]), blocks.single_trip_blocks);
}

#[test]
fn aggregation_is_deterministic() {
    let mut raw = base_feed();
    raw.trips = (0..50)
        .map(|i| trip(&format!("T{i}"), Some(if i % 2 == 0 { "B1" } else { "B2" })))
        .collect();
    for i in 0..50 {
        let trip_id = format!("T{i}");
        raw.stop_times.push(stop_time(&trip_id, 1, "A"));
        raw.stop_times
            .push(stop_time(&trip_id, 2, if i % 3 == 0 { "B" } else { "C" }));
    }
    let feed = Feed::from_raw(raw).unwrap();
    assert_eq!(feed.find_patterns().unwrap(), feed.find_patterns().unwrap());
    assert_eq!(feed.find_blocks(), feed.find_blocks());
}

#[test]
fn close_releases_the_feed() {
    let mut raw = base_feed();
    raw.trips = vec![trip("T1", None)];
    raw.stop_times = vec![stop_time("T1", 1, "A")];
    let feed = Feed::from_raw(raw).unwrap();
    feed.close().expect("closing a fresh feed");
}

#[test]
fn calendar_rows_load_by_service_id() {
    let mut raw = base_feed();
    raw.calendar = vec![Calendar {
        id: "service1".to_owned(),
        monday: true,
        tuesday: true,
        wednesday: true,
        thursday: true,
        friday: true,
        saturday: false,
        sunday: false,
        start_date: date(2023, 1, 1),
        end_date: date(2023, 12, 31),
    }];
    let feed = Feed::from_raw(raw).unwrap();
    assert!(feed.calendar()["service1"].monday);
    assert!(!feed.calendar()["service1"].saturday);
}
