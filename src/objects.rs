pub use crate::enums::*;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Objects that have an identifier implement this trait
///
/// Those identifier are technical and should not be shown to travellers
pub trait Id {
    /// Identifier of the object
    fn id(&self) -> &str;
}

/// General informations about the agency running the network. See <https://gtfs.org/reference/static/#agencytxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Agency {
    /// Unique technical (not for the traveller) identifier for the Agency.
    /// May be omitted when the feed describes a single agency
    pub id: Option<String>,
    /// Full name of the transit agency
    pub name: String,
    /// URL of the transit agency
    pub url: String,
    /// Timezone where the transit agency is located. A feed with several
    /// agencies must use one timezone throughout
    pub timezone: String,
    /// Primary language used by this transit agency
    pub lang: Option<String>,
    /// A voice telephone number for the specified agency
    pub phone: Option<String>,
    /// URL of a web page where a rider can purchase fare instruments online
    pub fare_url: Option<String>,
    /// Email address actively monitored by the agency’s customer service department
    pub email: Option<String>,
}

impl Id for Agency {
    fn id(&self) -> &str {
        match &self.id {
            None => "",
            Some(id) => id,
        }
    }
}

impl fmt::Display for Agency {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A physical stop, station or area. See <https://gtfs.org/reference/static/#stopstxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Stop {
    /// Unique technical identifier (not for the traveller) of the stop
    pub id: String,
    /// Short text or a number that identifies the location for riders
    pub code: Option<String>,
    /// Name of the location
    pub name: String,
    /// Description of the location that provides useful, quality information
    pub description: String,
    /// Type of the location
    pub location_type: LocationType,
    /// Defines hierarchy between the different locations
    pub parent_station: Option<String>,
    /// Identifies the fare zone for a stop
    pub zone_id: Option<String>,
    /// Longitude of the stop
    pub longitude: Option<f64>,
    /// Latitude of the stop
    pub latitude: Option<f64>,
    /// Timezone of the location
    pub timezone: Option<String>,
}

impl Id for Stop {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A route is a commercial line (there can be various stop sequences for a same line). See <https://gtfs.org/reference/static/#routestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Route {
    /// Unique technical (not for the traveller) identifier for the route
    pub id: String,
    /// Short name of a route, like "32" or "Green"
    pub short_name: String,
    /// Full name of a route, generally more descriptive than the short name
    pub long_name: String,
    /// Description of a route that provides useful, quality information
    pub desc: Option<String>,
    /// Indicates the type of transportation used on a route
    pub route_type: RouteType,
    /// URL of a web page about the particular route
    pub url: Option<String>,
    /// Agency for the specified route
    pub agency_id: Option<String>,
    /// Orders the routes in a way which is ideal for presentation to customers
    pub order: Option<u32>,
}

impl Id for Route {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.long_name.is_empty() {
            write!(f, "{}", self.long_name)
        } else {
            write!(f, "{}", self.short_name)
        }
    }
}

/// A Trip is a vehicle that follows a sequence of stop times on certain days. See <https://gtfs.org/reference/static/#tripstxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Trip {
    /// Unique technical identifier (not for the traveller) for the Trip
    pub id: String,
    /// References the [Calendar] on which this trip runs
    pub service_id: String,
    /// References along which [Route] this trip runs
    pub route_id: String,
    /// Shape of the trip
    pub shape_id: Option<String>,
    /// Text that appears on signage identifying the trip's destination to riders
    pub trip_headsign: Option<String>,
    /// Public facing text used to identify the trip to riders
    pub trip_short_name: Option<String>,
    /// Indicates the direction of travel for a trip, to separate trips by
    /// direction when publishing time tables
    pub direction_id: Option<DirectionType>,
    /// Identifies the block to which the trip belongs. A block consists of a
    /// single trip or many sequential trips made using the same vehicle
    pub block_id: Option<String>,
}

impl Id for Trip {
    fn id(&self) -> &str {
        &self.id
    }
}

/// The moment where a vehicle, running on a [Trip], stops at a [Stop]. See <https://gtfs.org/reference/static/#stop_timestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct StopTime {
    /// [Trip] to which this stop time belongs to
    pub trip_id: String,
    /// Arrival time of the stop time, in seconds since midnight.
    /// It's an option since the intermediate stops can have no arrival
    /// and this arrival needs to be interpolated
    pub arrival_time: Option<u32>,
    /// Departure time of the stop time, in seconds since midnight
    pub departure_time: Option<u32>,
    /// Identifier of the [Stop] where the vehicle stops
    pub stop_id: String,
    /// Order of stops for a particular trip. The values must increase along the trip but do not need to be consecutive
    pub stop_sequence: u16,
    /// Text that appears on signage identifying the trip's destination to riders
    pub stop_headsign: Option<String>,
    /// Actual distance traveled along the associated shape, from the first stop to this one
    pub shape_dist_traveled: Option<f32>,
}

/// A calendar describes on which days the vehicle runs. See <https://gtfs.org/reference/static/#calendartxt>
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Calendar {
    /// Unique technical identifier (not for the traveller) of this calendar
    pub id: String,
    /// Does the service run on mondays
    pub monday: bool,
    /// Does the service run on tuesdays
    pub tuesday: bool,
    /// Does the service run on wednesdays
    pub wednesday: bool,
    /// Does the service run on thursdays
    pub thursday: bool,
    /// Does the service run on fridays
    pub friday: bool,
    /// Does the service run on saturdays
    pub saturday: bool,
    /// Does the service run on sundays
    pub sunday: bool,
    /// Start service day for the service interval
    pub start_date: NaiveDate,
    /// End service day for the service interval. This service day is included in the interval
    pub end_date: NaiveDate,
}

impl Id for Calendar {
    fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for Calendar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}—{}", self.start_date, self.end_date)
    }
}

/// Defines a specific date that can be added or removed from a [Calendar]. See <https://gtfs.org/reference/static/#calendar_datestxt>
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CalendarDate {
    /// Identifier of the service that is modified at this date
    pub service_id: String,
    /// Date where the service will be added or deleted
    pub date: NaiveDate,
    /// Is the service added or deleted
    pub exception_type: Exception,
}

/// Defines one possible fare. See <https://gtfs.org/reference/static/#fare_attributestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct FareAttribute {
    /// Unique technical (not for the traveller) identifier for the FareAttribute
    pub id: String,
    /// Fare price, in the unit specified by the currency
    pub price: String,
    /// Currency used to pay the fare
    pub currency: String,
    /// Indicates when the fare must be paid
    pub payment_method: PaymentMethod,
    /// Indicates the number of transfers permitted on this fare
    pub transfers: Transfers,
    /// Identifies the relevant agency for a fare
    pub agency_id: Option<String>,
    /// Length of time in seconds before a transfer expires
    pub transfer_duration: Option<usize>,
}

impl Id for FareAttribute {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Associates a [FareAttribute] with the itineraries it applies to. See <https://gtfs.org/reference/static/#fare_rulestxt>
///
/// Several rules may reference the same fare, one per route or zone
/// combination, so the fare id is not unique here.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct FareRule {
    /// The [FareAttribute] this rule gives a scope to
    pub fare_id: String,
    /// [Route] the fare applies to
    pub route_id: Option<String>,
    /// Origin fare zone
    pub origin_id: Option<String>,
    /// Destination fare zone
    pub destination_id: Option<String>,
    /// Fare zone a rider passes through
    pub contains_id: Option<String>,
}

/// A single geographical point decribing the shape of a [Trip]. See <https://gtfs.org/reference/static/#shapestxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Shape {
    /// Unique technical (not for the traveller) identifier for the Shape
    pub id: String,
    /// Latitude of a shape point
    pub latitude: f64,
    /// Longitude of a shape point
    pub longitude: f64,
    /// Sequence in which the shape points connect to form the shape. Values increase along the trip but do not need to be consecutive
    pub sequence: usize,
    /// Actual distance traveled along the shape from the first shape point to the point specified in this record
    pub dist_traveled: Option<f32>,
}

/// Timetables can be defined by the frequency of their vehicles. See <https://gtfs.org/reference/static/#frequenciestxt>
///
/// A trip may run under several frequency windows over the day.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Frequency {
    /// References the [Trip] that uses frequency
    pub trip_id: String,
    /// Time at which the first vehicle departs from the first stop of the trip
    pub start_time: u32,
    /// Time at which service changes to a different headway (or ceases) at the first stop in the trip
    pub end_time: u32,
    /// Time, in seconds, between departures from the same stop (headway) for the trip
    pub headway_secs: u32,
    /// Indicates the type of service for a trip
    pub exact_times: Option<ExactTimes>,
}

/// Transfer rule between two stops. See <https://gtfs.org/reference/static/#transferstxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct Transfer {
    /// Stop from which to leave
    pub from_stop_id: String,
    /// Stop which to transfer to
    pub to_stop_id: String,
    /// Type of the transfer
    pub transfer_type: TransferType,
    /// Minimum time needed to make the transfer in seconds
    pub min_transfer_time: Option<u32>,
}

/// Meta-data about the feed. See <https://gtfs.org/reference/static/#feed_infotxt>
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct FeedInfo {
    /// Full name of the organization that publishes the dataset
    pub name: String,
    /// URL of the dataset publishing organization's website
    pub url: String,
    /// Default language used for the text in this dataset
    pub lang: String,
    /// Defines the language that should be used when the data consumer doesn’t know the language of the rider
    pub default_lang: Option<String>,
    /// The dataset provides complete and reliable schedule information for service in the period from this date
    pub start_date: Option<NaiveDate>,
    /// The dataset provides complete and reliable schedule information for service in the period until this date
    pub end_date: Option<NaiveDate>,
    /// String that indicates the current version of their GTFS dataset
    pub version: Option<String>,
    /// Email address for communication regarding the GTFS dataset and data publishing practices
    pub contact_email: Option<String>,
    /// URL for contact information regarding the GTFS dataset and data publishing practices
    pub contact_url: Option<String>,
}

impl fmt::Display for FeedInfo {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
