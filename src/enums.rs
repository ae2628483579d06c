use serde::{Deserialize, Serialize};

/// Describes the kind of [Stop](crate::Stop). See <https://gtfs.org/reference/static/#stopstxt> `location_type`
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum LocationType {
    /// Stop (or Platform). A location where passengers board or disembark from a transit vehicle
    #[default]
    StopPoint,
    /// Station. A physical structure or area that contains one or more platform
    StopArea,
    /// A location where passengers can enter or exit a station from the street
    StationEntrance,
    /// A location within a station, not matching any other location type
    GenericNode,
    /// A specific location on a platform, where passengers can board and/or alight vehicles
    BoardingArea,
}

/// Describes the kind of [Route](crate::Route). See <https://gtfs.org/reference/static/#routestxt> `route_type`
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum RouteType {
    /// Tram, Streetcar, Light rail. Any light rail or street level system within a metropolitan area
    Tramway,
    /// Any underground rail system within a metropolitan area
    Subway,
    /// Used for intercity or long-distance travel
    Rail,
    /// Used for short- and long-distance bus routes
    #[default]
    Bus,
    /// Used for short- and long-distance boat service
    Ferry,
    /// Used for street-level rail cars where the cable runs beneath the vehicle
    CableCar,
    /// Aerial lift, suspended cable car
    Gondola,
    /// Any rail system designed for steep inclines
    Funicular,
    /// Any other value
    Other(i32),
}

/// Defines the direction of a [Trip](crate::Trip), only for display, not for routing
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum DirectionType {
    /// Travel in one direction (e.g. outbound travel)
    #[default]
    Outbound,
    /// Travel in the opposite direction (e.g. inbound travel)
    Inbound,
}

/// Is the service added or removed on a given date. See <https://gtfs.org/reference/static/#calendar_datestxt>
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum Exception {
    /// There will be a service on that day
    Added,
    /// There won’t be a service on that day
    Deleted,
}

/// When is a fare paid. See <https://gtfs.org/reference/static/#fare_attributestxt>
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum PaymentMethod {
    /// Fare is paid on board
    #[default]
    Aboard,
    /// Fare must be paid before boarding
    PreBoarding,
}

/// How many transfers a fare permits. See <https://gtfs.org/reference/static/#fare_attributestxt>
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum Transfers {
    /// Unlimited transfers are permitted
    #[default]
    Unlimited,
    /// No transfers permitted on this fare
    NoTransfer,
    /// Riders may transfer once
    UniqueTransfer,
    /// Riders may transfer twice
    TwoTransfers,
    /// Other transfer values
    Other(i32),
}

/// Defines if a [Frequency](crate::Frequency) is exact (the vehicle runs exactly every n minutes) or not
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum ExactTimes {
    /// Frequency-based trips
    #[default]
    FrequencyBased,
    /// Schedule-based trips with the exact same headway throughout the day
    ScheduleBased,
}

/// How a [Transfer](crate::Transfer) between two stops behaves. See <https://gtfs.org/reference/static/#transferstxt>
#[derive(Debug, Default, Serialize, Deserialize, Copy, Clone, PartialEq, Eq)]
pub enum TransferType {
    /// Recommended transfer point between routes
    #[default]
    Recommended,
    /// Departing vehicle waits for arriving one
    Timed,
    /// Transfer requires a minimum amount of time between arrival and departure to ensure a connection
    MinTime,
    /// Transfer is not possible at this location
    Impossible,
}
