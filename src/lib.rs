/*! Ingestion core for [General Transit Feed Specification](https://gtfs.org/) data.

This crate takes the already-parsed tables of a transit feed (agencies, stops,
routes, trips, stop times, calendars, fares, shapes, frequencies, transfers)
and builds an immutable, queryable snapshot out of them.

To get started, see [Feed].

## Design decisions

### Parsing happens elsewhere

The input boundary is [RawFeed]: plain vectors of typed records, produced by
whatever reads the archive. This crate checks *relationships* (key
uniqueness, feed-level invariants), not field syntax.

### Two kinds of tables

Tables keyed by a single identifier (stops, routes, trips…) become hash maps.
Tables whose identity is a 2-tuple and whose ordering matters (stop times by
`(trip_id, stop_sequence)`, shape points, calendar dates, transfers) go into
a [TupleStore]: an ordered index backed by a private temporary database, so a
feed with tens of millions of stop times never has to sit in memory at once.

### Errors do not stop the load

A bad record (a duplicated key, a disagreeing agency timezone) is recorded
in the validation-error set and loading moves on. Only structural problems
(no agencies at all, ambiguous agency identity) or storage failures abort the
whole ingestion. See [error] for the taxonomy.

### Aggregation runs on demand

[Feed::find_patterns] bins trips by the exact stop sequence they visit and
[Feed::find_blocks] groups interlined trips by block id. Both run after the
feed is frozen, even when validation errors exist.

*/
#![warn(missing_docs)]

mod enums;
pub mod error;
mod feed;
mod objects;
mod patterns;
mod raw;
mod store;

#[cfg(test)]
mod tests;

pub use error::{Error, ErrorSink, FeedTable, ValidationError};
pub use feed::Feed;
pub use objects::*;
pub use patterns::{BlockSet, PatternSet};
pub use raw::RawFeed;
pub use store::{StoreError, TupleStore};
