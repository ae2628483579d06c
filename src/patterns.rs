//! Binning trips by the stop sequence they follow and by the block they
//! interline under. Both run against a finished [Feed], one range scan per
//! trip, so the stop-time table never has to be materialized whole.
use crate::error::Error;
use crate::feed::Feed;
use log::{info, warn};
use std::collections::{BTreeSet, HashMap};

/// The distinct stop-visit sequences of a feed and the trips following each
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    /// Ordered stop ids visited, mapped to the ids of every trip visiting
    /// exactly that sequence (timing differences do not matter)
    pub trips_by_pattern: HashMap<Vec<String>, BTreeSet<String>>,
    /// How many validation errors the feed carried when patterns were
    /// derived. Aggregation runs anyway; callers decide what that means
    pub validation_errors: usize,
}

/// The interlining blocks of a feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSet {
    /// Block id mapped to the ids of the trips sharing it. Trips with an
    /// absent or empty block id appear nowhere
    pub trips_by_block: HashMap<String, BTreeSet<String>>,
    /// Blocks naming a single trip. They stay in the mapping, but a block
    /// only means something when it links two or more trips
    pub single_trip_blocks: BTreeSet<String>,
}

impl Feed {
    /// Bins all trips by the sequence of stops they visit.
    ///
    /// Runs even over a feed flagged partially invalid; the error count is
    /// surfaced on the result.
    pub fn find_patterns(&self) -> Result<PatternSet, Error> {
        let validation_errors = self.validation_errors().len();
        if validation_errors == 0 {
            info!("feed was ingested without errors");
        } else {
            warn!("feed has {validation_errors} validation errors, deriving patterns anyway");
        }

        let mut trips_by_pattern: HashMap<Vec<String>, BTreeSet<String>> = HashMap::new();
        for (n, trip_id) in self.trips().keys().enumerate() {
            if n > 0 && n % 100_000 == 0 {
                info!("scanned {n} trips");
            }
            // In-order traversal of the stop times of this trip; the store's
            // key ordering is what makes the sequence meaningful.
            let stops: Vec<String> = self
                .stop_times_for_trip(trip_id)?
                .into_iter()
                .map(|stop_time| stop_time.stop_id)
                .collect();
            trips_by_pattern
                .entry(stops)
                .or_default()
                .insert(trip_id.clone());
        }
        info!(
            "{} trip patterns over {} trips",
            trips_by_pattern.len(),
            self.trips().len()
        );
        Ok(PatternSet {
            trips_by_pattern,
            validation_errors,
        })
    }

    /// Bins trips by their block id, keeping only trips that declare a
    /// non-empty one.
    pub fn find_blocks(&self) -> BlockSet {
        let mut trips_by_block: HashMap<String, BTreeSet<String>> = HashMap::new();
        for trip in self.trips().values() {
            if let Some(block_id) = trip.block_id.as_deref() {
                if !block_id.is_empty() {
                    trips_by_block
                        .entry(block_id.to_owned())
                        .or_default()
                        .insert(trip.id.clone());
                }
            }
        }

        let single_trip_blocks: BTreeSet<String> = trips_by_block
            .iter()
            .filter(|(_, trips)| trips.len() < 2)
            .map(|(block_id, _)| block_id.clone())
            .collect();
        for block_id in &single_trip_blocks {
            warn!("block {block_id} contains less than 2 trips");
        }

        info!(
            "{} blocks, {} in-block trips",
            trips_by_block.len(),
            trips_by_block.values().map(BTreeSet::len).sum::<usize>()
        );
        BlockSet {
            trips_by_block,
            single_trip_blocks,
        }
    }
}
