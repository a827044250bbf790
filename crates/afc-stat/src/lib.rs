#![deny(missing_docs)]

//! Named statistical accumulators keyed by event multiplicity.
//!
//! The store is the output sink of the correlator engine: frequency
//! accumulators count events per multiplicity bin, profile accumulators
//! track the running mean and variance of a per-event scalar per bin.
//! One store instance exists per run and is passed by reference to the
//! engine; worker-parallel batches combine their private stores through
//! the associative [`AccumulatorStore::merge`].

pub mod accum;
pub mod store;

pub use accum::{CountAccumulator, ProfileAccumulator, ProfileBin};
pub use store::{Accumulator, AccumulatorStore};
