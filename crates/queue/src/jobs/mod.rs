//! Job definitions.

#![allow(missing_docs)]

mod deliver;
mod raw_distribution;

pub use deliver::DeliverJob;
pub use raw_distribution::RawDistributionJob;
