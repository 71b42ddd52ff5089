//! Job workers.

mod raw_distribution;

pub use raw_distribution::{RawDistributionContext, distribute, raw_distribution_worker};
