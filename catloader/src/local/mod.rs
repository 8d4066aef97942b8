//! Local override of remote datasets.
//!
//! When the application already holds a decoded copy of the dataset being
//! requested, that copy is served instead of going to the network. The
//! committed cache is bypassed in both directions.

mod active;
mod resolver;

pub use active::{ActiveDataset, ActiveDatasetSource, SharedActiveDataset};
pub use resolver::LocalOverride;
