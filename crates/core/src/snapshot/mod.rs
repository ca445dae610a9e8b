//! Per-pair resolution into immutable snapshots.

mod snapshot_model;
mod snapshot_resolver;

pub use snapshot_model::{Quote, Snapshot, SnapshotParts};
pub use snapshot_resolver::{PairResolution, ResolutionRequest, ResolverConfig, SnapshotResolver};
