//! Proxy data model for block instance graphs.
//!
//! This crate holds the host-agnostic records exchanged between host
//! integrations and the wire:
//! - [`InstanceProxy`] and [`InstanceDefinitionProxy`], the portable records
//! - [`Transform`] and transform chains, with a fixed multiplication order
//! - operation results ([`UnpackResult`], [`BakeResult`], [`LocalToGlobalMap`])
//! - [`ProxyGraph`], an indexed view used for ordering and cycle checks
//! - error, progress and cancellation types shared by the engines

pub mod errors;
pub mod graph;
pub mod progress;
pub mod proxy;
pub mod results;
pub mod transform;
pub mod units;

pub use errors::{InstanceError, Result};
pub use graph::{GraphNode, ProxyGraph, RealizationPlan};
pub use progress::{CancellationToken, CardProgress, NoProgress, ProgressSink};
pub use proxy::{InstanceComponent, InstanceDefinitionProxy, InstanceProxy};
pub use results::{
    BakeResult, ConversionReport, LocalToGlobalMap, ReceivedNode, Status, TransformChain,
    TraversalItem, UnpackResult,
};
pub use transform::{collapse, Transform};
pub use units::Units;
