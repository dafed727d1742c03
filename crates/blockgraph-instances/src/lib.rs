//! Engines over block instance graphs.
//!
//! - [`unpack_selection`] turns a host selection into atomic objects plus a
//!   proxy graph with depth bookkeeping
//! - [`bake_instances`] realizes a received graph as native definitions and
//!   placements, in dependency order
//! - [`purge_instances`] removes definitions baked by an earlier receive
//! - [`LocalToGlobalUnpacker`] flattens a graph into absolute transform chains
//!   for hosts without nested instancing
//!
//! The engines only talk to a document through [`InstanceHost`].
//! [`InstanceObjectsManager`] bundles them for one document.
//!
//! # Example
//!
//! ```ignore
//! let mut manager = InstanceObjectsManager::new(&mut document);
//! let unpacked = manager.unpack_selection(&selection)?;
//! let plan = partition_by_cache(manager.host(), &unpacked.atomic_objects, &cache, project_id);
//! ```

pub mod bake;
pub mod host;
pub mod local_to_global;
pub mod manager;
pub mod naming;
pub mod options;
pub mod purge;
pub mod registry;
pub mod send;
pub mod unpack;

#[cfg(test)]
mod test_support;

pub use bake::{bake_instances, AppIdMap, BAKE_STATUS};
pub use host::{DefinitionView, InstanceHost, ObjectShape};
pub use local_to_global::{Flattened, HasApplicationId, LocalToGlobalUnpacker};
pub use manager::InstanceObjectsManager;
pub use naming::DefinitionName;
pub use options::{BakeOptions, UnpackOptions, DEFAULT_MAX_NESTING_DEPTH};
pub use purge::purge_instances;
pub use registry::{ProxyRegistry, Registration};
pub use send::{partition_by_cache, SendPlan};
pub use unpack::unpack_selection;
