//! Flattening a received proxy graph into absolute transform chains.
//!
//! Hosts without nested instancing place every atomic object once per
//! placement path that reaches it. For an object owned by a definition, the
//! walk goes upward: the owning definition, each placement of it, the
//! definition owning that placement, and so on until a placement sits at the
//! root. Every completed path becomes one [`LocalToGlobalMap`] whose chain
//! lists the placement transforms innermost first.

use blockgraph_core::{
    ConversionReport, InstanceDefinitionProxy, InstanceError, InstanceProxy, LocalToGlobalMap,
    ProxyGraph, ReceivedNode, TransformChain, TraversalItem,
};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Received objects that carry the application id they were sent with.
pub trait HasApplicationId {
    /// The sent application id, if any.
    fn application_id(&self) -> Option<&str>;
}

impl HasApplicationId for String {
    fn application_id(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

/// Flattened output.
#[derive(Debug)]
pub struct Flattened<'a, T> {
    /// One entry per object per reachable placement path.
    pub maps: Vec<LocalToGlobalMap<'a, T>>,
    /// Skipped objects and graph problems.
    pub issues: Vec<ConversionReport>,
}

impl<'a, T> Default for Flattened<'a, T> {
    fn default() -> Self {
        Self {
            maps: Vec::new(),
            issues: Vec::new(),
        }
    }
}

/// Flattens instance graphs for hosts that cannot nest instances.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalToGlobalUnpacker;

struct Path<'a> {
    target: &'a str,
    matrices: TransformChain,
    /// Placements already on this path.
    visited: Vec<usize>,
}

impl LocalToGlobalUnpacker {
    /// Create an unpacker.
    pub fn new() -> Self {
        Self
    }

    /// Flatten `objects` against `definitions`.
    ///
    /// Without definitions every atomic object is taken as absolute.
    /// Placements found among `objects` supply the transforms; they are not
    /// emitted themselves.
    pub fn unpack<'a, T: HasApplicationId>(
        &self,
        definitions: Option<&'a [InstanceDefinitionProxy]>,
        objects: &'a [TraversalItem<T>],
    ) -> Flattened<'a, T> {
        let mut atomics: Vec<(&'a [String], &'a T)> = Vec::new();
        let mut instances: Vec<&'a InstanceProxy> = Vec::new();
        for item in objects {
            match &item.node {
                ReceivedNode::Instance(proxy) => instances.push(proxy),
                ReceivedNode::Atomic(object) => atomics.push((&item.layer_path, object)),
            }
        }

        let mut out = Flattened::default();
        let graph = definitions.map(|definitions| ProxyGraph::new(definitions, instances));
        if let Some(graph) = &graph {
            for issue in graph.issues() {
                let source = match issue {
                    InstanceError::MissingDefinition { instance_id, .. }
                    | InstanceError::DuplicateInstance { instance_id } => {
                        Some(instance_id.clone())
                    }
                    InstanceError::DuplicateDefinition { definition_id } => {
                        Some(definition_id.clone())
                    }
                    _ => None,
                };
                out.issues.push(ConversionReport::failure(source, issue.clone()));
            }
        }

        let mut reported_cycles: HashSet<Vec<String>> = HashSet::new();
        for (layer_path, atomic) in atomics {
            let Some(id) = atomic.application_id() else {
                warn!("skipping received object without application id");
                out.issues.push(ConversionReport::failure(
                    None,
                    InstanceError::MissingApplicationId {
                        type_name: short_type_name::<T>().to_string(),
                    },
                ));
                continue;
            };

            let owned = graph.as_ref().filter(|graph| graph.owner_of(id).is_some());
            match owned {
                None => out.maps.push(LocalToGlobalMap {
                    layer_path,
                    atomic,
                    matrices: TransformChain::new(),
                }),
                Some(graph) => {
                    let before = out.maps.len();
                    for result in walk_up(graph, id) {
                        match result {
                            Ok(matrices) => out.maps.push(LocalToGlobalMap {
                                layer_path,
                                atomic,
                                matrices,
                            }),
                            Err(cycle) => {
                                if reported_cycles.insert(cycle.clone()) {
                                    warn!(
                                        cycle = %cycle.join(" -> "),
                                        "cyclic definition reference"
                                    );
                                    out.issues.push(ConversionReport::failure(
                                        Some(id.to_string()),
                                        InstanceError::CyclicDefinitionReference { cycle },
                                    ));
                                }
                            }
                        }
                    }
                    if out.maps.len() == before {
                        debug!(id, "object has no placement path");
                    }
                }
            }
        }

        debug!(maps = out.maps.len(), issues = out.issues.len(), "flattened objects");
        out
    }
}

/// Every placement path from `id` up to the root.
///
/// Paths that revisit a placement are returned as the cycle they close.
fn walk_up<'g>(
    graph: &ProxyGraph<'g>,
    id: &'g str,
) -> Vec<std::result::Result<TransformChain, Vec<String>>> {
    let mut done = Vec::new();
    let mut pending = vec![Path {
        target: id,
        matrices: TransformChain::new(),
        visited: Vec::new(),
    }];

    while let Some(path) = pending.pop() {
        let Some(definition) = graph.owner_of(path.target) else {
            done.push(Ok(path.matrices));
            continue;
        };

        // Reverse so the first placement's path is completed first.
        for &placement in graph.placements_of(definition).iter().rev() {
            if let Some(start) = path.visited.iter().position(|&p| p == placement) {
                let mut cycle: Vec<String> = path.visited[start..]
                    .iter()
                    .map(|&p| graph.instance_at(p).application_id.clone())
                    .collect();
                cycle.push(graph.instance_at(placement).application_id.clone());
                done.push(Err(cycle));
                continue;
            }

            let instance = graph.instance_at(placement);
            let mut matrices = path.matrices.clone();
            matrices.push(instance.transform);
            let mut visited = path.visited.clone();
            visited.push(placement);
            pending.push(Path {
                target: &instance.application_id,
                matrices,
                visited,
            });
        }
    }

    done
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}
