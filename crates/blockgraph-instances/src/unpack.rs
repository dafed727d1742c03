//! Unpacking a host selection into atomic objects and a proxy graph.
//!
//! The walk is an explicit depth-first stack of definition frames; the frames
//! on the stack are the ancestors of the object being visited, which is what
//! cycle detection checks against. A definition reached again at a greater
//! depth is promoted and its members walked again, so every definition ends
//! at the longest path that reaches it.

use crate::host::{InstanceHost, ObjectShape};
use crate::options::UnpackOptions;
use crate::registry::ProxyRegistry;
use blockgraph_core::{CancellationToken, InstanceError, Result, UnpackResult, Units};
use tracing::{debug, trace, warn};

struct Frame<O> {
    /// Placement that entered the definition.
    placement: String,
    definition: String,
    depth: u32,
    members: std::vec::IntoIter<O>,
}

/// Unpack `selection`, checking `cancel` before every top-level object.
pub fn unpack_selection<H: InstanceHost>(
    host: &H,
    selection: &[H::Object],
    options: &UnpackOptions,
    cancel: &CancellationToken,
) -> Result<UnpackResult<H::Object>> {
    let mut walker = Walker {
        host,
        units: options.units.unwrap_or_else(|| host.model_units()),
        max_depth: options.max_nesting_depth,
        registry: ProxyRegistry::new(),
        stack: Vec::new(),
    };

    for (completed, object) in selection.iter().enumerate() {
        cancel.check(completed)?;
        walker.walk(object.clone());
    }

    let result = walker.registry.finish();
    debug!(
        atomic = result.atomic_objects.len(),
        instances = result.instance_proxies.len(),
        definitions = result.instance_definition_proxies.len(),
        issues = result.issues.len(),
        "unpacked selection"
    );
    Ok(result)
}

struct Walker<'h, H: InstanceHost> {
    host: &'h H,
    units: Units,
    max_depth: u32,
    registry: ProxyRegistry<H::Object>,
    stack: Vec<Frame<H::Object>>,
}

impl<'h, H: InstanceHost> Walker<'h, H> {
    /// Walk one top-level object and everything below it.
    fn walk(&mut self, root: H::Object) {
        self.visit(root, 1);
        while let Some(frame) = self.stack.last_mut() {
            match frame.members.next() {
                Some(member) => {
                    let depth = frame.depth + 1;
                    self.visit(member, depth);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }

    /// Visit an object at `depth`, where depth 1 is the scene root.
    ///
    /// Members of a definition entered at depth `d` are visited at `d + 1`,
    /// so a placement inside a root-level placement's definition is at depth 2.
    fn visit(&mut self, object: H::Object, depth: u32) {
        let shape = match self.host.inspect(&object) {
            Ok(shape) => shape,
            Err(error) => {
                let id = self.host.object_id(&object);
                warn!(id = ?id, %error, "skipping object");
                self.registry.report(id, error);
                return;
            }
        };

        let Some(id) = self.host.object_id(&object) else {
            let type_name = self.host.type_name(&object);
            warn!(type_name = %type_name, "skipping object without application id");
            self.registry
                .report(None, InstanceError::MissingApplicationId { type_name });
            return;
        };

        let owner = self.stack.last().map(|frame| frame.definition.clone());

        match shape {
            ObjectShape::Atomic => {
                trace!(id = %id, depth, "atomic object");
                if let Some(owner) = &owner {
                    self.registry.add_member(owner, &id);
                }
                self.registry.add_atomic(id, object);
            }
            ObjectShape::Instance {
                definition,
                transform,
            } => {
                if depth > self.max_depth {
                    warn!(id = %id, depth, limit = self.max_depth, "placement nested too deep");
                    self.registry.report(
                        Some(id.clone()),
                        InstanceError::NestingTooDeep {
                            id,
                            depth,
                            limit: self.max_depth,
                        },
                    );
                    return;
                }

                if let Some(cycle) = self.cycle_through(&id, &definition.id) {
                    warn!(cycle = %cycle.join(" -> "), "cyclic definition reference");
                    self.registry.report(
                        Some(id),
                        InstanceError::CyclicDefinitionReference { cycle },
                    );
                    return;
                }

                self.registry
                    .register_instance(&id, &definition.id, transform, self.units, depth);
                if let Some(owner) = &owner {
                    self.registry.add_member(owner, &id);
                }

                let registration = self.registry.register_definition(
                    &definition.id,
                    definition.name.as_deref(),
                    depth,
                );
                if registration.needs_walk() {
                    self.stack.push(Frame {
                        placement: id,
                        definition: definition.id,
                        depth,
                        members: definition.members.into_iter(),
                    });
                }
            }
        }
    }

    /// The cycle closed by placing `definition_id` through `placement_id`,
    /// if that definition is already being walked.
    fn cycle_through(&self, placement_id: &str, definition_id: &str) -> Option<Vec<String>> {
        let start = self
            .stack
            .iter()
            .position(|frame| frame.definition == definition_id)?;
        let mut cycle = Vec::new();
        for (offset, frame) in self.stack[start..].iter().enumerate() {
            if offset > 0 {
                cycle.push(frame.placement.clone());
            }
            cycle.push(frame.definition.clone());
        }
        cycle.push(placement_id.to_string());
        cycle.push(definition_id.to_string());
        Some(cycle)
    }
}
