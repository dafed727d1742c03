//! Baking a received proxy graph into a host document.

use crate::host::InstanceHost;
use crate::naming::DefinitionName;
use crate::options::BakeOptions;
use blockgraph_core::{
    BakeResult, CancellationToken, CardProgress, ConversionReport, GraphNode, InstanceComponent,
    InstanceError, ProgressSink, ProxyGraph, Result, Units,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace, warn};

/// Application id to host handles of objects already in the document.
///
/// Atomic objects are converted and added before a bake; the bake adds an
/// entry for every placement it creates.
pub type AppIdMap = HashMap<String, Vec<String>>;

/// Status line reported for every baked component.
pub const BAKE_STATUS: &str = "Converting blocks";

/// Realize `components` in the host document.
///
/// Each component is paired with the layer path it was received under.
/// Per-component failures end up in [`BakeResult::conversion_results`];
/// only cancellation and unusable input are returned as errors.
pub fn bake_instances<H: InstanceHost>(
    host: &mut H,
    components: &[(Vec<String>, InstanceComponent)],
    app_id_map: &mut AppIdMap,
    base_layer_name: &str,
    options: &BakeOptions,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<BakeResult> {
    if base_layer_name.is_empty() {
        return Err(InstanceError::InvalidInput(
            "base layer name must not be empty".to_string(),
        ));
    }

    let graph = ProxyGraph::from_components(components.iter().map(|(_, component)| component));
    let layers: HashMap<&str, &[String]> = components
        .iter()
        .map(|(path, component)| (component.application_id(), path.as_slice()))
        .collect();

    let mut baker = Baker {
        model_units: host.model_units(),
        host,
        graph: &graph,
        layers,
        app_id_map,
        base_layer: base_layer_name,
        options,
        definition_handles: HashMap::new(),
        failed: HashSet::new(),
        result: BakeResult::default(),
    };

    for issue in graph.issues() {
        let duplicate = match issue {
            InstanceError::DuplicateDefinition { definition_id } => definition_id,
            InstanceError::DuplicateInstance { instance_id } => instance_id,
            _ => continue,
        };
        baker
            .result
            .conversion_results
            .push(ConversionReport::failure(Some(duplicate.clone()), issue.clone()));
    }

    let plan = graph.realization_plan();
    let total = plan.order.len().max(1) as f64;

    for (completed, node) in plan.order.iter().copied().enumerate() {
        cancel.check(completed)?;
        progress.report(CardProgress::new(
            BAKE_STATUS,
            Some(completed as f64 / total),
        ));

        let id = graph.node_id(node);
        let outcome = match plan.cyclic.get(&node) {
            Some(cycle) => Err(InstanceError::CyclicDefinitionReference {
                cycle: cycle.clone(),
            }),
            None => match node {
                GraphNode::Definition(index) => baker.bake_definition(index),
                GraphNode::Instance(index) => baker.bake_instance(index),
            },
        };

        let report = match outcome {
            Ok((handle, kind)) => ConversionReport::success(id, handle, kind),
            Err(error) => {
                warn!(id, %error, "failed to bake component");
                baker.failed.insert(node);
                ConversionReport::failure(Some(id.to_string()), error)
            }
        };
        baker.result.conversion_results.push(report);
    }

    progress.report(CardProgress::new(BAKE_STATUS, Some(1.0)));

    let mut result = baker.result;
    let consumed: HashSet<&str> = result.consumed_ids.iter().map(String::as_str).collect();
    result.created_ids.retain(|id| !consumed.contains(id.as_str()));
    debug!(
        created = result.created_ids.len(),
        consumed = result.consumed_ids.len(),
        errors = result.error_count(),
        "baked instance graph"
    );
    Ok(result)
}

struct Baker<'a, 'g, H> {
    host: &'a mut H,
    graph: &'a ProxyGraph<'g>,
    layers: HashMap<&'g str, &'g [String]>,
    app_id_map: &'a mut AppIdMap,
    base_layer: &'a str,
    options: &'a BakeOptions,
    model_units: Units,
    definition_handles: HashMap<usize, String>,
    failed: HashSet<GraphNode>,
    result: BakeResult,
}

impl<'a, 'g, H: InstanceHost> Baker<'a, 'g, H> {
    fn bake_definition(&mut self, index: usize) -> Result<(String, &'static str)> {
        let definition = self.graph.definition_at(index);
        let mut members = Vec::with_capacity(definition.objects.len());
        let mut first_failed = None;

        for member in &definition.objects {
            if let Some(placement) = self.graph.instance_index(member) {
                if self.failed.contains(&GraphNode::Instance(placement)) {
                    warn!(
                        definition = %definition.application_id,
                        member = %member,
                        "leaving failed placement out of definition"
                    );
                    first_failed.get_or_insert(member);
                    continue;
                }
            }
            match self.app_id_map.get(member) {
                Some(handles) => members.extend(handles.iter().cloned()),
                None => trace!(
                    definition = %definition.application_id,
                    member = %member,
                    "member not in document"
                ),
            }
        }

        if members.is_empty() {
            if let Some(dependency) = first_failed {
                return Err(InstanceError::UnresolvedDependency {
                    id: definition.application_id.clone(),
                    dependency: dependency.clone(),
                });
            }
        }

        let name = DefinitionName::new(
            definition.label(),
            &definition.application_id,
            self.base_layer,
        )
        .to_string();
        let handle = self.host.create_definition(
            &name,
            &self.options.definition_description,
            &members,
        )?;

        self.result.consumed_ids.extend(members);
        self.definition_handles.insert(index, handle.clone());
        Ok((handle, "InstanceDefinition"))
    }

    fn bake_instance(&mut self, index: usize) -> Result<(String, &'static str)> {
        let instance = self.graph.instance_at(index);
        let definition = self.graph.resolved_definition(index).ok_or_else(|| {
            InstanceError::missing_definition(&instance.application_id, &instance.definition_id)
        })?;
        let definition_handle = self
            .definition_handles
            .get(&definition)
            .cloned()
            .ok_or_else(|| InstanceError::UnresolvedDependency {
                id: instance.application_id.clone(),
                dependency: instance.definition_id.clone(),
            })?;

        let factor = if self.options.convert_units {
            instance.units.scale_to(self.model_units)
        } else {
            1.0
        };
        let transform = instance.transform.with_scaled_translation(factor);

        let path = self
            .layers
            .get(instance.application_id.as_str())
            .copied()
            .unwrap_or_default();
        let layer = self.host.ensure_layer(path, self.base_layer)?;
        let handle = self
            .host
            .place_instance(&definition_handle, &transform, &layer)?;

        self.app_id_map
            .insert(instance.application_id.clone(), vec![handle.clone()]);
        self.result.created_ids.push(handle.clone());
        Ok((handle, "Instance"))
    }
}
