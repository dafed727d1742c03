//! Arena view over a received proxy graph.
//!
//! [`ProxyGraph`] interns definitions and placements into index space and
//! keeps the adjacency the engines need: which definition owns a member id,
//! which placements realize a definition, and which definition a placement
//! resolves to. It never mutates the proxies it borrows.

use crate::errors::InstanceError;
use crate::proxy::{InstanceComponent, InstanceDefinitionProxy, InstanceProxy};
use std::collections::HashMap;
use tracing::warn;

/// Index of a node in a [`ProxyGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphNode {
    /// Index into the definition arena.
    Definition(usize),
    /// Index into the placement arena.
    Instance(usize),
}

/// Borrowed, indexed proxy graph.
#[derive(Debug)]
pub struct ProxyGraph<'a> {
    definitions: Vec<&'a InstanceDefinitionProxy>,
    instances: Vec<&'a InstanceProxy>,
    definition_index: HashMap<&'a str, usize>,
    instance_index: HashMap<&'a str, usize>,
    /// Placement -> resolved definition.
    resolved: Vec<Option<usize>>,
    /// Definition -> placements of it.
    placements: Vec<Vec<usize>>,
    /// Member id -> owning definition.
    owners: HashMap<&'a str, usize>,
    issues: Vec<InstanceError>,
}

/// Dependency-ordered realization plan for a graph.
#[derive(Debug, Clone, Default)]
pub struct RealizationPlan {
    /// Every node, dependencies before dependents.
    pub order: Vec<GraphNode>,
    /// Nodes on a definition cycle, with the cycle they belong to.
    pub cyclic: HashMap<GraphNode, Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

impl<'a> ProxyGraph<'a> {
    /// Index definitions and placements.
    ///
    /// Duplicate definition and placement ids keep the first record and are
    /// reported.
    /// Placements whose definition is unknown stay unresolved and are
    /// reported as [`InstanceError::MissingDefinition`].
    pub fn new<D, I>(definitions: D, instances: I) -> Self
    where
        D: IntoIterator<Item = &'a InstanceDefinitionProxy>,
        I: IntoIterator<Item = &'a InstanceProxy>,
    {
        let mut graph = ProxyGraph {
            definitions: Vec::new(),
            instances: Vec::new(),
            definition_index: HashMap::new(),
            instance_index: HashMap::new(),
            resolved: Vec::new(),
            placements: Vec::new(),
            owners: HashMap::new(),
            issues: Vec::new(),
        };

        for definition in definitions {
            let id = definition.application_id.as_str();
            if graph.definition_index.contains_key(id) {
                warn!(definition = id, "duplicate definition id, keeping the first");
                graph.issues.push(InstanceError::DuplicateDefinition {
                    definition_id: id.to_string(),
                });
                continue;
            }
            let index = graph.definitions.len();
            graph.definition_index.insert(id, index);
            graph.definitions.push(definition);
            graph.placements.push(Vec::new());
            for member in &definition.objects {
                graph.owners.entry(member.as_str()).or_insert(index);
            }
        }

        for instance in instances {
            let id = instance.application_id.as_str();
            if graph.instance_index.contains_key(id) {
                warn!(instance = id, "duplicate instance id, keeping the first");
                graph.issues.push(InstanceError::DuplicateInstance {
                    instance_id: id.to_string(),
                });
                continue;
            }
            let index = graph.instances.len();
            graph.instance_index.insert(id, index);
            graph.instances.push(instance);

            let definition = graph
                .definition_index
                .get(instance.definition_id.as_str())
                .copied();
            match definition {
                Some(def) => graph.placements[def].push(index),
                None => graph.issues.push(InstanceError::missing_definition(
                    id,
                    instance.definition_id.as_str(),
                )),
            }
            graph.resolved.push(definition);
        }

        graph
    }

    /// Index the records of a received component list.
    pub fn from_components<C>(components: C) -> Self
    where
        C: IntoIterator<Item = &'a InstanceComponent> + Clone,
    {
        let definitions = components.clone().into_iter().filter_map(|c| match c {
            InstanceComponent::Definition(d) => Some(d),
            InstanceComponent::Instance(_) => None,
        });
        let instances = components.into_iter().filter_map(|c| match c {
            InstanceComponent::Instance(i) => Some(i),
            InstanceComponent::Definition(_) => None,
        });
        Self::new(definitions, instances)
    }

    /// Number of distinct definitions.
    pub fn definition_count(&self) -> usize {
        self.definitions.len()
    }

    /// Number of distinct placements.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Definition at `index`.
    pub fn definition_at(&self, index: usize) -> &'a InstanceDefinitionProxy {
        self.definitions[index]
    }

    /// Placement at `index`.
    pub fn instance_at(&self, index: usize) -> &'a InstanceProxy {
        self.instances[index]
    }

    /// Index of the definition with `id`.
    pub fn definition_index(&self, id: &str) -> Option<usize> {
        self.definition_index.get(id).copied()
    }

    /// Index of the placement with `id`.
    pub fn instance_index(&self, id: &str) -> Option<usize> {
        self.instance_index.get(id).copied()
    }

    /// Definition a placement resolves to.
    pub fn resolved_definition(&self, instance: usize) -> Option<usize> {
        self.resolved[instance]
    }

    /// The definition that lists `member_id` among its objects.
    pub fn owner_of(&self, member_id: &str) -> Option<usize> {
        self.owners.get(member_id).copied()
    }

    /// Placements of the definition at `index`.
    pub fn placements_of(&self, definition: usize) -> &[usize] {
        &self.placements[definition]
    }

    /// Problems found while indexing.
    pub fn issues(&self) -> &[InstanceError] {
        &self.issues
    }

    /// Application id of a node.
    pub fn node_id(&self, node: GraphNode) -> &'a str {
        match node {
            GraphNode::Definition(d) => &self.definitions[d].application_id,
            GraphNode::Instance(i) => &self.instances[i].application_id,
        }
    }

    /// Nodes that must exist before `node` can be realized.
    pub fn dependencies(&self, node: GraphNode) -> Vec<GraphNode> {
        match node {
            GraphNode::Instance(i) => self.resolved[i]
                .map(GraphNode::Definition)
                .into_iter()
                .collect(),
            GraphNode::Definition(d) => self.definitions[d]
                .objects
                .iter()
                .filter_map(|member| self.instance_index(member))
                .map(GraphNode::Instance)
                .collect(),
        }
    }

    /// Order every node so that dependencies come first.
    ///
    /// Roots are visited deepest first, definitions before placements at
    /// equal depth, which matches the order hosts expect when the recorded
    /// depths are consistent. The depth-first pass then fixes any order the
    /// recorded depths get wrong. Cycles do not abort the walk: every node of
    /// a strongly connected component is collected in
    /// [`RealizationPlan::cyclic`].
    pub fn realization_plan(&self) -> RealizationPlan {
        let definition_count = self.definitions.len();
        let slot = |node: GraphNode| match node {
            GraphNode::Definition(d) => d,
            GraphNode::Instance(i) => definition_count + i,
        };
        let node_at = |slot: usize| {
            if slot < definition_count {
                GraphNode::Definition(slot)
            } else {
                GraphNode::Instance(slot - definition_count)
            }
        };

        let mut roots: Vec<GraphNode> = (0..definition_count)
            .map(GraphNode::Definition)
            .chain((0..self.instances.len()).map(GraphNode::Instance))
            .collect();
        roots.sort_by_key(|node| {
            let (depth, kind) = match *node {
                GraphNode::Definition(d) => (self.definitions[d].max_depth, 0u8),
                GraphNode::Instance(i) => (self.instances[i].max_depth, 1u8),
            };
            (std::cmp::Reverse(depth), kind)
        });

        let adjacency: Vec<Vec<usize>> = (0..definition_count + self.instances.len())
            .map(|s| self.dependencies(node_at(s)).into_iter().map(slot).collect())
            .collect();

        let mut marks = vec![Mark::Unvisited; adjacency.len()];
        let mut plan = RealizationPlan::default();

        for root in roots {
            let root = slot(root);
            if marks[root] != Mark::Unvisited {
                continue;
            }
            marks[root] = Mark::OnPath;
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some(top) = stack.len().checked_sub(1) {
                let (node, next) = stack[top];
                let Some(&dep) = adjacency[node].get(next) else {
                    marks[node] = Mark::Done;
                    plan.order.push(node_at(node));
                    stack.pop();
                    continue;
                };
                stack[top].1 += 1;
                if marks[dep] == Mark::Unvisited {
                    marks[dep] = Mark::OnPath;
                    stack.push((dep, 0));
                }
            }
        }

        for component in strongly_connected(&adjacency) {
            let cycle: Vec<String> = cycle_within(&adjacency, &component)
                .into_iter()
                .map(|s| self.node_id(node_at(s)).to_string())
                .collect();
            warn!(cycle = %cycle.join(" -> "), "cyclic definition reference");
            for member in component {
                plan.cyclic.insert(node_at(member), cycle.clone());
            }
        }

        plan
    }

    /// Check the graph before any host mutation.
    ///
    /// Returns indexing issues plus one [`InstanceError::CyclicDefinitionReference`]
    /// per distinct cycle.
    pub fn validate(&self) -> Vec<InstanceError> {
        let mut problems = self.issues.clone();
        let plan = self.realization_plan();
        let mut cycles: Vec<&Vec<String>> = plan.cyclic.values().collect();
        cycles.sort();
        cycles.dedup();
        problems.extend(cycles.into_iter().map(|cycle| {
            InstanceError::CyclicDefinitionReference {
                cycle: cycle.clone(),
            }
        }));
        problems
    }
}

/// Components of `adjacency` that contain a cycle, by iterative Tarjan.
fn strongly_connected(adjacency: &[Vec<usize>]) -> Vec<Vec<usize>> {
    const UNVISITED: usize = usize::MAX;
    let count = adjacency.len();
    let mut index = vec![UNVISITED; count];
    let mut low = vec![0; count];
    let mut on_stack = vec![false; count];
    let mut stack = Vec::new();
    let mut next_index = 0;
    let mut components = Vec::new();

    for start in 0..count {
        if index[start] != UNVISITED {
            continue;
        }
        index[start] = next_index;
        low[start] = next_index;
        next_index += 1;
        stack.push(start);
        on_stack[start] = true;
        let mut work: Vec<(usize, usize)> = vec![(start, 0)];

        while let Some(top) = work.len().checked_sub(1) {
            let (node, next) = work[top];
            if let Some(&dep) = adjacency[node].get(next) {
                work[top].1 += 1;
                if index[dep] == UNVISITED {
                    index[dep] = next_index;
                    low[dep] = next_index;
                    next_index += 1;
                    stack.push(dep);
                    on_stack[dep] = true;
                    work.push((dep, 0));
                } else if on_stack[dep] {
                    low[node] = low[node].min(index[dep]);
                }
                continue;
            }

            work.pop();
            if let Some(&(parent, _)) = work.last() {
                low[parent] = low[parent].min(low[node]);
            }
            if low[node] != index[node] {
                continue;
            }
            let mut component = Vec::new();
            while let Some(member) = stack.pop() {
                on_stack[member] = false;
                component.push(member);
                if member == node {
                    break;
                }
            }
            if component.len() > 1 || adjacency[node].contains(&node) {
                component.sort_unstable();
                components.push(component);
            }
        }
    }

    components
}

/// One closed walk inside `component`, starting and ending at its first node.
fn cycle_within(adjacency: &[Vec<usize>], component: &[usize]) -> Vec<usize> {
    let mut path: Vec<usize> = Vec::new();
    let Some(&first) = component.first() else {
        return path;
    };
    let mut current = first;
    loop {
        if let Some(seen) = path.iter().position(|&n| n == current) {
            let mut cycle = path.split_off(seen);
            cycle.push(current);
            return cycle;
        }
        path.push(current);
        match adjacency[current]
            .iter()
            .copied()
            .find(|dep| component.binary_search(dep).is_ok())
        {
            Some(next) => current = next,
            None => return path,
        }
    }
}
