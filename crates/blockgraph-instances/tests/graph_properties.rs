//! Property tests over random acyclic block graphs.

use blockgraph_core::{
    CancellationToken, InstanceError, Result, TraversalItem, Transform, UnpackResult, Units,
};
use blockgraph_instances::{
    unpack_selection, DefinitionView, InstanceHost, LocalToGlobalUnpacker, ObjectShape,
    UnpackOptions,
};
use glam::DVec3;
use indexmap::IndexMap;
use proptest::prelude::*;
use std::collections::HashMap;

/// Definition `k` holds atom `a{k}` plus placements of lower definitions.
#[derive(Debug, Clone)]
struct Forest {
    /// Child definition indexes placed inside each definition.
    children: Vec<Vec<usize>>,
    /// Definitions placed at the root.
    roots: Vec<usize>,
}

#[derive(Debug, Clone)]
enum Node {
    Atom,
    Placement { definition: usize, offset: f64 },
}

struct ForestHost {
    nodes: IndexMap<String, Node>,
    members: Vec<Vec<String>>,
}

impl ForestHost {
    fn new(forest: &Forest) -> (Self, Vec<String>) {
        let mut nodes = IndexMap::new();
        let mut members = Vec::new();
        let mut offset = 0.0;
        for (k, children) in forest.children.iter().enumerate() {
            let atom = format!("a{k}");
            nodes.insert(atom.clone(), Node::Atom);
            let mut list = vec![atom];
            for (n, &child) in children.iter().enumerate() {
                offset += 1.0;
                let id = format!("p{k}_{n}");
                nodes.insert(id.clone(), Node::Placement { definition: child, offset });
                list.push(id);
            }
            members.push(list);
        }
        let mut selection = Vec::new();
        for (n, &root) in forest.roots.iter().enumerate() {
            offset += 1.0;
            let id = format!("r{n}");
            nodes.insert(id.clone(), Node::Placement { definition: root, offset });
            selection.push(id);
        }
        (Self { nodes, members }, selection)
    }
}

impl InstanceHost for ForestHost {
    type Object = String;

    fn object_id(&self, object: &String) -> Option<String> {
        Some(object.clone())
    }

    fn inspect(&self, object: &String) -> Result<ObjectShape<String>> {
        match self.nodes.get(object) {
            Some(Node::Atom) => Ok(ObjectShape::Atomic),
            Some(Node::Placement { definition, offset }) => Ok(ObjectShape::Instance {
                definition: DefinitionView::new(
                    format!("d{definition}"),
                    self.members[*definition].clone(),
                ),
                transform: Transform::from_translation(DVec3::new(*offset, 0.0, 0.0)),
            }),
            None => Err(InstanceError::unsupported(object, "Unknown")),
        }
    }

    fn model_units(&self) -> Units {
        Units::Meters
    }

    fn ensure_layer(&mut self, _path: &[String], base_layer: &str) -> Result<String> {
        Ok(base_layer.to_string())
    }

    fn create_definition(&mut self, name: &str, _: &str, _: &[String]) -> Result<String> {
        Err(InstanceError::host_mutation(name, "read-only"))
    }

    fn place_instance(&mut self, definition: &str, _: &Transform, _: &str) -> Result<String> {
        Err(InstanceError::host_mutation(definition, "read-only"))
    }

    fn definitions(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn delete_definition(&mut self, definition: &str) -> Result<()> {
        Err(InstanceError::host_mutation(definition, "read-only"))
    }
}

fn forest() -> impl Strategy<Value = Forest> {
    (1usize..6)
        .prop_flat_map(|count| {
            let children = (0..count)
                .map(|k| {
                    if k == 0 {
                        Just(Vec::new()).boxed()
                    } else {
                        prop::collection::vec(0..k, 0..3).boxed()
                    }
                })
                .collect::<Vec<_>>();
            (children, prop::collection::vec(0..count, 1..4))
        })
        .prop_map(|(children, roots)| Forest { children, roots })
}

/// Longest placement depth of every reachable definition.
fn expected_depths(forest: &Forest) -> HashMap<usize, u32> {
    fn visit(forest: &Forest, definition: usize, depth: u32, out: &mut HashMap<usize, u32>) {
        let recorded = out.entry(definition).or_insert(depth);
        *recorded = (*recorded).max(depth);
        for &child in &forest.children[definition] {
            visit(forest, child, depth + 1, out);
        }
    }
    let mut out = HashMap::new();
    for &root in &forest.roots {
        visit(forest, root, 1, &mut out);
    }
    out
}

/// Number of placement paths from the root down to each definition.
fn path_counts(forest: &Forest) -> HashMap<usize, usize> {
    fn visit(forest: &Forest, definition: usize, out: &mut HashMap<usize, usize>) {
        *out.entry(definition).or_default() += 1;
        for &child in &forest.children[definition] {
            visit(forest, child, out);
        }
    }
    let mut out = HashMap::new();
    for &root in &forest.roots {
        visit(forest, root, &mut out);
    }
    out
}

fn unpack(forest: &Forest) -> UnpackResult<String> {
    let (host, selection) = ForestHost::new(forest);
    unpack_selection(
        &host,
        &selection,
        &UnpackOptions::default(),
        &CancellationToken::new(),
    )
    .unwrap()
}

proptest! {
    #[test]
    fn test_depth_is_longest_path(forest in forest()) {
        let result = unpack(&forest);
        let expected = expected_depths(&forest);

        prop_assert_eq!(result.instance_definition_proxies.len(), expected.len());
        for (definition, depth) in &expected {
            let proxy = result.definition(&format!("d{definition}")).unwrap();
            prop_assert_eq!(proxy.max_depth, *depth);
        }
        for proxy in result.instance_proxies.values() {
            let definition = result.definition(&proxy.definition_id).unwrap();
            prop_assert_eq!(proxy.max_depth, definition.max_depth);
        }
        prop_assert!(result.issues.is_empty());
    }

    #[test]
    fn test_one_map_per_placement_path(forest in forest()) {
        let result = unpack(&forest);
        let counts = path_counts(&forest);

        let mut items: Vec<TraversalItem<String>> = result
            .atomic_objects
            .iter()
            .map(|atom| TraversalItem::atomic(Vec::new(), atom.clone()))
            .collect();
        items.extend(
            result
                .instance_proxies
                .values()
                .map(|proxy| TraversalItem::instance(Vec::new(), proxy.clone())),
        );

        let flattened = LocalToGlobalUnpacker::new()
            .unpack(Some(result.instance_definition_proxies.as_slice()), &items);

        prop_assert!(flattened.issues.is_empty());
        for (definition, count) in &counts {
            let atom = format!("a{definition}");
            let maps = flattened.maps.iter().filter(|m| *m.atomic == atom).count();
            prop_assert_eq!(maps, *count);
        }
        prop_assert_eq!(flattened.maps.len(), counts.values().sum::<usize>());
    }
}
