//! Reusing cached conversions across sends of an edited document.

use blockgraph_cache::{InMemorySendConversionCache, ObjectReference, SendConversionCache};
use blockgraph_core::{Transform, Units};
use blockgraph_instances::{partition_by_cache, InstanceObjectsManager};
use blockgraph_scene::{Geometry, SceneDocument};
use glam::DVec3;
use indexmap::IndexMap;

const PROJECT: &str = "project-1";

#[test]
fn test_edits_invalidate_only_changed_objects() {
    let mut doc = SceneDocument::new(Units::Meters);
    let seat = doc.add_geometry(Geometry::point(DVec3::ZERO));
    let leg = doc.add_geometry(Geometry::point(DVec3::NEG_Z));
    let chair = doc.define_block("Chair", "", &[seat, leg]).unwrap();
    doc.place_block(chair, Transform::IDENTITY).unwrap();
    let lamp = doc.add_geometry(Geometry::point(DVec3::Y));
    let cache = InMemorySendConversionCache::new();

    let selection = doc.scene_objects();
    let unpacked = InstanceObjectsManager::new(&mut doc)
        .unpack_selection(&selection)
        .unwrap();
    assert_eq!(unpacked.atomic_objects.len(), 3);

    let first = partition_by_cache(&doc, &unpacked.atomic_objects, &cache, PROJECT);
    assert_eq!(first.cached.len(), 0);
    let references: IndexMap<String, ObjectReference> = first
        .to_convert
        .iter()
        .map(|id| {
            let id = id.to_string();
            let reference = ObjectReference::new(format!("sent-{id}")).with_application_id(&id);
            (id, reference)
        })
        .collect();
    cache.store_send_result(PROJECT, references);
    doc.take_changed_ids();

    doc.transform_object(lamp, &Transform::from_translation(DVec3::X))
        .unwrap();
    cache.evict_objects(&doc.take_changed_ids());

    let second = partition_by_cache(&doc, &unpacked.atomic_objects, &cache, PROJECT);
    assert_eq!(second.to_convert, vec![&lamp]);
    assert_eq!(second.cached.len(), 2);
    assert!((second.hit_ratio() - 2.0 / 3.0).abs() < 1e-12);

    let (object, reference) = &second.cached[0];
    assert_eq!(reference.referenced_id, format!("sent-{object}"));
}
