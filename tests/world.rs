use std::collections::HashSet;

use archgraph::engine::archetype::make_mask;
use archgraph::engine::commands::Command;
use archgraph::engine::error::ECSError;
use archgraph::engine::query::query;
use archgraph::engine::types::{ArchetypeID, ComponentID, EntityID, ROOT_ARCHETYPE};
use archgraph::engine::world::{World, WorldConfig};

/// Asserts every live entity sits in exactly the archetype the index maps it to.
fn assert_index_consistent(world: &World, live: &[EntityID]) {
    assert_eq!(world.entity_count(), live.len());
    for &entity in live {
        let home = world.archetype_of(entity).expect("live entity has an archetype");
        let holders: Vec<ArchetypeID> = world
            .graph()
            .archetypes()
            .iter()
            .filter(|a| a.contains_entity(entity))
            .map(|a| a.id())
            .collect();
        assert_eq!(holders, vec![home], "entity {entity} misplaced");
    }
    let members: usize = world.graph().archetypes().iter().map(|a| a.len()).sum();
    assert_eq!(members, live.len());
}

#[test]
fn ids_are_sequential() {
    let mut world = World::new();
    assert_eq!(world.create_component(), 0);
    assert_eq!(world.create_component(), 1);
    assert_eq!(world.create_entity(), 0);
    assert_eq!(world.create_entity(), 1);
    assert_eq!(world.archetype_of(0), Some(ROOT_ARCHETYPE));
}

#[test]
fn add_and_remove_component_move_entity() {
    let mut world = World::new();
    let a = world.create_component();
    let b = world.create_component();
    let e = world.create_entity();

    world.add_component(e, a);
    world.add_component(e, b);
    assert!(world.has_component(e, a));
    assert!(world.has_component(e, b));
    assert_eq!(world.components_of(e), Some(vec![a, b]));

    world.remove_component(e, a);
    assert!(!world.has_component(e, a));
    assert_eq!(world.components_of(e), Some(vec![b]));

    world.remove_component(e, b);
    assert_eq!(world.archetype_of(e), Some(ROOT_ARCHETYPE));
    assert_index_consistent(&world, &[e]);
}

#[test]
fn different_orders_land_on_same_archetype() {
    let mut world = World::new();
    let a = world.create_component();
    let b = world.create_component();
    let first = world.create_entity();
    let second = world.create_entity();

    world.add_component(first, a);
    world.add_component(first, b);
    world.add_component(second, b);
    world.add_component(second, a);

    assert_eq!(world.archetype_of(first), world.archetype_of(second));
    assert_eq!(world.graph().len(), 4);
}

#[test]
fn redundant_changes_are_no_ops() {
    let mut world = World::new();
    let a = world.create_component();
    let b = world.create_component();
    let e = world.create_entity();
    world.add_component(e, a);

    let archetypes = world.graph().len();
    let home = world.archetype_of(e);

    world.add_component(e, a);
    world.remove_component(e, b);

    assert_eq!(world.graph().len(), archetypes);
    assert_eq!(world.archetype_of(e), home);
    assert_index_consistent(&world, &[e]);
}

#[test]
fn unknown_entities_are_ignored() {
    let mut world = World::new();
    let a = world.create_component();

    world.add_component(99, a);
    world.remove_component(99, a);
    world.delete_entity(99);
    assert!(world.set_entity(99, ROOT_ARCHETYPE).is_ok());

    assert!(!world.has_component(99, a));
    assert_eq!(world.entity_count(), 0);
    assert_eq!(world.graph().len(), 1);
}

#[test]
fn delete_entity_leaves_archetypes_in_place() {
    let mut world = World::new();
    let a = world.create_component();
    let e = world.create_entity();
    world.add_component(e, a);
    let home = world.archetype_of(e).unwrap();

    world.delete_entity(e);
    assert!(!world.contains_entity(e));
    assert!(world.archetype(home).unwrap().is_empty());
    assert_eq!(world.graph().len(), 2);

    // Ids are never reused.
    assert_eq!(world.create_entity(), e + 1);
}

#[test]
fn index_stays_consistent_under_mixed_operations() {
    let mut world = World::new();
    let components: Vec<ComponentID> = (0..6).map(|_| world.create_component()).collect();
    let mut live: Vec<EntityID> = (0..20).map(|_| world.create_entity()).collect();

    // Deterministic pseudo-random walk over add/remove/delete.
    let mut seed: u64 = 0x9E37_79B9_7F4A_7C15;
    for step in 0..500 {
        seed ^= seed << 13;
        seed ^= seed >> 7;
        seed ^= seed << 17;
        if live.is_empty() {
            break;
        }
        let entity = live[(seed % live.len() as u64) as usize];
        let component = components[((seed >> 8) % components.len() as u64) as usize];
        match (seed >> 16) % 10 {
            0 if step % 7 == 0 => {
                world.delete_entity(entity);
                live.retain(|&e| e != entity);
            }
            1..=5 => world.add_component(entity, component),
            _ => world.remove_component(entity, component),
        }
    }

    assert_index_consistent(&world, &live);

    let mut masks = HashSet::new();
    for archetype in world.graph().archetypes() {
        assert!(masks.insert(archetype.mask().clone()));
        for (component, adjacent) in archetype.edges() {
            assert_eq!(
                world.archetype(adjacent).and_then(|n| n.adjacent(component)),
                Some(archetype.id())
            );
        }
    }
}

#[test]
fn create_and_set_entity_require_known_archetype() {
    let mut world = World::new();
    let a = world.create_component();
    let e = world.create_entity();
    world.add_component(e, a);
    let with_a = world.archetype_of(e).unwrap();

    let direct = world.create_entity_in(with_a).unwrap();
    assert!(world.has_component(direct, a));

    assert_eq!(world.create_entity_in(77), Err(ECSError::UnknownArchetype(77)));
    assert_eq!(world.set_entity(direct, 77), Err(ECSError::UnknownArchetype(77)));

    world.set_entity(direct, ROOT_ARCHETYPE).unwrap();
    assert!(!world.has_component(direct, a));
    assert_index_consistent(&world, &[e, direct]);
}

#[test]
fn typed_component_registration() {
    struct Position;
    struct Velocity;

    let mut world = World::new();
    let anonymous = world.create_component();
    let position = world.register_component::<Position>();
    let velocity = world.register_component::<Velocity>();

    assert_eq!(world.register_component::<Position>(), position);
    assert_eq!(world.component_id_of::<Velocity>(), Some(velocity));
    assert_eq!(world.component_id_of::<u8>(), None);
    assert_eq!(anonymous, 0);
    assert_eq!(position, 1);

    assert_eq!(world.component_desc(anonymous).unwrap().name, None);
    assert!(world.component_desc(position).unwrap().name.unwrap().ends_with("Position"));
    assert!(world.component_desc(9).is_none());
}

#[test]
fn matching_archetypes_and_query_entities() {
    let mut world = World::new();
    let a = world.create_component();
    let b = world.create_component();
    let e1 = world.create_entity();
    let e2 = world.create_entity();
    let e3 = world.create_entity();
    world.add_component(e1, a);
    world.add_component(e2, a);
    world.add_component(e2, b);
    world.add_component(e3, b);

    let q = query(|q| q.every(&[a]));
    let matched = world.matching_archetypes(&q);
    assert_eq!(matched.len(), 2);
    assert!(matched.windows(2).all(|w| w[0] < w[1]));

    let mut entities = world.query_entities(&q);
    entities.sort_unstable();
    assert_eq!(entities, vec![e1, e2]);
}

#[test]
fn deferred_commands_apply_in_order() {
    let mut world = World::new();
    let a = world.create_component();
    let existing = world.create_entity();

    let reserved = world.reserve_entity();
    world.defer(Command::Spawn { entity: reserved, archetype: ROOT_ARCHETYPE });
    world.defer(Command::Add { entity: reserved, component: a });
    world.defer(Command::Add { entity: existing, component: a });
    world.defer(Command::Remove { entity: existing, component: a });
    world.defer(Command::Despawn { entity: 1_000 });
    assert_eq!(world.pending_commands(), 5);
    assert!(!world.contains_entity(reserved));

    assert_eq!(world.apply_deferred_commands(), Ok(5));
    assert_eq!(world.pending_commands(), 0);
    assert!(world.has_component(reserved, a));
    assert!(!world.has_component(existing, a));
    assert_index_consistent(&world, &[existing, reserved]);
}

#[test]
fn failing_spawn_keeps_later_commands_queued() {
    let mut world = World::new();
    let a = world.create_component();
    let e = world.create_entity();
    let reserved = world.reserve_entity();

    world.defer(Command::Spawn { entity: reserved, archetype: 55 });
    world.defer(Command::Add { entity: e, component: a });

    assert_eq!(world.apply_deferred_commands(), Err(ECSError::UnknownArchetype(55)));
    assert_eq!(world.pending_commands(), 1);
    assert_eq!(world.apply_deferred_commands(), Ok(1));
    assert!(world.has_component(e, a));
}

#[test]
fn config_sizes_root_mask() {
    let world = World::with_config(WorldConfig { initial_mask_words: 2, entity_capacity: 16 });
    assert_eq!(world.graph().root().mask().word_len(), 2);
    assert_eq!(world.config().entity_capacity, 16);

    let default = World::new();
    assert_eq!(default.graph().root().mask().word_len(), 8);
}

#[test]
fn masks_grow_past_initial_capacity() {
    let mut world = World::with_config(WorldConfig { initial_mask_words: 1, entity_capacity: 0 });
    let ids: Vec<ComponentID> = (0..100).map(|_| world.create_component()).collect();
    let e = world.create_entity();
    world.add_component(e, ids[99]);
    world.add_component(e, ids[3]);

    assert_eq!(world.components_of(e), Some(vec![3, 99]));
    let home = world.archetype_of(e).unwrap();
    assert_eq!(world.archetype(home).unwrap().mask(), &make_mask(&[3, 99]));
}

#[test]
fn spawn_rejects_ids_the_world_never_handed_out() {
    let mut world = World::new();
    let a = world.create_component();

    world.defer(Command::Spawn { entity: 0, archetype: ROOT_ARCHETYPE });
    world.defer(Command::Add { entity: 0, component: a });
    assert_eq!(world.apply_deferred_commands(), Err(ECSError::UnreservedEntity(0)));
    assert!(!world.contains_entity(0));
    assert_eq!(world.pending_commands(), 1);

    // The id is still available to the normal allocator and lands in one archetype.
    let fresh = world.create_entity();
    assert_eq!(fresh, 0);
    world.add_component(fresh, a);
    let next = world.create_entity();
    assert_ne!(next, fresh);
    assert_index_consistent(&world, &[fresh, next]);
}

#[test]
fn spawn_of_a_live_entity_is_skipped() {
    let mut world = World::new();
    let a = world.create_component();
    let e = world.create_entity();
    world.add_component(e, a);
    let home = world.archetype_of(e);

    world.defer(Command::Spawn { entity: e, archetype: ROOT_ARCHETYPE });
    world.defer(Command::Remove { entity: e, component: a });
    assert_eq!(world.apply_deferred_commands(), Ok(1));

    assert_ne!(world.archetype_of(e), home);
    assert_eq!(world.archetype_of(e), Some(ROOT_ARCHETYPE));
    assert_index_consistent(&world, &[e]);
}

#[test]
fn unallocated_component_ids_are_ignored() {
    let mut world = World::new();
    let a = world.create_component();
    let e = world.create_entity();

    world.add_component(e, u32::MAX);
    world.add_component(e, a + 1);
    assert_eq!(world.archetype_of(e), Some(ROOT_ARCHETYPE));
    assert_eq!(world.graph().len(), 1);

    world.add_component(e, a);
    world.remove_component(e, u32::MAX);
    assert_eq!(world.components_of(e), Some(vec![a]));
}
