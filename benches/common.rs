#![allow(dead_code)]

use archgraph::engine::types::{ComponentID, EntityID};
use archgraph::engine::world::World;

pub const ENTITIES_SMALL: usize = 10_000;
pub const ENTITIES_MED: usize = 100_000;
pub const COMPONENTS: usize = 8;

/// Builds a world where entity `i` holds every component whose bit is set in `i`.
pub fn setup_world(entity_count: usize) -> (World, Vec<ComponentID>, Vec<EntityID>) {
    let mut world = World::new();
    let components: Vec<ComponentID> = (0..COMPONENTS).map(|_| world.create_component()).collect();

    let mut entities = Vec::with_capacity(entity_count);
    for i in 0..entity_count {
        let entity = world.create_entity();
        for (bit, &component) in components.iter().enumerate() {
            if i & (1 << bit) != 0 {
                world.add_component(entity, component);
            }
        }
        entities.push(entity);
    }
    (world, components, entities)
}
