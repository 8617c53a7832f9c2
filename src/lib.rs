//! # archgraph
//!
//! Archetype-based Entity-Component-System core.
//!
//! Entities sharing an identical component signature are grouped into
//! archetypes. Archetypes form a graph whose edges are single-component
//! toggles, so an entity whose component set changes in a way seen before
//! moves between archetypes in O(1). Systems are bound to queries and keep a
//! cache of matching archetypes that is updated as new archetypes appear.
//!
//! ## Design Goals
//! - Bitset signatures of unbounded width
//! - One archetype per signature, whatever the order components were added in
//! - Systems matched retroactively at registration and incrementally after
//! - The core tracks component *presence* only; payloads belong to the host
//!
//! ## Example
//! ```ignore
//! use archgraph::prelude::*;
//!
//! let mut world = World::new();
//! let position = world.create_component();
//! let velocity = world.create_component();
//!
//! let e = world.create_entity();
//! world.add_component(e, position);
//! world.add_component(e, velocity);
//!
//! world.add_system(EntitySystem::new(
//!     query(|q| q.every(&[position, velocity])),
//!     |_ctx, entities| println!("moving {entities:?}"),
//! ));
//! world.update()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(dead_code)]

pub mod engine;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports (Public API)
// ─────────────────────────────────────────────────────────────────────────────

pub use engine::world::{World, WorldConfig};

pub use engine::archetype::{Archetype, ArchetypeGraph, make_mask};

pub use engine::bitset::BitSet;

pub use engine::query::{query, Query, QueryBuilder, Matcher};

pub use engine::systems::{
    System,
    EntitySystem,
    ArchetypeSystem,
    SystemContext,
};

pub use engine::commands::Command;

pub use engine::component::{ComponentDesc, ComponentRegistry};

pub use engine::error::{ECSError, ECSResult};

pub use engine::types::{
    EntityID,
    ComponentID,
    ArchetypeID,
    SystemID,
    ROOT_ARCHETYPE,
};

// ─────────────────────────────────────────────────────────────────────────────
// Prelude
// ─────────────────────────────────────────────────────────────────────────────

/// Commonly used ECS types.
///
/// Import with:
/// ```rust
/// use archgraph::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        World,
        Archetype,
        BitSet,
        Query,
        QueryBuilder,
        query,
        System,
        EntitySystem,
        ArchetypeSystem,
        SystemContext,
        Command,
        ECSError,
        ECSResult,
        EntityID,
        ComponentID,
        ArchetypeID,
    };
}
