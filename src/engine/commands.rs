//! # Commands
//!
//! Deferred structural mutations of the world.
//!
//! ## Purpose
//! System callbacks only get shared access to the archetype graph. Structural
//! changes they request (spawning, despawning, adding or removing components)
//! are recorded as [`Command`] values and applied by the world at a
//! synchronization point: before the first system of a tick and after each
//! system returns. Changes made by one system are therefore visible to every
//! later system of the same tick.
//!
//! ## Invariants
//! - Commands are applied in the order they were recorded.
//! - Commands targeting an entity that is unknown at application time are
//!   silent no-ops, exactly like the direct world methods.
//! - A `Spawn` command carries an entity id that was reserved when the
//!   command was recorded, so later commands in the same queue may target it.

use crate::engine::types::{ArchetypeID, ComponentID, EntityID};


/// A deferred world mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Inserts a reserved entity id into an archetype.
    Spawn {
        /// Id reserved for the new entity.
        entity: EntityID,
        /// Archetype the entity starts in.
        archetype: ArchetypeID,
    },

    /// Removes an entity from the world.
    Despawn {
        /// Entity to remove.
        entity: EntityID,
    },

    /// Adds a component to an entity.
    Add {
        /// Target entity.
        entity: EntityID,
        /// Component to add.
        component: ComponentID,
    },

    /// Removes a component from an entity.
    Remove {
        /// Target entity.
        entity: EntityID,
        /// Component to remove.
        component: ComponentID,
    },
}
