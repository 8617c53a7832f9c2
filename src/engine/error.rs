//! Error types for the ECS core.
//!
//! Almost every operation in this crate is a pure in-memory structural edit
//! and is designed never to fail: unknown entities and redundant component
//! changes are silent no-ops. The few failures that remain are programming
//! mistakes surfaced at the API boundary:
//!
//! * dispatching a system whose concrete type the world does not know how to
//!   drive ([`ECSError::UnknownSystemKind`]),
//! * addressing an archetype id the graph never allocated
//!   ([`ECSError::UnknownArchetype`]),
//! * addressing a system id that was never returned by `add_system`
//!   ([`ECSError::UnknownSystem`]),
//! * spawning an entity id that was never reserved
//!   ([`ECSError::UnreservedEntity`]).
//!
//! None of these are recoverable runtime conditions. They are returned to the
//! caller with `?` and never caught internally.
//!
//! ## Display vs. Debug
//! * [`fmt::Display`] is short and suitable for logs.
//! * [`fmt::Debug`] (derived) keeps the full structure.

use std::fmt;

use crate::engine::types::{ArchetypeID, EntityID, SystemID};


/// Top-level error for world operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ECSError {

    /// A registered system is neither an entity system nor an archetype system.
    ///
    /// This indicates a bug in system construction.
    UnknownSystemKind {
        /// Type name reported by the offending system.
        system: String,
    },

    /// An archetype id does not refer to a node of the archetype graph.
    UnknownArchetype(ArchetypeID),

    /// A system id does not refer to a registered system.
    UnknownSystem(SystemID),

    /// A spawn targets an entity id the world never handed out.
    UnreservedEntity(EntityID),
}

impl fmt::Display for ECSError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ECSError::UnknownSystemKind { system } => {
                write!(f, "tried to update unknown system type `{system}`")
            }
            ECSError::UnknownArchetype(id) => write!(f, "unknown archetype id {id}"),
            ECSError::UnknownSystem(id) => write!(f, "unknown system id {id}"),
            ECSError::UnreservedEntity(id) => write!(f, "entity id {id} was never reserved"),
        }
    }
}

impl std::error::Error for ECSError {}

/// Result alias used throughout the engine.
pub type ECSResult<T> = Result<T, ECSError>;
