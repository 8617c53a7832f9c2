//! # Component Registry
//!
//! Assigns stable [`ComponentID`] values to component kinds.
//!
//! ## Purpose
//! The ECS core only tracks the *presence* of components. Ids are allocated
//! by the world, either anonymously (the caller associates them with a
//! kind out-of-band) or for a Rust type, in which case the registry keeps a
//! `TypeId -> ComponentID` mapping so the same type always resolves to the
//! same id. Payload storage is left to the host.
//!
//! ## Invariants
//! - Ids are allocated sequentially from zero and never reused.
//! - Every entry in `by_type` has a matching `by_id` descriptor.
//! - A registry belongs to one world; there is no process-wide state.

use std::any::{type_name, TypeId};
use std::collections::HashMap;

use crate::engine::types::ComponentID;


/// Metadata recorded for a component id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentDesc {
    /// Allocated id.
    pub id: ComponentID,
    /// Rust type name for typed registrations, `None` for anonymous ids.
    pub name: Option<&'static str>,
}

/// Per-world component id allocator.
#[derive(Debug, Default)]
pub struct ComponentRegistry {
    by_type: HashMap<TypeId, ComponentID>,
    by_id: Vec<ComponentDesc>,
}

impl ComponentRegistry {

    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, name: Option<&'static str>) -> ComponentID {
        let id = self.by_id.len() as ComponentID;
        self.by_id.push(ComponentDesc { id, name });
        id
    }

    /// Allocates a fresh anonymous component id.
    pub fn create(&mut self) -> ComponentID {
        self.alloc(None)
    }

    /// Returns the id for `T`, allocating one on first registration.
    pub fn register<T: 'static>(&mut self) -> ComponentID {
        let type_id = TypeId::of::<T>();
        if let Some(&existing) = self.by_type.get(&type_id) {
            return existing;
        }
        let id = self.alloc(Some(type_name::<T>()));
        self.by_type.insert(type_id, id);
        id
    }

    /// Returns the id registered for `T`, if any.
    pub fn id_of<T: 'static>(&self) -> Option<ComponentID> {
        self.by_type.get(&TypeId::of::<T>()).copied()
    }

    /// Descriptor of `id`, if it was allocated.
    pub fn desc(&self, id: ComponentID) -> Option<&ComponentDesc> {
        self.by_id.get(id as usize)
    }

    /// Number of allocated ids.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns `true` if no id was allocated yet.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
