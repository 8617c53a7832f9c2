//! ECS System Abstractions
//!
//! A **system** binds a [`Query`] to an update callback and a cache of the
//! archetypes currently matching that query.
//!
//! ## System kinds
//!
//! The world knows how to drive two concrete kinds:
//!
//! - [`EntitySystem`]: the callback receives the flattened list of entities
//!   of every cached archetype.
//! - [`ArchetypeSystem`]: the callback receives the cached archetypes
//!   themselves, leaving entity iteration to the callback (useful for batched
//!   or column-wise processing).
//!
//! Anything else implementing [`System`] can be registered and will be kept
//! in sync with the graph, but dispatching it in `World::update` is a hard
//! error. Kind dispatch goes through [`System::as_any_mut`].
//!
//! ## Archetype cache
//!
//! The cache is populated when the system is registered, by walking the whole
//! archetype graph, and appended to whenever a new archetype is created.
//! [`System::add`] performs no de-duplication; the world calls it exactly once
//! per archetype.
//!
//! ## Invocation policy
//!
//! A system with an empty cache is not invoked. An [`EntitySystem`] whose
//! cached archetypes are all empty is invoked with an empty slice.
//!
//! ## Structural changes
//!
//! Callbacks receive a [`SystemContext`]: shared access to the graph and the
//! entity index, plus a deferred command queue. Queued changes are applied as
//! soon as the callback's system returns.

use std::any::Any;
use std::collections::HashMap;

use crate::engine::archetype::{Archetype, ArchetypeGraph};
use crate::engine::commands::Command;
use crate::engine::query::Query;
use crate::engine::types::{ArchetypeID, ComponentID, EntityID, ROOT_ARCHETYPE};


/// Contract between the world and a system.
///
/// Systems must be `Send` so a world can be moved across threads.
pub trait System: Send {
    /// Query deciding which archetypes the system tracks.
    fn query(&self) -> &Query;

    /// Cached matching archetypes, in the order they were added.
    fn archetypes(&self) -> &[ArchetypeID];

    /// Caches `archetype` if the query matches it.
    fn add(&mut self, archetype: &Archetype);

    /// Human-readable name used in logs and errors.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Upcast used by the world to recognise the system kind.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Callback of an [`EntitySystem`].
pub type EntityUpdate = Box<dyn FnMut(&mut SystemContext<'_>, &[EntityID]) + Send>;

/// Callback of an [`ArchetypeSystem`].
pub type ArchetypeUpdate = Box<dyn FnMut(&mut SystemContext<'_>, &[&Archetype]) + Send>;

/// System invoked with the entities of its matching archetypes.
pub struct EntitySystem {
    name: &'static str,
    query: Query,
    archetypes: Vec<ArchetypeID>,
    update: EntityUpdate,
}

impl EntitySystem {
    /// Creates an entity system from a query and a callback.
    pub fn new<F>(query: Query, update: F) -> Self
    where
        F: FnMut(&mut SystemContext<'_>, &[EntityID]) + Send + 'static,
    {
        Self {
            name: "EntitySystem",
            query,
            archetypes: Vec::new(),
            update: Box::new(update),
        }
    }

    /// Sets the name reported in logs.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub(crate) fn run(&mut self, context: &mut SystemContext<'_>) {
        if self.archetypes.is_empty() {
            return;
        }
        let graph = context.graph();
        let entities: Vec<EntityID> = self
            .archetypes
            .iter()
            .filter_map(|&id| graph.get(id))
            .flat_map(|archetype| archetype.entities().iter().copied())
            .collect();
        (self.update)(context, &entities);
    }
}

impl System for EntitySystem {
    fn query(&self) -> &Query {
        &self.query
    }

    fn archetypes(&self) -> &[ArchetypeID] {
        &self.archetypes
    }

    fn add(&mut self, archetype: &Archetype) {
        if self.query.matches(archetype) {
            self.archetypes.push(archetype.id());
        }
    }

    fn name(&self) -> &str {
        self.name
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// System invoked with its matching archetypes.
pub struct ArchetypeSystem {
    name: &'static str,
    query: Query,
    archetypes: Vec<ArchetypeID>,
    update: ArchetypeUpdate,
}

impl ArchetypeSystem {
    /// Creates an archetype system from a query and a callback.
    pub fn new<F>(query: Query, update: F) -> Self
    where
        F: FnMut(&mut SystemContext<'_>, &[&Archetype]) + Send + 'static,
    {
        Self {
            name: "ArchetypeSystem",
            query,
            archetypes: Vec::new(),
            update: Box::new(update),
        }
    }

    /// Sets the name reported in logs.
    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub(crate) fn run(&mut self, context: &mut SystemContext<'_>) {
        if self.archetypes.is_empty() {
            return;
        }
        let graph = context.graph();
        let archetypes: Vec<&Archetype> = self
            .archetypes
            .iter()
            .filter_map(|&id| graph.get(id))
            .collect();
        (self.update)(context, &archetypes);
    }
}

impl System for ArchetypeSystem {
    fn query(&self) -> &Query {
        &self.query
    }

    fn archetypes(&self) -> &[ArchetypeID] {
        &self.archetypes
    }

    fn add(&mut self, archetype: &Archetype) {
        if self.query.matches(archetype) {
            self.archetypes.push(archetype.id());
        }
    }

    fn name(&self) -> &str {
        self.name
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// World access handed to system callbacks.
///
/// Reads observe the world as it was when the system started. Mutations are
/// queued as [`Command`]s.
pub struct SystemContext<'w> {
    graph: &'w ArchetypeGraph,
    entities: &'w HashMap<EntityID, ArchetypeID>,
    deferred: &'w mut Vec<Command>,
    next_entity_id: &'w mut EntityID,
}

impl<'w> SystemContext<'w> {
    pub(crate) fn new(
        graph: &'w ArchetypeGraph,
        entities: &'w HashMap<EntityID, ArchetypeID>,
        deferred: &'w mut Vec<Command>,
        next_entity_id: &'w mut EntityID,
    ) -> Self {
        Self { graph, entities, deferred, next_entity_id }
    }

    /// The archetype graph.
    #[inline]
    pub fn graph(&self) -> &'w ArchetypeGraph {
        self.graph
    }

    /// Looks up an archetype by id.
    #[inline]
    pub fn archetype(&self, id: ArchetypeID) -> Option<&'w Archetype> {
        self.graph.get(id)
    }

    /// Archetype currently holding `entity`.
    #[inline]
    pub fn archetype_of(&self, entity: EntityID) -> Option<ArchetypeID> {
        self.entities.get(&entity).copied()
    }

    /// Returns `true` if `entity` is live and holds `component`.
    pub fn has_component(&self, entity: EntityID, component: ComponentID) -> bool {
        self.archetype_of(entity)
            .and_then(|id| self.graph.get(id))
            .map_or(false, |archetype| archetype.has_component(component))
    }

    /// Components of `entity`, ascending.
    pub fn components_of(&self, entity: EntityID) -> Option<Vec<ComponentID>> {
        self.archetype_of(entity)
            .and_then(|id| self.graph.get(id))
            .map(Archetype::component_ids)
    }

    /// Queues an arbitrary command.
    #[inline]
    pub fn defer(&mut self, command: Command) {
        self.deferred.push(command);
    }

    /// Reserves an entity id and queues its spawn into the root archetype.
    pub fn create_entity(&mut self) -> EntityID {
        self.create_entity_in(ROOT_ARCHETYPE)
    }

    /// Reserves an entity id and queues its spawn into `archetype`.
    pub fn create_entity_in(&mut self, archetype: ArchetypeID) -> EntityID {
        let entity = *self.next_entity_id;
        *self.next_entity_id += 1;
        self.defer(Command::Spawn { entity, archetype });
        entity
    }

    /// Queues the removal of `entity`.
    pub fn delete_entity(&mut self, entity: EntityID) {
        self.defer(Command::Despawn { entity });
    }

    /// Queues adding `component` to `entity`.
    pub fn add_component(&mut self, entity: EntityID, component: ComponentID) {
        self.defer(Command::Add { entity, component });
    }

    /// Queues removing `component` from `entity`.
    pub fn remove_component(&mut self, entity: EntityID, component: ComponentID) {
        self.defer(Command::Remove { entity, component });
    }

    /// Number of commands queued and not yet applied.
    pub fn pending(&self) -> usize {
        self.deferred.len()
    }
}
