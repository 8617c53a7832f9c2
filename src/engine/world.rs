//! # World: the ECS orchestration layer
//!
//! [`World`] owns every piece of ECS state:
//!
//! * the component id allocator,
//! * the entity id counter and the entity → archetype index,
//! * the archetype graph, and therefore its root,
//! * the registered systems,
//! * the deferred command queue.
//!
//! All mutation goes through the world so the entity index and the archetype
//! entity sets never disagree.
//!
//! ## Entity lifecycle
//!
//! ```text
//! unregistered ──create──▶ live ──defer(Despawn)──▶ pending-deletion ──apply──▶ removed
//!                            └───────────────delete_entity──────────────────────▶┘
//! ```
//!
//! ## Execution model
//!
//! Single-threaded and synchronous. [`World::update`] applies pending
//! commands, then runs every system in registration order, applying the
//! commands each system queued as soon as it returns. Later systems of the
//! same tick observe structural changes made by earlier ones.
//!
//! ## Invariants
//! * Every live entity is a member of exactly the archetype the index maps
//!   it to, and of no other archetype.
//! * Every system has been offered every archetype of the graph exactly once.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::engine::archetype::{Archetype, ArchetypeGraph};
use crate::engine::commands::Command;
use crate::engine::component::{ComponentDesc, ComponentRegistry};
use crate::engine::error::{ECSError, ECSResult};
use crate::engine::query::Query;
use crate::engine::systems::{ArchetypeSystem, EntitySystem, System, SystemContext};
use crate::engine::types::{
    ArchetypeID,
    ComponentID,
    EntityID,
    SystemID,
    DEFAULT_MASK_WORDS,
    ROOT_ARCHETYPE,
};


/// Construction-time settings of a [`World`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    /// Words pre-allocated for the root mask. Masks still grow on demand.
    pub initial_mask_words: usize,
    /// Entries pre-allocated in the entity index.
    pub entity_capacity: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            initial_mask_words: DEFAULT_MASK_WORDS,
            entity_capacity: 0,
        }
    }
}

/// Owner of the archetype graph, the entity index and the systems.
pub struct World {
    graph: ArchetypeGraph,
    entities: HashMap<EntityID, ArchetypeID>,
    components: ComponentRegistry,
    systems: Vec<Box<dyn System>>,
    deferred: Vec<Command>,
    next_entity_id: EntityID,
    config: WorldConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {

    /// Creates a world with default settings.
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Creates a world from `config`.
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            graph: ArchetypeGraph::with_mask_words(config.initial_mask_words),
            entities: HashMap::with_capacity(config.entity_capacity),
            components: ComponentRegistry::new(),
            systems: Vec::new(),
            deferred: Vec::new(),
            next_entity_id: 0,
            config,
        }
    }

    /// Settings this world was built with.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    // ── Components ──────────────────────────────────────────────────────

    /// Allocates a fresh component id.
    pub fn create_component(&mut self) -> ComponentID {
        self.components.create()
    }

    /// Returns the component id of `T`, allocating it on first use.
    pub fn register_component<T: 'static>(&mut self) -> ComponentID {
        self.components.register::<T>()
    }

    /// Component id registered for `T`, if any.
    pub fn component_id_of<T: 'static>(&self) -> Option<ComponentID> {
        self.components.id_of::<T>()
    }

    /// Descriptor of a component id.
    pub fn component_desc(&self, component: ComponentID) -> Option<&ComponentDesc> {
        self.components.desc(component)
    }

    // ── Graph access ────────────────────────────────────────────────────

    /// The archetype graph.
    #[inline]
    pub fn graph(&self) -> &ArchetypeGraph {
        &self.graph
    }

    /// Id of the root archetype.
    #[inline]
    pub fn root(&self) -> ArchetypeID {
        ROOT_ARCHETYPE
    }

    /// Looks up an archetype by id.
    #[inline]
    pub fn archetype(&self, id: ArchetypeID) -> Option<&Archetype> {
        self.graph.get(id)
    }

    /// Ids of every archetype matching `query`, ascending.
    pub fn matching_archetypes(&self, query: &Query) -> Vec<ArchetypeID> {
        self.graph
            .archetypes()
            .par_iter()
            .filter(|archetype| query.matches(archetype))
            .map(Archetype::id)
            .collect()
    }

    /// Entities of every archetype matching `query`.
    pub fn query_entities(&self, query: &Query) -> Vec<EntityID> {
        self.matching_archetypes(query)
            .into_iter()
            .filter_map(|id| self.graph.get(id))
            .flat_map(|archetype| archetype.entities().iter().copied())
            .collect()
    }

    // ── Entities ────────────────────────────────────────────────────────

    /// Creates an entity in the root archetype.
    pub fn create_entity(&mut self) -> EntityID {
        let entity = self.next_entity_id;
        self.next_entity_id += 1;
        self.insert_entity(entity, ROOT_ARCHETYPE);
        entity
    }

    /// Creates an entity directly in `archetype`.
    ///
    /// ## Errors
    /// [`ECSError::UnknownArchetype`] if the graph has no such archetype.
    pub fn create_entity_in(&mut self, archetype: ArchetypeID) -> ECSResult<EntityID> {
        if self.graph.get(archetype).is_none() {
            return Err(ECSError::UnknownArchetype(archetype));
        }
        let entity = self.next_entity_id;
        self.next_entity_id += 1;
        self.insert_entity(entity, archetype);
        Ok(entity)
    }

    /// Allocates an entity id without inserting it anywhere.
    ///
    /// Used to target a [`Command::Spawn`] queued with [`defer`](Self::defer).
    pub fn reserve_entity(&mut self) -> EntityID {
        let entity = self.next_entity_id;
        self.next_entity_id += 1;
        entity
    }

    /// Returns `false` if `entity` is already live or `archetype` is unknown.
    fn insert_entity(&mut self, entity: EntityID, archetype: ArchetypeID) -> bool {
        if self.entities.contains_key(&entity) {
            return false;
        }
        let Some(node) = self.graph.get_mut(archetype) else { return false; };
        node.add_entity(entity);
        self.entities.insert(entity, archetype);
        tracing::trace!(entity, archetype, "created entity");
        true
    }

    /// Removes `entity` from the world. No-op if it is unknown.
    pub fn delete_entity(&mut self, entity: EntityID) {
        let Some(archetype) = self.entities.remove(&entity) else { return; };
        if let Some(node) = self.graph.get_mut(archetype) {
            node.delete_entity(entity);
        }
        tracing::trace!(entity, archetype, "deleted entity");
    }

    /// Moves `entity` into `archetype`. No-op if the entity is unknown.
    ///
    /// ## Errors
    /// [`ECSError::UnknownArchetype`] if the graph has no such archetype.
    pub fn set_entity(&mut self, entity: EntityID, archetype: ArchetypeID) -> ECSResult<()> {
        if self.graph.get(archetype).is_none() {
            return Err(ECSError::UnknownArchetype(archetype));
        }
        let Some(&previous) = self.entities.get(&entity) else { return Ok(()); };
        self.move_entity(entity, previous, archetype);
        Ok(())
    }

    fn move_entity(&mut self, entity: EntityID, from: ArchetypeID, to: ArchetypeID) {
        if let Some(node) = self.graph.get_mut(from) {
            node.delete_entity(entity);
        }
        if let Some(node) = self.graph.get_mut(to) {
            node.add_entity(entity);
        }
        self.entities.insert(entity, to);
    }

    /// Returns `true` if `entity` is live.
    #[inline]
    pub fn contains_entity(&self, entity: EntityID) -> bool {
        self.entities.contains_key(&entity)
    }

    /// Number of live entities.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Archetype currently holding `entity`.
    #[inline]
    pub fn archetype_of(&self, entity: EntityID) -> Option<ArchetypeID> {
        self.entities.get(&entity).copied()
    }

    /// Components of `entity`, ascending.
    pub fn components_of(&self, entity: EntityID) -> Option<Vec<ComponentID>> {
        self.archetype_of(entity)
            .and_then(|id| self.graph.get(id))
            .map(Archetype::component_ids)
    }

    // ── Component membership ────────────────────────────────────────────

    /// Returns `true` if `entity` is live and holds `component`.
    pub fn has_component(&self, entity: EntityID, component: ComponentID) -> bool {
        self.archetype_of(entity)
            .and_then(|id| self.graph.get(id))
            .map_or(false, |archetype| archetype.has_component(component))
    }

    /// Adds `component` to `entity`.
    ///
    /// No-op if the entity is unknown, already holds the component, or the
    /// component id was never allocated by this world.
    pub fn add_component(&mut self, entity: EntityID, component: ComponentID) {
        if !self.is_allocated(component) {
            return;
        }
        let Some(&current) = self.entities.get(&entity) else { return; };
        if self.graph.get(current).map_or(true, |a| a.has_component(component)) {
            return;
        }
        self.toggle_component_for_entity(entity, current, component);
    }

    /// Removes `component` from `entity`.
    ///
    /// No-op if the entity is unknown or lacks the component.
    pub fn remove_component(&mut self, entity: EntityID, component: ComponentID) {
        if !self.is_allocated(component) {
            return;
        }
        let Some(&current) = self.entities.get(&entity) else { return; };
        if !self.graph.get(current).map_or(false, |a| a.has_component(component)) {
            return;
        }
        self.toggle_component_for_entity(entity, current, component);
    }

    #[inline]
    fn is_allocated(&self, component: ComponentID) -> bool {
        (component as usize) < self.components.len()
    }

    fn toggle_component_for_entity(
        &mut self,
        entity: EntityID,
        current: ArchetypeID,
        component: ComponentID,
    ) {
        let systems = &mut self.systems;
        let next = self.graph.toggle_component(current, component, |created| {
            for system in systems.iter_mut() {
                system.add(created);
            }
        });
        if let Some(next) = next {
            tracing::trace!(entity, component, from = current, to = next, "toggled component");
            self.move_entity(entity, current, next);
        }
    }

    // ── Systems ─────────────────────────────────────────────────────────

    /// Registers `system` and matches it against every existing archetype.
    pub fn add_system<S: System + 'static>(&mut self, system: S) -> SystemID {
        let id = self.systems.len() as SystemID;
        self.systems.push(Box::new(system));

        let graph = &self.graph;
        if let Some(system) = self.systems.last_mut() {
            graph.walk(ROOT_ARCHETYPE, |archetype| {
                system.add(archetype);
                false
            });
            tracing::debug!(
                system = system.name(),
                id,
                matched = system.archetypes().len(),
                "registered system"
            );
        }
        id
    }

    /// Looks up a registered system.
    pub fn system(&self, id: SystemID) -> ECSResult<&dyn System> {
        self.systems
            .get(id as usize)
            .map(|s| s.as_ref())
            .ok_or(ECSError::UnknownSystem(id))
    }

    /// Number of registered systems.
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // ── Deferred commands ───────────────────────────────────────────────

    /// Queues a structural change for the next synchronization point.
    pub fn defer(&mut self, command: Command) {
        self.deferred.push(command);
    }

    /// Number of queued commands.
    pub fn pending_commands(&self) -> usize {
        self.deferred.len()
    }

    /// Applies every queued command in FIFO order.
    ///
    /// Returns the number of commands applied. A spawn of an entity that is
    /// already live is skipped and not counted.
    ///
    /// ## Errors
    /// * [`ECSError::UnreservedEntity`] for a spawn of an id that neither
    ///   [`reserve_entity`](Self::reserve_entity) nor a system context handed out.
    /// * [`ECSError::UnknownArchetype`] for a spawn into an archetype the graph
    ///   does not own.
    ///
    /// Commands queued after the failing one stay queued.
    pub fn apply_deferred_commands(&mut self) -> ECSResult<usize> {
        let mut applied = 0;
        let mut queue = std::mem::take(&mut self.deferred).into_iter();
        while let Some(command) = queue.next() {
            tracing::trace!(?command, "applying command");
            match command {
                Command::Spawn { entity, archetype } => {
                    let error = if entity >= self.next_entity_id {
                        Some(ECSError::UnreservedEntity(entity))
                    } else if self.graph.get(archetype).is_none() {
                        Some(ECSError::UnknownArchetype(archetype))
                    } else {
                        None
                    };
                    if let Some(error) = error {
                        self.deferred = queue.collect();
                        return Err(error);
                    }
                    if !self.insert_entity(entity, archetype) {
                        tracing::trace!(entity, "skipped spawn of live entity");
                        continue;
                    }
                }
                Command::Despawn { entity } => self.delete_entity(entity),
                Command::Add { entity, component } => self.add_component(entity, component),
                Command::Remove { entity, component } => self.remove_component(entity, component),
            }
            applied += 1;
        }
        Ok(applied)
    }

    // ── Tick ────────────────────────────────────────────────────────────

    /// Runs every registered system once, in registration order.
    ///
    /// ## Errors
    /// * [`ECSError::UnknownSystemKind`] if a system is neither an
    ///   [`EntitySystem`] nor an [`ArchetypeSystem`]. Systems after it do not run.
    /// * Errors from [`apply_deferred_commands`](Self::apply_deferred_commands).
    pub fn update(&mut self) -> ECSResult<()> {
        let _span = tracing::trace_span!("world_update", systems = self.systems.len()).entered();

        self.apply_deferred_commands()?;
        for index in 0..self.systems.len() {
            self.run_system(index)?;
            self.apply_deferred_commands()?;
        }
        Ok(())
    }

    fn run_system(&mut self, index: usize) -> ECSResult<()> {
        let World { graph, entities, systems, deferred, next_entity_id, .. } = self;
        let Some(system) = systems.get_mut(index) else { return Ok(()); };

        let _span = tracing::trace_span!("system", name = system.name()).entered();
        let mut context = SystemContext::new(graph, entities, deferred, next_entity_id);

        let any = system.as_any_mut();
        if let Some(entity_system) = any.downcast_mut::<EntitySystem>() {
            entity_system.run(&mut context);
            return Ok(());
        }
        if let Some(archetype_system) = any.downcast_mut::<ArchetypeSystem>() {
            archetype_system.run(&mut context);
            return Ok(());
        }

        let name = system.name().to_owned();
        tracing::error!(system = %name, "tried to update unknown system type");
        Err(ECSError::UnknownSystemKind { system: name })
    }
}
