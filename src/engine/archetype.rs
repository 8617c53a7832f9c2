//! # Archetypes and the archetype graph
//!
//! An [`Archetype`] groups every entity that holds one exact component
//! signature. Archetypes are nodes of an [`ArchetypeGraph`]: an edge at
//! component id `c` connects two archetypes whose masks differ by exactly
//! bit `c`.
//!
//! ## Design
//! - Archetypes live in a dense arena (`Vec<Archetype>`) and refer to each
//!   other by [`ArchetypeID`], so the graph can contain cycles without
//!   owning references between nodes.
//! - Adjacency is a sparse vector indexed by component id.
//! - The root archetype (empty mask) always has id [`ROOT_ARCHETYPE`].
//! - Archetypes are created lazily the first time a toggle produces an
//!   unseen signature and are never destroyed, even once empty.
//!
//! ## Invariants
//! - Adjacency is symmetric: if `a.adjacent(c) == Some(b)` then
//!   `b.adjacent(c) == Some(a)`.
//! - At most one archetype exists per signature. [`ArchetypeGraph::toggle_component`]
//!   searches the graph before creating a node, so reaching a signature
//!   through a different order of toggles lands on the same archetype.
//! - Every node of the arena is reachable from the root.

use std::collections::HashMap;

use crate::engine::bitset::BitSet;
use crate::engine::types::{
    ArchetypeID,
    ComponentID,
    EntityID,
    ROOT_ARCHETYPE,
    DEFAULT_MASK_WORDS,
};


/// Builds a signature mask from a list of component ids.
pub fn make_mask(component_ids: &[ComponentID]) -> BitSet {
    component_ids.iter().map(|&c| c as usize).collect()
}

/// Set of entities sharing one exact component signature.
///
/// ## Purpose
/// Holds the signature mask, the member entities and the edges to the
/// archetypes reached by toggling a single component.
///
/// ## Notes
/// `add_entity` and `delete_entity` only touch the local entity set. Keeping
/// them consistent with the world's entity index is the caller's job.
#[derive(Debug)]
pub struct Archetype {
    id: ArchetypeID,
    mask: BitSet,
    entities: Vec<EntityID>,
    rows: HashMap<EntityID, usize>,
    adjacent: Vec<Option<ArchetypeID>>,
}

impl Archetype {

    /// Creates an empty archetype with the given mask.
    pub fn new(id: ArchetypeID, mask: BitSet) -> Self {
        Self {
            id,
            mask,
            entities: Vec::new(),
            rows: HashMap::new(),
            adjacent: Vec::new(),
        }
    }

    /// Arena id of this archetype.
    #[inline]
    pub fn id(&self) -> ArchetypeID {
        self.id
    }

    /// Signature mask. Immutable for the lifetime of the archetype.
    #[inline]
    pub fn mask(&self) -> &BitSet {
        &self.mask
    }

    /// Component ids of the signature, ascending.
    pub fn component_ids(&self) -> Vec<ComponentID> {
        self.mask.values().into_iter().map(|i| i as ComponentID).collect()
    }

    /// Entities currently holding this signature.
    ///
    /// Order is not stable across deletions.
    #[inline]
    pub fn entities(&self) -> &[EntityID] {
        &self.entities
    }

    /// Number of member entities.
    #[inline]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns `true` if no entity holds this signature.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Returns `true` if `entity` is a member.
    #[inline]
    pub fn contains_entity(&self, entity: EntityID) -> bool {
        self.rows.contains_key(&entity)
    }

    /// Inserts `entity`. Returns `false` if it was already a member.
    pub fn add_entity(&mut self, entity: EntityID) -> bool {
        if self.rows.contains_key(&entity) {
            return false;
        }
        self.rows.insert(entity, self.entities.len());
        self.entities.push(entity);
        true
    }

    /// Removes `entity` using swap-remove. Returns `false` if it was absent.
    pub fn delete_entity(&mut self, entity: EntityID) -> bool {
        let Some(row) = self.rows.remove(&entity) else { return false; };
        self.entities.swap_remove(row);
        if let Some(&moved) = self.entities.get(row) {
            self.rows.insert(moved, row);
        }
        true
    }

    /// Archetype reached by toggling `component`, if that edge exists.
    #[inline]
    pub fn adjacent(&self, component: ComponentID) -> Option<ArchetypeID> {
        self.adjacent.get(component as usize).copied().flatten()
    }

    /// Iterates over `(component, neighbour)` edges in ascending component order.
    pub fn edges(&self) -> impl Iterator<Item = (ComponentID, ArchetypeID)> + '_ {
        self.adjacent
            .iter()
            .enumerate()
            .filter_map(|(c, adj)| adj.map(|a| (c as ComponentID, a)))
    }

    fn link(&mut self, component: ComponentID, to: ArchetypeID) {
        let index = component as usize;
        if index >= self.adjacent.len() {
            self.adjacent.resize(index + 1, None);
        }
        self.adjacent[index] = Some(to);
    }

    /// Returns `true` if the signature holds `component`.
    #[inline]
    pub fn has_component(&self, component: ComponentID) -> bool {
        self.mask.has(component as usize)
    }

    /// Returns `true` if the signature holds every component of `components`.
    pub fn has_every_component(&self, components: &[ComponentID]) -> bool {
        self.mask.contains(&make_mask(components))
    }

    /// Returns `true` if the signature holds at least one of `components`.
    pub fn has_some_components(&self, components: &[ComponentID]) -> bool {
        self.mask.intersects(&make_mask(components))
    }

    /// Returns `true` if the signature is disjoint from `components`.
    pub fn has_none_components(&self, components: &[ComponentID]) -> bool {
        !self.mask.intersects(&make_mask(components))
    }

    /// Returns `true` if the signature lacks at least one of `components`.
    pub fn has_not_components(&self, components: &[ComponentID]) -> bool {
        !self.mask.contains(&make_mask(components))
    }
}

/// Arena of archetypes connected by single-component edges.
///
/// ## Invariants
/// - `archetypes[i].id() == i`.
/// - The root archetype is at [`ROOT_ARCHETYPE`] and has an empty mask.
#[derive(Debug)]
pub struct ArchetypeGraph {
    archetypes: Vec<Archetype>,
}

impl Default for ArchetypeGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchetypeGraph {

    /// Creates a graph holding only the root archetype.
    pub fn new() -> Self {
        Self::with_mask_words(DEFAULT_MASK_WORDS)
    }

    /// Creates a graph whose root mask pre-allocates `words` words.
    pub fn with_mask_words(words: usize) -> Self {
        Self {
            archetypes: vec![Archetype::new(ROOT_ARCHETYPE, BitSet::with_capacity(words))],
        }
    }

    /// The root archetype (empty signature).
    #[inline]
    pub fn root(&self) -> &Archetype {
        &self.archetypes[ROOT_ARCHETYPE as usize]
    }

    /// Looks up an archetype by id.
    #[inline]
    pub fn get(&self, id: ArchetypeID) -> Option<&Archetype> {
        self.archetypes.get(id as usize)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: ArchetypeID) -> Option<&mut Archetype> {
        self.archetypes.get_mut(id as usize)
    }

    /// Number of archetypes, the root included.
    #[inline]
    pub fn len(&self) -> usize {
        self.archetypes.len()
    }

    /// All archetypes in ascending id order.
    #[inline]
    pub fn archetypes(&self) -> &[Archetype] {
        &self.archetypes
    }

    /// Depth-first traversal from `start`.
    ///
    /// Visits every archetype reachable from `start` that is not yet in
    /// `seen`, marking it. Returns the first archetype for which `visitor`
    /// returns `true`, stopping the traversal there. Neighbours are visited
    /// in ascending component order.
    pub fn walk_graph(
        &self,
        start: ArchetypeID,
        mut visitor: impl FnMut(&Archetype) -> bool,
        seen: &mut BitSet,
    ) -> Option<ArchetypeID> {
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            if seen.has(id as usize) {
                continue;
            }
            let Some(node) = self.get(id) else { continue; };
            seen.or(id as usize);

            if visitor(node) {
                return Some(id);
            }

            let before = stack.len();
            stack.extend(node.edges().map(|(_, adj)| adj).filter(|&adj| !seen.has(adj as usize)));
            stack[before..].reverse();
        }
        None
    }

    /// [`walk_graph`](Self::walk_graph) with a fresh `seen` set.
    pub fn walk(
        &self,
        start: ArchetypeID,
        visitor: impl FnMut(&Archetype) -> bool,
    ) -> Option<ArchetypeID> {
        let mut seen = BitSet::with_capacity(self.archetypes.len().div_ceil(32));
        self.walk_graph(start, visitor, &mut seen)
    }

    /// Finds the archetype holding exactly `mask`, searching from the root.
    pub fn find(&self, mask: &BitSet) -> Option<ArchetypeID> {
        self.walk(ROOT_ARCHETYPE, |node| node.mask() == mask)
    }

    /// Returns the archetype reached from `from` by toggling `component`.
    ///
    /// ## Behavior
    /// 1. An existing edge at `component` is followed directly.
    /// 2. Otherwise the target mask (`from.mask XOR component`) is searched
    ///    for in the whole connected graph, so archetypes reached through a
    ///    different path are reused.
    /// 3. If none exists, a new archetype is pushed to the arena.
    /// 4. The edge is linked in both directions.
    /// 5. `on_create` is invoked with the new archetype, if one was created.
    ///
    /// Returns `None` if `from` is not an archetype of this graph.
    ///
    /// Masks and adjacency grow to `component + 1` bits and slots, so callers
    /// pass only component ids they allocated.
    pub fn toggle_component(
        &mut self,
        from: ArchetypeID,
        component: ComponentID,
        on_create: impl FnOnce(&Archetype),
    ) -> Option<ArchetypeID> {
        let source = self.get(from)?;
        if let Some(next) = source.adjacent(component) {
            return Some(next);
        }

        let mut target = source.mask().copy();
        target.xor(component as usize);

        let existing = self.walk(from, |node| node.mask() == &target);
        let (next, created) = match existing {
            Some(id) => (id, false),
            None => {
                let id = self.archetypes.len() as ArchetypeID;
                self.archetypes.push(Archetype::new(id, target));
                (id, true)
            }
        };

        self.archetypes[next as usize].link(component, from);
        self.archetypes[from as usize].link(component, next);

        let next_archetype = &self.archetypes[next as usize];
        if created {
            tracing::debug!(
                archetype = next,
                components = ?next_archetype.component_ids(),
                "created archetype"
            );
            on_create(next_archetype);
        }

        Some(next)
    }
}
