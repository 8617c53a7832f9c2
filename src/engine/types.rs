//! Core ECS Identifiers and Bit-Level Constants
//!
//! This module defines the **small, copyable identifiers** shared by every
//! other part of the engine: entities, components, archetypes and systems.
//!
//! ## Design Philosophy
//!
//! - Identifiers are plain integers with no intrinsic data.
//! - Component ids double as bit indices into signature masks.
//! - Archetypes are addressed by their index in the graph arena, so the
//!   adjacency graph never needs owning references between nodes.
//!
//! ## Signatures
//!
//! Component signatures are stored as sequences of [`Word`] values of
//! [`WORD_BITS`] bits each. See [`BitSet`](crate::engine::bitset::BitSet).

/// Globally unique entity identifier, allocated sequentially by a world.
pub type EntityID = u64;

/// Identifier for a component kind, allocated sequentially by a world.
///
/// The value is used directly as a bit index into archetype masks.
pub type ComponentID = u32;

/// Index of an archetype inside the archetype graph arena.
pub type ArchetypeID = u32;

/// Index of a registered system, in registration order.
pub type SystemID = u32;

/// Storage word of a signature mask.
pub type Word = u32;

/// Number of bits held by a single [`Word`].
pub const WORD_BITS: usize = Word::BITS as usize;

/// Id of the root archetype (empty signature) in every graph.
pub const ROOT_ARCHETYPE: ArchetypeID = 0;

/// Number of mask words pre-allocated for the root archetype by default.
///
/// Masks grow on demand, so this only avoids early reallocation.
pub const DEFAULT_MASK_WORDS: usize = 8;

/// Returns the number of words needed to address bit `index`.
#[inline]
pub const fn words_for_bit(index: usize) -> usize {
    index / WORD_BITS + 1
}
