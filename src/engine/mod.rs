//! # Engine Module
//!
//! Internal ECS engine implementation.
//!
//! This module contains all core ECS building blocks:
//! - Identifiers and constants
//! - Signature bitsets
//! - Archetypes and the archetype graph
//! - Queries
//! - Systems and their execution context
//! - Deferred commands
//! - The world
//!
//! Public API exposure is controlled by `lib.rs`.

pub mod types;
pub mod error;
pub mod bitset;
pub mod component;
pub mod archetype;
pub mod query;
pub mod commands;
pub mod systems;
pub mod world;
