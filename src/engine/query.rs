//! Archetype queries.
//!
//! A [`Query`] is an immutable predicate over an [`Archetype`], used to
//! decide which archetypes a system tracks. Queries are built with a
//! [`QueryBuilder`]:
//!
//! ```ignore
//! let q = query(|b| b.every(&[position, velocity]).none(&[frozen]));
//! let q = query(|b| b.every(&[a]).or(|b| b.every(&[c])));
//! ```
//!
//! ## Semantics
//! * `every(cs)`: the archetype holds all of `cs`.
//! * `some(cs)`: the archetype holds at least one of `cs`.
//! * `none(cs)`: the archetype holds none of `cs`.
//! * `not(cs)`: the archetype lacks at least one of `cs`.
//! * `custom(f)`: arbitrary predicate.
//! * `or(f)`: (everything built so far, AND-combined) OR (the clauses of
//!   the sub-builder, AND-combined).
//!
//! Clauses are AND-combined. A query with no clauses matches everything.
//! Clauses with no component ids are ignored, as is an `or` whose
//! sub-builder adds nothing.
//!
//! ## Representation
//! Clauses compile to a [`Matcher`] tree. Masks are built once, when the
//! clause is added.

use std::fmt;
use std::sync::Arc;

use crate::engine::archetype::{Archetype, make_mask};
use crate::engine::bitset::BitSet;
use crate::engine::types::ComponentID;


/// Predicate type of [`Matcher::Custom`].
pub type CustomMatcher = Arc<dyn Fn(&Archetype) -> bool + Send + Sync>;

/// Node of a compiled query.
#[derive(Clone)]
pub enum Matcher {
    /// Always matches.
    Always,
    /// Mask is a superset of the given mask.
    Every(BitSet),
    /// Mask intersects the given mask.
    Some(BitSet),
    /// Mask is disjoint from the given mask.
    None(BitSet),
    /// Mask is not a superset of the given mask.
    Not(BitSet),
    /// All children match.
    And(Vec<Matcher>),
    /// At least one child matches.
    Or(Vec<Matcher>),
    /// User predicate.
    Custom(CustomMatcher),
}

impl Matcher {
    /// Evaluates this matcher against `archetype`.
    pub fn matches(&self, archetype: &Archetype) -> bool {
        let mask = archetype.mask();
        match self {
            Matcher::Always => true,
            Matcher::Every(need) => mask.contains(need),
            Matcher::Some(any) => mask.intersects(any),
            Matcher::None(excluded) => !mask.intersects(excluded),
            Matcher::Not(need) => !mask.contains(need),
            Matcher::And(children) => children.iter().all(|m| m.matches(archetype)),
            Matcher::Or(children) => children.iter().any(|m| m.matches(archetype)),
            Matcher::Custom(f) => f(archetype),
        }
    }

    fn and_of(mut matchers: Vec<Matcher>) -> Matcher {
        match matchers.len() {
            0 => Matcher::Always,
            1 => matchers.remove(0),
            _ => Matcher::And(matchers),
        }
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Matcher::Always => f.write_str("Always"),
            Matcher::Every(m) => f.debug_tuple("Every").field(m).finish(),
            Matcher::Some(m) => f.debug_tuple("Some").field(m).finish(),
            Matcher::None(m) => f.debug_tuple("None").field(m).finish(),
            Matcher::Not(m) => f.debug_tuple("Not").field(m).finish(),
            Matcher::And(c) => f.debug_tuple("And").field(c).finish(),
            Matcher::Or(c) => f.debug_tuple("Or").field(c).finish(),
            Matcher::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Immutable, compiled archetype predicate.
///
/// Cloning is cheap; custom predicates are shared.
#[derive(Clone, Debug)]
pub struct Query {
    matcher: Matcher,
}

impl Query {
    /// Starts a new builder.
    pub fn builder() -> QueryBuilder {
        QueryBuilder::new()
    }

    /// A query matching every archetype.
    pub fn all() -> Self {
        Self { matcher: Matcher::Always }
    }

    /// Returns `true` if `archetype` satisfies this query.
    #[inline]
    pub fn matches(&self, archetype: &Archetype) -> bool {
        self.matcher.matches(archetype)
    }

    /// Root of the compiled matcher tree.
    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }
}

/// Incremental query construction.
///
/// Every method consumes and returns the builder so clauses chain.
#[derive(Clone, Debug, Default)]
pub struct QueryBuilder {
    matchers: Vec<Matcher>,
}

impl QueryBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self { matchers: Vec::new() }
    }

    fn push_mask(mut self, components: &[ComponentID], wrap: fn(BitSet) -> Matcher) -> Self {
        if components.is_empty() {
            return self;
        }
        self.matchers.push(wrap(make_mask(components)));
        self
    }

    /// Requires every component of `components`.
    pub fn every(self, components: &[ComponentID]) -> Self {
        self.push_mask(components, Matcher::Every)
    }

    /// Requires at least one component of `components`.
    pub fn some(self, components: &[ComponentID]) -> Self {
        self.push_mask(components, Matcher::Some)
    }

    /// Requires that at least one component of `components` is absent.
    pub fn not(self, components: &[ComponentID]) -> Self {
        self.push_mask(components, Matcher::Not)
    }

    /// Requires that no component of `components` is present.
    pub fn none(self, components: &[ComponentID]) -> Self {
        self.push_mask(components, Matcher::None)
    }

    /// Adds an arbitrary predicate.
    pub fn custom<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&Archetype) -> bool + Send + Sync + 'static,
    {
        self.matchers.push(Matcher::Custom(Arc::new(matcher)));
        self
    }

    /// Replaces the clauses built so far by `(so far) OR (sub-builder)`.
    pub fn or<F>(mut self, build: F) -> Self
    where
        F: FnOnce(QueryBuilder) -> QueryBuilder,
    {
        let right = build(QueryBuilder::new()).matchers;
        if right.is_empty() {
            return self;
        }
        let left = Matcher::and_of(std::mem::take(&mut self.matchers));
        self.matchers.push(Matcher::Or(vec![left, Matcher::and_of(right)]));
        self
    }

    /// Clauses accumulated so far.
    pub fn matchers(&self) -> &[Matcher] {
        &self.matchers
    }

    /// AND-combines the clauses and freezes them into a [`Query`].
    pub fn to_query(self) -> Query {
        Query { matcher: Matcher::and_of(self.matchers) }
    }
}

/// Builds a query with a closure over a fresh builder.
pub fn query<F>(build: F) -> Query
where
    F: FnOnce(QueryBuilder) -> QueryBuilder,
{
    build(QueryBuilder::new()).to_query()
}
