//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Used by the in-memory tables to key records without knowing their shape.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + Send + Sync;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}
