//! Entity trait: identity + continuity across state changes.

/// Entity marker + minimal interface.
///
/// Records fetched from the backend (users, flights) are entities: two
/// snapshots with the same identifier describe the same thing, even when
/// their other fields differ between fetches.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;

    /// Whether `other` describes the same entity as `self`.
    fn same_identity(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}
