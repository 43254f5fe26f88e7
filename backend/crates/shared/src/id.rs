//! Typed Entity IDs
//!
//! UUID-backed identifiers with a phantom marker per entity, so IDs of
//! different entities are different types and cannot be swapped by accident.

use std::fmt;
use std::marker::PhantomData;
use uuid::Uuid;

/// UUID wrapper parameterized by an entity marker
///
/// ```
/// use kernel::id::{Id, markers};
///
/// let id: Id<markers::Subscriber> = Id::new();
/// assert_eq!(id, Id::from_uuid(id.into_uuid()));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id<T> {
    raw: Uuid,
    _entity: PhantomData<T>,
}

impl<T> Id<T> {
    /// Random v4 ID
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    /// Wrap a UUID that already exists (e.g. read back from storage)
    pub fn from_uuid(raw: Uuid) -> Self {
        Self {
            raw,
            _entity: PhantomData,
        }
    }

    /// Borrow the inner UUID (what store implementations bind)
    pub fn as_uuid(&self) -> &Uuid {
        &self.raw
    }

    /// Unwrap into the inner UUID
    pub fn into_uuid(self) -> Uuid {
        self.raw
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(raw: Uuid) -> Self {
        Self::from_uuid(raw)
    }
}

impl<T> From<Id<T>> for Uuid {
    fn from(id: Id<T>) -> Self {
        id.raw
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.raw)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.raw, f)
    }
}

/// Entity markers
pub mod markers {
    /// Newsletter subscriber
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Subscriber;
}

pub type SubscriberId = Id<markers::Subscriber>;
