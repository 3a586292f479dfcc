//! Entity trait: a record with a store-assigned identity.

/// Something persisted under a stable id. Two values with equal ids are the
/// same record whatever their other fields hold.
pub trait Entity {
    /// Typed identifier; ordered so tables can key on it.
    type Id: Copy + Ord + core::fmt::Display + core::fmt::Debug;

    fn id(&self) -> Self::Id;
}
