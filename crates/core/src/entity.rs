//! Records with identity.

/// A record whose identity survives state changes.
///
/// Inventory items and alerts are entities: two snapshots with the same id
/// are the same record, even if one carries a later quantity or read flag.
pub trait Entity {
    type Id: Copy + Eq + core::hash::Hash + core::fmt::Debug + core::fmt::Display;

    fn id(&self) -> &Self::Id;

    /// True when this record has identity `id`.
    fn is(&self, id: &Self::Id) -> bool {
        self.id() == id
    }
}
