//! Slot entries and slots, the nodes of a dispatch table.
//!
//! Both live in arenas owned by the [`VTableResolver`](super::VTableResolver) and refer to
//! each other through [`EntryId`] and [`SlotId`] indices. Moving an entry from one slot to
//! another is a re-tag of its `slot` index, never a pointer update.

use std::fmt;

use crate::metadata::token::Token;

/// Index of a [`SlotEntry`] within its dispatch table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(pub(crate) usize);

impl EntryId {
    /// Returns the raw index value of this entry identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

/// Index of a [`Slot`] within its dispatch table
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    /// Returns the raw index value of this slot identifier.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SlotId({})", self.0)
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// One method occurrence at one hierarchy depth.
///
/// `base_method` and `super_method` link the entry into its hiding chain: `base_method` points
/// one level towards the root (less derived), `super_method` one level towards the queried
/// type (more derived). The chain is acyclic and strictly monotonic in depth.
#[derive(Debug, Clone)]
pub struct SlotEntry {
    pub(crate) method: Token,
    pub(crate) depth: usize,
    pub(crate) slot: SlotId,
    pub(crate) base_method: Option<EntryId>,
    pub(crate) super_method: Option<EntryId>,
    pub(crate) interface_methods: Vec<Token>,
}

impl SlotEntry {
    pub(crate) fn new(method: Token, depth: usize, slot: SlotId) -> Self {
        SlotEntry {
            method,
            depth,
            slot,
            base_method: None,
            super_method: None,
            interface_methods: Vec::new(),
        }
    }

    /// The method this entry stands for
    #[must_use]
    pub fn method(&self) -> Token {
        self.method
    }

    /// Distance of the declaring type from the queried type (0 = the type itself)
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The slot this entry currently belongs to
    #[must_use]
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// Next entry towards the root of the hiding chain
    #[must_use]
    pub fn base_method(&self) -> Option<EntryId> {
        self.base_method
    }

    /// Next entry towards the queried type in the hiding chain
    #[must_use]
    pub fn super_method(&self) -> Option<EntryId> {
        self.super_method
    }

    /// Interface methods resolved to this entry, in mapping order
    #[must_use]
    pub fn interface_methods(&self) -> &[Token] {
        &self.interface_methods
    }

    /// Returns true if no more derived entry shadows this one
    #[must_use]
    pub fn is_top(&self) -> bool {
        self.super_method.is_none()
    }

    /// Returns true if this entry does not shadow a less derived one
    #[must_use]
    pub fn is_bottom(&self) -> bool {
        self.base_method.is_none()
    }
}

/// A group of entries sharing one dispatch identity.
///
/// `main_method` is chosen when the slot is created and never replaced: absorbing another
/// slot keeps the absorber's main method.
#[derive(Debug, Clone)]
pub struct Slot {
    pub(crate) entries: Vec<EntryId>,
    pub(crate) main_method: EntryId,
}

impl Slot {
    pub(crate) fn new(main_method: EntryId) -> Self {
        Slot {
            entries: Vec::new(),
            main_method,
        }
    }

    /// The entry whose method actually runs for every member of this slot
    #[must_use]
    pub fn main_method(&self) -> EntryId {
        self.main_method
    }

    /// All member entries, in the order they joined
    #[must_use]
    pub fn entries(&self) -> &[EntryId] {
        &self.entries
    }

    /// Number of member entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the slot has no members
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `entry` is a member of this slot
    #[must_use]
    pub fn contains(&self, entry: EntryId) -> bool {
        self.entries.contains(&entry)
    }
}
