//! Shared helpers for unit tests
//!
//! Invariant checks over finished dispatch tables and factories for the hierarchies the
//! analysis tests keep coming back to.


pub(crate) use factories::*;

use crate::{analysis::vtable::VTableResolver, metadata::token::Token};

/// Returns true if both methods are visible and share a slot
pub(crate) fn same_slot(vtable: &VTableResolver, first: Token, second: Token) -> bool {
    match (vtable.entry(first), vtable.entry(second)) {
        (Some(a), Some(b)) => a.slot() == b.slot(),
        _ => false,
    }
}

/// Checks the structural invariants every published table must hold
pub(crate) fn assert_partition(vtable: &VTableResolver) {
    let mut owners = vec![None; vtable.entries().len()];

    for (index, slot) in vtable.slots().enumerate() {
        assert!(!slot.is_empty(), "slot {index} is empty");
        assert!(
            slot.contains(slot.main_method()),
            "slot {index} does not contain its main method"
        );

        for id in slot.entries() {
            assert!(
                owners[id.index()].replace(index).is_none(),
                "entry {id} is listed by two slots"
            );
            assert_eq!(vtable.entries()[id.index()].slot().index(), index);
        }
    }
    assert!(owners.iter().all(Option::is_some), "orphaned entry");

    for entry in vtable.entries() {
        if let Some(base) = entry.base_method() {
            let base = &vtable.entries()[base.index()];
            assert!(base.depth() > entry.depth(), "hiding chain is not monotonic");
            let derived = base.super_method().map(|id| vtable.entries()[id.index()].method());
            assert_eq!(derived, Some(entry.method()));
        }

        assert!(std::ptr::eq(vtable.entry(entry.method()).unwrap(), entry));
        for iface in entry.interface_methods() {
            assert!(std::ptr::eq(vtable.entry(*iface).unwrap(), entry));
        }
    }
}
