//! Analyses built on top of the type system.
//!
//! # Architecture
//!
//! - [`vtable`] - Virtual dispatch table recovery (slots, override and interface mapping)
//!
//! # Usage
//!
//! ```rust
//! use dotvtable::analysis::{VTableCache, VTableResolver};
//! use dotvtable::metadata::typesystem::{MethodBuilder, TypeBuilder, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! let base = TypeBuilder::class("Base")
//!     .method(MethodBuilder::new("Update").virtual_().new_slot())
//!     .build(&registry)?;
//! let derived = TypeBuilder::class("Derived")
//!     .extends(base.token)
//!     .method(MethodBuilder::new("Update").virtual_())
//!     .build(&registry)?;
//!
//! let cache = VTableCache::new();
//! let failures = cache.build_all(&registry, &registry.class_tokens());
//! assert!(failures.is_empty());
//!
//! let vtable = cache.get(derived.token).unwrap();
//! assert!(vtable.is_dispatch_target(derived.methods[0]));
//! # let _: &VTableResolver = &vtable;
//! # Ok::<(), dotvtable::Error>(())
//! ```

pub mod vtable;

// Re-export primary types at module level
pub use vtable::{
    EntryId, OverrideSkip, ResolverConfig, Slot, SlotEntry, SlotId, VTableCache, VTableResolver,
    VTableStats,
};
