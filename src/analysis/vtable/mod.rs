//! Virtual dispatch table recovery.
//!
//! For a given type, this module determines which method body actually executes for every
//! callable method visible on it: methods declared on the type or inherited from any
//! ancestor, hidden or explicitly overridden ones, and the methods of every interface the
//! type implements, directly or through interface inheritance.
//!
//! # Architecture
//!
//! Methods are partitioned into [`Slot`]s. All members of a slot share one dispatch identity,
//! and the slot's main method is the one that runs. Each member is a [`SlotEntry`] recording
//! the method, its distance from the queried type and its neighbours in the hiding chain.
//! Slots and entries live in arenas owned by the [`VTableResolver`] and reference each other
//! through [`SlotId`] and [`EntryId`].
//!
//! The resolver reads the hierarchy through [`crate::metadata::typesystem::TypeModel`] and
//! never mutates it. A finished table is immutable; to reflect an edited hierarchy, build a
//! new one.
//!
//! # Components
//!
//! - [`VTableResolver`]: builds and queries the table of one type
//! - [`Slot`] / [`SlotEntry`]: the partition and its members
//! - [`ResolverConfig`]: hierarchy limits and default interface method handling
//! - [`VTableCache`]: concurrent per-type cache with parallel bulk building
//!
//! # Example
//!
//! ```rust
//! use dotvtable::analysis::VTableResolver;
//! use dotvtable::metadata::typesystem::{MethodBuilder, TypeBuilder, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! let iface = TypeBuilder::interface("IRunnable")
//!     .method(MethodBuilder::new("Run"))
//!     .build(&registry)?;
//! let worker = TypeBuilder::class("Worker")
//!     .implements(iface.token)
//!     .method(MethodBuilder::new("Run").virtual_().new_slot().final_())
//!     .build(&registry)?;
//!
//! let vtable = VTableResolver::build(&registry, worker.token)?;
//!
//! // calls through the interface land on the class method
//! assert_eq!(vtable.dispatch_target(iface.methods[0])?, worker.methods[0]);
//!
//! // renaming Worker.Run means renaming IRunnable.Run too
//! assert_eq!(vtable.group(worker.methods[0]).len(), 2);
//! # Ok::<(), dotvtable::Error>(())
//! ```

mod cache;
mod config;
mod resolver;
mod slot;

pub use cache::VTableCache;
pub use config::ResolverConfig;
pub use resolver::{OverrideSkip, VTableResolver, VTableStats};
pub use slot::{EntryId, Slot, SlotEntry, SlotId};
