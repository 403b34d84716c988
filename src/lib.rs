// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # dotvtable
//!
//! Virtual dispatch table recovery for .NET (CLR) type hierarchies.
//!
//! Tools that rename, inline or strip methods of compiled .NET assemblies (obfuscators,
//! devirtualizers, dead code eliminators) must know which method body actually runs for
//! every callable method of a type. `dotvtable` reconstructs that from the object model's
//! rules: implicit overriding by name and signature, `newslot` and `final` semantics,
//! explicit `MethodImpl` overrides, and interface mapping through interface inheritance.
//!
//! ## Features
//!
//! - **Exact slot partition** - every method visible on a type belongs to exactly one slot
//! - **O(1) dispatch queries** - from any class or interface method to the method that runs
//! - **Renaming groups** - all methods that must change together
//! - **Default interface methods** - interface bodies dispatch when no class implements them
//! - **Parallel bulk building** - concurrent per-type cache backed by `rayon` and `dashmap`
//!
//! ## Quick Start
//!
//! ```rust
//! use dotvtable::prelude::*;
//!
//! let registry = TypeRegistry::new();
//! let animal = TypeBuilder::class("Animal")
//!     .method(MethodBuilder::new("Speak").virtual_().new_slot())
//!     .build(&registry)?;
//! let dog = TypeBuilder::class("Dog")
//!     .extends(animal.token)
//!     .method(MethodBuilder::new("Speak").virtual_())
//!     .build(&registry)?;
//!
//! let vtable = VTableResolver::build(&registry, dog.token)?;
//! assert_eq!(vtable.dispatch_target(animal.methods[0])?, dog.methods[0]);
//! # Ok::<(), dotvtable::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`metadata`] - Tokens, signatures, methods and the type model the analysis reads
//! - [`analysis`] - The dispatch table resolver, its configuration and cache
//! - [`Error`] and [`Result`] - Error handling
//!
//! The resolver only depends on the [`metadata::typesystem::TypeModel`] trait. Hosts that
//! already hold a loaded assembly implement it over their own object graph; the bundled
//! [`TypeRegistry`] is a ready-made, thread-safe implementation.
//!
//! ## Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger. Skipped override
//! records are reported at `debug`, pass summaries at `trace`.

#[macro_use]
pub(crate) mod error;

#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

/// Analyses over the type system, most notably virtual dispatch table recovery.
///
/// See [`analysis::VTableResolver`] for building the table of a single type and
/// [`analysis::VTableCache`] for sharing and bulk building tables.
pub mod analysis;

/// Tokens, signatures, methods and the type model.
///
/// See [`metadata::typesystem::TypeModel`] for the contract the analysis reads, and
/// [`metadata::typesystem::TypeRegistry`] for the in-memory implementation.
pub mod metadata;

/// `dotvtable` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `dotvtable` Error type
///
/// The main error type for all operations in this crate.
///
/// # Examples
///
/// ```rust
/// use dotvtable::{Error, TypeRegistry, VTableResolver};
/// use dotvtable::metadata::token::Token;
///
/// let registry = TypeRegistry::new();
/// match VTableResolver::build(&registry, Token::new(0x02000001)) {
///     Ok(vtable) => println!("{} slots", vtable.slot_count()),
///     Err(Error::TypeNotFound(token)) => println!("Unknown type {}", token),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

pub use analysis::{ResolverConfig, VTableCache, VTableResolver};
pub use metadata::typesystem::{TypeModel, TypeRegistry};
