//! Metadata model of .NET types as seen by the dispatch analysis.
//!
//! Only the parts of ECMA-335 metadata that decide virtual dispatch are modelled: type
//! definitions with their base type and interface list, method definitions with their
//! attribute flags and signatures, and `MethodImpl` override records.
//!
//! # Key Components
//!
//! - [`token`] - Metadata table row references used throughout .NET
//! - [`signatures`] - Method and type signatures, compared for implicit overriding
//! - [`method`] - Method definitions and their `MethodAttributes` flag groups
//! - [`typesystem`] - Type definitions, the [`typesystem::TypeModel`] contract and the
//!   [`typesystem::TypeRegistry`] implementation
//!
//! # Examples
//!
//! ```rust
//! use dotvtable::metadata::typesystem::{MethodBuilder, TypeBuilder, TypeModel, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! let stream = TypeBuilder::class("Stream")
//!     .namespace("System.IO")
//!     .abstract_()
//!     .method(MethodBuilder::new("Flush").virtual_().new_slot().abstract_())
//!     .build(&registry)?;
//!
//! assert!(registry.method_is_abstract(stream.methods[0]));
//! assert_eq!(registry.get_by_fullname("System.IO.Stream").unwrap().token, stream.token);
//! # Ok::<(), dotvtable::Error>(())
//! ```

pub mod method;
pub mod signatures;
/// Commonly used metadata token type
pub mod token;
pub mod typesystem;
