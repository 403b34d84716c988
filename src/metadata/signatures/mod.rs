//! Method and type signatures for .NET metadata.
//!
//! Signatures carry the information needed to decide whether two methods share a
//! dispatch identity by name and signature: calling convention, generic arity, return
//! type and parameter list (ECMA-335 II.23.2.1). Blob decoding is left to the metadata
//! loader that produces the type model; this module only holds the decoded form.
//!
//! # Examples
//!
//! ```rust
//! use dotvtable::metadata::signatures::{SignatureMethod, TypeSignature};
//!
//! let a = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::I4]);
//! let b = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::I4]);
//! let c = SignatureMethod::instance(TypeSignature::Void, vec![TypeSignature::String]);
//!
//! assert!(a.matches(&b));
//! assert!(!a.matches(&c));
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

mod types;

pub use types::*;
