//! # dotvtable Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotvtable library. Import this module to get quick access to the essential
//! types for building and querying dispatch tables.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotvtable operations
pub use crate::Error;

/// The result type used throughout dotvtable
pub use crate::Result;

/// Metadata token type for referencing types and methods
pub use crate::metadata::token::Token;

// ================================================================================================
// Type System
// ================================================================================================

/// Read-only hierarchy contract consumed by the resolver
pub use crate::metadata::typesystem::TypeModel;

/// Thread-safe in-memory type model
pub use crate::metadata::typesystem::TypeRegistry;

/// Type and method declarations
pub use crate::metadata::{method::Method, typesystem::CilType};

/// Fluent builders for registering types
pub use crate::metadata::typesystem::{MethodBuilder, TypeBuilder};

/// Signature types for method declarations
pub use crate::metadata::signatures::{SignatureMethod, TypeSignature};

// ================================================================================================
// Dispatch Tables
// ================================================================================================

/// Dispatch table of one type
pub use crate::analysis::VTableResolver;

/// Slots and their member entries
pub use crate::analysis::{EntryId, Slot, SlotEntry, SlotId};

/// Resolver configuration presets
pub use crate::analysis::ResolverConfig;

/// Concurrent dispatch table cache
pub use crate::analysis::VTableCache;
