//! Method definitions as seen by the dispatch resolver.
//!
//! A [`Method`] is one `MethodDef` row with its resolved owner, signature, split attribute
//! flags and the explicit override edges contributed by `MethodImpl` records.
//!
//! # Key Types
//! - [`Method`]: a single method declaration
//! - [`MethodRc`]: shared handle
//! - [`MethodAccessFlags`], [`MethodVtableFlags`], [`MethodModifiers`]: attribute groups

mod types;

use std::sync::Arc;

pub use types::*;

use crate::metadata::{signatures::SignatureMethod, token::Token};

/// Reference-counted pointer to a [`Method`]
pub type MethodRc = Arc<Method>;

/// A method declaration in the type model.
///
/// All fields except `overrides` are fixed when the method is created. `overrides` is
/// append-only, because `MethodImpl` records are applied after all methods exist (and may be
/// applied from several threads).
pub struct Method {
    /// Token
    pub token: Token,
    /// The type declaring this method
    pub owner: Token,
    /// Name of the method
    pub name: String,
    /// The method signature
    pub signature: SignatureMethod,
    /// Member access
    pub flags_access: MethodAccessFlags,
    /// Slot layout
    pub flags_vtable: MethodVtableFlags,
    /// Modifiers
    pub flags_modifiers: MethodModifiers,
    /// Methods this method explicitly overrides (`MethodImpl` declarations with this method as body)
    pub overrides: boxcar::Vec<Token>,
}

impl Method {
    /// Create a new method from raw `MethodAttributes`
    ///
    /// ## Arguments
    /// * 'token'     - The `MethodDef` token
    /// * 'owner'     - The declaring type
    /// * 'name'      - The method name
    /// * 'signature' - The decoded signature
    /// * 'flags'     - Raw `MethodAttributes` bitmask
    #[must_use]
    pub fn new(
        token: Token,
        owner: Token,
        name: String,
        signature: SignatureMethod,
        flags: u32,
    ) -> Self {
        Method {
            token,
            owner,
            name,
            signature,
            flags_access: MethodAccessFlags::from_method_flags(flags),
            flags_vtable: MethodVtableFlags::from_method_flags(flags),
            flags_modifiers: MethodModifiers::from_method_flags(flags),
            overrides: boxcar::Vec::new(),
        }
    }

    /// Method takes part in virtual dispatch
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::VIRTUAL)
    }

    /// Method has no body
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::ABSTRACT)
    }

    /// Method is defined on the type, not per instance
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::STATIC)
    }

    /// Method may not be overridden
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::FINAL)
    }

    /// Method always opens a new vtable slot
    #[must_use]
    pub fn is_new_slot(&self) -> bool {
        self.flags_vtable.contains(MethodVtableFlags::NEW_SLOT)
    }

    /// Method is only accessible by its declaring type
    #[must_use]
    pub fn is_private(&self) -> bool {
        self.flags_access.is_private()
    }

    /// Virtual, instance and not private: a declaration a derived method can implicitly override
    #[must_use]
    pub fn is_overridable(&self) -> bool {
        self.is_virtual() && !self.is_static() && !self.is_private()
    }

    /// Same name and matching signature
    #[must_use]
    pub fn same_name_and_sig(&self, other: &Method) -> bool {
        self.name == other.name && self.signature.matches(&other.signature)
    }

    /// Snapshot of the explicit override edges, in the order they were recorded
    #[must_use]
    pub fn overrides(&self) -> Vec<Token> {
        self.overrides.iter().map(|(_, token)| *token).collect()
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method")
            .field("token", &self.token)
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("overrides", &self.overrides())
            .finish()
    }
}
