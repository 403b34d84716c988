//! .NET type system as consumed by the dispatch resolver.
//!
//! The resolver never parses metadata itself. It reads a snapshot of the class/interface
//! graph through the [`TypeModel`] trait, keyed by [`Token`] handles. This module defines
//! that contract together with an in-memory implementation.
//!
//! # Key Components
//!
//! - [`TypeModel`]: read-only object-graph contract (base type, interfaces, methods,
//!   override edges, same-signature shadowing lookup)
//! - [`CilType`]: a type definition (class or interface) with its declared members
//! - [`TypeRegistry`]: concurrent, token-ordered storage implementing [`TypeModel`]
//! - [`TypeBuilder`] / [`MethodBuilder`]: fluent construction of types into a registry
//! - [`TypeAttributes`]: `TypeDef` flag constants
//!
//! # Examples
//!
//! ```rust
//! use dotvtable::metadata::typesystem::{MethodBuilder, TypeBuilder, TypeModel, TypeRegistry};
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
//! assert_eq!(registry.base_type(dog.token), Some(animal.token));
//! # Ok::<(), dotvtable::Error>(())
//! ```

mod builder;
mod registry;

pub use builder::{MethodBuilder, TypeBuilder};
pub use registry::TypeRegistry;

use std::sync::Arc;

use crate::metadata::token::Token;

/// Reference to a `CilType`
pub type CilTypeRc = Arc<CilType>;

#[allow(non_snake_case)]
/// `TypeDef` flag constants (ECMA-335 II.23.1.15) used by the type model
pub mod TypeAttributes {
    /// Mask for extracting type visibility information.
    pub const VISIBILITY_MASK: u32 = 0x0000_0007;
    /// Type has no public scope (internal to assembly).
    pub const NOT_PUBLIC: u32 = 0x0000_0000;
    /// Type has public scope (visible outside assembly).
    pub const PUBLIC: u32 = 0x0000_0001;
    /// Mask for extracting class semantics information.
    pub const CLASS_SEMANTICS_MASK: u32 = 0x0000_0020;
    /// Type is a class (reference or value type).
    pub const CLASS: u32 = 0x0000_0000;
    /// Type is an interface definition.
    pub const INTERFACE: u32 = 0x0000_0020;
    /// Class is abstract and cannot be instantiated directly.
    pub const ABSTRACT: u32 = 0x0000_0080;
    /// Class is sealed and cannot be inherited from.
    pub const SEALED: u32 = 0x0000_0100;
}

/// A type definition: a class, value type or interface with its directly declared members.
///
/// `base`, `interfaces` and `methods` are plain tokens; they are resolved against the owning
/// [`TypeModel`] on demand, so a `CilType` may reference types registered after it.
#[derive(Debug)]
pub struct CilType {
    /// Token
    pub token: Token,
    /// `TypeNamespace` (can be empty)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// Flags (a 4-byte bitmask of type `TypeAttributes`, §II.23.1.15)
    pub flags: u32,
    /// This types base aka 'extends'
    pub base: Option<Token>,
    /// All interfaces this type directly lists, in `InterfaceImpl` order
    pub interfaces: Vec<Token>,
    /// All methods declared directly on this type, in declaration order
    pub methods: Vec<Token>,
}

impl CilType {
    /// Returns the full name (Namespace.Name) of the entity
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{0}.{1}", self.namespace, self.name)
        }
    }

    /// Check if this type is an interface
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flags & TypeAttributes::CLASS_SEMANTICS_MASK == TypeAttributes::INTERFACE
    }

    /// Check if this type is abstract
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags & TypeAttributes::ABSTRACT != 0
    }

    /// Check if this type is sealed
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.flags & TypeAttributes::SEALED != 0
    }
}

/// Read-only view of a type hierarchy, as required by the dispatch resolver.
///
/// Every operation takes and returns [`Token`] handles. Implementations must keep the
/// graph unchanged for the duration of a resolver build, and tokens must be stable
/// identities; the resolver never mutates anything through this trait.
///
/// Types that are referenced but unknown to the model (e.g. an unresolved external base
/// class) terminate the walk: `base_type` returns `None` for them and they contribute no
/// methods.
pub trait TypeModel {
    /// Returns true if the model knows `ty`
    fn contains_type(&self, ty: Token) -> bool;

    /// The direct base type of `ty`, `None` at the hierarchy root
    fn base_type(&self, ty: Token) -> Option<Token>;

    /// Returns true if `ty` is an interface
    fn is_interface(&self, ty: Token) -> bool;

    /// Interfaces directly listed on `ty` (not transitively flattened)
    fn interfaces(&self, ty: Token) -> Vec<Token>;

    /// Methods declared directly on `ty`, in declaration order
    fn methods(&self, ty: Token) -> Vec<Token>;

    /// The type declaring `method`
    fn method_owner(&self, method: Token) -> Option<Token>;

    /// Explicit override edges of `method` (from `MethodImpl`), in record order
    fn method_overrides(&self, method: Token) -> Vec<Token>;

    /// Returns true if `method` has no body
    fn method_is_abstract(&self, method: Token) -> bool;

    /// Returns true if `method` is static
    fn method_is_static(&self, method: Token) -> bool;

    /// A method declared directly on `ty` that implicitly satisfies `candidate` by name and
    /// signature
    fn find_implicit_match(&self, ty: Token, candidate: Token) -> Option<Token>;

    /// The next less-derived method that `method` implicitly overrides by name and signature.
    ///
    /// `depth` is the hierarchy level of `method` on entry; on success it is advanced to the
    /// level of the returned method. Returns `None` when `method` opens a new slot or the base
    /// chain holds no overridable match.
    fn next_hidden_base(&self, method: Token, depth: &mut usize) -> Option<Token>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cil_type(flags: u32, namespace: &str) -> CilType {
        CilType {
            token: Token::new(0x02000001),
            namespace: namespace.to_string(),
            name: "Widget".to_string(),
            flags,
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    #[test]
    fn test_fullname() {
        assert_eq!(cil_type(0, "Demo.Ui").fullname(), "Demo.Ui.Widget");
        assert_eq!(cil_type(0, "").fullname(), "Widget");
    }

    #[test]
    fn test_type_attributes() {
        let iface = cil_type(TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT, "");
        assert!(iface.is_interface());
        assert!(iface.is_abstract());
        assert!(!iface.is_sealed());

        let sealed = cil_type(TypeAttributes::PUBLIC | TypeAttributes::SEALED, "");
        assert!(!sealed.is_interface());
        assert!(sealed.is_sealed());
    }
}
