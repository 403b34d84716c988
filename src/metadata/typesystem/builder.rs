//! Fluent builders for registering types and methods.
//!
//! [`TypeBuilder`] assembles one `TypeDef` (class or interface) with its methods, interface
//! list and explicit overrides, then registers everything in a [`TypeRegistry`] in one step.
//! Explicit overrides declared with [`MethodBuilder::overrides`] are applied as `MethodImpl`
//! records once the method tokens exist.
//!
//! # Example
//!
//! ```rust
//! use dotvtable::metadata::typesystem::{MethodBuilder, TypeBuilder, TypeRegistry};
//! use dotvtable::metadata::signatures::TypeSignature;
//!
//! let registry = TypeRegistry::new();
//! let disposable = TypeBuilder::interface("IDisposable")
//!     .namespace("System")
//!     .method(MethodBuilder::new("Dispose"))
//!     .build(&registry)?;
//! let dispose = disposable.methods[0];
//!
//! let handle = TypeBuilder::class("Handle")
//!     .implements(disposable.token)
//!     .method(
//!         MethodBuilder::new("System.IDisposable.Dispose")
//!             .private()
//!             .virtual_()
//!             .new_slot()
//!             .final_()
//!             .overrides(dispose),
//!     )
//!     .method(MethodBuilder::new("Read").returns(TypeSignature::I4))
//!     .build(&registry)?;
//!
//! assert_eq!(handle.methods.len(), 2);
//! # Ok::<(), dotvtable::Error>(())
//! ```

use crate::{
    metadata::{
        method::{Method, MethodAccessFlags, MethodModifiers, MethodVtableFlags, METHOD_ACCESS_MASK},
        signatures::{SignatureMethod, SignatureParameter, TypeSignature},
        token::Token,
        typesystem::{CilType, CilTypeRc, TypeAttributes, TypeRegistry},
    },
    Result,
};

/// Provides a fluent API for building a single method declaration
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    flags: u32,
    signature: SignatureMethod,
    overrides: Vec<Token>,
    has_body: bool,
}

impl MethodBuilder {
    /// Start a new public, hide-by-sig instance method returning `void` without parameters
    ///
    /// ## Arguments
    /// * 'name' - The method name
    #[must_use]
    pub fn new(name: &str) -> Self {
        MethodBuilder {
            name: name.to_string(),
            flags: MethodAccessFlags::PUBLIC.bits() | MethodModifiers::HIDE_BY_SIG.bits(),
            signature: SignatureMethod::instance(TypeSignature::Void, Vec::new()),
            overrides: Vec::new(),
            has_body: false,
        }
    }

    fn access(mut self, access: MethodAccessFlags) -> Self {
        self.flags = (self.flags & !METHOD_ACCESS_MASK) | access.bits();
        self
    }

    /// Make the method public
    #[must_use]
    pub fn public(self) -> Self {
        self.access(MethodAccessFlags::PUBLIC)
    }

    /// Make the method private
    #[must_use]
    pub fn private(self) -> Self {
        self.access(MethodAccessFlags::PRIVATE)
    }

    /// Make the method protected
    #[must_use]
    pub fn family(self) -> Self {
        self.access(MethodAccessFlags::FAMILY)
    }

    /// Mark the method `virtual`
    #[must_use]
    pub fn virtual_(mut self) -> Self {
        self.flags |= MethodModifiers::VIRTUAL.bits();
        self
    }

    /// Mark the method `newslot`
    #[must_use]
    pub fn new_slot(mut self) -> Self {
        self.flags |= MethodVtableFlags::NEW_SLOT.bits();
        self
    }

    /// Mark the method `abstract`
    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.flags |= MethodModifiers::ABSTRACT.bits();
        self
    }

    /// Mark the method `final`
    #[must_use]
    pub fn final_(mut self) -> Self {
        self.flags |= MethodModifiers::FINAL.bits();
        self
    }

    /// Mark the method `static`
    #[must_use]
    pub fn static_(mut self) -> Self {
        self.flags |= MethodModifiers::STATIC.bits();
        self.signature.has_this = false;
        self
    }

    /// Replace all flags with a raw `MethodAttributes` bitmask
    #[must_use]
    pub fn flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    /// Interface methods only: the method carries a default implementation
    #[must_use]
    pub fn with_body(mut self) -> Self {
        self.has_body = true;
        self
    }

    /// Set the return type
    #[must_use]
    pub fn returns(mut self, return_type: TypeSignature) -> Self {
        self.signature.return_type = return_type.into();
        self
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, param: TypeSignature) -> Self {
        self.signature.params.push(SignatureParameter::from(param));
        self
    }

    /// Replace the whole signature
    #[must_use]
    pub fn signature(mut self, signature: SignatureMethod) -> Self {
        self.signature = signature;
        self
    }

    /// Record an explicit override (`MethodImpl`) of `declaration`
    #[must_use]
    pub fn overrides(mut self, declaration: Token) -> Self {
        self.overrides.push(declaration);
        self
    }
}

/// Provides a fluent API for building a type definition into a [`TypeRegistry`]
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    namespace: String,
    name: String,
    flags: u32,
    base: Option<Token>,
    interfaces: Vec<Token>,
    methods: Vec<MethodBuilder>,
}

impl TypeBuilder {
    /// Start building a public class
    ///
    /// ## Arguments
    /// * 'name' - The type name
    #[must_use]
    pub fn class(name: &str) -> Self {
        TypeBuilder {
            namespace: String::new(),
            name: name.to_string(),
            flags: TypeAttributes::PUBLIC | TypeAttributes::CLASS,
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Start building a public interface
    ///
    /// Non-static methods added to an interface are `virtual newslot abstract` unless
    /// [`MethodBuilder::with_body`] was used.
    ///
    /// ## Arguments
    /// * 'name' - The type name
    #[must_use]
    pub fn interface(name: &str) -> Self {
        TypeBuilder {
            flags: TypeAttributes::PUBLIC | TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT,
            ..Self::class(name)
        }
    }

    /// Set the namespace
    #[must_use]
    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = namespace.to_string();
        self
    }

    /// Mark the class `abstract`
    #[must_use]
    pub fn abstract_(mut self) -> Self {
        self.flags |= TypeAttributes::ABSTRACT;
        self
    }

    /// Mark the class `sealed`
    #[must_use]
    pub fn sealed(mut self) -> Self {
        self.flags |= TypeAttributes::SEALED;
        self
    }

    /// Set the base type
    #[must_use]
    pub fn extends(mut self, base: Token) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an interface to the `InterfaceImpl` list
    #[must_use]
    pub fn implements(mut self, interface: Token) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Add a method
    #[must_use]
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Register the type, its methods and their explicit overrides
    ///
    /// ## Arguments
    /// * 'registry' - The registry receiving the type
    ///
    /// # Errors
    /// Returns a malformed error if an interface has a base type or two methods share name
    /// and signature, or any registry error from the insertion
    pub fn build(self, registry: &TypeRegistry) -> Result<CilTypeRc> {
        let is_interface =
            self.flags & TypeAttributes::CLASS_SEMANTICS_MASK == TypeAttributes::INTERFACE;
        if is_interface && self.base.is_some() {
            return Err(malformed_error!(
                "Interface {} can not have a base type",
                self.name
            ));
        }

        for (index, method) in self.methods.iter().enumerate() {
            let duplicate = self.methods[..index]
                .iter()
                .any(|prev| prev.name == method.name && prev.signature.matches(&method.signature));
            if duplicate {
                return Err(malformed_error!(
                    "Type {} declares {} twice with the same signature",
                    self.name,
                    method.name
                ));
            }
        }

        let token = registry.next_type_token();
        let mut method_tokens = Vec::with_capacity(self.methods.len());
        let mut method_impls = Vec::new();

        for builder in self.methods {
            let mut flags = builder.flags;
            if is_interface && flags & MethodModifiers::STATIC.bits() == 0 {
                flags |= MethodModifiers::VIRTUAL.bits() | MethodVtableFlags::NEW_SLOT.bits();
                if !builder.has_body {
                    flags |= MethodModifiers::ABSTRACT.bits();
                }
            }

            let method_token = registry.next_method_token();
            registry.insert_method(Method::new(
                method_token,
                token,
                builder.name,
                builder.signature,
                flags,
            ))?;

            method_impls.extend(
                builder
                    .overrides
                    .into_iter()
                    .map(|declaration| (method_token, declaration)),
            );
            method_tokens.push(method_token);
        }

        let type_rc = registry.insert(CilType {
            token,
            namespace: self.namespace,
            name: self.name,
            flags: self.flags,
            base: self.base,
            interfaces: self.interfaces,
            methods: method_tokens,
        })?;

        for (body, declaration) in method_impls {
            registry.add_method_impl(token, body, declaration)?;
        }

        Ok(type_rc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::typesystem::TypeModel, Error};

    #[test]
    fn test_interface_methods_are_abstract_virtual() {
        let registry = TypeRegistry::new();
        let iface = TypeBuilder::interface("IRun")
            .method(MethodBuilder::new("Run"))
            .method(MethodBuilder::new("Walk").with_body())
            .method(MethodBuilder::new("Create").static_())
            .build(&registry)
            .unwrap();

        assert!(registry.is_interface(iface.token));

        let run = registry.method(&iface.methods[0]).unwrap();
        assert!(run.is_virtual() && run.is_new_slot() && run.is_abstract());

        let walk = registry.method(&iface.methods[1]).unwrap();
        assert!(walk.is_virtual() && !walk.is_abstract());

        let create = registry.method(&iface.methods[2]).unwrap();
        assert!(create.is_static() && !create.is_virtual());
        assert!(!create.signature.has_this);
    }

    #[test]
    fn test_overrides_become_method_impls() {
        let registry = TypeRegistry::new();
        let base = TypeBuilder::class("A")
            .method(MethodBuilder::new("F").virtual_().new_slot())
            .build(&registry)
            .unwrap();
        let derived = TypeBuilder::class("D")
            .extends(base.token)
            .method(MethodBuilder::new("Foo").virtual_().overrides(base.methods[0]))
            .build(&registry)
            .unwrap();

        assert_eq!(
            registry.method_overrides(derived.methods[0]),
            vec![base.methods[0]]
        );
        assert_eq!(registry.method_impl_count(), 1);
        assert_eq!(registry.base_type(derived.token), Some(base.token));
    }

    #[test]
    fn test_duplicate_signature_rejected() {
        let registry = TypeRegistry::new();
        let result = TypeBuilder::class("Twice")
            .method(MethodBuilder::new("F"))
            .method(MethodBuilder::new("F").virtual_())
            .build(&registry);
        assert!(matches!(result, Err(Error::Malformed { .. })));
        assert!(registry.is_empty());

        // overloads are fine
        TypeBuilder::class("Overloads")
            .method(MethodBuilder::new("F"))
            .method(MethodBuilder::new("F").param(TypeSignature::I4))
            .build(&registry)
            .unwrap();
    }

    #[test]
    fn test_interface_with_base_rejected() {
        let registry = TypeRegistry::new();
        let result = TypeBuilder::interface("IBad")
            .extends(Token::new(0x02000001))
            .build(&registry);
        assert!(matches!(result, Err(Error::Malformed { .. })));
    }

    #[test]
    fn test_access_is_replaced() {
        let registry = TypeRegistry::new();
        let ty = TypeBuilder::class("C")
            .method(MethodBuilder::new("Hidden").public().private())
            .method(MethodBuilder::new("Shared").family())
            .build(&registry)
            .unwrap();

        assert!(registry.method(&ty.methods[0]).unwrap().is_private());
        assert_eq!(
            registry.method(&ty.methods[1]).unwrap().flags_access,
            MethodAccessFlags::FAMILY
        );
    }
}
