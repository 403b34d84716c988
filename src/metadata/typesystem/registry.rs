//! Central type registry implementing the [`TypeModel`] contract.
//!
//! # Registry Architecture
//!
//! - **Token-based lookup**: primary storage of types and methods in token order
//!   (`SkipMap`), so iteration follows declaration order
//! - **Name-based lookup**: secondary full name index (`DashMap`)
//! - **Token generation**: atomic row counters per table
//!
//! # Thread Safety
//!
//! Types and methods can be registered and `MethodImpl` records applied from several
//! threads at once. Once populated, the registry is only read; any number of dispatch
//! tables can be built from it in parallel.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use crossbeam_skiplist::SkipMap;
use dashmap::DashMap;

use crate::{
    metadata::{
        method::{Method, MethodRc},
        token::Token,
        typesystem::{CilType, CilTypeRc, TypeModel},
    },
    Error, Result,
};

/// Registry holding all types and methods of one or more assemblies.
pub struct TypeRegistry {
    /// Types by `TypeDef` token
    types: SkipMap<Token, CilTypeRc>,
    /// Methods by `MethodDef` token
    methods: SkipMap<Token, MethodRc>,
    /// Full name to type token
    fullnames: DashMap<String, Token>,
    /// Next free `TypeDef` row
    next_type_row: AtomicU32,
    /// Next free `MethodDef` row
    next_method_row: AtomicU32,
    /// Number of applied `MethodImpl` records
    method_impls: AtomicU32,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create a new, empty registry
    #[must_use]
    pub fn new() -> Self {
        TypeRegistry {
            types: SkipMap::new(),
            methods: SkipMap::new(),
            fullnames: DashMap::new(),
            next_type_row: AtomicU32::new(1),
            next_method_row: AtomicU32::new(1),
            method_impls: AtomicU32::new(0),
        }
    }

    /// Allocate the next free `TypeDef` token
    pub fn next_type_token(&self) -> Token {
        let row = self.next_type_row.fetch_add(1, Ordering::Relaxed);
        Token::from_parts(Token::TABLE_TYPEDEF, row)
    }

    /// Allocate the next free `MethodDef` token
    pub fn next_method_token(&self) -> Token {
        let row = self.next_method_row.fetch_add(1, Ordering::Relaxed);
        Token::from_parts(Token::TABLE_METHODDEF, row)
    }

    /// Register a type
    ///
    /// ## Arguments
    /// * 'new_type' - The type to insert
    ///
    /// # Errors
    /// Returns [`Error::TypeInsert`] if the token is already registered
    pub fn insert(&self, new_type: CilType) -> Result<CilTypeRc> {
        let token = new_type.token;
        if self.types.contains_key(&token) {
            return Err(Error::TypeInsert(token));
        }

        let fullname = new_type.fullname();
        let type_rc = Arc::new(new_type);
        self.types.insert(token, type_rc.clone());
        self.fullnames.insert(fullname, token);
        Ok(type_rc)
    }

    /// Register a method
    ///
    /// The declaring type does not need to be registered yet.
    ///
    /// # Errors
    /// Returns [`Error::TypeInsert`] if the token is already registered
    pub fn insert_method(&self, method: Method) -> Result<MethodRc> {
        let token = method.token;
        if self.methods.contains_key(&token) {
            return Err(Error::TypeInsert(token));
        }

        let method_rc = Arc::new(method);
        self.methods.insert(token, method_rc.clone());
        Ok(method_rc)
    }

    /// Apply a `MethodImpl` record: `body` (declared on `class`) explicitly implements
    /// `declaration`.
    ///
    /// The edge is recorded on the body method. The declaration may be a class or interface
    /// method, and does not need to be known to the registry (e.g. a `MemberRef` into an
    /// assembly that is not loaded).
    ///
    /// ## Arguments
    /// * 'class'       - The type owning the record
    /// * 'body'        - The implementing method
    /// * 'declaration' - The method being implemented
    ///
    /// # Errors
    /// Returns [`Error::TypeNotFound`] if `class` is unknown, or a malformed error if `body`
    /// is unknown or not declared on `class`
    pub fn add_method_impl(&self, class: Token, body: Token, declaration: Token) -> Result<()> {
        if !self.types.contains_key(&class) {
            return Err(Error::TypeNotFound(class));
        }

        let Some(body_method) = self.method(&body) else {
            return Err(malformed_error!(
                "MethodImpl of {} references unknown body {}",
                class,
                body
            ));
        };

        if body_method.owner != class {
            return Err(malformed_error!(
                "MethodImpl body {} is declared on {}, not on {}",
                body,
                body_method.owner,
                class
            ));
        }

        body_method.overrides.push(declaration);
        self.method_impls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Get a type by token
    #[must_use]
    pub fn get(&self, token: &Token) -> Option<CilTypeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Get a method by token
    #[must_use]
    pub fn method(&self, token: &Token) -> Option<MethodRc> {
        self.methods.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a type by its full name (Namespace.Name)
    #[must_use]
    pub fn get_by_fullname(&self, fullname: &str) -> Option<CilTypeRc> {
        let token = *self.fullnames.get(fullname)?;
        self.get(&token)
    }

    /// First method declared on `ty` with the given name
    #[must_use]
    pub fn method_by_name(&self, ty: Token, name: &str) -> Option<MethodRc> {
        let type_rc = self.get(&ty)?;
        type_rc
            .methods
            .iter()
            .filter_map(|token| self.method(token))
            .find(|method| method.name == name)
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of registered methods
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Number of applied `MethodImpl` records
    #[must_use]
    pub fn method_impl_count(&self) -> usize {
        self.method_impls.load(Ordering::Relaxed) as usize
    }

    /// All types, in token order
    #[must_use]
    pub fn all_types(&self) -> Vec<CilTypeRc> {
        self.types
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }

    /// Tokens of all non-interface types, in token order
    #[must_use]
    pub fn class_tokens(&self) -> Vec<Token> {
        self.types
            .iter()
            .filter(|entry| !entry.value().is_interface())
            .map(|entry| *entry.key())
            .collect()
    }
}

impl TypeModel for TypeRegistry {
    fn contains_type(&self, ty: Token) -> bool {
        self.types.contains_key(&ty)
    }

    fn base_type(&self, ty: Token) -> Option<Token> {
        let base = self.get(&ty)?.base?;
        if self.types.contains_key(&base) {
            Some(base)
        } else {
            None
        }
    }

    fn is_interface(&self, ty: Token) -> bool {
        self.get(&ty).is_some_and(|type_rc| type_rc.is_interface())
    }

    fn interfaces(&self, ty: Token) -> Vec<Token> {
        self.get(&ty)
            .map(|type_rc| {
                type_rc
                    .interfaces
                    .iter()
                    .copied()
                    .filter(|iface| self.types.contains_key(iface))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn methods(&self, ty: Token) -> Vec<Token> {
        self.get(&ty)
            .map(|type_rc| type_rc.methods.clone())
            .unwrap_or_default()
    }

    fn method_owner(&self, method: Token) -> Option<Token> {
        self.method(&method).map(|m| m.owner)
    }

    fn method_overrides(&self, method: Token) -> Vec<Token> {
        self.method(&method)
            .map(|m| m.overrides())
            .unwrap_or_default()
    }

    fn method_is_abstract(&self, method: Token) -> bool {
        self.method(&method).is_some_and(|m| m.is_abstract())
    }

    fn method_is_static(&self, method: Token) -> bool {
        self.method(&method).is_some_and(|m| m.is_static())
    }

    fn find_implicit_match(&self, ty: Token, candidate: Token) -> Option<Token> {
        let candidate = self.method(&candidate)?;
        let type_rc = self.get(&ty)?;

        type_rc
            .methods
            .iter()
            .filter_map(|token| self.method(token))
            .find(|method| {
                method.is_virtual() && !method.is_static() && method.same_name_and_sig(&candidate)
            })
            .map(|method| method.token)
    }

    fn next_hidden_base(&self, method: Token, depth: &mut usize) -> Option<Token> {
        let method = self.method(&method)?;
        if !method.is_overridable() || method.is_new_slot() {
            return None;
        }

        let mut level = *depth;
        let mut current = self.base_type(method.owner);
        while let Some(ty) = current {
            level += 1;

            let hit = self
                .methods(ty)
                .iter()
                .filter_map(|token| self.method(token))
                .find(|candidate| candidate.is_overridable() && candidate.same_name_and_sig(&method));

            if let Some(hit) = hit {
                if hit.is_final() {
                    return None;
                }

                *depth = level;
                return Some(hit.token);
            }

            // a longer walk than there are types means a cyclic base chain, which the
            // resolver reports on its own hierarchy walk
            if level - *depth > self.types.len() {
                return None;
            }
            current = self.base_type(ty);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        signatures::{SignatureMethod, TypeSignature},
        typesystem::TypeAttributes,
    };

    const PUBLIC_VIRTUAL: u32 = 0x0006 | 0x0040 | 0x0080;
    const NEW_SLOT: u32 = 0x0100;

    fn add_type(registry: &TypeRegistry, name: &str, base: Option<Token>, flags: u32) -> Token {
        let token = registry.next_type_token();
        registry
            .insert(CilType {
                token,
                namespace: "Test".to_string(),
                name: name.to_string(),
                flags,
                base,
                interfaces: Vec::new(),
                methods: Vec::new(),
            })
            .unwrap();
        token
    }

    fn add_type_with_methods(
        registry: &TypeRegistry,
        name: &str,
        base: Option<Token>,
        methods: &[(&str, u32)],
    ) -> (Token, Vec<Token>) {
        let token = registry.next_type_token();
        let mut method_tokens = Vec::new();
        for (method_name, flags) in methods {
            let method_token = registry.next_method_token();
            registry
                .insert_method(Method::new(
                    method_token,
                    token,
                    method_name.to_string(),
                    SignatureMethod::instance(TypeSignature::Void, vec![]),
                    *flags,
                ))
                .unwrap();
            method_tokens.push(method_token);
        }

        registry
            .insert(CilType {
                token,
                namespace: "Test".to_string(),
                name: name.to_string(),
                flags: TypeAttributes::PUBLIC,
                base,
                interfaces: Vec::new(),
                methods: method_tokens.clone(),
            })
            .unwrap();
        (token, method_tokens)
    }

    #[test]
    fn test_token_allocation() {
        let registry = TypeRegistry::new();
        assert_eq!(registry.next_type_token(), Token::new(0x02000001));
        assert_eq!(registry.next_type_token(), Token::new(0x02000002));
        assert_eq!(registry.next_method_token(), Token::new(0x06000001));
    }

    #[test]
    fn test_insert_duplicate() {
        let registry = TypeRegistry::new();
        let token = add_type(&registry, "A", None, 0);
        let result = registry.insert(CilType {
            token,
            namespace: String::new(),
            name: "B".to_string(),
            flags: 0,
            base: None,
            interfaces: Vec::new(),
            methods: Vec::new(),
        });
        assert!(matches!(result, Err(Error::TypeInsert(t)) if t == token));
    }

    #[test]
    fn test_lookup_by_fullname() {
        let registry = TypeRegistry::new();
        let token = add_type(&registry, "Widget", None, 0);
        assert_eq!(registry.get_by_fullname("Test.Widget").unwrap().token, token);
        assert!(registry.get_by_fullname("Test.Missing").is_none());
    }

    #[test]
    fn test_unknown_base_terminates_chain() {
        let registry = TypeRegistry::new();
        let token = add_type(&registry, "Orphan", Some(Token::new(0x01000005)), 0);
        assert_eq!(registry.base_type(token), None);
        assert!(registry.contains_type(token));
    }

    #[test]
    fn test_next_hidden_base_skips_levels() {
        let registry = TypeRegistry::new();
        let (a, a_methods) = add_type_with_methods(&registry, "A", None, &[("F", PUBLIC_VIRTUAL)]);
        let (b, _) = add_type_with_methods(&registry, "B", Some(a), &[("G", PUBLIC_VIRTUAL)]);
        let (_, c_methods) =
            add_type_with_methods(&registry, "C", Some(b), &[("F", PUBLIC_VIRTUAL)]);

        let mut depth = 0;
        assert_eq!(
            registry.next_hidden_base(c_methods[0], &mut depth),
            Some(a_methods[0])
        );
        assert_eq!(depth, 2);

        let mut depth = 2;
        assert_eq!(registry.next_hidden_base(a_methods[0], &mut depth), None);
        assert_eq!(depth, 2);
    }

    #[test]
    fn test_next_hidden_base_new_slot_and_non_virtual() {
        let registry = TypeRegistry::new();
        let (a, _) = add_type_with_methods(&registry, "A", None, &[("F", PUBLIC_VIRTUAL)]);
        let (_, b_methods) = add_type_with_methods(
            &registry,
            "B",
            Some(a),
            &[("F", PUBLIC_VIRTUAL | NEW_SLOT), ("F2", 0x0006)],
        );

        let mut depth = 0;
        assert_eq!(registry.next_hidden_base(b_methods[0], &mut depth), None);
        assert_eq!(registry.next_hidden_base(b_methods[1], &mut depth), None);
    }

    #[test]
    fn test_next_hidden_base_ignores_private_and_stops_at_final() {
        let registry = TypeRegistry::new();
        let (a, _) = add_type_with_methods(&registry, "A", None, &[("F", PUBLIC_VIRTUAL | 0x0020)]);
        let (b, _) = add_type_with_methods(&registry, "B", Some(a), &[("F", 0x0001 | 0x0040)]);
        let (_, c_methods) =
            add_type_with_methods(&registry, "C", Some(b), &[("F", PUBLIC_VIRTUAL)]);

        // B.F is private and skipped, A.F is final and ends the chain
        let mut depth = 0;
        assert_eq!(registry.next_hidden_base(c_methods[0], &mut depth), None);
        assert_eq!(depth, 0);
    }

    #[test]
    fn test_private_virtual_does_not_hide_base() {
        let registry = TypeRegistry::new();
        let (a, a_methods) =
            add_type_with_methods(&registry, "A", None, &[("F", PUBLIC_VIRTUAL | NEW_SLOT)]);
        let (b, b_methods) = add_type_with_methods(&registry, "B", Some(a), &[("F", 0x0001 | 0x0040)]);
        let (_, c_methods) =
            add_type_with_methods(&registry, "C", Some(b), &[("F", PUBLIC_VIRTUAL)]);

        let mut depth = 1;
        assert_eq!(registry.next_hidden_base(b_methods[0], &mut depth), None);
        assert_eq!(depth, 1);

        let mut depth = 0;
        assert_eq!(registry.next_hidden_base(c_methods[0], &mut depth), Some(a_methods[0]));
        assert_eq!(depth, 2);
    }

    #[test]
    fn test_method_impl_validation() {
        let registry = TypeRegistry::new();
        let (a, a_methods) = add_type_with_methods(&registry, "A", None, &[("F", PUBLIC_VIRTUAL)]);
        let (b, b_methods) =
            add_type_with_methods(&registry, "B", Some(a), &[("Foo", PUBLIC_VIRTUAL)]);

        registry.add_method_impl(b, b_methods[0], a_methods[0]).unwrap();
        assert_eq!(registry.method_overrides(b_methods[0]), vec![a_methods[0]]);
        assert_eq!(registry.method_impl_count(), 1);

        let wrong_owner = registry.add_method_impl(a, b_methods[0], a_methods[0]);
        assert!(matches!(wrong_owner, Err(Error::Malformed { .. })));

        let unknown_class = registry.add_method_impl(Token::new(0x02000099), b_methods[0], a_methods[0]);
        assert!(matches!(unknown_class, Err(Error::TypeNotFound(_))));
    }

    #[test]
    fn test_find_implicit_match() {
        let registry = TypeRegistry::new();
        let (_, i_methods) = add_type_with_methods(
            &registry,
            "I",
            None,
            &[("Run", PUBLIC_VIRTUAL | NEW_SLOT | 0x0400)],
        );
        let (c, c_methods) = add_type_with_methods(
            &registry,
            "C",
            None,
            &[("Run", 0x0006), ("Run", PUBLIC_VIRTUAL | NEW_SLOT | 0x0020)],
        );

        // the non-virtual overload does not qualify
        assert_eq!(
            registry.find_implicit_match(c, i_methods[0]),
            Some(c_methods[1])
        );
    }
}
