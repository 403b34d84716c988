use crate::metadata::token::Token;

/// Decoded element type of a signature (subset of ECMA-335 II.23.2.12)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum TypeSignature {
    #[default]
    /// Not defined
    Unknown,
    /// void
    Void,
    /// bool
    Boolean,
    /// char
    Char,
    /// signed 8bit integer
    I1,
    /// unsigned 8bit integer
    U1,
    /// signed 16bit integer
    I2,
    /// unsigned 16bit integer
    U2,
    /// signed 32bit integer
    I4,
    /// unsigned 32bit integer
    U4,
    /// signed 64bit integer
    I8,
    /// unsigned 64bit integer
    U8,
    /// 32bit floating-point
    R4,
    /// 64bit floating-point
    R8,
    /// signed integer, sized to executing platform
    I,
    /// unsigned integer, sized to executing platform
    U,
    /// System.String
    String,
    /// System.Object
    Object,
    /// Type by reference
    ByRef(Box<TypeSignature>),
    /// CIL value-type
    // TypeDefOrRefOrSpecEncoded
    ValueType(Token),
    /// CIL Class
    // TypeDefOrRefOrSpecEncoded
    Class(Token),
    /// Generic type parameter
    GenericParamType(u32),
    /// Generic method parameter
    GenericParamMethod(u32),
    /// Generic type and its arguments
    GenericInst(Box<TypeSignature>, Vec<TypeSignature>),
    /// Single dimension array
    SzArray(Box<TypeSignature>),
}

/// Parameter of a method signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureParameter {
    /// Parameter is passed by reference
    pub by_ref: bool,
    /// The type of the parameter
    pub base: TypeSignature,
}

impl From<TypeSignature> for SignatureParameter {
    fn from(base: TypeSignature) -> Self {
        SignatureParameter {
            by_ref: false,
            base,
        }
    }
}

/// Represents a method signature (II.23.2.1)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SignatureMethod {
    /// Used to encode the keyword instance in the calling convention, see §II.15.3
    pub has_this: bool,
    /// Used to indicate that the method has one or more generic parameters.
    pub param_count_generic: u32,
    /// The return type of this `Method`
    pub return_type: SignatureParameter,
    /// The parameters of this `Method`
    pub params: Vec<SignatureParameter>,
}

impl SignatureMethod {
    /// Create an instance (`HASTHIS`) signature
    ///
    /// ## Arguments
    /// * 'return_type' - The return type
    /// * 'params'      - Parameter types, in order
    #[must_use]
    pub fn instance(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        SignatureMethod {
            has_this: true,
            param_count_generic: 0,
            return_type: return_type.into(),
            params: params.into_iter().map(SignatureParameter::from).collect(),
        }
    }

    /// Create a static (`DEFAULT`) signature
    ///
    /// ## Arguments
    /// * 'return_type' - The return type
    /// * 'params'      - Parameter types, in order
    #[must_use]
    pub fn static_method(return_type: TypeSignature, params: Vec<TypeSignature>) -> Self {
        SignatureMethod {
            has_this: false,
            ..Self::instance(return_type, params)
        }
    }

    /// Set the generic parameter count of this signature
    #[must_use]
    pub fn with_generic_params(mut self, count: u32) -> Self {
        self.param_count_generic = count;
        self
    }

    /// Number of declared parameters
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    /// Returns true if `other` describes the same callable shape.
    ///
    /// Compares calling convention, generic arity, return type and all parameters,
    /// including by-ref-ness. This is the 'sig' part of hide-by-name-and-sig.
    #[must_use]
    pub fn matches(&self, other: &SignatureMethod) -> bool {
        self.has_this == other.has_this
            && self.param_count_generic == other.param_count_generic
            && self.return_type == other.return_type
            && self.params == other.params
    }
}
