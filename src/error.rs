use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Dispatch Table Errors
/// - [`Error::InconsistentMetadata`] - An interface method has no implementation anywhere in the
///   hierarchy, or the hierarchy itself is cyclic. Fatal to a single build, recoverable by the
///   caller (skip the type, continue with others).
/// - [`Error::InconsistentChain`] - A slot entry was asked to join a slot while it already
///   belongs to another slot's hiding chain. Indicates a contradictory input graph.
/// - [`Error::MethodNotFound`] - A dispatch query for a method that is not visible on the type.
///
/// ## Type System Errors
/// - [`Error::TypeInsert`] - Token already registered in the type model
/// - [`Error::TypeNotFound`] - Requested type not found in the type model
/// - [`Error::Malformed`] - Builder or metadata input that cannot be represented
///
/// ## Analysis Errors
/// - [`Error::RecursionLimit`] - Hierarchy deeper than the configured limit
///
/// # Examples
///
/// ```rust,no_run
/// use dotvtable::{Error, metadata::token::Token, TypeRegistry, VTableResolver};
///
/// # let registry = TypeRegistry::new();
/// match VTableResolver::build(&registry, Token::new(0x02000002)) {
///     Ok(vtable) => println!("{} slots", vtable.slots().count()),
///     Err(Error::InconsistentMetadata { ty, message, .. }) => {
///         eprintln!("Skipping {}: {}", ty, message);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Input that cannot be represented by the type model.
    ///
    /// Carries the source location where the problem was detected.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// The metadata of a type does not allow building a complete dispatch table.
    ///
    /// Raised when an interface method reachable from `ty` has no implementing method
    /// anywhere in its class hierarchy, or when the base/interface graph is cyclic.
    #[error("Inconsistent metadata for type {ty}: {message}")]
    InconsistentMetadata {
        /// The type whose table was being built
        ty: Token,
        /// The offending method, if the error concerns one
        method: Option<Token>,
        /// Description of the inconsistency
        message: String,
    },

    /// A hiding chain contradicts an already established slot assignment.
    ///
    /// Not expected from well-formed input; signals a cyclic or contradictory
    /// shadowing relation reported by the type model.
    #[error("Inconsistent hiding chain at method {method}: {message}")]
    InconsistentChain {
        /// The method whose entry could not be attached
        method: Token,
        /// Description of the conflict
        message: String,
    },

    /// The method is not visible on the type the dispatch table was built for.
    #[error("Method {0} is not part of this dispatch table")]
    MethodNotFound(Token),

    /// Failed to insert new type or method into the type model.
    ///
    /// The associated [`Token`] is already taken.
    #[error("Failed to insert new entity into TypeModel - {0}")]
    TypeInsert(Token),

    /// Failed to find type in the type model.
    ///
    /// The associated [`Token`] identifies which type was not found.
    #[error("Failed to find type in TypeModel - {0}")]
    TypeNotFound(Token),

    /// The hierarchy walk exceeded the configured maximum depth.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),
}
