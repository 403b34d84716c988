//! Resolver configuration presets.

/// Configuration for building dispatch tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum number of class levels walked from the queried type before the build fails
    /// with [`crate::Error::RecursionLimit`]
    pub max_hierarchy_depth: usize,
    /// Non-abstract interface methods without a class implementation dispatch to their own
    /// body instead of failing the build
    pub default_interface_methods: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: 256,
            default_interface_methods: true,
        }
    }
}

impl ResolverConfig {
    /// Creates a configuration that follows classic (pre default interface method) rules
    ///
    /// Every interface method must be implemented by a class, and hierarchies are limited to
    /// the depth the runtime loader accepts in practice.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_hierarchy_depth: 64,
            default_interface_methods: false,
        }
    }

    /// Creates a configuration for heavily nested or generated code
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_hierarchy_depth: 4096,
            default_interface_methods: true,
        }
    }
}
