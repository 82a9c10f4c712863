//! Deterministic hash-based identity for types and members.
//!
//! [`TypeHash`] is a 64-bit hash computed from qualified names and signatures.
//! Two handles describing the same type or member produce the same hash no
//! matter which module or assembly they were obtained from, which is what the
//! import tables of a module under construction deduplicate on.
//!
//! # Hash Computation
//!
//! Names are digested with XXH64 and xored with a per-kind seed from
//! [`hash_domains`], so a field and a property called `Content` on the same
//! type get distinct identities. Signatures fold parameter or type-argument
//! hashes in order.
//!
//! # Examples
//!
//! ```
//! use markup_codegen_core::TypeHash;
//!
//! let button = TypeHash::from_name("Controls.Button");
//! assert_eq!(button, TypeHash::from_name("Controls.Button"));
//!
//! let string = TypeHash::from_name("System.String");
//! let set_text = TypeHash::from_method(button, "set_Text", &[string]);
//! assert_ne!(set_text, TypeHash::from_method(button, "set_Text", &[]));
//! ```

use std::fmt;
use xxhash_rust::xxh64::xxh64;

/// Seeds that keep each kind of handle in its own hash space.
pub mod hash_domains {
    pub const TYPE: u64 = 0x6a09e667f3bcc908;
    pub const FIELD: u64 = 0xbb67ae8584caa73b;
    pub const PROPERTY: u64 = 0x3c6ef372fe94f82b;
    pub const METHOD: u64 = 0xa54ff53a5f1d36f1;
    pub const CONSTRUCTOR: u64 = 0x510e527fade682d1;
    /// `.cctor`; separate from [`CONSTRUCTOR`] so a parameterless `.ctor` differs.
    pub const TYPE_INITIALIZER: u64 = 0x9b05688c2b3e6c1f;

    /// Multiplier applied between signature components.
    pub const STEP: u64 = 0x1f83d9abfb41bd6b;
}

/// A deterministic 64-bit hash identifying a type or member.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Placeholder for "no identity yet".
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Identity of a non-generic type, from its namespace-qualified name.
    #[inline]
    pub fn from_name(name: &str) -> Self {
        TypeHash(hash_domains::TYPE ^ xxh64(name.as_bytes(), 0))
    }

    /// Identity of a field within its declaring type.
    #[inline]
    pub fn from_field(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_domains::FIELD ^ owner.0 ^ xxh64(name.as_bytes(), 0))
    }

    /// Identity of a property within its declaring type.
    #[inline]
    pub fn from_property(owner: TypeHash, name: &str) -> Self {
        TypeHash(hash_domains::PROPERTY ^ owner.0 ^ xxh64(name.as_bytes(), 0))
    }

    /// Identity of an overload: declaring type, name and ordered parameter types.
    #[inline]
    pub fn from_method(owner: TypeHash, name: &str, param_hashes: &[TypeHash]) -> Self {
        let seed = hash_domains::METHOD ^ owner.0 ^ xxh64(name.as_bytes(), 0);
        TypeHash(fold_signature(seed, param_hashes))
    }

    /// Identity of a `.ctor` overload, or of the type's `.cctor` when `is_static`.
    #[inline]
    pub fn from_constructor(owner: TypeHash, param_hashes: &[TypeHash], is_static: bool) -> Self {
        let domain = if is_static {
            hash_domains::TYPE_INITIALIZER
        } else {
            hash_domains::CONSTRUCTOR
        };
        TypeHash(fold_signature(domain ^ owner.0, param_hashes))
    }

    /// Identity of a closed generic type such as `List<Int32>`.
    ///
    /// ```
    /// use markup_codegen_core::TypeHash;
    ///
    /// let list = TypeHash::from_name("System.Collections.Generic.List`1");
    /// let int = TypeHash::from_name("System.Int32");
    /// let string = TypeHash::from_name("System.String");
    /// assert_ne!(
    ///     TypeHash::from_generic_instance(list, &[int]),
    ///     TypeHash::from_generic_instance(list, &[string]),
    /// );
    /// ```
    #[inline]
    pub fn from_generic_instance(definition: TypeHash, args: &[TypeHash]) -> Self {
        TypeHash(fold_signature(definition.0, args))
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Position-dependent marker so `(A, B)` and `(B, A)` hash apart.
#[inline]
fn position_marker(index: usize) -> u64 {
    let mut z = (index as u64 + 1).wrapping_mul(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z ^ (z >> 31)
}

#[inline]
fn fold_signature(seed: u64, components: &[TypeHash]) -> u64 {
    components
        .iter()
        .enumerate()
        .fold(seed, |acc, (i, component)| {
            acc.wrapping_mul(hash_domains::STEP)
                .wrapping_add(position_marker(i) ^ component.0)
        })
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_name_same_identity() {
        assert_eq!(
            TypeHash::from_name("Controls.Button"),
            TypeHash::from_name("Controls.Button")
        );
    }

    #[test]
    fn distinct_names_distinct_identity() {
        let button = TypeHash::from_name("Controls.Button");
        let grid = TypeHash::from_name("Controls.Grid");
        assert_ne!(button, grid);
        assert!(!button.is_empty());
    }

    #[test]
    fn member_domains_do_not_collide() {
        let owner = TypeHash::from_name("Controls.Button");
        let field = TypeHash::from_field(owner, "Content");
        let property = TypeHash::from_property(owner, "Content");
        let method = TypeHash::from_method(owner, "Content", &[]);
        assert_ne!(field, property);
        assert_ne!(field, method);
        assert_ne!(property, method);
    }

    #[test]
    fn parameter_order_matters() {
        let owner = TypeHash::from_name("Owner");
        let a = TypeHash::from_name("A");
        let b = TypeHash::from_name("B");
        assert_ne!(
            TypeHash::from_method(owner, "M", &[a, b]),
            TypeHash::from_method(owner, "M", &[b, a])
        );
    }

    #[test]
    fn static_constructor_differs_from_default_constructor() {
        let owner = TypeHash::from_name("Owner");
        assert_ne!(
            TypeHash::from_constructor(owner, &[], true),
            TypeHash::from_constructor(owner, &[], false)
        );
    }
}
