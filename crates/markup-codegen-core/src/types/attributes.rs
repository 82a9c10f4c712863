//! Member and type attribute flags.
//!
//! Bit values follow the ECMA-335 metadata encoding so a module writer can
//! store them unchanged.

use bitflags::bitflags;

bitflags! {
    /// Attributes of a method or constructor definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MethodAttributes: u16 {
        const PRIVATE = 0x0001;
        const PUBLIC = 0x0006;
        const STATIC = 0x0010;
        const FINAL = 0x0020;
        const VIRTUAL = 0x0040;
        const HIDE_BY_SIG = 0x0080;
        /// Method occupies a fresh vtable slot.
        const NEW_SLOT = 0x0100;
        const ABSTRACT = 0x0400;
        const SPECIAL_NAME = 0x0800;
        const RT_SPECIAL_NAME = 0x1000;
    }
}

bitflags! {
    /// Attributes of a field definition.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldAttributes: u16 {
        const PRIVATE = 0x0001;
        const PUBLIC = 0x0006;
        const STATIC = 0x0010;
        const INIT_ONLY = 0x0020;
    }
}

bitflags! {
    /// Layout and semantics flags of a type definition.
    ///
    /// Visibility is tracked separately by [`TypeVisibility`] because its
    /// encodings overlap.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TypeAttributes: u32 {
        const INTERFACE = 0x0020;
        const ABSTRACT = 0x0080;
        const SEALED = 0x0100;
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

/// Visibility of a type definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeVisibility {
    #[default]
    NotPublic,
    Public,
    NestedPublic,
    NestedPrivate,
}

impl TypeVisibility {
    /// Metadata encoding of the visibility mask.
    pub fn bits(self) -> u32 {
        match self {
            TypeVisibility::NotPublic => 0x0,
            TypeVisibility::Public => 0x1,
            TypeVisibility::NestedPublic => 0x2,
            TypeVisibility::NestedPrivate => 0x3,
        }
    }

    pub fn is_nested(self) -> bool {
        matches!(
            self,
            TypeVisibility::NestedPublic | TypeVisibility::NestedPrivate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_slot_flags() {
        let attrs = MethodAttributes::PUBLIC | MethodAttributes::VIRTUAL | MethodAttributes::NEW_SLOT;
        assert_eq!(attrs.bits(), 0x0146);
        assert!(attrs.contains(MethodAttributes::NEW_SLOT));
    }

    #[test]
    fn visibility_encoding() {
        assert_eq!(TypeVisibility::NestedPrivate.bits(), 3);
        assert!(TypeVisibility::NestedPublic.is_nested());
        assert!(!TypeVisibility::Public.is_nested());
    }
}
