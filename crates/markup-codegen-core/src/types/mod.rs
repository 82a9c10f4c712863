//! Type-system handles consumed and produced by the code generator.
//!
//! - [`TypeRef`] - types, external or under construction
//! - [`FieldRef`], [`MethodRef`], [`ConstructorRef`], [`PropertyRef`] - members
//! - [`CoreTypes`] - the handful of runtime types the backend itself needs

mod attributes;
mod members;
mod type_ref;

pub use attributes::{FieldAttributes, MethodAttributes, TypeAttributes, TypeVisibility};
pub use members::{ConstructorRef, FieldRef, MemberDef, MethodRef, PropertyRef};
pub use type_ref::{ModuleId, TypeDescriptor, TypeKind, TypeOrigin, TypeRef};

/// Runtime library types referenced implicitly by generated code.
#[derive(Debug, Clone)]
pub struct CoreTypes {
    /// Root of the hierarchy; target of boxing.
    pub object: TypeRef,
    /// Return type of constructors and procedures.
    pub void: TypeRef,
    pub value_type: TypeRef,
    pub string: TypeRef,
    pub int32: TypeRef,
    pub boolean: TypeRef,
}

impl CoreTypes {
    /// Core types as exported by the given runtime assembly.
    pub fn new(assembly: &str) -> Self {
        let object = TypeRef::root_object(assembly, "System.Object");
        let value_type = TypeRef::new(
            TypeDescriptor::external(assembly, "System.ValueType", TypeKind::Class)
                .with_base(&object),
        );
        let value = |name: &str| {
            TypeRef::new(
                TypeDescriptor::external(assembly, name, TypeKind::ValueType)
                    .with_base(&value_type),
            )
        };
        Self {
            void: value("System.Void"),
            int32: value("System.Int32"),
            boolean: value("System.Boolean"),
            string: TypeRef::new(
                TypeDescriptor::external(assembly, "System.String", TypeKind::Class)
                    .with_base(&object),
            ),
            value_type,
            object,
        }
    }
}

impl Default for CoreTypes {
    fn default() -> Self {
        Self::new("System.Runtime")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_types_hierarchy() {
        let core = CoreTypes::default();
        assert!(core.object.is_root());
        assert!(core.int32.is_value_type());
        assert!(core.value_type.is_assignable_from(&core.int32));
        assert!(core.object.is_assignable_from(&core.string));
        assert!(!core.string.is_assignable_from(&core.int32));
    }
}
