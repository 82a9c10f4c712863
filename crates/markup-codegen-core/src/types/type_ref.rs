//! Type handles.
//!
//! A [`TypeRef`] is the single read interface for every type the code
//! generator touches, whether it comes from a referenced assembly or is being
//! defined right now in the output module. Call sites never need to know
//! which one they hold.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::RwLock;

use crate::TypeHash;

/// Identity of a module under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Allocate a fresh module identity.
    pub fn next() -> Self {
        static NEXT: AtomicU32 = AtomicU32::new(1);
        ModuleId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// Broad category of a type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    /// Reference type with class semantics.
    Class,
    /// Value type; must be boxed to be seen as an object.
    ValueType,
    /// Interface type.
    Interface,
}

/// Where a type is defined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOrigin {
    /// Defined in an already compiled assembly.
    External { assembly: Arc<str> },
    /// Defined in a module under construction, at the given type definition index.
    Module { module: ModuleId, index: u32 },
}

/// Everything needed to create a [`TypeRef`].
#[derive(Debug, Clone)]
pub struct TypeDescriptor {
    pub full_name: String,
    pub kind: TypeKind,
    pub origin: TypeOrigin,
    pub base: Option<TypeRef>,
    pub declaring_type: Option<TypeRef>,
    pub interfaces: Vec<TypeRef>,
}

impl TypeDescriptor {
    /// Descriptor of a type defined in a referenced assembly.
    pub fn external(assembly: &str, full_name: &str, kind: TypeKind) -> Self {
        Self {
            full_name: full_name.to_string(),
            kind,
            origin: TypeOrigin::External {
                assembly: Arc::from(assembly),
            },
            base: None,
            declaring_type: None,
            interfaces: Vec::new(),
        }
    }

    pub fn with_base(mut self, base: &TypeRef) -> Self {
        self.base = Some(base.clone());
        self
    }

    pub fn with_interface(mut self, interface: &TypeRef) -> Self {
        self.interfaces.push(interface.clone());
        self
    }
}

struct TypeData {
    hash: TypeHash,
    full_name: String,
    kind: TypeKind,
    origin: TypeOrigin,
    base: Option<TypeRef>,
    declaring_type: Option<TypeRef>,
    generic_definition: Option<TypeRef>,
    generic_arguments: Vec<TypeRef>,
    is_root: bool,
    interfaces: RwLock<Vec<TypeRef>>,
}

/// A cheap-to-clone handle to a type.
///
/// Equality and hashing use the type's [`TypeHash`].
#[derive(Clone)]
pub struct TypeRef(Arc<TypeData>);

impl TypeRef {
    /// Create a handle from a descriptor.
    pub fn new(desc: TypeDescriptor) -> Self {
        Self::build(desc, false, None, Vec::new())
    }

    /// Shorthand for a base-less external type.
    pub fn external(assembly: &str, full_name: &str, kind: TypeKind) -> Self {
        Self::new(TypeDescriptor::external(assembly, full_name, kind))
    }

    /// The root of the type hierarchy; every type is assignable to it.
    pub fn root_object(assembly: &str, full_name: &str) -> Self {
        Self::build(
            TypeDescriptor::external(assembly, full_name, TypeKind::Class),
            true,
            None,
            Vec::new(),
        )
    }

    fn build(
        desc: TypeDescriptor,
        is_root: bool,
        generic_definition: Option<TypeRef>,
        generic_arguments: Vec<TypeRef>,
    ) -> Self {
        let hash = match &generic_definition {
            Some(definition) => {
                let args: Vec<TypeHash> = generic_arguments.iter().map(TypeRef::hash).collect();
                TypeHash::from_generic_instance(definition.hash(), &args)
            }
            None => TypeHash::from_name(&desc.full_name),
        };
        TypeRef(Arc::new(TypeData {
            hash,
            full_name: desc.full_name,
            kind: desc.kind,
            origin: desc.origin,
            base: desc.base,
            declaring_type: desc.declaring_type,
            generic_definition,
            generic_arguments,
            is_root,
            interfaces: RwLock::new(desc.interfaces),
        }))
    }

    /// Instantiate this generic definition with the given type arguments.
    pub fn make_generic(&self, args: &[TypeRef]) -> TypeRef {
        let names: Vec<&str> = args.iter().map(|a| a.full_name()).collect();
        let desc = TypeDescriptor {
            full_name: format!("{}<{}>", self.full_name(), names.join(",")),
            kind: self.kind(),
            origin: self.origin().clone(),
            base: self.base_type().cloned(),
            declaring_type: self.declaring_type().cloned(),
            interfaces: self.interfaces(),
        };
        Self::build(desc, false, Some(self.clone()), args.to_vec())
    }

    pub fn hash(&self) -> TypeHash {
        self.0.hash
    }

    pub fn full_name(&self) -> &str {
        &self.0.full_name
    }

    /// Simple name without namespace or declaring type.
    pub fn name(&self) -> &str {
        let full = self.full_name();
        let end = full.find('<').unwrap_or(full.len());
        let start = full[..end].rfind(['.', '+']).map(|i| i + 1).unwrap_or(0);
        &full[start..end]
    }

    /// Namespace part of the full name; empty for nested types.
    pub fn namespace(&self) -> &str {
        if self.0.declaring_type.is_some() {
            return "";
        }
        let full = self.full_name();
        let end = full.find('<').unwrap_or(full.len());
        match full[..end].rfind('.') {
            Some(i) => &full[..i],
            None => "",
        }
    }

    pub fn kind(&self) -> TypeKind {
        self.0.kind
    }

    pub fn is_value_type(&self) -> bool {
        self.0.kind == TypeKind::ValueType
    }

    pub fn is_interface(&self) -> bool {
        self.0.kind == TypeKind::Interface
    }

    pub fn is_root(&self) -> bool {
        self.0.is_root
    }

    pub fn origin(&self) -> &TypeOrigin {
        &self.0.origin
    }

    /// Module this type is being defined in, if any.
    pub fn module(&self) -> Option<ModuleId> {
        match self.0.origin {
            TypeOrigin::Module { module, .. } => Some(module),
            TypeOrigin::External { .. } => None,
        }
    }

    pub fn base_type(&self) -> Option<&TypeRef> {
        self.0.base.as_ref()
    }

    pub fn declaring_type(&self) -> Option<&TypeRef> {
        self.0.declaring_type.as_ref()
    }

    pub fn generic_definition(&self) -> Option<&TypeRef> {
        self.0.generic_definition.as_ref()
    }

    pub fn generic_arguments(&self) -> &[TypeRef] {
        &self.0.generic_arguments
    }

    pub fn is_generic_instance(&self) -> bool {
        self.0.generic_definition.is_some()
    }

    /// Snapshot of the directly implemented interfaces.
    pub fn interfaces(&self) -> Vec<TypeRef> {
        self.0.interfaces.read().clone()
    }

    /// Record an implemented interface. Duplicates are ignored.
    ///
    /// Visible through every clone of this handle.
    pub fn add_interface(&self, interface: &TypeRef) {
        let mut interfaces = self.0.interfaces.write();
        if !interfaces.iter().any(|i| i == interface) {
            interfaces.push(interface.clone());
        }
    }

    /// Whether a value of type `other` can be stored in a location of this type.
    pub fn is_assignable_from(&self, other: &TypeRef) -> bool {
        if self == other || self.is_root() {
            return true;
        }
        if self.is_interface() {
            let mut current = Some(other);
            while let Some(ty) = current {
                if ty.implements(self) {
                    return true;
                }
                current = ty.base_type();
            }
            return false;
        }
        let mut current = other.base_type();
        while let Some(ty) = current {
            if ty == self {
                return true;
            }
            current = ty.base_type();
        }
        false
    }

    fn implements(&self, interface: &TypeRef) -> bool {
        self.0
            .interfaces
            .read()
            .iter()
            .any(|i| i == interface || i.implements(interface))
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}

impl Eq for TypeRef {}

impl std::hash::Hash for TypeRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.hash.hash(state);
    }
}

impl fmt::Debug for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeRef({})", self.full_name())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.full_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> TypeRef {
        TypeRef::root_object("System.Runtime", "System.Object")
    }

    #[test]
    fn names() {
        let ty = TypeRef::external("Controls", "Controls.Primitives.Button", TypeKind::Class);
        assert_eq!(ty.name(), "Button");
        assert_eq!(ty.namespace(), "Controls.Primitives");
        assert_eq!(ty.full_name(), "Controls.Primitives.Button");
    }

    #[test]
    fn equality_follows_hash() {
        let a = TypeRef::external("A", "Shared.Thing", TypeKind::Class);
        let b = TypeRef::external("B", "Shared.Thing", TypeKind::Class);
        assert_eq!(a, b);
    }

    #[test]
    fn root_accepts_everything() {
        let int = TypeRef::external("System.Runtime", "System.Int32", TypeKind::ValueType);
        assert!(object().is_assignable_from(&int));
        assert!(!int.is_assignable_from(&object()));
    }

    #[test]
    fn base_chain_assignability() {
        let object = object();
        let control = TypeRef::new(
            TypeDescriptor::external("Controls", "Controls.Control", TypeKind::Class)
                .with_base(&object),
        );
        let button = TypeRef::new(
            TypeDescriptor::external("Controls", "Controls.Button", TypeKind::Class)
                .with_base(&control),
        );
        assert!(control.is_assignable_from(&button));
        assert!(!button.is_assignable_from(&control));
    }

    #[test]
    fn interface_assignability_through_base_and_late_addition() {
        let init = TypeRef::external("System.Runtime", "System.ISupportInitialize", TypeKind::Interface);
        let control = TypeRef::external("Controls", "Controls.Control", TypeKind::Class);
        let button = TypeRef::new(
            TypeDescriptor::external("Controls", "Controls.Button", TypeKind::Class)
                .with_base(&control),
        );
        assert!(!init.is_assignable_from(&button));

        control.add_interface(&init);
        assert!(init.is_assignable_from(&button));
        control.add_interface(&init);
        assert_eq!(control.interfaces().len(), 1);
    }

    #[test]
    fn generic_instances() {
        let list = TypeRef::external("System.Collections", "System.Collections.Generic.List`1", TypeKind::Class);
        let int = TypeRef::external("System.Runtime", "System.Int32", TypeKind::ValueType);
        let string = TypeRef::external("System.Runtime", "System.String", TypeKind::Class);

        let list_int = list.make_generic(std::slice::from_ref(&int));
        assert!(list_int.is_generic_instance());
        assert_eq!(list_int.generic_definition(), Some(&list));
        assert_eq!(list_int.name(), "List`1");
        assert_ne!(list_int, list.make_generic(&[string]));
        assert_eq!(list_int, list.make_generic(&[int]));
    }
}
