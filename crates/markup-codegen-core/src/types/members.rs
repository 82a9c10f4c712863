//! Field, method, constructor and property handles.
//!
//! Members defined in a module under construction carry a [`MemberDef`]
//! pointing at their definition row; everything else about them reads the
//! same as a member of a referenced assembly.

use std::fmt;
use std::sync::Arc;

use super::{FieldAttributes, MethodAttributes, ModuleId, TypeRef};
use crate::TypeHash;

/// Location of a member definition inside a module under construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberDef {
    pub module: ModuleId,
    pub index: u32,
}

impl MemberDef {
    pub fn new(module: ModuleId, index: u32) -> Self {
        Self { module, index }
    }
}

fn param_hashes(params: &[TypeRef]) -> Vec<TypeHash> {
    params.iter().map(TypeRef::hash).collect()
}

// ============================================================================
// Fields
// ============================================================================

#[derive(Debug)]
struct FieldData {
    declaring_type: TypeRef,
    name: String,
    field_type: TypeRef,
    attributes: FieldAttributes,
    hash: TypeHash,
    definition: Option<MemberDef>,
}

/// A cheap-to-clone handle to a field.
#[derive(Debug, Clone)]
pub struct FieldRef(Arc<FieldData>);

impl FieldRef {
    pub fn new(
        declaring_type: &TypeRef,
        name: &str,
        field_type: &TypeRef,
        attributes: FieldAttributes,
    ) -> Self {
        Self::build(declaring_type, name, field_type, attributes, None)
    }

    /// Handle for a field defined in a module under construction.
    pub fn defined(
        declaring_type: &TypeRef,
        name: &str,
        field_type: &TypeRef,
        attributes: FieldAttributes,
        definition: MemberDef,
    ) -> Self {
        Self::build(declaring_type, name, field_type, attributes, Some(definition))
    }

    fn build(
        declaring_type: &TypeRef,
        name: &str,
        field_type: &TypeRef,
        attributes: FieldAttributes,
        definition: Option<MemberDef>,
    ) -> Self {
        FieldRef(Arc::new(FieldData {
            declaring_type: declaring_type.clone(),
            name: name.to_string(),
            field_type: field_type.clone(),
            attributes,
            hash: TypeHash::from_field(declaring_type.hash(), name),
            definition,
        }))
    }

    pub fn declaring_type(&self) -> &TypeRef {
        &self.0.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn field_type(&self) -> &TypeRef {
        &self.0.field_type
    }

    pub fn attributes(&self) -> FieldAttributes {
        self.0.attributes
    }

    pub fn is_static(&self) -> bool {
        self.0.attributes.contains(FieldAttributes::STATIC)
    }

    pub fn is_public(&self) -> bool {
        self.0.attributes.contains(FieldAttributes::PUBLIC)
    }

    pub fn hash(&self) -> TypeHash {
        self.0.hash
    }

    pub fn definition(&self) -> Option<MemberDef> {
        self.0.definition
    }
}

impl PartialEq for FieldRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.0.declaring_type, self.0.name)
    }
}

// ============================================================================
// Methods
// ============================================================================

#[derive(Debug)]
struct MethodData {
    declaring_type: TypeRef,
    name: String,
    return_type: TypeRef,
    parameters: Vec<TypeRef>,
    attributes: MethodAttributes,
    hash: TypeHash,
    definition: Option<MemberDef>,
}

/// A cheap-to-clone handle to a method.
#[derive(Debug, Clone)]
pub struct MethodRef(Arc<MethodData>);

impl MethodRef {
    pub fn new(
        declaring_type: &TypeRef,
        name: &str,
        return_type: &TypeRef,
        parameters: &[TypeRef],
        attributes: MethodAttributes,
    ) -> Self {
        Self::build(declaring_type, name, return_type, parameters, attributes, None)
    }

    /// Handle for a method defined in a module under construction.
    pub fn defined(
        declaring_type: &TypeRef,
        name: &str,
        return_type: &TypeRef,
        parameters: &[TypeRef],
        attributes: MethodAttributes,
        definition: MemberDef,
    ) -> Self {
        Self::build(
            declaring_type,
            name,
            return_type,
            parameters,
            attributes,
            Some(definition),
        )
    }

    fn build(
        declaring_type: &TypeRef,
        name: &str,
        return_type: &TypeRef,
        parameters: &[TypeRef],
        attributes: MethodAttributes,
        definition: Option<MemberDef>,
    ) -> Self {
        MethodRef(Arc::new(MethodData {
            declaring_type: declaring_type.clone(),
            name: name.to_string(),
            return_type: return_type.clone(),
            parameters: parameters.to_vec(),
            attributes,
            hash: TypeHash::from_method(declaring_type.hash(), name, &param_hashes(parameters)),
            definition,
        }))
    }

    pub fn declaring_type(&self) -> &TypeRef {
        &self.0.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn return_type(&self) -> &TypeRef {
        &self.0.return_type
    }

    pub fn parameters(&self) -> &[TypeRef] {
        &self.0.parameters
    }

    pub fn attributes(&self) -> MethodAttributes {
        self.0.attributes
    }

    pub fn is_static(&self) -> bool {
        self.0.attributes.contains(MethodAttributes::STATIC)
    }

    pub fn is_virtual(&self) -> bool {
        self.0.attributes.contains(MethodAttributes::VIRTUAL)
    }

    pub fn is_public(&self) -> bool {
        self.0.attributes.contains(MethodAttributes::PUBLIC)
    }

    pub fn hash(&self) -> TypeHash {
        self.0.hash
    }

    pub fn definition(&self) -> Option<MemberDef> {
        self.0.definition
    }
}

impl PartialEq for MethodRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}(", self.0.declaring_type, self.0.name)?;
        for (i, p) in self.0.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")
    }
}

// ============================================================================
// Constructors
// ============================================================================

#[derive(Debug)]
struct ConstructorData {
    declaring_type: TypeRef,
    parameters: Vec<TypeRef>,
    is_static: bool,
    hash: TypeHash,
    definition: Option<MemberDef>,
}

/// A cheap-to-clone handle to an instance or static constructor.
#[derive(Debug, Clone)]
pub struct ConstructorRef(Arc<ConstructorData>);

impl ConstructorRef {
    pub fn new(declaring_type: &TypeRef, parameters: &[TypeRef]) -> Self {
        Self::build(declaring_type, parameters, false, None)
    }

    /// Handle for a constructor defined in a module under construction.
    pub fn defined(
        declaring_type: &TypeRef,
        parameters: &[TypeRef],
        is_static: bool,
        definition: MemberDef,
    ) -> Self {
        Self::build(declaring_type, parameters, is_static, Some(definition))
    }

    fn build(
        declaring_type: &TypeRef,
        parameters: &[TypeRef],
        is_static: bool,
        definition: Option<MemberDef>,
    ) -> Self {
        ConstructorRef(Arc::new(ConstructorData {
            declaring_type: declaring_type.clone(),
            parameters: parameters.to_vec(),
            is_static,
            hash: TypeHash::from_constructor(
                declaring_type.hash(),
                &param_hashes(parameters),
                is_static,
            ),
            definition,
        }))
    }

    pub fn declaring_type(&self) -> &TypeRef {
        &self.0.declaring_type
    }

    pub fn parameters(&self) -> &[TypeRef] {
        &self.0.parameters
    }

    pub fn is_static(&self) -> bool {
        self.0.is_static
    }

    /// Metadata name of the constructor.
    pub fn name(&self) -> &'static str {
        if self.0.is_static { ".cctor" } else { ".ctor" }
    }

    pub fn hash(&self) -> TypeHash {
        self.0.hash
    }

    pub fn definition(&self) -> Option<MemberDef> {
        self.0.definition
    }
}

impl PartialEq for ConstructorRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}

impl fmt::Display for ConstructorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.0.declaring_type, self.name())
    }
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug)]
struct PropertyData {
    declaring_type: TypeRef,
    name: String,
    property_type: TypeRef,
    getter: Option<MethodRef>,
    setter: Option<MethodRef>,
    hash: TypeHash,
    definition: Option<MemberDef>,
}

/// A cheap-to-clone handle to a property and its accessors.
#[derive(Debug, Clone)]
pub struct PropertyRef(Arc<PropertyData>);

impl PropertyRef {
    pub fn new(
        declaring_type: &TypeRef,
        name: &str,
        property_type: &TypeRef,
        getter: Option<&MethodRef>,
        setter: Option<&MethodRef>,
    ) -> Self {
        Self::build(declaring_type, name, property_type, getter, setter, None)
    }

    /// Handle for a property defined in a module under construction.
    pub fn defined(
        declaring_type: &TypeRef,
        name: &str,
        property_type: &TypeRef,
        getter: Option<&MethodRef>,
        setter: Option<&MethodRef>,
        definition: MemberDef,
    ) -> Self {
        Self::build(
            declaring_type,
            name,
            property_type,
            getter,
            setter,
            Some(definition),
        )
    }

    fn build(
        declaring_type: &TypeRef,
        name: &str,
        property_type: &TypeRef,
        getter: Option<&MethodRef>,
        setter: Option<&MethodRef>,
        definition: Option<MemberDef>,
    ) -> Self {
        PropertyRef(Arc::new(PropertyData {
            declaring_type: declaring_type.clone(),
            name: name.to_string(),
            property_type: property_type.clone(),
            getter: getter.cloned(),
            setter: setter.cloned(),
            hash: TypeHash::from_property(declaring_type.hash(), name),
            definition,
        }))
    }

    pub fn declaring_type(&self) -> &TypeRef {
        &self.0.declaring_type
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    pub fn property_type(&self) -> &TypeRef {
        &self.0.property_type
    }

    pub fn getter(&self) -> Option<&MethodRef> {
        self.0.getter.as_ref()
    }

    pub fn setter(&self) -> Option<&MethodRef> {
        self.0.setter.as_ref()
    }

    pub fn hash(&self) -> TypeHash {
        self.0.hash
    }

    pub fn definition(&self) -> Option<MemberDef> {
        self.0.definition
    }
}

impl PartialEq for PropertyRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.hash == other.0.hash
    }
}
