//! The type/member construction contract.
//!
//! A [`TypeBuilder`] appends members to one type under construction and hands
//! back ordinary handles ([`FieldRef`], [`MethodRef`], ...), so generated
//! members can be referenced by emitted instructions immediately.

use crate::{
    ConstructorRef, EmitResult, FieldRef, MethodAttributes, MethodRef, PropertyRef, TypeRef,
};

/// Declaration of a method to add to a type under construction.
///
/// # Example
///
/// ```ignore
/// let populate = builder.define_method(
///     MethodDecl::new("Populate", &core.void)
///         .param(&service_provider)
///         .param(&target)
///         .public()
///         .static_method(),
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub name: String,
    pub return_type: TypeRef,
    pub params: Vec<TypeRef>,
    pub is_public: bool,
    pub is_static: bool,
    pub is_interface_impl: bool,
    pub overrides: Option<MethodRef>,
}

impl MethodDecl {
    pub fn new(name: &str, return_type: &TypeRef) -> Self {
        Self {
            name: name.to_string(),
            return_type: return_type.clone(),
            params: Vec::new(),
            is_public: false,
            is_static: false,
            is_interface_impl: false,
            overrides: None,
        }
    }

    pub fn param(mut self, ty: &TypeRef) -> Self {
        self.params.push(ty.clone());
        self
    }

    pub fn params(mut self, types: &[TypeRef]) -> Self {
        self.params.extend_from_slice(types);
        self
    }

    pub fn public(mut self) -> Self {
        self.is_public = true;
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Implements an interface method; gets its own virtual slot.
    pub fn interface_impl(mut self) -> Self {
        self.is_interface_impl = true;
        self
    }

    /// Explicitly overrides `target`.
    pub fn overriding(mut self, target: &MethodRef) -> Self {
        self.overrides = Some(target.clone());
        self
    }

    /// Metadata attributes implied by this declaration.
    pub fn attributes(&self) -> MethodAttributes {
        let mut attrs = if self.is_public {
            MethodAttributes::PUBLIC
        } else {
            MethodAttributes::PRIVATE
        };
        if self.is_static {
            attrs |= MethodAttributes::STATIC;
        }
        if self.is_interface_impl {
            attrs |= MethodAttributes::NEW_SLOT | MethodAttributes::VIRTUAL;
        }
        attrs
    }
}

/// Appends members to a type under construction.
pub trait TypeBuilder {
    /// Handle of the type being built.
    fn type_ref(&self) -> &TypeRef;

    fn define_field(
        &mut self,
        ty: &TypeRef,
        name: &str,
        is_public: bool,
        is_static: bool,
    ) -> EmitResult<FieldRef>;

    fn define_method(&mut self, decl: MethodDecl) -> EmitResult<MethodRef>;

    fn define_property(
        &mut self,
        ty: &TypeRef,
        name: &str,
        setter: Option<&MethodRef>,
        getter: Option<&MethodRef>,
    ) -> EmitResult<PropertyRef>;

    /// Static constructors take no parameters. Instance constructors are public.
    fn define_constructor(
        &mut self,
        is_static: bool,
        params: &[TypeRef],
    ) -> EmitResult<ConstructorRef>;

    /// Record that the type implements `interface`.
    ///
    /// The interface becomes visible through every clone of [`type_ref`](Self::type_ref).
    fn add_interface_implementation(&mut self, interface: &TypeRef) -> EmitResult<()>;

    /// Define a type nested inside this one.
    fn define_sub_type(&mut self, base: &TypeRef, name: &str, is_public: bool) -> EmitResult<Self>
    where
        Self: Sized;

    /// Finish the type and return it as an ordinary handle.
    fn create_type(&mut self) -> EmitResult<TypeRef>;
}
