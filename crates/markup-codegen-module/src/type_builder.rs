//! [`TypeBuilder`] implementation for types defined in a [`ModuleDef`].

use markup_codegen_core::{
    ConstructorRef, EmitError, EmitResult, FieldAttributes, FieldRef, MemberDef, MethodAttributes,
    MethodDecl, MethodRef, PropertyRef, TypeAttributes, TypeBuilder, TypeRef, TypeVisibility,
};
use tracing::debug;

use crate::module::{MethodDef, ModuleDef, PropertyDef};

/// Builder for one type definition of a module.
#[derive(Debug, Clone)]
pub struct ModuleTypeBuilder<'m> {
    module: &'m ModuleDef,
    index: u32,
    ty: TypeRef,
}

impl<'m> ModuleTypeBuilder<'m> {
    pub(crate) fn new(module: &'m ModuleDef, index: u32, ty: TypeRef) -> Self {
        Self { module, index, ty }
    }

    /// Row of the type in the module's type table.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn module(&self) -> &'m ModuleDef {
        self.module
    }

    fn member(&self, index: u32) -> MemberDef {
        MemberDef::new(self.module.id(), index)
    }

    fn check_name(&self, kind: &str, name: &str) -> EmitResult<()> {
        if name.is_empty() {
            return Err(EmitError::InvalidDefinition {
                message: format!("{kind} on '{}' must have a name", self.ty),
            });
        }
        Ok(())
    }
}

impl TypeBuilder for ModuleTypeBuilder<'_> {
    fn type_ref(&self) -> &TypeRef {
        &self.ty
    }

    fn define_field(
        &mut self,
        ty: &TypeRef,
        name: &str,
        is_public: bool,
        is_static: bool,
    ) -> EmitResult<FieldRef> {
        self.check_name("field", name)?;
        let mut attributes = if is_public {
            FieldAttributes::PUBLIC
        } else {
            FieldAttributes::PRIVATE
        };
        if is_static {
            attributes |= FieldAttributes::STATIC;
        }
        Ok(self
            .module
            .add_field(self.index, &self.ty, ty, name, attributes))
    }

    fn define_method(&mut self, decl: MethodDecl) -> EmitResult<MethodRef> {
        self.check_name("method", &decl.name)?;
        let attributes = decl.attributes();
        let index = self.module.add_method(
            self.index,
            MethodDef {
                declaring: self.index,
                name: decl.name.clone(),
                return_type: decl.return_type.clone(),
                params: decl.params.clone(),
                attributes,
                overrides: decl.overrides.into_iter().collect(),
                is_constructor: false,
                body: None,
            },
        );
        Ok(MethodRef::defined(
            &self.ty,
            &decl.name,
            &decl.return_type,
            &decl.params,
            attributes,
            self.member(index),
        ))
    }

    fn define_property(
        &mut self,
        ty: &TypeRef,
        name: &str,
        setter: Option<&MethodRef>,
        getter: Option<&MethodRef>,
    ) -> EmitResult<PropertyRef> {
        self.check_name("property", name)?;
        for accessor in setter.iter().chain(getter.iter()) {
            if accessor.declaring_type() != &self.ty {
                return Err(EmitError::InvalidDefinition {
                    message: format!(
                        "accessor '{accessor}' of property '{name}' is not declared on '{}'",
                        self.ty
                    ),
                });
            }
        }
        let index = self.module.add_property(
            self.index,
            PropertyDef {
                declaring: self.index,
                name: name.to_string(),
                property_type: ty.clone(),
                getter: getter.cloned(),
                setter: setter.cloned(),
            },
        );
        Ok(PropertyRef::defined(
            &self.ty,
            name,
            ty,
            getter,
            setter,
            self.member(index),
        ))
    }

    fn define_constructor(
        &mut self,
        is_static: bool,
        params: &[TypeRef],
    ) -> EmitResult<ConstructorRef> {
        if is_static && !params.is_empty() {
            return Err(EmitError::InvalidDefinition {
                message: format!("static constructor of '{}' cannot take parameters", self.ty),
            });
        }
        let mut attributes = MethodAttributes::HIDE_BY_SIG
            | MethodAttributes::SPECIAL_NAME
            | MethodAttributes::RT_SPECIAL_NAME;
        attributes |= if is_static {
            MethodAttributes::STATIC
        } else {
            MethodAttributes::PUBLIC
        };
        let index = self.module.add_method(
            self.index,
            MethodDef {
                declaring: self.index,
                name: if is_static { ".cctor" } else { ".ctor" }.to_string(),
                return_type: self.module.core_types().void.clone(),
                params: params.to_vec(),
                attributes,
                overrides: Vec::new(),
                is_constructor: true,
                body: None,
            },
        );
        Ok(ConstructorRef::defined(
            &self.ty,
            params,
            is_static,
            self.member(index),
        ))
    }

    fn add_interface_implementation(&mut self, interface: &TypeRef) -> EmitResult<()> {
        if !interface.is_interface() {
            return Err(EmitError::InvalidDefinition {
                message: format!("'{interface}' is not an interface"),
            });
        }
        self.module.add_interface(self.index, interface);
        self.ty.add_interface(interface);
        debug!(ty = self.ty.full_name(), interface = interface.full_name(), "added interface");
        Ok(())
    }

    fn define_sub_type(&mut self, base: &TypeRef, name: &str, is_public: bool) -> EmitResult<Self> {
        let visibility = if is_public {
            TypeVisibility::NestedPublic
        } else {
            TypeVisibility::NestedPrivate
        };
        self.module.add_type(
            "",
            name,
            Some(base),
            TypeAttributes::empty(),
            visibility,
            Some((self.index, &self.ty)),
        )
    }

    fn create_type(&mut self) -> EmitResult<TypeRef> {
        self.module.mark_created(self.index);
        Ok(self.ty.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_codegen_core::{CoreTypes, TypeKind};

    fn module() -> ModuleDef {
        ModuleDef::new("Generated", CoreTypes::default())
    }

    #[test]
    fn fields_carry_visibility_and_storage() {
        let module = module();
        let string = module.core_types().string.clone();
        let mut builder = module
            .define_type("App", "Holder", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();

        let field = builder.define_field(&string, "Title", true, true).unwrap();
        assert!(field.is_public());
        assert!(field.is_static());
        assert_eq!(field.declaring_type(), builder.type_ref());
        assert_eq!(module.fields()[0].name, "Title");
        assert_eq!(module.types()[0].fields, vec![0]);
    }

    #[test]
    fn interface_impl_gets_new_virtual_slot_and_override() {
        let module = module();
        let core = module.core_types().clone();
        let provider = TypeRef::external("App.Abstractions", "App.IProvider", TypeKind::Interface);
        let provide = MethodRef::new(
            &provider,
            "Provide",
            &core.object,
            &[],
            MethodAttributes::PUBLIC | MethodAttributes::VIRTUAL | MethodAttributes::ABSTRACT,
        );
        let mut builder = module
            .define_type("App", "Provider", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();

        let method = builder
            .define_method(
                MethodDecl::new("App.IProvider.Provide", &core.object)
                    .interface_impl()
                    .overriding(&provide),
            )
            .unwrap();

        assert!(method.is_virtual());
        assert!(method.attributes().contains(MethodAttributes::NEW_SLOT));
        let def = module.method_def(&method).unwrap();
        assert_eq!(def.overrides, vec![provide]);
        assert_eq!(module.imports().member_refs().len(), 1);
    }

    #[test]
    fn constructors() {
        let module = module();
        let int = module.core_types().int32.clone();
        let mut builder = module
            .define_type("App", "Widget", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();

        let ctor = builder.define_constructor(false, &[int.clone()]).unwrap();
        assert_eq!(ctor.name(), ".ctor");
        assert!(!ctor.is_static());

        let cctor = builder.define_constructor(true, &[]).unwrap();
        assert_eq!(cctor.name(), ".cctor");

        let methods = module.methods();
        assert!(methods[0].is_constructor);
        assert!(methods[0].attributes.contains(
            MethodAttributes::PUBLIC | MethodAttributes::SPECIAL_NAME | MethodAttributes::RT_SPECIAL_NAME
        ));
        assert!(methods[1].is_static());
        assert!(!methods[1].attributes.contains(MethodAttributes::PUBLIC));
        assert_eq!(methods[1].return_type, module.core_types().void);
    }

    #[test]
    fn static_constructor_rejects_parameters() {
        let module = module();
        let int = module.core_types().int32.clone();
        let mut builder = module
            .define_type("App", "Widget", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();
        assert!(matches!(
            builder.define_constructor(true, &[int]),
            Err(EmitError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn interface_list_updates_through_handle() {
        let module = module();
        let init = TypeRef::external("System.ComponentModel", "System.ComponentModel.ISupportInitialize", TypeKind::Interface);
        let mut builder = module
            .define_type("App", "Panel", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();
        let handle = builder.type_ref().clone();

        assert!(!init.is_assignable_from(&handle));
        builder.add_interface_implementation(&init).unwrap();
        assert!(init.is_assignable_from(&handle));
        assert_eq!(module.types()[0].interfaces, vec![init.clone()]);

        let string = module.core_types().string.clone();
        assert!(builder.add_interface_implementation(&string).is_err());
    }

    #[test]
    fn nested_types() {
        let module = module();
        let object = module.core_types().object.clone();
        let mut outer = module
            .define_type("App", "Outer", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();

        let mut inner = outer.define_sub_type(&object, "Closure", false).unwrap();
        let inner_ty = inner.create_type().unwrap();
        let mut nested_again = inner.define_sub_type(&object, "Deeper", true).unwrap();
        nested_again.create_type().unwrap();

        assert_eq!(inner_ty.full_name(), "App.Outer+Closure");
        assert_eq!(inner_ty.namespace(), "");
        assert_eq!(inner_ty.declaring_type(), Some(outer.type_ref()));

        let types = module.types();
        assert_eq!(types.len(), 3);
        assert_eq!(types[1].visibility, TypeVisibility::NestedPrivate);
        assert_eq!(types[2].visibility, TypeVisibility::NestedPublic);
        assert_eq!(types[0].nested, vec![1]);
        assert_eq!(types[1].nested, vec![2]);
        assert!(types[1].created);
        assert!(!types[0].created);
    }

    #[test]
    fn property_accessors_must_belong_to_type() {
        let module = module();
        let core = module.core_types().clone();
        let mut builder = module
            .define_type("App", "Bag", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();
        let getter = builder
            .define_method(MethodDecl::new("get_Count", &core.int32).public())
            .unwrap();

        let prop = builder
            .define_property(&core.int32, "Count", None, Some(&getter))
            .unwrap();
        assert_eq!(prop.getter(), Some(&getter));
        assert_eq!(module.properties()[0].name, "Count");

        let foreign = MethodRef::new(&core.string, "get_Length", &core.int32, &[], MethodAttributes::PUBLIC);
        assert!(builder
            .define_property(&core.int32, "Length", None, Some(&foreign))
            .is_err());
    }
}
