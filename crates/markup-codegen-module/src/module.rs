//! The module under construction.
//!
//! [`ModuleDef`] owns every table a generated module consists of: type,
//! field, method and property definitions, the deduplicated reference
//! tables, and the debug document cache. Builders and emitters borrow the
//! module and write through it, so any number of them can be live at once.

use std::sync::Arc;

use markup_codegen_core::{
    ConstructorRef, CoreTypes, EmitError, EmitResult, FieldAttributes, FieldRef, MemberDef,
    MethodAttributes, MethodRef, ModuleId, TypeAttributes, TypeDescriptor, TypeKind,
    TypeOrigin, TypeRef, TypeVisibility,
};
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard};
use tracing::debug;

use crate::body::MethodBody;
use crate::documents::{Document, DocumentCache};
use crate::emitter::ModuleEmitter;
use crate::tokens::{ImportTables, Token};
use crate::type_builder::ModuleTypeBuilder;

// ============================================================================
// Definition rows
// ============================================================================

#[derive(Debug, Clone)]
pub struct TypeDef {
    pub type_ref: TypeRef,
    pub namespace: String,
    pub name: String,
    pub attributes: TypeAttributes,
    pub visibility: TypeVisibility,
    pub base: Option<TypeRef>,
    /// Enclosing type definition for nested types.
    pub declaring: Option<u32>,
    pub interfaces: Vec<TypeRef>,
    pub fields: Vec<u32>,
    pub methods: Vec<u32>,
    pub properties: Vec<u32>,
    pub nested: Vec<u32>,
    /// Set once the builder finished the type.
    pub created: bool,
}

#[derive(Debug, Clone)]
pub struct FieldDef {
    pub declaring: u32,
    pub name: String,
    pub field_type: TypeRef,
    pub attributes: FieldAttributes,
}

/// A method or constructor definition.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub declaring: u32,
    pub name: String,
    pub return_type: TypeRef,
    pub params: Vec<TypeRef>,
    pub attributes: MethodAttributes,
    /// Methods this definition explicitly overrides.
    pub overrides: Vec<MethodRef>,
    pub is_constructor: bool,
    pub body: Option<MethodBody>,
}

impl MethodDef {
    pub fn is_static(&self) -> bool {
        self.attributes.contains(MethodAttributes::STATIC)
    }
}

#[derive(Debug, Clone)]
pub struct PropertyDef {
    pub declaring: u32,
    pub name: String,
    pub property_type: TypeRef,
    pub getter: Option<MethodRef>,
    pub setter: Option<MethodRef>,
}

/// Something that owns a method body.
#[derive(Debug, Clone)]
pub enum BodyOwner {
    Method(MethodRef),
    Constructor(ConstructorRef),
}

impl BodyOwner {
    fn definition(&self) -> Option<MemberDef> {
        match self {
            BodyOwner::Method(m) => m.definition(),
            BodyOwner::Constructor(c) => c.definition(),
        }
    }

    fn describe(&self) -> String {
        match self {
            BodyOwner::Method(m) => m.to_string(),
            BodyOwner::Constructor(c) => c.to_string(),
        }
    }
}

impl From<&MethodRef> for BodyOwner {
    fn from(method: &MethodRef) -> Self {
        BodyOwner::Method(method.clone())
    }
}

impl From<&ConstructorRef> for BodyOwner {
    fn from(ctor: &ConstructorRef) -> Self {
        BodyOwner::Constructor(ctor.clone())
    }
}

#[derive(Debug, Default)]
struct ModuleTables {
    types: Vec<TypeDef>,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    properties: Vec<PropertyDef>,
    imports: ImportTables,
}

// ============================================================================
// Module
// ============================================================================

/// A module under construction.
#[derive(Debug)]
pub struct ModuleDef {
    id: ModuleId,
    name: String,
    core: CoreTypes,
    tables: RwLock<ModuleTables>,
    documents: DocumentCache,
}

impl ModuleDef {
    pub fn new(name: &str, core: CoreTypes) -> Self {
        let id = ModuleId::next();
        debug!(module = name, %id, "created module");
        Self {
            id,
            name: name.to_string(),
            core,
            tables: RwLock::new(ModuleTables::default()),
            documents: DocumentCache::new(),
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn core_types(&self) -> &CoreTypes {
        &self.core
    }

    /// Define a top-level type.
    ///
    /// Types without an explicit base derive from the root object type,
    /// except interfaces. Nested visibilities are reserved for
    /// [`markup_codegen_core::TypeBuilder::define_sub_type`].
    pub fn define_type(
        &self,
        namespace: &str,
        name: &str,
        base: Option<&TypeRef>,
        attributes: TypeAttributes,
        visibility: TypeVisibility,
    ) -> EmitResult<ModuleTypeBuilder<'_>> {
        if visibility.is_nested() {
            return Err(EmitError::InvalidDefinition {
                message: format!("top-level type '{name}' cannot use {visibility:?} visibility"),
            });
        }
        self.add_type(namespace, name, base, attributes, visibility, None)
    }

    pub(crate) fn add_type(
        &self,
        namespace: &str,
        name: &str,
        base: Option<&TypeRef>,
        attributes: TypeAttributes,
        visibility: TypeVisibility,
        declaring: Option<(u32, &TypeRef)>,
    ) -> EmitResult<ModuleTypeBuilder<'_>> {
        if name.is_empty() {
            return Err(EmitError::InvalidDefinition {
                message: "type name must not be empty".to_string(),
            });
        }
        let is_interface = attributes.contains(TypeAttributes::INTERFACE);
        let base = match base {
            Some(base) => Some(base.clone()),
            None if is_interface => None,
            None => Some(self.core.object.clone()),
        };
        let full_name = match declaring {
            Some((_, outer)) => format!("{}+{}", outer.full_name(), name),
            None if namespace.is_empty() => name.to_string(),
            None => format!("{namespace}.{name}"),
        };

        let mut tables = self.tables.write();
        let index = tables.types.len() as u32;
        let type_ref = TypeRef::new(TypeDescriptor {
            full_name,
            kind: if is_interface {
                TypeKind::Interface
            } else {
                TypeKind::Class
            },
            origin: TypeOrigin::Module {
                module: self.id,
                index,
            },
            base: base.clone(),
            declaring_type: declaring.map(|(_, outer)| outer.clone()),
            interfaces: Vec::new(),
        });
        if let Some(base) = &base {
            tables.imports.import_type(self.id, base);
        }
        tables.types.push(TypeDef {
            type_ref: type_ref.clone(),
            namespace: if declaring.is_some() {
                String::new()
            } else {
                namespace.to_string()
            },
            name: name.to_string(),
            attributes,
            visibility,
            base,
            declaring: declaring.map(|(outer, _)| outer),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            properties: Vec::new(),
            nested: Vec::new(),
            created: false,
        });
        if let Some((outer, _)) = declaring {
            tables.types[outer as usize].nested.push(index);
        }
        drop(tables);

        debug!(ty = type_ref.full_name(), index, "defined type");
        Ok(ModuleTypeBuilder::new(self, index, type_ref))
    }

    pub(crate) fn add_field(
        &self,
        declaring: u32,
        owner: &TypeRef,
        field_type: &TypeRef,
        name: &str,
        attributes: FieldAttributes,
    ) -> FieldRef {
        let mut tables = self.tables.write();
        let index = tables.fields.len() as u32;
        tables.imports.import_type(self.id, field_type);
        tables.fields.push(FieldDef {
            declaring,
            name: name.to_string(),
            field_type: field_type.clone(),
            attributes,
        });
        tables.types[declaring as usize].fields.push(index);
        debug!(field = name, owner = owner.full_name(), "defined field");
        FieldRef::defined(owner, name, field_type, attributes, MemberDef::new(self.id, index))
    }

    pub(crate) fn add_method(&self, declaring: u32, row: MethodDef) -> u32 {
        let mut tables = self.tables.write();
        let index = tables.methods.len() as u32;
        tables.imports.import_type(self.id, &row.return_type);
        for param in &row.params {
            tables.imports.import_type(self.id, param);
        }
        for target in &row.overrides {
            tables.imports.import_method(self.id, target);
        }
        debug!(method = %row.name, index, "defined method");
        tables.methods.push(row);
        tables.types[declaring as usize].methods.push(index);
        index
    }

    pub(crate) fn add_property(&self, declaring: u32, row: PropertyDef) -> u32 {
        let mut tables = self.tables.write();
        let index = tables.properties.len() as u32;
        tables.imports.import_type(self.id, &row.property_type);
        debug!(property = %row.name, index, "defined property");
        tables.properties.push(row);
        tables.types[declaring as usize].properties.push(index);
        index
    }

    pub(crate) fn add_interface(&self, declaring: u32, interface: &TypeRef) {
        let mut tables = self.tables.write();
        tables.imports.import_type(self.id, interface);
        let interfaces = &mut tables.types[declaring as usize].interfaces;
        if !interfaces.contains(interface) {
            interfaces.push(interface.clone());
        }
    }

    pub(crate) fn mark_created(&self, index: u32) {
        self.tables.write().types[index as usize].created = true;
    }

    // ========================================================================
    // Bodies
    // ========================================================================

    /// Open an emitter for the body of a method or constructor defined here.
    pub fn emitter(&self, owner: impl Into<BodyOwner>) -> EmitResult<ModuleEmitter<'_>> {
        let owner = owner.into();
        let index = self.own_definition(&owner)?;
        let tables = self.tables.read();
        let method = tables
            .methods
            .get(index as usize)
            .ok_or_else(|| EmitError::ForeignMember {
                member: owner.describe(),
                module: self.name.clone(),
            })?;
        if method.body.is_some() {
            return Err(EmitError::BodyAlreadyFinalized {
                method: owner.describe(),
            });
        }
        let has_this = !method.is_static();
        let param_count = method.params.len();
        drop(tables);
        Ok(ModuleEmitter::new(
            self,
            index,
            owner.describe(),
            has_this,
            param_count,
        ))
    }

    /// Finalized body of a method or constructor, if one was installed.
    pub fn body(&self, owner: impl Into<BodyOwner>) -> Option<MethodBody> {
        let index = self.own_definition(&owner.into()).ok()?;
        self.tables.read().methods.get(index as usize)?.body.clone()
    }

    pub(crate) fn install_body(&self, index: u32, name: &str, body: MethodBody) -> EmitResult<()> {
        let mut tables = self.tables.write();
        let slot = &mut tables.methods[index as usize].body;
        if slot.is_some() {
            return Err(EmitError::BodyAlreadyFinalized {
                method: name.to_string(),
            });
        }
        debug!(
            method = name,
            instructions = body.len(),
            code_size = body.code_size,
            sequence_points = body.debug.sequence_points.len(),
            "installed method body"
        );
        *slot = Some(body);
        Ok(())
    }

    fn own_definition(&self, owner: &BodyOwner) -> EmitResult<u32> {
        match owner.definition() {
            Some(def) if def.module == self.id => Ok(def.index),
            _ => Err(EmitError::ForeignMember {
                member: owner.describe(),
                module: self.name.clone(),
            }),
        }
    }

    // ========================================================================
    // Imports
    // ========================================================================

    pub fn import_type(&self, ty: &TypeRef) -> Token {
        self.tables.write().imports.import_type(self.id, ty)
    }

    pub fn import_field(&self, field: &FieldRef) -> Token {
        self.tables.write().imports.import_field(self.id, field)
    }

    pub fn import_method(&self, method: &MethodRef) -> Token {
        self.tables.write().imports.import_method(self.id, method)
    }

    pub fn import_constructor(&self, ctor: &ConstructorRef) -> Token {
        self.tables.write().imports.import_constructor(self.id, ctor)
    }

    pub(crate) fn with_imports<R>(&self, f: impl FnOnce(&mut ImportTables, ModuleId) -> R) -> R {
        f(&mut self.tables.write().imports, self.id)
    }

    // ========================================================================
    // Read access
    // ========================================================================

    pub fn types(&self) -> MappedRwLockReadGuard<'_, [TypeDef]> {
        RwLockReadGuard::map(self.tables.read(), |t| t.types.as_slice())
    }

    pub fn fields(&self) -> MappedRwLockReadGuard<'_, [FieldDef]> {
        RwLockReadGuard::map(self.tables.read(), |t| t.fields.as_slice())
    }

    pub fn methods(&self) -> MappedRwLockReadGuard<'_, [MethodDef]> {
        RwLockReadGuard::map(self.tables.read(), |t| t.methods.as_slice())
    }

    pub fn properties(&self) -> MappedRwLockReadGuard<'_, [PropertyDef]> {
        RwLockReadGuard::map(self.tables.read(), |t| t.properties.as_slice())
    }

    pub fn imports(&self) -> MappedRwLockReadGuard<'_, ImportTables> {
        RwLockReadGuard::map(self.tables.read(), |t| &t.imports)
    }

    /// Method definition behind a handle from this module.
    pub fn method_def(&self, method: &MethodRef) -> Option<MethodDef> {
        let index = self.own_definition(&BodyOwner::from(method)).ok()?;
        self.tables.read().methods.get(index as usize).cloned()
    }

    /// Debug documents referenced by this module, ordered by path.
    pub fn documents(&self) -> Vec<Arc<Document>> {
        self.documents.snapshot()
    }

    pub fn document_cache(&self) -> &DocumentCache {
        &self.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_codegen_core::{MethodDecl, TypeBuilder};

    #[test]
    fn define_type_defaults_base_to_object() {
        let module = ModuleDef::new("Generated", CoreTypes::default());
        let builder = module
            .define_type(
                "App.Views",
                "MainView",
                None,
                TypeAttributes::empty(),
                TypeVisibility::Public,
            )
            .unwrap();
        let ty = builder.type_ref().clone();

        assert_eq!(ty.full_name(), "App.Views.MainView");
        assert_eq!(ty.module(), Some(module.id()));
        assert_eq!(ty.base_type(), Some(&module.core_types().object));
        assert_eq!(module.types().len(), 1);
        assert_eq!(module.import_type(&ty), Token::TypeDef(0));
    }

    #[test]
    fn interfaces_have_no_base() {
        let module = ModuleDef::new("Generated", CoreTypes::default());
        let builder = module
            .define_type(
                "App",
                "IProvider",
                None,
                TypeAttributes::INTERFACE,
                TypeVisibility::Public,
            )
            .unwrap();
        assert!(builder.type_ref().is_interface());
        assert!(builder.type_ref().base_type().is_none());
    }

    #[test]
    fn empty_type_name_rejected() {
        let module = ModuleDef::new("Generated", CoreTypes::default());
        assert!(matches!(
            module.define_type("App", "", None, TypeAttributes::empty(), TypeVisibility::Public),
            Err(EmitError::InvalidDefinition { .. })
        ));
    }

    #[test]
    fn top_level_visibility_is_recorded() {
        let module = ModuleDef::new("Generated", CoreTypes::default());
        module
            .define_type("App", "Cache", None, TypeAttributes::SEALED, TypeVisibility::NotPublic)
            .unwrap();
        assert_eq!(module.types()[0].visibility, TypeVisibility::NotPublic);

        assert!(matches!(
            module.define_type(
                "App",
                "Inner",
                None,
                TypeAttributes::empty(),
                TypeVisibility::NestedPublic,
            ),
            Err(EmitError::InvalidDefinition { .. })
        ));
        assert_eq!(module.types().len(), 1);
    }

    #[test]
    fn emitter_rejects_foreign_methods() {
        let module = ModuleDef::new("Generated", CoreTypes::default());
        let core = module.core_types().clone();
        let external = MethodRef::new(
            &core.string,
            "Concat",
            &core.string,
            &[],
            MethodAttributes::PUBLIC | MethodAttributes::STATIC,
        );
        assert!(matches!(
            module.emitter(&external),
            Err(EmitError::ForeignMember { .. })
        ));

        let other = ModuleDef::new("Other", CoreTypes::default());
        let mut builder = other
            .define_type("App", "Helper", None, TypeAttributes::empty(), TypeVisibility::NotPublic)
            .unwrap();
        let method = builder
            .define_method(MethodDecl::new("Run", &core.void).static_method())
            .unwrap();
        assert!(module.emitter(&method).is_err());
        assert!(other.emitter(&method).is_ok());
    }

    #[test]
    fn method_signature_types_are_imported() {
        let module = ModuleDef::new("Generated", CoreTypes::default());
        let core = module.core_types().clone();
        let mut builder = module
            .define_type("App", "Loader", None, TypeAttributes::empty(), TypeVisibility::Public)
            .unwrap();
        builder
            .define_method(
                MethodDecl::new("Load", &core.void)
                    .param(&core.string)
                    .public(),
            )
            .unwrap();

        let imports = module.imports();
        let names: Vec<&str> = imports
            .type_refs()
            .iter()
            .map(|t| t.full_name.as_str())
            .collect();
        assert!(names.contains(&"System.Object"));
        assert!(names.contains(&"System.Void"));
        assert!(names.contains(&"System.String"));
    }
}
