//! Metadata tokens and the module's reference tables.
//!
//! Anything an instruction refers to is turned into a [`Token`] when it is
//! emitted. Definitions of the module itself map to their definition row;
//! everything else is imported once into [`ImportTables`] and shared by
//! every method body of the module.

use std::fmt;

use markup_codegen_core::{
    ConstructorRef, FieldRef, MethodRef, ModuleId, TypeHash, TypeOrigin, TypeRef,
};
use rustc_hash::FxHashMap;
use tracing::trace;

/// A module-scoped reference to a definition or an imported entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Token {
    /// Type defined in this module.
    TypeDef(u32),
    /// Type defined elsewhere.
    TypeRef(u32),
    /// Generic instantiation.
    TypeSpec(u32),
    /// Field defined in this module.
    FieldDef(u32),
    /// Method or constructor defined in this module.
    MethodDef(u32),
    /// Field, method or constructor of a type defined elsewhere.
    MemberRef(u32),
    /// Entry in the user string heap.
    String(u32),
}

impl Token {
    /// Row index inside the token's table.
    pub fn index(self) -> u32 {
        match self {
            Token::TypeDef(i)
            | Token::TypeRef(i)
            | Token::TypeSpec(i)
            | Token::FieldDef(i)
            | Token::MethodDef(i)
            | Token::MemberRef(i)
            | Token::String(i) => i,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::TypeDef(i) => write!(f, "typedef#{i}"),
            Token::TypeRef(i) => write!(f, "typeref#{i}"),
            Token::TypeSpec(i) => write!(f, "typespec#{i}"),
            Token::FieldDef(i) => write!(f, "fielddef#{i}"),
            Token::MethodDef(i) => write!(f, "methoddef#{i}"),
            Token::MemberRef(i) => write!(f, "memberref#{i}"),
            Token::String(i) => write!(f, "string#{i}"),
        }
    }
}

/// Imported type row.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRefEntry {
    /// Resolution scope: an assembly name or another module.
    pub scope: String,
    pub full_name: String,
    pub hash: TypeHash,
}

/// Generic instantiation row. Arguments are tokens of this module.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeSpecEntry {
    pub definition: Token,
    pub arguments: Vec<Token>,
    pub hash: TypeHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberRefKind {
    Field,
    Method,
    Constructor,
}

/// Imported member row.
///
/// Signature types are tokens of this module, so overloads sharing a name
/// stay distinguishable.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberRefEntry {
    pub parent: Token,
    pub name: String,
    pub kind: MemberRefKind,
    /// Field type for fields, return type for methods, `None` for constructors.
    pub value_type: Option<Token>,
    pub parameters: Vec<Token>,
    pub hash: TypeHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ImportKey {
    Type(TypeHash),
    Member(TypeHash),
    String(String),
}

/// Deduplicated reference tables of one module.
#[derive(Debug, Clone, Default)]
pub struct ImportTables {
    type_refs: Vec<TypeRefEntry>,
    type_specs: Vec<TypeSpecEntry>,
    member_refs: Vec<MemberRefEntry>,
    strings: Vec<String>,
    index: FxHashMap<ImportKey, Token>,
}

impl ImportTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for `ty` as seen from `module`.
    ///
    /// Generic instantiations import their definition and arguments first.
    pub fn import_type(&mut self, module: ModuleId, ty: &TypeRef) -> Token {
        if let TypeOrigin::Module { module: owner, index } = ty.origin()
            && *owner == module
            && !ty.is_generic_instance()
        {
            return Token::TypeDef(*index);
        }

        let key = ImportKey::Type(ty.hash());
        if let Some(&token) = self.index.get(&key) {
            return token;
        }

        let token = match ty.generic_definition() {
            Some(definition) => {
                let definition = self.import_type(module, definition);
                let arguments = ty
                    .generic_arguments()
                    .iter()
                    .map(|arg| self.import_type(module, arg))
                    .collect();
                let token = Token::TypeSpec(self.type_specs.len() as u32);
                self.type_specs.push(TypeSpecEntry {
                    definition,
                    arguments,
                    hash: ty.hash(),
                });
                token
            }
            None => {
                let scope = match ty.origin() {
                    TypeOrigin::External { assembly } => assembly.to_string(),
                    TypeOrigin::Module { module, .. } => module.to_string(),
                };
                let token = Token::TypeRef(self.type_refs.len() as u32);
                self.type_refs.push(TypeRefEntry {
                    scope,
                    full_name: ty.full_name().to_string(),
                    hash: ty.hash(),
                });
                token
            }
        };
        trace!(ty = ty.full_name(), %token, "imported type");
        self.index.insert(key, token);
        token
    }

    pub fn import_field(&mut self, module: ModuleId, field: &FieldRef) -> Token {
        if let Some(def) = field.definition()
            && def.module == module
        {
            return Token::FieldDef(def.index);
        }
        self.import_member(
            module,
            field.declaring_type(),
            field.name(),
            MemberRefKind::Field,
            (Some(field.field_type()), &[]),
            field.hash(),
        )
    }

    pub fn import_method(&mut self, module: ModuleId, method: &MethodRef) -> Token {
        if let Some(def) = method.definition()
            && def.module == module
        {
            return Token::MethodDef(def.index);
        }
        self.import_member(
            module,
            method.declaring_type(),
            method.name(),
            MemberRefKind::Method,
            (Some(method.return_type()), method.parameters()),
            method.hash(),
        )
    }

    pub fn import_constructor(&mut self, module: ModuleId, ctor: &ConstructorRef) -> Token {
        if let Some(def) = ctor.definition()
            && def.module == module
        {
            return Token::MethodDef(def.index);
        }
        self.import_member(
            module,
            ctor.declaring_type(),
            ctor.name(),
            MemberRefKind::Constructor,
            (None, ctor.parameters()),
            ctor.hash(),
        )
    }

    fn import_member(
        &mut self,
        module: ModuleId,
        declaring_type: &TypeRef,
        name: &str,
        kind: MemberRefKind,
        (value_type, parameters): (Option<&TypeRef>, &[TypeRef]),
        hash: TypeHash,
    ) -> Token {
        let key = ImportKey::Member(hash);
        if let Some(&token) = self.index.get(&key) {
            return token;
        }
        let parent = self.import_type(module, declaring_type);
        let value_type = value_type.map(|ty| self.import_type(module, ty));
        let parameters = parameters
            .iter()
            .map(|ty| self.import_type(module, ty))
            .collect();
        let token = Token::MemberRef(self.member_refs.len() as u32);
        self.member_refs.push(MemberRefEntry {
            parent,
            name: name.to_string(),
            kind,
            value_type,
            parameters,
            hash,
        });
        trace!(member = name, %token, "imported member");
        self.index.insert(key, token);
        token
    }

    /// Intern a string literal in the user string heap.
    pub fn intern_string(&mut self, value: &str) -> Token {
        let key = ImportKey::String(value.to_string());
        if let Some(&token) = self.index.get(&key) {
            return token;
        }
        let token = Token::String(self.strings.len() as u32);
        self.strings.push(value.to_string());
        self.index.insert(key, token);
        token
    }

    pub fn type_refs(&self) -> &[TypeRefEntry] {
        &self.type_refs
    }

    pub fn type_specs(&self) -> &[TypeSpecEntry] {
        &self.type_specs
    }

    pub fn member_refs(&self) -> &[MemberRefEntry] {
        &self.member_refs
    }

    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    pub fn string(&self, token: Token) -> Option<&str> {
        match token {
            Token::String(i) => self.strings.get(i as usize).map(String::as_str),
            _ => None,
        }
    }
}
