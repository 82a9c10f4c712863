//! Emission configuration.
//!
//! The compiler front end resolves runtime types and hooks once and hands
//! them over as an [`EmitConfiguration`]. Nodes only ever read it.

use std::fmt;
use std::sync::Arc;

use markup_codegen_core::{CoreTypes, EmitError, EmitResult, MethodRef, TypeRef};

/// Runtime types nodes refer to without resolving them.
#[derive(Debug, Clone)]
pub struct WellKnownTypes {
    pub object: TypeRef,
    pub void: TypeRef,
    pub string: TypeRef,
    pub int32: TypeRef,
    pub boolean: TypeRef,
}

impl From<&CoreTypes> for WellKnownTypes {
    fn from(core: &CoreTypes) -> Self {
        Self {
            object: core.object.clone(),
            void: core.void.clone(),
            string: core.string.clone(),
            int32: core.int32.clone(),
            boolean: core.boolean.clone(),
        }
    }
}

/// The two-phase initialization interface and its begin hook.
#[derive(Debug, Clone)]
pub struct SupportInitialize {
    hook_type: TypeRef,
    begin_init: MethodRef,
}

impl SupportInitialize {
    /// Fails if `begin_init` is not declared on `hook_type`.
    pub fn new(hook_type: &TypeRef, begin_init: &MethodRef) -> EmitResult<Self> {
        if begin_init.declaring_type() != hook_type {
            return Err(EmitError::InitHookMismatch {
                hook_type: hook_type.to_string(),
                method: begin_init.to_string(),
            });
        }
        Ok(Self {
            hook_type: hook_type.clone(),
            begin_init: begin_init.clone(),
        })
    }

    pub fn hook_type(&self) -> &TypeRef {
        &self.hook_type
    }

    pub fn begin_init(&self) -> &MethodRef {
        &self.begin_init
    }
}

/// Narrows which values get the initialization hook.
///
/// Called with the hook type and the value type, and only for value types
/// that already implement the hook type.
pub type InitHookPredicate = Arc<dyn Fn(&TypeRef, &TypeRef) -> bool + Send + Sync>;

/// Type mapping lookups consumed during emission.
#[derive(Clone)]
pub struct TypeMappings {
    pub support_initialize: Option<SupportInitialize>,
    init_predicate: Option<InitHookPredicate>,
}

impl TypeMappings {
    pub fn new() -> Self {
        Self {
            support_initialize: None,
            init_predicate: None,
        }
    }

    /// The begin hook to call on values of `value_type`, if any.
    ///
    /// The value type must implement the hook type whatever the predicate says.
    pub fn begin_init_for(&self, value_type: &TypeRef) -> Option<&MethodRef> {
        let support = self.support_initialize.as_ref()?;
        let hook = support.hook_type();
        let enabled = hook.is_assignable_from(value_type)
            && self
                .init_predicate
                .as_ref()
                .is_none_or(|predicate| predicate(hook, value_type));
        enabled.then(|| support.begin_init())
    }
}

impl Default for TypeMappings {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeMappings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeMappings")
            .field("support_initialize", &self.support_initialize)
            .finish_non_exhaustive()
    }
}

/// Everything nodes read from the compiler during emission.
///
/// # Example
///
/// ```ignore
/// let config = EmitConfiguration::new(module.core_types())
///     .with_support_initialize(SupportInitialize::new(&isupport_init, &begin_init)?);
/// ```
#[derive(Debug, Clone)]
pub struct EmitConfiguration {
    pub well_known: WellKnownTypes,
    pub mappings: TypeMappings,
}

impl EmitConfiguration {
    pub fn new(core: &CoreTypes) -> Self {
        Self {
            well_known: WellKnownTypes::from(core),
            mappings: TypeMappings::new(),
        }
    }

    pub fn with_support_initialize(mut self, support: SupportInitialize) -> Self {
        self.mappings.support_initialize = Some(support);
        self
    }

    /// Restrict the initialization hook to the implementing types `predicate`
    /// accepts.
    pub fn with_init_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&TypeRef, &TypeRef) -> bool + Send + Sync + 'static,
    {
        self.mappings.init_predicate = Some(Arc::new(predicate));
        self
    }
}
