//! What a node reports after emitting itself.

use markup_codegen_core::TypeRef;

/// Stack effect of one node emission.
///
/// `consumed` counts ambient stack items the node popped; `return_type` is
/// the type of the single value it left behind, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEmitResult {
    pub consumed: u32,
    pub return_type: Option<TypeRef>,
}

impl NodeEmitResult {
    /// One value of type `ty`, nothing consumed.
    pub fn value(ty: TypeRef) -> Self {
        Self {
            consumed: 0,
            return_type: Some(ty),
        }
    }

    /// No value left, `consumed` ambient items taken.
    pub fn void(consumed: u32) -> Self {
        Self {
            consumed,
            return_type: None,
        }
    }

    pub fn produces_value(&self) -> bool {
        self.return_type.is_some()
    }

    /// Net change of the stack height.
    pub fn stack_delta(&self) -> i32 {
        i32::from(self.produces_value()) - self.consumed as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use markup_codegen_core::TypeKind;

    #[test]
    fn stack_delta() {
        let ty = TypeRef::external("Controls", "Controls.Button", TypeKind::Class);
        assert_eq!(NodeEmitResult::value(ty).stack_delta(), 1);
        assert_eq!(NodeEmitResult::void(0).stack_delta(), 0);
        assert_eq!(NodeEmitResult::void(1).stack_delta(), -1);
        assert!(!NodeEmitResult::void(1).produces_value());
    }
}
