//! §4.I.6 zero values.

use super::LoweringCtx;
use crate::runtime_contract::RuntimeApi;
use gosuspend_ast::{Type, TypeId};

pub fn zero_value_expr(ctx: &LoweringCtx, ty: TypeId) -> String {
    match ctx.types.get(ty) {
        Type::Bool => "false".to_string(),
        Type::Int { .. } | Type::Float { .. } | Type::Byte | Type::Rune => "0".to_string(),
        Type::Str => "\"\"".to_string(),
        Type::Pointer(_) => "null".to_string(),
        Type::Slice(_) => format!("$.{}([])", RuntimeApi::ARRAY_TO_SLICE),
        Type::Array(elem, len) => {
            let zero_elem = zero_value_expr(ctx, *elem);
            format!(
                "$.{}(Array.from({{ length: {len} }}, () => {zero_elem}))",
                RuntimeApi::ARRAY_TO_SLICE
            )
        }
        Type::Map(_, _) => "new Map()".to_string(),
        Type::Chan(_, _) => "null".to_string(),
        Type::Func(_) => "null".to_string(),
        Type::Interface(_) => "null".to_string(),
        Type::Struct(n) => format!("new {}()", ctx.types.named(*n).name),
        Type::Named(n) => {
            let data = ctx.types.named(*n);
            if data.is_wrapper_type(ctx.types) {
                let inner = zero_value_expr(ctx, data.underlying);
                format!("({inner} as {})", data.name)
            } else {
                zero_value_expr(ctx, data.underlying)
            }
        }
        Type::TypeParam { constraint, .. } => {
            // Open Question 3: a generic zero must not default to `null`
            // when the constraint names concrete basic terms.
            match constraint.union_terms.first() {
                Some(term) => zero_value_expr(ctx, *term),
                None => "null".to_string(),
            }
        }
        Type::UntypedNil => "null".to_string(),
    }
}
