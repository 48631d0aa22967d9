//! §4.I.2 composite literals.

use super::selectors::lower_expr;
use super::zero_value::zero_value_expr;
use super::LoweringCtx;
use crate::error::{Error, LoweringErrorKind, Pos, Result};
use crate::runtime_contract::RuntimeApi;
use gosuspend_ast::{CompositeLitKind, Expr, Type, TypeId};

fn field_name(name: &str) -> String {
    // Protobuf PascalCase->camelCase rewriting (§4.I.2) needs a companion
    // `.pb.ts` schema to tell a protobuf record from an ordinary one; the
    // in-memory AST carries no such marker, so every field keeps its source
    // casing here. See DESIGN.md.
    name.to_string()
}

fn elem_type_of(ty: TypeId, types: &gosuspend_ast::TypeArena) -> TypeId {
    match types.get(ty) {
        Type::Slice(e) | Type::Array(e, _) => *e,
        _ => ty,
    }
}

pub fn lower_composite(ctx: &LoweringCtx, expr: &Expr, inside_address_of: bool) -> Result<String> {
    let (ty, kind) = match expr {
        Expr::CompositeLit { ty, kind, .. } => (*ty, kind),
        _ => {
            return Err(Error::Lowering {
                pos: Pos { file: ctx.package_path.to_string(), line: 0, column: 0 },
                kind: LoweringErrorKind::UnsupportedCompositeLiteral("not a composite literal".into()),
            })
        }
    };

    match kind {
        CompositeLitKind::Map(entries) => {
            let pairs = entries
                .iter()
                .map(|(k, v)| Ok(format!("[{}, {}]", lower_expr(ctx, k)?, lower_expr(ctx, v)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("new Map([{}])", pairs.join(", ")))
        }
        CompositeLitKind::ByteSlice(bytes) => {
            let items = bytes.iter().map(|b| b.to_string()).collect::<Vec<_>>().join(", ");
            Ok(format!("new Uint8Array([{items}])"))
        }
        CompositeLitKind::Elements { elements, is_slice_of_slice } => {
            lower_elements(ctx, ty, elements, *is_slice_of_slice)
        }
        CompositeLitKind::Record { named_type, direct, embedded_by_name, explicit_embedded } => {
            lower_record(ctx, *named_type, direct, embedded_by_name, explicit_embedded, inside_address_of)
        }
        CompositeLitKind::Anonymous(fields) => {
            let parts = fields
                .iter()
                .map(|(name, e)| Ok(format!("{}: {}", field_name(name), lower_expr(ctx, e)?)))
                .collect::<Result<Vec<_>>>()?;
            Ok(format!("{{ {} }}", parts.join(", ")))
        }
    }
}

fn lower_elements(
    ctx: &LoweringCtx,
    ty: TypeId,
    elements: &[(Option<usize>, Expr)],
    is_slice_of_slice: bool,
) -> Result<String> {
    let elem_ty = elem_type_of(ty, ctx.types);
    let mut slots: Vec<Option<String>> = Vec::new();
    let mut cursor = 0usize;
    for (key, value) in elements {
        let idx = key.unwrap_or(cursor);
        if idx >= slots.len() {
            slots.resize(idx + 1, None);
        }
        slots[idx] = Some(lower_expr(ctx, value)?);
        cursor = idx + 1;
    }
    let zero = zero_value_expr(ctx, elem_ty);
    let rendered = slots
        .into_iter()
        .map(|slot| slot.unwrap_or_else(|| zero.clone()))
        .collect::<Vec<_>>()
        .join(", ");
    if is_slice_of_slice {
        Ok(format!("$.{}([{rendered}], 2)", RuntimeApi::ARRAY_TO_SLICE))
    } else {
        Ok(format!("$.{}([{rendered}])", RuntimeApi::ARRAY_TO_SLICE))
    }
}

fn lower_record(
    ctx: &LoweringCtx,
    named_type: gosuspend_ast::NamedTypeId,
    direct: &[(String, Expr)],
    embedded_by_name: &[(String, Expr)],
    explicit_embedded: &[(gosuspend_ast::NamedTypeId, Expr)],
    inside_address_of: bool,
) -> Result<String> {
    let type_name = ctx.types.named(named_type).name.clone();
    let mut fields = Vec::new();

    let mut direct_sorted: Vec<&(String, Expr)> = direct.iter().collect();
    direct_sorted.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in direct_sorted {
        fields.push(format!("{}: {}", field_name(name), lower_expr(ctx, value)?));
    }

    let mut embedded_sorted: Vec<&(String, Expr)> = embedded_by_name.iter().collect();
    embedded_sorted.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, value) in embedded_sorted {
        fields.push(format!("{}: {}", field_name(name), lower_expr(ctx, value)?));
    }

    let mut explicit_sorted: Vec<&(gosuspend_ast::NamedTypeId, Expr)> = explicit_embedded.iter().collect();
    explicit_sorted.sort_by(|a, b| {
        ctx.types.named(a.0).name.cmp(&ctx.types.named(b.0).name)
    });
    for (embedded_named, value) in explicit_sorted {
        let prop = ctx.types.named(*embedded_named).name.clone();
        fields.push(format!("{prop}: {}", lower_expr(ctx, value)?));
    }

    let body = format!("new {type_name}({{ {} }})", fields.join(", "));
    if inside_address_of {
        Ok(body)
    } else {
        Ok(format!("$.{}({body})", RuntimeApi::MARK_AS_STRUCT_VALUE))
    }
}
