//! §4.I.4 selectors, plus the shared recursive expression dispatcher every
//! other lowering submodule calls back into for subexpressions.

use super::LoweringCtx;
use crate::error::{Error, LoweringErrorKind, Pos, Result};
use crate::oracle::SelectionKind;
use gosuspend_ast::{Expr, Type, TypeId};

fn pos(ctx: &LoweringCtx) -> Pos {
    Pos { file: ctx.package_path.to_string(), line: 0, column: 0 }
}

fn lowering_err(ctx: &LoweringCtx, kind: LoweringErrorKind) -> Error {
    Error::Lowering { pos: pos(ctx), kind }
}

/// True if `ty` is pointer- or interface-typed, the condition under which a
/// selector base needs a `.`/`!.` null-assertion choice at all.
fn is_nullable_base(ctx: &LoweringCtx, ty: TypeId) -> bool {
    matches!(ctx.types.get(ty), Type::Pointer(_) | Type::Interface(_))
}

fn ident_name(ctx: &LoweringCtx, object: gosuspend_ast::ObjectId) -> String {
    ctx.shadows.resolved_name(object, ctx.objects)
}

/// Central recursive expression lowering. Every lowering submodule for a
/// compound construct (assignment RHS, composite-literal fields, call
/// arguments, control-flow conditions) bottoms out here for leaf and
/// selector expressions.
pub fn lower_expr(ctx: &LoweringCtx, expr: &Expr) -> Result<String> {
    match expr {
        Expr::Ident { object, .. } => {
            let name = ident_name(ctx, *object);
            if ctx.escape.needs_var_ref(*object) {
                Ok(format!("{name}.value"))
            } else {
                Ok(name)
            }
        }
        Expr::IntLit { value, .. } => Ok(value.to_string()),
        Expr::FloatLit { value, .. } => Ok(value.clone()),
        Expr::StringLit { value, .. } => Ok(format!("{value:?}")),
        Expr::BoolLit { value, .. } => Ok(value.to_string()),
        Expr::NilLit { .. } => Ok("null".to_string()),
        Expr::AddressOf { inner, .. } => lower_address_of(ctx, inner),
        Expr::Deref { inner, .. } => lower_deref(ctx, inner),
        Expr::Binary { op, left, right, .. } => lower_binary(ctx, op, left, right),
        Expr::Unary { op, inner, .. } => Ok(format!("({op}{})", lower_expr(ctx, inner)?)),
        Expr::Call { .. } => super::calls::lower_call(ctx, expr),
        Expr::Selector { base, member, .. } => lower_selector(ctx, base, member, expr),
        Expr::Index { base, index, .. } => lower_index(ctx, base, index),
        Expr::CompositeLit { .. } => super::composite_lit::lower_composite(ctx, expr, false),
        Expr::TypeAssert { target, asserted, comma_ok, .. } => lower_type_assert(ctx, target, *asserted, *comma_ok),
        Expr::MethodValue { receiver, method, .. } => lower_method_value(ctx, receiver, method),
        Expr::ChannelRecv { channel, .. } => {
            let chan = lower_expr(ctx, channel)?;
            Ok(format!("(await $.channelRecv({chan}))"))
        }
        Expr::FuncLit { params, body, .. } => {
            let param_list = params
                .iter()
                .map(|p| ident_name(ctx, *p))
                .collect::<Vec<_>>()
                .join(", ");
            let block = super::control_flow::lower_block(ctx, body, 1, &[])?;
            Ok(format!("(({param_list}) => {{\n{block}}})"))
        }
    }
}

fn lower_binary(ctx: &LoweringCtx, op: &str, left: &Expr, right: &Expr) -> Result<String> {
    let l = lower_expr(ctx, left)?;
    let r = lower_expr(ctx, right)?;
    if op == "&^" {
        return Ok(format!("({l} & ~({r}))"));
    }
    Ok(format!("({l} {op} {r})"))
}

fn lower_address_of(ctx: &LoweringCtx, inner: &Expr) -> Result<String> {
    match inner {
        Expr::Ident { object, .. } => {
            // The boxed variable's identity *is* its address; `&x` on an
            // already-boxed `x` is the bare cell, never `.value`.
            Ok(ident_name(ctx, *object))
        }
        Expr::CompositeLit { .. } => super::composite_lit::lower_composite(ctx, inner, true),
        other => lower_expr(ctx, other),
    }
}

/// Whether `*p` needs `.value` is an escape-analysis question, not a
/// string-shape one: `p` only reads through a cell when the tracker
/// actually marked it (or its sole source) boxed. A pointer taken from a
/// fresh composite literal (`p := &T{}`) is never recorded as boxed, so
/// dereferencing it must not append `.value` even though `p` itself is a
/// plain identifier.
fn lower_deref(ctx: &LoweringCtx, inner: &Expr) -> Result<String> {
    let base = lower_expr(ctx, inner)?;
    let needs_value = match inner {
        Expr::Ident { object, ty, .. } => ctx.escape.needs_var_ref_access(*object, *ty, ctx.types),
        _ => !base.ends_with(".value"),
    };
    if needs_value && !base.ends_with(".value") {
        Ok(format!("{base}.value"))
    } else {
        Ok(base)
    }
}

fn lower_index(ctx: &LoweringCtx, base: &Expr, index: &Expr) -> Result<String> {
    let b = lower_expr(ctx, base)?;
    let i = lower_expr(ctx, index)?;
    match ctx.types.get(base.ty()) {
        Type::Map(_, _) => Ok(format!("{b}.get({i})")),
        _ => Ok(format!("{b}[{i}]")),
    }
}

fn lower_type_assert(ctx: &LoweringCtx, target: &Expr, asserted: TypeId, comma_ok: bool) -> Result<String> {
    let t = lower_expr(ctx, target)?;
    let type_name = match ctx.types.get(asserted) {
        Type::Named(n) | Type::Struct(n) | Type::Interface(n) => ctx.types.named(*n).name.clone(),
        _ => return Err(lowering_err(ctx, LoweringErrorKind::MissingTypeInfo)),
    };
    if comma_ok {
        Ok(format!("$.typeAssertOk<{type_name}>({t})"))
    } else {
        Ok(format!("({t} as {type_name})"))
    }
}

/// Decides a `pkg.Name` / field / method-value / `(*p).field` selector,
/// §4.I.4.
fn lower_selector(ctx: &LoweringCtx, base: &Expr, member: &str, full: &Expr) -> Result<String> {
    if let Expr::Ident { object, .. } = base {
        if ctx.objects.get(*object).kind == gosuspend_ast::ObjectKind::Package {
            let pkg = ctx.objects.get(*object).name.clone();
            if pkg == "reflect" && member == "Pointer" {
                return Ok("reflect.Ptr".to_string());
            }
            return Ok(format!("{pkg}.{member}"));
        }
    }

    match ctx.oracle.selection(full) {
        Some(sel) => match sel.kind {
            SelectionKind::Method(key) => lower_method_selector(ctx, base, &key, member),
            SelectionKind::Field => lower_field_selector(ctx, base, member),
            SelectionKind::PackageMember => Ok(format!("{}.{member}", lower_expr(ctx, base)?)),
        },
        None => lower_field_selector(ctx, base, member),
    }
}

fn lower_field_selector(ctx: &LoweringCtx, base: &Expr, member: &str) -> Result<String> {
    let needs_assertion = is_nullable_base(ctx, base.ty()) && !is_receiver_alias(ctx, base);
    let b = lower_expr(ctx, base)?;
    let dot = if needs_assertion { "!." } else { "." };
    Ok(format!("{b}{dot}{member}"))
}

fn is_receiver_alias(ctx: &LoweringCtx, base: &Expr) -> bool {
    matches!(base, Expr::Ident { object, .. } if ctx.shadows.receiver_alias(*object).is_some())
}

/// `base.Method(...)` is lowered at the call site (§4.I.3 rule 7/8); this
/// handles a bare method *selector*, not an immediate call.
fn lower_method_selector(ctx: &LoweringCtx, base: &Expr, key: &gosuspend_ast::MethodKey, member: &str) -> Result<String> {
    let _ = key;
    lower_field_selector(ctx, base, member)
}

/// A method value `x.M` not immediately called: a bound closure (§4.I.4).
///
/// Simplification: telling a pointer-receiver method from a value-receiver
/// one requires the whole-program `receiver_pointer_map` (§4.B), which the
/// lowering context does not carry per-expression. This assumes the
/// receiver's kind matches the base expression's own pointer-ness (the
/// common case — SL call sites rarely take a method value across a
/// pointer/value mismatch); see DESIGN.md.
pub fn lower_method_value(ctx: &LoweringCtx, receiver: &Expr, method: &gosuspend_ast::MethodKey) -> Result<String> {
    let base = lower_expr(ctx, receiver)?;
    let recv_ty = receiver.ty();
    let recv_is_pointer = matches!(ctx.types.get(recv_ty), Type::Pointer(_));
    let named = named_type_of(ctx, recv_ty);

    if let Some(n) = named {
        if ctx.types.named(n).is_wrapper_type(ctx.types) {
            let type_name = ctx.types.named(n).name.clone();
            return Ok(format!(
                "((...args: any[]) => {type_name}_{}({base}, ...args))",
                method.method_name
            ));
        }
        return Ok(if recv_is_pointer {
            format!("{base}.{}.bind({base})", method.method_name)
        } else {
            format!("{base}.{}.bind($.markAsStructValue({base}.clone()))", method.method_name)
        });
    }
    Ok(format!("{base}.{}.bind({base})", method.method_name))
}

fn named_type_of(ctx: &LoweringCtx, ty: TypeId) -> Option<gosuspend_ast::NamedTypeId> {
    match ctx.types.get(ty) {
        Type::Named(n) | Type::Struct(n) | Type::Interface(n) => Some(*n),
        Type::Pointer(inner) => named_type_of(ctx, *inner),
        _ => None,
    }
}
