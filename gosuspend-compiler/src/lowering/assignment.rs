//! §4.I.1 assignment — eleven rules, checked in the order the spec lists
//! them (blank/deref/boxing/map-index dispositions first, then the
//! value-shape rules that apply to whatever RHS text results).

use super::selectors::lower_expr;
use super::LoweringCtx;
use crate::error::{Error, LoweringErrorKind, Pos, Result};
use gosuspend_ast::{AssignOp, Expr, Stmt, Type};

const ERROR_INTERFACE_NAME: &str = "error";

fn pos(ctx: &LoweringCtx) -> Pos {
    Pos { file: ctx.package_path.to_string(), line: 0, column: 0 }
}

fn compound_operator(op: AssignOp) -> Option<&'static str> {
    match op {
        AssignOp::Add => Some("+="),
        AssignOp::Sub => Some("-="),
        AssignOp::Mul => Some("*="),
        AssignOp::Rem => Some("%="),
        AssignOp::And => Some("&="),
        AssignOp::Or => Some("|="),
        AssignOp::Xor => Some("^="),
        AssignOp::Shl => Some("<<="),
        AssignOp::Shr => Some(">>="),
        AssignOp::Assign | AssignOp::Define | AssignOp::Div | AssignOp::AndNot => None,
    }
}

fn is_blank(ctx: &LoweringCtx, e: &Expr) -> bool {
    matches!(e, Expr::Ident { object, .. } if ctx.objects.get(*object).is_blank)
}

/// Rule 8 + rule 10: struct-value copy and primitive-error wrapping, layered
/// on top of the plain lowered RHS text. Only applies to full (non-compound)
/// assignment — compound ops operate on scalars by construction.
pub(super) fn rhs_value_text(ctx: &LoweringCtx, lhs_ty: gosuspend_ast::TypeId, rhs: &Expr) -> Result<String> {
    let rendered = lower_expr(ctx, rhs)?;

    if let Type::Interface(iface) = ctx.types.get(lhs_ty) {
        if ctx.types.named(*iface).name == ERROR_INTERFACE_NAME {
            if let Some(wrapper) = wrapper_error_type(ctx, rhs) {
                return Ok(format!("$.wrapPrimitiveError({rendered}, {wrapper}_Error)"));
            }
        }
    }

    if matches!(ctx.types.get(rhs.ty()), Type::Struct(_)) && !matches!(rhs, Expr::CompositeLit { .. }) {
        return Ok(format!("$.markAsStructValue({rendered}.clone())"));
    }

    Ok(rendered)
}

fn wrapper_error_type(ctx: &LoweringCtx, rhs: &Expr) -> Option<String> {
    let named = match ctx.types.get(rhs.ty()) {
        Type::Named(n) => *n,
        _ => return None,
    };
    let data = ctx.types.named(named);
    if data.is_wrapper_type(ctx.types) && data.methods.iter().any(|m| m.method_name == "Error") {
        Some(data.name.clone())
    } else {
        None
    }
}

pub fn lower_assignment(ctx: &LoweringCtx, stmt: &Stmt) -> Result<String> {
    let (op, lhs, rhs) = match stmt {
        Stmt::Assign { op, lhs, rhs, .. } => (*op, lhs, rhs),
        _ => unreachable!("lower_assignment given a non-assign statement"),
    };

    if lhs.len() >= 2 {
        return lower_multi(ctx, lhs, rhs, op);
    }

    let l = &lhs[0];
    let r = &rhs[0];

    // Rule 1: blank LHS.
    if is_blank(ctx, l) {
        return Ok(format!("{};", lower_expr(ctx, r)?));
    }

    // Rule 2: `*p op= v` / `*p = v`.
    if let Expr::Deref { inner, .. } = l {
        return lower_deref_assign(ctx, inner, op, r);
    }

    // Rule 4: map-index destination.
    if let Expr::Index { base, index, .. } = l {
        if matches!(ctx.types.get(base.ty()), Type::Map(_, _)) {
            let b = lower_expr(ctx, base)?;
            let i = lower_expr(ctx, index)?;
            let v = rhs_value_text(ctx, l.ty(), r)?;
            return Ok(format!("$.mapSet({b}, {i}, {v});"));
        }
    }

    if let Expr::Ident { object, .. } = l {
        let name = ctx.shadows.resolved_name(*object, ctx.objects);

        // Rule 3: short-decl into a boxed variable.
        if op == AssignOp::Define && ctx.escape.needs_var_ref(*object) {
            let v = rhs_value_text(ctx, l.ty(), r)?;
            return Ok(format!("let {name} = $.varRef({v});"));
        }

        if op == AssignOp::Define {
            let v = rhs_value_text(ctx, l.ty(), r)?;
            return Ok(format!("let {name} = {v};"));
        }

        if let Some(operator) = compound_operator(op) {
            let rv = lower_expr(ctx, r)?;
            return Ok(format!("{name} {operator} {rv};"));
        }
        if op == AssignOp::Div {
            let rv = lower_expr(ctx, r)?;
            return Ok(format!("{name} = Math.trunc({name} / {rv});"));
        }
        if op == AssignOp::AndNot {
            let rv = lower_expr(ctx, r)?;
            return Ok(format!("{name} &= ~({rv});"));
        }

        let v = rhs_value_text(ctx, l.ty(), r)?;
        return Ok(format!("{name} = {v};"));
    }

    // Any other plain single-LHS form (selector/index on a non-map base).
    let lv = lower_expr(ctx, l)?;
    if let Some(operator) = compound_operator(op) {
        let rv = lower_expr(ctx, r)?;
        return Ok(format!("{lv} {operator} {rv};"));
    }
    let v = rhs_value_text(ctx, l.ty(), r)?;
    Ok(format!("{lv} = {v};"))
}

fn lower_deref_assign(ctx: &LoweringCtx, inner: &Expr, op: AssignOp, r: &Expr) -> Result<String> {
    let base = lower_expr(ctx, inner)?;
    let target = if base.ends_with(".value") { base } else { format!("{base}.value") };
    if let Some(operator) = compound_operator(op) {
        let rv = lower_expr(ctx, r)?;
        return Ok(format!("{target} {operator} {rv};"));
    }
    if op == AssignOp::Div {
        let rv = lower_expr(ctx, r)?;
        return Ok(format!("{target} = Math.trunc({target} / {rv});"));
    }
    if op == AssignOp::AndNot {
        let rv = lower_expr(ctx, r)?;
        return Ok(format!("{target} &= ~({rv});"));
    }
    let v = rhs_value_text(ctx, inner.ty(), r)?;
    Ok(format!("{target} = {v};"))
}

fn lower_multi(ctx: &LoweringCtx, lhs: &[Expr], rhs: &[Expr], op: AssignOp) -> Result<String> {
    if lhs.len() != rhs.len() {
        // N names bound from a single multi-result call: destructure the
        // one call expression directly.
        if rhs.len() == 1 {
            let names = lhs
                .iter()
                .map(|l| match l {
                    Expr::Ident { object, .. } if ctx.objects.get(*object).is_blank => Ok("_".to_string()),
                    Expr::Ident { object, .. } => Ok(ctx.shadows.resolved_name(*object, ctx.objects)),
                    _ => lower_expr(ctx, l),
                })
                .collect::<Result<Vec<_>>>()?;
            let call = lower_expr(ctx, &rhs[0])?;
            let keyword = if op == AssignOp::Define { "let " } else { "" };
            return Ok(format!("{keyword}[{}] = {call};", names.join(", ")));
        }
        return Err(Error::Lowering {
            pos: pos(ctx),
            kind: LoweringErrorKind::UnknownAssignOperator(format!("mismatched multi-assign arity {}:{}", lhs.len(), rhs.len())),
        });
    }

    let all_index = lhs.iter().all(|e| matches!(e, Expr::Index { .. })) && rhs.iter().all(|e| matches!(e, Expr::Index { .. }));

    let lhs_text = lhs.iter().map(|e| lower_expr(ctx, e)).collect::<Result<Vec<_>>>()?;
    let rhs_text = rhs
        .iter()
        .map(|e| {
            let t = lower_expr(ctx, e)?;
            Ok(if all_index { format!("{t}!") } else { t })
        })
        .collect::<Result<Vec<_>>>()?;

    let keyword = if op == AssignOp::Define { "let " } else { "" };
    Ok(format!("{keyword}[{}] = [{}];", lhs_text.join(", "), rhs_text.join(", ")))
}
