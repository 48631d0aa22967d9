//! §4.I.3 calls — the ten-rule precedence ladder.

use super::selectors::lower_expr;
use super::LoweringCtx;
use crate::error::{Error, LoweringErrorKind, Pos, Result};
use crate::oracle::{Selection, SelectionKind};
use crate::runtime_contract::RuntimeApi;
use gosuspend_ast::{Expr, MethodKey, ObjectKind, Type, TypeId};

const PROTOBUF_METHODS: [&str; 4] = ["MarshalVT", "UnmarshalVT", "MarshalJSON", "UnmarshalJSON"];
const BUILTINS: [&str; 15] = [
    "len", "cap", "make", "new", "append", "copy", "delete", "close", "panic", "recover", "print", "println", "min",
    "max", "clear",
];

fn pos(ctx: &LoweringCtx) -> Pos {
    Pos { file: ctx.package_path.to_string(), line: 0, column: 0 }
}

fn callee_ident_name(ctx: &LoweringCtx, callee: &Expr) -> Option<String> {
    match callee {
        Expr::Ident { object, .. } => Some(ctx.objects.get(*object).name.clone()),
        _ => None,
    }
}

pub fn lower_call(ctx: &LoweringCtx, expr: &Expr) -> Result<String> {
    let (callee, args, has_ellipsis) = match expr {
        Expr::Call { callee, args, has_ellipsis, .. } => (callee.as_ref(), args, *has_ellipsis),
        _ => unreachable!("lower_call given a non-call expression"),
    };

    // Rule 1: protobuf companion methods.
    if let Expr::Selector { base, member, .. } = callee {
        if PROTOBUF_METHODS.contains(&member.as_str()) {
            return lower_protobuf_call(ctx, base, member, args);
        }
    }

    // Rule 2: typed-nil conversion `T(nil)`.
    if let Some(name) = callee_ident_name(ctx, callee) {
        if let Expr::Ident { object, .. } = callee {
            if ctx.objects.get(*object).kind == ObjectKind::TypeName
                && args.len() == 1
                && matches!(args[0], Expr::NilLit { .. })
            {
                return Ok("null".to_string());
            }
        }

        // Rule 3: string<->[]byte/[]rune conversions.
        if name == "string" && args.len() == 1 {
            match ctx.types.get(args[0].ty()) {
                Type::Slice(elem) if matches!(ctx.types.get(*elem), Type::Byte) => {
                    return Ok(format!("$.{}({})", RuntimeApi::BYTES_TO_STRING, lower_expr(ctx, &args[0])?));
                }
                Type::Slice(elem) if matches!(ctx.types.get(*elem), Type::Rune) => {
                    return Ok(format!("$.{}({})", RuntimeApi::RUNES_TO_STRING, lower_expr(ctx, &args[0])?));
                }
                _ => {}
            }
        }

        // Rule 4: builtins.
        if BUILTINS.contains(&name.as_str()) {
            return lower_builtin(ctx, &name, args, has_ellipsis);
        }

        // Rule 5: conversion to a named wrapper/basic type.
        if ctx.objects.get(object_of(callee)).kind == ObjectKind::TypeName && args.len() == 1 {
            return Ok(format!("({} as {name})", lower_expr(ctx, &args[0])?));
        }
    }

    // Rule 6: reflect.TypeFor (generic type-argument materialization is out
    // of scope for this AST — no type-argument list is carried on `Call`).
    if is_reflect_type_for(ctx, callee) {
        return Ok("$.reflectTypeFor()".to_string());
    }

    // Rule 7: wrapper-type method call -> free function form.
    if let Expr::Selector { base, member, .. } = callee {
        if let Some(sel) = ctx.oracle.selection(callee) {
            if let SelectionKind::Method(key) = sel.kind {
                if is_wrapper_method(ctx, &key) {
                    return lower_wrapper_method_call(ctx, base, &key, args);
                }
            }
        }
        let _ = member;
    }

    lower_plain_call(ctx, callee, args, has_ellipsis)
}

fn object_of(expr: &Expr) -> gosuspend_ast::ObjectId {
    match expr {
        Expr::Ident { object, .. } => *object,
        _ => unreachable!(),
    }
}

fn is_reflect_type_for(ctx: &LoweringCtx, callee: &Expr) -> bool {
    matches!(
        callee,
        Expr::Selector { base, member, .. }
            if member == "TypeFor"
            && matches!(base.as_ref(), Expr::Ident { object, .. } if ctx.objects.get(*object).name == "reflect")
    )
}

fn is_wrapper_method(ctx: &LoweringCtx, key: &MethodKey) -> bool {
    ctx.types
        .all_named()
        .find(|(_, d)| d.package_path == key.package_path && d.name == key.receiver_type_name)
        .map(|(_, d)| d.is_wrapper_type(ctx.types))
        .unwrap_or(false)
}

fn lower_protobuf_call(ctx: &LoweringCtx, base: &Expr, member: &str, args: &[Expr]) -> Result<String> {
    let type_name = named_type_name(ctx, base.ty()).unwrap_or_else(|| "Unknown".to_string());
    let receiver = lower_expr(ctx, base)?;
    match member {
        "MarshalVT" | "MarshalJSON" => Ok(format!("{type_name}.toBinary({receiver})")),
        "UnmarshalVT" | "UnmarshalJSON" => {
            let rendered = args.iter().map(|a| lower_expr(ctx, a)).collect::<Result<Vec<_>>>()?;
            Ok(format!("{type_name}.fromBinary({})", rendered.join(", ")))
        }
        other => Err(Error::Lowering {
            pos: pos(ctx),
            kind: LoweringErrorKind::UnknownAstVariant(format!("protobuf method {other}")),
        }),
    }
}

fn named_type_name(ctx: &LoweringCtx, ty: TypeId) -> Option<String> {
    match ctx.types.get(ty) {
        Type::Named(n) | Type::Struct(n) | Type::Interface(n) => Some(ctx.types.named(*n).name.clone()),
        Type::Pointer(inner) => named_type_name(ctx, *inner),
        _ => None,
    }
}

fn lower_builtin(ctx: &LoweringCtx, name: &str, args: &[Expr], has_ellipsis: bool) -> Result<String> {
    let rendered = args.iter().map(|a| lower_expr(ctx, a)).collect::<Result<Vec<_>>>()?;
    match name {
        "len" => Ok(format!("$.{}({})", RuntimeApi::LEN, one(ctx, name, &rendered)?)),
        "cap" => Ok(format!("$.{}({})", RuntimeApi::CAP, one(ctx, name, &rendered)?)),
        "copy" => Ok(format!("$.{}({})", RuntimeApi::COPY, rendered.join(", "))),
        "panic" => Ok(format!("$.{}({})", RuntimeApi::PANIC, one(ctx, name, &rendered)?)),
        "println" => Ok(format!("$.{}({})", RuntimeApi::PRINTLN, rendered.join(", "))),
        "print" => Ok(format!("$.{}({})", RuntimeApi::PRINTLN, rendered.join(", "))),
        "recover" => Ok(format!("$.{}()", RuntimeApi::RECOVER)),
        "clear" => Ok(format!("$.{}({})", RuntimeApi::CLEAR, one(ctx, name, &rendered)?)),
        "delete" => Ok(format!("$.{}({})", RuntimeApi::DELETE_MAP_ENTRY, rendered.join(", "))),
        "close" => Ok(format!("{}.close()", one(ctx, name, &rendered)?)),
        "min" => Ok(format!("Math.min({})", rendered.join(", "))),
        "max" => Ok(format!("Math.max({})", rendered.join(", "))),
        "new" => {
            let ty = args.get(0).map(|a| a.ty());
            let zero = ty.map(|t| super::zero_value::zero_value_expr(ctx, t)).unwrap_or_else(|| "null".into());
            Ok(format!("$.{}({zero})", RuntimeApi::VAR_REF))
        }
        "make" => lower_make(ctx, args, &rendered),
        "append" => lower_append(ctx, args, &rendered, has_ellipsis),
        other => Err(Error::Lowering {
            pos: pos(ctx),
            kind: LoweringErrorKind::InvalidBuiltinArgs { name: other.to_string(), expected: "known builtin".into(), got: args.len() },
        }),
    }
}

fn one(ctx: &LoweringCtx, name: &str, rendered: &[String]) -> Result<String> {
    rendered.first().cloned().ok_or_else(|| Error::Lowering {
        pos: pos(ctx),
        kind: LoweringErrorKind::InvalidBuiltinArgs { name: name.to_string(), expected: "1".into(), got: 0 },
    })
}

fn lower_make(ctx: &LoweringCtx, args: &[Expr], rendered: &[String]) -> Result<String> {
    let result_ty = match args.first() {
        Some(a) => a.ty(),
        None => {
            return Err(Error::Lowering {
                pos: pos(ctx),
                kind: LoweringErrorKind::InvalidBuiltinArgs { name: "make".into(), expected: ">=1".into(), got: 0 },
            })
        }
    };
    let extra = rendered.iter().skip(1).cloned().collect::<Vec<_>>().join(", ");
    match ctx.types.get(result_ty) {
        Type::Chan(_, _) => Ok(format!("$.{}({extra})", RuntimeApi::MAKE_CHANNEL)),
        Type::Map(_, _) => Ok(format!("$.{}()", RuntimeApi::MAKE_MAP)),
        Type::Slice(_) => Ok(format!("$.{}({extra})", RuntimeApi::MAKE_SLICE)),
        _ => Err(Error::Lowering {
            pos: pos(ctx),
            kind: LoweringErrorKind::UnsupportedTypeConversion { from: "make argument".into(), to: "channel/map/slice".into() },
        }),
    }
}

fn lower_append(ctx: &LoweringCtx, args: &[Expr], rendered: &[String], has_ellipsis: bool) -> Result<String> {
    if args.is_empty() {
        return Err(Error::Lowering {
            pos: pos(ctx),
            kind: LoweringErrorKind::InvalidBuiltinArgs { name: "append".into(), expected: ">=1".into(), got: 0 },
        });
    }
    let base = &rendered[0];
    if has_ellipsis && args.len() == 2 {
        // `append(s, bs...)`; a string spread source needs byte conversion
        // first (§4.I.3 rule 4).
        let spread_src = if matches!(ctx.types.get(args[1].ty()), Type::Str) {
            format!("$.{}({})", RuntimeApi::STRING_TO_BYTES, rendered[1])
        } else {
            rendered[1].clone()
        };
        return Ok(format!("$.{}({base}, ...({spread_src} ?? []))", RuntimeApi::APPEND));
    }
    let rest = rendered[1..].join(", ");
    Ok(format!("$.{}({base}, {rest})", RuntimeApi::APPEND))
}

fn lower_wrapper_method_call(ctx: &LoweringCtx, base: &Expr, key: &MethodKey, args: &[Expr]) -> Result<String> {
    let receiver = lower_expr(ctx, base)?;
    let rendered = args.iter().map(|a| lower_expr(ctx, a)).collect::<Result<Vec<_>>>()?;
    let mut call_args = vec![receiver];
    call_args.extend(rendered);
    Ok(format!("{}_{}({})", key.receiver_type_name, key.method_name, call_args.join(", ")))
}

fn lower_plain_call(ctx: &LoweringCtx, callee: &Expr, args: &[Expr], has_ellipsis: bool) -> Result<String> {
    let mut rendered = args.iter().map(|a| lower_expr(ctx, a)).collect::<Result<Vec<_>>>()?;
    if has_ellipsis {
        if let Some(last) = rendered.pop() {
            rendered.push(format!("...({last} ?? [])"));
        }
    }

    let needs_assertion = callee_needs_non_null_assertion(ctx, callee);
    let callee_text = lower_expr(ctx, callee)?;
    let callee_text = if needs_assertion { format!("{callee_text}!") } else { callee_text };

    let call_text = format!("{callee_text}({})", rendered.join(", "));
    if call_needs_await(ctx, callee) {
        Ok(format!("(await {call_text})"))
    } else {
        Ok(call_text)
    }
}

/// Rule 9: a callee needs `!` when it is function-typed through a variable,
/// parameter, struct field, or another call's result — never a plain
/// function or method declaration. Mirrors `addNonNullAssertion`'s own
/// `isVar`/`FieldVal` gates: a bare `Ident` only qualifies when the object
/// behind it is a variable-like binding (not `*types.Func`), and a
/// `Selector` only qualifies when it resolves to a field read (not
/// `types.MethodVal`).
fn callee_needs_non_null_assertion(ctx: &LoweringCtx, callee: &Expr) -> bool {
    if !matches!(ctx.types.get(callee.ty()), Type::Func(_)) {
        return false;
    }
    match callee {
        Expr::Ident { object, .. } => {
            matches!(ctx.objects.get(*object).kind, ObjectKind::Var | ObjectKind::Param | ObjectKind::NamedReturn)
        }
        Expr::Selector { .. } => matches!(ctx.oracle.selection(callee), Some(Selection { kind: SelectionKind::Field })),
        Expr::Call { .. } | Expr::Index { .. } => true,
        _ => false,
    }
}

/// Rule 8: async dispatch. Prefixes `await` when the callee resolves to a
/// known-async function/method, an async interface method, or an
/// async-returning variable.
fn call_needs_await(ctx: &LoweringCtx, callee: &Expr) -> bool {
    match callee {
        Expr::Ident { object, .. } => {
            if ctx.async_returning_vars.is_async_returning(*object) {
                return true;
            }
            let name = ctx.objects.get(*object).name.clone();
            ctx.async_status.is_async(&MethodKey::function(ctx.package_path.to_string(), name))
        }
        Expr::Selector { .. } => match ctx.oracle.selection(callee) {
            Some(sel) => match sel.kind {
                SelectionKind::Method(key) => {
                    ctx.async_status.is_async(&key)
                        || ctx.interfaces.is_interface_method_async(
                            &crate::interfaces::InterfaceMethodKey {
                                interface_type_string: format!("{}.{}", key.package_path, key.receiver_type_name),
                                method_name: key.method_name.clone(),
                            },
                            |k| ctx.async_status.is_async(k),
                        )
                }
                _ => false,
            },
            None => false,
        },
        // `f()()`: immediate application of an async call result. Whether
        // the inner call itself resolves to an async function is not
        // recoverable from this AST without the inner call's own static
        // result type carrying a suspend flag, so this conservatively
        // treats the outer application as non-async. See DESIGN.md.
        Expr::Call { .. } => false,
        _ => false,
    }
}
