//! §4.I.5 type declarations and function/method declarations.
//!
//! Simplification (see DESIGN.md): every method, wrapper-receiver or
//! struct-receiver alike, lowers to a free function `TypeName_Method`.
//! Record classes install a bound forwarding property per own method in
//! their constructor so `x.Method(...)` call sites still read naturally;
//! this avoids threading class-method bodies through the writer
//! interleaved with the type-declaration pass.

use super::zero_value::zero_value_expr;
use super::LoweringCtx;
use crate::error::Result;
use crate::runtime_contract::RuntimeApi;
use crate::writer::TlWriter;
use gosuspend_ast::{Expr, FuncDecl, MethodKey, NamedTypeId, ObjectId, Type, TypeId};

fn ts_type(ctx: &LoweringCtx, ty: TypeId) -> String {
    match ctx.types.get(ty) {
        Type::Bool => "boolean".to_string(),
        Type::Int { .. } | Type::Float { .. } | Type::Byte | Type::Rune => "number".to_string(),
        Type::Str => "string".to_string(),
        Type::Pointer(inner) => format!("{} | null", ts_type(ctx, *inner)),
        Type::Slice(inner) | Type::Array(inner, _) => format!("$.{}<{}>", RuntimeApi::SLICE_TYPE, ts_type(ctx, *inner)),
        Type::Map(k, v) => format!("Map<{}, {}>", ts_type(ctx, *k), ts_type(ctx, *v)),
        Type::Chan(_, _) | Type::Func(_) => "any".to_string(),
        Type::Named(n) | Type::Struct(n) | Type::Interface(n) => ctx.types.named(*n).name.clone(),
        Type::TypeParam { name, .. } => name.clone(),
        Type::UntypedNil => "null".to_string(),
    }
}

pub fn lower_type_decl(ctx: &LoweringCtx, named: NamedTypeId, writer: &mut dyn TlWriter) -> Result<()> {
    let data = ctx.types.named(named);
    match ctx.types.get(data.underlying) {
        Type::Interface(_) => lower_interface_decl(ctx, named, writer),
        Type::Struct(_) => lower_record_decl(ctx, named, writer),
        _ if data.is_wrapper_type(ctx.types) => {
            writer.write_line(&format!("export type {} = {};", data.name, ts_type(ctx, data.underlying)));
            Ok(())
        }
        _ => {
            writer.write_line(&format!("export type {} = {};", data.name, ts_type(ctx, data.underlying)));
            Ok(())
        }
    }
}

fn lower_interface_decl(ctx: &LoweringCtx, named: NamedTypeId, writer: &mut dyn TlWriter) -> Result<()> {
    let data = ctx.types.named(named);
    writer.write_line(&format!("export type {} = unknown;", data.name));
    let methods = data
        .methods
        .iter()
        .map(|m| format!("\"{}\"", m.method_name))
        .collect::<Vec<_>>()
        .join(", ");
    writer.write_line(&format!(
        "$.{}(\"{}.{}\", null, [{methods}]);",
        RuntimeApi::REGISTER_INTERFACE_TYPE, data.package_path, data.name
    ));
    Ok(())
}

fn lower_record_decl(ctx: &LoweringCtx, named: NamedTypeId, writer: &mut dyn TlWriter) -> Result<()> {
    let data = ctx.types.named(named);
    writer.write_line(&format!("export class {} {{", data.name));
    writer.indent();
    writer.write_line("private _fields: Record<string, $.VarRef<any>> = {};");

    for embedded in &data.embedded_fields {
        let embedded_name = ctx.types.named(embedded.named_type).name.clone();
        writer.write_line(&format!("{}: {};", embedded_name, embedded_name));
    }

    writer.write_line("constructor(init: Partial<Record<string, any>> = {}) {");
    writer.indent();
    for field in &data.fields {
        let zero = zero_value_expr(ctx, field.ty);
        writer.write_line(&format!(
            "this._fields[\"{0}\"] = $.varRef(init[\"{0}\"] ?? {zero});",
            field.name
        ));
    }
    for embedded in &data.embedded_fields {
        let embedded_name = ctx.types.named(embedded.named_type).name.clone();
        writer.write_line(&format!("this.{embedded_name} = new {embedded_name}(init[\"{embedded_name}\"] ?? {{}});"));
    }
    for method in &data.methods {
        writer.write_line(&format!(
            "this.{0} = (...args: any[]) => {1}_{0}(this, ...args);",
            method.method_name, data.name
        ));
    }
    writer.dedent();
    writer.write_line("}");

    for field in &data.fields {
        writer.write_line(&format!("get {0}(): {1} {{ return this._fields[\"{0}\"].value; }}", field.name, ts_type(ctx, field.ty)));
        writer.write_line(&format!("set {0}(v: {1}) {{ this._fields[\"{0}\"].value = v; }}", field.name, ts_type(ctx, field.ty)));
    }
    for embedded in &data.embedded_fields {
        let embedded_data = ctx.types.named(embedded.named_type);
        let embedded_name = embedded_data.name.clone();
        for field in &embedded_data.fields {
            writer.write_line(&format!(
                "get {0}(): {1} {{ return this.{embedded_name}.{0}; }}",
                field.name, ts_type(ctx, field.ty)
            ));
            writer.write_line(&format!("set {0}(v: {1}) {{ this.{embedded_name}.{0} = v; }}", field.name, ts_type(ctx, field.ty)));
        }
    }

    writer.dedent();
    writer.write_line("}");
    Ok(())
}

fn func_key(ctx: &LoweringCtx, f: &FuncDecl) -> MethodKey {
    let name = ctx.objects.get(f.object).name.clone();
    match &f.receiver {
        Some(recv) => {
            let named = ctx.types.named(recv.named_type);
            MethodKey::method(named.package_path.clone(), named.name.clone(), name)
        }
        None => MethodKey::function(ctx.package_path.to_string(), name),
    }
}

fn func_result_ts(ctx: &LoweringCtx, f: &FuncDecl) -> String {
    match ctx.types.get(ctx.objects.get(f.object).ty) {
        Type::Func(sig) if sig.results.is_empty() => "void".to_string(),
        Type::Func(sig) if sig.results.len() == 1 => ts_type(ctx, sig.results[0]),
        Type::Func(sig) => {
            let parts = sig.results.iter().map(|t| ts_type(ctx, *t)).collect::<Vec<_>>().join(", ");
            format!("[{parts}]")
        }
        _ => "void".to_string(),
    }
}

/// Package-level `var` declaration. Equal-arity name/value lists lower to
/// one `export let` per name (boxed when escape analysis says so, same as
/// a local short declaration); a single multi-result initializer shared by
/// several names destructures like the local multi-assign case.
pub fn lower_var_decl(ctx: &LoweringCtx, names: &[ObjectId], values: &[Expr], writer: &mut dyn TlWriter) -> Result<()> {
    if names.len() == values.len() {
        for (name, value) in names.iter().zip(values.iter()) {
            emit_single_var(ctx, *name, value, writer)?;
        }
        return Ok(());
    }

    let call = super::selectors::lower_expr(ctx, &values[0])?;
    let rendered_names = names
        .iter()
        .map(|n| {
            if ctx.objects.get(*n).is_blank {
                "_".to_string()
            } else {
                ctx.shadows.resolved_name(*n, ctx.objects)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    writer.write_line(&format!("export let [{rendered_names}] = {call};"));
    Ok(())
}

fn emit_single_var(ctx: &LoweringCtx, name: ObjectId, value: &Expr, writer: &mut dyn TlWriter) -> Result<()> {
    if ctx.objects.get(name).is_blank {
        writer.write_line(&format!("{};", super::selectors::lower_expr(ctx, value)?));
        return Ok(());
    }
    let resolved = ctx.shadows.resolved_name(name, ctx.objects);
    let ty = ctx.objects.get(name).ty;
    let rendered = super::assignment::rhs_value_text(ctx, ty, value)?;
    if ctx.escape.needs_var_ref(name) {
        writer.write_line(&format!("export let {resolved} = $.varRef({rendered});"));
    } else {
        writer.write_line(&format!("export let {resolved} = {rendered};"));
    }
    Ok(())
}

/// Package-level `const`: never boxed, Go constants can't be reassigned or
/// have their address taken.
pub fn lower_const_decl(ctx: &LoweringCtx, name: ObjectId, value: &Expr, writer: &mut dyn TlWriter) -> Result<()> {
    let resolved = ctx.shadows.resolved_name(name, ctx.objects);
    let rendered = super::selectors::lower_expr(ctx, value)?;
    writer.write_line(&format!("export const {resolved} = {rendered};"));
    Ok(())
}

pub fn lower_func_decl(ctx: &LoweringCtx, f: &FuncDecl, writer: &mut dyn TlWriter) -> Result<()> {
    let key = func_key(ctx, f);
    let is_async = ctx.async_status.is_async(&key);
    let func_name = match &f.receiver {
        Some(recv) => format!("{}_{}", ctx.types.named(recv.named_type).name, ctx.objects.get(f.object).name),
        None => ctx.objects.get(f.object).name.clone(),
    };

    let mut params: Vec<String> = Vec::new();
    if let Some(recv) = &f.receiver {
        let recv_alias = ctx.shadows.receiver_alias(recv.object).map(|s| s.to_string()).unwrap_or_else(|| "self".to_string());
        let recv_ts = ctx.types.named(recv.named_type).name.clone();
        params.push(format!("{recv_alias}: {recv_ts}"));
    }
    for p in &f.params {
        let ty = ctx.objects.get(*p).ty;
        params.push(format!("{}: {}", ctx.shadows.resolved_name(*p, ctx.objects), ts_type(ctx, ty)));
    }

    let result_ts = func_result_ts(ctx, f);

    let keyword = if is_async { "export async function" } else { "export function" };
    writer.write_line(&format!("{keyword} {func_name}({}): {} {{", params.join(", "), if is_async { format!("Promise<{result_ts}>") } else { result_ts }));
    writer.indent();
    for named_result in &f.named_results {
        let ty = ctx.objects.get(*named_result).ty;
        let zero = zero_value_expr(ctx, ty);
        writer.write_line(&format!("let {} = {zero};", ctx.shadows.resolved_name(*named_result, ctx.objects)));
    }
    let body = super::control_flow::lower_function_body(ctx, &f.body, &f.named_results, is_async)?;
    writer.write_literally(&body);
    writer.dedent();
    writer.write_line("}");
    writer.write_line("");
    Ok(())
}
