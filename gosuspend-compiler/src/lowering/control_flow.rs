//! §4.I.7 control flow: deferred cleanup, bare-return expansion, and the
//! channel/select/goroutine/range-over-channel suspension points.

use super::assignment::lower_assignment;
use super::selectors::lower_expr;
use super::LoweringCtx;
use crate::error::Result;
use gosuspend_ast::{Block, ObjectId, SelectCaseKind, Stmt};

fn indent(depth: usize) -> String {
    "  ".repeat(depth)
}

fn block_has_defer(block: &Block) -> bool {
    block.stmts.iter().any(stmt_has_defer)
}

fn stmt_has_defer(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Defer { .. } => true,
        Stmt::If { then_block, else_block, .. } => {
            block_has_defer(then_block) || else_block.as_ref().map(block_has_defer).unwrap_or(false)
        }
        Stmt::For { body, .. } | Stmt::RangeChannel { body, .. } | Stmt::Block(body) => block_has_defer(body),
        Stmt::Select { cases, .. } => cases.iter().any(|c| block_has_defer(&c.body)),
        _ => false,
    }
}

/// Wraps a function body: acquires the (async) disposable stack at entry
/// only when the body actually contains a `defer` anywhere reachable
/// (§4.I.7, §9).
pub fn lower_function_body(
    ctx: &LoweringCtx,
    body: &Block,
    named_returns: &[ObjectId],
    is_async: bool,
) -> Result<String> {
    let mut out = String::new();
    if block_has_defer(body) {
        let (using_kw, stack_ty) = if is_async {
            ("await using", "AsyncDisposableStack")
        } else {
            ("using", "DisposableStack")
        };
        out.push_str(&format!("{}{using_kw} __defer = new $.{stack_ty}();\n", indent(1)));
    }
    out.push_str(&lower_block(ctx, body, 1, named_returns)?);
    Ok(out)
}

pub fn lower_block(ctx: &LoweringCtx, block: &Block, depth: usize, named_returns: &[ObjectId]) -> Result<String> {
    let mut out = String::new();
    for stmt in &block.stmts {
        out.push_str(&lower_stmt(ctx, stmt, depth, named_returns)?);
    }
    Ok(out)
}

fn async_arrow(call_text: &str) -> (&'static str, &str) {
    if call_text.starts_with("(await ") {
        let stripped = call_text.trim_start_matches("(await ");
        ("async ", stripped.strip_suffix(')').unwrap_or(stripped))
    } else {
        ("", call_text)
    }
}

fn lower_stmt(ctx: &LoweringCtx, stmt: &Stmt, depth: usize, named_returns: &[ObjectId]) -> Result<String> {
    let pad = indent(depth);
    let line = match stmt {
        Stmt::Assign { .. } => lower_assignment(ctx, stmt)?,
        Stmt::Expr(e) => format!("{};", lower_expr(ctx, e)?),
        Stmt::Return { values, .. } => {
            if values.is_empty() {
                "return;".to_string()
            } else if values.len() == 1 {
                format!("return {};", lower_expr(ctx, &values[0])?)
            } else {
                let rendered = values.iter().map(|v| lower_expr(ctx, v)).collect::<Result<Vec<_>>>()?;
                format!("return [{}];", rendered.join(", "))
            }
        }
        Stmt::BareReturn { .. } => lower_bare_return(ctx, named_returns),
        Stmt::If { cond, then_block, else_block, .. } => {
            let c = lower_expr(ctx, cond)?;
            let then_body = lower_block(ctx, then_block, depth + 1, named_returns)?;
            let mut s = format!("if ({c}) {{\n{then_body}{pad}}}");
            if let Some(e) = else_block {
                let else_body = lower_block(ctx, e, depth + 1, named_returns)?;
                s.push_str(&format!(" else {{\n{else_body}{pad}}}"));
            }
            s
        }
        Stmt::For { init, cond, post, body, .. } => lower_for(ctx, init, cond, post, body, depth, named_returns)?,
        Stmt::RangeChannel { var, channel, body, .. } => {
            let name = ctx.shadows.resolved_name(*var, ctx.objects);
            let chan = lower_expr(ctx, channel)?;
            let b = lower_block(ctx, body, depth + 1, named_returns)?;
            format!("for await (const {name} of $.channelIter({chan})) {{\n{b}{pad}}}")
        }
        Stmt::Send { channel, value, .. } => {
            let chan = lower_expr(ctx, channel)?;
            let v = lower_expr(ctx, value)?;
            format!("await $.channelSend({chan}, {v});")
        }
        Stmt::Break { .. } => "break;".to_string(),
        Stmt::Continue { .. } => "continue;".to_string(),
        Stmt::Defer { call, .. } => {
            let c = lower_expr(ctx, call)?;
            let (prefix, body) = async_arrow(&c);
            format!("__defer.defer({prefix}() => {{ {body}; }});")
        }
        Stmt::Go { call, .. } => {
            let c = lower_expr(ctx, call)?;
            let (prefix, body) = async_arrow(&c);
            format!("$.go({prefix}() => {{ {body}; }});")
        }
        Stmt::Select { cases, .. } => lower_select(ctx, cases, depth, named_returns)?,
        Stmt::Block(b) => {
            let inner = lower_block(ctx, b, depth + 1, named_returns)?;
            format!("{{\n{inner}{pad}}}")
        }
    };
    Ok(format!("{pad}{line}\n"))
}

fn lower_bare_return(ctx: &LoweringCtx, named_returns: &[ObjectId]) -> String {
    if named_returns.is_empty() {
        "return;".to_string()
    } else if named_returns.len() == 1 {
        format!("return {};", ctx.shadows.resolved_name(named_returns[0], ctx.objects))
    } else {
        let names = named_returns
            .iter()
            .map(|o| ctx.shadows.resolved_name(*o, ctx.objects))
            .collect::<Vec<_>>()
            .join(", ");
        format!("return [{names}];")
    }
}

/// `for init; cond; post { body }` desugars to a scoped block (init's
/// variable must not leak) wrapping a `while`, since TL's `for` binds a
/// single decl the lowering policy would otherwise have to re-derive from
/// an arbitrary `Stmt`.
fn lower_for(
    ctx: &LoweringCtx,
    init: &Option<Box<Stmt>>,
    cond: &Option<gosuspend_ast::Expr>,
    post: &Option<Box<Stmt>>,
    body: &Block,
    depth: usize,
    named_returns: &[ObjectId],
) -> Result<String> {
    let pad = indent(depth);
    let inner_pad = indent(depth + 1);
    let mut out = String::from("{\n");
    if let Some(i) = init {
        out.push_str(&lower_stmt(ctx, i, depth + 1, named_returns)?);
    }
    let cond_text = match cond {
        Some(c) => lower_expr(ctx, c)?,
        None => "true".to_string(),
    };
    out.push_str(&format!("{inner_pad}while ({cond_text}) {{\n"));
    out.push_str(&lower_block(ctx, body, depth + 2, named_returns)?);
    if let Some(p) = post {
        out.push_str(&lower_stmt(ctx, p, depth + 2, named_returns)?);
    }
    out.push_str(&format!("{inner_pad}}}\n"));
    out.push_str(&format!("{pad}}}"));
    Ok(out)
}

fn lower_select(ctx: &LoweringCtx, cases: &[gosuspend_ast::SelectCase], depth: usize, named_returns: &[ObjectId]) -> Result<String> {
    let pad = indent(depth);
    let inner_pad = indent(depth + 1);
    let mut descriptors = Vec::new();
    let mut bodies = Vec::new();
    for (i, case) in cases.iter().enumerate() {
        let body = lower_block(ctx, &case.body, depth + 2, named_returns)?;
        match &case.kind {
            SelectCaseKind::Send { channel, value } => {
                let chan = lower_expr(ctx, channel)?;
                let v = lower_expr(ctx, value)?;
                descriptors.push(format!("{{ kind: \"send\", channel: {chan}, value: {v} }}"));
            }
            SelectCaseKind::Recv { channel, bind } => {
                let chan = lower_expr(ctx, channel)?;
                descriptors.push(format!("{{ kind: \"recv\", channel: {chan} }}"));
                if let Some(obj) = bind {
                    let name = ctx.shadows.resolved_name(*obj, ctx.objects);
                    bodies.push(format!(
                        "{inner_pad}if (__selected === {i}) {{\n{inner_pad}  const {name} = __selectResult;\n{body}{inner_pad}}}\n"
                    ));
                    continue;
                }
            }
            SelectCaseKind::Default => descriptors.push("{ kind: \"default\" }".to_string()),
        }
        bodies.push(format!("{inner_pad}if (__selected === {i}) {{\n{body}{inner_pad}}}\n"));
    }
    let mut out = String::from("{\n");
    out.push_str(&format!(
        "{inner_pad}const [__selected, __selectResult] = await $.select([{}]);\n",
        descriptors.join(", ")
    ));
    for b in bodies {
        out.push_str(&b);
    }
    out.push_str(&format!("{pad}}}"));
    Ok(out)
}
