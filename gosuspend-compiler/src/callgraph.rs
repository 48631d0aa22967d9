//! Component D: call-graph builder and topological async solver.
//!
//! Classifies every function, method, method-value, interface method, and
//! async-returning variable as suspending or non-suspending, so the
//! lowering policy (component I) knows exactly where to insert `await`.

use crate::interfaces::{InterfaceIndex, InterfaceMethodKey};
use gosuspend_ast::{
    Block, Decl, Expr, MethodKey, NamedTypeId, ObjectArena, ObjectId, Program, SelectCaseKind,
    Stmt, Type, TypeArena,
};
use std::collections::{HashMap, HashSet};

/// One package's worth of external runtime metadata: `Type.Method` or bare
/// `Function` keys mapped to known async-ness. Loaded eagerly and never
/// overwritten by the solver (§4.D).
#[derive(Debug, Clone, Default)]
pub struct ExternalAsyncMetadata {
    pub known: HashMap<String, bool>,
}

fn method_key_of(package_path: &str, f: &gosuspend_ast::FuncDecl, objects: &ObjectArena, types: &TypeArena) -> MethodKey {
    let name = objects.get(f.object).name.clone();
    match &f.receiver {
        Some(recv) => {
            let named = types.named(recv.named_type);
            MethodKey::method(named.package_path.clone(), named.name.clone(), name)
        }
        None => MethodKey::function(package_path.to_string(), name),
    }
}

#[derive(Debug, Default)]
pub struct CallGraph {
    edges: HashMap<MethodKey, Vec<MethodKey>>,
    /// Whether each node's own body contains an intrinsic async source
    /// (channel send/receive, select).
    intrinsic: HashMap<MethodKey, bool>,
}

struct BuildCtx<'a> {
    package_path: &'a str,
    objects: &'a ObjectArena,
    types: &'a TypeArena,
    ifaces: &'a InterfaceIndex,
}

impl CallGraph {
    fn node(&mut self, key: MethodKey) {
        self.edges.entry(key).or_default();
    }

    fn edge(&mut self, from: MethodKey, to: MethodKey) {
        self.node(from.clone());
        self.node(to.clone());
        if let Some(list) = self.edges.get_mut(&from) {
            list.push(to);
        }
    }

    pub fn build(package_path: &str, program: &Program, objects: &ObjectArena, types: &TypeArena, ifaces: &InterfaceIndex) -> Self {
        let mut graph = Self::default();
        let ctx = BuildCtx { package_path, objects, types, ifaces };
        for decl in &program.decls {
            if let Decl::Func(f) = decl {
                let caller = method_key_of(package_path, f, objects, types);
                graph.node(caller.clone());
                let mut has_intrinsic = false;
                graph.walk_block(&f.body, &caller, &ctx, &mut has_intrinsic);
                graph.intrinsic.insert(caller, has_intrinsic);
            }
        }
        graph
    }

    fn walk_block(&mut self, block: &Block, caller: &MethodKey, ctx: &BuildCtx, has_intrinsic: &mut bool) {
        for stmt in &block.stmts {
            self.walk_stmt(stmt, caller, ctx, has_intrinsic);
        }
    }

    fn walk_stmt(&mut self, stmt: &Stmt, caller: &MethodKey, ctx: &BuildCtx, has_intrinsic: &mut bool) {
        match stmt {
            Stmt::Send { channel, value, .. } => {
                *has_intrinsic = true;
                self.walk_expr(channel, caller, ctx, has_intrinsic);
                self.walk_expr(value, caller, ctx, has_intrinsic);
            }
            Stmt::Select { cases, .. } => {
                *has_intrinsic = true;
                for case in cases {
                    match &case.kind {
                        SelectCaseKind::Send { channel, value } => {
                            self.walk_expr(channel, caller, ctx, has_intrinsic);
                            self.walk_expr(value, caller, ctx, has_intrinsic);
                        }
                        SelectCaseKind::Recv { channel, .. } => {
                            self.walk_expr(channel, caller, ctx, has_intrinsic);
                        }
                        SelectCaseKind::Default => {}
                    }
                    self.walk_block(&case.body, caller, ctx, has_intrinsic);
                }
            }
            Stmt::RangeChannel { channel, body, .. } => {
                *has_intrinsic = true;
                self.walk_expr(channel, caller, ctx, has_intrinsic);
                self.walk_block(body, caller, ctx, has_intrinsic);
            }
            Stmt::Assign { lhs, rhs, .. } => {
                for e in lhs.iter().chain(rhs.iter()) {
                    self.walk_expr(e, caller, ctx, has_intrinsic);
                }
            }
            Stmt::Expr(e) => self.walk_expr(e, caller, ctx, has_intrinsic),
            Stmt::Return { values, .. } => {
                for v in values {
                    self.walk_expr(v, caller, ctx, has_intrinsic);
                }
            }
            Stmt::If { cond, then_block, else_block, .. } => {
                self.walk_expr(cond, caller, ctx, has_intrinsic);
                self.walk_block(then_block, caller, ctx, has_intrinsic);
                if let Some(e) = else_block {
                    self.walk_block(e, caller, ctx, has_intrinsic);
                }
            }
            Stmt::For { init, cond, post, body, .. } => {
                if let Some(i) = init {
                    self.walk_stmt(i, caller, ctx, has_intrinsic);
                }
                if let Some(c) = cond {
                    self.walk_expr(c, caller, ctx, has_intrinsic);
                }
                if let Some(p) = post {
                    self.walk_stmt(p, caller, ctx, has_intrinsic);
                }
                self.walk_block(body, caller, ctx, has_intrinsic);
            }
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => {
                self.walk_expr(call, caller, ctx, has_intrinsic);
            }
            Stmt::Block(b) => self.walk_block(b, caller, ctx, has_intrinsic),
            Stmt::BareReturn { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }

    fn walk_expr(&mut self, expr: &Expr, caller: &MethodKey, ctx: &BuildCtx, has_intrinsic: &mut bool) {
        match expr {
            Expr::Call { callee, args, .. } => {
                self.record_call_edges(callee, caller, ctx);
                self.walk_expr(callee, caller, ctx, has_intrinsic);
                for a in args {
                    self.walk_expr(a, caller, ctx, has_intrinsic);
                }
            }
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left, caller, ctx, has_intrinsic);
                self.walk_expr(right, caller, ctx, has_intrinsic);
            }
            Expr::Unary { inner, .. } | Expr::AddressOf { inner, .. } | Expr::Deref { inner, .. } => {
                self.walk_expr(inner, caller, ctx, has_intrinsic)
            }
            Expr::Selector { base, .. } => self.walk_expr(base, caller, ctx, has_intrinsic),
            Expr::Index { base, index, .. } => {
                self.walk_expr(base, caller, ctx, has_intrinsic);
                self.walk_expr(index, caller, ctx, has_intrinsic);
            }
            Expr::ChannelRecv { channel, .. } => {
                *has_intrinsic = true;
                self.walk_expr(channel, caller, ctx, has_intrinsic);
            }
            Expr::TypeAssert { target, .. } => self.walk_expr(target, caller, ctx, has_intrinsic),
            Expr::MethodValue { receiver, .. } => self.walk_expr(receiver, caller, ctx, has_intrinsic),
            Expr::FuncLit { body, .. } => self.walk_block(body, caller, ctx, has_intrinsic),
            _ => {}
        }
    }

    fn record_call_edges(&mut self, callee: &Expr, caller: &MethodKey, ctx: &BuildCtx) {
        match callee {
            Expr::Ident { object, .. } => {
                let name = ctx.objects.get(*object).name.clone();
                let key = MethodKey::function(ctx.package_path.to_string(), name);
                self.edge(caller.clone(), key);
            }
            Expr::Selector { base, member, .. } => {
                let base_ty = base.ty();
                match ctx.types.get(base_ty) {
                    Type::Interface(iface) => {
                        let iface_str = format!(
                            "{}.{}",
                            ctx.types.named(*iface).package_path,
                            ctx.types.named(*iface).name
                        );
                        let key = InterfaceMethodKey {
                            interface_type_string: iface_str,
                            method_name: member.clone(),
                        };
                        for imp in ctx.ifaces.implementations(&key) {
                            self.edge(caller.clone(), imp.method.clone());
                        }
                    }
                    _ => {
                        if let Some(named) = named_type_of(base_ty, ctx.types) {
                            let data = ctx.types.named(named);
                            let key = MethodKey::method(data.package_path.clone(), data.name.clone(), member.clone());
                            self.edge(caller.clone(), key);
                        } else if let Expr::Ident { object, .. } = base.as_ref() {
                            // Unresolved selector base: a package-qualified
                            // call `pkg.Name` into an imported package.
                            let pkg = ctx.objects.get(*object).name.clone();
                            let key = MethodKey::function(pkg, member.clone());
                            self.edge(caller.clone(), key);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    pub fn intrinsic_async(&self, key: &MethodKey) -> bool {
        self.intrinsic.get(key).copied().unwrap_or(false)
    }

    pub fn callees(&self, key: &MethodKey) -> &[MethodKey] {
        self.edges.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MethodKey> {
        self.edges.keys()
    }
}

fn named_type_of(ty: gosuspend_ast::TypeId, types: &TypeArena) -> Option<NamedTypeId> {
    match types.get(ty) {
        Type::Named(n) | Type::Struct(n) => Some(*n),
        Type::Pointer(inner) => named_type_of(*inner, types),
        _ => None,
    }
}

/// Monotone (§4.D/§5): entries only flip `false -> true`, never removed or
/// reverted.
#[derive(Debug, Default)]
pub struct MethodAsyncStatus {
    status: HashMap<MethodKey, bool>,
    fixed: HashSet<MethodKey>,
}

impl MethodAsyncStatus {
    pub fn is_async(&self, key: &MethodKey) -> bool {
        self.status.get(key).copied().unwrap_or(false)
    }

    fn set(&mut self, key: MethodKey, value: bool) {
        if self.fixed.contains(&key) {
            return;
        }
        let entry = self.status.entry(key).or_insert(false);
        *entry = *entry || value;
    }

    fn load_external(&mut self, package_path: &str, meta: &ExternalAsyncMetadata) {
        for (name, is_async) in &meta.known {
            let key = if let Some((ty, m)) = name.split_once('.') {
                MethodKey::method(package_path.to_string(), ty.to_string(), m.to_string())
            } else {
                MethodKey::function(package_path.to_string(), name.clone())
            };
            self.status.insert(key.clone(), *is_async);
            self.fixed.insert(key);
        }
    }
}

/// A variable whose value is a function that, when called, returns a
/// promise — §4.D step 6.
#[derive(Debug, Default)]
pub struct AsyncReturningVars {
    vars: HashSet<ObjectId>,
}

impl AsyncReturningVars {
    pub fn is_async_returning(&self, obj: ObjectId) -> bool {
        self.vars.contains(&obj)
    }

    /// Scans `x := f(...)` short-decls across the package for the pattern:
    /// `x`'s static type is a function signature and one of the call
    /// arguments is an async function literal (its body contains an
    /// intrinsic async source). Runs before the function-literal pass so
    /// nested literals inherit the flag.
    pub fn scan(program: &Program, types: &TypeArena) -> Self {
        let mut vars = HashSet::new();
        for decl in &program.decls {
            if let Decl::Func(f) = decl {
                scan_block(&f.body, types, &mut vars);
            }
        }
        Self { vars }
    }
}

fn scan_block(block: &Block, types: &TypeArena, vars: &mut HashSet<ObjectId>) {
    for stmt in &block.stmts {
        scan_stmt(stmt, types, vars);
    }
}

fn scan_stmt(stmt: &Stmt, types: &TypeArena, vars: &mut HashSet<ObjectId>) {
    match stmt {
        Stmt::Assign { lhs, rhs, .. } => {
            for (l, r) in lhs.iter().zip(rhs.iter()) {
                if let (Expr::Ident { object, ty, .. }, Expr::Call { args, .. }) = (l, r) {
                    if matches!(types.get(*ty), Type::Func(_)) && args.iter().any(is_async_func_lit) {
                        vars.insert(*object);
                    }
                }
                scan_expr(r, types, vars);
            }
        }
        Stmt::Expr(e) => scan_expr(e, types, vars),
        Stmt::Return { values, .. } => {
            for v in values {
                scan_expr(v, types, vars);
            }
        }
        Stmt::If { cond, then_block, else_block, .. } => {
            scan_expr(cond, types, vars);
            scan_block(then_block, types, vars);
            if let Some(e) = else_block {
                scan_block(e, types, vars);
            }
        }
        Stmt::For { body, .. } => scan_block(body, types, vars),
        Stmt::RangeChannel { body, .. } => scan_block(body, types, vars),
        Stmt::Select { cases, .. } => {
            for case in cases {
                scan_block(&case.body, types, vars);
            }
        }
        Stmt::Block(b) => scan_block(b, types, vars),
        Stmt::Defer { call, .. } | Stmt::Go { call, .. } => scan_expr(call, types, vars),
        Stmt::Send { .. } | Stmt::BareReturn { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
    }
}

fn scan_expr(expr: &Expr, types: &TypeArena, vars: &mut HashSet<ObjectId>) {
    if let Expr::FuncLit { body, .. } = expr {
        scan_block(body, types, vars);
    }
}

fn is_async_func_lit(expr: &Expr) -> bool {
    if let Expr::FuncLit { body, .. } = expr {
        block_has_intrinsic(body)
    } else {
        false
    }
}

fn block_has_intrinsic(block: &Block) -> bool {
    block.stmts.iter().any(stmt_has_intrinsic)
}

fn stmt_has_intrinsic(stmt: &Stmt) -> bool {
    match stmt {
        Stmt::Send { .. } | Stmt::Select { .. } | Stmt::RangeChannel { .. } => true,
        Stmt::If { then_block, else_block, .. } => {
            block_has_intrinsic(then_block) || else_block.as_ref().map(block_has_intrinsic).unwrap_or(false)
        }
        Stmt::For { body, .. } => block_has_intrinsic(body),
        Stmt::Block(b) => block_has_intrinsic(b),
        _ => false,
    }
}

/// Lexicographic `MethodKey` ordering, used to stabilize Kahn ready-set
/// iteration order (§4.D's "ordering guarantee").
fn sort_keys(keys: &mut [MethodKey]) {
    keys.sort_by(|a, b| {
        (&a.package_path, &a.receiver_type_name, &a.method_name).cmp(&(
            &b.package_path,
            &b.receiver_type_name,
            &b.method_name,
        ))
    });
}

pub struct AsyncSolver;

impl AsyncSolver {
    /// Runs the full algorithm from §4.D: external metadata load, Kahn sort
    /// over the non-fixed part of the graph, bounded cyclic fixed point,
    /// forward propagation over the DAG part.
    pub fn solve(graph: &CallGraph, package_path: &str, metadata: &ExternalAsyncMetadata) -> MethodAsyncStatus {
        let mut status = MethodAsyncStatus::default();
        status.load_external(package_path, metadata);

        let mut in_degree: HashMap<MethodKey, usize> = HashMap::new();
        let mut dependents: HashMap<MethodKey, Vec<MethodKey>> = HashMap::new();
        let mut all_nodes: Vec<MethodKey> = graph.nodes().cloned().collect();
        sort_keys(&mut all_nodes);

        for node in &all_nodes {
            in_degree.entry(node.clone()).or_insert(0);
            for callee in graph.callees(node) {
                if status.fixed.contains(callee) {
                    continue;
                }
                *in_degree.entry(node.clone()).or_insert(0) += 1;
                dependents.entry(callee.clone()).or_default().push(node.clone());
            }
        }

        let mut ready: Vec<MethodKey> = all_nodes
            .iter()
            .filter(|n| in_degree.get(*n).copied().unwrap_or(0) == 0)
            .cloned()
            .collect();
        sort_keys(&mut ready);

        let mut sorted = Vec::new();
        let mut in_sorted: HashSet<MethodKey> = HashSet::new();
        while !ready.is_empty() {
            let node = ready.remove(0);
            sorted.push(node.clone());
            in_sorted.insert(node.clone());
            if let Some(deps) = dependents.get(&node) {
                let mut newly_ready = Vec::new();
                for d in deps {
                    if let Some(count) = in_degree.get_mut(d) {
                        *count -= 1;
                        if *count == 0 {
                            newly_ready.push(d.clone());
                        }
                    }
                }
                sort_keys(&mut newly_ready);
                ready.extend(newly_ready);
                sort_keys(&mut ready);
            }
        }

        let mut cycles: Vec<MethodKey> = all_nodes
            .iter()
            .filter(|n| !in_sorted.contains(*n))
            .cloned()
            .collect();
        sort_keys(&mut cycles);

        // Cycle part: bounded fixed-point iteration (~10 passes). Monotone,
        // so repeated passes only ever add `true`s.
        for _ in 0..10 {
            let mut changed = false;
            for node in &cycles {
                let callee_async = graph.callees(node).iter().any(|c| status.is_async(c));
                let new_val = graph.intrinsic_async(node) || callee_async;
                if new_val && !status.is_async(node) {
                    status.set(node.clone(), true);
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }

        // DAG part, processed in dependency order (callees already settled
        // by construction since `sorted` only admits a node once every
        // non-fixed callee is already resolved).
        for node in &sorted {
            let callee_async = graph.callees(node).iter().any(|c| status.is_async(c));
            let val = graph.intrinsic_async(node) || callee_async;
            status.set(node.clone(), val);
        }

        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosuspend_ast::*;

    fn chan_send_program() -> (Program, ObjectArena, TypeArena) {
        let mut objects = ObjectArena::new();
        let mut types = TypeArena::new();
        let int_ty = types.intern(Type::Int { bits: 64, signed: true });
        let chan_ty = types.intern(Type::Chan(int_ty, ChanDir::Both));
        let c = objects.declare(ObjectData { name: "c".into(), kind: ObjectKind::Var, ty: chan_ty, is_blank: false });
        let mut idgen = NodeIdGen::new();
        let sender_body = Block {
            stmts: vec![Stmt::Send {
                node: idgen.next(),
                channel: Expr::Ident { node: idgen.next(), ty: chan_ty, object: c },
                value: Expr::IntLit { node: idgen.next(), ty: int_ty, value: 1 },
            }],
        };
        let sender_obj = objects.declare(ObjectData { name: "sender".into(), kind: ObjectKind::Func, ty: int_ty, is_blank: false });
        let caller_body = Block {
            stmts: vec![Stmt::Expr(Expr::Call {
                node: idgen.next(),
                ty: int_ty,
                callee: Box::new(Expr::Ident { node: idgen.next(), ty: int_ty, object: sender_obj }),
                args: vec![],
                has_ellipsis: false,
            })],
        };
        let caller_obj = objects.declare(ObjectData { name: "caller".into(), kind: ObjectKind::Func, ty: int_ty, is_blank: false });
        let program = Program {
            file: "demo.go".into(),
            imports: vec![],
            decls: vec![
                Decl::Func(FuncDecl { node: idgen.next(), object: sender_obj, receiver: None, params: vec![], named_results: vec![], body: sender_body }),
                Decl::Func(FuncDecl { node: idgen.next(), object: caller_obj, receiver: None, params: vec![], named_results: vec![], body: caller_body }),
            ],
        };
        (program, objects, types)
    }

    #[test]
    fn async_propagates_to_caller() {
        let (program, objects, types) = chan_send_program();
        let ifaces = InterfaceIndex::default();
        let graph = CallGraph::build("demo", &program, &objects, &types, &ifaces);
        let status = AsyncSolver::solve(&graph, "demo", &ExternalAsyncMetadata::default());
        assert!(status.is_async(&MethodKey::function("demo", "sender")));
        assert!(status.is_async(&MethodKey::function("demo", "caller")));
    }

    /// Property 3 (minimality): a function with no intrinsic suspension
    /// point and no async callee must stay non-async, even in a package
    /// that otherwise has async functions elsewhere in its call graph.
    #[test]
    fn uninvolved_function_stays_non_async() {
        let (mut program, mut objects, types) = chan_send_program();
        let int_ty = gosuspend_ast::TypeId(0);
        let mut idgen = NodeIdGen::new();
        let bystander_body = Block {
            stmts: vec![Stmt::Return { node: idgen.next(), values: vec![Expr::IntLit { node: idgen.next(), ty: int_ty, value: 1 }] }],
        };
        let bystander_obj = objects.declare(ObjectData { name: "bystander".into(), kind: ObjectKind::Func, ty: int_ty, is_blank: false });
        program.decls.push(Decl::Func(FuncDecl { node: idgen.next(), object: bystander_obj, receiver: None, params: vec![], named_results: vec![], body: bystander_body }));

        let ifaces = InterfaceIndex::default();
        let graph = CallGraph::build("demo", &program, &objects, &types, &ifaces);
        let status = AsyncSolver::solve(&graph, "demo", &ExternalAsyncMetadata::default());
        assert!(status.is_async(&MethodKey::function("demo", "sender")));
        assert!(!status.is_async(&MethodKey::function("demo", "bystander")));
    }
}
