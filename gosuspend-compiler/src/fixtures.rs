//! The in-memory demonstration package the CLI and WASM shim drive when no
//! real SL front end is wired in (§6.2, §6.5: both are thin callers over
//! whatever `Program`/`TypeArena`/`ObjectArena` a caller builds).
//!
//! Exercises a representative slice of the lowering policy — a struct
//! declaration, a pointer-receiver method, and a field selector — without
//! requiring a parser this crate doesn't ship.

use gosuspend_ast::{
    Block, Decl, Expr, FuncDecl, FuncSig, MethodKey, NamedTypeData, NodeIdGen, ObjectArena,
    ObjectData, ObjectKind, Program, Receiver, StructField, Stmt, Type, TypeArena,
};

/// Builds a one-method demo package: `type Greeter struct { Name string }`
/// with `func (g *Greeter) Greet() string { return g.Name }`.
pub fn demo_package(package_path: &str) -> (Program, ObjectArena, TypeArena) {
    let mut types = TypeArena::new();
    let mut objects = ObjectArena::new();
    let mut nodes = NodeIdGen::new();

    let str_ty = types.intern(Type::Str);

    let greeter = types.declare_named(NamedTypeData {
        package_path: package_path.to_string(),
        name: "Greeter".to_string(),
        underlying: str_ty,
        methods: vec![MethodKey::method(package_path, "Greeter", "Greet")],
        embedded_fields: vec![],
        fields: vec![StructField { name: "Name".to_string(), ty: str_ty, is_pointer: false }],
    });
    let struct_ty = types.intern(Type::Struct(greeter));
    types.named_mut(greeter).underlying = struct_ty;

    let recv_ty = types.intern(Type::Pointer(struct_ty));
    let recv_obj = objects.declare(ObjectData {
        name: "g".to_string(),
        kind: ObjectKind::Param,
        ty: recv_ty,
        is_blank: false,
    });

    let func_ty = types.intern(Type::Func(FuncSig { params: vec![], variadic: false, results: vec![str_ty] }));
    let greet_obj = objects.declare(ObjectData {
        name: "Greet".to_string(),
        kind: ObjectKind::Method,
        ty: func_ty,
        is_blank: false,
    });

    let receiver_expr = Expr::Ident { node: nodes.next(), ty: recv_ty, object: recv_obj };
    let name_selector = Expr::Selector {
        node: nodes.next(),
        ty: str_ty,
        base: Box::new(receiver_expr),
        member: "Name".to_string(),
    };
    let body = Block { stmts: vec![Stmt::Return { node: nodes.next(), values: vec![name_selector] }] };

    let func_decl = FuncDecl {
        node: nodes.next(),
        object: greet_obj,
        receiver: Some(Receiver { object: recv_obj, named_type: greeter, is_pointer: true }),
        params: vec![],
        named_results: vec![],
        body,
    };

    let program = Program {
        file: format!("{package_path}/greeter.go"),
        imports: vec![],
        decls: vec![
            Decl::TypeDecl { node: nodes.next(), named: greeter, is_alias: false },
            Decl::Func(func_decl),
        ],
    };

    (program, objects, types)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_package_has_one_type_and_one_func() {
        let (program, _objects, _types) = demo_package("demo");
        assert_eq!(program.decls.len(), 2);
    }
}
