//! Component H: import resolver and per-file synthetic imports.
//!
//! Resolves each source import to the external name TL must bind it under,
//! drops blank/dot imports, sanitizes names that collide with TL reserved
//! words, and computes the synthetic per-file import set a record's
//! embedded-field method promotion pulls in without a syntactic mention.

use gosuspend_ast::{FuncSig, Import, MethodKey, NamedTypeId, ObjectArena, Program, Type, TypeArena, TypeId};
use std::collections::{HashMap, HashSet};

/// TL reserved words an import's external name must not collide with.
/// The runtime `$` and the emitted cooperative-scheduler prelude live in
/// this same namespace, so the set is intentionally generous.
const RESERVED_WORDS: &[&str] = &[
    "class", "function", "const", "let", "var", "return", "new", "this", "import", "export", "default", "in", "of",
    "typeof", "instanceof", "void", "delete", "yield", "await", "async", "interface", "type", "enum", "implements",
    "extends", "super", "static", "get", "set", "package", "private", "protected", "public", "null", "true", "false",
    "if", "else", "for", "while", "switch", "case", "break", "continue", "try", "catch", "finally", "throw",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImport {
    pub path: String,
    pub external_name: String,
}

fn sanitize(name: &str) -> String {
    if RESERVED_WORDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

fn path_tail(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

#[derive(Debug, Default)]
pub struct ImportResolver {
    resolved: Vec<ResolvedImport>,
    synthetic: HashSet<String>,
}

impl ImportResolver {
    /// Resolves `program`'s own import lines: `alias` of `"_"` or `"."`
    /// drops the import entirely; any other alias wins over the path-tail
    /// fallback.
    pub fn resolve_imports(program: &Program) -> Vec<ResolvedImport> {
        program
            .imports
            .iter()
            .filter_map(|imp| resolve_one(imp))
            .collect()
    }

    /// Full per-file resolution: regular imports plus synthetic imports
    /// pulled in by embedded-field method promotion. `method_objects` is the
    /// whole-program `MethodKey -> function object` registry the signature
    /// walk consults to see a promoted method's parameter/result types.
    pub fn analyze(
        program: &Program,
        types: &TypeArena,
        objects: &ObjectArena,
        method_objects: &HashMap<MethodKey, gosuspend_ast::ObjectId>,
        own_package: &str,
    ) -> Self {
        let resolved = Self::resolve_imports(program);
        let explicit: HashSet<String> = resolved.iter().map(|r| r.path.clone()).collect();

        let mut referenced_packages: HashSet<String> = HashSet::new();
        for decl in &program.decls {
            if let gosuspend_ast::Decl::TypeDecl { named, .. } = decl {
                collect_embedded_signature_packages(*named, types, objects, method_objects, &mut HashSet::new(), &mut referenced_packages);
            }
        }
        referenced_packages.remove(own_package);

        let synthetic: HashSet<String> = referenced_packages.difference(&explicit).cloned().collect();

        Self { resolved, synthetic }
    }

    pub fn resolved(&self) -> &[ResolvedImport] {
        &self.resolved
    }

    /// Packages that must be imported in this file despite never being
    /// mentioned syntactically, because an embedded record's promoted
    /// method signature references them.
    pub fn synthetic_imports(&self) -> impl Iterator<Item = &str> {
        self.synthetic.iter().map(|s| s.as_str())
    }
}

fn resolve_one(imp: &Import) -> Option<ResolvedImport> {
    match imp.alias.as_deref() {
        Some("_") | Some(".") => None,
        Some(alias) => Some(ResolvedImport { path: imp.path.clone(), external_name: sanitize(alias) }),
        None => Some(ResolvedImport { path: imp.path.clone(), external_name: sanitize(path_tail(&imp.path)) }),
    }
}

fn collect_embedded_signature_packages(
    named: NamedTypeId,
    types: &TypeArena,
    objects: &ObjectArena,
    method_objects: &HashMap<MethodKey, gosuspend_ast::ObjectId>,
    visited: &mut HashSet<NamedTypeId>,
    out: &mut HashSet<String>,
) {
    if !visited.insert(named) {
        return;
    }
    let data = types.named(named);
    for embedded in &data.embedded_fields {
        let embedded_data = types.named(embedded.named_type);
        for method in &embedded_data.methods {
            if let Some(obj) = method_objects.get(method) {
                let ty = objects.get(*obj).ty;
                if let Type::Func(sig) = types.get(ty) {
                    collect_sig_packages(sig, types, out);
                }
            }
        }
        collect_embedded_signature_packages(embedded.named_type, types, objects, method_objects, visited, out);
    }
}

fn collect_sig_packages(sig: &FuncSig, types: &TypeArena, out: &mut HashSet<String>) {
    for ty in sig.params.iter().chain(sig.results.iter()) {
        collect_type_packages(*ty, types, out);
    }
}

fn collect_type_packages(ty: TypeId, types: &TypeArena, out: &mut HashSet<String>) {
    match types.get(ty) {
        Type::Named(n) | Type::Struct(n) | Type::Interface(n) => {
            out.insert(types.named(*n).package_path.clone());
        }
        Type::Pointer(inner) | Type::Slice(inner) => collect_type_packages(*inner, types, out),
        Type::Array(elem, _) => collect_type_packages(*elem, types, out),
        Type::Map(k, v) => {
            collect_type_packages(*k, types, out);
            collect_type_packages(*v, types, out);
        }
        Type::Chan(inner, _) => collect_type_packages(*inner, types, out),
        Type::Func(sig) => collect_sig_packages(sig, types, out),
        _ => {}
    }
}
