//! Component E: the declaration sorter.
//!
//! Two independent Kahn sorts: package-level named-type declarations (so a
//! struct's fields are always emitted after the types they reference) and
//! package-level `var` initializers (so an initializer never reads a
//! not-yet-run sibling). Statements inside function bodies are never
//! reordered — only these two package-level declaration sets.

use crate::error::{Error, Result};
use gosuspend_ast::{Decl, Expr, NamedTypeId, ObjectArena, ObjectId, Program, Type, TypeArena};
use std::collections::{HashMap, HashSet};

/// Direct non-pointer dependencies of a named type's own declaration, per
/// the exact edge rule: struct fields, embedded fields, array/slice
/// elements, and (for a direct alias) the aliased type itself. No edges for
/// pointer fields, interface fields, map fields, function-typed fields, or
/// pointers-to-arrays.
fn type_deps(named: NamedTypeId, is_alias: bool, types: &TypeArena, out: &mut Vec<NamedTypeId>) {
    let data = types.named(named);
    if is_alias {
        collect_named(data.underlying, types, out);
        return;
    }
    for field in &data.fields {
        if field.is_pointer {
            continue;
        }
        collect_named(field.ty, types, out);
    }
    for embedded in &data.embedded_fields {
        if !embedded.is_pointer {
            out.push(embedded.named_type);
        }
    }
}

fn collect_named(ty: gosuspend_ast::TypeId, types: &TypeArena, out: &mut Vec<NamedTypeId>) {
    match types.get(ty) {
        Type::Named(n) | Type::Struct(n) => out.push(*n),
        Type::Array(elem, _) | Type::Slice(elem) => collect_named(*elem, types, out),
        _ => {}
    }
}

fn type_label(id: NamedTypeId, types: &TypeArena) -> String {
    let d = types.named(id);
    format!("{}.{}", d.package_path, d.name)
}

/// Kahn's algorithm over the named-type declaration graph. Ready-sets are
/// broken by sorting candidate types lexicographically by their
/// package-qualified name, matching the ordering guarantee used for the
/// async-status solver.
pub fn sort_types(program: &Program, types: &TypeArena) -> Result<Vec<NamedTypeId>> {
    let mut declared: Vec<(NamedTypeId, bool)> = Vec::new();
    for decl in &program.decls {
        if let Decl::TypeDecl { named, is_alias, .. } = decl {
            declared.push((*named, *is_alias));
        }
    }
    let declared_set: HashSet<NamedTypeId> = declared.iter().map(|(id, _)| *id).collect();

    let mut in_degree: HashMap<NamedTypeId, usize> = HashMap::new();
    let mut dependents: HashMap<NamedTypeId, Vec<NamedTypeId>> = HashMap::new();
    for (id, _) in &declared {
        in_degree.entry(*id).or_insert(0);
    }
    for (id, is_alias) in &declared {
        let mut deps = Vec::new();
        type_deps(*id, *is_alias, types, &mut deps);
        for dep in deps {
            if !declared_set.contains(&dep) || dep == *id {
                continue;
            }
            *in_degree.entry(*id).or_insert(0) += 1;
            dependents.entry(dep).or_default().push(*id);
        }
    }

    let mut ready: Vec<NamedTypeId> = declared
        .iter()
        .map(|(id, _)| *id)
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    ready.sort_by_key(|id| type_label(*id, types));

    let mut sorted = Vec::new();
    while !ready.is_empty() {
        let node = ready.remove(0);
        sorted.push(node);
        if let Some(deps) = dependents.get(&node) {
            let mut newly_ready = Vec::new();
            for d in deps {
                if let Some(count) = in_degree.get_mut(d) {
                    *count -= 1;
                    if *count == 0 {
                        newly_ready.push(*d);
                    }
                }
            }
            newly_ready.sort_by_key(|id| type_label(*id, types));
            ready.extend(newly_ready);
            ready.sort_by_key(|id| type_label(*id, types));
        }
    }

    if sorted.len() != declared.len() {
        let sorted_set: HashSet<NamedTypeId> = sorted.iter().copied().collect();
        let mut remaining: Vec<String> = declared
            .iter()
            .map(|(id, _)| *id)
            .filter(|id| !sorted_set.contains(id))
            .map(|id| type_label(id, types))
            .collect();
        remaining.sort();
        return Err(Error::CircularTypeDependency { remaining });
    }

    Ok(sorted)
}

/// Any package-level-var identifier syntactically reachable in an
/// expression, the value-initializer sort's dependency rule.
fn reachable_package_vars(expr: &Expr, package_vars: &HashSet<ObjectId>, out: &mut HashSet<ObjectId>) {
    match expr {
        Expr::Ident { object, .. } => {
            if package_vars.contains(object) {
                out.insert(*object);
            }
        }
        Expr::AddressOf { inner, .. } | Expr::Deref { inner, .. } | Expr::Unary { inner, .. } => {
            reachable_package_vars(inner, package_vars, out)
        }
        Expr::Binary { left, right, .. } => {
            reachable_package_vars(left, package_vars, out);
            reachable_package_vars(right, package_vars, out);
        }
        Expr::Call { callee, args, .. } => {
            reachable_package_vars(callee, package_vars, out);
            for a in args {
                reachable_package_vars(a, package_vars, out);
            }
        }
        Expr::Selector { base, .. } => reachable_package_vars(base, package_vars, out),
        Expr::Index { base, index, .. } => {
            reachable_package_vars(base, package_vars, out);
            reachable_package_vars(index, package_vars, out);
        }
        Expr::TypeAssert { target, .. } => reachable_package_vars(target, package_vars, out),
        Expr::MethodValue { receiver, .. } => reachable_package_vars(receiver, package_vars, out),
        Expr::ChannelRecv { channel, .. } => reachable_package_vars(channel, package_vars, out),
        Expr::CompositeLit { .. } | Expr::FuncLit { .. } => {
            // Composite-literal field values and function-literal bodies
            // are not reached by initializer-order dependencies: SL only
            // orders top-level package var initializers against each
            // other, not values nested arbitrarily deep in closures.
        }
        Expr::IntLit { .. } | Expr::FloatLit { .. } | Expr::StringLit { .. } | Expr::BoolLit { .. } | Expr::NilLit { .. } => {}
    }
}

fn var_label(id: ObjectId, objects: &ObjectArena) -> String {
    objects.get(id).name.clone()
}

/// Kahn's algorithm over package-level `var` initializers.
pub fn sort_initializers(program: &Program, objects: &ObjectArena) -> Result<Vec<ObjectId>> {
    let mut package_vars: HashSet<ObjectId> = HashSet::new();
    let mut inits: Vec<(ObjectId, Vec<Expr>)> = Vec::new();
    for decl in &program.decls {
        if let Decl::VarDecl { names, values, .. } = decl {
            for name in names {
                package_vars.insert(*name);
            }
            for (i, name) in names.iter().enumerate() {
                let relevant = if values.len() == names.len() {
                    vec![values[i].clone()]
                } else {
                    values.clone()
                };
                inits.push((*name, relevant));
            }
        }
    }

    let mut in_degree: HashMap<ObjectId, usize> = HashMap::new();
    let mut dependents: HashMap<ObjectId, Vec<ObjectId>> = HashMap::new();
    for (name, _) in &inits {
        in_degree.entry(*name).or_insert(0);
    }
    for (name, values) in &inits {
        let mut deps = HashSet::new();
        for v in values {
            reachable_package_vars(v, &package_vars, &mut deps);
        }
        deps.remove(name);
        for dep in deps {
            *in_degree.entry(*name).or_insert(0) += 1;
            dependents.entry(dep).or_default().push(*name);
        }
    }

    let mut ready: Vec<ObjectId> = inits
        .iter()
        .map(|(name, _)| *name)
        .filter(|id| in_degree.get(id).copied().unwrap_or(0) == 0)
        .collect();
    ready.sort_by_key(|id| var_label(*id, objects));

    let mut sorted = Vec::new();
    while !ready.is_empty() {
        let node = ready.remove(0);
        sorted.push(node);
        if let Some(deps) = dependents.get(&node) {
            let mut newly_ready = Vec::new();
            for d in deps {
                if let Some(count) = in_degree.get_mut(d) {
                    *count -= 1;
                    if *count == 0 {
                        newly_ready.push(*d);
                    }
                }
            }
            newly_ready.sort_by_key(|id| var_label(*id, objects));
            ready.extend(newly_ready);
            ready.sort_by_key(|id| var_label(*id, objects));
        }
    }

    if sorted.len() != inits.len() {
        let sorted_set: HashSet<ObjectId> = sorted.iter().copied().collect();
        let mut remaining: Vec<String> = inits
            .iter()
            .map(|(name, _)| *name)
            .filter(|id| !sorted_set.contains(id))
            .map(|id| var_label(id, objects))
            .collect();
        remaining.sort();
        return Err(Error::CircularValueInitializer { remaining });
    }

    Ok(sorted)
}
