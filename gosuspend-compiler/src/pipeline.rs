//! Orchestration: builds every analysis table once (`analyze_package`) and
//! drives lowering over a frozen `PackageAnalysis` (`compile_package`).
//!
//! Mirrors the teacher CLI's staged `info!`-logged pipeline: each stage is
//! a function call, not a trait object, and a failure in any stage aborts
//! the whole package rather than limping on with partial tables.

use crate::callgraph::{AsyncReturningVars, AsyncSolver, CallGraph, MethodAsyncStatus};
use crate::config::{to_external_async_metadata, RuntimeMetadataRoot};
use crate::error::{Error, Result};
use crate::escape::{receiver_pointer_map, EscapeTracker};
use crate::imports::ImportResolver;
use crate::interfaces::InterfaceIndex;
use crate::oracle::{StaticOracle, TypeOracle};
use crate::reflect_mark::ReflectMarker;
use crate::shadowing::ShadowAnalyzer;
use crate::writer::{StringTlWriter, TlWriter};
use gosuspend_ast::{Decl, MethodKey, ObjectArena, ObjectId, Program, TypeArena};
use std::collections::HashMap;

/// Every table §4's components build, frozen before lowering starts
/// (§5: "the analysis tables ... are frozen before lowering and therefore
/// require no locking").
pub struct PackageAnalysis {
    pub escape: EscapeTracker,
    pub interfaces: InterfaceIndex,
    pub call_graph: CallGraph,
    pub async_status: MethodAsyncStatus,
    pub async_returning_vars: AsyncReturningVars,
    pub shadows: ShadowAnalyzer,
    pub reflect: ReflectMarker,
    pub imports: ImportResolver,
    pub sorted_types: Vec<gosuspend_ast::NamedTypeId>,
    pub sorted_initializers: Vec<ObjectId>,
}

fn build_method_objects(program: &Program, types: &TypeArena, objects: &ObjectArena) -> HashMap<MethodKey, ObjectId> {
    let mut out = HashMap::new();
    for decl in &program.decls {
        if let Decl::Func(f) = decl {
            if let Some(recv) = &f.receiver {
                let named = types.named(recv.named_type);
                let method_name = objects.get(f.object).name.clone();
                let key = MethodKey::method(named.package_path.clone(), named.name.clone(), method_name);
                out.insert(key, f.object);
            }
        }
    }
    out
}

/// Runs components A–H over one already-parsed package. `metadata_root`
/// is the handwritten-runtime tree (§6.1); missing metadata for this
/// package is not an error.
pub fn analyze_package(
    package_path: &str,
    program: &Program,
    objects: &ObjectArena,
    types: &TypeArena,
    metadata_root: &RuntimeMetadataRoot,
) -> Result<PackageAnalysis> {
    log::info!("analyzing package {package_path}");

    let oracle = StaticOracle::new(objects, types);

    let receiver_pointer = receiver_pointer_map(program, types, objects);
    let escape = EscapeTracker::analyze(program, types, &receiver_pointer);
    log::debug!("escape analysis complete");

    let mut ifaces = InterfaceIndex::default();
    ifaces.implements_sweep(types, &oracle);
    ifaces.scan_program(program, types, &oracle);
    log::debug!("interface-implementation index built");

    let call_graph = CallGraph::build(package_path, program, objects, types, &ifaces);
    let meta = metadata_root
        .load_package(package_path)
        .map_err(|e| Error::TypeCheck(format!("reading runtime metadata for {package_path}: {e}")))?;
    let external = to_external_async_metadata(&meta);
    let async_status = AsyncSolver::solve(&call_graph, package_path, &external);
    log::debug!("async propagation converged");

    let async_returning_vars = AsyncReturningVars::scan(program, types);
    let shadows = ShadowAnalyzer::analyze(program, objects, types);
    let reflect = ReflectMarker::analyze(program, objects);

    let method_objects = build_method_objects(program, types, objects);
    let imports = ImportResolver::analyze(program, types, objects, &method_objects, package_path);

    let sorted_types = crate::decl_order::sort_types(program, types)?;
    let sorted_initializers = crate::decl_order::sort_initializers(program, objects)?;
    log::debug!("declaration order resolved");

    Ok(PackageAnalysis {
        escape,
        interfaces: ifaces,
        call_graph,
        async_status,
        async_returning_vars,
        shadows,
        reflect,
        imports,
        sorted_types,
        sorted_initializers,
    })
}

/// Drives §4.I lowering over one file using an already-built
/// `PackageAnalysis`, producing the TL source text. On a lowering error the
/// writer is aborted and the partial text discarded (§7).
pub fn compile_package(
    package_path: &str,
    program: &Program,
    objects: &ObjectArena,
    types: &TypeArena,
    analysis: &PackageAnalysis,
) -> Result<String> {
    log::info!("lowering package {package_path}");
    let oracle = StaticOracle::new(objects, types);
    let mut writer = StringTlWriter::new();

    for resolved in analysis.imports.resolved() {
        writer.write_import(&resolved.external_name, &resolved.path);
    }

    let ctx = crate::lowering::LoweringCtx {
        package_path,
        objects,
        types,
        oracle: &oracle,
        escape: &analysis.escape,
        interfaces: &analysis.interfaces,
        async_status: &analysis.async_status,
        async_returning_vars: &analysis.async_returning_vars,
        shadows: &analysis.shadows,
        reflect: &analysis.reflect,
    };

    for &named in &analysis.sorted_types {
        if let Err(e) = crate::lowering::decls::lower_type_decl(&ctx, named, &mut writer) {
            writer.abort();
            return Err(e);
        }
    }

    let mut var_decl_of: HashMap<ObjectId, usize> = HashMap::new();
    for (idx, decl) in program.decls.iter().enumerate() {
        if let Decl::VarDecl { names, .. } = decl {
            for name in names {
                var_decl_of.insert(*name, idx);
            }
        }
    }
    let mut emitted_var_decls: std::collections::HashSet<usize> = std::collections::HashSet::new();
    for &name in &analysis.sorted_initializers {
        let Some(&idx) = var_decl_of.get(&name) else { continue };
        if !emitted_var_decls.insert(idx) {
            continue;
        }
        if let Decl::VarDecl { names, values, .. } = &program.decls[idx] {
            if let Err(e) = crate::lowering::decls::lower_var_decl(&ctx, names, values, &mut writer) {
                writer.abort();
                return Err(e);
            }
        }
    }

    for decl in &program.decls {
        if let Decl::ConstDecl { name, value, .. } = decl {
            if let Err(e) = crate::lowering::decls::lower_const_decl(&ctx, *name, value, &mut writer) {
                writer.abort();
                return Err(e);
            }
        }
    }

    for decl in &program.decls {
        if let Decl::Func(f) = decl {
            if let Err(e) = crate::lowering::decls::lower_func_decl(&ctx, f, &mut writer) {
                writer.abort();
                return Err(e);
            }
        }
    }

    Ok(writer.finish())
}
