//! Component I: the lowering policy (§4.I). Each submodule owns one of the
//! spec's decision tables; none of them build a TL AST — they decide
//! strings and hand them to a `TlWriter`.

pub mod assignment;
pub mod calls;
pub mod composite_lit;
pub mod control_flow;
pub mod decls;
pub mod selectors;
pub mod zero_value;

use crate::callgraph::{AsyncReturningVars, MethodAsyncStatus};
use crate::escape::EscapeTracker;
use crate::interfaces::InterfaceIndex;
use crate::oracle::TypeOracle;
use crate::reflect_mark::ReflectMarker;
use crate::shadowing::ShadowAnalyzer;
use gosuspend_ast::{ObjectArena, TypeArena};

/// Everything every lowering submodule needs read access to. Built once per
/// file from a frozen `PackageAnalysis` (`pipeline::compile_package`).
pub struct LoweringCtx<'a> {
    pub package_path: &'a str,
    pub objects: &'a ObjectArena,
    pub types: &'a TypeArena,
    pub oracle: &'a dyn TypeOracle,
    pub escape: &'a EscapeTracker,
    pub interfaces: &'a InterfaceIndex,
    pub async_status: &'a MethodAsyncStatus,
    pub async_returning_vars: &'a AsyncReturningVars,
    pub shadows: &'a ShadowAnalyzer,
    pub reflect: &'a ReflectMarker,
}
