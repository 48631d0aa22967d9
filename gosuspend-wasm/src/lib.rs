//! §6.5 WASM entrypoint: a single `compile` export driving the full
//! analysis/lowering pipeline over an in-memory single-file package.
//!
//! There is no SL front end in this workspace (§6.1's parser/checker is an
//! external collaborator) — `source` is accepted to match the entrypoint's
//! shape but the in-memory demonstration fixture
//! (`gosuspend_compiler::demo_package`) stands in for what a real front end
//! would parse `source` into, keyed by `package_name`. Runtime metadata
//! lookup targets a path that is never expected to exist, so every package
//! resolves to "no async overrides" — the stub placeholder behavior this
//! module's docs describe.

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct CompileResult {
    output: String,
    error: Option<String>,
}

#[wasm_bindgen]
impl CompileResult {
    #[wasm_bindgen(getter)]
    pub fn output(&self) -> String {
        self.output.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn error(&self) -> Option<String> {
        self.error.clone()
    }
}

#[wasm_bindgen]
pub fn compile(source: &str, package_name: &str) -> CompileResult {
    let _ = source;
    let root = gosuspend_compiler::config::RuntimeMetadataRoot::new("/__gosuspend_wasm_no_metadata__");
    let (program, objects, types) = gosuspend_compiler::demo_package(package_name);

    let analysis = match gosuspend_compiler::analyze_package(package_name, &program, &objects, &types, &root) {
        Ok(a) => a,
        Err(e) => return CompileResult { output: String::new(), error: Some(e.to_string()) },
    };

    match gosuspend_compiler::compile_package(package_name, &program, &objects, &types, &analysis) {
        Ok(output) => CompileResult { output, error: None },
        Err(e) => CompileResult { output: String::new(), error: Some(e.to_string()) },
    }
}
