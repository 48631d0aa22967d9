//! Ambient configuration: discovery of the handwritten-runtime metadata
//! tree that seeds `MethodAsyncStatus` before the call-graph solver runs.
//! Grounded on the teacher formatter's `Config::from_dir` directory-search
//! idiom, adapted from a single-file lookup to a recursive directory scan.

use crate::callgraph::ExternalAsyncMetadata;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

const META_FILE_NAME: &str = "meta.json";

/// One package directory's `meta.json`: its own dependency package paths
/// and the known async-ness of its exported functions/methods.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageMeta {
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default, rename = "asyncMethods")]
    pub async_methods: HashMap<String, bool>,
}

impl PackageMeta {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Root of the handwritten-runtime metadata tree: one directory per
/// package, each optionally carrying a `meta.json`. A missing file means
/// "no async overrides" for that package, never an error.
#[derive(Debug, Clone)]
pub struct RuntimeMetadataRoot {
    root: PathBuf,
}

impl RuntimeMetadataRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Loads `meta.json` for a single package path (dot-separated segments
    /// map to nested directories under the root), returning an empty
    /// metadata set if the package has no handwritten-runtime entry at all.
    pub fn load_package(&self, package_path: &str) -> anyhow::Result<PackageMeta> {
        let dir = self.package_dir(package_path);
        let meta_path = dir.join(META_FILE_NAME);
        if meta_path.exists() {
            PackageMeta::from_file(&meta_path)
        } else {
            Ok(PackageMeta::default())
        }
    }

    fn package_dir(&self, package_path: &str) -> PathBuf {
        let mut dir = self.root.clone();
        for segment in package_path.split('/') {
            dir.push(segment);
        }
        dir
    }

    /// Discovers every package directory under the root carrying a
    /// `meta.json`, for a bulk preload rather than per-package lookup.
    pub fn scan(&self) -> anyhow::Result<HashMap<String, PackageMeta>> {
        let mut out = HashMap::new();
        if !self.root.exists() {
            return Ok(out);
        }
        self.scan_dir(&self.root, &mut Vec::new(), &mut out)?;
        Ok(out)
    }

    fn scan_dir(&self, dir: &Path, prefix: &mut Vec<String>, out: &mut HashMap<String, PackageMeta>) -> anyhow::Result<()> {
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                let name = entry.file_name().to_string_lossy().to_string();
                prefix.push(name);
                let meta_path = path.join(META_FILE_NAME);
                if meta_path.exists() {
                    out.insert(prefix.join("/"), PackageMeta::from_file(&meta_path)?);
                }
                self.scan_dir(&path, prefix, out)?;
                prefix.pop();
            }
        }
        Ok(())
    }
}

/// Converts a scanned `PackageMeta` into the solver's
/// `ExternalAsyncMetadata`. `asyncMethods` keys are already in the
/// `"Type.Method"` / `"Function"` shape `ExternalAsyncMetadata::known`
/// expects verbatim.
pub fn to_external_async_metadata(meta: &PackageMeta) -> ExternalAsyncMetadata {
    ExternalAsyncMetadata { known: meta.async_methods.clone() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_meta_file_is_not_an_error() {
        let root = RuntimeMetadataRoot::new("/nonexistent/path/for/test");
        let meta = root.load_package("some/pkg").unwrap();
        assert!(meta.async_methods.is_empty());
    }

    #[test]
    fn parses_meta_json_shape() {
        let dir = std::env::temp_dir().join(format!("gosuspend_config_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(META_FILE_NAME),
            r#"{"dependencies": ["fmt"], "asyncMethods": {"Conn.Read": true, "Dial": false}}"#,
        )
        .unwrap();
        let meta = PackageMeta::from_file(&dir.join(META_FILE_NAME)).unwrap();
        assert_eq!(meta.dependencies, vec!["fmt".to_string()]);
        assert_eq!(meta.async_methods.get("Conn.Read"), Some(&true));
        std::fs::remove_dir_all(&dir).ok();
    }
}
