use crate::core::interfaces::FileSystemService;
use crate::utils::{BundleError, Result};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

const EXTENSIONS: &[&str] = &["ts", "tsx", "mts", "js", "jsx", "mjs"];

/// Where an import specifier points to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A file that gets inlined into the bundle
    Local(PathBuf),
    /// Left to the runtime (bare names, `npm:`, `jsr:`, `node:`, URLs)
    External(String),
}

/// Relative/absolute path resolution with TypeScript-style extension probing
pub struct ModuleResolver {
    fs_service: Arc<dyn FileSystemService>,
}

impl ModuleResolver {
    pub fn new(fs_service: Arc<dyn FileSystemService>) -> Self {
        Self { fs_service }
    }

    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<Resolution> {
        if !is_path_specifier(specifier) {
            return Ok(Resolution::External(specifier.to_string()));
        }

        let base = if specifier.starts_with('/') {
            PathBuf::from(specifier)
        } else {
            importer
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(specifier)
        };

        self.resolve_file_or_directory(&normalize_path(&base))
            .map(Resolution::Local)
            .ok_or_else(|| BundleError::Resolve {
                specifier: specifier.to_string(),
                importer: importer.to_path_buf(),
            })
    }

    fn resolve_file_or_directory(&self, path: &Path) -> Option<PathBuf> {
        if self.fs_service.file_exists(path) {
            return Some(path.to_path_buf());
        }

        // `./util` -> `./util.ts`, `./util.js`, ...
        for ext in EXTENSIONS {
            let candidate = append_extension(path, ext);
            if self.fs_service.file_exists(&candidate) {
                return Some(candidate);
            }
        }

        // `./util.js` written for a `util.ts` source
        let ts_counterparts: &[&str] = match path.extension().and_then(|e| e.to_str()) {
            Some("js") => &["ts", "tsx"],
            Some("jsx") => &["tsx"],
            Some("mjs") => &["mts"],
            _ => &[],
        };
        for ext in ts_counterparts {
            let candidate = path.with_extension(ext);
            if self.fs_service.file_exists(&candidate) {
                return Some(candidate);
            }
        }

        EXTENSIONS
            .iter()
            .map(|ext| path.join(format!("index.{ext}")))
            .find(|candidate| self.fs_service.file_exists(candidate))
    }
}

pub fn is_path_specifier(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/')
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_os_string();
    raw.push(".");
    raw.push(ext);
    PathBuf::from(raw)
}

/// Lexically fold `.` and `..` so one file always gets one module id
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(normalized.components().next_back(), Some(Component::Normal(_)));
                if can_pop {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
