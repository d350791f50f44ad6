use std::fmt;
use std::path::PathBuf;

/// Shape of the emitted bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModuleKind {
    /// Keeps `import`/`export` syntax
    #[default]
    Esm,
    /// Self-executing function for plain `<script>` tags
    Classic,
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleKind::Esm => write!(f, "esm"),
            ModuleKind::Classic => write!(f, "classic"),
        }
    }
}

/// Options for one invocation, built once by the argument parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleConfig {
    pub entry_point: PathBuf,
    pub outfile: PathBuf,
    pub module_kind: ModuleKind,
    pub minify: bool,
    pub source_map: bool,
    pub check: bool,
}

/// Result of the `-h`/`--help` scan and positional parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedArgs {
    Help,
    Run(BundleConfig),
}

/// Raw outcome of a type-checker process
#[derive(Debug, Clone, Default)]
pub struct CheckOutcome {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.success && self.code == Some(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompilerOptions {
    /// Fail on semantic errors in every bundled module
    pub check_js: bool,
    pub inline_source_map: bool,
}

/// What the bundler needs to know about a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleRequest {
    pub entry_point: PathBuf,
    pub module_kind: ModuleKind,
    pub minify: bool,
    pub compiler_options: CompilerOptions,
}

impl From<&BundleConfig> for BundleRequest {
    fn from(config: &BundleConfig) -> Self {
        Self {
            entry_point: config.entry_point.clone(),
            module_kind: config.module_kind,
            minify: config.minify,
            compiler_options: CompilerOptions {
                check_js: config.check,
                inline_source_map: config.source_map,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct BundleOutput {
    pub code: String,
    pub modules: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_reuses_check_flag_as_check_js() {
        let config = BundleConfig {
            entry_point: PathBuf::from("main.ts"),
            outfile: PathBuf::from("main.js"),
            module_kind: ModuleKind::Classic,
            minify: true,
            source_map: true,
            check: false,
        };

        let request = BundleRequest::from(&config);
        assert_eq!(request.module_kind, ModuleKind::Classic);
        assert!(request.minify);
        assert!(!request.compiler_options.check_js);
        assert!(request.compiler_options.inline_source_map);
    }

    #[test]
    fn test_check_outcome_requires_zero_code() {
        let outcome = CheckOutcome {
            success: true,
            code: None,
            ..Default::default()
        };
        assert!(!outcome.passed());

        let outcome = CheckOutcome {
            success: true,
            code: Some(0),
            ..Default::default()
        };
        assert!(outcome.passed());
    }
}
