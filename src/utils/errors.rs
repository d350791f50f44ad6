use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("{0}")]
    Usage(String),

    #[error("Type-checking failed for {}:\n{stderr}", path.display())]
    TypeCheck { path: PathBuf, stderr: String },

    #[error("Failed to run type checker '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("Cannot resolve '{specifier}' from {}", importer.display())]
    Resolve { specifier: String, importer: PathBuf },

    #[error("Build error: {0}")]
    Build(String),

    #[error("{0}")]
    Other(String),
}

impl BundleError {
    /// Usage error for a command line without an entry file
    pub fn missing_entry() -> Self {
        Self::Usage("Missing required entry file. Use -h or --help for help.".to_string())
    }

    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Join a list of oxc diagnostics into a single parse error
    pub fn from_diagnostics<D: std::fmt::Display>(path: impl Into<PathBuf>, diagnostics: &[D]) -> Self {
        let message = diagnostics
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        Self::parse(path, message)
    }
}

pub type Result<T> = std::result::Result<T, BundleError>;

impl From<anyhow::Error> for BundleError {
    fn from(err: anyhow::Error) -> Self {
        BundleError::Other(format!("{err:#}"))
    }
}

impl From<sourcemap::Error> for BundleError {
    fn from(err: sourcemap::Error) -> Self {
        BundleError::build(format!("source map: {err}"))
    }
}
