use crate::core::models::*;
use crate::utils::Result;
use async_trait::async_trait;
use std::path::Path;

/// File system operations interface
#[async_trait]
pub trait FileSystemService: Send + Sync {
    async fn read_file(&self, path: &Path) -> Result<String>;
    async fn write_file(&self, path: &Path, content: &str) -> Result<()>;
    async fn create_directory(&self, path: &Path) -> Result<()>;
    fn file_exists(&self, path: &Path) -> bool;
}

/// Runs an external type checker against one entry file
#[async_trait]
pub trait TypeChecker: Send + Sync {
    async fn check(&self, entry: &Path) -> Result<CheckOutcome>;
}

/// Turns an entry file into a single bundled source text
#[async_trait]
pub trait Bundler: Send + Sync {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleOutput>;
}
