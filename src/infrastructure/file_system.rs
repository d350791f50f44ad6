use crate::core::interfaces::FileSystemService;
use crate::utils::Result;
use anyhow::Context;
use std::path::Path;
use tokio::fs;

pub struct TokioFileSystemService;

#[async_trait::async_trait]
impl FileSystemService for TokioFileSystemService {
    async fn read_file(&self, path: &Path) -> Result<String> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(content)
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    async fn create_directory(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)
            .await
            .with_context(|| format!("Failed to create directory {}", path.display()))?;
        Ok(())
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
