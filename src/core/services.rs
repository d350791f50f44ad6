use crate::core::{interfaces::*, models::*};
use crate::utils::{BundleError, Logger, Result, Timer};
use std::path::PathBuf;
use std::sync::Arc;

/// Type-check then bundle one entry file
pub struct BundlePipeline {
    fs_service: Arc<dyn FileSystemService>,
    type_checker: Arc<dyn TypeChecker>,
    bundler: Arc<dyn Bundler>,
}

impl BundlePipeline {
    pub fn new(
        fs_service: Arc<dyn FileSystemService>,
        type_checker: Arc<dyn TypeChecker>,
        bundler: Arc<dyn Bundler>,
    ) -> Self {
        Self {
            fs_service,
            type_checker,
            bundler,
        }
    }

    /// Runs the whole pipeline and returns the written output path. The
    /// bundler is not called unless the type check passed (or is disabled).
    pub async fn run(&self, config: &BundleConfig) -> Result<PathBuf> {
        if config.check {
            self.type_check(config).await?;
        } else {
            Logger::type_check_skipped(&config.entry_point);
        }

        self.bundle_file(config).await
    }

    pub async fn type_check(&self, config: &BundleConfig) -> Result<()> {
        let _timer = Timer::start("Type-checking");
        Logger::type_check_start(&config.entry_point);

        let outcome = self.type_checker.check(&config.entry_point).await?;
        if !outcome.passed() {
            return Err(BundleError::TypeCheck {
                path: config.entry_point.clone(),
                stderr: outcome.stderr,
            });
        }

        Logger::type_check_passed(&config.entry_point, &outcome.stdout);
        Ok(())
    }

    pub async fn bundle_file(&self, config: &BundleConfig) -> Result<PathBuf> {
        let _timer = Timer::start("Bundling");
        Logger::bundling(&config.entry_point, &config.module_kind.to_string());

        let output = self.bundler.bundle(&BundleRequest::from(config)).await?;

        if let Some(parent) = config.outfile.parent() {
            if !parent.as_os_str().is_empty() {
                self.fs_service.create_directory(parent).await?;
            }
        }
        self.fs_service.write_file(&config.outfile, &output.code).await?;

        Logger::bundle_saved(&config.outfile, output.modules, output.code.len());
        Ok(config.outfile.clone())
    }
}
