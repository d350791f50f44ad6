use crate::cli::args::parse_args;
use crate::config::ToolchainConfig;
use crate::core::{interfaces::*, models::*, services::*};
use crate::infrastructure::{OxcBundler, ProcessTypeChecker, TokioFileSystemService};
use crate::utils::ui;
use std::sync::Arc;

/// How a single invocation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    HelpShown,
    Completed,
    UsageError,
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> u8 {
        match self {
            Outcome::HelpShown | Outcome::Completed => 0,
            Outcome::UsageError | Outcome::Failed => 1,
        }
    }
}

pub struct CliHandler {
    pipeline: BundlePipeline,
}

impl CliHandler {
    pub fn new(toolchain: &ToolchainConfig) -> Self {
        let fs_service: Arc<dyn FileSystemService> = Arc::new(TokioFileSystemService);
        let type_checker = Arc::new(ProcessTypeChecker::new(toolchain.checker.clone()));
        let bundler = Arc::new(OxcBundler::new(Arc::clone(&fs_service)));

        Self::with_pipeline(BundlePipeline::new(fs_service, type_checker, bundler))
    }

    pub fn with_pipeline(pipeline: BundlePipeline) -> Self {
        Self { pipeline }
    }

    pub async fn run<S: AsRef<str>>(&self, tokens: &[S]) -> Outcome {
        let config = match parse_args(tokens) {
            Ok(ParsedArgs::Help) => {
                ui::show_help();
                return Outcome::HelpShown;
            }
            Ok(ParsedArgs::Run(config)) => config,
            Err(err) => {
                ui::show_usage_error(&err.to_string());
                return Outcome::UsageError;
            }
        };

        match self.pipeline.run(&config).await {
            Ok(_) => {
                ui::show_success();
                Outcome::Completed
            }
            Err(err) => {
                tracing::debug!("Pipeline failed: {:?}", err);
                ui::show_failure(&err.to_string());
                Outcome::Failed
            }
        }
    }
}
