use crate::config::CheckerCommand;
use crate::core::{interfaces::TypeChecker, models::CheckOutcome};
use crate::utils::{BundleError, Result};
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Spawns the configured checker (`deno check` by default) for the entry file
pub struct ProcessTypeChecker {
    command: CheckerCommand,
}

impl ProcessTypeChecker {
    pub fn new(command: CheckerCommand) -> Self {
        Self { command }
    }
}

#[async_trait::async_trait]
impl TypeChecker for ProcessTypeChecker {
    async fn check(&self, entry: &Path) -> Result<CheckOutcome> {
        let output = Command::new(&self.command.program)
            .args(&self.command.args)
            .arg(entry)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| BundleError::Spawn {
                program: self.command.program.clone(),
                source,
            })?;

        Ok(CheckOutcome {
            success: output.status.success(),
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
