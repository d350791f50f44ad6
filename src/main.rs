// tsbundle - entry point, wiring lives in the library

use std::process::ExitCode;
use tsbundle::cli::CliHandler;
use tsbundle::config::ToolchainConfig;
use tsbundle::utils::Logger;

#[tokio::main]
async fn main() -> ExitCode {
    let toolchain = ToolchainConfig::from_env();
    Logger::init(&toolchain.log_filter);

    let tokens: Vec<String> = std::env::args().skip(1).collect();
    let outcome = CliHandler::new(&toolchain).run(&tokens).await;

    ExitCode::from(outcome.exit_code())
}
