use std::process::ExitCode;

use hemmer_scaffold::{init_logging_with_default, run};

#[tokio::main]
async fn main() -> ExitCode {
    init_logging_with_default("warn");
    run(std::env::args_os().skip(1)).await
}
