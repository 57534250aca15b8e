//! rabeflow binary: parse arguments, run the pipeline, map errors to the
//! process exit status.

use clap::error::ErrorKind;
use clap::Parser;
use rabeflow::cli::{execute, Cli};
use rabeflow::report::format_elapsed;

#[tokio::main]
async fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // clap renders its own usage text; help and version requests
            // are not failures.
            let code = match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    match execute(&cli).await {
        Ok(result) => {
            tracing::info!(
                chains_run = result.chains_run,
                elapsed = %format_elapsed(result.elapsed),
                "pipeline completed"
            );
        }
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// Structured logs go to stderr; operator progress lines stay on stdout.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rabeflow={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
