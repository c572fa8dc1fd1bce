//! a live terminal graph of memory, cpu, and core topology.

use {
    anyhow::Context,
    clap::error::ErrorKind,
    std::process::ExitCode,
    sysplot::{App, Config, cli::Cli},
    tracing::debug,
    tracing_subscriber::EnvFilter,
};

fn main() -> ExitCode {
    init_tracing();

    let config = match Cli::try_config_from(std::env::args_os()) {
        Ok(config) => config,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = err.print();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            debug!(%err, "rejected arguments");
            eprintln!("{}", sysplot::cli::USAGE_ERROR);
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("sysplot: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let outcome = runtime
        .block_on(App::new(config).run())
        .context("dashboard failed")?;
    debug!(?outcome, "exiting");

    Ok(())
}

/// logs to standard error, filtered by `RUST_LOG`. only warnings are shown by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
