use anyhow::{Context, Result};
use clap::Parser;
use mbench::cancel::{install_interrupt_handler, CancellationToken};
use mbench::cli::{Cli, Commands};
use mbench::commands::{self, Status};
use mbench::config::BenchConfig;
use mbench::progress::ProgressBar;
use mbench::runner::ShellExecutor;
use std::io;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Execute `run`, drawing the progress bar only when enabled
fn run_command(
    config: &BenchConfig,
    command: &[String],
    cancel: &CancellationToken,
) -> Result<Status> {
    eprintln!("Running {} times {}:", config.runs, command.join(" "));

    let mut executor = ShellExecutor::default();
    let mut out = io::stdout().lock();
    let status = if config.progress {
        let mut bar = ProgressBar::stderr(config.runs);
        commands::run(config, command, &mut executor, cancel, &mut bar, &mut out)
    } else {
        let mut bar = ProgressBar::hidden(config.runs);
        commands::run(config, command, &mut executor, cancel, &mut bar, &mut out)
    };
    Ok(status?)
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let Some(command) = args.command.clone() else {
        println!("No command provided.");
        std::process::exit(1);
    };

    let config = BenchConfig::from(&args);
    config.validate()?;
    tracing::debug!(?config, "configuration");

    let cancel = install_interrupt_handler().context("Failed to install SIGINT handler")?;

    let status = match command {
        Commands::Run { command } => run_command(&config, &command, &cancel)?,
        Commands::Show { files } => {
            commands::show(&config, &files, &cancel, &mut io::stdout().lock())?
        }
        Commands::Compare { files } => {
            commands::compare(&config, &files, &cancel, &mut io::stdout().lock())?
        }
        Commands::Doc => {
            commands::doc(&mut io::stdout().lock())?;
            Status::Completed
        }
    };

    if status == Status::Interrupted {
        tracing::debug!("interrupted; exiting cleanly");
    }
    Ok(())
}
