use clap::Parser;
use form_pilot::cli::commands::{cmd_apply, cmd_inspect};
use form_pilot::cli::config::{load_config, Cli, Commands};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = load_config(cli.config.as_deref());
    // CLI > config file for the bridge script.
    let bridge_script = cli
        .bridge
        .clone()
        .unwrap_or_else(|| config.bridge.script.clone());

    match cli.command {
        Commands::Apply {
            url,
            answers,
            submit,
            max_steps,
            trigger,
            journal,
        } => {
            let answers_path = answers.or_else(|| config.session.answers_file.clone());
            let allow_submit = submit || config.session.allow_submit;
            let max_steps = max_steps.unwrap_or(config.session.max_steps);
            let journal = journal.or_else(|| config.outcome.journal.clone());

            let clean = cmd_apply(
                &url,
                answers_path.as_deref(),
                allow_submit,
                max_steps,
                &trigger,
                &bridge_script,
                journal.as_deref(),
            )?;
            if !clean {
                std::process::exit(1);
            }
        }
        Commands::Inspect { url, trigger } => {
            cmd_inspect(&url, &trigger, &bridge_script)?;
        }
    }

    Ok(())
}
