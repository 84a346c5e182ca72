use clap::Parser;
use owo_colors::OwoColorize;

use medext::ExtractError;
use medext::cli::Cli;
use medext::commands;
use medext::config::Config;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        use tracing_subscriber::EnvFilter;
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("medext=debug"));
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    }

    let mut config = match Config::init() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{} {}", "ERROR:".red(), e);
            std::process::exit(1);
        }
    };
    apply_overrides(&mut config, &cli);

    if let Err(e) = commands::handle_extract(&config) {
        print_abort(&e);
        std::process::exit(1);
    }
}

// Fold per-invocation CLI flags into the persisted configuration.
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(m) = &cli.manifest {
        config.manifest_path = m.clone();
    }
    if let Some(o) = &cli.output {
        config.output_dir = o.clone();
    }
    if let Some(h) = &cli.host {
        config.host = h.clone();
    }
    if let Some(p) = cli.port {
        config.port = p;
    }
    if let Some(u) = &cli.username {
        config.username = u.clone();
    }
    if cli.all {
        config.patient_ids = None;
    } else if !cli.patients.is_empty() {
        config.patient_ids = Some(cli.patients.clone());
    }
}

// Fatal errors abort with exit code 1; auth and connection failures get
// their own operator-facing wording.
fn print_abort(e: &anyhow::Error) {
    match e.downcast_ref::<ExtractError>() {
        Some(err) if err.is_auth_error() => {
            eprintln!("\n{} Authentication failed. Please check your password.", "ERROR:".red());
        }
        Some(err) if err.is_connection_error() => {
            eprintln!("\n{} SFTP connection failed: {}", "ERROR:".red(), err);
        }
        _ => {
            eprintln!("\n{} {}", "ERROR:".red(), e);
        }
    }
}
