use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(short, long, help = "Manifest CSV path (overrides config.json)")]
    pub manifest: Option<PathBuf>,
    #[clap(short, long, help = "Output directory (overrides config.json)")]
    pub output: Option<PathBuf>,
    #[clap(long, help = "SFTP host (overrides config.json)")]
    pub host: Option<String>,
    #[clap(long, help = "SFTP port (overrides config.json)")]
    pub port: Option<u16>,
    #[clap(short, long, help = "SFTP username (overrides config.json)")]
    pub username: Option<String>,
    #[clap(
        short = 'p',
        long = "patient",
        help = "Only extract documents for this patient Internal ID (repeatable)"
    )]
    pub patients: Vec<u64>,
    #[clap(long, help = "Ignore any configured patient-ID filter and extract everything")]
    pub all: bool,
    #[clap(short, long, help = "Print verbose diagnostic logs for debugging")]
    pub verbose: bool,
}
