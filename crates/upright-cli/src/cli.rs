//! Command-line arguments.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "upright",
    version,
    about = "Auto-orient and optimize uploaded JPEG and PNG files in place"
)]
pub struct Cli {
    /// Configuration file (defaults to ./upright.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process uploaded files in place
    Process(ProcessArgs),
    /// Report which optimizer binaries are missing
    Check,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// JPEG quality (1-100); out-of-range values fall back to 85
    #[arg(short, long, allow_negative_numbers = true)]
    pub quality: Option<i64>,

    /// MIME type for all files instead of detecting it per file
    #[arg(long, value_name = "TYPE")]
    pub mime: Option<String>,

    /// Skip EXIF auto-orientation
    #[arg(long)]
    pub no_orient: bool,

    /// Skip the external optimizers
    #[arg(long)]
    pub no_optimize: bool,

    /// Files to process
    #[arg(required = true, value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Default log filter when RUST_LOG is unset.
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_process() {
        let cli = Cli::try_parse_from([
            "upright", "-vv", "process", "--quality", "70", "--no-optimize", "a.jpg", "b.png",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), "trace");
        let Command::Process(args) = cli.command else {
            panic!("expected process");
        };
        assert_eq!(args.quality, Some(70));
        assert!(args.no_optimize);
        assert!(!args.no_orient);
        assert_eq!(args.files, vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")]);
    }

    #[test]
    fn test_process_requires_files() {
        assert!(Cli::try_parse_from(["upright", "process"]).is_err());
    }

    #[test]
    fn test_global_config_after_subcommand() {
        let cli = Cli::try_parse_from(["upright", "check", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(cli.command, Command::Check));
        assert_eq!(cli.log_level(), "info");
    }
}
