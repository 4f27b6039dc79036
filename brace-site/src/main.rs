//! The `brace-site` binary: parses arguments, sets up logging and runs a build or a
//! check, turning errors into exit codes.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Args, Parser, Subcommand};

use brace_site::{exit_codes, Site, SiteConfig, SiteError};

/// Renders the pages of a site with their partials and data, and copies its static files.
#[derive(Parser, Debug)]
#[command(name = "brace-site")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// More logging, repeat for even more
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render every page into the output directory and copy the static files.
    Build(BuildArgs),

    /// Render every page and report problems without writing anything.
    Check(SiteArgs),
}

#[derive(Args, Debug)]
struct SiteArgs {
    /// Root directory of the site
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Config file to use instead of `<root>/brace.json`
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail if any template produced a warning
    #[arg(long)]
    deny_warnings: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[command(flatten)]
    site: SiteArgs,

    /// Output directory, overriding the config
    #[arg(long)]
    out: Option<PathBuf>,
}

impl Cli {
    fn log_filter(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        }
    }
}

/// Loads the config and applies the command line overrides on top of it.
fn load_site(args: &SiteArgs, out: Option<PathBuf>) -> Result<Site, SiteError> {
    let mut config = SiteConfig::load(&args.root, args.config.as_deref())?;
    if let Some(out) = out {
        config.output_dir = out;
    }
    if args.deny_warnings {
        config.deny_warnings = true;
    }
    Site::load(&args.root, config)
}

fn run(command: Command) -> Result<(), SiteError> {
    match command {
        Command::Build(args) => {
            let site = load_site(&args.site, args.out)?;
            site.build()?;
        }
        Command::Check(args) => {
            let site = load_site(&args, None)?;
            let report = site.check()?;
            log::info!(
                "Checked {} page(s): {} warning(s)",
                report.pages.len(),
                report.warnings()
            );
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    match run(cli.command) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS),
        Err(err) => {
            let mut message = err.to_string();
            let mut source = std::error::Error::source(&err);
            while let Some(cause) = source {
                message.push_str(&format!("\n  caused by: {cause}"));
                source = cause.source();
            }
            log::error!("{message}");
            ExitCode::from(err.exit_code())
        }
    }
}
