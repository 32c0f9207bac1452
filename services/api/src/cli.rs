use crate::demo::{run_demo, run_intake_check, DemoArgs, IntakeCheckArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use finlens::error::AppError;
use finlens::intake::IntakeProfile;

#[derive(Parser, Debug)]
#[command(
    name = "GenAI Financial Analyzer",
    about = "Run the document intake service or validate uploads from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Validate local files the way the dashboard drop zone does
    Intake {
        #[command(subcommand)]
        command: IntakeCommand,
    },
    /// Walk through the spreadsheet upload scenario with live status output
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum IntakeCommand {
    /// Submit files or a CSV manifest and print each status transition
    Check(IntakeCheckArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Override the upload profile used when a request does not name one
    #[arg(long, value_parser = crate::infra::parse_profile)]
    pub(crate) profile: Option<IntakeProfile>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Intake {
            command: IntakeCommand::Check(args),
        } => run_intake_check(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["finlens-api"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn intake_check_collects_paths_and_profile() {
        let cli = Cli::try_parse_from([
            "finlens-api",
            "intake",
            "check",
            "--profile",
            "business-model",
            "annual.pdf",
            "strategy.docx",
        ])
        .expect("parses");

        match cli.command {
            Some(Command::Intake {
                command: IntakeCommand::Check(args),
            }) => {
                assert_eq!(args.profile, Some(IntakeProfile::BusinessModel));
                assert_eq!(args.paths.len(), 2);
                assert!(args.manifest.is_none());
            }
            other => panic!("expected intake check, got {other:?}"),
        }
    }

    #[test]
    fn unknown_profile_is_a_usage_error() {
        let parsed = Cli::try_parse_from(["finlens-api", "serve", "--profile", "charts"]);
        assert!(parsed.is_err());
    }
}
