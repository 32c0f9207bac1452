use crate::infra::{candidate_from_path, parse_profile, InMemoryBatchStore};
use clap::Args;
use finlens::config::AppConfig;
use finlens::error::AppError;
use finlens::intake::{
    BatchSummary, CandidateFile, ChannelStatusObserver, IntakeOutcome, IntakeProfile,
    IntakeStatus, IntakeTimings, StatusUpdate, UploadIntakeController, UploadManifest,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

#[derive(Args, Debug, Default)]
pub(crate) struct IntakeCheckArgs {
    /// Upload profile to validate against (defaults to INTAKE_PROFILE)
    #[arg(long, value_parser = parse_profile)]
    pub(crate) profile: Option<IntakeProfile>,
    /// CSV manifest with name,size_bytes,type columns
    #[arg(long)]
    pub(crate) manifest: Option<PathBuf>,
    /// Skip the simulated processing delays
    #[arg(long)]
    pub(crate) immediate: bool,
    /// Local files to offer, in order
    pub(crate) paths: Vec<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Skip the simulated processing delays
    #[arg(long)]
    pub(crate) immediate: bool,
}

pub(crate) async fn run_intake_check(args: IntakeCheckArgs) -> Result<(), AppError> {
    let IntakeCheckArgs {
        profile,
        manifest,
        immediate,
        paths,
    } = args;

    let config = AppConfig::load()?;
    let profile = profile.unwrap_or(config.intake.profile);
    let timings = if immediate {
        IntakeTimings::immediate()
    } else {
        config.intake.timings
    };

    let mut files = match manifest {
        Some(path) => UploadManifest::from_path(path)?,
        None => Vec::new(),
    };
    for path in &paths {
        files.push(candidate_from_path(path)?);
    }

    run_intake(profile, files, timings).await.map(|_| ())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let timings = if args.immediate {
        IntakeTimings::immediate()
    } else {
        IntakeTimings::default()
    };

    println!("Document intake demo");
    let files = vec![
        CandidateFile::new("income-statement-2022.xlsx", 48_128, "application/vnd.ms-excel"),
        CandidateFile::new("income-statement-2023.xlsx", 51_200, "application/vnd.ms-excel"),
        CandidateFile::new("income-statement-2024.xlsx", 53_760, "application/vnd.ms-excel"),
        CandidateFile::new("letterhead.png", 9_216, "image/png"),
    ];

    run_intake(IntakeProfile::IncomeStatement, files, timings)
        .await
        .map(|_| ())
}

async fn run_intake(
    profile: IntakeProfile,
    files: Vec<CandidateFile>,
    timings: IntakeTimings,
) -> Result<IntakeOutcome, AppError> {
    let config = profile.configuration();
    let (sender, receiver) = unbounded_channel();
    let controller = UploadIntakeController::new(
        Arc::new(ChannelStatusObserver::new(sender)),
        Arc::new(InMemoryBatchStore::default()),
        timings,
    );

    println!("{}: {}", profile.title(), config.describe());
    let delays = controller.timings();
    println!(
        "Delays: processing {}ms, success reset {}ms, error reset {}ms",
        delays.processing.as_millis(),
        delays.success_reset.as_millis(),
        delays.error_reset.as_millis()
    );
    println!("Offering {} file(s)", files.len());

    let handle = controller.submit(files, &config)?;
    print_updates_until_idle(receiver).await;
    let outcome = handle.wait().await?;

    match &outcome {
        IntakeOutcome::Accepted(summary) => render_summary(summary),
        IntakeOutcome::Rejected(rejection) => println!("\nNo batch produced: {rejection}"),
    }

    Ok(outcome)
}

async fn print_updates_until_idle(mut receiver: UnboundedReceiver<StatusUpdate>) {
    while let Some(update) = receiver.recv().await {
        println!("{}", render_update(&update));
        if update.status == IntakeStatus::Idle {
            break;
        }
    }
}

fn render_update(update: &StatusUpdate) -> String {
    let mut line = format!(
        "  [{}] {:<9} {}",
        update.at.format("%H:%M:%S%.3f"),
        update.status.label(),
        update.status.headline()
    );
    if let Some(message) = &update.message {
        line.push_str(": ");
        line.push_str(message);
    }
    line
}

fn render_summary(summary: &BatchSummary) {
    println!("\n{}", summary.headline());
    for file in &summary.files {
        println!("  - {} ({} MB • {})", file.name, file.size_mb, file.kind);
    }
}
