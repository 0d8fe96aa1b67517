use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::{error, info};
use tubeport::config::Config;
use tubeport::{Orchestrator, RunSummary, TubeportError};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let cfg = Config::load();
    let loglevel = cfg
        .as_ref()
        .map(|c| c.basic.loglevel.clone())
        .unwrap_or_else(|_| "info".to_string());
    tubeport::logging::init_tracing(&loglevel);

    let result = match cfg {
        Ok(cfg) => run(&cfg).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "subscription import aborted");
            ExitCode::FAILURE
        }
    }
}

async fn run(cfg: &Config) -> Result<(), TubeportError> {
    let orchestrator = Orchestrator::from_config(cfg)?;
    let summary = orchestrator.run().await?;

    let report = summary.report();
    let via = match &summary {
        RunSummary::ExistingCredential(_) => "stored credential",
        RunSummary::Authorized(_) => "new authorization",
    };
    info!(via, "Subscription process completed.");
    println!(
        "Subscribed to {} of {} channels ({} invalid URLs, {} rejected by the API).",
        report.subscribed(),
        report.total(),
        report.extraction_failures(),
        report.subscribe_failures()
    );
    Ok(())
}
