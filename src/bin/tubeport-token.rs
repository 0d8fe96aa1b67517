use mimalloc::MiMalloc;
use std::process::ExitCode;
use tracing::error;
use tubeport::Orchestrator;
use tubeport::config::Config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Authorize and store `token.json` without importing anything.
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
        Ok(cfg) => match Orchestrator::from_config(&cfg) {
            Ok(orchestrator) => orchestrator.authorize_only().await,
            Err(e) => Err(e),
        },
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => {
            println!("Token saved. You can now run `tubeport` to import subscriptions.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "authorization failed");
            ExitCode::FAILURE
        }
    }
}
