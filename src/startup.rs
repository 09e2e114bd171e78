use crate::components::sync::{
    CalendarSink, DryRunSink, EventMapper, SyncDriver, SyncReport, TaskSource,
};
use crate::components::{GoogleCalendarHandle, NotionClient};
use crate::config::Config;
use crate::error::{Error, SyncResult};
use crate::utils::clock::SystemClock;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initialize logging with environment-based configuration
pub fn init_logging() -> miette::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| Error::Other(format!("Failed to set up logging: {}", e)))?;

    Ok(())
}

/// Load the application config
pub fn load_config() -> miette::Result<Config> {
    match Config::load() {
        Ok(config) => Ok(config),
        Err(e) => {
            error!("Failed to load configuration: {:?}", e);
            Err(e.into())
        }
    }
}

/// Build the collaborators and run one sync pass
pub async fn run(config: Config) -> miette::Result<SyncReport> {
    let mapper = EventMapper::new(&config.mapper, Arc::new(SystemClock))?;
    let source = NotionClient::new(&config);

    let report = if config.dry_run {
        info!("Dry run, no events will be created");
        sync(&config, source, DryRunSink::default(), mapper).await?
    } else {
        let calendar = GoogleCalendarHandle::new(&config);
        let result = sync(&config, source, calendar.clone(), mapper).await;
        calendar.shutdown().await?;
        result?
    };

    for outcome in &report.outcomes {
        info!("{}", outcome);
    }

    Ok(report)
}

async fn sync<S: TaskSource, C: CalendarSink>(
    config: &Config,
    source: S,
    sink: C,
    mapper: EventMapper,
) -> SyncResult<SyncReport> {
    SyncDriver::new(source, sink, mapper)
        .with_max_concurrent_creates(config.max_concurrent_creates)
        .run()
        .await
}
