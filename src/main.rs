use notion2gcal::{shutdown, startup};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting notion2gcal");

    // Load configuration
    let config = startup::load_config()?;

    tokio::select! {
        report = startup::run(config) => {
            let report = report?;
            if report.failed() > 0 {
                warn!("{} events could not be created", report.failed());
            }
            Ok(())
        }
        _ = shutdown::wait_for_signal() => {
            warn!("Sync interrupted, some events may not have been created");
            Ok(())
        }
    }
}
