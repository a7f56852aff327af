use std::process::{ExitCode, Termination};

use anyhow::{anyhow, Context};
use clap::Parser;
use plausible_analytics::{CustomEvent, Dispatch, EventData, Location, Tracker, TrackerConfig};

#[derive(clap::Parser, Debug)]
#[command(
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "Send a single event to a Plausible collector",
    long_about = None
)]
pub struct Cli {
    /// Name of the event
    #[arg(default_value = plausible_analytics::PAGEVIEW)]
    pub(crate) event: String,

    /// Address of the tracked page. Defaults to the location.
    #[arg(long = "url")]
    pub(crate) url: Option<String>,

    #[arg(long = "referrer")]
    pub(crate) referrer: Option<String>,

    #[arg(long = "device-width")]
    pub(crate) device_width: Option<i64>,

    /// Address the event is sent from, used to detect local setups. Defaults to the tracked page.
    #[arg(long = "location")]
    pub(crate) location: Option<String>,

    #[command(flatten)]
    pub(crate) config: TrackerConfig,
}

impl Cli {
    async fn run(self) -> ExitCode {
        match self.run_command().await {
            Ok(code) => code,
            Err(err) => {
                eprintln!("Error: {err}");
                for (n, err) in err.chain().skip(1).enumerate() {
                    if n == 0 {
                        eprintln!("Caused by:");
                    }
                    eprintln!("\t{err}");
                }

                ExitCode::FAILURE
            }
        }
    }

    async fn run_command(self) -> anyhow::Result<ExitCode> {
        self.send().await?;
        Ok(ExitCode::SUCCESS)
    }

    async fn send(self) -> anyhow::Result<Dispatch> {
        let location = self
            .location
            .as_deref()
            .or(self.url.as_deref())
            .ok_or_else(|| anyhow!("Either --location or --url is required"))?;
        let location = Location::parse(location).with_context(|| format!("Invalid location: {location}"))?;

        let tracker = Tracker::new(self.config, location).context("Failed to create tracker")?;
        let event = CustomEvent::new(self.event).with_data(EventData {
            url: self.url,
            referrer: self.referrer,
            device_width: self.device_width,
            ..Default::default()
        });

        let dispatch = tracker.track_and_wait(event).await;
        match dispatch {
            Dispatch::Sent => log::info!("Event sent to {}", tracker.config().api_host),
            Dispatch::Suppressed => log::info!("Event not sent, running locally"),
            Dispatch::Dropped => log::info!("Event dropped"),
        }

        Ok(dispatch)
    }
}

fn init_logging() {
    if let Err(e) = env_logger::builder().format_timestamp_millis().try_init() {
        eprintln!("Error initializing logging: {:?}", e);
    }
}

#[tokio::main]
async fn main() -> impl Termination {
    init_logging();
    Cli::parse().run().await
}
