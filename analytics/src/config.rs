use std::time::Duration;

/// The public Plausible instance.
pub const DEFAULT_API_HOST: &str = "https://plausible.io";

/// Everything required to send a single event.
///
/// All fields must be set by the caller, the sender does not apply any defaults.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Configuration {
    /// The address of the tracked page.
    pub url: String,
    /// The site the event is attributed to.
    pub domain: String,
    pub referrer: Option<String>,
    pub device_width: i64,
    /// The site routes using the URL fragment.
    pub hash_mode: bool,
    /// Base address of the collector, without the `/api/event` suffix.
    pub api_host: String,
    /// Send events even when running on a local host.
    pub track_localhost: bool,
}

#[derive(Clone, Debug, clap::Args, serde::Deserialize)]
#[command(next_help_heading = "Plausible configuration")]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    /// The site domain to report events for. Defaults to the host name of the tracked page.
    #[arg(long = "plausible-domain", env = "PLAUSIBLE_DOMAIN")]
    pub domain: Option<String>,

    /// Base address of the Plausible collector.
    #[arg(long = "plausible-api-host", env = "PLAUSIBLE_API_HOST", default_value = DEFAULT_API_HOST)]
    pub api_host: String,

    /// The site uses fragment based routing.
    #[arg(long = "plausible-hash-mode", env = "PLAUSIBLE_HASH_MODE", default_value_t = false)]
    pub hash_mode: bool,

    /// Send events when running on localhost or from a file.
    #[arg(
        long = "plausible-track-localhost",
        env = "PLAUSIBLE_TRACK_LOCALHOST",
        default_value_t = false
    )]
    pub track_localhost: bool,

    /// Time after which an in-flight event is given up.
    #[arg(
        long = "plausible-timeout",
        env = "PLAUSIBLE_TIMEOUT",
        default_value = "10s",
        value_parser = humantime::parse_duration
    )]
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            domain: None,
            api_host: DEFAULT_API_HOST.to_string(),
            hash_mode: false,
            track_localhost: false,
            timeout: Duration::from_secs(10),
        }
    }
}
