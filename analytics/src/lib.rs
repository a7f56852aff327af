//! Fire-and-forget event beacons for a Plausible analytics collector.

mod config;
mod environment;
mod payload;
mod sender;
mod tracker;

#[cfg(test)]
mod test_log;

pub use config::*;
pub use environment::*;
pub use payload::*;
pub use sender::*;
pub use tracker::*;

/// Name of the event recording a page view.
pub const PAGEVIEW: &str = "pageview";

/// Per-event values, overriding the tracker configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventData {
    pub url: Option<String>,
    pub domain: Option<String>,
    /// An empty referrer is treated like no referrer.
    pub referrer: Option<String>,
    pub device_width: Option<i64>,
    pub hash_mode: Option<bool>,
    pub track_localhost: Option<bool>,
    pub api_host: Option<String>,
}

pub trait TrackingEvent {
    /// The name of the event
    fn name(&self) -> &str;

    /// Values overriding the defaults of the tracker
    fn data(&self) -> EventData {
        Default::default()
    }
}

/// A page view of the current location.
#[derive(Copy, Clone, Debug, Default)]
pub struct Pageview;

impl TrackingEvent for Pageview {
    fn name(&self) -> &str {
        PAGEVIEW
    }
}

/// An event which is only known by its name at runtime.
#[derive(Clone, Debug)]
pub struct CustomEvent {
    name: String,
    data: EventData,
}

impl CustomEvent {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Default::default(),
        }
    }

    pub fn with_data(mut self, data: EventData) -> Self {
        self.data = data;
        self
    }
}

impl TrackingEvent for CustomEvent {
    fn name(&self) -> &str {
        &self.name
    }

    fn data(&self) -> EventData {
        self.data.clone()
    }
}
