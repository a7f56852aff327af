use crate::config::Configuration;
use crate::environment::{is_local, Environment, Location};
use crate::payload::EventPayload;
use reqwest::header::CONTENT_TYPE;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;

/// Logged when an event is dropped because the site runs locally. Log scrapers match on this text.
pub const LOCAL_WARNING: &str = "[Plausible] Ignoring event because website is running locally";

pub type Callback = Box<dyn FnOnce() + Send + 'static>;

/// Per-event options.
#[derive(Default)]
pub struct EventOptions {
    callback: Option<Callback>,
}

impl EventOptions {
    /// Call `callback` once the request has settled, no matter if it succeeded or not.
    pub fn with_callback<F>(callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            callback: Some(Box::new(callback)),
        }
    }
}

impl fmt::Debug for EventOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventOptions")
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// What happened to an event handed to [`EventSender::send`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// The request was started in the background.
    Sent,
    /// The site runs locally and tracking localhost is not enabled.
    Suppressed,
    /// The request could not be started, e.g. outside an async runtime.
    Dropped,
}

/// Sends single events to the collector, without waiting for them.
#[derive(Clone)]
pub struct EventSender {
    client: reqwest::Client,
    environment: Arc<dyn Environment>,
}

impl fmt::Debug for EventSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSender")
            .field("location", &self.environment.location())
            .finish_non_exhaustive()
    }
}

pub fn event_url(api_host: &str) -> String {
    format!("{api_host}/api/event")
}

impl EventSender {
    pub fn new<E>(client: reqwest::Client, environment: E) -> Self
    where
        E: Environment + 'static,
    {
        Self {
            client,
            environment: Arc::new(environment),
        }
    }

    /// The current location of the host application.
    pub fn location(&self) -> Location {
        self.environment.location()
    }

    /// Send an event in the background.
    ///
    /// Returns as soon as the request is started. Failures of the request are never reported; the
    /// callback of `options` only signals that the request has finished.
    ///
    /// Must be called from within a tokio runtime, otherwise the event is dropped.
    pub fn send(&self, event_name: &str, config: &Configuration, options: EventOptions) -> Dispatch {
        if !config.track_localhost && is_local(&self.environment.location()) {
            log::warn!("{LOCAL_WARNING}");
            return Dispatch::Suppressed;
        }

        let payload = EventPayload::new(event_name, config);
        let body = match payload.to_json() {
            Ok(body) => body,
            Err(err) => {
                log::debug!("Failed to encode event '{event_name}': {err}");
                return Dispatch::Dropped;
            }
        };

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(err) => {
                log::warn!("Dropping event '{event_name}', no async runtime available: {err}");
                return Dispatch::Dropped;
            }
        };

        let request = self
            .client
            .post(event_url(&config.api_host))
            .header(CONTENT_TYPE, "text/plain")
            .body(body);

        runtime.spawn(async move {
            match request.send().await {
                Ok(response) => log::debug!("Event '{}' settled: {}", payload.name(), response.status()),
                Err(err) => log::debug!("Failed to send event '{}': {err}", payload.name()),
            }

            if let Some(callback) = options.callback {
                callback();
            }
        });

        Dispatch::Sent
    }
}
