use crate::config::{Configuration, TrackerConfig};
use crate::environment::{Environment, Location};
use crate::sender::{Dispatch, EventOptions, EventSender};
use crate::{EventData, TrackingEvent, PAGEVIEW};
use tokio::sync::oneshot;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid API host: {0}")]
    Url(#[from] url::ParseError),
}

/// Tracks events of a single site.
///
/// Fills in everything an event needs from the tracker configuration and the current location of
/// the host, before handing it to the [`EventSender`].
#[derive(Clone, Debug)]
pub struct Tracker {
    config: TrackerConfig,
    sender: EventSender,
}

impl Tracker {
    pub fn new<E>(config: TrackerConfig, environment: E) -> Result<Self, Error>
    where
        E: Environment + 'static,
    {
        Url::parse(&config.api_host)?;
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        log::debug!("Tracking events at {}", config.api_host);

        Ok(Self {
            config,
            sender: EventSender::new(client, environment),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Resolve the configuration of a single event.
    ///
    /// Event data takes precedence over the tracker configuration, which takes precedence over the
    /// current location.
    pub fn configuration(&self, location: &Location, data: EventData) -> Configuration {
        Configuration {
            url: data.url.unwrap_or_else(|| location.href.clone()),
            domain: data
                .domain
                .or_else(|| self.config.domain.clone())
                .unwrap_or_else(|| location.hostname.clone()),
            referrer: data.referrer.filter(|referrer| !referrer.is_empty()),
            device_width: data.device_width.unwrap_or_default(),
            hash_mode: data.hash_mode.unwrap_or(self.config.hash_mode),
            api_host: data.api_host.unwrap_or_else(|| self.config.api_host.clone()),
            track_localhost: data.track_localhost.unwrap_or(self.config.track_localhost),
        }
    }

    pub fn track_event(&self, event_name: &str, data: EventData, options: EventOptions) -> Dispatch {
        let config = self.configuration(&self.sender.location(), data);
        self.sender.send(event_name, &config, options)
    }

    pub fn track_pageview(&self, data: EventData, options: EventOptions) -> Dispatch {
        self.track_event(PAGEVIEW, data, options)
    }

    pub fn track(&self, event: impl TrackingEvent, options: EventOptions) -> Dispatch {
        self.track_event(event.name(), event.data(), options)
    }

    /// Send an event and wait until its request has settled.
    pub async fn track_and_wait(&self, event: impl TrackingEvent) -> Dispatch {
        let (tx, rx) = oneshot::channel();
        let dispatch = self.track(
            event,
            EventOptions::with_callback(move || {
                let _ = tx.send(());
            }),
        );

        if dispatch == Dispatch::Sent {
            // an error only means the request task is gone, which settles it just as well
            let _ = rx.await;
        }

        dispatch
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CustomEvent, Pageview, SharedLocation};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn tracker(config: TrackerConfig, href: &str) -> Tracker {
        Tracker::new(config, Location::parse(href).unwrap()).unwrap()
    }

    async fn collector() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/event"))
            .respond_with(ResponseTemplate::new(202))
            .mount(&server)
            .await;
        server
    }

    async fn received(server: &MockServer) -> Vec<serde_json::Value> {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .collect()
    }

    #[test]
    fn defaults_come_from_location() {
        let tracker = tracker(TrackerConfig::default(), "https://example.com/docs?page=2");
        let location = Location::parse("https://example.com/docs?page=2").unwrap();

        let config = tracker.configuration(&location, EventData::default());

        assert_eq!(
            config,
            Configuration {
                url: "https://example.com/docs?page=2".into(),
                domain: "example.com".into(),
                referrer: None,
                device_width: 0,
                hash_mode: false,
                api_host: "https://plausible.io".into(),
                track_localhost: false,
            }
        );
    }

    #[test]
    fn event_data_overrides_config() {
        let tracker = tracker(
            TrackerConfig {
                domain: Some("configured.com".into()),
                api_host: "https://collector.test".into(),
                hash_mode: true,
                ..Default::default()
            },
            "https://example.com/",
        );
        let location = tracker.sender.location();

        let config = tracker.configuration(&location, EventData::default());
        assert_eq!(config.domain, "configured.com");
        assert_eq!(config.api_host, "https://collector.test");
        assert!(config.hash_mode);

        let config = tracker.configuration(
            &location,
            EventData {
                url: Some("https://example.com/#/settings".into()),
                domain: Some("override.com".into()),
                referrer: Some("https://ref.com".into()),
                device_width: Some(390),
                hash_mode: Some(false),
                track_localhost: Some(true),
                api_host: Some("https://other.test".into()),
            },
        );
        assert_eq!(
            config,
            Configuration {
                url: "https://example.com/#/settings".into(),
                domain: "override.com".into(),
                referrer: Some("https://ref.com".into()),
                device_width: 390,
                hash_mode: false,
                api_host: "https://other.test".into(),
                track_localhost: true,
            }
        );
    }

    #[test]
    fn empty_referrer_is_none() {
        let tracker = tracker(TrackerConfig::default(), "https://example.com/");
        let config = tracker.configuration(
            &tracker.sender.location(),
            EventData {
                referrer: Some(String::new()),
                ..Default::default()
            },
        );
        assert_eq!(config.referrer, None);
    }

    #[test]
    fn invalid_api_host() {
        let result = Tracker::new(
            TrackerConfig {
                api_host: "collector".into(),
                ..Default::default()
            },
            Location::default(),
        );
        assert!(matches!(result, Err(Error::Url(_))));
    }

    #[tokio::test]
    async fn pageview_uses_current_location() {
        let server = collector().await;
        let location = SharedLocation::new(Location::parse("https://example.com/first").unwrap());
        let tracker = Tracker::new(
            TrackerConfig {
                api_host: server.uri(),
                ..Default::default()
            },
            location.clone(),
        )
        .unwrap();

        assert_eq!(tracker.track_and_wait(Pageview).await, Dispatch::Sent);
        location.set(Location::parse("https://example.com/second").unwrap());
        assert_eq!(tracker.track_and_wait(Pageview).await, Dispatch::Sent);

        let events = received(&server).await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["n"], "pageview");
        assert_eq!(events[0]["u"], "https://example.com/first");
        assert_eq!(events[0]["d"], "example.com");
        assert_eq!(events[0]["r"], serde_json::Value::Null);
        assert_eq!(events[1]["u"], "https://example.com/second");
    }

    #[tokio::test]
    async fn custom_event() {
        let server = collector().await;
        let tracker = tracker(
            TrackerConfig {
                api_host: server.uri(),
                hash_mode: true,
                ..Default::default()
            },
            "https://example.com/",
        );

        let event = CustomEvent::new("signup").with_data(EventData {
            device_width: Some(1280),
            referrer: Some("https://ref.com".into()),
            ..Default::default()
        });
        assert_eq!(tracker.track_and_wait(event).await, Dispatch::Sent);

        let events = received(&server).await;
        assert_eq!(
            events,
            vec![serde_json::json!({
                "n": "signup",
                "u": "https://example.com/",
                "d": "example.com",
                "r": "https://ref.com",
                "w": 1280,
                "h": 1,
            })]
        );
    }

    #[tokio::test]
    async fn localhost_is_suppressed_unless_enabled() {
        let server = collector().await;

        let suppressed = tracker(
            TrackerConfig {
                api_host: server.uri(),
                ..Default::default()
            },
            "http://localhost:8080/",
        );
        assert_eq!(suppressed.track_and_wait(Pageview).await, Dispatch::Suppressed);

        let enabled = tracker(
            TrackerConfig {
                api_host: server.uri(),
                track_localhost: true,
                ..Default::default()
            },
            "http://localhost:8080/",
        );
        assert_eq!(enabled.track_and_wait(Pageview).await, Dispatch::Sent);

        let events = received(&server).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["d"], "localhost");
    }

    #[tokio::test]
    async fn unreachable_collector_settles() {
        let tracker = tracker(
            TrackerConfig {
                api_host: "http://127.0.0.1:1".into(),
                timeout: Duration::from_secs(2),
                ..Default::default()
            },
            "https://example.com/",
        );

        assert_eq!(tracker.track_and_wait(Pageview).await, Dispatch::Sent);
    }
}
