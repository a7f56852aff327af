use parking_lot::RwLock;
use regex::Regex;
use std::sync::{Arc, OnceLock};
use url::Url;

/// Protocol of pages loaded straight from the file system.
pub const FILE_PROTOCOL: &str = "file:";

/// The address of the page the events are tracked for.
///
/// Mirrors the fields of a browser location: the `protocol` carries its trailing colon (`https:`),
/// the `hostname` has no port, and `href` is the full address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    pub protocol: String,
    pub hostname: String,
    pub href: String,
}

impl Location {
    pub fn new(protocol: impl Into<String>, hostname: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            protocol: protocol.into(),
            hostname: hostname.into(),
            href: href.into(),
        }
    }

    /// Build a location from an absolute URL.
    pub fn parse(url: &str) -> Result<Self, url::ParseError> {
        Ok(Url::parse(url)?.into())
    }

    /// Check if this location is a development environment.
    pub fn is_local(&self) -> bool {
        is_local(self)
    }
}

impl From<Url> for Location {
    fn from(url: Url) -> Self {
        Self {
            protocol: format!("{}:", url.scheme()),
            hostname: url.host_str().unwrap_or_default().to_string(),
            href: url.to_string(),
        }
    }
}

/// Gives access to the current location of the host application.
///
/// Implementations are asked on every event, so they may change between calls.
pub trait Environment: Send + Sync {
    fn location(&self) -> Location;
}

impl Environment for Location {
    fn location(&self) -> Location {
        self.clone()
    }
}

impl<E: Environment + ?Sized> Environment for Arc<E> {
    fn location(&self) -> Location {
        (**self).location()
    }
}

/// A location which can be updated while events are being tracked, e.g. on navigation.
#[derive(Clone, Debug, Default)]
pub struct SharedLocation {
    inner: Arc<RwLock<Location>>,
}

impl SharedLocation {
    pub fn new(location: Location) -> Self {
        Self {
            inner: Arc::new(RwLock::new(location)),
        }
    }

    pub fn set(&self, location: Location) {
        *self.inner.write() = location;
    }
}

impl Environment for SharedLocation {
    fn location(&self) -> Location {
        self.inner.read().clone()
    }
}

fn local_hostname() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // localhost, 127.x.x.x (one to three dot segments), ::1 and its zero-padded forms
        Regex::new(r"^localhost$|^127(?:\.[0-9]+){0,2}\.[0-9]+$|^(?:0*:)*?:?0*1$")
            .expect("local host name pattern must compile")
    })
}

/// Detect whether the location points to a local development setup.
///
/// This is a loopback host name, `localhost`, or a page loaded from a file.
pub fn is_local(location: &Location) -> bool {
    let hostname = location
        .hostname
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(&location.hostname);

    local_hostname().is_match(hostname) || location.protocol == FILE_PROTOCOL
}
