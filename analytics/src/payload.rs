use crate::config::Configuration;
use serde::{Serialize, Serializer};

/// Routing mode flag, encoded as `1` or `0` on the wire.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HashMode(pub bool);

impl Serialize for HashMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(u8::from(self.0))
    }
}

/// The body of a single event, as accepted by the collector.
///
/// The field names and their order are part of the collector API and must stay as they are.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventPayload {
    /// event name
    n: String,
    /// tracked URL
    u: String,
    /// site domain
    d: String,
    /// referrer, serialized as `null` when absent
    r: Option<String>,
    /// device width
    w: i64,
    /// hash mode
    h: HashMode,
}

impl EventPayload {
    pub fn new(event_name: impl Into<String>, config: &Configuration) -> Self {
        Self {
            n: event_name.into(),
            u: config.url.clone(),
            d: config.domain.clone(),
            r: config.referrer.clone(),
            w: config.device_width,
            h: HashMode(config.hash_mode),
        }
    }

    pub fn name(&self) -> &str {
        &self.n
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
