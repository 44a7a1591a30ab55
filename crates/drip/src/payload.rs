use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tracked event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackEventPayload {
    pub event: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Arbitrary event properties. Anything but an object is sent as `{}`.
    #[serde(default)]
    pub properties: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(rename = "anonymousId", default, skip_serializing_if = "Option::is_none")]
    pub anonymous_id: Option<String>,
}

impl TrackEventPayload {
    pub(crate) fn has_identity(&self) -> bool {
        let present = |id: &Option<String>| id.as_deref().is_some_and(|s| !s.is_empty());
        present(&self.user_id) || present(&self.anonymous_id)
    }

    /// Copy of the payload with non-object properties replaced by `{}`.
    pub(crate) fn formatted(&self) -> Self {
        let mut formatted = self.clone();
        if !formatted.properties.is_object() {
            formatted.properties = Value::Object(Map::new());
        }
        formatted
    }
}

/// One subscriber to create or update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdentifyPayload {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SubscribersBody<'a> {
    pub(crate) subscribers: &'a [IdentifyPayload],
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchesBody<'a> {
    pub(crate) batches: [SubscribersBody<'a>; 1],
}
