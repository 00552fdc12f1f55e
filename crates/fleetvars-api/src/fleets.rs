use serde_json::{Map, Value};
use tracing::debug;

use crate::client::{ApiClient, odata_quote};
use crate::error::Error;
use crate::flatten::flatten_json;
use crate::models::{FleetRecord, ListResponse};

/// How a fleet is addressed: numeric id or `org/name` slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FleetKey {
    Id(u64),
    Slug(String),
}

impl FleetKey {
    /// Numeric input is an id, anything else a slug.
    pub fn parse(raw: &str) -> Self {
        raw.parse::<u64>()
            .map_or_else(|_| Self::Slug(raw.to_owned()), Self::Id)
    }

    fn resource(&self) -> String {
        match self {
            Self::Id(id) => format!("application(id={id})"),
            Self::Slug(slug) => format!("application(slug={})", odata_quote(slug)),
        }
    }
}

impl std::fmt::Display for FleetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Slug(slug) => write!(f, "{slug}"),
        }
    }
}

impl ApiClient {
    /// Fetch exactly one fleet. Zero or several matches are errors.
    pub async fn get_fleet(&self, key: &FleetKey) -> Result<FleetRecord, Error> {
        debug!(fleet = %key, "retrieving fleet");
        let envelope: ListResponse<Map<String, Value>> = self.get(&key.resource()).await?;

        match envelope.data.as_slice() {
            [only] => FleetRecord::from_flat(&flatten_json(only)),
            [] => Err(Error::NotFound {
                entity: "fleet",
                identifier: key.to_string(),
            }),
            many => Err(Error::Ambiguous {
                entity: "fleet",
                identifier: key.to_string(),
                count: many.len(),
            }),
        }
    }
}
