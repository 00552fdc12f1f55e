// fleetvars-api: Async Rust client for the balenaCloud v7 API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod fleets;
pub mod flatten;
pub mod models;
pub mod services;
pub mod transport;
pub mod variables;

pub use auth::ApiToken;
pub use client::ApiClient;
pub use error::Error;
pub use fleets::FleetKey;
pub use flatten::flatten_json;
pub use models::{DeviceRecord, DeviceTagRecord, FleetRecord, IdRef, ServiceRecord, VariableRecord};
pub use transport::{TlsMode, TransportConfig};
pub use variables::VariableCollection;

/// Default public API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.balena-cloud.com/";

/// API version segment prepended to every resource path.
pub const API_VERSION: &str = "v7";
