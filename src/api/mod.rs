pub mod host;
pub mod models;

#[cfg(target_arch = "wasm32")]
pub mod hass_bridge;

pub use host::{HostError, HostHandle, MediaHost};
pub use models::*;
