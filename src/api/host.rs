//! Host capabilities the card consumes.
//!
//! Everything the card needs from the home automation host goes through
//! [`MediaHost`], so the controller can be driven by the wasm bridge in the
//! browser and by fakes in tests.

use futures_util::future::LocalBoxFuture;
use std::rc::Rc;
use thiserror::Error;

use super::models::{DirectoryListing, HostStates, ResolvedMedia};

#[derive(Debug, Error)]
pub enum HostError {
    #[error("host connection is not available yet")]
    Unavailable,
    #[error("{method} was rejected: {message}")]
    Rejected { method: String, message: String },
    #[error("unexpected payload from {method}: {source}")]
    Decode {
        method: String,
        #[source]
        source: serde_json::Error,
    },
}

impl HostError {
    pub fn rejected(method: &str, message: impl Into<String>) -> Self {
        Self::Rejected {
            method: method.to_string(),
            message: message.into(),
        }
    }

    pub fn decode(method: &str, source: serde_json::Error) -> Self {
        Self::Decode {
            method: method.to_string(),
            source,
        }
    }
}

pub trait MediaHost {
    /// Lists the children of `content_id`, or the catalog root when `None`.
    fn browse_media<'a>(
        &'a self,
        content_id: Option<&'a str>,
    ) -> LocalBoxFuture<'a, Result<DirectoryListing, HostError>>;

    fn resolve_media<'a>(
        &'a self,
        content_id: &'a str,
    ) -> LocalBoxFuture<'a, Result<ResolvedMedia, HostError>>;

    fn play_media<'a>(
        &'a self,
        target_id: &'a str,
        content_id: &'a str,
        content_type: &'a str,
    ) -> LocalBoxFuture<'a, Result<(), HostError>>;

    fn seek<'a>(
        &'a self,
        target_id: &'a str,
        position_secs: f64,
    ) -> LocalBoxFuture<'a, Result<(), HostError>>;

    /// Current entity snapshot.
    fn states(&self) -> Result<HostStates, HostError>;

    /// Bumped whenever the host hands over a new state object.
    fn revision(&self) -> u64;
}

/// Shared host handle provided through the component context.
#[derive(Clone)]
pub struct HostHandle(pub Rc<dyn MediaHost>);

impl HostHandle {
    pub fn new(host: impl MediaHost + 'static) -> Self {
        Self(Rc::new(host))
    }
}

impl PartialEq for HostHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
