// Tracker services and the registry the drain job looks them up in

pub mod http;

pub use http::HttpTracker;

use std::{collections::HashMap, sync::Arc};

use crate::domain::models::{ServiceId, Track};

/// One external progress tracking service.
#[async_trait::async_trait]
pub trait Tracker: Send + Sync {
    fn id(&self) -> ServiceId;
    fn name(&self) -> &str;
    fn is_logged_in(&self) -> bool;

    /// Push the track's progress. `delayed` marks a backfill of an update
    /// that could not be sent when it happened.
    async fn update(&self, track: &Track, delayed: bool) -> anyhow::Result<()>;
}

pub trait TrackerRegistry: Send + Sync {
    fn get(&self, service_id: ServiceId) -> Option<Arc<dyn Tracker>>;
}

#[derive(Default)]
pub struct TrackerManager {
    trackers: HashMap<ServiceId, Arc<dyn Tracker>>,
}

impl TrackerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a manager with the tracker registered under its own id,
    /// replacing any tracker previously registered with that id.
    pub fn with_tracker(mut self, tracker: Arc<dyn Tracker>) -> Self {
        tracing::debug!(id = tracker.id(), name = tracker.name(), "registering tracker");
        self.trackers.insert(tracker.id(), tracker);
        self
    }

    pub fn logged_in(&self) -> impl Iterator<Item = &Arc<dyn Tracker>> {
        self.trackers.values().filter(|t| t.is_logged_in())
    }
}

impl TrackerRegistry for TrackerManager {
    fn get(&self, service_id: ServiceId) -> Option<Arc<dyn Tracker>> {
        self.trackers.get(&service_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_service_id() {
        let manager = TrackerManager::new()
            .with_tracker(Arc::new(HttpTracker::new(1, "One", "http://one").unwrap()))
            .with_tracker(Arc::new(
                HttpTracker::new(2, "Two", "http://two")
                    .unwrap()
                    .with_api_key("secret"),
            ));

        assert_eq!(manager.get(1).map(|t| t.name().to_string()), Some("One".into()));
        assert!(manager.get(3).is_none());
        let logged_in: Vec<_> = manager.logged_in().map(|t| t.id()).collect();
        assert_eq!(logged_in, vec![2]);
    }
}
