use serde::Serialize;

use super::Tracker;
use crate::domain::models::{ServiceId, Track};

/// Tracker reached over a plain JSON HTTP API.
#[derive(Clone, Debug)]
pub struct HttpTracker {
    id: ServiceId,
    name: String,
    base_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

/// Body of `PUT /api/tracks/:remote_id`
#[derive(Debug, Serialize, PartialEq)]
pub struct TrackUpdateRequest {
    pub last_chapter_read: f64,
    pub total_chapters: i64,
    pub status: i64,
    pub score: f64,
    pub delayed: bool,
}

impl TrackUpdateRequest {
    fn from_track(track: &Track, delayed: bool) -> Self {
        Self {
            last_chapter_read: track.last_chapter_read,
            total_chapters: track.total_chapters,
            status: track.status,
            score: track.score,
            delayed,
        }
    }
}

impl HttpTracker {
    /// Create a tracker client for the given base URL (e.g. "https://tracker.example/v1").
    pub fn new(
        id: ServiceId,
        name: impl Into<String>,
        base_url: impl Into<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        let base_url_str = base_url.into();
        tracing::debug!(base_url = %base_url_str, id, "creating HttpTracker");
        Ok(HttpTracker {
            id,
            name: name.into(),
            base_url: base_url_str.trim_end_matches('/').to_string(),
            api_key: None,
            client,
        })
    }

    /// Return a tracker with the provided API key set (Bearer)
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = (!api_key.is_empty()).then_some(api_key);
        self
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn auth_header(&self) -> Option<(String, String)> {
        self.api_key
            .as_ref()
            .map(|k| ("Authorization".to_string(), format!("Bearer {}", k)))
    }

    fn track_url(&self, track: &Track) -> String {
        self.url(&format!("/api/tracks/{}", track.remote_id))
    }
}

#[async_trait::async_trait]
impl Tracker for HttpTracker {
    fn id(&self) -> ServiceId {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_logged_in(&self) -> bool {
        self.api_key.is_some()
    }

    /// PUT /api/tracks/:remote_id
    #[tracing::instrument(level = "debug", skip(self, track), fields(tracker = %self.name, track_id = track.id))]
    async fn update(&self, track: &Track, delayed: bool) -> anyhow::Result<()> {
        let url = self.track_url(track);
        tracing::debug!(%url, last_chapter_read = track.last_chapter_read, delayed, "PUT track");
        let mut req = self
            .client
            .put(&url)
            .json(&TrackUpdateRequest::from_track(track, delayed));
        if let Some((k, v)) = self.auth_header() {
            req = req.header(&k, &v);
        }
        let resp = req.send().await?;
        resp.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Track {
        Track {
            id: 4,
            manga_id: 40,
            sync_id: 2,
            remote_id: 1234,
            title: "Blame!".into(),
            last_chapter_read: 12.0,
            total_chapters: 65,
            status: 1,
            score: 8.0,
            remote_url: String::new(),
        }
    }

    #[test]
    fn build_track_url_trims_trailing_slash() {
        let t = HttpTracker::new(2, "Example", "http://localhost:8080/tracker/").unwrap();
        assert_eq!(
            t.track_url(&track()),
            "http://localhost:8080/tracker/api/tracks/1234"
        );
    }

    #[test]
    fn logged_in_only_with_api_key() {
        let t = HttpTracker::new(2, "Example", "http://localhost").unwrap();
        assert!(!t.is_logged_in());
        assert!(t.auth_header().is_none());

        let t = t.with_api_key("");
        assert!(!t.is_logged_in());

        let t = t.with_api_key("abc");
        assert!(t.is_logged_in());
        assert_eq!(
            t.auth_header(),
            Some(("Authorization".to_string(), "Bearer abc".to_string()))
        );
    }

    #[test]
    fn update_request_serialize() {
        let body = TrackUpdateRequest::from_track(&track(), true);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "last_chapter_read": 12.0,
                "total_chapters": 65,
                "status": 1,
                "score": 8.0,
                "delayed": true
            })
        );
    }
}
