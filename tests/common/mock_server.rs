//! Mock HTTP server for album covers and the Spotify Web API.

use std::time::Duration;
use wiremock::{
    matchers::{body_string, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

/// Wrapper around wiremock MockServer with convenience methods
pub struct MockHttpServer {
    pub server: MockServer,
}

impl MockHttpServer {
    /// Start a new mock HTTP server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Get the base URL of the mock server
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Serve PNG bytes at `endpoint`
    pub async fn mock_image(&self, endpoint: &str, png: Vec<u8>) {
        self.mock_image_delayed(endpoint, png, Duration::ZERO).await;
    }

    /// Serve PNG bytes after a delay
    pub async fn mock_image_delayed(&self, endpoint: &str, png: Vec<u8>, delay: Duration) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(png)
                    .insert_header("content-type", "image/png")
                    .set_delay(delay),
            )
            .mount(&self.server)
            .await;
    }

    /// Mock an endpoint that returns an error
    pub async fn mock_error(&self, endpoint: &str, status: u16, message: &str) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(message))
            .mount(&self.server)
            .await;
    }

    /// Client-credentials token endpoint expecting the given Basic auth
    pub async fn mock_token(&self, expected_basic: &str, token: &str) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .and(header("authorization", format!("Basic {expected_basic}")))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string("grant_type=client_credentials"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": token,
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .mount(&self.server)
            .await;
    }

    /// Token endpoint rejecting every request
    pub async fn mock_token_rejected(&self) {
        Mock::given(method("POST"))
            .and(path("/api/token"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
            .mount(&self.server)
            .await;
    }

    /// One page of playlist tracks, matched on the `offset` query value
    pub async fn mock_tracks_page(
        &self,
        playlist_id: &str,
        token: &str,
        offset: Option<&str>,
        page: serde_json::Value,
    ) {
        let mut mock = Mock::given(method("GET"))
            .and(path(format!("/v1/playlists/{playlist_id}/tracks")))
            .and(header("authorization", format!("Bearer {token}")));
        if let Some(offset) = offset {
            mock = mock.and(query_param("offset", offset));
        }
        // Offset-specific pages take precedence over the catch-all first page
        let priority = if offset.is_some() { 1 } else { 5 };
        mock.respond_with(ResponseTemplate::new(200).set_body_json(page))
            .with_priority(priority)
            .mount(&self.server)
            .await;
    }
}

/// Playlist item JSON; `image_url: None` gives an album without images
pub fn track_item(id: &str, name: &str, artists: &[&str], image_url: Option<&str>) -> serde_json::Value {
    let images: Vec<serde_json::Value> = image_url
        .map(|url| vec![serde_json::json!({"url": url, "height": 640, "width": 640})])
        .unwrap_or_default();
    let artists: Vec<serde_json::Value> = artists
        .iter()
        .map(|name| serde_json::json!({"name": name}))
        .collect();
    serde_json::json!({
        "track": {
            "id": id,
            "name": name,
            "artists": artists,
            "album": {"images": images}
        }
    })
}
