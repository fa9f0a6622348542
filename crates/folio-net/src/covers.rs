use std::thread::sleep;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use folio_core::services::{CoverStore, CoverUploadError};
use folio_core::Key;

const DEFAULT_ATTEMPTS: u32 = 10;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct UploadReply {
    id: i64,
}

/// Client for the cover image service.
///
/// The service mirrors a remote image and answers with the allocated
/// cover id. Replies are unreliable enough that the upload retries a
/// bounded number of times; a reply that never becomes usable is a
/// "no cover" outcome, not an error. Only an HTTP 500 is surfaced as
/// `ServerError`.
pub struct CoverstoreClient {
    client: reqwest::blocking::Client,
    base_url: String,
    uploader: String,
    max_attempts: u32,
    backoff: Duration,
}

impl CoverstoreClient {
    pub fn new(base_url: impl Into<String>, uploader: impl Into<String>) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            base_url: base_url.into(),
            uploader: uploader.into(),
            max_attempts: DEFAULT_ATTEMPTS,
            backoff: DEFAULT_BACKOFF,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, backoff: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.backoff = backoff;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/b/upload2", self.base_url.trim_end_matches('/'))
    }
}

impl CoverStore for CoverstoreClient {
    fn upload(
        &self,
        url: &str,
        edition: &Key,
    ) -> std::result::Result<Option<i64>, CoverUploadError> {
        let form = [
            ("author", self.uploader.as_str()),
            ("source_url", url),
            ("edition", edition.id_part()),
        ];
        let mut last_error = String::new();
        for attempt in 1..=self.max_attempts {
            if attempt > 1 && !self.backoff.is_zero() {
                sleep(self.backoff);
            }
            let response = match self.client.post(self.endpoint()).form(&form).send() {
                Ok(r) => r,
                Err(err) => {
                    warn!(%url, %err, attempt, "cover upload request failed");
                    last_error = err.to_string();
                    continue;
                }
            };
            let status = response.status();
            let body = response.text().unwrap_or_default();
            if status.is_server_error() {
                return Err(CoverUploadError::ServerError(body));
            }
            if body.is_empty() || body.contains("Invalid URL") {
                debug!(%url, attempt, "cover service declined image, retrying");
                continue;
            }
            match serde_json::from_str::<UploadReply>(&body) {
                Ok(reply) => return Ok(Some(reply.id)),
                Err(_) => {
                    debug!(%url, attempt, body, "unparseable cover service reply");
                    continue;
                }
            }
        }
        if last_error.is_empty() {
            // The service never accepted the image; import proceeds
            // without a cover.
            Ok(None)
        } else {
            Err(CoverUploadError::Unavailable(last_error))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::ServerGuard) -> CoverstoreClient {
        CoverstoreClient::new(server.url(), "/people/importbot")
            .with_retry(3, Duration::ZERO)
    }

    #[test]
    fn test_upload_returns_cover_id() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/b/upload2")
            .with_status(200)
            .with_body(r#"{"id": 12345}"#)
            .create();

        let id = client(&server)
            .upload("http://example.org/cover.jpg", &Key::new("/books/1"))
            .unwrap();
        assert_eq!(id, Some(12345));
        mock.assert();
    }

    #[test]
    fn test_invalid_url_retries_then_gives_up() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/b/upload2")
            .with_status(200)
            .with_body("Invalid URL")
            .expect(3)
            .create();

        let id = client(&server)
            .upload("not-a-url", &Key::new("/books/1"))
            .unwrap();
        assert_eq!(id, None);
        mock.assert();
    }

    #[test]
    fn test_server_error_is_fatal() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/b/upload2")
            .with_status(500)
            .with_body("internal error")
            .create();

        let err = client(&server)
            .upload("http://example.org/cover.jpg", &Key::new("/books/1"))
            .unwrap_err();
        assert!(matches!(err, CoverUploadError::ServerError(_)));
    }
}
