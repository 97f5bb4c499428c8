//! Typed wrapper around the notebook HTTP API.
//!
//! Every call reports failure to the caller; nothing is retried or swallowed.

use std::time::Duration;

use notebook_core::{Error, Note, Tag};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};

/// Where the API listens unless configured otherwise.
pub const DEFAULT_API_BASE: &str = "http://localhost:4000";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateNoteBody<'a> {
    title: &'a str,
    markdown: &'a str,
    pinned: bool,
    tag_ids: &'a [String],
}

#[derive(Serialize)]
struct UpdateTagBody<'a> {
    label: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for one notebook server.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(base: &str) -> Result<Self, Error> {
        let base = Url::parse(base)
            .map_err(|e| Error::validation(format!("invalid API base URL {}: {}", base, e)))?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;
        Ok(Self { client, base })
    }

    /// Build `<base>/<segments...>`, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::validation(format!("API base {} cannot hold a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Turn a non-success response into `Error::Api`, using the `{error}` body if present.
    async fn check(response: Response) -> Result<Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        tracing::warn!(status = status.as_u16(), "API request failed: {}", message);
        Err(Error::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response, Error> {
        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;
        Self::check(response).await
    }

    pub async fn list_notes(&self) -> Result<Vec<Note>, Error> {
        let response = self.send(self.client.get(self.url(&["notes"])?)).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Failed to parse notes: {}", e)))
    }

    pub async fn create_note(&self, note: &Note) -> Result<(), Error> {
        self.send(self.client.post(self.url(&["notes"])?).json(note))
            .await?;
        Ok(())
    }

    /// Replace a note's content and tag set.
    pub async fn update_note(
        &self,
        id: &str,
        title: &str,
        markdown: &str,
        pinned: bool,
        tag_ids: &[String],
    ) -> Result<(), Error> {
        let body = UpdateNoteBody {
            title,
            markdown,
            pinned,
            tag_ids,
        };
        self.send(self.client.put(self.url(&["notes", id])?).json(&body))
            .await?;
        Ok(())
    }

    pub async fn delete_note(&self, id: &str) -> Result<(), Error> {
        self.send(self.client.delete(self.url(&["notes", id])?))
            .await?;
        Ok(())
    }

    pub async fn list_tags(&self) -> Result<Vec<Tag>, Error> {
        let response = self.send(self.client.get(self.url(&["tags"])?)).await?;
        response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Failed to parse tags: {}", e)))
    }

    pub async fn create_tag(&self, tag: &Tag) -> Result<(), Error> {
        self.send(self.client.post(self.url(&["tags"])?).json(tag))
            .await?;
        Ok(())
    }

    pub async fn update_tag(&self, id: &str, label: &str) -> Result<(), Error> {
        self.send(
            self.client
                .put(self.url(&["tags", id])?)
                .json(&UpdateTagBody { label }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_tag(&self, id: &str) -> Result<(), Error> {
        self.send(self.client.delete(self.url(&["tags", id])?))
            .await?;
        Ok(())
    }
}
