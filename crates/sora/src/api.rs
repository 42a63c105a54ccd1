//! REST API client for the Sora HTTP endpoints.
//!
//! Wraps the provider's video API (job submission, status retrieval, remix,
//! deletion, content download) and the optional moderation endpoint using
//! [`reqwest`].

use crate::messages::{
    CreateVideoParams, DownloadVariant, ModerationResponse, ModerationVerdict, VideoJob,
};

/// Default API base URL.
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct SoraConfig {
    /// Bearer token for every API call.
    pub api_key: String,
    /// Base HTTP URL, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Moderation model name. When absent, every prompt is treated as
    /// allowed without calling the provider.
    pub moderation_model: Option<String>,
}

impl SoraConfig {
    /// Load provider configuration from environment variables.
    ///
    /// | Env Var                   | Required | Default                      |
    /// |---------------------------|----------|------------------------------|
    /// | `OPENAI_API_KEY`          | **yes**  | --                           |
    /// | `OPENAI_BASE_URL`         | no       | `https://api.openai.com/v1`  |
    /// | `OPENAI_MODERATION_MODEL` | no       | -- (moderation disabled)     |
    ///
    /// # Panics
    ///
    /// Panics if `OPENAI_API_KEY` is not set or is empty.
    pub fn from_env() -> Self {
        let api_key =
            std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY must be set in the environment");
        assert!(!api_key.is_empty(), "OPENAI_API_KEY must not be empty");

        let base_url = std::env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_BASE_URL.into())
            .trim_end_matches('/')
            .to_string();

        let moderation_model = std::env::var("OPENAI_MODERATION_MODEL")
            .ok()
            .filter(|m| !m.is_empty());

        Self {
            api_key,
            base_url,
            moderation_model,
        }
    }
}

/// Errors from the Sora REST API layer.
#[derive(Debug, thiserror::Error)]
pub enum SoraApiError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Sora API error ({status}): {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },
}

/// HTTP client for the Sora video API.
pub struct SoraApi {
    client: reqwest::Client,
    config: SoraConfig,
}

impl SoraApi {
    /// Create a new API client from provider configuration.
    pub fn new(config: SoraConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Create an API client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, config: SoraConfig) -> Self {
        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url)
    }

    /// Submit a new generation job.
    ///
    /// Sends `POST /videos`. Plain JSON when the submission is text-only;
    /// a multipart form carrying the `input_reference` image part when a
    /// reference image is attached.
    pub async fn create_video(
        &self,
        params: &CreateVideoParams,
    ) -> Result<VideoJob, SoraApiError> {
        let request = self
            .client
            .post(self.url("/videos"))
            .bearer_auth(&self.config.api_key);

        let response = match &params.reference_image {
            Some(image) => {
                let mut form = reqwest::multipart::Form::new()
                    .text("model", params.model.clone())
                    .text("prompt", params.prompt.clone());
                if let Some(size) = &params.size {
                    form = form.text("size", size.clone());
                }
                if let Some(seconds) = params.seconds {
                    form = form.text("seconds", seconds.to_string());
                }
                form = form.part(
                    "input_reference",
                    reqwest::multipart::Part::bytes(image.clone()).file_name("reference"),
                );
                request.multipart(form).send().await?
            }
            None => {
                let mut body = serde_json::json!({
                    "model": params.model,
                    "prompt": params.prompt,
                });
                if let Some(size) = &params.size {
                    body["size"] = serde_json::Value::String(size.clone());
                }
                if let Some(seconds) = params.seconds {
                    // The provider expects seconds as a string.
                    body["seconds"] = serde_json::Value::String(seconds.to_string());
                }
                request.json(&body).send().await?
            }
        };

        Self::parse_response(response).await
    }

    /// Retrieve the current state of a job.
    ///
    /// Sends `GET /videos/{id}`.
    pub async fn retrieve_video(&self, id: &str) -> Result<VideoJob, SoraApiError> {
        let response = self
            .client
            .get(self.url(&format!("/videos/{id}")))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Create a new job derived from an existing one with a new prompt.
    ///
    /// Sends `POST /videos/{id}/remix`.
    pub async fn remix_video(&self, id: &str, prompt: &str) -> Result<VideoJob, SoraApiError> {
        let response = self
            .client
            .post(self.url(&format!("/videos/{id}/remix")))
            .bearer_auth(&self.config.api_key)
            .json(&serde_json::json!({ "prompt": prompt }))
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Delete a job on the provider side.
    ///
    /// Sends `DELETE /videos/{id}`. Callers treat failures as best-effort.
    pub async fn delete_video(&self, id: &str) -> Result<(), SoraApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/videos/{id}")))
            .bearer_auth(&self.config.api_key)
            .send()
            .await?;

        Self::check_status(response).await
    }

    /// Download the rendered content of a completed job.
    ///
    /// Sends `GET /videos/{id}/content`, with `?variant=thumbnail` for the
    /// thumbnail rendition.
    pub async fn download_content(
        &self,
        id: &str,
        variant: DownloadVariant,
    ) -> Result<Vec<u8>, SoraApiError> {
        let mut request = self
            .client
            .get(self.url(&format!("/videos/{id}/content")))
            .bearer_auth(&self.config.api_key);
        if variant == DownloadVariant::Thumbnail {
            request = request.query(&[("variant", "thumbnail")]);
        }

        let response = Self::ensure_success(request.send().await?).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Run the prompt through the moderation endpoint.
    ///
    /// Without a configured moderation model this is a no-op allow. A
    /// transport or API failure is conservatively treated as allowed and
    /// logged, matching the submission contract: moderation may only block
    /// on an affirmative flag.
    pub async fn moderate_prompt(&self, text: &str) -> ModerationVerdict {
        let Some(model) = &self.config.moderation_model else {
            return ModerationVerdict::allowed();
        };

        let result: Result<ModerationResponse, SoraApiError> = async {
            let response = self
                .client
                .post(self.url("/moderations"))
                .bearer_auth(&self.config.api_key)
                .json(&serde_json::json!({ "model": model, "input": text }))
                .send()
                .await?;
            Self::parse_response(response).await
        }
        .await;

        match result {
            Ok(response) => match response.results.into_iter().next() {
                Some(result) => ModerationVerdict {
                    allowed: !result.flagged,
                    flagged: result.flagged,
                    categories: result.categories,
                },
                None => ModerationVerdict::allowed(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Moderation check failed, allowing prompt");
                ModerationVerdict::allowed()
            }
        }
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the response
    /// unchanged on success, or a [`SoraApiError::Api`] containing the
    /// status and body text on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, SoraApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(SoraApiError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, SoraApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Assert the response has a success status code, discarding the body.
    async fn check_status(response: reqwest::Response) -> Result<(), SoraApiError> {
        Self::ensure_success(response).await?;
        Ok(())
    }
}
