// ABOUTME: REST client for the hosted backend platform's entity, auth, and integration APIs
// ABOUTME: Implements every gateway contract over reqwest with bearer-token authentication
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Stepwise Assistant

//! # Backend Client
//!
//! Talks to the hosted backend platform that owns persistence, auth, file
//! storage and LLM invocation. Endpoints are relative to the application
//! base URL:
//!
//! | Operation | Request |
//! |---|---|
//! | create | `POST entities/{Entity}` |
//! | get | `GET entities/{Entity}/{id}` |
//! | list | `GET entities/{Entity}?sort=-created_date&limit=50` |
//! | filter | `GET entities/{Entity}?q={json}&sort=…&limit=…` |
//! | update | `PUT entities/{Entity}/{id}` |
//! | me / update me | `GET`/`PUT entities/User/me` |
//! | InvokeLLM | `POST integrations/Core/InvokeLLM` |
//! | UploadFile | `POST integrations/Core/UploadFile` (multipart) |

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, instrument, warn};
use url::Url;

use super::{EntityGateway, Filter, SessionGateway, SortKey};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::integrations::{
    FileGateway, FileUpload, InvokeLlmRequest, LlmGateway, LlmOutput, UploadedFile,
};
use crate::models::{Entity, User, UserPatch};

/// Service name used in error messages
const SERVICE: &str = "Backend";

/// Connection timeout for the backend platform
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Configuration for [`BackendClient`]
#[derive(Debug, Clone)]
pub struct BackendClientConfig {
    /// Application base URL, e.g. `https://backend.example.com/api/apps/{app_id}/`
    pub base_url: Url,
    /// Session token sent as `Authorization: Bearer …`
    pub api_token: Option<String>,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

/// Error body returned by the backend platform
#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    #[serde(alias = "detail", alias = "error")]
    message: String,
}

/// Response of the upload integration
#[derive(Debug, Deserialize)]
struct UploadFileResponse {
    file_url: String,
}

/// Body of the LLM integration
#[derive(Debug, Serialize)]
struct InvokeLlmBody<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "no_files")]
    file_urls: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    response_json_schema: Option<&'a Value>,
}

fn no_files(file_urls: &&[String]) -> bool {
    file_urls.is_empty()
}

/// REST client for the hosted backend platform
pub struct BackendClient {
    client: Client,
    base_url: Url,
    token: RwLock<Option<String>>,
}

impl BackendClient {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: BackendClientConfig) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        let mut base_url = config.base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            token: RwLock::new(config.api_token),
        })
    }

    /// Replace the session token (after a login redirect completes)
    pub async fn set_token(&self, token: Option<String>) {
        *self.token.write().await = token;
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| AppError::internal(format!("Invalid backend path '{path}': {e}")))
    }

    fn entity_url<E: Entity>(&self, id: Option<&str>) -> AppResult<Url> {
        match id {
            Some(id) => self.endpoint(&format!(
                "entities/{}/{}",
                E::NAME,
                urlencoding::encode(id)
            )),
            None => self.endpoint(&format!("entities/{}", E::NAME)),
        }
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = self.authorized(request).await.send().await.map_err(|e| {
            error!("Failed to reach backend: {}", e);
            if e.is_connect() || e.is_timeout() {
                AppError::unavailable(SERVICE, format!("Cannot reach {}: {e}", self.base_url))
            } else {
                AppError::external_service(SERVICE, format!("Request failed: {e}"))
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(Self::parse_error_response(status, &body))
    }

    async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
        let body = response.text().await.map_err(|e| {
            AppError::external_service(SERVICE, format!("Failed to read response: {e}"))
        })?;
        serde_json::from_str(&body).map_err(|e| {
            error!("Failed to parse backend response: {}", e);
            AppError::external_service(SERVICE, format!("Failed to parse response: {e}"))
        })
    }

    /// Map a non-success response onto the error taxonomy
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<BackendErrorBody>(body).map_or_else(
            |_| body.chars().take(200).collect::<String>(),
            |parsed| parsed.message,
        );

        match status.as_u16() {
            401 => AppError::auth_required(),
            403 => AppError::auth_invalid(format!("Backend rejected credentials: {message}")),
            400 | 422 => AppError::invalid_input(format!("Backend validation error: {message}")),
            404 => AppError::not_found(format!("Backend resource ({message})")),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                "Too many requests. Please wait a moment and try again.",
            ),
            502..=504 => AppError::unavailable(SERVICE, format!("({status}) {message}")),
            _ => AppError::external_service(SERVICE, format!("API error ({status}): {message}")),
        }
    }

    fn query_params(sort: &SortKey, limit: Option<usize>) -> Vec<(&'static str, String)> {
        let mut params = vec![("sort", sort.to_string())];
        if let Some(limit) = limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

#[async_trait]
impl<E: Entity> EntityGateway<E> for BackendClient {
    #[instrument(skip(self, draft), fields(entity = E::NAME))]
    async fn create(&self, draft: E::Draft) -> AppResult<E> {
        let url = self.entity_url::<E>(None)?;
        let response = self
            .send(self.client.post(url).json(&draft))
            .await
            .map_err(|e| gateway_error::<E>("create", e))?;
        Self::read_json(response).await
    }

    #[instrument(skip(self), fields(entity = E::NAME))]
    async fn get(&self, id: &str) -> AppResult<Option<E>> {
        let url = self.entity_url::<E>(Some(id))?;
        match self.send(self.client.get(url)).await {
            Ok(response) => Self::read_json(response).await.map(Some),
            Err(e) if e.code == ErrorCode::ResourceNotFound => {
                debug!(entity = E::NAME, id, "Record not found");
                Ok(None)
            }
            Err(e) => Err(gateway_error::<E>("get", e)),
        }
    }

    #[instrument(skip(self), fields(entity = E::NAME, sort = %sort))]
    async fn list(&self, sort: &SortKey, limit: Option<usize>) -> AppResult<Vec<E>> {
        let url = self.entity_url::<E>(None)?;
        let request = self.client.get(url).query(&Self::query_params(sort, limit));
        let response = self
            .send(request)
            .await
            .map_err(|e| gateway_error::<E>("list", e))?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, filter), fields(entity = E::NAME, sort = %sort))]
    async fn filter(
        &self,
        filter: &Filter,
        sort: &SortKey,
        limit: Option<usize>,
    ) -> AppResult<Vec<E>> {
        let url = self.entity_url::<E>(None)?;
        let mut params = Self::query_params(sort, limit);
        params.push(("q", serde_json::to_string(filter)?));
        let response = self
            .send(self.client.get(url).query(&params))
            .await
            .map_err(|e| gateway_error::<E>("filter", e))?;
        Self::read_json(response).await
    }

    #[instrument(skip(self, patch), fields(entity = E::NAME))]
    async fn update(&self, id: &str, patch: E::Patch) -> AppResult<E> {
        let url = self.entity_url::<E>(Some(id))?;
        let response = self
            .send(self.client.put(url).json(&patch))
            .await
            .map_err(|e| gateway_error::<E>("update", e).with_resource_id(id))?;
        Self::read_json(response).await
    }
}

/// Prefix an error with the entity and operation, keeping auth and not-found codes intact
fn gateway_error<E: Entity>(operation: &str, error: AppError) -> AppError {
    if error.is_auth_required() || error.code == ErrorCode::ResourceNotFound {
        return error;
    }
    warn!(entity = E::NAME, operation, "Gateway operation failed: {}", error.message);
    AppError::new(
        error.code,
        format!("{}.{operation} failed: {}", E::NAME, error.message),
    )
}

#[async_trait]
impl SessionGateway for BackendClient {
    async fn me(&self) -> AppResult<User> {
        let url = self.endpoint("entities/User/me")?;
        let response = self.send(self.client.get(url)).await?;
        Self::read_json(response).await
    }

    async fn update_me(&self, patch: UserPatch) -> AppResult<User> {
        let url = self.endpoint("entities/User/me")?;
        let response = self.send(self.client.put(url).json(&patch)).await?;
        Self::read_json(response).await
    }

    fn login_url(&self, return_to: &str) -> String {
        let mut url = self.base_url.clone();
        url.set_path("/login");
        url.query_pairs_mut().append_pair("from_url", return_to);
        url.to_string()
    }

    async fn logout(&self) -> AppResult<()> {
        let url = self.endpoint("auth/logout")?;
        let result = self.send(self.client.post(url)).await;
        self.set_token(None).await;
        if let Err(e) = result {
            warn!("Backend logout failed, local token cleared anyway: {}", e);
        }
        Ok(())
    }
}

#[async_trait]
impl LlmGateway for BackendClient {
    #[instrument(skip(self, request), fields(structured = request.response_json_schema.is_some()))]
    async fn invoke_llm(&self, request: InvokeLlmRequest) -> AppResult<LlmOutput> {
        let url = self.endpoint("integrations/Core/InvokeLLM")?;
        let body = InvokeLlmBody {
            prompt: &request.prompt,
            file_urls: &request.file_urls,
            response_json_schema: request.response_json_schema.as_ref(),
        };
        let response = self.send(self.client.post(url).json(&body)).await?;
        let value: Value = Self::read_json(response).await?;

        Ok(match value {
            Value::String(text) => LlmOutput::Text(text),
            Value::Null => LlmOutput::Empty,
            other => LlmOutput::Json(other),
        })
    }
}

#[async_trait]
impl FileGateway for BackendClient {
    #[instrument(skip(self, file), fields(file_name = %file.file_name, size = file.bytes.len()))]
    async fn upload_file(&self, file: FileUpload) -> AppResult<UploadedFile> {
        let url = self.endpoint("integrations/Core/UploadFile")?;
        let part = Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| AppError::invalid_input(format!("Invalid content type: {e}")))?;
        let form = Form::new().part("file", part);

        let response = self.send(self.client.post(url).multipart(form)).await?;
        let uploaded: UploadFileResponse = Self::read_json(response).await?;
        Ok(UploadedFile {
            file_url: uploaded.file_url,
        })
    }
}
