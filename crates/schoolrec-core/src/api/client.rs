//! API client for communicating with the school-records REST backend.
//!
//! This module provides the `ApiClient` struct for logging in and for the
//! list / add / edit / delete calls every admin screen makes. Every call
//! takes the caller's `AuthContext` explicitly.

use std::time::Duration;

use reqwest::{Client, Method, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::models::{
    CandidateEntry, ClassSubject, ListResponse, Page, Record, Resource, SchoolClass, SchoolRoom,
    SchoolSubject, SchoolYear, WriteResponse,
};
use crate::staging::{BatchMethod, BatchRequest, BatchWriter};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Batch writes are sent once. A 429 means the server did not process the
/// batch, and the caller keeps its rows to save again.
const BATCH_RATE_LIMIT_RETRIES: u32 = 0;

/// Message shown when the backend refuses a login
const INVALID_LOGIN_MESSAGE: &str = "Invalid username or password.";

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    token: Option<String>,
    message: Option<String>,
}

impl LoginResponse {
    fn into_token(self) -> Result<String, ApiError> {
        match self.token {
            Some(token) if self.success && !token.is_empty() => Ok(token),
            _ => Err(ApiError::AccessDenied(
                self.message
                    .unwrap_or_else(|| INVALID_LOGIN_MESSAGE.to_string()),
            )),
        }
    }
}

/// API client for the school-records backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the backend at `base_url` (e.g. `https://host/api`)
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn admin_url(&self, path: &str) -> String {
        format!("{}/admin/{}", self.base_url, path)
    }

    fn list_url(&self, resource: Resource, page: u32, search: &str) -> Result<Url, ApiError> {
        let base = self.admin_url(&format!("{}/list", resource.path()));
        let page = page.max(1).to_string();
        Url::parse_with_params(&base, &[("page", page.as_str()), ("searchTerm", search)])
            .map_err(|e| ApiError::InvalidResponse(format!("Bad list URL {}: {}", base, e)))
    }

    /// Log in and return the context to pass to every other call
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthContext, ApiError> {
        let url = format!("{}/auth/login", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if response.status().as_u16() == 401 {
            return Err(ApiError::AccessDenied(INVALID_LOGIN_MESSAGE.to_string()));
        }
        let response = Self::check_response(response).await?;
        let login: LoginResponse = response.json().await?;
        let token = login.into_token()?;

        debug!(username = username, "Authenticated");
        Ok(AuthContext::new(token, username.to_string()))
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should
    /// retry), or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            Self::check_response(response).await.map(Some)
        }
    }

    async fn send<T, B>(
        &self,
        method: Method,
        url: Url,
        auth: &AuthContext,
        body: Option<&B>,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send_with_retries(method, url, auth, body, MAX_RATE_LIMIT_RETRIES)
            .await
    }

    async fn send_with_retries<T, B>(
        &self,
        method: Method,
        url: Url,
        auth: &AuthContext,
        body: Option<&B>,
        max_retries: u32,
    ) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let token = auth.bearer()?;
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url.clone())
                .bearer_auth(token);
            if let Some(body) = body {
                request = request.json(body);
            }
            let response = request.send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response.json().await.map_err(|e| {
                        ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e))
                    });
                }
                None => {
                    retries += 1;
                    if retries > max_retries {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = %url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str, auth: &AuthContext) -> Result<T, ApiError> {
        let url = Self::parse_url(url)?;
        self.send::<T, ()>(Method::GET, url, auth, None).await
    }

    async fn write<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        auth: &AuthContext,
        body: Option<&B>,
    ) -> Result<WriteResponse, ApiError> {
        let url = Self::parse_url(url)?;
        self.send(method, url, auth, body).await
    }

    fn parse_url(url: &str) -> Result<Url, ApiError> {
        Url::parse(url).map_err(|e| ApiError::InvalidResponse(format!("Bad URL {}: {}", url, e)))
    }

    // ===== Listing =====

    /// One page of a resource, optionally filtered by a search term
    pub async fn list<T: Record>(
        &self,
        auth: &AuthContext,
        page: u32,
        search: &str,
    ) -> Result<Page<T>, ApiError> {
        let url = self.list_url(T::RESOURCE, page, search)?;
        let page: Page<T> = self.send::<Page<T>, ()>(Method::GET, url, auth, None).await?;
        debug!(
            resource = %T::RESOURCE,
            count = page.data.len(),
            page = page.current_page,
            total_pages = page.total_pages,
            "Fetched page"
        );
        Ok(page)
    }

    /// Every record of a resource, as used to fill lookup dropdowns
    pub async fn list_all<T: Record>(&self, auth: &AuthContext) -> Result<Vec<T>, ApiError> {
        let url = self.admin_url(&format!("{}/list", T::RESOURCE.path()));
        let response: ListResponse<T> = self.get(&url, auth).await?;
        Ok(response.data)
    }

    /// Records belonging to a parent (sections of a level, subjects of a
    /// level, class-subjects of a class, classes of a school year)
    pub async fn list_for<T: Record>(
        &self,
        auth: &AuthContext,
        parent_id: &str,
    ) -> Result<Vec<T>, ApiError> {
        let url = self.admin_url(&format!("{}/list/{}", T::RESOURCE.path(), parent_id));
        let response: ListResponse<T> = self.get(&url, auth).await?;
        Ok(response.data)
    }

    pub async fn active_school_year(&self, auth: &AuthContext) -> Result<SchoolYear, ApiError> {
        let url = self.admin_url(&format!("{}/view/active", Resource::SchoolYear.path()));
        self.get(&url, auth).await
    }

    pub async fn level_subjects(
        &self,
        auth: &AuthContext,
        level_id: &str,
    ) -> Result<Vec<SchoolSubject>, ApiError> {
        self.list_for(auth, level_id).await
    }

    pub async fn rooms(&self, auth: &AuthContext) -> Result<Vec<SchoolRoom>, ApiError> {
        self.list_all(auth).await
    }

    /// Classes open for enrollment in a school year
    pub async fn open_classes(
        &self,
        auth: &AuthContext,
        school_year_id: &str,
    ) -> Result<Vec<SchoolClass>, ApiError> {
        self.list_for(auth, school_year_id).await
    }

    /// Scheduled subjects of a class, flattened into enrollment slots
    pub async fn class_candidates(
        &self,
        auth: &AuthContext,
        class_id: &str,
    ) -> Result<Vec<CandidateEntry>, ApiError> {
        let subjects: Vec<ClassSubject> = self.list_for(auth, class_id).await?;
        Ok(subjects.iter().map(ClassSubject::to_candidate).collect())
    }

    // ===== Writes =====

    pub async fn add<B: Serialize + ?Sized>(
        &self,
        auth: &AuthContext,
        resource: Resource,
        body: &B,
    ) -> Result<Value, ApiError> {
        let url = self.admin_url(&format!("{}/add", resource.path()));
        self.write(Method::POST, &url, auth, Some(body)).await?.into_result()
    }

    pub async fn edit<B: Serialize + ?Sized>(
        &self,
        auth: &AuthContext,
        resource: Resource,
        id: &str,
        body: &B,
    ) -> Result<Value, ApiError> {
        let url = self.admin_url(&format!("{}/edit/{}", resource.path(), id));
        self.write(Method::PUT, &url, auth, Some(body)).await?.into_result()
    }

    pub async fn delete(&self, auth: &AuthContext, resource: Resource, id: &str) -> Result<(), ApiError> {
        let url = self.admin_url(&format!("{}/delete/{}", resource.path(), id));
        self.write::<()>(Method::DELETE, &url, auth, None)
            .await?
            .into_result()?;
        debug!(resource = %resource, id = id, "Deleted");
        Ok(())
    }
}

impl BatchWriter for ApiClient {
    async fn write_batch(
        &self,
        auth: &AuthContext,
        request: &BatchRequest,
    ) -> Result<WriteResponse, ApiError> {
        let method = match request.endpoint.method() {
            BatchMethod::Post => Method::POST,
            BatchMethod::Put => Method::PUT,
        };
        let url = Self::parse_url(&self.admin_url(&request.endpoint.path()))?;
        self.send_with_retries(method, url, auth, Some(&request.body), BATCH_RATE_LIMIT_RETRIES)
            .await
    }
}
