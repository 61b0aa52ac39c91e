//! Inventory API client implementation.
//!
//! This module provides the main client for interacting with the server's
//! REST API. It handles authentication, request/response processing, error
//! handling, and retry logic.

use std::time::Duration;

use reqwest::{header, Client, Response, StatusCode};
use tracing::{debug, error, info, instrument, warn};

use super::auth::{self, Auth};
use super::error::{ApiError, Result};
use super::types::{CurrentUser, PagedResults, StockItem, TokenResponse};
use crate::config::Profile;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for transient failures.
const MAX_RETRIES: u32 = 3;

/// Base delay between retries in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Parameters for an installed-items listing request.
///
/// `parent` filters server-side to items installed under that stock item;
/// `part_detail` is always requested so part names render without extra
/// lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StockListQuery {
    /// The parent stock item to filter by.
    pub parent: Option<i64>,
    /// Free-text search term.
    pub search: Option<String>,
    /// Index of the first record to return.
    pub offset: u32,
    /// Maximum number of records to return.
    pub limit: u32,
}

/// The inventory API client.
///
/// Provides async methods for interacting with the server's REST API.
/// Handles authentication, error handling, and retry logic for transient
/// failures.
#[derive(Debug, Clone)]
pub struct InventoryClient {
    /// The HTTP client.
    client: Client,
    /// The base URL of the inventory server.
    base_url: String,
    /// Authentication credentials.
    auth: Auth,
}

impl InventoryClient {
    /// Create a new client from a profile.
    ///
    /// Retrieves the API token from the OS keyring and validates the
    /// connection.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The token cannot be retrieved from the keyring
    /// - The HTTP client cannot be built
    /// - Connection validation fails
    #[instrument(skip(profile), fields(profile_name = %profile.name))]
    pub async fn new(profile: &Profile) -> Result<Self> {
        info!("Creating inventory client for profile");

        let auth = Auth::from_keyring(&profile.name, &profile.username)?;

        let client = Self::build_http_client()?;

        let base_url = normalize_base_url(&profile.url);

        let inventory = Self {
            client,
            base_url,
            auth,
        };

        inventory.validate_connection().await?;

        info!("Inventory client created and connection validated");
        Ok(inventory)
    }

    /// Create a new client with an explicit token.
    ///
    /// Use this for testing or when credentials are provided directly.
    /// Does NOT validate the connection automatically.
    pub fn with_token(base_url: &str, username: &str, token: &str) -> Result<Self> {
        let auth = Auth::new(username, token);
        let client = Self::build_http_client()?;
        let base_url = normalize_base_url(base_url);

        Ok(Self {
            client,
            base_url,
            auth,
        })
    }

    /// Build the HTTP client with appropriate settings.
    fn build_http_client() -> Result<Client> {
        Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(ApiError::Network)
    }

    /// Validate the connection by fetching the current user.
    ///
    /// This verifies that:
    /// - The URL is reachable
    /// - The token is valid
    /// - The user has access to the server
    #[instrument(skip(self))]
    pub async fn validate_connection(&self) -> Result<CurrentUser> {
        debug!("Validating server connection");

        let user = self.get_current_user().await.map_err(|e| {
            error!("Connection validation failed: {}", e);
            match e {
                ApiError::Unauthorized => e,
                ApiError::Network(ref _err) => {
                    ApiError::ConnectionFailed(format!("Cannot connect to {}: {}", self.base_url, e))
                }
                _ => ApiError::ConnectionFailed(e.to_string()),
            }
        })?;

        info!("Connected as user: {}", user.username);
        Ok(user)
    }

    /// Get the current authenticated user.
    ///
    /// Calls `GET /api/user/me/`.
    #[instrument(skip(self))]
    pub async fn get_current_user(&self) -> Result<CurrentUser> {
        let url = format!("{}/api/user/me/", self.base_url);
        let user: CurrentUser = self.get(&url).await?;
        Ok(user)
    }

    /// List stock items installed under a parent item.
    ///
    /// The request always carries `part_detail=true`; the `belongs_to`
    /// filter is added for the supplied parent.
    ///
    /// # Returns
    ///
    /// A `PagedResults` page containing the matching records and the total
    /// count for pagination.
    #[instrument(skip(self), fields(parent = ?query.parent, offset = query.offset))]
    pub async fn list_installed_items(
        &self,
        query: &StockListQuery,
    ) -> Result<PagedResults<StockItem>> {
        debug!("Fetching installed items");

        let url = stock_list_url(&self.base_url, query);
        let page: PagedResults<StockItem> = self.get(&url).await?;

        debug!("Fetched {} of {} items", page.results.len(), page.count);
        Ok(page)
    }

    /// Get a single stock item by primary key.
    ///
    /// Part details are expanded inline.
    #[instrument(skip(self), fields(pk = pk))]
    pub async fn get_stock_item(&self, pk: i64) -> Result<StockItem> {
        debug!("Fetching stock item");

        let url = format!("{}/api/stock/{}/?part_detail=true", self.base_url, pk);
        let item: StockItem = self.get(&url).await.map_err(|e| {
            if matches!(e, ApiError::NotFound(_)) {
                ApiError::NotFound(format!("Stock item {} not found", pk))
            } else {
                e
            }
        })?;

        Ok(item)
    }

    /// Acquire an API token using Basic credentials.
    ///
    /// Calls `GET /api/user/token/` and returns the token for storage in
    /// the keyring. This is the only request that does not use token auth.
    #[instrument(skip(self, password))]
    pub async fn acquire_token(&self, username: &str, password: &str) -> Result<String> {
        debug!("Requesting API token");

        let url = format!("{}/api/user/token/", self.base_url);
        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, auth::basic_header(username, password))
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let token: TokenResponse = self.handle_response(response).await?;
        Ok(token.token)
    }

    /// Perform a GET request with authentication and error handling.
    ///
    /// Includes retry logic for transient failures (rate limiting, server
    /// errors).
    #[instrument(skip(self), fields(url = %url))]
    async fn get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut attempts = 0;
        let mut last_error: Option<ApiError> = None;

        while attempts < MAX_RETRIES {
            attempts += 1;
            debug!("Request attempt {}/{}", attempts, MAX_RETRIES);

            match self.execute_get::<T>(url).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    if Self::is_retryable(&e) && attempts < MAX_RETRIES {
                        let delay = Self::calculate_retry_delay(attempts);
                        warn!(
                            "Request failed (attempt {}), retrying in {}ms: {}",
                            attempts, delay, e
                        );
                        tokio::time::sleep(Duration::from_millis(delay)).await;
                        last_error = Some(e);
                    } else {
                        return Err(e);
                    }
                }
            }
        }

        Err(last_error.unwrap_or(ApiError::ServerError("Max retries exceeded".to_string())))
    }

    /// Execute a single GET request.
    async fn execute_get<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(header::AUTHORIZATION, self.auth.header_value())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Handle the HTTP response, checking for errors and parsing JSON.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T> {
        let status = response.status();
        let url = response.url().to_string();

        if status.is_success() {
            response
                .json::<T>()
                .await
                .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))
        } else {
            let error_body = response.text().await.unwrap_or_default();
            debug!("Error response body: {}", error_body);

            Err(Self::error_from_response(status, &url, &error_body))
        }
    }

    /// Create an appropriate error from an HTTP response.
    fn error_from_response(status: StatusCode, url: &str, body: &str) -> ApiError {
        // DRF-style error bodies carry a "detail" message
        let context = if body.is_empty() {
            url.to_string()
        } else {
            if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
                if let Some(detail) = json.get("detail").and_then(|d| d.as_str()) {
                    return ApiError::from_status(status, detail);
                }
                if let Some(obj) = json.as_object() {
                    let messages: Vec<String> = obj
                        .iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| format!("{}: {}", k, s)))
                        .collect();
                    if !messages.is_empty() {
                        return ApiError::from_status(status, &messages.join(", "));
                    }
                }
            }
            url.to_string()
        };

        ApiError::from_status(status, &context)
    }

    /// Check if an error is retryable.
    fn is_retryable(error: &ApiError) -> bool {
        matches!(
            error,
            ApiError::RateLimited | ApiError::ServerError(_) | ApiError::Network(_)
        )
    }

    /// Calculate retry delay with exponential backoff.
    fn calculate_retry_delay(attempt: u32) -> u64 {
        RETRY_DELAY_MS * 2u64.pow(attempt - 1)
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the web UI URL for a stock item's detail page.
    pub fn stock_item_web_url(&self, pk: i64) -> String {
        format!("{}/stock/item/{}/", self.base_url, pk)
    }
}

/// Build the stock listing URL for a query.
///
/// `part_detail=true` is always present; `belongs_to` is present when a
/// parent is supplied.
pub fn stock_list_url(base_url: &str, query: &StockListQuery) -> String {
    let mut url = format!("{}/api/stock/?part_detail=true", base_url);

    if let Some(parent) = query.parent {
        url.push_str(&format!("&belongs_to={}", parent));
    }
    if let Some(search) = &query.search {
        if !search.is_empty() {
            url.push_str(&format!("&search={}", urlencoding::encode(search)));
        }
    }
    url.push_str(&format!("&limit={}&offset={}", query.limit, query.offset));

    url
}

/// Normalize the base URL by removing trailing slashes.
fn normalize_base_url(url: &str) -> String {
    let url = url.trim_end_matches('/');

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(parent: Option<i64>) -> StockListQuery {
        StockListQuery {
            parent,
            search: None,
            offset: 0,
            limit: 50,
        }
    }

    #[test]
    fn test_stock_list_url_includes_parent_filter() {
        let url = stock_list_url("https://inventory.example.com", &query(Some(42)));
        assert!(url.contains("belongs_to=42"));
        assert!(url.contains("part_detail=true"));
    }

    #[test]
    fn test_stock_list_url_always_requests_part_detail() {
        let url = stock_list_url("https://inventory.example.com", &query(None));
        assert!(url.contains("part_detail=true"));
        assert!(!url.contains("belongs_to"));
    }

    #[test]
    fn test_stock_list_url_pagination() {
        let mut q = query(Some(7));
        q.offset = 100;
        q.limit = 25;
        let url = stock_list_url("https://inventory.example.com", &q);
        assert!(url.contains("limit=25"));
        assert!(url.contains("offset=100"));
    }

    #[test]
    fn test_stock_list_url_encodes_search() {
        let mut q = query(None);
        q.search = Some("m3 bolt".to_string());
        let url = stock_list_url("https://inventory.example.com", &q);
        assert!(url.contains("search=m3%20bolt"));
    }

    #[test]
    fn test_stock_list_url_skips_empty_search() {
        let mut q = query(None);
        q.search = Some(String::new());
        let url = stock_list_url("https://inventory.example.com", &q);
        assert!(!url.contains("search="));
    }

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://inventory.example.com/"),
            "https://inventory.example.com"
        );
    }

    #[test]
    fn test_normalize_base_url_handles_multiple_slashes() {
        assert_eq!(
            normalize_base_url("https://inventory.example.com///"),
            "https://inventory.example.com"
        );
    }

    #[test]
    fn test_normalize_base_url_preserves_path() {
        assert_eq!(
            normalize_base_url("https://example.com/inventory/"),
            "https://example.com/inventory"
        );
    }

    #[test]
    fn test_error_from_response_drf_detail() {
        let err = InventoryClient::error_from_response(
            StatusCode::NOT_FOUND,
            "https://example.com/api/stock/999/",
            r#"{"detail": "Not found."}"#,
        );
        match err {
            ApiError::NotFound(msg) => assert_eq!(msg, "Not found."),
            _ => panic!("Expected NotFound error"),
        }
    }

    #[test]
    fn test_error_from_response_field_errors() {
        let err = InventoryClient::error_from_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "https://example.com/api/stock/",
            r#"{"belongs_to": "Invalid stock item"}"#,
        );
        match err {
            ApiError::ServerError(msg) => assert!(msg.contains("belongs_to: Invalid stock item")),
            _ => panic!("Expected ServerError"),
        }
    }

    #[test]
    fn test_is_retryable_rate_limited() {
        assert!(InventoryClient::is_retryable(&ApiError::RateLimited));
    }

    #[test]
    fn test_is_retryable_server_error() {
        assert!(InventoryClient::is_retryable(&ApiError::ServerError(
            "test".to_string()
        )));
    }

    #[test]
    fn test_is_not_retryable_unauthorized() {
        assert!(!InventoryClient::is_retryable(&ApiError::Unauthorized));
    }

    #[test]
    fn test_is_not_retryable_not_found() {
        assert!(!InventoryClient::is_retryable(&ApiError::NotFound(
            "test".to_string()
        )));
    }

    #[test]
    fn test_retry_delay_exponential() {
        assert_eq!(InventoryClient::calculate_retry_delay(1), 1000);
        assert_eq!(InventoryClient::calculate_retry_delay(2), 2000);
        assert_eq!(InventoryClient::calculate_retry_delay(3), 4000);
    }

    #[test]
    fn test_stock_item_web_url() {
        let client =
            InventoryClient::with_token("https://inventory.example.com/", "alice", "token")
                .unwrap();
        assert_eq!(
            client.stock_item_web_url(42),
            "https://inventory.example.com/stock/item/42/"
        );
    }

    #[test]
    fn test_with_token_normalizes_base_url() {
        let client =
            InventoryClient::with_token("https://inventory.example.com///", "alice", "token")
                .unwrap();
        assert_eq!(client.base_url(), "https://inventory.example.com");
    }
}
