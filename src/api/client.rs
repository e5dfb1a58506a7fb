//! HTTP client for the remote expense API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use super::models::{
    Acknowledgement, AuthResponse, Expense, ExpenseDraft, ExpenseId, ExpenseList, LogInRequest,
    Registration, SpendingDatum, SpendingMetrics,
};
use crate::{config::ApiConfig, endpoints::encode_path_segment};

/// Errors that can occur when communicating with the expense API.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The API could not be reached.
    #[error("cannot connect to {0}")]
    Connection(String),

    /// The API did not respond within the configured timeout.
    #[error("request to {0} timed out")]
    Timeout(String),

    /// The request failed for a reason other than a connection problem.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The response body could not be decoded.
    #[error("failed to parse response: {0}")]
    Decode(String),

    /// The session token was missing, invalid or expired.
    #[error("the session token was rejected")]
    Unauthorized,

    /// The API understood the request but refused it.
    ///
    /// `message` holds the server-provided explanation, if any.
    #[error("request rejected with status {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// The HTTP status code of the response.
        status: u16,
        /// The `message` field of the response body.
        message: Option<String>,
    },

    /// Authentication succeeded but the response did not include a session token.
    #[error("the API did not issue a session token")]
    MissingToken,
}

impl ApiError {
    /// Reduce the error to a single notification string for the user.
    ///
    /// The server's own message is preferred; `fallback` is used otherwise.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ApiError::Unauthorized => "Your session has expired, please log in again.".to_owned(),
            _ => fallback.to_owned(),
        }
    }

    fn from_reqwest(error: reqwest::Error, url: &str) -> Self {
        if error.is_connect() {
            ApiError::Connection(url.to_owned())
        } else if error.is_timeout() {
            ApiError::Timeout(url.to_owned())
        } else if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Http(error.to_string())
        }
    }
}

/// Client for the remote expense API.
///
/// Cloning is cheap, the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [ApiError::Http] if the HTTP client could not be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|error| ApiError::Http(error.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// The base URL that endpoint paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> (RequestBuilder, String) {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{method} {url}");

        let builder = self.client.request(method, &url);
        let builder = match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        (builder, url)
    }

    async fn send(builder: RequestBuilder, url: &str) -> Result<Response, ApiError> {
        builder
            .send()
            .await
            .map_err(|error| ApiError::from_reqwest(error, url))
    }

    /// Turn non-success statuses into errors, keeping the server's message.
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }

        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<Acknowledgement>()
            .await
            .ok()
            .and_then(|body| body.message);

        Err(ApiError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|error| ApiError::Decode(error.to_string()))
    }

    /// Send a mutating request and check the acknowledgement in the body.
    async fn mutate<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        token: &str,
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let (builder, url) = self.request(method, path, Some(token));
        let builder = match body {
            Some(body) => builder.json(body),
            None => builder,
        };

        let response = Self::check_status(Self::send(builder, &url).await?).await?;
        let status = response.status().as_u16();

        // Acknowledgements are optional, a body that is not JSON is still a success.
        let acknowledgement = response.json::<Acknowledgement>().await.unwrap_or_default();

        match acknowledgement.success {
            Some(false) => Err(ApiError::Rejected {
                status,
                message: acknowledgement.message,
            }),
            _ => Ok(()),
        }
    }

    async fn authenticate<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<AuthResponse, ApiError> {
        let (builder, url) = self.request(Method::POST, path, None);
        let response = Self::send(builder.json(body), &url).await?;
        let status = response.status();

        // A failed log-in is reported with a 4xx status by some API revisions
        // and with `success: false` by others, so both are decoded the same way.
        if status.is_server_error() {
            let message = response
                .json::<Acknowledgement>()
                .await
                .ok()
                .and_then(|body| body.message);

            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let auth_response = match Self::decode::<AuthResponse>(response).await {
            Ok(auth_response) => auth_response,
            Err(_) if !status.is_success() => {
                return Err(ApiError::Rejected {
                    status: status.as_u16(),
                    message: None,
                });
            }
            Err(error) => return Err(error),
        };

        if !auth_response.success || !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: auth_response.message,
            });
        }

        Ok(auth_response)
    }

    /// Log in with `credentials` via `POST /user/login`.
    ///
    /// # Errors
    ///
    /// Returns [ApiError::Rejected] with the server's message if the
    /// credentials are wrong, or another [ApiError] if the request failed.
    pub async fn log_in(&self, credentials: &LogInRequest) -> Result<AuthResponse, ApiError> {
        self.authenticate("/user/login", credentials).await
    }

    /// Create an account via `POST /user/register`.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, ApiError> {
        self.authenticate("/user/register", registration).await
    }

    /// End the session for `token` via `POST /user/logout`.
    pub async fn log_out(&self, token: &str) -> Result<(), ApiError> {
        self.mutate(
            Method::POST,
            "/user/logout",
            token,
            Some(&serde_json::json!({})),
        )
        .await
    }

    /// Fetch every expense of the signed in user via `GET /expense/view`.
    ///
    /// The list is returned in the order the server sent it.
    pub async fn list_expenses(&self, token: &str) -> Result<Vec<Expense>, ApiError> {
        let (builder, url) = self.request(Method::GET, "/expense/view", Some(token));
        let response = Self::check_status(Self::send(builder, &url).await?).await?;
        let list: ExpenseList = Self::decode(response).await?;

        Ok(list.expenses)
    }

    /// Fetch the spending totals per category via `GET /expense/metrics`.
    pub async fn spending_metrics(&self, token: &str) -> Result<Vec<SpendingDatum>, ApiError> {
        let (builder, url) = self.request(Method::GET, "/expense/metrics", Some(token));
        let response = Self::check_status(Self::send(builder, &url).await?).await?;
        let metrics: SpendingMetrics = Self::decode(response).await?;

        Ok(metrics.spending)
    }

    /// Create an expense via `POST /expense/add`.
    pub async fn add_expense(&self, token: &str, draft: &ExpenseDraft) -> Result<(), ApiError> {
        self.mutate(Method::POST, "/expense/add", token, Some(draft))
            .await
    }

    /// Replace the fields of expense `id` via `PUT /expense/update/:id`.
    pub async fn update_expense(
        &self,
        token: &str,
        id: &ExpenseId,
        draft: &ExpenseDraft,
    ) -> Result<(), ApiError> {
        let path = expense_path("update", id)?;
        self.mutate(Method::PUT, &path, token, Some(draft)).await
    }

    /// Delete expense `id` via `DELETE /expense/delete/:id`.
    pub async fn delete_expense(&self, token: &str, id: &ExpenseId) -> Result<(), ApiError> {
        let path = expense_path("delete", id)?;
        self.mutate::<()>(Method::DELETE, &path, token, None).await
    }
}

/// `/expense/{action}/{id}` with `id` encoded as a single path segment.
fn expense_path(action: &str, id: &ExpenseId) -> Result<String, ApiError> {
    // URL parsing resolves dot segments even when they are percent-encoded.
    if matches!(id.as_str(), "" | "." | "..") {
        return Err(ApiError::Rejected {
            status: StatusCode::NOT_FOUND.as_u16(),
            message: Some("Expense not found".to_owned()),
        });
    }

    Ok(format!("/expense/{action}/{}", encode_path_segment(id.as_str())))
}
