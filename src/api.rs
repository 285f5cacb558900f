//! Typed calls for each IdeaHub endpoint.
//!
//! Protected calls check the session first and fail with
//! `UnauthenticatedAccess` without touching the network; the server's own
//! 401 remains the final word when a stale token slips through.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use reqwest::Method;
use tracing::debug;

use crate::error::ClientError;
use crate::http::{HttpClient, RequestBody};
use crate::types::{HealthStatus, Idea, NewIdea, User};

pub const IDEAS_PATH: &str = "/ideas";
pub const USERS_PATH: &str = "/users";
pub const CURRENT_USER_PATH: &str = "/users/me";
pub const HEALTH_PATH: &str = "/health";

pub(crate) fn idea_like_endpoint(idea_id: i64) -> String {
    format!("{IDEAS_PATH}/{idea_id}/like")
}

fn require_session(http: &HttpClient, action: &'static str) -> Result<(), ClientError> {
    if http.session().current_token().is_none() {
        debug!(action, "blocked protected call without a session");
        return Err(ClientError::UnauthenticatedAccess { action });
    }
    Ok(())
}

/// Fetch every idea from `GET /ideas`.
///
/// # Errors
///
/// Returns [`ClientError`] for transport, HTTP, or decode failures.
pub async fn list_ideas(http: &HttpClient) -> Result<Vec<Idea>, ClientError> {
    http.request_json(Method::GET, IDEAS_PATH, None).await
}

/// Create an idea via `POST /ideas`. The response body is not used; callers
/// re-fetch the list.
///
/// # Errors
///
/// - [`ClientError::InvalidInput`] for a blank title
/// - [`ClientError::UnauthenticatedAccess`] without a session
/// - any request failure from the adapter
pub async fn create_idea(http: &HttpClient, idea: &NewIdea) -> Result<(), ClientError> {
    if !idea.is_valid() {
        return Err(ClientError::InvalidInput("title must not be empty".to_owned()));
    }
    require_session(http, "create ideas")?;
    let body = RequestBody::json(idea)?;
    http.request(Method::POST, IDEAS_PATH, Some(body), None).await?;
    Ok(())
}

/// Like an idea, then return the freshly fetched list rather than trusting
/// the like response.
///
/// # Errors
///
/// Returns [`ClientError::UnauthenticatedAccess`] without a session, or the
/// first failure of the like call or the refetch.
pub async fn like_idea(http: &HttpClient, idea_id: i64) -> Result<Vec<Idea>, ClientError> {
    require_session(http, "like ideas")?;
    http.request(Method::POST, &idea_like_endpoint(idea_id), None, None).await?;
    list_ideas(http).await
}

/// Fetch registered users from `GET /users`.
///
/// # Errors
///
/// Returns [`ClientError::UnauthenticatedAccess`] without a session, or any
/// request failure.
pub async fn list_users(http: &HttpClient) -> Result<Vec<User>, ClientError> {
    require_session(http, "view users")?;
    http.request_json(Method::GET, USERS_PATH, None).await
}

/// Fetch the user the current token belongs to.
///
/// # Errors
///
/// Same as [`list_users`].
pub async fn current_user(http: &HttpClient) -> Result<User, ClientError> {
    require_session(http, "view your profile")?;
    http.request_json(Method::GET, CURRENT_USER_PATH, None).await
}

/// Query `GET /health`.
///
/// # Errors
///
/// Returns [`ClientError`] for transport, HTTP, or decode failures.
pub async fn health(http: &HttpClient) -> Result<HealthStatus, ClientError> {
    http.request_json(Method::GET, HEALTH_PATH, None).await
}
