//! Stateless HTTP request builder and response parser for the myFlix API.
//!
//! # Design
//! `MovieClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Authenticated builders take the bearer
//! token as `Option<&str>`; `None` omits the header and lets the server
//! reject the call. User names, titles and ids are percent-encoded as path
//! segments.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::error;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, Director, Genre, LoginResponse, Movie, MovieId, NewUser, User, UserUpdate};

/// Synchronous, stateless client for the myFlix API.
#[derive(Debug, Clone)]
pub struct MovieClient {
    base_url: String,
}

impl MovieClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn build_register(&self, input: &NewUser) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/users".to_string(), None, input)
    }

    pub fn build_login(&self, input: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/login".to_string(), None, input)
    }

    pub fn build_list_movies(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/movies".to_string(), token)
    }

    pub fn build_get_movie(&self, token: Option<&str>, title: &str) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/movies/{}", segment(title)), token)
    }

    pub fn build_get_director(&self, token: Option<&str>, name: &str) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/movies/Director/{}", segment(name)), token)
    }

    pub fn build_get_genre(&self, token: Option<&str>, name: &str) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/movies/Genre/{}", segment(name)), token)
    }

    pub fn build_get_user(&self, token: Option<&str>, name: &str) -> HttpRequest {
        self.request(HttpMethod::Get, format!("/users/{}", segment(name)), token)
    }

    pub fn build_list_users(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/users".to_string(), token)
    }

    /// `PUT` with an empty JSON object, as the API expects a body.
    pub fn build_add_favorite(&self, token: Option<&str>, user_name: &str, movie_id: &MovieId) -> HttpRequest {
        let mut req = self.request(HttpMethod::Put, favorite_path(user_name, movie_id), token);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some("{}".to_string());
        req
    }

    pub fn build_remove_favorite(&self, token: Option<&str>, user_name: &str, movie_id: &MovieId) -> HttpRequest {
        self.request(HttpMethod::Delete, favorite_path(user_name, movie_id), token)
    }

    pub fn build_edit_user(
        &self,
        token: Option<&str>,
        user_name: &str,
        input: &UserUpdate,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, format!("/users/{}", segment(user_name)), token, input)
    }

    pub fn build_delete_user(&self, token: Option<&str>, user_name: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, format!("/users/{}", segment(user_name)), token)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response)
    }

    pub fn parse_login(&self, response: HttpResponse) -> Result<LoginResponse, ApiError> {
        parse_body(response)
    }

    pub fn parse_list_movies(&self, response: HttpResponse) -> Result<Vec<Movie>, ApiError> {
        parse_body(response)
    }

    pub fn parse_get_movie(&self, response: HttpResponse) -> Result<Movie, ApiError> {
        parse_body(response)
    }

    pub fn parse_get_director(&self, response: HttpResponse) -> Result<Director, ApiError> {
        parse_body(response)
    }

    pub fn parse_get_genre(&self, response: HttpResponse) -> Result<Genre, ApiError> {
        parse_body(response)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response)
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        parse_body(response)
    }

    pub fn parse_add_favorite(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response)
    }

    pub fn parse_remove_favorite(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response)
    }

    pub fn parse_edit_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_body(response)
    }

    /// The server answers with a plain-text confirmation; only the status
    /// matters.
    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(&self, method: HttpMethod, path: String, token: Option<&str>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn json_request<T: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        token: Option<&str>,
        input: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path, token);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

fn favorite_path(user_name: &str, movie_id: &MovieId) -> String {
    format!(
        "/users/{}/FavoriteMovies/{}",
        segment(user_name),
        segment(movie_id.as_str())
    )
}

/// Collapse every non-2xx status into the generic failure.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    error!(status = response.status, body = %response.body, "request failed");
    Err(ApiError::RequestFailed)
}

fn parse_body<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::InvalidPayload(e.to_string()))
}
