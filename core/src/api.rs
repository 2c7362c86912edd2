//! Async facade over `MovieClient`, a `Transport`, and a `SessionStore`.
//!
//! # Design
//! Each operation reads what it needs from the session, builds a request,
//! executes it, parses the response, and then applies session side effects
//! (store after login, refresh after a profile fetch or edit, clear after
//! logout or account deletion). Operations that touch the session take
//! `&mut self`, so one facade never interleaves two writes to it.

use tracing::info;

use crate::client::MovieClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{LogNotifier, Notifier};
use crate::session::{FileStore, KeyValueStore, SessionStore};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Credentials, Director, Genre, LoginResponse, Movie, MovieId, NewUser, User, UserUpdate};

pub const LOGIN_NOTICE: &str = "User Login successful";
pub const FAVORITE_ADDED_NOTICE: &str = "Movie added to favorites!";
pub const PROFILE_UPDATED_NOTICE: &str = "Profile updated successfully!";
pub const PROFILE_UPDATE_FAILED_NOTICE: &str = "Failed to update profile.";

pub struct MovieApi<T, S, N> {
    client: MovieClient,
    transport: T,
    session: SessionStore<S, N>,
}

impl MovieApi<UreqTransport, FileStore, LogNotifier> {
    /// Facade talking to `config.api.url` over HTTP, with the session kept
    /// in `config.session.file`.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        let store = FileStore::open(&config.session.file)?;
        Ok(Self::new(
            MovieClient::new(&config.api.url),
            UreqTransport::new(),
            SessionStore::new(store, LogNotifier),
        ))
    }
}

impl<T, S, N> MovieApi<T, S, N>
where
    T: Transport,
    S: KeyValueStore,
    N: Notifier,
{
    pub fn new(client: MovieClient, transport: T, session: SessionStore<S, N>) -> Self {
        Self {
            client,
            transport,
            session,
        }
    }

    pub fn session(&self) -> &SessionStore<S, N> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionStore<S, N> {
        &mut self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn register(&self, input: &NewUser) -> Result<User, ApiError> {
        let req = self.client.build_register(input)?;
        let user = self.client.parse_register(self.send(req).await?)?;
        info!(user = %user.name, "registered");
        Ok(user)
    }

    /// Log in and store the returned token and user as the session.
    pub async fn login(&mut self, input: &Credentials) -> Result<LoginResponse, ApiError> {
        let req = self.client.build_login(input)?;
        let login = self.client.parse_login(self.send(req).await?)?;
        self.session.set_session(&login.token, &login.user)?;
        self.session.notifier().notify(LOGIN_NOTICE);
        info!(user = %login.user.name, "logged in");
        Ok(login)
    }

    pub fn logout(&mut self) -> Result<(), ApiError> {
        self.session.clear_session()?;
        info!("logged out");
        Ok(())
    }

    pub async fn list_movies(&self) -> Result<Vec<Movie>, ApiError> {
        let token = self.session.get_token();
        let req = self.client.build_list_movies(token.as_deref());
        self.client.parse_list_movies(self.send(req).await?)
    }

    pub async fn get_movie(&self, title: &str) -> Result<Movie, ApiError> {
        let token = self.session.get_token();
        let req = self.client.build_get_movie(token.as_deref(), title);
        self.client.parse_get_movie(self.send(req).await?)
    }

    pub async fn get_director(&self, name: &str) -> Result<Director, ApiError> {
        let token = self.session.get_token();
        let req = self.client.build_get_director(token.as_deref(), name);
        self.client.parse_get_director(self.send(req).await?)
    }

    pub async fn get_genre(&self, name: &str) -> Result<Genre, ApiError> {
        let token = self.session.get_token();
        let req = self.client.build_get_genre(token.as_deref(), name);
        self.client.parse_get_genre(self.send(req).await?)
    }

    /// Fetch a user by name. Fetching the signed-in user refreshes the
    /// stored record.
    pub async fn get_user(&mut self, name: &str) -> Result<User, ApiError> {
        let token = self.session.get_token();
        let req = self.client.build_get_user(token.as_deref(), name);
        let user = self.client.parse_get_user(self.send(req).await?)?;
        if self.is_current_user(name) {
            self.session.set_user(&user)?;
        }
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let token = self.session.get_token();
        let req = self.client.build_list_users(token.as_deref());
        self.client.parse_list_users(self.send(req).await?)
    }

    /// Add a favorite for the signed-in user. Without a token or a current
    /// user no request is made.
    pub async fn add_favorite(&mut self, movie_id: &MovieId) -> Result<User, ApiError> {
        let token = self.session.get_token();
        let user = self.session.get_user();
        let (Some(token), Some(user)) = (token, user) else {
            return Err(ApiError::MissingSession);
        };
        if user.name.is_empty() {
            return Err(ApiError::MissingSession);
        }
        let req = self.client.build_add_favorite(Some(&token), &user.name, movie_id);
        let updated = self.client.parse_add_favorite(self.send(req).await?)?;
        self.session.set_user(&updated)?;
        self.session.notifier().notify(FAVORITE_ADDED_NOTICE);
        Ok(updated)
    }

    pub async fn remove_favorite(&mut self, movie_id: &MovieId) -> Result<User, ApiError> {
        let (token, name) = self.current_user_name()?;
        let req = self.client.build_remove_favorite(token.as_deref(), &name, movie_id);
        let updated = self.client.parse_remove_favorite(self.send(req).await?)?;
        self.session.set_user(&updated)?;
        Ok(updated)
    }

    /// Edit the signed-in user's profile and store the server's version of
    /// the result.
    pub async fn edit_user(&mut self, input: &UserUpdate) -> Result<User, ApiError> {
        let (token, name) = self.current_user_name()?;
        let req = self.client.build_edit_user(token.as_deref(), &name, input)?;
        let updated = match self.send(req).await.and_then(|res| self.client.parse_edit_user(res)) {
            Ok(updated) => updated,
            Err(e) => {
                self.session.notifier().notify(PROFILE_UPDATE_FAILED_NOTICE);
                return Err(e);
            }
        };
        self.session.set_user(&updated)?;
        self.session.notifier().notify(PROFILE_UPDATED_NOTICE);
        info!(user = %updated.name, "profile updated");
        Ok(updated)
    }

    /// Delete the signed-in user's account and end the session.
    pub async fn delete_user(&mut self) -> Result<(), ApiError> {
        let (token, name) = self.current_user_name()?;
        let req = self.client.build_delete_user(token.as_deref(), &name);
        self.client.parse_delete_user(self.send(req).await?)?;
        self.session.clear_session()?;
        info!(user = %name, "account deleted");
        Ok(())
    }

    /// Token (possibly absent) and the current user's name, which is required
    /// to build the request path.
    fn current_user_name(&self) -> Result<(Option<String>, String), ApiError> {
        let token = self.session.get_token();
        match self.session.get_user() {
            Some(user) if !user.name.is_empty() => Ok((token, user.name)),
            _ => Err(ApiError::MissingSession),
        }
    }

    fn is_current_user(&self, name: &str) -> bool {
        self.session
            .store()
            .get(crate::session::USER_KEY)
            .and_then(|raw| serde_json::from_str::<User>(&raw).ok())
            .is_some_and(|user| user.name == name)
    }

    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport.execute(req).await.map_err(|e| {
            tracing::error!(error = %e, "request failed");
            ApiError::RequestFailed
        })
    }
}
