use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Genre {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Director {
    pub name: String,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Movie {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: Genre,
    pub director: Director,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Stored user. The password never leaves the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birthday: Option<String>,
    #[serde(default)]
    pub favorite_movies: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub email: String,
    pub birthday: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserUpdate {
    pub name: Option<String>,
    pub password: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

#[derive(Default)]
pub struct Store {
    movies: Vec<Movie>,
    users: HashMap<String, User>,
    /// token -> user name
    tokens: HashMap<String, String>,
}

pub type Db = Arc<RwLock<Store>>;

type Rejection = (StatusCode, String);

fn reject(status: StatusCode) -> Rejection {
    (status, status.canonical_reason().unwrap_or("error").to_string())
}

pub fn app() -> Router {
    app_with_catalog(seed_movies())
}

fn app_with_catalog(movies: Vec<Movie>) -> Router {
    let db: Db = Arc::new(RwLock::new(Store {
        movies,
        ..Store::default()
    }));
    Router::new()
        .route("/login", post(login))
        .route("/users", get(list_users).post(create_user))
        .route("/users/{name}", get(get_user).put(update_user).delete(delete_user))
        .route(
            "/users/{name}/FavoriteMovies/{movie_id}",
            put(add_favorite).delete(remove_favorite),
        )
        .route("/movies", get(list_movies))
        .route("/movies/{title}", get(get_movie))
        .route("/movies/Director/{name}", get(get_director))
        .route("/movies/Genre/{name}", get(get_genre))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Name of the user owning the bearer token, or 401.
fn authorize(store: &Store, headers: &HeaderMap) -> Result<String, Rejection> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|token| store.tokens.get(token))
        .cloned()
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED))
}

/// Like `authorize`, but the token must also belong to `name`.
fn authorize_owner(store: &Store, headers: &HeaderMap, name: &str) -> Result<(), Rejection> {
    if authorize(store, headers)? != name {
        return Err((StatusCode::FORBIDDEN, "Permission denied".to_string()));
    }
    Ok(())
}

async fn create_user(
    State(db): State<Db>,
    Json(input): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), Rejection> {
    let mut store = db.write().await;
    if store.users.contains_key(&input.name) {
        return Err((StatusCode::BAD_REQUEST, format!("{} already exists", input.name)));
    }
    let user = User {
        id: Uuid::new_v4().simple().to_string(),
        name: input.name,
        password: input.password,
        email: input.email,
        birthday: input.birthday,
        favorite_movies: Vec::new(),
    };
    store.users.insert(user.name.clone(), user.clone());
    info!(user = %user.name, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<LoginResponse>, Rejection> {
    let mut store = db.write().await;
    let user = match store.users.get(&input.name) {
        Some(user) if user.password == input.password => user.clone(),
        _ => return Err((StatusCode::BAD_REQUEST, "Incorrect username or password".to_string())),
    };
    let token = Uuid::new_v4().simple().to_string();
    store.tokens.insert(token.clone(), user.name.clone());
    info!(user = %user.name, "login");
    Ok(Json(LoginResponse { user, token }))
}

async fn list_movies(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<Movie>>, Rejection> {
    let store = db.read().await;
    authorize(&store, &headers)?;
    Ok(Json(store.movies.clone()))
}

async fn get_movie(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(title): Path<String>,
) -> Result<Json<Movie>, Rejection> {
    let store = db.read().await;
    authorize(&store, &headers)?;
    store
        .movies
        .iter()
        .find(|m| m.title == title)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))
}

async fn get_director(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<Director>, Rejection> {
    let store = db.read().await;
    authorize(&store, &headers)?;
    store
        .movies
        .iter()
        .find(|m| m.director.name == name)
        .map(|m| Json(m.director.clone()))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))
}

async fn get_genre(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<Genre>, Rejection> {
    let store = db.read().await;
    authorize(&store, &headers)?;
    store
        .movies
        .iter()
        .find(|m| m.genre.name == name)
        .map(|m| Json(m.genre.clone()))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))
}

async fn list_users(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Vec<User>>, Rejection> {
    let store = db.read().await;
    authorize(&store, &headers)?;
    let mut users: Vec<User> = store.users.values().cloned().collect();
    users.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(users))
}

async fn get_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<Json<User>, Rejection> {
    let store = db.read().await;
    authorize(&store, &headers)?;
    store
        .users
        .get(&name)
        .cloned()
        .map(Json)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))
}

async fn update_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(name): Path<String>,
    Json(input): Json<UserUpdate>,
) -> Result<Json<User>, Rejection> {
    let mut store = db.write().await;
    authorize_owner(&store, &headers, &name)?;
    let mut user = store
        .users
        .get(&name)
        .cloned()
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))?;

    if let Some(new_name) = input.name.filter(|n| *n != name) {
        if store.users.contains_key(&new_name) {
            return Err((StatusCode::BAD_REQUEST, format!("{new_name} already exists")));
        }
        user.name = new_name;
    }
    if let Some(password) = input.password {
        user.password = password;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(birthday) = input.birthday {
        user.birthday = Some(birthday);
    }

    if user.name != name {
        store.users.remove(&name);
        for owner in store.tokens.values_mut().filter(|owner| **owner == name) {
            *owner = user.name.clone();
        }
    }
    store.users.insert(user.name.clone(), user.clone());
    Ok(Json(user))
}

async fn delete_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(name): Path<String>,
) -> Result<(StatusCode, String), Rejection> {
    let mut store = db.write().await;
    authorize_owner(&store, &headers, &name)?;
    store
        .users
        .remove(&name)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))?;
    store.tokens.retain(|_, owner| *owner != name);
    info!(user = %name, "user deleted");
    Ok((StatusCode::OK, format!("{name} was deleted.")))
}

async fn add_favorite(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((name, movie_id)): Path<(String, String)>,
) -> Result<Json<User>, Rejection> {
    let mut store = db.write().await;
    authorize_owner(&store, &headers, &name)?;
    if !store.movies.iter().any(|m| m.id == movie_id) {
        return Err(reject(StatusCode::NOT_FOUND));
    }
    let user = store
        .users
        .get_mut(&name)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))?;
    if !user.favorite_movies.contains(&movie_id) {
        user.favorite_movies.push(movie_id);
    }
    Ok(Json(user.clone()))
}

async fn remove_favorite(
    State(db): State<Db>,
    headers: HeaderMap,
    Path((name, movie_id)): Path<(String, String)>,
) -> Result<Json<User>, Rejection> {
    let mut store = db.write().await;
    authorize_owner(&store, &headers, &name)?;
    let user = store
        .users
        .get_mut(&name)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND))?;
    user.favorite_movies.retain(|id| *id != movie_id);
    Ok(Json(user.clone()))
}

fn movie(id: &str, title: &str, description: &str, genre: (&str, &str), director: Director) -> Movie {
    Movie {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        genre: Genre {
            name: genre.0.to_string(),
            description: genre.1.to_string(),
        },
        director,
        image_path: None,
    }
}

fn director(name: &str, bio: &str, birth: &str, death: Option<&str>) -> Director {
    Director {
        name: name.to_string(),
        bio: bio.to_string(),
        birth: Some(birth.to_string()),
        death: death.map(str::to_string),
    }
}

pub fn seed_movies() -> Vec<Movie> {
    let horror = ("Horror", "Films meant to frighten and unsettle.");
    let scifi = ("Science Fiction", "Speculative stories about science and technology.");
    let thriller = ("Thriller", "Suspense-driven stories of danger and pursuit.");
    let scott = director("Ridley Scott", "English director known for atmospheric genre films.", "1937", None);
    vec![
        movie(
            "5c3bd189515a081b363cb7e3",
            "Alien",
            "The crew of a commercial spacecraft encounters a deadly lifeform.",
            horror,
            scott.clone(),
        ),
        movie(
            "5c3bd189515a081b363cb7e4",
            "Blade Runner",
            "A blade runner must pursue and terminate four replicants.",
            scifi,
            scott,
        ),
        movie(
            "5c3bd189515a081b363cb7e5",
            "The Matrix",
            "A hacker learns the true nature of his reality.",
            scifi,
            director("Lana Wachowski", "American film director and screenwriter.", "1965", None),
        ),
        movie(
            "5c3bd189515a081b363cb7e6",
            "Jaws",
            "A police chief hunts a great white shark terrorizing a beach town.",
            thriller,
            director("Steven Spielberg", "American director and producer.", "1946", None),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_serialization_hides_password() {
        let user = User {
            id: "u1".to_string(),
            name: "alice".to_string(),
            password: "secret".to_string(),
            email: "a@b.com".to_string(),
            birthday: None,
            favorite_movies: vec!["m1".to_string()],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["_id"], "u1");
        assert_eq!(json["Name"], "alice");
        assert_eq!(json["FavoriteMovies"][0], "m1");
        assert!(json.get("Password").is_none());
        assert!(json.get("Birthday").is_none());
    }

    #[test]
    fn new_user_rejects_missing_password() {
        let result: Result<NewUser, _> = serde_json::from_str(r#"{"Name":"alice","Email":"a@b.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn user_update_all_fields_optional() {
        let input: UserUpdate = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.name.is_none());
        assert!(input.email.is_none());
    }

    #[test]
    fn seed_catalog_has_unique_ids() {
        let movies = seed_movies();
        let mut ids: Vec<&str> = movies.iter().map(|m| m.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), movies.len());
    }

    #[test]
    fn authorize_requires_known_bearer() {
        let mut store = Store::default();
        store.tokens.insert("T".to_string(), "alice".to_string());

        let mut headers = HeaderMap::new();
        assert_eq!(authorize(&store, &headers).unwrap_err().0, StatusCode::UNAUTHORIZED);

        headers.insert(AUTHORIZATION, "Bearer nope".parse().unwrap());
        assert_eq!(authorize(&store, &headers).unwrap_err().0, StatusCode::UNAUTHORIZED);

        headers.insert(AUTHORIZATION, "Bearer T".parse().unwrap());
        assert_eq!(authorize(&store, &headers).unwrap(), "alice");
        assert_eq!(
            authorize_owner(&store, &headers, "bob").unwrap_err().0,
            StatusCode::FORBIDDEN
        );
    }
}
