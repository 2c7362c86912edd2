//! Domain DTOs for the myFlix API.
//!
//! # Design
//! The wire format uses PascalCase field names and MongoDB-style `_id` keys.
//! `Name` is the canonical user key everywhere, including URL paths. These
//! types mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque movie identifier, as issued by the server.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub String);

impl MovieId {
    pub fn new(id: impl Into<String>) -> Self {
        MovieId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MovieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MovieId {
    fn from(id: &str) -> Self {
        MovieId(id.to_string())
    }
}

/// A registered user as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// The server echoes a password hash; the client never inspects it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default)]
    pub email: String,
    #[serde(default, with = "birthday", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub favorite_movies: Vec<MovieId>,
}

impl User {
    pub fn has_favorite(&self, movie_id: &MovieId) -> bool {
        self.favorite_movies.contains(movie_id)
    }

    /// Birthday in long form, e.g. "April 1, 1996".
    pub fn formatted_birthday(&self) -> Option<String> {
        self.birthday.map(|date| date.format("%B %-d, %Y").to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Genre {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Director {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub death: Option<String>,
}

/// A catalog entry. Read-only from the client's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Movie {
    #[serde(rename = "_id", alias = "Id")]
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub genre: Genre,
    pub director: Director,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
}

/// Registration payload for `POST /users`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewUser {
    pub name: String,
    pub password: String,
    pub email: String,
    #[serde(default, with = "birthday", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

/// Login payload for `POST /login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

/// Successful login: the authenticated user and a bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
}

/// Profile edit payload for `PUT /users/{name}`. Only the fields present are
/// sent; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, with = "birthday", skip_serializing_if = "Option::is_none")]
    pub birthday: Option<NaiveDate>,
}

/// Birthdays are written as `YYYY-MM-DD`. Reads also accept full RFC 3339
/// timestamps, keeping only the date part.
mod birthday {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(raw) => {
                let date = raw
                    .get(..10)
                    .ok_or_else(|| de::Error::custom(format!("invalid birthday: {raw}")))?;
                NaiveDate::parse_from_str(date, FORMAT)
                    .map(Some)
                    .map_err(|e| de::Error::custom(format!("invalid birthday {raw}: {e}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_uses_pascal_case_keys() {
        let user = User {
            id: None,
            name: "alice".to_string(),
            password: None,
            email: "a@b.com".to_string(),
            birthday: NaiveDate::from_ymd_opt(1996, 4, 1),
            favorite_movies: vec![MovieId::new("m1")],
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["Name"], "alice");
        assert_eq!(json["Email"], "a@b.com");
        assert_eq!(json["Birthday"], "1996-04-01");
        assert_eq!(json["FavoriteMovies"][0], "m1");
        assert!(json.get("_id").is_none());
        assert!(json.get("Password").is_none());
    }

    #[test]
    fn user_accepts_server_timestamp_birthday() {
        let user: User = serde_json::from_str(
            r#"{"_id":"u1","Name":"alice","Password":"$2b$10$hash","Email":"a@b.com",
                "Birthday":"1996-04-01T00:00:00.000Z","FavoriteMovies":[]}"#,
        )
        .unwrap();
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.birthday, NaiveDate::from_ymd_opt(1996, 4, 1));
        assert_eq!(user.formatted_birthday().as_deref(), Some("April 1, 1996"));
    }

    #[test]
    fn user_tolerates_missing_optional_fields() {
        let user: User = serde_json::from_str(r#"{"Name":"bob"}"#).unwrap();
        assert_eq!(user.name, "bob");
        assert!(user.email.is_empty());
        assert!(user.birthday.is_none());
        assert!(user.favorite_movies.is_empty());
        assert!(user.formatted_birthday().is_none());
    }

    #[test]
    fn user_rejects_malformed_birthday() {
        let result: Result<User, _> = serde_json::from_str(r#"{"Name":"bob","Birthday":"soon"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn user_requires_name() {
        let result: Result<User, _> = serde_json::from_str(r#"{"Email":"a@b.com"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn movie_reads_mongo_id_or_plain_id() {
        let mongo: Movie = serde_json::from_str(
            r#"{"_id":"m1","Title":"Alien","Description":"In space.",
                "Genre":{"Name":"Horror","Description":"Scary."},
                "Director":{"Name":"Ridley Scott","Bio":"British.","Birth":"1937"}}"#,
        )
        .unwrap();
        assert_eq!(mongo.id, MovieId::new("m1"));
        assert_eq!(mongo.director.birth.as_deref(), Some("1937"));
        assert!(mongo.director.death.is_none());

        let plain: Movie = serde_json::from_str(
            r#"{"Id":"m1","Title":"Alien","Description":"In space.",
                "Genre":{"Name":"Horror","Description":"Scary."},
                "Director":{"Name":"Ridley Scott","Bio":"British."}}"#,
        )
        .unwrap();
        assert_eq!(plain.id, mongo.id);
        assert_eq!(plain.genre, mongo.genre);
    }

    #[test]
    fn user_update_skips_absent_fields() {
        let update = UserUpdate {
            name: Some("alice".to_string()),
            email: Some("a@b.com".to_string()),
            ..UserUpdate::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"Name": "alice", "Email": "a@b.com"}));
    }

    #[test]
    fn login_response_uses_lowercase_envelope() {
        let login: LoginResponse =
            serde_json::from_str(r#"{"user":{"Name":"alice","Email":"a@b.com"},"token":"T"}"#).unwrap();
        assert_eq!(login.token, "T");
        assert_eq!(login.user.name, "alice");
    }

    #[test]
    fn has_favorite_checks_membership() {
        let user: User = serde_json::from_str(r#"{"Name":"alice","FavoriteMovies":["m1","m2"]}"#).unwrap();
        assert!(user.has_favorite(&MovieId::new("m2")));
        assert!(!user.has_favorite(&MovieId::new("m3")));
    }
}
