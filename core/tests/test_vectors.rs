//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, expected requests, simulated responses,
//! and expected parse results or errors. Bodies are compared as parsed JSON
//! so field ordering does not matter.

use myflix_core::{
    ApiError, Credentials, HttpMethod, HttpRequest, HttpResponse, LoginResponse, Movie, MovieClient, MovieId, User,
    UserUpdate,
};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> MovieClient {
    MovieClient::new(BASE_URL)
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn load(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn str_field<'a>(case: &'a Value, key: &str) -> &'a str {
    case[key].as_str().unwrap_or_else(|| panic!("missing string field {key}"))
}

/// Compare method, path, headers and (optional) JSON body.
fn assert_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(str_field(expected, "method")), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", str_field(expected, "path")), "{name}: path");

    let expected_headers: Vec<(String, String)> = expected["headers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|h| {
            let pair = h.as_array().unwrap();
            (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
        })
        .collect();
    assert_eq!(req.headers, expected_headers, "{name}: headers");

    match expected.get("body") {
        Some(body) => {
            let actual: Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            assert_eq!(&actual, body, "{name}: body");
        }
        None => assert!(req.body.is_none(), "{name}: body should be None"),
    }
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

/// Check a parse result against `expected_result` or `expected_error`.
fn assert_outcome<T>(name: &str, case: &Value, result: Result<T, ApiError>)
where
    T: serde::de::DeserializeOwned + PartialEq + std::fmt::Debug,
{
    if let Some(expected_error) = case.get("expected_error") {
        let err = result.unwrap_err();
        match expected_error.as_str().unwrap() {
            "RequestFailed" => assert_eq!(err, ApiError::RequestFailed, "{name}: expected RequestFailed"),
            other => panic!("{name}: unknown expected_error: {other}"),
        }
    } else {
        let expected: T = serde_json::from_value(case["expected_result"].clone()).unwrap();
        assert_eq!(result.unwrap(), expected, "{name}: parsed result");
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn login_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/login.json")) {
        let name = str_field(&case, "name");
        let input: Credentials = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c.build_login(&input).unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_login(simulated_response(&case));
        assert_outcome::<LoginResponse>(name, &case, result);
    }
}

// ---------------------------------------------------------------------------
// List movies
// ---------------------------------------------------------------------------

#[test]
fn list_movies_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/list_movies.json")) {
        let name = str_field(&case, "name");

        let req = c.build_list_movies(Some(str_field(&case, "token")));
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_list_movies(simulated_response(&case));
        assert_outcome::<Vec<Movie>>(name, &case, result);
    }
}

// ---------------------------------------------------------------------------
// Add favorite
// ---------------------------------------------------------------------------

#[test]
fn add_favorite_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/add_favorite.json")) {
        let name = str_field(&case, "name");
        let movie_id = MovieId::new(str_field(&case, "movie_id"));

        let req = c.build_add_favorite(Some(str_field(&case, "token")), str_field(&case, "user_name"), &movie_id);
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_add_favorite(simulated_response(&case));
        assert_outcome::<User>(name, &case, result);
    }
}

// ---------------------------------------------------------------------------
// Edit user
// ---------------------------------------------------------------------------

#[test]
fn edit_user_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/edit_user.json")) {
        let name = str_field(&case, "name");
        let input: UserUpdate = serde_json::from_value(case["input"].clone()).unwrap();

        let req = c
            .build_edit_user(Some(str_field(&case, "token")), str_field(&case, "user_name"), &input)
            .unwrap();
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_edit_user(simulated_response(&case));
        assert_outcome::<User>(name, &case, result);
    }
}

// ---------------------------------------------------------------------------
// Delete user
// ---------------------------------------------------------------------------

#[test]
fn delete_user_test_vectors() {
    let c = client();
    for case in load(include_str!("../../test-vectors/delete_user.json")) {
        let name = str_field(&case, "name");

        let req = c.build_delete_user(Some(str_field(&case, "token")), str_field(&case, "user_name"));
        assert_request(name, &req, &case["expected_request"]);

        let result = c.parse_delete_user(simulated_response(&case));
        if case.get("expected_error").is_some() {
            assert_eq!(result.unwrap_err(), ApiError::RequestFailed, "{name}: expected RequestFailed");
        } else {
            assert!(result.is_ok(), "{name}: expected success");
        }
    }
}
