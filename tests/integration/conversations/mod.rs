//! Conversation endpoints over the full router and in-memory store

use axum::http::{header, Method, StatusCode};
use convos_common::headers;
use serde_json::json;

use crate::common::{request, TestApp};

#[test_log::test(tokio::test)]
async fn test_create_then_get_convo() {
    let app = TestApp::new();

    let created = app
        .send(request(
            Method::POST,
            "/api/Convo",
            Some(3),
            Some(json!({"Participant": 7, "Subject": "Hi"})),
        ))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.result_code(), Some("5"));
    let id = created.location_id();
    assert!(id > 0);
    assert_eq!(
        created.header(headers::LOCATION),
        Some(format!("/api/Convo/{}", id).as_str())
    );

    let fetched = app.get(&format!("/api/Convo/{}", id), 3).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.result_code(), Some("0"));
    assert_eq!(
        fetched.header(header::CACHE_CONTROL),
        Some("private, must-revalidate, max-age=3600")
    );
    let body = fetched.json();
    assert_eq!(body["Id"], id);
    assert_eq!(body["Subject"], "Hi");
    assert_eq!(body["Creator"], 3);
    assert_eq!(body["Participant"], 7);
    assert_eq!(body["NumMessages"], 0);
}

#[test_log::test(tokio::test)]
async fn test_repeated_get_served_from_cache() {
    let app = TestApp::new();
    let id = app.create_convo(3, 7, "Hi").await;
    let uri = format!("/api/Convo/{}", id);

    let first = app.get(&uri, 3).await;
    let calls = app.store.calls();
    let second = app.get(&uri, 3).await;

    assert_eq!(first.status, second.status);
    assert_eq!(first.headers, second.headers);
    assert_eq!(first.body, second.body);
    assert_eq!(app.store.calls(), calls);

    // A different caller is a different cache entry
    app.get(&uri, 7).await;
    assert_eq!(app.store.calls(), calls + 1);
}

#[test_log::test(tokio::test)]
async fn test_participant_can_read_outsider_cannot() {
    let app = TestApp::new();
    let id = app.create_convo(3, 7, "Hi").await;

    let participant = app.get(&format!("/api/Convo/{}", id), 7).await;
    assert_eq!(participant.status, StatusCode::OK);

    let outsider = app.get(&format!("/api/Convo/{}", id), 8).await;
    assert_eq!(outsider.status, StatusCode::NOT_FOUND);
    assert_eq!(outsider.result_code(), Some("2"));
    assert!(outsider.body.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_missing_caller_is_unauthorized() {
    let app = TestApp::new();

    let response = app
        .send(request(Method::GET, "/api/Convo", None, None))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.result_code(), Some("4"));
    assert_eq!(response.message(), Some("Could not parse a valid user id"));

    let response = app
        .send(request(
            Method::POST,
            "/api/Convo",
            None,
            Some(json!({"Participant": 7, "Subject": "Hi"})),
        ))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.calls(), 0);
}

#[test_log::test(tokio::test)]
async fn test_malformed_bodies_rejected() {
    let app = TestApp::new();

    for body in [
        json!({"Participant": 7, "Subject": "Hi", "Creator": 3}),
        json!({"Participant": 7}),
        json!({"Participant": "seven", "Subject": "Hi"}),
    ] {
        let response = app
            .send(request(Method::POST, "/api/Convo", Some(3), Some(body)))
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.result_code(), Some("1"));
    }
    assert_eq!(app.store.calls(), 0);
}

#[test_log::test(tokio::test)]
async fn test_invalid_participant_and_subject() {
    let app = TestApp::new();

    let response = app
        .send(request(
            Method::POST,
            "/api/Convo",
            Some(3),
            Some(json!({"Participant": 0, "Subject": "Hi"})),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.message(), Some("Invalid Id value for Participant"));

    let response = app
        .send(request(
            Method::POST,
            "/api/Convo",
            Some(3),
            Some(json!({"Participant": 7, "Subject": "s".repeat(141)})),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(app.store.calls(), 0);

    let response = app
        .send(request(
            Method::POST,
            "/api/Convo",
            Some(3),
            Some(json!({"Participant": 7, "Subject": "s".repeat(140)})),
        ))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
}

#[test_log::test(tokio::test)]
async fn test_list_convos_paging() {
    let app = TestApp::new();
    for subject in ["one", "two", "three"] {
        app.create_convo(3, 7, subject).await;
    }
    app.create_convo(8, 9, "elsewhere").await;

    let first = app.get("/api/Convo?count=2", 3).await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.header(headers::TOTAL_COUNT), Some("3"));
    assert_eq!(first.header(headers::RELATIVE_COUNT), Some("2"));
    assert_eq!(
        first.header(header::CACHE_CONTROL),
        Some("private, must-revalidate, max-age=15")
    );
    assert!(first.header(headers::LAST_MODIFIED).is_some());
    let subjects: Vec<_> = first
        .json()
        .as_array()
        .unwrap()
        .iter()
        .map(|convo| convo["Subject"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(subjects, ["three", "two"]);

    // No convo has messages yet, so the cursor stays at the ceiling
    let next = first.header(headers::NEXT_PAGE).unwrap().to_string();
    assert_eq!(
        next,
        "/api/Convo?index=1&count=2&before=9999-12-31T23%3A59%3A59"
    );

    let second = app.get(&next, 3).await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.header(headers::RELATIVE_COUNT), Some("1"));
    assert!(second.header(headers::NEXT_PAGE).is_none());
    assert_eq!(second.json()[0]["Subject"], "one");
}

#[test_log::test(tokio::test)]
async fn test_list_convos_errors() {
    let app = TestApp::new();

    let empty = app.get("/api/Convo", 3).await;
    assert_eq!(empty.status, StatusCode::NOT_FOUND);
    assert_eq!(empty.result_code(), Some("3"));
    assert!(empty.header(headers::TOTAL_COUNT).is_none());
    assert!(empty.body.is_empty());

    let too_many = app.get("/api/Convo?count=51", 3).await;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);
    assert_eq!(too_many.message(), Some("Maximum page size is 50"));

    let bad_date = app.get("/api/Convo?before=yesterday", 3).await;
    assert_eq!(bad_date.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        bad_date.message(),
        Some("Could not read a valid date for the 'before' querystring parameter")
    );
}

#[test_log::test(tokio::test)]
async fn test_patch_convo_refreshes_cached_reads() {
    let app = TestApp::new();
    let id = app.create_convo(3, 7, "Hi").await;
    let uri = format!("/api/Convo/{}", id);
    assert_eq!(app.get(&uri, 3).await.json()["Subject"], "Hi");

    let patched = app
        .send(request(
            Method::PATCH,
            &uri,
            Some(3),
            Some(json!({"Subject": "Renamed"})),
        ))
        .await;
    assert_eq!(patched.status, StatusCode::OK);

    assert_eq!(app.get(&uri, 3).await.json()["Subject"], "Renamed");
}

#[test_log::test(tokio::test)]
async fn test_delete_convo() {
    let app = TestApp::new();
    let id = app.create_convo(3, 7, "Hi").await;
    let uri = format!("/api/Convo/{}", id);
    assert_eq!(app.get(&uri, 3).await.status, StatusCode::OK);

    let outsider = app
        .send(request(Method::DELETE, &uri, Some(8), None))
        .await;
    assert_eq!(outsider.status, StatusCode::NOT_FOUND);

    let deleted = app
        .send(request(Method::DELETE, &uri, Some(7), None))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert_eq!(deleted.result_code(), Some("6"));

    let gone = app.get(&uri, 3).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_non_numeric_path_id_carries_result_headers() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;

    for uri in [
        "/api/Convo/abc".to_string(),
        "/api/Convo/99999999999999999999".to_string(),
        format!("/api/Convo/{}/Message/abc", convo),
    ] {
        let response = app.get(&uri, 3).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(response.result_code(), Some("1"));
        assert!(response.message().is_some());
    }
}
