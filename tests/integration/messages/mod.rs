//! Message endpoints, including reply threads

use axum::http::{Method, StatusCode};
use convos_common::headers;
use serde_json::json;

use crate::common::{request, TestApp};

#[test_log::test(tokio::test)]
async fn test_post_and_get_message() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;

    let created = app
        .send(request(
            Method::POST,
            &format!("/api/Convo/{}/Message", convo),
            Some(3),
            Some(json!({"Body": "hello", "Recipient": 7})),
        ))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.location_id();
    assert_eq!(
        created.header(headers::LOCATION),
        Some(format!("/api/Convo/{}/Message/{}", convo, id).as_str())
    );

    let fetched = app
        .get(&format!("/api/Convo/{}/Message/{}", convo, id), 7)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    let body = fetched.json();
    assert_eq!(body["Body"], "hello");
    assert_eq!(body["Sender"], 3);
    assert_eq!(body["Recipient"], 7);
    assert_eq!(body["IsRead"], false);
    assert!(body.get("Thread").is_none());
}

#[test_log::test(tokio::test)]
async fn test_reply_thread_is_one_hop() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;
    let a = app.create_message(3, convo, 7, "A", None).await;
    let b = app.create_message(7, convo, 3, "B", Some(a)).await;
    let c = app.create_message(3, convo, 7, "C", Some(b)).await;

    let fetched = app
        .get(&format!("/api/Convo/{}/Message/{}", convo, c), 3)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    let body = fetched.json();
    assert_eq!(body["Id"], c);
    assert_eq!(body["Parent"], b);

    let thread = body["Thread"].as_array().unwrap();
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0]["Id"], b);
    assert_eq!(thread[0]["Body"], "B");
    assert!(thread[0].get("Thread").is_none());
}

#[test_log::test(tokio::test)]
async fn test_reply_to_missing_parent() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;

    let response = app
        .send(request(
            Method::POST,
            &format!("/api/Convo/{}/Message/999", convo),
            Some(3),
            Some(json!({"Body": "orphan", "Recipient": 7})),
        ))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.message(), Some("Parent message not found"));
}

#[test_log::test(tokio::test)]
async fn test_recipient_must_be_in_convo() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;

    let response = app
        .send(request(
            Method::POST,
            &format!("/api/Convo/{}/Message", convo),
            Some(3),
            Some(json!({"Body": "hello", "Recipient": 8})),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.result_code(), Some("1"));
    assert_eq!(
        response.message(),
        Some("The recipient is not part of the convo")
    );
}

#[test_log::test(tokio::test)]
async fn test_list_messages() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;
    let first = app.create_message(3, convo, 7, "first", None).await;
    app.create_message(7, convo, 3, "second", Some(first)).await;
    app.create_message(3, convo, 7, "third", None).await;

    let page = app
        .get(&format!("/api/Convo/{}/Message?count=2", convo), 7)
        .await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.header(headers::TOTAL_COUNT), Some("3"));
    assert_eq!(page.header(headers::RELATIVE_COUNT), Some("2"));
    let next = page.header(headers::NEXT_PAGE).unwrap();
    assert!(next.starts_with(&format!(
        "/api/Convo/{}/Message?index=1&count=2&before=",
        convo
    )));

    let items = page.json();
    let bodies: Vec<_> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|message| message["Body"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(bodies, ["third", "second"]);
    assert!(items[1].get("Thread").is_none());

    let outsider = app
        .get(&format!("/api/Convo/{}/Message", convo), 8)
        .await;
    assert_eq!(outsider.status, StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn test_mark_read_refreshes_cached_message() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;
    let id = app.create_message(3, convo, 7, "hello", None).await;
    let uri = format!("/api/Convo/{}/Message/{}", convo, id);
    assert_eq!(app.get(&uri, 7).await.json()["IsRead"], false);

    let patched = app
        .send(request(
            Method::PATCH,
            &uri,
            Some(7),
            Some(json!({"IsRead": true})),
        ))
        .await;
    assert_eq!(patched.status, StatusCode::OK);

    let body = app.get(&uri, 7).await.json();
    assert_eq!(body["IsRead"], true);
    assert_eq!(body["Body"], "hello");
}

#[test_log::test(tokio::test)]
async fn test_empty_patch_rejected() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;
    let id = app.create_message(3, convo, 7, "hello", None).await;
    let calls = app.store.calls();

    let response = app
        .send(request(
            Method::PATCH,
            &format!("/api/Convo/{}/Message/{}", convo, id),
            Some(3),
            Some(json!({})),
        ))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.result_code(), Some("1"));
    assert_eq!(app.store.calls(), calls);
}

#[test_log::test(tokio::test)]
async fn test_delete_message() {
    let app = TestApp::new();
    let convo = app.create_convo(3, 7, "Hi").await;
    let id = app.create_message(3, convo, 7, "hello", None).await;
    let uri = format!("/api/Convo/{}/Message/{}", convo, id);

    let deleted = app
        .send(request(Method::DELETE, &uri, Some(3), None))
        .await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.body.is_empty());

    assert_eq!(app.get(&uri, 3).await.status, StatusCode::NOT_FOUND);
    let convo_body = app.get(&format!("/api/Convo/{}", convo), 3).await.json();
    assert_eq!(convo_body["NumMessages"], 0);
}
