mod common;

use common::{login_script, scripted_client, status_json, CannedResponse, ScriptedClient};
use std::sync::Arc;
use wfmu_client::{WfmuClientImpl, WfmuSession};

fn create_test_session() -> WfmuSession {
    WfmuSession::new(
        "test_user".to_string(),
        vec!["PHPSESSID=test_session".to_string()],
        Some("test_key".to_string()),
    )
}

/// Futures from client operations must be Send so hosts can spawn them.
#[test_log::test(tokio::test)]
async fn test_client_futures_are_send() {
    fn assert_send<T: Send>(_: T) {}

    let client = WfmuClientImpl::from_session(Box::new(ScriptedClient::default()), create_test_session());

    assert_send(client.poll_status());
    assert_send(client.get_playlist("1"));
    assert_send(client.get_favorites());
    assert_send(client.get_comments());
    assert_send(client.login("user", "pw"));
    assert_send(client.post_comment("hi", Some("1")));
    assert_send(client.favorite(Some("1"), Some("2")));
}

#[test_log::test(tokio::test)]
async fn test_client_can_be_shared_across_tasks() {
    let mut script = login_script("XYZ");
    script.push(CannedResponse::ok(status_json("12345", "88412")));
    let (client, http) = scripted_client(script);
    let client = Arc::new(client);

    let login_client = Arc::clone(&client);
    tokio::spawn(async move { login_client.login("listener", "pw").await })
        .await
        .unwrap()
        .unwrap();

    let poll_client = Arc::clone(&client);
    let now = tokio::spawn(async move { poll_client.poll_status().await })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(now.song.song_id, "88412");
    assert!(client.is_logged_in().await);
    assert_eq!(http.requests().len(), 3);
}

/// Two concurrent mutations on one client must not interleave: each relay
/// holds the session for all of its requests.
#[test_log::test(tokio::test(flavor = "multi_thread", worker_threads = 2))]
async fn test_concurrent_favorites_are_serialized() {
    let mut script = login_script("XYZ");
    script.push(CannedResponse::ok(""));
    script.push(CannedResponse::ok(""));
    let (client, http) = scripted_client(script);
    client.login("listener", "pw").await.unwrap();
    let client = Arc::new(client);

    let first = Arc::clone(&client);
    let second = Arc::clone(&client);
    let (a, b) = tokio::join!(
        tokio::spawn(async move { first.favorite(Some("1"), Some("10")).await }),
        tokio::spawn(async move { second.unfavorite(Some("2"), Some("20")).await }),
    );
    a.unwrap().unwrap();
    b.unwrap().unwrap();

    let requests = http.requests();
    assert_eq!(requests.len(), 4);
    let mut ids: Vec<String> = requests[2..]
        .iter()
        .map(|request| request.form_map()["id"].clone())
        .collect();
    ids.sort();
    assert_eq!(ids, vec!["1", "2"]);
}
