use richacks_sdk::{
    resources, EventManager, HttpClientConfig, KvStore, LocalKey, Post, RemoteConfig, RemoteError,
    RemoteGateway, RemoteMethod, RestGateway, RichacksConfig, RichacksSDK,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn gateway_for(server: &MockServer, key: Option<&str>) -> RestGateway {
    RestGateway::new(
        &RemoteConfig::new(server.uri(), key.map(|k| k.to_string())),
        &HttpClientConfig::default(),
    )
    .unwrap()
}

fn sample_post(id: &str) -> Post {
    Post {
        id: id.to_string(),
        title: "Mod pack".to_string(),
        video_url: None,
        description: String::new(),
        download_url: Some("https://mega.nz/file".to_string()),
        category: "1".to_string(),
        main_image: None,
        mini_image: None,
        date: "2024-01-17".to_string(),
        created_at: None,
    }
}

// ── RestGateway ─────────────────────────────────────────────────

#[tokio::test]
async fn get_sends_credential_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .and(query_param("select", "*"))
        .and(query_param("order", "created_at.desc"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "p1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some("anon-key"));
    let value = gateway
        .request(&resources::list_posts(), RemoteMethod::Get, None)
        .await
        .unwrap();
    assert_eq!(value, json!([{"id": "p1"}]));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("prefer").is_none());
}

#[tokio::test]
async fn post_requests_representation() {
    let server = MockServer::start().await;
    let body = json!({"id": "c1", "name": "PC", "slug": "pc"});
    Mock::given(method("POST"))
        .and(path("/rest/v1/categories"))
        .and(header("prefer", "return=representation"))
        .and(body_json(body.clone()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([body.clone()])))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some("anon-key"));
    let value = gateway
        .request(
            &resources::insert(resources::CATEGORIES),
            RemoteMethod::Post,
            Some(&body),
        )
        .await
        .unwrap();
    assert_eq!(value, json!([body]));
}

#[tokio::test]
async fn delete_with_empty_body_is_null() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/community_messages"))
        .and(query_param("id", "eq.m1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some("anon-key"));
    let value = gateway
        .request(
            &resources::delete_by_id(resources::COMMUNITY_MESSAGES, "m1"),
            RemoteMethod::Delete,
            None,
        )
        .await
        .unwrap();
    assert_eq!(value, Value::Null);
}

#[tokio::test]
async fn non_success_status_is_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/categories"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some("bad-key"));
    let err = gateway
        .request(&resources::list_categories(), RemoteMethod::Get, None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        RemoteError::Status {
            status: 401,
            body: "invalid api key".to_string()
        }
    );
    assert_eq!(err.kind(), "status");
}

#[tokio::test]
async fn malformed_json_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[{not json"))
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, Some("anon-key"));
    let err = gateway
        .request(&resources::list_posts(), RemoteMethod::Get, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "decode");
}

#[tokio::test]
async fn missing_credential_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let gateway = gateway_for(&server, None);
    let err = gateway
        .request(&resources::list_posts(), RemoteMethod::Get, None)
        .await
        .unwrap_err();
    assert!(err.is_credential_missing());
}

#[tokio::test]
async fn unreachable_host_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let gateway = RestGateway::new(
        &RemoteConfig::new(uri, Some("anon-key".to_string())),
        &HttpClientConfig::default(),
    )
    .unwrap();
    let err = gateway
        .request(&resources::list_posts(), RemoteMethod::Get, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
}

// ── Facade over HTTP ────────────────────────────────────────────

async fn sdk_for(server: &MockServer, dir: &TempDir) -> RichacksSDK {
    let config = RichacksConfig::builder()
        .data_dir(dir.path())
        .remote(server.uri(), Some("anon-key".to_string()))
        .build();
    let kv = KvStore::open(&config.storage, Arc::new(EventManager::default()))
        .await
        .unwrap();
    let gateway = Arc::new(gateway_for(server, Some("anon-key")));
    RichacksSDK::from_parts(gateway, Arc::new(kv), config)
}

#[tokio::test]
async fn server_error_falls_back_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sdk = sdk_for(&server, &dir).await;

    sdk.save_post(sample_post("p1")).await;

    let posts = sdk.list_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "p1");
    assert!(posts[0].created_at.is_some());
}

#[tokio::test]
async fn remote_success_skips_local_write() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/posts"))
        .and(body_json(json!({
            "id": "p2",
            "title": "Mod pack",
            "description": "",
            "downloadUrl": "https://mega.nz/file",
            "category": "1",
            "date": "2024-01-17"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{"id": "p2"}])))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sdk = sdk_for(&server, &dir).await;

    sdk.save_post(sample_post("p2")).await;

    assert_eq!(sdk.kv().get_raw(LocalKey::Posts), None);
    assert_eq!(sdk.events().get_stats().await.total_events, 0);
}

#[tokio::test]
async fn remote_messages_map_to_local_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/community_messages"))
        .and(query_param("order", "created_at.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "m1",
            "user_name": "leo",
            "type": "ERROR",
            "message": "el link no funciona",
            "audio_url": null,
            "image_url": "https://cdn/img.png",
            "created_at": "2024-01-17T14:30:45.000+00:00"
        }])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sdk = sdk_for(&server, &dir).await;

    let messages = sdk.list_messages().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].user, "leo");
    assert_eq!(messages[0].image_url.as_deref(), Some("https://cdn/img.png"));
    assert_eq!(messages[0].timestamp, 1_705_501_845_000);
}

#[tokio::test]
async fn delete_always_filters_local_copy() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rest/v1/posts"))
        .and(query_param("id", "eq.p1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sdk = sdk_for(&server, &dir).await;
    sdk.kv()
        .set(LocalKey::Posts, &vec![sample_post("p1"), sample_post("p3")])
        .await
        .unwrap();

    sdk.delete_post("p1").await;

    let local: Vec<Post> = sdk.kv().get_or(LocalKey::Posts, Vec::new()).await;
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].id, "p3");
}

#[tokio::test]
async fn empty_or_null_insert_response_writes_locally() {
    for response in [
        ResponseTemplate::new(201),
        ResponseTemplate::new(200).set_body_string("null"),
    ] {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/posts"))
            .respond_with(response)
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let sdk = sdk_for(&server, &dir).await;

        sdk.save_post(sample_post("p1")).await;

        let local: Vec<Post> = sdk.kv().get_or(LocalKey::Posts, Vec::new()).await;
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].id, "p1");
        assert!(local[0].created_at.is_some());
    }
}

#[tokio::test]
async fn remote_list_with_null_columns_is_returned() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "r1",
            "title": "remote",
            "description": null,
            "category": null,
            "date": null,
            "created_at": "2024-01-17T14:30:45+00:00"
        }])))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let sdk = sdk_for(&server, &dir).await;
    sdk.kv()
        .set(LocalKey::Posts, &vec![sample_post("local")])
        .await
        .unwrap();

    let posts = sdk.list_posts().await;
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "r1");
    assert_eq!(posts[0].category, "");
}
