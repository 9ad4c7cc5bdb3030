//! HTTP-level tests for the FengChao client against a mock service.

use std::time::Duration;

use fengchao::{
    BatchBuilder, ClientError, CompletionOptions, FengchaoClient, Message, MessageTemplate,
    PromptTemplate, StreamError,
};
use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_auth(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("api_key", "key"))
        .and(query_param("secret_key", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 200,
            "token": "tok-1",
            "msg": ""
        })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_models(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/models/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": "ERNIE-Bot-4", "owned_by": "baidu", "channel": "百度", "mode": ["invoke", "stream"]},
                {"id": "qwen-local", "owned_by": "local", "channel": "本地模型", "mode": ["invoke"]}
            ]
        })))
        .expect(1)
        .mount(server)
        .await;
}

fn completion_body(text: &str) -> serde_json::Value {
    json!({
        "request_id": "r-1",
        "object": "chat.completion",
        "created": "2024-05-01 10:00:00",
        "choices": [{
            "index": 0,
            "role": "assistant",
            "finish_reason": "stop",
            "message": {"role": "assistant", "content": text}
        }],
        "usage": {"prompt_tokens": 5, "completion_tokens": 3, "total_tokens": 8},
        "msg": "",
        "status": 200
    })
}

async fn setup() -> (MockServer, FengchaoClient) {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    mount_models(&server).await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();
    (server, client)
}

fn event_stream(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.as_bytes().to_vec(), "text/event-stream")
}

#[tokio::test]
async fn chat_completion_renders_prompt_and_tracks_history() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(header("authorization", "tok-1"))
        .and(body_partial_json(json!({
            "model": "ERNIE-Bot-4",
            "system": "be brief",
            "query": "tell me about rust",
            "mode": "invoke",
            "history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Rust is a language.")))
        .expect(1)
        .mount(&server)
        .await;

    let prompt = PromptTemplate::new()
        .with(Message::system("be brief"))
        .with(Message::user("hi"))
        .with(Message::assistant("hello"))
        .with(MessageTemplate::user("tell me about {{.Topic}}").unwrap());
    let options = client.options().with_variables(json!({"Topic": "rust"}));

    let result = client.chat_completion(Some(&prompt), options).await.unwrap();
    assert_eq!(result.text(), "Rust is a language.");
    assert_eq!(result.usage.total_tokens, 8);
    assert_eq!(result.history.len(), 5);
    assert_eq!(result.history[4], Message::assistant("Rust is a language."));

    let next_turn = result.history_prompt().unwrap();
    assert_eq!(next_turn.len(), 5);
}

#[tokio::test]
async fn token_and_model_catalog_are_cached() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .expect(2)
        .mount(&server)
        .await;

    for _ in 0..2 {
        let options = client.options();
        client
            .chat_completion(Some(&Message::user("ping")), options)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn local_models_use_local_chat_endpoint() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/local_chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("local")))
        .expect(1)
        .mount(&server)
        .await;

    let options = client.options().with_model("qwen-local");
    let result = client
        .chat_completion(Some(&Message::user("hi")), options)
        .await
        .unwrap();
    assert_eq!(result.text(), "local");
}

#[tokio::test]
async fn model_list_checks_first_entry_only() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(body_partial_json(json!({"model": "ERNIE-Bot-4,glm-4"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
        .mount(&server)
        .await;

    let options = client.options().with_model("ERNIE-Bot-4,glm-4");
    assert!(client
        .chat_completion(Some(&Message::user("hi")), options)
        .await
        .is_ok());
}

#[tokio::test]
async fn unknown_model_is_rejected_before_auth() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let options = client.options().with_model("gpt-x");
    let err = client
        .chat_completion(Some(&Message::user("hi")), options)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::UnsupportedModel(ref m) if m == "gpt-x"));
}

#[tokio::test]
async fn empty_catalog_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let err = client.find_model("ERNIE-Bot-4").await.unwrap_err();
    assert!(matches!(err, ClientError::NoModels));
}

#[tokio::test]
async fn error_detail_body_is_surfaced() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"msg": "field required"}]
        })))
        .mount(&server)
        .await;

    let err = client
        .chat_completion(Some(&Message::user("hi")), client.options())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "chat completion error: field required");
}

#[tokio::test]
async fn failed_status_in_body_is_an_error() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 500,
            "msg": "model overloaded"
        })))
        .mount(&server)
        .await;

    let err = client
        .chat_completion(Some(&Message::user("hi")), client.options())
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "chat completion error: error[500]: model overloaded"
    );
}

#[tokio::test]
async fn rate_limit_maps_to_rate_limited() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = client
        .chat_completion(Some(&Message::user("hi")), client.options())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::RateLimited));
}

#[tokio::test]
async fn rejected_credentials_are_auth_errors() {
    let server = MockServer::start().await;
    mount_models(&server).await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": 401,
            "token": "",
            "msg": "invalid secret"
        })))
        .mount(&server)
        .await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let err = client
        .chat_completion(Some(&Message::user("hi")), client.options())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "auth error: [401]invalid secret");
}

#[tokio::test]
async fn slow_completion_times_out() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_body("late"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let options = client.options().with_timeout(Duration::from_millis(100));
    let err = client
        .chat_completion(Some(&Message::user("hi")), options)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout));
}

#[tokio::test]
async fn quick_completion_needs_prompt_and_query() {
    let server = MockServer::start().await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let err = client
        .quick_completion(client.options().with_query("hi"))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "invalid option: prompt or query is empty");
}

#[tokio::test]
async fn quick_completion_sends_predefined_prompt() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(body_partial_json(json!({"prompt": "translator", "query": "你好"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("hello")))
        .expect(1)
        .mount(&server)
        .await;

    let options = client
        .options()
        .with_predefined_prompt("translator")
        .with_query("你好");
    let result = client.quick_completion(options).await.unwrap();
    assert_eq!(result.text(), "hello");
    assert!(result.history.is_empty());
}

#[tokio::test]
async fn stream_pull_mode_yields_frames_in_order() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    let body = concat!(
        "event: start\n",
        "data: {\"choices\":[{\"message\":{\"role\":\"assistant\",\"content\":\"Hel\"}}],\"status\":200}\n",
        "\n",
        "event: add\n",
        "data: {\"choices\":[{\"message\":{\"role\":\"assistant\",\"content\":\"lo\"}}],\"status\":200}\n",
        "\n",
        "event: stop\n",
        "data: {\"choices\":[{\"finish_reason\":\"stop\",\"message\":{\"role\":\"assistant\",\"content\":\"\"}}],\"status\":200}\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .and(header("authorization", "tok-1"))
        .and(body_partial_json(json!({"mode": "stream", "query": "hi"})))
        .respond_with(event_stream(body))
        .expect(1)
        .mount(&server)
        .await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let mut stream = client
        .chat_completion_stream(Some(&Message::user("hi")), client.options())
        .await
        .unwrap();

    let mut text = String::new();
    let mut frames = 0;
    while let Some(frame) = stream.next().await.unwrap() {
        text.push_str(frame.text());
        frames += 1;
    }
    assert_eq!(frames, 3);
    assert_eq!(text, "Hello");
    stream.close();
    assert!(stream.is_closed());
}

#[tokio::test]
async fn stream_push_mode_reports_server_error_frame() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    let body = concat!(
        "data: {\"choices\":[{\"message\":{\"content\":\"partial\"}}],\"status\":200}\n",
        "event: error\n",
        "data: {\"status\":500,\"msg\":\"model crashed\"}\n",
    );
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(event_stream(body))
        .mount(&server)
        .await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let items: Vec<_> = client
        .chat_completion_stream_simple(Some(&Message::user("hi")), client.options())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap().text(), "partial");
    let err = items[1].as_ref().unwrap_err();
    assert_eq!(err.to_string(), "chat completion failed: [500]model crashed");
    assert_eq!(err.server_error().unwrap().payload["msg"], "model crashed");
}

#[tokio::test]
async fn stream_open_failure_reads_first_body_line() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(400).set_body_string(
            "{\"detail\":[{\"msg\":\"query must not be empty\"}]}\nignored trailer\n",
        ))
        .mount(&server)
        .await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let err = client
        .chat_completion_stream(Some(&Message::user("hi")), client.options())
        .await
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "chat completion error: query must not be empty");
}

#[tokio::test]
async fn stream_reassembles_lines_longer_than_buffer() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    let long = "字".repeat(500);
    let body = format!(
        "event: add\ndata: {{\"choices\":[{{\"message\":{{\"content\":\"{long}\"}}}}],\"status\":200}}\n\nevent: stop\n"
    );
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(event_stream(&body))
        .mount(&server)
        .await;
    let client = FengchaoClient::new("key", "secret", server.uri())
        .unwrap()
        .with_line_capacity(64);

    let mut stream = client
        .chat_completion_stream(Some(&Message::user("hi")), client.options())
        .await
        .unwrap();
    let frame = stream.next().await.unwrap().unwrap();
    assert_eq!(frame.text(), long);
    assert!(stream.next().await.unwrap().is_none());
}

#[tokio::test]
async fn stream_with_malformed_frame_is_decode_error() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(event_stream("event: add\ndata: {\"choices\": [\n"))
        .mount(&server)
        .await;
    let client = FengchaoClient::new("key", "secret", server.uri()).unwrap();

    let mut stream = client
        .chat_completion_stream(Some(&Message::user("hi")), client.options())
        .await
        .unwrap();
    let err = stream.next().await.unwrap_err();
    assert!(matches!(err, StreamError::Decode(_)));
}

#[tokio::test]
async fn batch_collects_successes_and_failures() {
    let (server, client) = setup().await;
    Mock::given(method("POST"))
        .and(path("/chat/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("done")))
        .expect(2)
        .mount(&server)
        .await;

    let mut batch = BatchBuilder::new();
    let first = batch
        .add(
            Some(PromptTemplate::new().with(Message::user("one"))),
            client.options(),
        )
        .unwrap();
    let second = batch
        .add(
            Some(PromptTemplate::new().with(Message::user("two"))),
            client.options(),
        )
        .unwrap();
    let bad = batch
        .add(
            Some(PromptTemplate::new().with(Message::user("three"))),
            CompletionOptions::default().with_model("missing-model"),
        )
        .unwrap();

    let outcome = client.batch_chat_completion(batch).await;
    assert!(!outcome.complete);
    assert_eq!(outcome.completions.len(), 2);
    assert_eq!(outcome.completions[&first].text(), "done");
    assert!(outcome.completions.contains_key(&second));
    assert!(matches!(
        outcome.errors[&bad],
        ClientError::UnsupportedModel(_)
    ));
}
