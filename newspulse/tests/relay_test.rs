use mockito::Matcher;
use rocket::futures::StreamExt;
use serde_json::json;

use newspulse::relay::{ChatRelay, ChatRequest, ChatRole, ChatTurn, ContextArticle, RelayError};

const SSE_BODY: &str = concat!(
    "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"Oil is \"}}]}\n\n",
    "data: {\"choices\":[{\"delta\":{\"content\":\"up.\"}}]}\n\n",
    "data: [DONE]\n\n",
);

fn question() -> ChatRequest {
    ChatRequest {
        messages: vec![ChatTurn::new(ChatRole::User, "Why are oil prices rising?")],
        news_context: Some(vec![ContextArticle {
            title: "Oil prices surge as OPEC announces production cuts".to_string(),
            category: "Energy".to_string(),
            coverage: 82.0,
        }]),
    }
}

/// Accepts connections and never writes a byte back.
fn silent_upstream() -> std::net::SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for socket in listener.incoming().flatten() {
            held.push(socket);
        }
    });
    addr
}

#[tokio::test]
async fn missing_key_fails_before_any_network_call() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let relay = ChatRelay::new(server.url(), None, "gpt-4-turbo-preview").with_key_env("NEWSPULSE_TEST_KEY");

    let err = match relay.open_stream(question()).await {
        Ok(_) => panic!("relay without a key must not open a stream"),
        Err(e) => e,
    };
    assert!(matches!(err, RelayError::NotConfigured { .. }));
    assert_eq!(
        err.to_string(),
        "AI service is not configured. Please set NEWSPULSE_TEST_KEY in your environment variables."
    );

    mock.assert_async().await;
}

#[tokio::test]
async fn streams_upstream_body_verbatim() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_header("content-type", "application/json")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "model": "gpt-4-turbo-preview",
                "stream": true,
                "max_tokens": 500,
            })),
            Matcher::Regex(r#""role":"system","content":"You are an intelligent news assistant for NewsPulse"#.to_string()),
            Matcher::Regex("Current news context:".to_string()),
            Matcher::Regex("Energy, 82% coverage".to_string()),
            Matcher::Regex(r#""role":"user","content":"Why are oil prices rising\?""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(SSE_BODY)
        .create_async()
        .await;

    let relay = ChatRelay::new(
        format!("{}/v1/chat/completions", server.url()),
        Some("test-key".to_string()),
        "gpt-4-turbo-preview",
    );

    let stream = relay.open_stream(question()).await.expect("stream should open");
    let chunks: Vec<_> = stream.collect().await;
    let relayed: Vec<u8> = chunks.concat();

    assert_eq!(String::from_utf8(relayed).unwrap(), SSE_BODY);
    mock.assert_async().await;
}

#[tokio::test]
async fn relayed_stream_decodes_into_reply() {
    use newspulse::relay::sse::{ChatSession, ChatState};

    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/")
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body(SSE_BODY)
        .create_async()
        .await;

    let relay = ChatRelay::new(server.url(), Some("test-key".to_string()), "gpt-4-turbo-preview");
    let mut session = ChatSession::new();
    let messages = session.submit("Why are oil prices rising?").unwrap();

    let mut stream = relay
        .open_stream(ChatRequest { messages, news_context: None })
        .await
        .unwrap();
    while let Some(chunk) = stream.next().await {
        session.on_chunk(&chunk);
    }
    session.finish();

    assert_eq!(session.state(), &ChatState::Idle);
    assert_eq!(session.messages().last().unwrap().content, "Oil is up.");
}

#[tokio::test]
async fn upstream_failure_is_reported_with_status() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/")
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"message":"The server had an error"}}"#)
        .expect(1)
        .create_async()
        .await;

    let relay = ChatRelay::new(server.url(), Some("test-key".to_string()), "gpt-4-turbo-preview");

    match relay.open_stream(question()).await {
        Err(RelayError::Upstream { status }) => assert_eq!(status, 500),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected an upstream failure"),
    }

    mock.assert_async().await;
}

#[tokio::test]
async fn unreachable_upstream_is_a_transport_error() {
    // Port 1 is never served in the test environment.
    let relay = ChatRelay::new("http://127.0.0.1:1/v1/chat/completions", Some("test-key".to_string()), "m")
        .with_defaults(5, 100, 0.2);

    match relay.open_stream(question()).await {
        Err(RelayError::Transport(_)) | Err(RelayError::Timeout(_)) => {}
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected a transport failure"),
    }
}

#[tokio::test]
async fn silent_upstream_times_out() {
    let url = format!("http://{}/v1/chat/completions", silent_upstream());

    let relay = ChatRelay::new(url, Some("test-key".to_string()), "gpt-4-turbo-preview")
        .with_defaults(1, 100, 0.2);

    let started = std::time::Instant::now();
    match relay.open_stream(question()).await {
        Err(RelayError::Timeout(limit)) => assert_eq!(limit, std::time::Duration::from_secs(1)),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("expected a timeout"),
    }
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}
