//! End-to-end requests through `UreqConnector` against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port on its own thread, then drives
//! the client over real HTTP. Covers the parts the fake connector cannot:
//! actual body framing, header reporting by a real transport, and transport
//! failures.

use bytes::Bytes;
use courier_core::{Client, HttpError, HttpMethod, OutboundEntity, Response, Status};
use mock_server::{Echo, User};

fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

async fn text(response: Response) -> String {
    tokio::task::spawn_blocking(move || response.into_entity().text())
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn repeated_set_cookie_is_comma_joined() {
    let base = start_server();
    let client = Client::new().unwrap();

    let response = client.get(format!("{base}/cookies")).await.unwrap();

    assert_eq!(response.status(), Status::OK);
    assert_eq!(response.header("Set-Cookie"), Some("a=1,b=2"));
    assert_eq!(text(response).await, "ok");
}

#[tokio::test]
async fn chunked_entity_and_headers_reach_the_server() {
    let base = start_server();
    let client = Client::new().unwrap();

    let response = client
        .request(|b| {
            b.method(HttpMethod::Post)
                .uri(format!("{base}/echo"))
                .header("X-Trace", "abc")
                .header("Content-Type", "text/plain")
                .entity(OutboundEntity::from_chunks(vec![
                    Bytes::from_static(b"hello, "),
                    Bytes::from_static(b"world"),
                ]))
                .build()
        })
        .await
        .unwrap();

    assert_eq!(response.status(), Status::OK);
    let echo: Echo = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, "hello, world");
    assert!(echo.headers.contains(&("x-trace".to_string(), "abc".to_string())));
    assert!(echo
        .headers
        .contains(&("content-type".to_string(), "text/plain".to_string())));
}

#[tokio::test]
async fn every_method_is_sent_verbatim() {
    let base = start_server();
    let client = Client::new().unwrap();
    let uri = format!("{base}/echo");

    let cases = [
        ("GET", client.get(uri.clone())),
        ("DELETE", client.delete(uri.clone())),
        ("PUT", client.put(uri.clone(), "put-body")),
        ("PATCH", client.patch(uri.clone(), "patch-body")),
    ];
    for (method, pending) in cases {
        let echo: Echo = serde_json::from_str(&text(pending.await.unwrap()).await).unwrap();
        assert_eq!(echo.method, method);
    }
}

#[tokio::test]
async fn uri_parameters_resolve_against_live_route() {
    let base = start_server();
    let client = Client::new().unwrap();

    let response = client
        .get_with(|b| {
            b.uri(format!("{base}/users/{{id}}"))
                .uri_parameter("id", "42")
                .build()
        })
        .await
        .unwrap();

    let user: User = serde_json::from_str(&text(response).await).unwrap();
    assert_eq!(user.id, "42");
}

#[tokio::test]
async fn error_statuses_are_responses_not_failures() {
    let base = start_server();
    let client = Client::new().unwrap();

    let response = client.get(format!("{base}/status/404")).await.unwrap();

    assert_eq!(response.status(), Status::NOT_FOUND);
    assert_eq!(text(response).await, "status 404");
}

#[tokio::test]
async fn refused_connection_fails_the_exchange() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = Client::new().unwrap();

    let err = client.get(format!("http://{addr}/")).await.err().unwrap();

    assert!(matches!(err, HttpError::Exchange { .. }), "got {err:?}");
}

#[tokio::test]
async fn relative_uri_fails_to_open() {
    let client = Client::new().unwrap();

    let err = client.get("/no/host").await.err().unwrap();

    assert!(matches!(err, HttpError::Connect { ref uri, .. } if uri == "/no/host"));
}
