//! Export API client tests against a mock HTTP server.

use mockito::Matcher;

use ampex::{ExportClient, ExportWindow, FetchError};

fn window() -> ExportWindow {
    ExportWindow::parse("20251104T00", "20251105T00").unwrap()
}

#[tokio::test]
async fn downloads_archive_with_basic_auth() {
    let mut server = mockito::Server::new_async().await;
    let body = b"PK\x05\x06 pretend archive bytes".to_vec();

    let mock = server
        .mock("GET", "/api/2/export")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("start".into(), "20251104T00".into()),
            Matcher::UrlEncoded("end".into(), "20251105T00".into()),
        ]))
        // base64("key:secret")
        .match_header("authorization", "Basic a2V5OnNlY3JldA==")
        .with_status(200)
        .with_body(body.clone())
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("amp_events.zip");

    let client = ExportClient::new(server.url(), "key", "secret").unwrap();
    let written = client.download(&window(), &dest).await.unwrap();

    mock.assert_async().await;
    assert_eq!(written, body.len() as u64);
    assert_eq!(std::fs::read(&dest).unwrap(), body);
}

#[tokio::test]
async fn trailing_slash_in_base_url_is_tolerated() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/api/2/export")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("ok")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("amp_events.zip");

    let client = ExportClient::new(format!("{}/", server.url()), "key", "secret").unwrap();
    client.download(&window(), &dest).await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/api/2/export")
        .match_query(Matcher::Any)
        .with_status(403)
        .with_body("forbidden")
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("amp_events.zip");

    let client = ExportClient::new(server.url(), "key", "wrong").unwrap();
    let err = client.download(&window(), &dest).await.unwrap_err();

    match err {
        FetchError::Status { status } => assert_eq!(status.as_u16(), 403),
        other => panic!("expected status error, got {other}"),
    }

    // No archive is written for a failed request
    assert!(!dest.exists());
}
