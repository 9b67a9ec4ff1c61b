//! Resume upload gate through the full router.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use folio_integration_tests::{
    BASE_URL, FilePart, TestApp, body_json, multipart_files_request, multipart_request, pdf_bytes,
    request,
};
use folio_server::services::upload::MAX_UPLOAD_BYTES;

const RESUME_URI: &str = "/api/about/resume";

#[tokio::test]
async fn test_upload_pdf() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let content = pdf_bytes(2048);
    let response = app
        .send(multipart_request(
            RESUME_URI,
            Some(&cookie),
            "resume",
            "cv.pdf",
            "application/pdf",
            &content,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let path = body["path"].as_str().unwrap();
    assert!(path.starts_with("uploads/resume-"));
    assert!(path.ends_with(".pdf"));
    assert_eq!(body["url"], format!("{BASE_URL}/{path}"));
    assert_eq!(body["size"], 2048);

    let files = app.uploaded_files();
    assert_eq!(files.len(), 1);
    assert_eq!(format!("uploads/{}", files[0]), path);

    let response = app.send(request("GET", &format!("/{path}"), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_requires_session() {
    let app = TestApp::new().await;

    let response = app
        .send(multipart_request(
            RESUME_URI,
            None,
            "resume",
            "cv.pdf",
            "application/pdf",
            &pdf_bytes(64),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            RESUME_URI,
            Some(&cookie),
            "resume",
            "cv.pdf",
            "application/pdf",
            &pdf_bytes(6 * 1024 * 1024),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_non_pdf_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            RESUME_URI,
            Some(&cookie),
            "resume",
            "cv.txt",
            "text/plain",
            b"plain text resume",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(response).await["error"].is_string());

    // Declared as PDF but the content is not
    let response = app
        .send(multipart_request(
            RESUME_URI,
            Some(&cookie),
            "resume",
            "cv.pdf",
            "application/pdf",
            b"<html>not a pdf</html>",
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_wrong_field_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            RESUME_URI,
            Some(&cookie),
            "document",
            "cv.pdf",
            "application/pdf",
            &pdf_bytes(64),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_upload_at_size_limit_is_accepted() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            RESUME_URI,
            Some(&cookie),
            "resume",
            "cv.pdf",
            "application/pdf",
            &pdf_bytes(MAX_UPLOAD_BYTES),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["size"], MAX_UPLOAD_BYTES);
    assert_eq!(app.uploaded_files().len(), 1);
}

#[tokio::test]
async fn test_upload_one_byte_over_limit_is_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let response = app
        .send(multipart_request(
            RESUME_URI,
            Some(&cookie),
            "resume",
            "cv.pdf",
            "application/pdf",
            &pdf_bytes(MAX_UPLOAD_BYTES + 1),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.uploaded_files().is_empty());
}

#[tokio::test]
async fn test_two_files_are_rejected() {
    let app = TestApp::new().await;
    let cookie = app.login().await;

    let first = pdf_bytes(64);
    let second = pdf_bytes(128);
    let response = app
        .send(multipart_files_request(
            RESUME_URI,
            Some(&cookie),
            &[
                FilePart {
                    field: "resume",
                    file_name: "cv.pdf",
                    content_type: "application/pdf",
                    content: &first,
                },
                FilePart {
                    field: "resume",
                    file_name: "cv-2.pdf",
                    content_type: "application/pdf",
                    content: &second,
                },
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
    assert!(app.uploaded_files().is_empty());
}
