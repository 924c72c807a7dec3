//! Compression endpoint integration tests.
//!
//! Run with: `cargo test -p vidpress-api --test videos_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{fake_video, setup_test_app, setup_test_app_with, video_form, zip_entries, ToolScript};
use std::time::Duration;

#[tokio::test]
async fn test_upload_returns_zip_with_video_and_thumbnail() {
    let app = setup_test_app(ToolScript::default());
    let data = fake_video(2048);

    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(data.clone(), "video/mp4", Some("50")))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "application/zip");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"video_and_thumbnail.zip\""
    );

    let entries = zip_entries(response.as_bytes());
    let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["compressed_video.mp4", "thumbnail.jpg"]);

    let mut expected_video = b"encoded:".to_vec();
    expected_video.extend_from_slice(&data);
    assert_eq!(entries[0].1, expected_video);
    assert_eq!(&entries[1].1[..2], &[0xFF, 0xD8]);

    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_quality_drives_bitrate() {
    // 10 MiB over 10 s: 80% → 8 MiB → 6553 kbps
    let app = setup_test_app_with(ToolScript::default(), &[("MAX_VIDEO_SIZE_MB", "20")]);
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(vec![0u8; 10 * 1024 * 1024], "video/mp4", Some("80")))
        .await;
    assert_eq!(response.status_code(), 200);
    let calls = app.toolkit.transcode_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].bitrate_kbps, 6553);
}

#[tokio::test]
async fn test_quality_defaults_to_fifty_percent() {
    let app = setup_test_app(ToolScript::default());
    // 1 MiB over 10 s at 50% → 409 kbps
    for quality in [None, Some(""), Some("abc")] {
        let response = app
            .client()
            .post("/upload-video")
            .multipart(video_form(vec![1u8; 1024 * 1024], "video/mp4", quality))
            .await;
        assert_eq!(response.status_code(), 200, "quality {:?}", quality);
    }

    let bitrates: Vec<u32> = app
        .toolkit
        .transcode_calls()
        .iter()
        .map(|c| c.bitrate_kbps)
        .collect();
    assert_eq!(bitrates, vec![409, 409, 409]);
}

#[tokio::test]
async fn test_out_of_range_quality_is_rejected() {
    let app = setup_test_app(ToolScript::default());
    for quality in ["0", "101", "-5"] {
        let response = app
            .client()
            .post("/upload-video")
            .multipart(video_form(fake_video(512), "video/mp4", Some(quality)))
            .await;
        assert_eq!(response.status_code(), 400, "quality {}", quality);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "INVALID_INPUT");
    }
    assert!(app.toolkit.transcode_calls().is_empty());
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_missing_file_is_bad_request() {
    let app = setup_test_app(ToolScript::default());
    let form = MultipartForm::new().add_text("quality", "50");

    let response = app.client().post("/upload-video").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No file uploaded.");
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(app.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_text_video_field_counts_as_no_file() {
    let app = setup_test_app(ToolScript::default());
    let form = MultipartForm::new()
        .add_text("video", "not really a file")
        .add_text("quality", "50");

    let response = app.client().post("/upload-video").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No file uploaded.");
    assert!(app.toolkit.transcode_calls().is_empty());
    assert!(app.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_non_multipart_body_is_bad_request() {
    let app = setup_test_app(ToolScript::default());
    let response = app
        .client()
        .post("/upload-video")
        .json(&serde_json::json!({ "quality": 50 }))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No file uploaded.");
}

#[tokio::test]
async fn test_non_video_mime_is_rejected_before_processing() {
    let app = setup_test_app(ToolScript::default());
    let part = Part::bytes(bytes::Bytes::from_static(b"just some notes"))
        .file_name("notes.txt")
        .mime_type("text/plain");
    let form = MultipartForm::new().add_part("video", part);

    let response = app.client().post("/upload-video").multipart(form).await;

    assert_eq!(response.status_code(), 415);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UNSUPPORTED_MEDIA_TYPE");
    assert!(app.toolkit.transcode_calls().is_empty());
    assert!(app.scratch_entries().is_empty());
}

#[tokio::test]
async fn test_empty_file_is_rejected() {
    let app = setup_test_app(ToolScript::default());
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(Vec::new(), "video/mp4", None))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.toolkit.transcode_calls().is_empty());
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_zero_duration_is_bad_request() {
    let app = setup_test_app(ToolScript {
        duration: 0.0,
        ..Default::default()
    });
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(fake_video(1024), "video/mp4", None))
        .await;

    assert_eq!(response.status_code(), 400);
    assert!(app.toolkit.transcode_calls().is_empty());
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_probe_failure_is_server_error_and_cleans_up() {
    let app = setup_test_app(ToolScript {
        probe_fails: true,
        ..Default::default()
    });
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(fake_video(1024), "video/mp4", None))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Error retrieving video metadata");
    assert_eq!(body["code"], "PROBE_ERROR");
    assert!(body.get("details").is_none());
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_encode_failure_is_server_error_and_cleans_up() {
    let app = setup_test_app(ToolScript {
        transcode_fails: true,
        ..Default::default()
    });
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(fake_video(1024), "video/mp4", None))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Error during compression");
    assert!(app.toolkit.thumbnails.lock().unwrap().is_empty());
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_thumbnail_failure_is_server_error_and_cleans_up() {
    let app = setup_test_app(ToolScript {
        thumbnail_fails: true,
        ..Default::default()
    });
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(fake_video(1024), "video/mp4", None))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Error generating thumbnail");
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_tool_timeout_is_gateway_timeout() {
    let app = setup_test_app(ToolScript {
        transcode_times_out: true,
        ..Default::default()
    });
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(fake_video(1024), "video/mp4", None))
        .await;

    assert_eq!(response.status_code(), 504);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "PROCESSING_TIMEOUT");
    assert_eq!(body["recoverable"], true);
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_saturated_server_rejects_with_service_unavailable() {
    let app = setup_test_app_with(
        ToolScript {
            transcode_delay: Duration::from_millis(300),
            ..Default::default()
        },
        &[("MAX_CONCURRENT_TRANSCODES", "1")],
    );
    let client = app.client();

    let first = client
        .post("/upload-video")
        .multipart(video_form(fake_video(1024), "video/mp4", None));
    let second = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        client
            .post("/upload-video")
            .multipart(video_form(fake_video(1024), "video/mp4", None))
            .await
    };
    let (first, second) = tokio::join!(first, second);

    assert_eq!(first.status_code(), 200);
    assert_eq!(second.status_code(), 503);
    let body: serde_json::Value = second.json();
    assert_eq!(body["code"], "SERVER_BUSY");
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_concurrent_requests_use_separate_artifacts() {
    let app = setup_test_app(ToolScript {
        transcode_delay: Duration::from_millis(100),
        ..Default::default()
    });
    let client = app.client();

    let a = client
        .post("/upload-video")
        .multipart(video_form(vec![b'a'; 4096], "video/mp4", None));
    let b = client
        .post("/upload-video")
        .multipart(video_form(vec![b'b'; 4096], "video/mp4", None));
    let (a, b) = tokio::join!(a, b);
    assert_eq!(a.status_code(), 200);
    assert_eq!(b.status_code(), 200);

    // Each response holds its own upload's content.
    assert_eq!(&zip_entries(a.as_bytes())[0].1[8..], &vec![b'a'; 4096][..]);
    assert_eq!(&zip_entries(b.as_bytes())[0].1[8..], &vec![b'b'; 4096][..]);

    let calls = app.toolkit.transcode_calls();
    assert_eq!(calls.len(), 2);
    assert_ne!(calls[0].output, calls[1].output);
    assert_ne!(calls[0].output.parent(), calls[1].output.parent());

    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_upload_over_size_limit_is_rejected() {
    let app = setup_test_app_with(ToolScript::default(), &[("MAX_VIDEO_SIZE_MB", "1")]);
    let response = app
        .client()
        .post("/upload-video")
        .multipart(video_form(vec![0u8; 3 * 1024 * 1024], "video/mp4", None))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(app.toolkit.transcode_calls().is_empty());
    app.assert_scratch_empty().await;
}

#[tokio::test]
async fn test_error_details_follow_configured_environment() {
    let dev = setup_test_app(ToolScript::default());
    let response = dev
        .client()
        .post("/upload-video")
        .multipart(video_form(fake_video(512), "video/mp4", Some("150")))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert!(body.get("details").is_some());

    let prod = setup_test_app_with(
        ToolScript::default(),
        &[
            ("ENVIRONMENT", "production"),
            ("CORS_ORIGINS", "https://app.example.com"),
        ],
    );
    let response = prod
        .client()
        .post("/upload-video")
        .multipart(video_form(fake_video(512), "video/mp4", Some("150")))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body.get("details").is_none());
    assert!(body.get("error_type").is_none());
}
