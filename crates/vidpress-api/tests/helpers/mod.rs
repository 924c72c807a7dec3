//! Test helpers: build AppState and router for integration tests.
//!
//! The default toolkit is a scripted stand-in for ffprobe/ffmpeg so the HTTP
//! surface can be exercised without the real binaries.

#![allow(dead_code)]

use async_trait::async_trait;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use std::collections::HashMap;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use vidpress_api::setup::routes;
use vidpress_api::AppState;
use vidpress_core::{Config, MediaServiceConfig, VideoMetadata};
use vidpress_processing::{ToolError, VideoToolkit};

/// What the scripted toolkit should do.
#[derive(Debug, Clone)]
pub struct ToolScript {
    pub duration: f64,
    pub probe_fails: bool,
    pub transcode_fails: bool,
    pub transcode_times_out: bool,
    pub thumbnail_fails: bool,
    pub transcode_delay: Duration,
    pub tools_available: bool,
}

impl Default for ToolScript {
    fn default() -> Self {
        Self {
            duration: 10.0,
            probe_fails: false,
            transcode_fails: false,
            transcode_times_out: false,
            thumbnail_fails: false,
            transcode_delay: Duration::ZERO,
            tools_available: true,
        }
    }
}

/// One recorded transcode invocation.
#[derive(Debug, Clone)]
pub struct TranscodeCall {
    pub input: PathBuf,
    pub output: PathBuf,
    pub bitrate_kbps: u32,
}

pub struct FakeToolkit {
    script: ToolScript,
    pub transcodes: Mutex<Vec<TranscodeCall>>,
    pub thumbnails: Mutex<Vec<PathBuf>>,
}

impl FakeToolkit {
    pub fn new(script: ToolScript) -> Self {
        Self {
            script,
            transcodes: Mutex::new(Vec::new()),
            thumbnails: Mutex::new(Vec::new()),
        }
    }

    pub fn transcode_calls(&self) -> Vec<TranscodeCall> {
        self.transcodes.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoToolkit for FakeToolkit {
    async fn probe(&self, input: &Path) -> Result<VideoMetadata, ToolError> {
        if self.script.probe_fails {
            return Err(ToolError::Failed {
                operation: "ffprobe",
                status: "exit status: 1".into(),
                stderr: format!("{}: Invalid data found when processing input", input.display()),
            });
        }
        Ok(VideoMetadata {
            duration: self.script.duration,
            bitrate_kbps: Some(2000.0),
            width: Some(1280),
            height: Some(720),
            codec: Some("h264".into()),
        })
    }

    async fn transcode(
        &self,
        input: &Path,
        output: &Path,
        bitrate_kbps: u32,
    ) -> Result<(), ToolError> {
        self.transcodes.lock().unwrap().push(TranscodeCall {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            bitrate_kbps,
        });
        if !self.script.transcode_delay.is_zero() {
            tokio::time::sleep(self.script.transcode_delay).await;
        }
        if self.script.transcode_times_out {
            return Err(ToolError::TimedOut {
                operation: "ffmpeg transcode",
                timeout: Duration::from_secs(600),
            });
        }
        if self.script.transcode_fails {
            return Err(ToolError::Failed {
                operation: "ffmpeg transcode",
                status: "exit status: 1".into(),
                stderr: "Conversion failed!".into(),
            });
        }
        let source = tokio::fs::read(input).await.map_err(|source| ToolError::Spawn {
            program: "fake-ffmpeg".into(),
            source,
        })?;
        let mut encoded = b"encoded:".to_vec();
        encoded.extend_from_slice(&source);
        tokio::fs::write(output, encoded)
            .await
            .map_err(|source| ToolError::Spawn {
                program: "fake-ffmpeg".into(),
                source,
            })
    }

    async fn thumbnail(&self, _input: &Path, output: &Path) -> Result<(), ToolError> {
        self.thumbnails.lock().unwrap().push(output.to_path_buf());
        if self.script.thumbnail_fails {
            return Err(ToolError::Failed {
                operation: "ffmpeg thumbnail",
                status: "exit status: 1".into(),
                stderr: "Output file is empty, nothing was encoded".into(),
            });
        }
        tokio::fs::write(output, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10])
            .await
            .map_err(|source| ToolError::Spawn {
                program: "fake-ffmpeg".into(),
                source,
            })
    }

    async fn check_ffmpeg(&self) -> Result<(), ToolError> {
        if self.script.tools_available {
            Ok(())
        } else {
            Err(ToolError::Spawn {
                program: "ffmpeg".into(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            })
        }
    }

    async fn check_ffprobe(&self) -> Result<(), ToolError> {
        Ok(())
    }
}

/// Test application: server, the scratch root it writes into, and the toolkit it calls.
pub struct TestApp {
    pub server: TestServer,
    pub toolkit: Arc<FakeToolkit>,
    pub scratch_root: PathBuf,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Entries currently left under the scratch root.
    pub fn scratch_entries(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(&self.scratch_root) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    /// Wait briefly for the response body's drop to remove every scratch directory.
    pub async fn assert_scratch_empty(&self) {
        for _ in 0..50 {
            if self.scratch_entries().is_empty() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Scratch directories left behind: {:?}", self.scratch_entries());
    }
}

pub fn create_test_config(scratch_root: &Path, overrides: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert(
        "SCRATCH_DIR".into(),
        scratch_root.to_string_lossy().to_string(),
    );
    vars.insert("MAX_CONCURRENT_TRANSCODES".into(), "2".into());
    vars.insert("TRANSCODE_QUEUE_TIMEOUT_SECS".into(), "0".into());
    vars.insert("MAX_VIDEO_SIZE_MB".into(), "5".into());
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    let media = MediaServiceConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("Failed to build test config");
    Config(Box::new(media))
}

pub fn setup_test_app(script: ToolScript) -> TestApp {
    setup_test_app_with(script, &[])
}

pub fn setup_test_app_with(script: ToolScript, overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let scratch_root = temp_dir.path().join("uploads");
    let config = create_test_config(&scratch_root, overrides);

    let toolkit = Arc::new(FakeToolkit::new(script));
    let state = Arc::new(AppState::new(config.clone(), toolkit.clone()));
    let app = routes::setup_routes(&config, state).expect("Failed to build routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        toolkit,
        scratch_root,
        _temp_dir: temp_dir,
    }
}

/// `size` bytes of fake video content.
pub fn fake_video(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

pub fn video_form(data: Vec<u8>, mime: &str, quality: Option<&str>) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from(data))
        .file_name("clip.mp4")
        .mime_type(mime);
    let form = MultipartForm::new().add_part("video", part);
    match quality {
        Some(q) => form.add_text("quality", q.to_string()),
        None => form,
    }
}

/// Entry name → contents of a zip response body.
pub fn zip_entries(body: &[u8]) -> Vec<(String, Vec<u8>)> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(body.to_vec())).expect("Response is not a zip");
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).expect("Unreadable zip entry");
            let mut data = Vec::new();
            file.read_to_end(&mut data).expect("Unreadable zip entry data");
            (file.name().to_string(), data)
        })
        .collect()
}
