//! Shared-link media plugin: download-and-play or stream.
//!
//! ```text
//! GET  /linkshare              current mode ("Download" or "Stream")
//! GET  /linkshare/download     switch to download mode
//! GET  /linkshare/stream       switch to stream mode
//! POST /linkshare              {"link": <share url>} → 202 Accepted
//! ```
//!
//! Three work queues, each with its own worker:
//! - `media.downloader` fetches a video into the on-disk cache, then
//!   forwards the local file to the player queue
//! - `media.player` plays one local file at a time
//! - `media.streamer` resolves direct stream URLs and plays them without
//!   touching the cache
//!
//! External commands are `youtube-dl`/`omxplayer` compatible and taken
//! from config. There is no timeout on them: a hung player stalls its
//! queue's worker until the process exits.

use axum::http::StatusCode;
use futures_util::future::BoxFuture;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::process::Command;
use url::Url;

use crate::config::MediaConfig;
use crate::errors::ErrorStack;
use crate::host::{HostServices, Plugin, PluginError, Registrar};
use crate::http::exchange::{EndpointRequest, EndpointResponse};
use crate::routing::Endpoint;
use crate::work::{JobConsumer, WorkQueue};

#[derive(Debug, Error)]
enum MediaError {
    #[error("downloader failed on {0}")]
    DownloadFailed(String),

    #[error("file not found after download: {0}")]
    MissingAfterDownload(String),

    #[error("stream resolution failed on {0}")]
    StreamResolveFailed(String),

    #[error("player exited with {status} on {file}")]
    PlayerFailed { file: String, status: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
#[error("unrecognized share link")]
struct LinkParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Download,
    Stream,
}

impl Mode {
    fn label(self) -> &'static str {
        match self {
            Mode::Download => "Download",
            Mode::Stream => "Stream",
        }
    }
}

struct MediaPlugin;

impl Plugin for MediaPlugin {
    fn name(&self) -> &str {
        "media"
    }
}

pub fn build(
    registrar: &Registrar,
    services: &HostServices,
) -> Result<Box<dyn Plugin>, PluginError> {
    let cfg = services.config.media.clone();
    let errors = services.errors.clone();

    let video_dir = PathBuf::from(&cfg.video_dir);
    if video_dir.exists() {
        if !video_dir.is_dir() {
            return Err(PluginError::Init(format!(
                "{} exists and is not a directory",
                video_dir.display()
            )));
        }
    } else {
        std::fs::create_dir_all(&video_dir)?;
    }

    let player = WorkQueue::spawn(
        "media.player",
        PlayerWorker {
            command: cfg.player_command.clone(),
            volume: cfg.volume,
        },
        errors.clone(),
    );

    let mut download_worker = DownloadWorker {
        video_dir: video_dir.clone(),
        command: cfg.downloader_command.clone(),
        player: player.clone(),
        storage: Vec::new(),
    };
    download_worker.scan_storage()?;
    let downloader = WorkQueue::spawn("media.downloader", download_worker, errors.clone());

    let streamer = WorkQueue::spawn(
        "media.streamer",
        StreamWorker {
            resolver: cfg.downloader_command.clone(),
            player_command: cfg.player_command.clone(),
            volume: cfg.volume,
            errors: errors.clone(),
        },
        errors.clone(),
    );

    let mode = Arc::new(Mutex::new(Mode::Download));

    let endpoint = Endpoint::builder("/linkshare")
        .on_get({
            let mode = mode.clone();
            move |req| {
                let mode = mode.clone();
                async move { handle_get(&req, &mode) }
            }
        })
        .on_post({
            let errors = errors.clone();
            move |req| {
                let mode = mode.clone();
                let downloader = downloader.clone();
                let streamer = streamer.clone();
                let errors = errors.clone();
                async move { handle_post(&req, &mode, &downloader, &streamer, &errors) }
            }
        })
        .build();
    registrar.register_endpoint(endpoint);

    Ok(Box::new(MediaPlugin))
}

fn current_mode(mode: &Mutex<Mode>) -> Mode {
    *mode.lock().unwrap_or_else(PoisonError::into_inner)
}

fn handle_get(req: &EndpointRequest, mode: &Mutex<Mode>) -> EndpointResponse {
    match req.remainder_segments().as_slice() {
        [] => EndpointResponse::text(StatusCode::OK, current_mode(mode).label()),
        ["download"] => {
            *mode.lock().unwrap_or_else(PoisonError::into_inner) = Mode::Download;
            EndpointResponse::status(StatusCode::OK)
        }
        ["stream"] => {
            *mode.lock().unwrap_or_else(PoisonError::into_inner) = Mode::Stream;
            EndpointResponse::status(StatusCode::OK)
        }
        _ => EndpointResponse::status(StatusCode::BAD_REQUEST),
    }
}

fn handle_post(
    req: &EndpointRequest,
    mode: &Mutex<Mode>,
    downloader: &WorkQueue<String>,
    streamer: &WorkQueue<String>,
    errors: &ErrorStack,
) -> EndpointResponse {
    let data: serde_json::Value = match req.json() {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(error = %e, "Invalid JSON in share request");
            return EndpointResponse::status(StatusCode::BAD_REQUEST);
        }
    };

    let link = match data.get("link").and_then(|v| v.as_str()) {
        Some(link) => link,
        None => {
            let msg = format!("link not found in {}", data);
            tracing::warn!("{}", msg);
            errors.report("media", msg);
            return EndpointResponse::status(StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    let video_id = match parse_video_id(link) {
        Ok(id) => id,
        Err(_) => {
            let msg = format!("unknown share link: {}", link);
            tracing::warn!("{}", msg);
            errors.report("media", msg);
            return EndpointResponse::status(StatusCode::UNPROCESSABLE_ENTITY);
        }
    };

    match current_mode(mode) {
        Mode::Download => {
            tracing::info!(video_id = %video_id, "Added to download queue");
            downloader.append(video_id);
        }
        Mode::Stream => {
            tracing::info!(video_id = %video_id, "Added to streaming queue");
            streamer.append(video_id);
        }
    }
    EndpointResponse::status(StatusCode::ACCEPTED)
}

/// Extract the video id from a share link.
///
/// Supported shapes, with or without scheme and `www.`/`m.` prefixes:
/// `youtube.com/watch?v=<id>` and `youtu.be/<id>`.
fn parse_video_id(link: &str) -> Result<String, LinkParseError> {
    let trimmed = link.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };
    let url = Url::parse(&with_scheme).map_err(|_| LinkParseError)?;

    let id = match url.host_str() {
        Some("youtube.com") | Some("www.youtube.com") | Some("m.youtube.com")
            if url.path() == "/watch" =>
        {
            url.query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
        }
        Some("youtu.be") | Some("www.youtu.be") => url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .map(str::to_string),
        _ => None,
    };

    match id {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(LinkParseError),
    }
}

/// Plays local files, one at a time.
struct PlayerWorker {
    command: String,
    volume: i32,
}

impl JobConsumer for PlayerWorker {
    type Job = PathBuf;
    type Error = MediaError;

    fn consume(&mut self, file: PathBuf) -> BoxFuture<'_, Result<(), MediaError>> {
        Box::pin(async move {
            tracing::info!(file = %file.display(), "Playing");
            let status = Command::new(&self.command)
                .arg("--vol")
                .arg(self.volume.to_string())
                .arg(&file)
                .status()
                .await?;
            if !status.success() {
                return Err(MediaError::PlayerFailed {
                    file: file.display().to_string(),
                    status: status.to_string(),
                });
            }
            Ok(())
        })
    }
}

/// Downloads into the cache directory, then forwards to the player queue.
struct DownloadWorker {
    video_dir: PathBuf,
    command: String,
    player: WorkQueue<PathBuf>,
    /// Cached `(stem, extension)` pairs from the video directory.
    storage: Vec<(String, String)>,
}

impl DownloadWorker {
    /// Rebuild the cache index from the video directory. Files are named
    /// `<id>.<ext>`.
    fn scan_storage(&mut self) -> std::io::Result<()> {
        self.storage.clear();
        for entry in std::fs::read_dir(&self.video_dir)? {
            let path = entry?.path();
            let stem = path.file_stem().and_then(|s| s.to_str());
            let ext = path.extension().and_then(|s| s.to_str());
            if let (Some(stem), Some(ext)) = (stem, ext) {
                self.storage.push((stem.to_string(), ext.to_string()));
            }
        }
        Ok(())
    }

    fn cached_file(&self, video_id: &str) -> Option<PathBuf> {
        self.storage
            .iter()
            .find(|(stem, _)| stem == video_id)
            .map(|(stem, ext)| self.video_dir.join(format!("{}.{}", stem, ext)))
    }
}

impl JobConsumer for DownloadWorker {
    type Job = String;
    type Error = MediaError;

    fn consume(&mut self, video_id: String) -> BoxFuture<'_, Result<(), MediaError>> {
        Box::pin(async move {
            if self.cached_file(&video_id).is_none() {
                tracing::info!(video_id = %video_id, "Downloading");
                let status = Command::new(&self.command)
                    .arg(format!("https://youtube.com/watch?v={}", video_id))
                    .arg("-f")
                    .arg("bestvideo[ext=mp4]+bestaudio[ext=m4a]")
                    .arg("-o")
                    .arg(self.video_dir.join("%(id)s.%(ext)s"))
                    .status()
                    .await?;
                if !status.success() {
                    return Err(MediaError::DownloadFailed(video_id));
                }
                self.scan_storage()?;
            }

            match self.cached_file(&video_id) {
                Some(file) => {
                    tracing::info!(file = %file.display(), "Added to player queue");
                    self.player.append(file);
                    Ok(())
                }
                None => Err(MediaError::MissingAfterDownload(video_id)),
            }
        })
    }
}

/// Resolves direct stream URLs and plays them, bypassing the cache.
struct StreamWorker {
    resolver: String,
    player_command: String,
    volume: i32,
    errors: Arc<ErrorStack>,
}

impl JobConsumer for StreamWorker {
    type Job = String;
    type Error = MediaError;

    fn consume(&mut self, video_id: String) -> BoxFuture<'_, Result<(), MediaError>> {
        Box::pin(async move {
            let output = Command::new(&self.resolver)
                .arg("-g")
                .arg(&video_id)
                .output()
                .await?;
            if !output.status.success() {
                return Err(MediaError::StreamResolveFailed(video_id));
            }

            let stdout = String::from_utf8_lossy(&output.stdout);
            let urls: Vec<&str> = stdout.lines().filter(|l| !l.is_empty()).collect();
            // One video URL and one audio URL.
            if urls.len() != 2 {
                return Err(MediaError::StreamResolveFailed(video_id));
            }

            for (label, stream_url) in ["video", "audio"].into_iter().zip(urls) {
                spawn_stream_player(
                    self.player_command.clone(),
                    self.volume,
                    stream_url.to_string(),
                    label,
                    video_id.clone(),
                    self.errors.clone(),
                );
            }
            Ok(())
        })
    }
}

/// Plays one stream URL on its own task; the video and audio halves of a
/// stream run concurrently, so these cannot go through the player queue.
fn spawn_stream_player(
    command: String,
    volume: i32,
    stream_url: String,
    label: &'static str,
    video_id: String,
    errors: Arc<ErrorStack>,
) {
    tokio::spawn(async move {
        let result = Command::new(&command)
            .arg("--vol")
            .arg(volume.to_string())
            .arg(&stream_url)
            .status()
            .await;
        match result {
            Ok(status) if status.success() => {}
            Ok(status) => {
                errors.report(
                    "media.streamer",
                    format!("{} player failed on {} with {}", label, video_id, status),
                );
            }
            Err(e) => {
                errors.report(
                    "media.streamer",
                    format!("{} player failed on {}: {}", label, video_id, e),
                );
            }
        }
    });
}
