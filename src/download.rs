// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Artifact downloads: filename derivation and image fetching

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::DownloadConfig;
use crate::model::{extension_for_file_type, Artifact};
use crate::{Result, VitrineError};

/// Filesystem-safe download name: the title lower-cased, every run of
/// characters outside `[a-z0-9]` turned into one hyphen, outer hyphens
/// trimmed, plus the MIME subtype as extension.
pub fn download_filename(title: &str, file_type: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;

    for c in title.to_lowercase().chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    format!("{}.{}", slug, extension_for_file_type(file_type))
}

/// Something that can turn an image reference into bytes
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

/// Fetches `http(s)://` URLs, `data:` URLs and files below an asset root
pub struct DefaultFetcher {
    client: Client,
    asset_root: PathBuf,
}

impl DefaultFetcher {
    pub fn new(config: &DownloadConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            asset_root: PathBuf::from(&config.asset_root),
        })
    }

    fn decode_data_url(reference: &str) -> Result<Vec<u8>> {
        let (header, payload) = reference
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(','))
            .ok_or_else(|| VitrineError::Download("Malformed data URL".to_string()))?;

        if header.ends_with(";base64") {
            general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| VitrineError::Download(format!("Invalid base64 payload: {}", e)))
        } else {
            Ok(payload.as_bytes().to_vec())
        }
    }

    /// Resolve a local reference, refusing anything that climbs out of the root
    fn local_path(&self, reference: &str) -> Result<PathBuf> {
        let relative = Path::new(reference.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(VitrineError::Download(format!(
                "Refusing path outside asset root: {}",
                reference
            )));
        }
        Ok(self.asset_root.join(relative))
    }
}

#[async_trait]
impl ResourceFetcher for DefaultFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        if reference.starts_with("data:") {
            return Self::decode_data_url(reference);
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            debug!("Fetching {}", reference);
            let response = self.client.get(reference).send().await?.error_for_status()?;
            return Ok(response.bytes().await?.to_vec());
        }

        let path = self.local_path(reference)?;
        debug!("Reading {:?}", path);
        Ok(tokio::fs::read(&path).await?)
    }
}

/// A fetched artifact ready to hand to the user
#[derive(Debug, Clone)]
pub struct Download {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub struct Downloader {
    fetcher: Box<dyn ResourceFetcher>,
}

impl Downloader {
    pub fn new(fetcher: Box<dyn ResourceFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn from_config(config: &DownloadConfig) -> Result<Self> {
        Ok(Self::new(Box::new(DefaultFetcher::new(config)?)))
    }

    pub async fn fetch(&self, artifact: &Artifact) -> Result<Download> {
        let bytes = self.fetcher.fetch(&artifact.image).await?;
        let content_type = if artifact.file_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            artifact.file_type.clone()
        };
        Ok(Download {
            filename: download_filename(&artifact.title, &artifact.file_type),
            content_type,
            bytes,
        })
    }

    /// Fetch and write into `dir`, returning the written path
    pub async fn save(&self, artifact: &Artifact, dir: &Path) -> Result<PathBuf> {
        let download = self.fetch(artifact).await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&download.filename);
        tokio::fs::write(&path, &download.bytes).await?;
        info!("Saved '{}' to {:?} ({} bytes)", artifact.title, path, download.bytes.len());
        Ok(path)
    }

    /// Fire-and-forget download. Failures are logged, never retried.
    pub async fn download(&self, artifact: &Artifact, dir: &Path) -> bool {
        match self.save(artifact, dir).await {
            Ok(_) => true,
            Err(e) => {
                error!("Error downloading artifact {}: {}", artifact.id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ArtifactId;
    use chrono::NaiveDate;

    struct StaticFetcher(Option<Vec<u8>>);

    #[async_trait]
    impl ResourceFetcher for StaticFetcher {
        async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
            self.0
                .clone()
                .ok_or_else(|| VitrineError::Download(format!("no such resource: {}", reference)))
        }
    }

    fn artifact(title: &str, image: &str, file_type: &str) -> Artifact {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut a = Artifact::new(ArtifactId(1), title, image, "John Doe", date);
        a.file_type = file_type.to_string();
        a
    }

    #[test]
    fn test_download_filename() {
        assert_eq!(
            download_filename("Notre Dame Cathedral!", "image/png"),
            "notre-dame-cathedral.png"
        );
        assert_eq!(download_filename("--Hello,   World--", "image/jpeg"), "hello-world.jpeg");
        assert_eq!(download_filename("Café 1950s", "application/pdf"), "caf-1950s.pdf");
        assert_eq!(download_filename("!!!", "image/png"), ".png");
    }

    #[test]
    fn test_data_url_decoding() {
        let bytes = DefaultFetcher::decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");

        let plain = DefaultFetcher::decode_data_url("data:text/plain,hi").unwrap();
        assert_eq!(plain, b"hi");

        assert!(DefaultFetcher::decode_data_url("data:image/png;base64").is_err());
    }

    #[test]
    fn test_local_path_stays_in_root() {
        let fetcher = DefaultFetcher::new(&DownloadConfig {
            asset_root: "/srv/assets".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            fetcher.local_path("/artifacts/a.jpg").unwrap(),
            PathBuf::from("/srv/assets/artifacts/a.jpg")
        );
        assert!(fetcher.local_path("../etc/passwd").is_err());
    }

    #[tokio::test]
    async fn test_fetch_local_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("artifacts")).unwrap();
        std::fs::write(dir.path().join("artifacts/a.png"), b"png-bytes").unwrap();

        let downloader = Downloader::from_config(&DownloadConfig {
            asset_root: dir.path().to_string_lossy().to_string(),
            ..Default::default()
        })
        .unwrap();

        let download = downloader
            .fetch(&artifact("Harbor Map", "/artifacts/a.png", "image/png"))
            .await
            .unwrap();
        assert_eq!(download.filename, "harbor-map.png");
        assert_eq!(download.content_type, "image/png");
        assert_eq!(download.bytes, b"png-bytes");
    }

    #[tokio::test]
    async fn test_download_reports_success_and_failure() {
        let dir = tempfile::tempdir().unwrap();
        let a = artifact("Notre Dame Cathedral!", "x.png", "image/png");

        let ok = Downloader::new(Box::new(StaticFetcher(Some(b"img".to_vec()))));
        assert!(ok.download(&a, dir.path()).await);
        assert_eq!(
            std::fs::read(dir.path().join("notre-dame-cathedral.png")).unwrap(),
            b"img"
        );

        let failing = Downloader::new(Box::new(StaticFetcher(None)));
        assert!(!failing.download(&a, dir.path()).await);
    }

    #[tokio::test]
    async fn test_save_ignores_path_like_file_type() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = Downloader::new(Box::new(StaticFetcher(Some(b"q".to_vec()))));

        let nested = downloader
            .save(&artifact("Quilt", "q.png", "image/png/extra"), dir.path())
            .await
            .unwrap();
        assert_eq!(nested, dir.path().join("quilt.png"));

        let escaped = downloader
            .save(&artifact("Quilt", "q.png", "image/../../escaped"), dir.path())
            .await
            .unwrap();
        assert_eq!(escaped, dir.path().join("quilt.bin"));
        assert_eq!(std::fs::read(&escaped).unwrap(), b"q");
    }

    #[test]
    fn test_missing_file_type_falls_back() {
        let downloader = Downloader::new(Box::new(StaticFetcher(Some(vec![1, 2, 3]))));
        let download = tokio_test::block_on(downloader.fetch(&artifact("Ledger", "l", ""))).unwrap();
        assert_eq!(download.content_type, "application/octet-stream");
        assert_eq!(download.filename, "ledger.bin");
    }
}
