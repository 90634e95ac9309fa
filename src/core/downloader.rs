use crate::core::ProviderResult;
use crate::utils::proxied_url;
use anyhow::{Context, Result};
use futures::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Saves resolved media to disk, walking the primary and backup URLs in order.
pub struct Downloader {
    client: reqwest::Client,
    pub retries: u32,
    pub proxy: Option<String>,
    pub backoff: Duration,
}

impl Downloader {
    pub fn new(client: reqwest::Client, retries: u32) -> Self {
        Self {
            client,
            retries: retries.max(1),
            proxy: None,
            backoff: Duration::from_secs(1),
        }
    }

    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// The URL actually requested for a media URL, after proxy wrapping.
    pub fn fetch_url(&self, media_url: &str) -> String {
        match &self.proxy {
            Some(proxy) => proxied_url(proxy, media_url),
            None => media_url.to_string(),
        }
    }

    /// Returns the media URL that succeeded.
    ///
    /// Bytes land in `<output>.part` and are renamed over `output_path` only
    /// once the body is complete, so an existing file is never resumed.
    pub async fn download(&self, result: &ProviderResult, output_path: &Path) -> Result<String> {
        let mut errors = Vec::new();

        for media_url in result.candidate_urls() {
            info!("Downloading {}", media_url);
            match self.download_url(&self.fetch_url(media_url), output_path).await {
                Ok(()) => {
                    info!("Downloaded to: {}", output_path.display());
                    return Ok(media_url.to_string());
                }
                Err(e) => {
                    warn!("Download from {} failed: {}", media_url, e);
                    errors.push(format!("{}: {}", media_url, e));
                }
            }
        }

        anyhow::bail!("every media URL failed:\n  {}", errors.join("\n  "));
    }

    async fn download_url(&self, url: &str, output_path: &Path) -> Result<()> {
        let part = PartFile::for_output(output_path);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let resume_from = part.resumable_size(url).await;

            let mut request = self
                .client
                .get(url)
                .header("Accept", "*/*")
                .header("Accept-Encoding", "identity");
            if let Some(resume_pos) = resume_from {
                request = request.header("Range", format!("bytes={}-", resume_pos));
            }

            let response = match request.send().await {
                Ok(response) => response,
                Err(e) => {
                    if attempt >= self.retries {
                        return Err(e.into());
                    }
                    warn!("Request failed (attempt {}): {}", attempt, e);
                    tokio::time::sleep(self.backoff_for(attempt)).await;
                    continue;
                }
            };

            let status = response.status();
            if status.is_success() {
                // A 200 to a ranged request means the server ignored the range.
                let resume = resume_from.filter(|_| status.as_u16() == 206);
                match self.write_body(response, &part, url, resume).await {
                    Ok(()) => return part.finish(output_path).await,
                    Err(e) if attempt < self.retries => {
                        warn!("Transfer interrupted (attempt {}): {}", attempt, e);
                        tokio::time::sleep(self.backoff_for(attempt)).await;
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            } else if status.as_u16() == 403 && attempt < self.retries {
                warn!("HTTP 403 (attempt {}), retrying", attempt);
                tokio::time::sleep(self.backoff_for(attempt)).await;
                continue;
            } else if status.as_u16() == 416 && resume_from.is_some() {
                info!("File already complete");
                return part.finish(output_path).await;
            } else {
                anyhow::bail!("HTTP {} after {} attempts", status, attempt);
            }
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.backoff * 2_u32.saturating_pow(attempt - 1)
    }

    async fn write_body(
        &self,
        response: reqwest::Response,
        part: &PartFile,
        url: &str,
        resume_from: Option<u64>,
    ) -> Result<()> {
        let expected_total = response
            .content_length()
            .map(|len| len + resume_from.unwrap_or(0));
        let mut downloaded = resume_from.unwrap_or(0);

        let mut file = match resume_from {
            Some(pos) => {
                info!("Resuming from {} bytes", pos);
                OpenOptions::new().append(true).open(&part.data).await?
            }
            None => part.start(url).await?,
        };

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    file.flush().await?;
                    return Err(e.into());
                }
            };
            downloaded += chunk.len() as u64;
            file.write_all(&chunk).await?;

            // Progress goes to stderr so stdout stays machine-readable.
            if let Some(total) = expected_total.filter(|t| *t > 0) {
                let progress = (downloaded as f64 / total as f64 * 100.0) as u32;
                eprint!("\rProgress: {}% ({}/{} bytes)", progress, downloaded, total);
                std::io::stderr().flush()?;
            }
        }

        if expected_total.is_some() {
            eprintln!();
        }
        file.flush().await?;

        if let Some(total) = expected_total {
            if downloaded < total {
                anyhow::bail!("body ended after {} of {} bytes", downloaded, total);
            }
        }
        Ok(())
    }
}

/// In-progress download: `<output>.part` plus `<output>.part.url`, which
/// records the URL the bytes came from.
struct PartFile {
    data: PathBuf,
    source: PathBuf,
}

impl PartFile {
    fn for_output(output_path: &Path) -> Self {
        let mut data = output_path.as_os_str().to_owned();
        data.push(".part");
        let mut source = data.clone();
        source.push(".url");
        Self {
            data: PathBuf::from(data),
            source: PathBuf::from(source),
        }
    }

    /// Bytes already on disk for `url`. A part file left by another URL,
    /// or one without a source record, is not resumable.
    async fn resumable_size(&self, url: &str) -> Option<u64> {
        let source = tokio::fs::read_to_string(&self.source).await.ok()?;
        if source != url {
            return None;
        }
        match tokio::fs::metadata(&self.data).await {
            Ok(metadata) if metadata.len() > 0 => Some(metadata.len()),
            _ => None,
        }
    }

    async fn start(&self, url: &str) -> Result<File> {
        let file = File::create(&self.data).await?;
        tokio::fs::write(&self.source, url).await?;
        Ok(file)
    }

    async fn finish(&self, output_path: &Path) -> Result<()> {
        tokio::fs::rename(&self.data, output_path)
            .await
            .with_context(|| format!("Failed to move download to {}", output_path.display()))?;
        let _ = tokio::fs::remove_file(&self.source).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_url_through_proxy() {
        let downloader = Downloader::new(reqwest::Client::new(), 3)
            .with_proxy(Some("https://relay.example".to_string()));
        assert_eq!(
            downloader.fetch_url("https://x/a.mp4"),
            "https://relay.example?url=https%3A%2F%2Fx%2Fa.mp4"
        );

        let direct = Downloader::new(reqwest::Client::new(), 3);
        assert_eq!(direct.fetch_url("https://x/a.mp4"), "https://x/a.mp4");
    }

    #[test]
    fn test_backoff_doubles() {
        let downloader =
            Downloader::new(reqwest::Client::new(), 0).with_backoff(Duration::from_millis(10));
        assert_eq!(downloader.retries, 1);
        assert_eq!(downloader.backoff_for(1), Duration::from_millis(10));
        assert_eq!(downloader.backoff_for(3), Duration::from_millis(40));
    }

    #[test]
    fn test_part_file_paths() {
        let part = PartFile::for_output(Path::new("/tmp/clip.mp4"));
        assert_eq!(part.data, PathBuf::from("/tmp/clip.mp4.part"));
        assert_eq!(part.source, PathBuf::from("/tmp/clip.mp4.part.url"));
    }
}
