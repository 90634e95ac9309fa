use crate::config::Config;
use crate::core::{Downloader, Resolution, ResolutionError};
use crate::providers::{build_download_client, resolver_from_config};
use crate::utils::{download_filename, proxied_url};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "share-resolve")]
#[command(about = "Resolve short-video share links to direct, watermark-free media URLs")]
#[command(version)]
pub struct Cli {
    /// Share link, or pasted share text containing one
    #[arg(value_name = "INPUT", required_unless_present = "dump_config")]
    pub input: Vec<String>,

    /// Configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Download the media after resolving it
    #[arg(short, long)]
    pub download: bool,

    /// Output directory for downloads
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Output filename (defaults to one derived from the description)
    #[arg(short = 'n', long)]
    pub output_name: Option<String>,

    /// Relay proxy for media URLs, overrides the config file
    #[arg(long, value_name = "URL")]
    pub proxy: Option<String>,

    /// Query all providers at once and keep the first answer
    #[arg(long)]
    pub race: bool,

    /// Per-provider timeout in seconds
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub dump_config: bool,
}

impl Cli {
    pub fn input_text(&self) -> String {
        self.input.join(" ")
    }

    /// Applies command-line overrides on top of the loaded configuration.
    pub fn effective_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(proxy) = &self.proxy {
            config.proxy = Some(proxy.clone());
        }
        if self.race {
            config.policy = crate::core::FallbackPolicy::Race;
        }
        if let Some(secs) = self.timeout {
            config.attempt_timeout = Some(secs);
        }
        config.validate()?;
        Ok(config)
    }

    pub async fn run(&self) -> Result<()> {
        let config = self.effective_config()?;

        if self.dump_config {
            print!("{}", config.to_toml()?);
            return Ok(());
        }

        let resolver = resolver_from_config(&config)?;
        let resolution = match resolver.resolve(&self.input_text()).await {
            Ok(resolution) => resolution,
            Err(ResolutionError::Exhausted { failures }) => {
                for failure in &failures {
                    eprintln!("  {}", failure);
                }
                return Err(ResolutionError::Exhausted { failures }.into());
            }
            Err(e) => return Err(e.into()),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&resolution.result)?);
        } else {
            self.print_resolution(&resolution, config.proxy.as_deref());
        }

        if self.download {
            let filename = match &self.output_name {
                Some(name) => PathBuf::from(name),
                None => download_filename(&resolution.result.description),
            };
            let output_path = self.output.join(filename);

            let downloader = Downloader::new(build_download_client(&config)?, config.retries)
                .with_proxy(config.proxy.clone());
            let used = downloader.download(&resolution.result, &output_path).await?;

            if !self.json {
                println!("Saved {} from {}", output_path.display(), used);
            }
        }

        Ok(())
    }

    fn print_resolution(&self, resolution: &Resolution, proxy: Option<&str>) {
        let result = &resolution.result;

        println!("Provider: {}", resolution.provider);
        println!("Media URL: {}", result.media_url);
        if let Some(proxy) = proxy {
            println!("Proxied: {}", proxied_url(proxy, &result.media_url));
        }
        for (i, url) in result.backup_urls.iter().enumerate() {
            println!("  Backup {}: {}", i + 1, url);
        }
        println!("Author: {}", result.author_name);
        if !result.author_avatar_url.is_empty() {
            println!("Avatar: {}", result.author_avatar_url);
        }
        if !result.author_signature.is_empty() {
            println!("Signature: {}", result.author_signature);
        }
        if !result.description.is_empty() {
            println!("Description: {}", result.description);
        }
        println!("Parse time: {}", result.parse_timestamp);

        if self.verbose && !resolution.failures.is_empty() {
            println!("Failed before success:");
            for failure in &resolution.failures {
                println!("  {}", failure);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FallbackPolicy;

    #[test]
    fn test_share_text_words_are_joined() {
        let cli = Cli::parse_from(["share-resolve", "look", "https://v.example/1", "wow"]);
        assert_eq!(cli.input_text(), "look https://v.example/1 wow");
    }

    #[test]
    fn test_overrides_apply() {
        let cli = Cli::parse_from([
            "share-resolve",
            "--race",
            "--timeout",
            "5",
            "--proxy",
            "https://relay.example",
            "https://v.example/1",
        ]);
        let config = cli.effective_config().unwrap();
        assert_eq!(config.policy, FallbackPolicy::Race);
        assert_eq!(config.attempt_timeout, Some(5));
        assert_eq!(config.proxy.as_deref(), Some("https://relay.example"));
    }

    #[test]
    fn test_input_required_unless_dumping_config() {
        assert!(Cli::try_parse_from(["share-resolve"]).is_err());
        assert!(Cli::try_parse_from(["share-resolve", "--dump-config"]).is_ok());
    }
}
