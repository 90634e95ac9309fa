use regex::Regex;
use std::path::PathBuf;

const MAX_FILENAME_CHARS: usize = 50;

/// Returns the first `http://` or `https://` token in free text.
pub fn extract_first_url(text: &str) -> Option<&str> {
    let re = Regex::new(r"https?://[^\s]+").ok()?;
    re.find(text).map(|m| m.as_str())
}

/// Rewrites a leading `http:` scheme to `https:`; anything else is returned as is.
pub fn ensure_https(url: &str) -> String {
    match url.strip_prefix("http:") {
        Some(rest) => format!("https:{}", rest),
        None => url.to_string(),
    }
}

/// Keeps the first occurrence of every non-empty URL that differs from `primary`.
pub fn dedup_urls<I>(primary: &str, urls: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut kept: Vec<String> = Vec::new();
    for url in urls {
        if url.is_empty() || url == primary || kept.contains(&url) {
            continue;
        }
        kept.push(url);
    }
    kept
}

/// Wraps a media URL for a relay that takes the target in its `url` query parameter.
pub fn proxied_url(proxy: &str, url: &str) -> String {
    let separator = if proxy.contains('?') { '&' } else { '?' };
    format!("{}{}url={}", proxy, separator, urlencoding::encode(url))
}

pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' => c,
            '\u{4e00}'..='\u{9fa5}' => c,
            _ => '_',
        })
        .take(MAX_FILENAME_CHARS)
        .collect()
}

pub fn download_filename(description: &str) -> PathBuf {
    let stem = if description.trim().is_empty() {
        "video".to_string()
    } else {
        sanitize_filename(description)
    };
    PathBuf::from(format!("{}.mp4", stem))
}
