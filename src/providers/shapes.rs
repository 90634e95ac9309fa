use crate::core::{ProviderError, ProviderResult};
use crate::utils::{dedup_urls, ensure_https};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response layouts the known parse services answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResponseShape {
    /// `{code: 200, data: {video_url, play_url, parse_time, additional_data: [..]}}`
    VideoData,
    /// `{success: true, media_type: "video", items: [{url}], author: {..}, title}`
    MediaItems,
    /// `{code: 200, data: {url, author, title, avatar}}`
    FlatData,
}

impl ResponseShape {
    pub fn normalize(&self, raw: &Value) -> Result<ProviderResult, ProviderError> {
        match self {
            ResponseShape::VideoData => normalize_video_data(raw),
            ResponseShape::MediaItems => normalize_media_items(raw),
            ResponseShape::FlatData => normalize_flat_data(raw),
        }
    }
}

/// Avatar as providers send it: a bare URL or an object listing size variants.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Avatar {
    Url(String),
    Variants {
        #[serde(default, rename = "urlList", alias = "url_list")]
        url_list: Vec<String>,
    },
}

impl Avatar {
    pub fn into_url(self) -> Option<String> {
        match self {
            Avatar::Url(url) => non_empty(Some(url)),
            Avatar::Variants { url_list } => url_list.into_iter().find(|u| !u.is_empty()),
        }
    }
}

// Only the marker and media URL fields are typed strictly; descriptive
// fields stay as raw values so an odd type degrades to a placeholder.

#[derive(Debug, Deserialize)]
struct VideoDataResponse {
    code: Option<i64>,
    data: Option<VideoData>,
}

#[derive(Debug, Deserialize)]
struct VideoData {
    video_url: Option<String>,
    play_url: Option<String>,
    parse_time: Option<Value>,
    additional_data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct AdditionalData {
    nickname: Option<Value>,
    signature: Option<Value>,
    desc: Option<Value>,
    url: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct MediaItemsResponse {
    success: Option<bool>,
    media_type: Option<String>,
    items: Option<Vec<Value>>,
    author: Option<Value>,
    title: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemsAuthor {
    nickname: Option<Value>,
    avatar: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FlatDataResponse {
    code: Option<i64>,
    data: Option<FlatData>,
}

#[derive(Debug, Deserialize)]
struct FlatData {
    url: Option<String>,
    author: Option<Value>,
    title: Option<Value>,
    avatar: Option<Value>,
}

fn parse<'a, T: Deserialize<'a>>(raw: &'a Value) -> Result<T, ProviderError> {
    T::deserialize(raw).map_err(|e| ProviderError::shape(e.to_string()))
}

/// Deserializes an optional sub-object, treating a wrong type as absent.
fn lenient<T: DeserializeOwned>(value: Option<Value>) -> Option<T> {
    value.and_then(|v| serde_json::from_value(v).ok())
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|s| !s.trim().is_empty())
}

fn expect_ok_code(code: Option<i64>) -> Result<(), ProviderError> {
    match code {
        Some(200) => Ok(()),
        Some(other) => Err(ProviderError::shape(format!("status code {}", other))),
        None => Err(ProviderError::shape("missing status code")),
    }
}

fn scalar_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => non_empty(Some(s)),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn avatar_url(value: Option<Value>) -> String {
    lenient::<Avatar>(value)
        .and_then(Avatar::into_url)
        .unwrap_or_default()
}

fn normalize_video_data(raw: &Value) -> Result<ProviderResult, ProviderError> {
    let response: VideoDataResponse = parse(raw)?;
    expect_ok_code(response.code)?;
    let data = response
        .data
        .ok_or_else(|| ProviderError::shape("missing data"))?;

    let video_url = non_empty(data.video_url).map(|u| ensure_https(&u));
    let play_url = non_empty(data.play_url).map(|u| ensure_https(&u));
    let media_url = video_url
        .clone()
        .or_else(|| play_url.clone())
        .ok_or(ProviderError::MissingMediaUrl)?;

    let mut result = ProviderResult::new(media_url);
    result.backup_urls = dedup_urls(&result.media_url, video_url.into_iter().chain(play_url));
    if let Some(parse_time) = scalar_text(data.parse_time) {
        result.parse_timestamp = parse_time;
    }

    let extra: AdditionalData = match data.additional_data {
        Some(Value::Array(list)) => lenient(list.into_iter().next()).unwrap_or_default(),
        _ => AdditionalData::default(),
    };
    if let Some(nickname) = scalar_text(extra.nickname) {
        result.author_name = nickname;
    }
    result.author_signature = scalar_text(extra.signature).unwrap_or_default();
    result.description = scalar_text(extra.desc).unwrap_or_default();
    result.author_avatar_url = avatar_url(extra.url);

    Ok(result)
}

fn normalize_media_items(raw: &Value) -> Result<ProviderResult, ProviderError> {
    let response: MediaItemsResponse = parse(raw)?;
    if response.success != Some(true) {
        return Err(ProviderError::shape("success flag not set"));
    }
    if response.media_type.as_deref() != Some("video") {
        return Err(ProviderError::shape(format!(
            "media type {}",
            response.media_type.as_deref().unwrap_or("missing")
        )));
    }
    let items = response.items.unwrap_or_default();
    let mut urls = items.iter().map(|item| {
        item.get("url")
            .and_then(Value::as_str)
            .filter(|u| !u.trim().is_empty())
            .map(ensure_https)
    });

    let media_url = urls
        .next()
        .ok_or_else(|| ProviderError::shape("no items"))?
        .ok_or(ProviderError::MissingMediaUrl)?;

    let mut result = ProviderResult::new(media_url);
    result.backup_urls = dedup_urls(&result.media_url, urls.flatten());
    result.description = scalar_text(response.title).unwrap_or_default();

    let author: ItemsAuthor = lenient(response.author).unwrap_or_default();
    if let Some(nickname) = scalar_text(author.nickname) {
        result.author_name = nickname;
    }
    result.author_avatar_url = avatar_url(author.avatar);

    Ok(result)
}

fn normalize_flat_data(raw: &Value) -> Result<ProviderResult, ProviderError> {
    let response: FlatDataResponse = parse(raw)?;
    expect_ok_code(response.code)?;
    let data = response
        .data
        .ok_or_else(|| ProviderError::shape("missing data"))?;

    let media_url = non_empty(data.url)
        .map(|u| ensure_https(&u))
        .ok_or(ProviderError::MissingMediaUrl)?;

    let mut result = ProviderResult::new(media_url);
    if let Some(author) = scalar_text(data.author) {
        result.author_name = author;
    }
    result.description = scalar_text(data.title).unwrap_or_default();
    result.author_avatar_url = avatar_url(data.avatar);

    Ok(result)
}
