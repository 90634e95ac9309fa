use crate::utils::extract_first_url;

/// One user-supplied input: a bare link or a share message with a link in it.
#[derive(Debug, Clone)]
pub struct ParseRequest {
    pub raw: String,
}

impl ParseRequest {
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The URL every provider is asked about.
    ///
    /// Falls back to the trimmed input when it contains no http(s) token, so
    /// providers that accept bare share codes still get a chance.
    pub fn effective_url(&self) -> Option<&str> {
        if let Some(url) = extract_first_url(&self.raw) {
            return Some(url);
        }
        let trimmed = self.raw.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_url_from_share_text() {
        let request = ParseRequest::new("check this out https://platform.example/v/123 thanks");
        assert_eq!(request.effective_url(), Some("https://platform.example/v/123"));
    }

    #[test]
    fn test_effective_url_without_link() {
        assert_eq!(ParseRequest::new("  7Xy9Qa  ").effective_url(), Some("7Xy9Qa"));
        assert_eq!(ParseRequest::new(" \n\t").effective_url(), None);
    }
}
