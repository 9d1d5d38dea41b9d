//! Image-generation endpoint
//!
//! The image service is addressed purely by URL: the prompt becomes the last
//! path segment and whatever is served at that address is the image. No
//! request is made here.

use crate::error::{AskverseError, Result};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Default image-generation endpoint
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://image.pollinations.ai/prompt/";

/// Bytes left as-is when encoding a prompt; matches `encodeURIComponent`
const PROMPT_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Deterministic `prompt -> URL` builder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEndpoint {
    base: Url,
}

impl ImageEndpoint {
    /// Parse an endpoint base URL
    ///
    /// # Errors
    ///
    /// Returns a config error if `base` is not an absolute URL that can
    /// carry path segments
    pub fn new(base: &str) -> Result<Self> {
        let base = Url::parse(base).map_err(|e| {
            AskverseError::Config(format!("Invalid image endpoint '{}': {}", base, e))
        })?;

        if base.cannot_be_a_base() || base.query().is_some() || base.fragment().is_some() {
            return Err(
                AskverseError::Config(format!("Image endpoint '{}' cannot take a path", base))
                    .into(),
            );
        }

        Ok(Self { base })
    }

    /// The configured base URL
    pub fn base(&self) -> &str {
        self.base.as_str()
    }

    /// Build the image URL for `prompt`
    ///
    /// The prompt is percent-encoded as a single path segment, so spaces,
    /// slashes, and reserved characters never change the URL structure. The
    /// encoded prompt is appended to the base as text and never normalized,
    /// so dot segments such as `..` are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use askverse::providers::{ImageEndpoint, DEFAULT_IMAGE_ENDPOINT};
    ///
    /// let endpoint = ImageEndpoint::new(DEFAULT_IMAGE_ENDPOINT).unwrap();
    /// assert_eq!(
    ///     endpoint.url_for("a cat"),
    ///     "https://image.pollinations.ai/prompt/a%20cat"
    /// );
    /// ```
    pub fn url_for(&self, prompt: &str) -> String {
        let base = self.base.as_str();
        let separator = if base.ends_with('/') { "" } else { "/" };
        format!(
            "{}{}{}",
            base,
            separator,
            utf8_percent_encode(prompt, PROMPT_SAFE)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_endpoint() -> ImageEndpoint {
        ImageEndpoint::new(DEFAULT_IMAGE_ENDPOINT).unwrap()
    }

    #[test]
    fn test_url_for_percent_encodes_spaces() {
        let endpoint = default_endpoint();
        let url = endpoint.url_for("a cat");
        assert!(url.contains("a%20cat"));
        assert_eq!(url, "https://image.pollinations.ai/prompt/a%20cat");
    }

    #[test]
    fn test_url_for_keeps_slash_inside_segment() {
        let endpoint = default_endpoint();
        let url = endpoint.url_for("red/blue");
        assert_eq!(url, "https://image.pollinations.ai/prompt/red%2Fblue");
    }

    #[test]
    fn test_url_for_encodes_reserved_characters() {
        let endpoint = default_endpoint();
        assert_eq!(
            endpoint.url_for("x&y=z?#"),
            "https://image.pollinations.ai/prompt/x%26y%3Dz%3F%23"
        );
        assert_eq!(
            endpoint.url_for("it's (very) *fun*!~"),
            "https://image.pollinations.ai/prompt/it's%20(very)%20*fun*!~"
        );
    }

    #[test]
    fn test_url_for_keeps_dot_segments() {
        let endpoint = default_endpoint();
        assert_eq!(endpoint.url_for(".."), "https://image.pollinations.ai/prompt/..");
        assert_eq!(endpoint.url_for("."), "https://image.pollinations.ai/prompt/.");
    }

    #[test]
    fn test_url_for_encodes_non_ascii() {
        let endpoint = default_endpoint();
        assert_eq!(
            endpoint.url_for("café"),
            "https://image.pollinations.ai/prompt/caf%C3%A9"
        );
    }

    #[test]
    fn test_url_for_is_deterministic() {
        let endpoint = default_endpoint();
        assert_eq!(endpoint.url_for("sunset"), endpoint.url_for("sunset"));
    }

    #[test]
    fn test_base_without_trailing_slash() {
        let endpoint = ImageEndpoint::new("http://localhost:8080/prompt").unwrap();
        assert_eq!(endpoint.url_for("dog"), "http://localhost:8080/prompt/dog");
    }

    #[test]
    fn test_new_rejects_invalid_urls() {
        assert!(ImageEndpoint::new("not a url").is_err());
        assert!(ImageEndpoint::new("mailto:someone@example.com").is_err());
        assert!(ImageEndpoint::new("https://example.com/prompt?size=1").is_err());
    }
}
