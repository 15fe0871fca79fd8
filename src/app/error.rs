use thiserror::Error;

/// Failure taxonomy for the enrichment pipeline.
///
/// [`BlockedUrl`](EnrichError::BlockedUrl) is the only terminal category:
/// it is reported to the caller verbatim and never retried. Every other
/// category is either swallowed by the sync path (soft defer) or mapped to
/// a fixed user-safe message before persistence by the async path.
#[derive(Error, Debug)]
pub enum EnrichError {
    #[error("URL blocked: {0}")]
    BlockedUrl(String),

    #[error("response body exceeded {limit} bytes")]
    TooLarge { limit: usize },

    #[error("stopped after {0} redirects")]
    TooManyRedirects(usize),

    #[error("operation timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("invalid image data: {0}")]
    InvalidImage(String),

    #[error("render failed: {0}")]
    Render(String),

    #[error("storage error: {0}")]
    Storage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EnrichError>;

impl EnrichError {
    /// Fixed, user-safe message for persistence and API surfaces.
    ///
    /// Raw error text (which may echo attacker-controlled URLs or internal
    /// addresses) must never be stored; callers persist this instead.
    pub fn user_message(&self) -> &'static str {
        match self {
            EnrichError::BlockedUrl(_) => "URL blocked.",
            EnrichError::TooLarge { .. } => "Page too large to fetch.",
            EnrichError::TooManyRedirects(_) => "Too many redirects.",
            EnrichError::Timeout => "Fetch timed out.",
            EnrichError::Http(_) | EnrichError::UpstreamStatus(_) | EnrichError::InvalidUrl(_) => {
                "Failed to fetch page."
            }
            _ => "Enrichment failed.",
        }
    }

    /// True for failures that must never be retried.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnrichError::BlockedUrl(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_fixed_strings() {
        assert_eq!(
            EnrichError::BlockedUrl("10.0.0.1".into()).user_message(),
            "URL blocked."
        );
        assert_eq!(
            EnrichError::TooLarge { limit: 1024 }.user_message(),
            "Page too large to fetch."
        );
        assert_eq!(
            EnrichError::TooManyRedirects(5).user_message(),
            "Too many redirects."
        );
        assert_eq!(EnrichError::Timeout.user_message(), "Fetch timed out.");
        assert_eq!(
            EnrichError::UpstreamStatus(503).user_message(),
            "Failed to fetch page."
        );
        assert_eq!(
            EnrichError::Render("chrome crashed".into()).user_message(),
            "Enrichment failed."
        );
    }

    #[test]
    fn test_only_blocked_url_is_terminal() {
        assert!(EnrichError::BlockedUrl("x".into()).is_terminal());
        assert!(!EnrichError::Timeout.is_terminal());
        assert!(!EnrichError::TooLarge { limit: 1 }.is_terminal());
        assert!(!EnrichError::Other("boom".into()).is_terminal());
    }

    #[test]
    fn test_user_message_never_echoes_raw_detail() {
        let err = EnrichError::BlockedUrl("http://169.254.169.254/latest".into());
        assert!(!err.user_message().contains("169.254"));
    }
}
