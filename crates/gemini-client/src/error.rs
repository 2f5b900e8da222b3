use serde::Deserialize;
use thiserror::Error;

/// What kind of failure the provider reported, independent of its wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    Authentication,
    RateLimit,
    Other,
}

#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("Missing API key (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Timeout")]
    Timeout,

    #[error("API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        kind: ProviderErrorKind,
        message: String,
    },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response contained no text")]
    EmptyResponse,
}

impl GeminiError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            GeminiError::Api { kind, .. } => *kind,
            GeminiError::MissingApiKey => ProviderErrorKind::Authentication,
            _ => ProviderErrorKind::Other,
        }
    }

    /// Build an `Api` error from a non-success HTTP response.
    pub fn from_response(status: u16, body: &str) -> Self {
        let envelope = serde_json::from_str::<ApiErrorEnvelope>(body).ok();
        let message = envelope
            .as_ref()
            .map(|e| e.error.message.clone())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| body.trim().to_string());
        let kind = classify(status, envelope.as_ref().map(|e| &e.error), &message);

        GeminiError::Api {
            status,
            kind,
            message,
        }
    }
}

pub type GeminiResult<T> = Result<T, GeminiError>;

/// Google API error payload: `{"error": {"code", "message", "status", "details"}}`
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    details: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    reason: Option<String>,
}

/// Status code and structured fields decide first; the message text is only
/// consulted when neither identifies the failure.
fn classify(status: u16, body: Option<&ApiErrorBody>, message: &str) -> ProviderErrorKind {
    match status {
        401 | 403 => return ProviderErrorKind::Authentication,
        429 => return ProviderErrorKind::RateLimit,
        _ => {}
    }

    if let Some(body) = body {
        match body.status.as_deref() {
            Some("UNAUTHENTICATED") | Some("PERMISSION_DENIED") => {
                return ProviderErrorKind::Authentication
            }
            Some("RESOURCE_EXHAUSTED") => return ProviderErrorKind::RateLimit,
            _ => {}
        }

        for reason in body.details.iter().filter_map(|d| d.reason.as_deref()) {
            match reason {
                "API_KEY_INVALID" | "API_KEY_EXPIRED" => return ProviderErrorKind::Authentication,
                "RATE_LIMIT_EXCEEDED" => return ProviderErrorKind::RateLimit,
                _ => {}
            }
        }
    }

    let text = message.to_lowercase();
    if text.contains("api key not valid") {
        ProviderErrorKind::Authentication
    } else if text.contains("rate limit") {
        ProviderErrorKind::RateLimit
    } else {
        ProviderErrorKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_is_reported_as_400() {
        let body = r#"{
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{"@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID"}]
            }
        }"#;
        let err = GeminiError::from_response(400, body);
        assert_eq!(err.kind(), ProviderErrorKind::Authentication);
        assert!(err.to_string().contains("API key not valid"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(GeminiError::from_response(401, "").kind(), ProviderErrorKind::Authentication);
        assert_eq!(GeminiError::from_response(429, "slow down").kind(), ProviderErrorKind::RateLimit);
        assert_eq!(GeminiError::from_response(500, "boom").kind(), ProviderErrorKind::Other);
    }

    #[test]
    fn test_resource_exhausted() {
        let body = r#"{"error": {"code": 503, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        assert_eq!(GeminiError::from_response(503, body).kind(), ProviderErrorKind::RateLimit);
    }

    #[test]
    fn test_text_fallback() {
        let err = GeminiError::from_response(500, "upstream says: rate limit reached");
        assert_eq!(err.kind(), ProviderErrorKind::RateLimit);

        let err = GeminiError::from_response(500, "<html>bad gateway</html>");
        assert_eq!(err.kind(), ProviderErrorKind::Other);
        assert!(err.to_string().contains("bad gateway"));
    }

    #[test]
    fn test_non_api_errors() {
        assert_eq!(GeminiError::MissingApiKey.kind(), ProviderErrorKind::Authentication);
        assert_eq!(GeminiError::Timeout.kind(), ProviderErrorKind::Other);
        assert_eq!(GeminiError::EmptyResponse.kind(), ProviderErrorKind::Other);
    }
}
