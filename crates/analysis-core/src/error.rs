use thiserror::Error;

/// Errors surfaced to the user by the analysis pipeline.
///
/// `Display` is the user-facing message. Provider causes are logged where the
/// error is produced and never carried in the message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to fetch real-time market sentiment.")]
    SentimentFetch,

    #[error("Authentication error: The provided API key is not valid.")]
    Authentication,

    #[error("API rate limit exceeded. Please wait and try again later.")]
    RateLimit,

    #[error("Failed to get analysis from AI.")]
    AnalysisRequest,

    #[error("The AI returned an analysis in an unexpected format.")]
    AnalysisParse { detail: String },
}

/// Classification of an [`AnalysisError`] without its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    SentimentFetch,
    Authentication,
    RateLimit,
    AnalysisRequest,
    AnalysisParse,
}

impl AnalysisError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AnalysisError::InvalidInput(_) => ErrorKind::InvalidInput,
            AnalysisError::SentimentFetch => ErrorKind::SentimentFetch,
            AnalysisError::Authentication => ErrorKind::Authentication,
            AnalysisError::RateLimit => ErrorKind::RateLimit,
            AnalysisError::AnalysisRequest => ErrorKind::AnalysisRequest,
            AnalysisError::AnalysisParse { .. } => ErrorKind::AnalysisParse,
        }
    }

    /// Message suitable for showing in the UI
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}
