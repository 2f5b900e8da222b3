use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Chart timeframe selectable by the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "1h")]
    Hour1,
    #[serde(rename = "4h")]
    Hour4,
    #[default]
    #[serde(rename = "1D")]
    Day1,
    #[serde(rename = "1W")]
    Week1,
}

impl Timeframe {
    /// All timeframes in the order they are offered to the user.
    pub const ALL: [Timeframe; 6] = [
        Timeframe::Minute5,
        Timeframe::Minute15,
        Timeframe::Hour1,
        Timeframe::Hour4,
        Timeframe::Day1,
        Timeframe::Week1,
    ];

    /// Short label as shown in the timeframe selector ("5m", "1D", ...)
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Minute5 => "5m",
            Timeframe::Minute15 => "15m",
            Timeframe::Hour1 => "1h",
            Timeframe::Hour4 => "4h",
            Timeframe::Day1 => "1D",
            Timeframe::Week1 => "1W",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Timeframe::ALL
            .iter()
            .copied()
            .find(|tf| tf.as_str() == s.trim())
            .ok_or_else(|| format!("unknown timeframe '{}'", s))
    }
}

/// Trim user input into an asset ticker. Empty input yields `None`.
pub fn clean_asset(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Web citation backing a sentiment summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub uri: String,
    pub title: String,
}

/// Sentiment summary grounded on a web search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSentiment {
    pub summary: String,
    pub sources: Vec<Source>,
}

/// Trade direction recommended by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Long,
    Short,
    Neutral,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Long => "LONG",
            Recommendation::Short => "SHORT",
            Recommendation::Neutral => "NEUTRAL",
        }
    }

    /// Spanish label shown next to the recommendation badge
    pub fn label_es(&self) -> &'static str {
        match self {
            Recommendation::Long => "COMPRA (LARGO)",
            Recommendation::Short => "VENTA (CORTO)",
            Recommendation::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFactors {
    pub sentiment: String,
    pub technical: String,
}

/// Structured technical analysis as returned by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalAnalysis {
    pub recommendation: Recommendation,
    pub confidence: f64, // 0 to 100
    pub summary: String,
    pub key_factors: KeyFactors,
}

/// Final analysis: technical result merged with the live sentiment it was based on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(flatten)]
    pub technical: TechnicalAnalysis,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_sentiment: Option<LiveSentiment>,
}

impl AnalysisResult {
    pub fn new(technical: TechnicalAnalysis, live_sentiment: LiveSentiment) -> Self {
        Self {
            technical,
            live_sentiment: Some(live_sentiment),
        }
    }

    pub fn recommendation(&self) -> Recommendation {
        self.technical.recommendation
    }

    pub fn confidence(&self) -> f64 {
        self.technical.confidence
    }
}
