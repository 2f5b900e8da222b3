use analysis_core::Timeframe;
use serde_json::{json, Value};

/// Language every descriptive field of the analysis is written in.
pub const RESPONSE_LANGUAGE: &str = "Spanish";

pub fn sentiment_prompt(asset: &str) -> String {
    format!(
        "As a financial market analyst, what is the current market sentiment for the asset {asset} \
         based on the latest web search results? Provide a brief, one-paragraph summary. \
         Your response should be in {RESPONSE_LANGUAGE}."
    )
}

pub fn technical_analysis_prompt(asset: &str, timeframe: Timeframe, sentiment_summary: &str) -> String {
    format!(
        r#"You are an expert financial analyst.
A user is viewing the chart for {asset} on a {timeframe} timeframe.
The current market sentiment, based on real-time web data, is: "{sentiment_summary}".

Considering this sentiment, perform a detailed technical analysis based on the known, recent price action for this asset.
Identify key patterns, support/resistance levels, trendlines, and candlestick formations.
Provide a trade recommendation (LONG, SHORT, or NEUTRAL), a confidence score from 0 to 100, a summary, and key technical/sentiment factors.
The 'sentiment' key factor should be your interpretation of how the provided sentiment impacts the technical outlook.

**IMPORTANT**: Your response must be in JSON format. All descriptive text fields (summary, keyFactors.sentiment, keyFactors.technical) MUST be written in {RESPONSE_LANGUAGE}.
Your analysis must be specific and relevant to the asset's recent, publicly known behavior. Do not give generic advice."#
    )
}

/// Response schema for the structured technical analysis (Gemini OpenAPI subset).
pub fn technical_analysis_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "recommendation": {
                "type": "STRING",
                "enum": ["LONG", "SHORT", "NEUTRAL"],
                "description": "The trade recommendation."
            },
            "confidence": {
                "type": "NUMBER",
                "description": "Confidence level for the recommendation, from 0 to 100."
            },
            "summary": {
                "type": "STRING",
                "description": format!("A brief explanation of the reasoning behind the recommendation, in {RESPONSE_LANGUAGE}.")
            },
            "keyFactors": {
                "type": "OBJECT",
                "properties": {
                    "sentiment": {
                        "type": "STRING",
                        "description": format!("Analysis of market sentiment and its impact on technicals, in {RESPONSE_LANGUAGE}.")
                    },
                    "technical": {
                        "type": "STRING",
                        "description": format!("Analysis of technical indicators and chart patterns based on recent price action, in {RESPONSE_LANGUAGE}.")
                    }
                },
                "required": ["sentiment", "technical"]
            }
        },
        "required": ["recommendation", "confidence", "summary", "keyFactors"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_prompt_mentions_asset_and_language() {
        let prompt = sentiment_prompt("BTC-USD");
        assert!(prompt.contains("BTC-USD"));
        assert!(prompt.contains("one-paragraph"));
        assert!(prompt.contains("Spanish"));
    }

    #[test]
    fn test_technical_prompt_embeds_context() {
        let prompt = technical_analysis_prompt("NVDA", Timeframe::Hour4, "optimismo moderado");
        assert!(prompt.contains("chart for NVDA on a 4h timeframe"));
        assert!(prompt.contains("\"optimismo moderado\""));
        assert!(prompt.contains("LONG, SHORT, or NEUTRAL"));
    }

    #[test]
    fn test_schema_requires_key_factors() {
        let schema = technical_analysis_schema();
        assert_eq!(schema["properties"]["recommendation"]["enum"][2], "NEUTRAL");
        assert_eq!(schema["properties"]["keyFactors"]["required"], json!(["sentiment", "technical"]));
        assert_eq!(
            schema["required"],
            json!(["recommendation", "confidence", "summary", "keyFactors"])
        );
    }
}
