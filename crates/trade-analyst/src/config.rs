use analysis_orchestrator::DEFAULT_MAX_SOURCES;
use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AnalystConfig {
    pub max_sources: usize,         // citations kept per sentiment summary
    pub container_id: String,       // DOM id the chart is mounted in
    pub default_asset: String,      // BTC-USD
    pub popular_assets: Vec<String>,
}

impl AnalystConfig {
    pub fn from_env() -> Result<Self> {
        let config = Self {
            max_sources: match env::var("ANALYSIS_MAX_SOURCES") {
                Ok(v) => v
                    .parse()
                    .with_context(|| format!("ANALYSIS_MAX_SOURCES must be a number, got '{}'", v))?,
                Err(_) => DEFAULT_MAX_SOURCES,
            },
            container_id: env::var("CHART_CONTAINER_ID")
                .unwrap_or_else(|_| "tradingview-chart".to_string()),
            default_asset: env::var("DEFAULT_ASSET").unwrap_or_else(|_| "BTC-USD".to_string()),
            popular_assets: env::var("POPULAR_ASSETS")
                .map(|v| parse_list(&v))
                .unwrap_or_else(|_| default_popular_assets()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.container_id.trim().is_empty() {
            anyhow::bail!("CHART_CONTAINER_ID must not be empty");
        }
        if analysis_core::clean_asset(&self.default_asset).is_none() {
            anyhow::bail!("DEFAULT_ASSET must not be empty");
        }
        Ok(())
    }
}

fn default_popular_assets() -> Vec<String> {
    ["BTC-USD", "ETH-USD", "NVDA", "AAPL", "SPX"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Comma-separated list, blanks dropped.
fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .filter_map(analysis_core::clean_asset)
        .collect()
}
