use analysis_core::Timeframe;
use serde::Serialize;
use thiserror::Error;

use crate::symbol::{normalize_interval, normalize_symbol};

const WIDGET_SCRIPT_URL: &str = "https://s3.tradingview.com/tv.js";

#[derive(Error, Debug, PartialEq)]
pub enum WidgetError {
    #[error("Chart container id is missing")]
    MissingContainer,

    #[error("Invalid chart container id: {0}")]
    InvalidContainer(String),

    #[error("Cannot chart an empty symbol")]
    EmptySymbol,

    #[error("Render failed: {0}")]
    RenderFailed(String),
}

/// Options passed to the charting widget constructor
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetConfig {
    pub autosize: bool,
    pub symbol: String,
    pub interval: String,
    pub timezone: String,
    pub theme: String,
    pub style: String,
    pub locale: String,
    pub toolbar_bg: String,
    pub enable_publishing: bool,
    /// Symbol changes are driven by our own search input
    pub allow_symbol_change: bool,
    pub container_id: String,
    pub hide_side_toolbar: bool,
}

impl WidgetConfig {
    pub fn new(symbol: String, interval: &str, container_id: &str) -> Self {
        Self {
            autosize: true,
            symbol,
            interval: interval.to_string(),
            timezone: "Etc/UTC".to_string(),
            theme: "dark".to_string(),
            style: "1".to_string(),
            locale: "es".to_string(),
            toolbar_bg: "#1f2937".to_string(),
            enable_publishing: false,
            allow_symbol_change: false,
            container_id: container_id.to_string(),
            hide_side_toolbar: false,
        }
    }

    /// Build the config for an asset/timeframe pair using the widget's naming.
    pub fn for_asset(asset: &str, timeframe: Timeframe, container_id: &str) -> Self {
        Self::new(normalize_symbol(asset), normalize_interval(timeframe), container_id)
    }
}

/// Rendering surface for the third-party chart.
pub trait ChartWidget {
    fn render(&mut self, config: &WidgetConfig) -> Result<(), WidgetError>;

    fn destroy(&mut self);
}

/// Keeps one chart widget in sync with the selected asset and timeframe.
///
/// The previous widget is always destroyed before a new one is rendered, so a
/// container never holds two charts.
pub struct ChartController<W: ChartWidget> {
    widget: W,
    container_id: String,
    /// Normalized symbol and timeframe of the rendered chart
    current: Option<(String, Timeframe)>,
}

impl<W: ChartWidget> ChartController<W> {
    pub fn new(widget: W, container_id: impl Into<String>) -> Self {
        Self {
            widget,
            container_id: container_id.into(),
            current: None,
        }
    }

    /// Render the chart for `asset`/`timeframe`.
    ///
    /// Returns `Ok(false)` when that pair is already on screen.
    pub fn show(&mut self, asset: &str, timeframe: Timeframe) -> Result<bool, WidgetError> {
        if self.container_id.trim().is_empty() {
            return Err(WidgetError::MissingContainer);
        }
        let asset = asset.trim();
        if asset.is_empty() {
            return Err(WidgetError::EmptySymbol);
        }

        let config = WidgetConfig::for_asset(asset, timeframe, &self.container_id);
        if let Some((shown_symbol, shown_tf)) = &self.current {
            if *shown_symbol == config.symbol && *shown_tf == timeframe {
                return Ok(false);
            }
        }

        self.close();

        tracing::debug!(
            "Rendering chart {} @ {} in #{}",
            config.symbol,
            config.interval,
            config.container_id
        );
        self.widget.render(&config)?;
        self.current = Some((config.symbol.clone(), timeframe));
        Ok(true)
    }

    /// Destroy the widget if one is rendered.
    pub fn close(&mut self) {
        if self.current.take().is_some() {
            self.widget.destroy();
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }
}

impl<W: ChartWidget> Drop for ChartController<W> {
    fn drop(&mut self) {
        self.close();
    }
}

/// Widget that renders an HTML embed snippet instead of a live chart.
#[derive(Debug, Default)]
pub struct HtmlEmbedWidget {
    html: Option<String>,
}

impl HtmlEmbedWidget {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snippet for the currently rendered chart, if any.
    pub fn html(&self) -> Option<&str> {
        self.html.as_deref()
    }
}

impl ChartWidget for HtmlEmbedWidget {
    fn render(&mut self, config: &WidgetConfig) -> Result<(), WidgetError> {
        let id = &config.container_id;
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(WidgetError::InvalidContainer(id.clone()));
        }

        let options = serde_json::to_string(config)
            .map(|json| escape_script_json(&json))
            .map_err(|e| WidgetError::RenderFailed(e.to_string()))?;

        self.html = Some(format!(
            "<div id=\"{id}\"></div>\n<script src=\"{WIDGET_SCRIPT_URL}\"></script>\n<script>new TradingView.widget({options});</script>"
        ));
        Ok(())
    }

    fn destroy(&mut self) {
        self.html = None;
    }
}

/// Make JSON safe to inline in a `<script>` element. The escapes are still
/// valid JSON string escapes, so the widget sees the same values.
fn escape_script_json(json: &str) -> String {
    json.replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingWidget {
        renders: Vec<WidgetConfig>,
        destroyed: usize,
        live: usize,
    }

    impl ChartWidget for RecordingWidget {
        fn render(&mut self, config: &WidgetConfig) -> Result<(), WidgetError> {
            self.renders.push(config.clone());
            self.live += 1;
            Ok(())
        }

        fn destroy(&mut self) {
            self.destroyed += 1;
            self.live -= 1;
        }
    }

    #[test]
    fn test_show_renders_normalized_values() {
        let mut chart = ChartController::new(RecordingWidget::default(), "chart");
        assert!(chart.show("btc-usd", Timeframe::Hour4).unwrap());

        let config = &chart.widget().renders[0];
        assert_eq!(config.symbol, "COINBASE:BTCUSD");
        assert_eq!(config.interval, "240");
        assert_eq!(config.container_id, "chart");
        assert!(!config.allow_symbol_change);
    }

    #[test]
    fn test_changing_selection_replaces_widget() {
        let mut chart = ChartController::new(RecordingWidget::default(), "chart");
        chart.show("NVDA", Timeframe::Day1).unwrap();
        chart.show("NVDA", Timeframe::Week1).unwrap();
        chart.show("SPX", Timeframe::Week1).unwrap();

        let widget = chart.widget();
        assert_eq!(widget.renders.len(), 3);
        assert_eq!(widget.destroyed, 2);
        assert_eq!(widget.live, 1);
        assert_eq!(widget.renders[2].symbol, "SP:SPX");
    }

    #[test]
    fn test_same_selection_is_not_rerendered() {
        let mut chart = ChartController::new(RecordingWidget::default(), "chart");
        assert!(chart.show("AAPL", Timeframe::Hour1).unwrap());
        assert!(!chart.show(" AAPL ", Timeframe::Hour1).unwrap());
        assert_eq!(chart.widget().renders.len(), 1);
    }

    #[test]
    fn test_same_symbol_in_other_spelling_is_not_rerendered() {
        let mut chart = ChartController::new(RecordingWidget::default(), "chart");
        assert!(chart.show("btc-usd", Timeframe::Day1).unwrap());
        assert!(!chart.show("BTC-USD", Timeframe::Day1).unwrap());
        assert!(!chart.show("X:BTC-USD", Timeframe::Day1).unwrap());
        assert_eq!(chart.widget().renders.len(), 1);
        assert_eq!(chart.widget().destroyed, 0);
    }

    #[test]
    fn test_close_destroys_once() {
        let mut chart = ChartController::new(RecordingWidget::default(), "chart");
        chart.show("AAPL", Timeframe::Hour1).unwrap();
        chart.close();
        chart.close();
        assert_eq!(chart.widget().destroyed, 1);
        assert_eq!(chart.widget().live, 0);
    }

    #[test]
    fn test_rejects_missing_container_and_empty_symbol() {
        let mut chart = ChartController::new(RecordingWidget::default(), "");
        assert_eq!(chart.show("AAPL", Timeframe::Day1), Err(WidgetError::MissingContainer));

        let mut chart = ChartController::new(RecordingWidget::default(), "chart");
        assert_eq!(chart.show("  ", Timeframe::Day1), Err(WidgetError::EmptySymbol));
        assert!(chart.widget().renders.is_empty());
    }

    #[test]
    fn test_html_embed() {
        let mut chart = ChartController::new(HtmlEmbedWidget::new(), "tv-chart");
        chart.show("XRPUSDT", Timeframe::Minute15).unwrap();

        let html = chart.widget().html().unwrap();
        assert!(html.starts_with("<div id=\"tv-chart\"></div>"));
        assert!(html.contains("\"symbol\":\"BINANCE:XRPUSDT\""));
        assert!(html.contains("\"interval\":\"15\""));
        assert!(html.contains("\"locale\":\"es\""));

        chart.close();
        assert!(chart.widget().html().is_none());
    }

    #[test]
    fn test_html_embed_rejects_unsafe_container() {
        let mut widget = HtmlEmbedWidget::new();
        let config = WidgetConfig::for_asset("AAPL", Timeframe::Day1, "x\"><script>");
        assert!(matches!(widget.render(&config), Err(WidgetError::InvalidContainer(_))));
    }

    #[test]
    fn test_html_embed_escapes_markup_in_symbol() {
        let mut chart = ChartController::new(HtmlEmbedWidget::new(), "tv-chart");
        chart
            .show("</script><img src=x onerror=&#x61;lert(1)>", Timeframe::Day1)
            .unwrap();

        let html = chart.widget().html().unwrap();
        let script = html.rsplit("<script>").next().unwrap();
        assert!(!html.contains("</SCRIPT>"));
        assert!(!html.contains("<IMG"));
        assert_eq!(script.matches("</script>").count(), 1);
        assert!(script.contains("\\u003c/SCRIPT\\u003e\\u003cIMG"));

        let options = script
            .trim_start_matches("new TradingView.widget(")
            .trim_end_matches(");</script>");
        let parsed: serde_json::Value = serde_json::from_str(options).unwrap();
        assert_eq!(parsed["symbol"], "</SCRIPT><IMG SRC=X ONERROR=&#X61;LERT(1)>");
    }
}
