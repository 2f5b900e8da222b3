pub mod symbol;
pub mod widget;

pub use symbol::{normalize_interval, normalize_interval_label, normalize_symbol};
pub use widget::{ChartController, ChartWidget, HtmlEmbedWidget, WidgetConfig, WidgetError};
