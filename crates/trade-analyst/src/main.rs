use std::sync::Arc;

use analysis_core::Timeframe;
use analysis_orchestrator::{AnalysisOrchestrator, AnalysisSession, RequestOutcome};
use anyhow::Result;
use chart_widget::{ChartController, HtmlEmbedWidget};
use clap::Parser;
use gemini_client::GeminiClient;

mod config;

use config::AnalystConfig;

#[derive(Debug, Parser)]
#[command(name = "trade-analyst", about = "Chart embed and AI trade analysis for an asset")]
struct Args {
    /// Asset ticker, e.g. BTC-USD, NVDA, I:SPX, X:ETH-USD
    #[arg(short, long)]
    asset: Option<String>,

    /// One of 5m, 15m, 1h, 4h, 1D, 1W
    #[arg(short, long, default_value = "1D")]
    timeframe: Timeframe,

    /// Only print the chart embed, skip the AI analysis
    #[arg(long)]
    chart_only: bool,

    /// Override the chart container id
    #[arg(long)]
    container_id: Option<String>,

    /// List the popular assets with their chart symbols and exit
    #[arg(long)]
    popular: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let args = Args::parse();
    let config = AnalystConfig::from_env()?;

    if args.popular {
        for asset in &config.popular_assets {
            println!("{:<12} {}", asset, chart_widget::normalize_symbol(asset));
        }
        return Ok(());
    }

    let raw_asset = args.asset.as_deref().unwrap_or(&config.default_asset);
    let asset = analysis_core::clean_asset(raw_asset)
        .ok_or_else(|| anyhow::anyhow!("asset must not be empty"))?;
    let container_id = args.container_id.unwrap_or(config.container_id.clone());

    let mut chart = ChartController::new(HtmlEmbedWidget::new(), container_id);
    chart.show(&asset, args.timeframe)?;
    if let Some(html) = chart.widget().html() {
        println!("{}", html);
    }

    if args.chart_only {
        return Ok(());
    }

    let client = GeminiClient::from_env()?;
    tracing::info!("Using model {}", client.model());

    let orchestrator = AnalysisOrchestrator::with_model(Arc::new(client), config.max_sources);
    let session = AnalysisSession::new(Arc::new(orchestrator));

    let mut updates = session.subscribe();
    let progress = tokio::spawn(async move {
        let mut last = None;
        while updates.changed().await.is_ok() {
            let stage = updates.borrow_and_update().stage;
            if last != Some(stage) {
                tracing::info!("Stage: {:?}", stage);
                last = Some(stage);
            }
        }
    });

    let outcome = session.request(&asset, args.timeframe).await;
    drop(session);
    let _ = progress.await;

    match outcome {
        RequestOutcome::Completed(result) => {
            println!(
                "\n{} ({}) -> {} | confianza {:.0}%",
                asset,
                args.timeframe,
                result.recommendation().label_es(),
                result.confidence()
            );
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        RequestOutcome::Failed(e) => Err(anyhow::anyhow!(e.user_message())),
        RequestOutcome::Superseded => Err(anyhow::anyhow!("analysis request was superseded")),
    }
}
