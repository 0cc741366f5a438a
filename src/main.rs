//! Command-line front end for the optimizer.
//!
//! Usage:
//!   frontier-view frontier --codes 005930,000660,035420 [--range 1Y] [--tolerance 50] [--recommend]
//!   frontier-view model max-sharpe --codes AAPL,MSFT,NVDA,AMZN,GOOGL
//!
//! Environment: FRONTIER_API_BASE, FRONTIER_TIMEOUT_MS, FRONTIER_STRICT, RUST_LOG

use clap::{Args, Parser, Subcommand};
use serde_json::json;
use std::error::Error;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use frontier_view::points::{percent, weight_rows};
use frontier_view::{
    select, target_risk, Config, Frontier, FrontierPoint, FrontierRequest, MarkerPoint,
    OptimizerClient, OptimizerModel, ParseMode, Range, RiskTolerance,
};

#[derive(Parser)]
#[command(name = "frontier-view")]
#[command(version, about = "Efficient-frontier explorer for a remote portfolio optimizer")]
struct Cli {
    /// Optimizer base URL (overrides FRONTIER_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Request timeout in milliseconds (overrides FRONTIER_TIMEOUT_MS)
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,

    /// Fail on malformed numbers instead of reading them as 0
    #[arg(long, global = true)]
    strict: bool,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the efficient frontier and pick a point for a risk tolerance
    Frontier {
        #[command(flatten)]
        basket: Basket,

        /// Risk tolerance slider, 0 (conservative) to 100 (aggressive)
        #[arg(short, long, default_value_t = 50, value_parser = clap::value_parser!(u8).range(0..=100))]
        tolerance: u8,

        /// Also ask the optimizer for the portfolio at the tolerance's target risk
        #[arg(long)]
        recommend: bool,
    },
    /// Run a single-portfolio model (min-variance, max-sharpe, risk-parity, max-diversification)
    Model {
        model: OptimizerModel,

        #[command(flatten)]
        basket: Basket,
    },
}

#[derive(Args)]
struct Basket {
    /// Comma-separated ticker codes
    #[arg(short, long, value_delimiter = ',', required = true)]
    codes: Vec<String>,

    /// Look-back preset: 1M, 3M, 6M, 1Y, 3Y (default window is one year)
    #[arg(short, long)]
    range: Option<Range>,

    /// Window start, YYYY-MM-DD
    #[arg(long)]
    start: Option<String>,

    /// Window end, YYYY-MM-DD
    #[arg(long)]
    end: Option<String>,
}

impl Basket {
    fn request(&self) -> Result<FrontierRequest, frontier_view::RequestError> {
        let today = chrono::Utc::now().date_naive();
        FrontierRequest::new(self.codes.as_slice(), self.range, today)?
            .with_window(self.start.as_deref(), self.end.as_deref())
    }
}

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli) -> Config {
    let mut config = Config::from_env();
    if let Some(base) = &cli.api_base {
        config = config.with_api_base(base);
    }
    if let Some(ms) = cli.timeout_ms {
        config.timeout = Duration::from_millis(ms);
    }
    if cli.strict {
        config.parse_mode = ParseMode::Strict;
    }
    config
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    setup_logging();

    let client = OptimizerClient::new(build_config(&cli))?;

    match &cli.command {
        Commands::Frontier {
            basket,
            tolerance,
            recommend,
        } => {
            let request = basket.request()?;
            let frontier = client.frontier(&request).await?;
            let tolerance = RiskTolerance::new(*tolerance);
            let selected = select(&frontier.points, tolerance.value())?;
            let target = target_risk(&frontier.points, tolerance.value());

            let recommended = match target {
                Some(target) if *recommend => Some(client.optimize_target_risk(&request, target).await?),
                _ => None,
            };

            if cli.json {
                let out = json!({
                    "request": request,
                    "tolerance": tolerance,
                    "target_risk": target,
                    "selected": selected,
                    "recommended": recommended,
                    "frontier": frontier,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_frontier(&frontier, selected);
                print_selection(&request, &frontier, selected, tolerance);
                if let (Some(target), Some(marker)) = (target, &recommended) {
                    print_recommendation(&request, target, marker);
                }
            }
        }
        Commands::Model { model, basket } => {
            let request = basket.request()?;
            let marker = client.optimize(*model, &request).await?;

            if cli.json {
                let out = json!({ "request": request, "model": model.slug(), "result": marker });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                print_marker(*model, &request, &marker);
            }
        }
    }

    Ok(())
}

fn print_frontier(frontier: &Frontier, selected: &FrontierPoint) {
    println!("{:>3} {:>10} {:>10} {:>12}", "", "position", "risk", "return");
    for point in &frontier.points {
        let flag = if std::ptr::eq(point, selected) { "*" } else { "" };
        println!(
            "{:>3} {:>10} {:>10} {:>12}",
            flag,
            percent(point.position_ratio, 1),
            percent(point.risk, 2),
            percent(point.expected_return, 2)
        );
    }

    if !frontier.markers.is_empty() {
        println!();
        for marker in &frontier.markers {
            println!(
                "[MARKER] {:<22} risk {:>8}  return {:>8}",
                marker.name,
                percent(marker.risk, 2),
                percent(marker.expected_return, 2)
            );
        }
    }
}

fn print_selection(
    request: &FrontierRequest,
    frontier: &Frontier,
    selected: &FrontierPoint,
    tolerance: RiskTolerance,
) {
    println!();
    if let Some((lo, hi)) = frontier.risk_range() {
        println!("[RANGE] observed risk {} .. {}", percent(lo, 2), percent(hi, 2));
    }
    println!(
        "[SELECT] tolerance {} ({}) -> risk {}, expected return {}",
        tolerance,
        tolerance.label(),
        percent(selected.risk, 2),
        percent(selected.expected_return, 2)
    );
    print_weights(&request.codes, &selected.weights);
}

fn print_recommendation(request: &FrontierRequest, target: f64, marker: &MarkerPoint) {
    println!();
    println!(
        "[RECOMMEND] target risk {} -> risk {}, expected return {}",
        percent(target, 2),
        percent(marker.risk, 2),
        percent(marker.expected_return, 2)
    );
    print_weights(&request.codes, &marker.weights);
}

fn print_marker(model: OptimizerModel, request: &FrontierRequest, marker: &MarkerPoint) {
    println!("[{}] {} to {}", model.title(), request.start, request.end);
    println!("  risk:            {}", percent(marker.risk, 2));
    println!("  expected return: {}", percent(marker.expected_return, 2));
    print_weights(&request.codes, &marker.weights);
}

fn print_weights(codes: &[String], weights: &[f64]) {
    if weights.is_empty() {
        return;
    }
    println!("{:<12} {:>10}", "code", "weight");
    for (code, weight) in weight_rows(codes, weights) {
        println!("{:<12} {:>10}", code, percent(weight, 2));
    }
}
