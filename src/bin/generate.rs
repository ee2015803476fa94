use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::anyhow;
use clap::Parser;
use stanza::renderer::console::Console;
use stanza::renderer::Renderer;
use tracing::{debug, info, warn};

use lottery::aging::aged_results;
use lottery::config::Config;
use lottery::controller::{CouponController, GenerationStatus};
use lottery::draw::DrawType;
use lottery::history::read_history;
use lottery::print::{tabulate_coupons, tabulate_statistic};
use lottery::roi::RangeOfInterest;
use lottery::stats::age_statistics;
use lottery::tuner::JsonFileTuningStore;

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the draw history from
    history: Option<PathBuf>,

    /// draw type
    #[clap(short = 'd', long, value_parser = parse_draw_type)]
    draw_type: Option<DrawType>,

    /// JSON configuration file
    #[clap(short = 'c', long)]
    config: Option<PathBuf>,

    /// JSON file holding tuned model parameters
    #[clap(short = 's', long)]
    store: Option<PathBuf>,

    /// number of coupons to generate
    #[clap(short = 'n', long)]
    count: Option<usize>,

    /// minimum distance between coupons
    #[clap(long)]
    distance: Option<usize>,

    /// timeout in seconds
    #[clap(short = 't', long)]
    timeout: Option<u64>,

    /// range of interest length
    #[clap(long)]
    roi: Option<usize>,

    /// standard deviation factor
    #[clap(long)]
    factor: Option<f64>,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.history
            .as_ref()
            .ok_or(anyhow!("history file must be specified"))?;
        if self.config.is_none() && self.draw_type.is_none() {
            return Err(anyhow!("either the -c or the -d flag must be specified"));
        }
        Ok(())
    }

    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::new(self.draw_type.unwrap_or(DrawType::Lotto)),
        };
        if let Some(draw_type) = self.draw_type {
            config.draw_type = draw_type;
        }
        if let Some(path) = &self.store {
            if config.apply_tuned(&JsonFileTuningStore::new(path))? {
                debug!("using tuned parameters {:?}", config.model);
            }
        }
        if let Some(count) = self.count {
            config.generation.coupons_count = count;
        }
        if let Some(distance) = self.distance {
            config.generation.coupon_distance = distance;
        }
        if let Some(timeout) = self.timeout {
            config.generation.timeout_secs = timeout;
        }
        if let Some(roi) = self.roi {
            config.model.roi_length = roi;
        }
        if let Some(factor) = self.factor {
            config.model.std_dev_factor = factor;
        }
        config.validate()?;
        Ok(config)
    }
}
fn parse_draw_type(s: &str) -> anyhow::Result<DrawType> {
    DrawType::from_str(&s.to_lowercase()).map_err(|_| anyhow!("unsupported draw type {s}"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    if env::var("RUST_BACKTRACE").is_err() {
        env::set_var("RUST_BACKTRACE", "full")
    }
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info")
    }
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    args.validate()?;
    debug!("args: {args:?}");

    let config = args.resolve_config()?;
    info!("config: {config:?}");
    let shape = config.draw_type.shape();
    let history = read_history(args.history.as_ref().ok_or(anyhow!("missing history"))?, &shape)?;
    info!("loaded {} results", history.len());

    let aged = aged_results(&history, &shape)?;
    let roi = RangeOfInterest::trailing(aged.len(), config.model.roi_length);
    match age_statistics(&aged, &roi, shape.numbers_count) {
        Ok(Some(statistic)) => info!(
            "age statistics over {roi}:\n{}",
            Console::default().render(&tabulate_statistic(&statistic, config.model.std_dev_factor))
        ),
        Ok(None) => warn!("no complete results over {roi}"),
        Err(err) => warn!("age statistics unavailable: {err}"),
    }

    let controller = CouponController::new(config.draw_type, history, config.model);
    let cancel = controller.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
    let mut progress = controller.progress();
    tokio::spawn(async move {
        while progress.changed().await.is_ok() {
            let fraction = *progress.borrow();
            debug!("progress: {:.0}%", fraction * 100.0);
        }
    });

    let start_time = Instant::now();
    let outcome = controller.generate(config.generation.into()).await?;
    let elapsed = start_time.elapsed();
    info!(
        "{} coupons:\n{}",
        outcome.coupons.len(),
        Console::default().render(&tabulate_coupons(&outcome.coupons, shape.numbers_count))
    );
    match outcome.status {
        GenerationStatus::Completed => info!("completed in {elapsed:?}"),
        GenerationStatus::TimedOut => warn!(
            "timed out after {elapsed:?} with {} of {} coupons",
            outcome.coupons.len(),
            config.generation.coupons_count
        ),
        GenerationStatus::Cancelled => warn!("cancelled after {elapsed:?}"),
    }
    Ok(())
}
