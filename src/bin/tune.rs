use std::env;
use std::error::Error;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::anyhow;
use clap::Parser;
use tracing::{debug, info, warn};

use lottery::draw::DrawType;
use lottery::history::read_history;
use lottery::timed::Timed;
use lottery::tuner::{tune, JsonFileTuningStore, TunerConfig, TuningStore};

#[derive(Debug, clap::Parser, Clone)]
struct Args {
    /// file to source the draw history from
    history: Option<PathBuf>,

    /// draw type
    #[clap(short = 'd', long, value_parser = parse_draw_type)]
    draw_type: Option<DrawType>,

    /// JSON file to store the tuned model parameters in
    #[clap(short = 's', long)]
    store: Option<PathBuf>,

    /// largest range of interest length to try
    #[clap(long, default_value_t = 100)]
    max_length: usize,

    /// largest offset from the end of the history to back-test at
    #[clap(long, default_value_t = 100)]
    max_offset: usize,
}
impl Args {
    fn validate(&self) -> anyhow::Result<()> {
        self.history
            .as_ref()
            .ok_or(anyhow!("history file must be specified"))?;
        self.draw_type
            .as_ref()
            .ok_or(anyhow!("draw type must be specified"))?;
        if self.max_length == 0 || self.max_offset == 0 {
            return Err(anyhow!("grid bounds must be positive"));
        }
        Ok(())
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

    let draw_type = args.draw_type.ok_or(anyhow!("missing draw type"))?;
    let shape = draw_type.shape();
    let history = read_history(args.history.as_ref().ok_or(anyhow!("missing history"))?, &shape)?;
    info!("loaded {} results", history.len());

    let config = TunerConfig {
        lengths: 1..=args.max_length,
        offsets: 1..=args.max_offset,
        ..TunerConfig::default()
    };
    let timed = tokio::task::spawn_blocking(move || {
        Timed::result(|| tune(&history, &shape, &config))
    })
    .await??;
    info!("tuned {draw_type} to {timed}");
    let result = timed.into_value();
    if result.qualifying == 0 {
        warn!("no configuration qualified, falling back on {:?}", result.params);
    }

    if let Some(path) = args.store {
        let mut store = JsonFileTuningStore::new(&path);
        store.save(draw_type.key(), result.params)?;
        info!("saved to {path:?}");
    }
    Ok(())
}
