mod app;
mod data;
mod util;

use clap::Parser;

use data::FetchConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Seed for the mock knowledge-graph generator. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Probability in [0, 1] that a simulated load fails.
    #[arg(long, default_value_t = 0.1)]
    failure_rate: f32,

    /// Simulated graph fetch latency in milliseconds.
    #[arg(long, default_value_t = 2000)]
    fetch_delay_ms: u64,
}

fn main() -> eframe::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = FetchConfig {
        seed: args.seed,
        failure_rate: args.failure_rate.clamp(0.0, 1.0),
        delay_ms: args.fetch_delay_ms,
    };

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1280.0, 860.0]),
        ..Default::default()
    };

    eframe::run_native(
        "KnowledgeGraph AI",
        options,
        Box::new(move |cc| Ok(Box::new(app::BookGraphApp::new(cc, config)))),
    )
}
