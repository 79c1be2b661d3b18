use clap::{App, Arg};
use colored::*;
use farmbus::agent::{FarmAgent, FarmConfig};
use farmbus::alerts::Alert;
use farmbus::notify::{NotificationSink, NullSink};
use farmbus::rng::FastrandSource;
use std::time::{Duration, Instant};
use tokio::time;
use tracing::{info, warn};

const DEFAULT_TICK_MS: &str = "500";
const FRAME_PERIOD: Duration = Duration::from_secs(5);

/// Console renderer for critical alerts.
struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&mut self, alert: &Alert) {
        println!(
            "{} {} - {}",
            "🚨 CRITICAL".red().bold(),
            alert.title.bold(),
            alert.message
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let matches = App::new("farmbus")
        .version("0.1.0")
        .author("Farm Systems Engineering Team")
        .about("🌾 Farm Bus Simulator - sensor telemetry, irrigation control, and alerting")
        .arg(
            Arg::with_name("seed")
                .short("s")
                .long("seed")
                .value_name("SEED")
                .help("Seed for the random source (omit for a random run)")
                .takes_value(true)
                .validator(|v| {
                    v.parse::<u64>()
                        .map(|_| ())
                        .map_err(|_| "Seed must be a valid number".into())
                }),
        )
        .arg(
            Arg::with_name("tick-ms")
                .short("t")
                .long("tick-ms")
                .value_name("MILLIS")
                .help("Resolution of the main loop")
                .takes_value(true)
                .default_value(DEFAULT_TICK_MS)
                .validator(|v| {
                    match v.parse::<u64>() {
                        Ok(ms) if ms > 0 => Ok(()),
                        _ => Err("Tick resolution must be a positive number".into()),
                    }
                }),
        )
        .arg(
            Arg::with_name("duration")
                .short("d")
                .long("duration")
                .value_name("SECONDS")
                .help("Stop after this many seconds (omit to run until Ctrl+C)")
                .takes_value(true)
                .validator(|v| {
                    v.parse::<u64>()
                        .map(|_| ())
                        .map_err(|_| "Duration must be a valid number".into())
                }),
        )
        .arg(
            Arg::with_name("no-auto")
                .long("no-auto")
                .help("Start with automatic irrigation disabled"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .help("Suppress the critical-alert console banner"),
        )
        .get_matches();

    let seed = matches
        .value_of("seed")
        .map(str::parse::<u64>)
        .transpose()?;
    let tick_ms = matches
        .value_of("tick-ms")
        .unwrap_or(DEFAULT_TICK_MS)
        .parse::<u64>()?;
    let duration = matches
        .value_of("duration")
        .map(str::parse::<u64>)
        .transpose()?
        .map(Duration::from_secs);

    let rng = match seed {
        Some(seed) => FastrandSource::seeded(seed),
        None => FastrandSource::new(),
    };
    let sink: Box<dyn NotificationSink> = if matches.is_present("quiet") {
        Box::new(NullSink)
    } else {
        Box::new(ConsoleSink)
    };

    let mut agent = FarmAgent::new(FarmConfig::default(), Box::new(rng), sink)?;
    if matches.is_present("no-auto") {
        agent.set_auto_mode(false);
    }

    println!("🌾 Farm Bus Simulator");
    println!("=====================");
    println!("   Sensor Simulator: ✓");
    println!("   Field Simulator: ✓");
    println!("   Irrigation Controller: ✓ (auto: {})", agent.auto_mode());
    println!("   Weather Simulator: ✓");
    println!("   Alert Engine: ✓");
    if let Some(seed) = seed {
        println!("   Seed: {seed}");
    }

    agent.start()?;

    let start = Instant::now();
    let mut interval = time::interval(Duration::from_millis(tick_ms));
    let mut last_frame = Instant::now();

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }

        let now_ms = start.elapsed().as_millis() as u64;
        agent.advance(now_ms);

        for event in agent.drain_events() {
            match serde_json::to_string(&event) {
                Ok(line) => info!("📤 EVENT: {}", line),
                Err(e) => warn!("failed to encode event: {}", e),
            }
        }

        if last_frame.elapsed() >= FRAME_PERIOD {
            last_frame = Instant::now();
            match serde_json::to_string(&agent.telemetry()) {
                Ok(line) => info!("📡 TELEMETRY: {}", line),
                Err(e) => warn!("failed to encode telemetry: {}", e),
            }
        }

        if let Some(limit) = duration {
            if start.elapsed() >= limit {
                break;
            }
        }
    }

    agent.stop();

    let status = agent.status();
    println!("🌾 Farm Bus Simulator stopped");
    println!(
        "   Uptime: {}s, ticks: {}, active alerts: {}",
        status.now_ms / 1000,
        status.ticks,
        status.active_alerts
    );

    Ok(())
}
