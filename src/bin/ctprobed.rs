//! ctprobed - conntrack metrics probe daemon.
//!
//! Reads conntrack counters from /proc on every interval and writes them to
//! stdout for the metrics pipeline. Logs go to stderr.

use tikv_jemallocator::Jemalloc;
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use clap::Parser;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

use ctprobe::collector::{
    ConntrackCollector, FileSystem, ProcfsStatsProvider, RealFs, StatsProvider,
};
use ctprobe::config::Config;
use ctprobe::output::{OutputFormat, write_measurements};
use ctprobe::sink::MemoryAccumulator;

/// Conntrack metrics probe daemon.
#[derive(Parser)]
#[command(
    name = "ctprobed",
    about = "Collects conntrack stats from the configured directories and files",
    version
)]
struct Args {
    /// Directory to search for conntrack counter files (repeatable).
    /// Missing directories are ignored.
    /// Defaults to /proc/sys/net/ipv4/netfilter and /proc/sys/net/netfilter.
    #[arg(long = "dir", value_name = "DIR", env = "CTPROBE_DIRS", value_delimiter = ',')]
    dirs: Vec<PathBuf>,

    /// Counter file name to look for in every directory (repeatable).
    /// The nf_ and ip_ prefixes are mutually exclusive across kernel versions;
    /// missing files are ignored.
    #[arg(long = "file", value_name = "NAME", env = "CTPROBE_FILES", value_delimiter = ',')]
    files: Vec<String>,

    /// Collect conntrack statistics in addition to the counter files.
    #[arg(long, env = "CTPROBE_COLLECT_STATS", default_value_t = true, action = clap::ArgAction::Set)]
    collect_stats: bool,

    /// Report statistics per CPU instead of one aggregate.
    #[arg(long, env = "CTPROBE_PERCPU")]
    percpu: bool,

    /// Path to /proc filesystem (for testing/containers).
    #[arg(long, env = "CTPROBE_PROC_PATH", default_value = "/proc")]
    proc_path: PathBuf,

    /// Collection interval in seconds.
    #[arg(short, long, env = "CTPROBE_INTERVAL", default_value = "10")]
    interval: u64,

    /// Run a single collection cycle and exit.
    #[arg(long)]
    once: bool,

    /// Output format for measurements.
    #[arg(long, value_enum, env = "CTPROBE_FORMAT", default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn config(&self) -> Config {
        Config::new()
            .with_dirs(self.dirs.clone())
            .with_files(self.files.clone())
            .with_collect_stats(self.collect_stats)
            .with_per_cpu(self.percpu)
            .with_proc_path(self.proc_path.clone())
    }
}

/// Initializes the tracing subscriber with the appropriate log level.
/// Default level is INFO. Use -q for quiet mode (errors only).
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    for target in ["ctprobed", "ctprobe"] {
        if let Ok(directive) = format!("{}={}", target, level).parse::<Directive>() {
            filter = filter.add_directive(directive);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

/// Runs one cycle and writes its measurements to stdout.
///
/// Returns `false` if the cycle failed.
fn run_cycle<F: FileSystem, P: StatsProvider>(
    collector: &mut ConntrackCollector<F, P>,
    format: OutputFormat,
) -> bool {
    let mut acc = MemoryAccumulator::new();
    let result = collector.gather(&mut acc);
    let timestamp = Utc::now();
    let (measurements, errors) = acc.take();

    for e in &errors {
        warn!("{}", e);
    }

    let mut stdout = io::stdout().lock();
    if let Err(e) = write_measurements(&mut stdout, &measurements, format, timestamp) {
        error!("Failed to write measurements: {}", e);
        return false;
    }

    match result {
        Ok(()) => {
            debug!(
                "Cycle: {} measurements, {} errors",
                measurements.len(),
                errors.len()
            );
            true
        }
        Err(e) => {
            error!("{}", e);
            false
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = args.config();
    info!("ctprobed {} starting", env!("CARGO_PKG_VERSION"));

    let provider = ProcfsStatsProvider::new(RealFs::new(), &config.proc_path);
    let mut collector = ConntrackCollector::new(RealFs::new(), provider, config);

    let config = collector.config();
    info!(
        "Config: dirs={:?}, files={:?}, collect_stats={}, percpu={}, proc={}",
        config.effective_dirs(),
        config.effective_files(),
        config.collect_stats,
        config.per_cpu,
        config.proc_path.display()
    );

    if args.once {
        return if run_cycle(&mut collector, args.format) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    if let Err(e) = ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let interval = Duration::from_secs(args.interval);
    info!("Starting collection loop (interval={}s)", args.interval);

    while running.load(Ordering::SeqCst) {
        run_cycle(&mut collector, args.format);

        // Sleep with periodic checks for shutdown signal
        let sleep_interval = Duration::from_millis(100);
        let mut remaining = interval;
        while remaining > Duration::ZERO && running.load(Ordering::SeqCst) {
            let sleep_time = remaining.min(sleep_interval);
            std::thread::sleep(sleep_time);
            remaining = remaining.saturating_sub(sleep_time);
        }
    }

    info!("Shutdown complete");
    ExitCode::SUCCESS
}
