// # v6probe - IPv6 connectivity check
//
// This binary is a THIN integration layer: probing, reconciliation and
// persistence all live in v6probe-core.
//
// The binary is responsible for:
// 1. Reading configuration from flags and environment variables
// 2. Initializing tracing (stderr) and the runtime
// 3. Wiring the hickory DNS probe, the reqwest HTTP probe and the file store
// 4. Running exactly one probing pass
// 5. Printing the summary (stdout) and mapping the outcome to an exit code
//
// ## Configuration
//
// - `--registry` / `V6PROBE_REGISTRY_PATH`: Registry file (default `data/endpoints.json`)
// - `--overrides` / `V6PROBE_OVERRIDES_PATH`: Override policy file (optional)
// - `--concurrency` / `V6PROBE_CONCURRENCY`: Endpoints probed at once (1-64)
// - `--http-timeout-secs` / `V6PROBE_HTTP_TIMEOUT_SECS`: Per-request deadline (1-60)
// - `--log-level` / `V6PROBE_LOG_LEVEL`: trace, debug, info, warn, error
// - `--verbose`, `--detail`, `--dry-run`: Output and persistence switches
//
// ## Example
//
// ```bash
// export V6PROBE_REGISTRY_PATH=data/endpoints.json
// v6probe --detail --dry-run
// ```

mod output;

use std::io::Write;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use v6probe_core::traits::{DnsProbe, HttpProbe, RegistryStore};
use v6probe_core::{
    FileRegistryStore, OverridePolicy, ProbeConfig, ProbeEngine, RegistryConfig, RunConfig,
    V6ProbeConfig,
};
use v6probe_dns::HickoryDnsProbe;
use v6probe_http::ReqwestHttpProbe;

/// Exit codes for the possible outcomes of a run
///
/// - 0: The pass completed (whatever the probes found)
/// - 1: Configuration or startup error
/// - 2: Runtime error (registry unreadable or unwritable)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum V6ProbeExitCode {
    Success = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<V6ProbeExitCode> for ExitCode {
    fn from(code: V6ProbeExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Check a registry of endpoints for working IPv6 and record the results
#[derive(Parser, Debug)]
#[command(name = "v6probe")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about, long_about = None)]
struct Cli {
    /// Path to the endpoint registry (JSON)
    #[arg(long, env = "V6PROBE_REGISTRY_PATH", default_value = "data/endpoints.json")]
    registry: String,

    /// Path to the override policy (JSON)
    #[arg(long, env = "V6PROBE_OVERRIDES_PATH")]
    overrides: Option<String>,

    /// Print probe outcomes for every endpoint
    #[arg(short, long)]
    verbose: bool,

    /// Print the full DNS/HTTP breakdown and check stored statuses
    #[arg(short, long)]
    detail: bool,

    /// Run the full pass but never write the registry
    #[arg(long)]
    dry_run: bool,

    /// How many endpoints to probe at the same time
    #[arg(long, env = "V6PROBE_CONCURRENCY", default_value_t = 1)]
    concurrency: usize,

    /// Deadline for each HTTP request, in seconds
    #[arg(long, env = "V6PROBE_HTTP_TIMEOUT_SECS", default_value_t = 5)]
    http_timeout_secs: u64,

    /// Log level for diagnostics on stderr
    #[arg(long, env = "V6PROBE_LOG_LEVEL", default_value = "warn")]
    log_level: String,
}

/// Application configuration
#[derive(Debug)]
struct Config {
    core: V6ProbeConfig,
    log_level: String,
}

impl Config {
    /// Build the configuration from parsed flags
    fn from_cli(cli: Cli) -> Self {
        Self {
            core: V6ProbeConfig {
                registry: RegistryConfig::File { path: cli.registry },
                overrides_path: cli.overrides,
                probe: ProbeConfig {
                    http_timeout_secs: cli.http_timeout_secs,
                    ..ProbeConfig::default()
                },
                run: RunConfig {
                    verbose: cli.verbose,
                    detail: cli.detail,
                    dry_run: cli.dry_run,
                    concurrency: cli.concurrency,
                },
            },
            log_level: cli.log_level,
        }
    }

    /// Validate the configuration
    ///
    /// Existence of the registry itself is not checked here: a missing
    /// registry is a runtime failure of the store.
    fn validate(&self) -> Result<()> {
        self.core.validate()?;
        self.level()?;

        if let Some(path) = &self.core.overrides_path
            && !std::path::Path::new(path).is_file()
        {
            anyhow::bail!("Override policy file does not exist: {}", path);
        }

        Ok(())
    }

    fn level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "V6PROBE_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // --help and --version also end up here
            return if e.use_stderr() {
                V6ProbeExitCode::ConfigError.into()
            } else {
                V6ProbeExitCode::Success.into()
            };
        }
    };

    let config = Config::from_cli(cli);
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return V6ProbeExitCode::ConfigError.into();
    }

    let log_level = config.level().unwrap_or(Level::WARN);
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return V6ProbeExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return V6ProbeExitCode::RuntimeError.into();
        }
    };

    rt.block_on(run(config)).into()
}

/// Wire the components and run one pass
async fn run(config: Config) -> V6ProbeExitCode {
    let engine = match build_engine(&config.core).await {
        Ok(engine) => engine,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return V6ProbeExitCode::ConfigError;
        }
    };

    let report = match engine.run().await {
        Ok(report) => report,
        Err(e) => {
            error!("Run failed: {}", e);
            return V6ProbeExitCode::RuntimeError;
        }
    };

    let rendered = output::render(&report, &config.core.run);
    if let Err(e) = std::io::stdout().lock().write_all(rendered.as_bytes()) {
        warn!("Failed to write summary: {}", e);
    }

    V6ProbeExitCode::Success
}

async fn build_engine(config: &V6ProbeConfig) -> Result<ProbeEngine> {
    let RegistryConfig::File { path } = &config.registry;
    let store: Box<dyn RegistryStore> = Box::new(FileRegistryStore::new(path));

    let overrides = match &config.overrides_path {
        Some(path) => {
            let policy = OverridePolicy::from_file(path).await?;
            info!("Loaded {} override rule(s) from {}", policy.len(), path);
            policy
        }
        None => OverridePolicy::new(),
    };

    let dns = HickoryDnsProbe::new(config.probe.address_sample_size)?;
    let http = ReqwestHttpProbe::new(&config.probe)?;

    info!(
        "Probing with {} DNS and {} HTTP, concurrency {}",
        dns.probe_name(),
        http.probe_name(),
        config.run.concurrency
    );

    Ok(ProbeEngine::new(
        Box::new(dns),
        Box::new(http),
        store,
        overrides,
        config.run,
    )?)
}
