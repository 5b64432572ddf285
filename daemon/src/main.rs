//! dagview daemon: serves the explorer API over an LMDB ledger copy.

mod config;
mod shutdown;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use dagview_explorer::{CancelToken, Explorer};
use dagview_rpc::{RpcMetrics, RpcServer, RpcState};
use dagview_store::{Ledger, LedgerSnapshot};
use dagview_store_lmdb::{check_data_dir, check_integrity, LmdbEnvironment};
use dagview_types::UnitHash;
use dagview_utils::{format_signed_duration, init_logging, LogFormat};

use crate::config::ExplorerConfig;
use crate::shutdown::ShutdownController;

/// Named databases plus headroom.
const LMDB_MAX_DBS: u32 = 32;

#[derive(Parser)]
#[command(name = "dagview", about = "DAG ledger explorer daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long, env = "DAGVIEW_CONFIG")]
    config: Option<PathBuf>,

    /// LMDB directory.
    #[arg(long, env = "DAGVIEW_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// LMDB map size in MiB.
    #[arg(long, env = "DAGVIEW_MAP_SIZE_MB")]
    map_size_mb: Option<usize>,

    #[arg(long, env = "DAGVIEW_RPC_HOST")]
    rpc_host: Option<String>,

    #[arg(long, env = "DAGVIEW_RPC_PORT")]
    rpc_port: Option<u16>,

    /// Log format: "human" or "json".
    #[arg(long, env = "DAGVIEW_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "DAGVIEW_LOG_LEVEL")]
    log_level: Option<String>,

    #[arg(long, env = "DAGVIEW_COUNT_WITNESSES")]
    count_witnesses: Option<usize>,

    #[arg(long, env = "DAGVIEW_MAJORITY_OF_WITNESSES")]
    majority_of_witnesses: Option<usize>,

    /// Witness addresses for protocol version 4+ units (comma-separated).
    #[arg(long, env = "DAGVIEW_OP_LIST", value_delimiter = ',')]
    op_list: Vec<String>,

    #[arg(long, env = "DAGVIEW_QUERY_TIMEOUT_MS")]
    query_timeout_ms: Option<u64>,

    #[arg(long, env = "DAGVIEW_LAST_UNITS_LIMIT")]
    last_units_limit: Option<usize>,

    #[arg(long, env = "DAGVIEW_MAX_PAGE_LIMIT")]
    max_page_limit: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Serve the HTTP API until SIGINT/SIGTERM.
    Serve,
    /// Load a JSON ledger snapshot into the store.
    Import {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Print the detail record of a unit as JSON.
    Info { unit: String },
    /// Print the confirmation delays of a unit.
    Confirmation { unit: String },
    /// Print the effective configuration as TOML.
    Config,
}

impl Cli {
    /// The file configuration (or defaults) with every given flag applied.
    fn effective_config(&self) -> anyhow::Result<ExplorerConfig> {
        let mut config = match &self.config {
            Some(path) => ExplorerConfig::from_toml_file(path)?,
            None => ExplorerConfig::default(),
        };
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(map_size_mb) = self.map_size_mb {
            config.map_size_mb = map_size_mb;
        }
        if let Some(rpc_host) = &self.rpc_host {
            config.rpc_host = rpc_host.clone();
        }
        if let Some(rpc_port) = self.rpc_port {
            config.rpc_port = rpc_port;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        if let Some(log_level) = &self.log_level {
            config.log_level = log_level.clone();
        }
        if let Some(count) = self.count_witnesses {
            config.count_witnesses = count;
        }
        if let Some(majority) = self.majority_of_witnesses {
            config.majority_of_witnesses = majority;
        }
        if !self.op_list.is_empty() {
            config.op_list = self.op_list.clone();
        }
        if let Some(timeout) = self.query_timeout_ms {
            config.query_timeout_ms = timeout;
        }
        if let Some(limit) = self.last_units_limit {
            config.last_units_limit = limit;
        }
        if let Some(limit) = self.max_page_limit {
            config.max_page_limit = limit;
        }
        config.validate()?;
        Ok(config)
    }
}

fn open_store(config: &ExplorerConfig) -> anyhow::Result<LmdbEnvironment> {
    check_data_dir(&config.data_dir).map_err(anyhow::Error::msg)?;
    let env = LmdbEnvironment::open(&config.data_dir, LMDB_MAX_DBS, config.map_size_bytes())
        .with_context(|| format!("opening LMDB at {}", config.data_dir.display()))?;
    let report = check_integrity(env.env())?;
    if report.is_healthy() {
        info!(
            databases = report.databases_checked,
            entries = report.total_entries,
            "integrity check passed"
        );
    } else {
        for error in &report.errors {
            warn!(%error, "integrity check");
        }
    }
    Ok(env)
}

fn explorer(config: &ExplorerConfig) -> anyhow::Result<Explorer<LmdbEnvironment>> {
    let store = open_store(config)?;
    Ok(Explorer::new(Arc::new(store), config.explorer_settings()?))
}

async fn serve(config: ExplorerConfig) -> anyhow::Result<()> {
    let explorer = explorer(&config)?;
    let summary = explorer.ledger().summary()?;
    info!(
        units = summary.units,
        last_rowid = ?summary.last_rowid,
        last_mci = ?summary.last_main_chain_index,
        "ledger opened"
    );

    let state = Arc::new(RpcState::new(
        explorer,
        Arc::new(RpcMetrics::new()),
        config.rpc_settings(),
    ));
    let shutdown = Arc::new(ShutdownController::new());
    let signals = Arc::clone(&shutdown);
    tokio::spawn(async move { signals.wait_for_signal().await });

    RpcServer::new(config.rpc_addr()?)
        .start(dagview_rpc::router(state), shutdown.signalled())
        .await?;
    info!("dagview exited cleanly");
    Ok(())
}

fn import(config: &ExplorerConfig, snapshot: &Path) -> anyhow::Result<()> {
    let snapshot = LedgerSnapshot::from_json_file(snapshot)?;
    let store = LmdbEnvironment::open(&config.data_dir, LMDB_MAX_DBS, config.map_size_bytes())?;
    let report = store.import_snapshot(&snapshot)?;
    println!(
        "imported {} units, {} commission outputs, {} AA responses, {} assets, {} definitions",
        report.units,
        report.commission_outputs,
        report.aa_responses,
        report.assets,
        report.definitions
    );
    Ok(())
}

fn info_cmd(config: &ExplorerConfig, unit: &str) -> anyhow::Result<()> {
    let unit = UnitHash::parse(unit)?;
    let explorer = explorer(config)?;
    let cancel = CancelToken::with_timeout(config.query_timeout());
    let info = explorer
        .unit_info(&unit, &cancel)?
        .with_context(|| format!("unit {unit} not found"))?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn confirmation_cmd(config: &ExplorerConfig, unit: &str) -> anyhow::Result<()> {
    let unit = UnitHash::parse(unit)?;
    let explorer = explorer(config)?;
    let cancel = CancelToken::with_timeout(config.query_timeout());
    let delays = explorer.confirmation_delays(&unit, &cancel)?;
    println!("{}", serde_json::to_string_pretty(&delays)?);
    let describe = |delay: Option<i64>| match delay {
        Some(secs) => format_signed_duration(secs),
        None => "not yet".to_string(),
    };
    println!(
        "full node: {}, light node: {}",
        describe(delays.full_node_confirmation_delay),
        describe(delays.light_node_confirmation_delay)
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.effective_config()?;
    init_logging(config.log_format, &config.log_level)?;

    match &cli.command {
        Command::Serve => serve(config).await,
        Command::Import { snapshot } => import(&config, snapshot),
        Command::Info { unit } => info_cmd(&config, unit),
        Command::Confirmation { unit } => confirmation_cmd(&config, unit),
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}
