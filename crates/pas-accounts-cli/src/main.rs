mod telemetry;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use pas_accounts::{
    AccountQuery, LegacyQuery, ModernQuery, SearchType, ServerVersion, SessionConfig,
    SessionConfigLayer, SortSpec, format, get_accounts,
};

#[derive(Parser)]
#[command(name = "pas-accounts", version, about = "Vault privileged-account lookups")]
struct Cli {
    /// TOML file with session settings.
    #[arg(long, env = "PAS_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Base URI of the vault web service, e.g. https://pvwa.example.com.
    #[arg(long, global = true)]
    base_uri: Option<String>,
    /// Server version reported when the session was established.
    #[arg(long, global = true)]
    server_version: Option<ServerVersion>,
    /// Session token sent in the Authorization header.
    #[arg(long, global = true)]
    token: Option<String>,
    /// Request timeout in seconds.
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[arg(long, global = true)]
    insecure_skip_tls: bool,
    /// Emit logs as JSON on stderr.
    #[arg(long, global = true)]
    log_json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Retrieve accounts by ID, modern query or legacy keyword search.
    Get(GetCmd),
    #[command(subcommand)]
    Config(ConfigCmd),
}

#[derive(Subcommand)]
enum ConfigCmd {
    /// Print the resolved session settings.
    Show,
}

const MODERN_ARGS: [&str; 6] = ["search", "search_type", "sort", "offset", "limit", "filter"];
const NON_ID_ARGS: [&str; 8] = [
    "search",
    "search_type",
    "sort",
    "offset",
    "limit",
    "filter",
    "keywords",
    "safe",
];

#[derive(Args)]
struct GetCmd {
    /// Account ID to fetch.
    #[arg(long, conflicts_with_all = NON_ID_ARGS)]
    id: Option<String>,
    #[arg(long)]
    search: Option<String>,
    /// startswith or contains.
    #[arg(long)]
    search_type: Option<SearchType>,
    /// Up to three comma-separated `field [asc|desc]` terms.
    #[arg(long)]
    sort: Option<SortSpec>,
    #[arg(long)]
    offset: Option<u64>,
    #[arg(long)]
    limit: Option<u32>,
    /// Filter expression, e.g. "safeName eq 'Linux'".
    #[arg(long)]
    filter: Option<String>,
    /// Legacy search keywords.
    #[arg(long, conflicts_with_all = MODERN_ARGS)]
    keywords: Option<String>,
    /// Legacy search safe name.
    #[arg(long, conflicts_with_all = MODERN_ARGS)]
    safe: Option<String>,
    #[arg(long, value_enum, default_value_t = Output::Table)]
    output: Output,
}

#[derive(Clone, Copy, ValueEnum)]
enum Output {
    Table,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_json)?;
    let config = resolve_config(&cli)?;
    match cli.command {
        Command::Get(cmd) => handle_get(&config, cmd),
        Command::Config(ConfigCmd::Show) => handle_config_show(&config),
    }
}

fn resolve_config(cli: &Cli) -> Result<SessionConfig> {
    let mut layers = Vec::new();
    if let Some(path) = &cli.config {
        layers.push(SessionConfigLayer::from_file(path)?);
    }
    layers.push(SessionConfigLayer::from_env()?);
    layers.push(SessionConfigLayer {
        base_uri: cli.base_uri.clone(),
        server_version: cli.server_version,
        token: cli.token.clone(),
        timeout_secs: cli.timeout,
        insecure_skip_tls: cli.insecure_skip_tls.then_some(true),
        ..SessionConfigLayer::default()
    });
    let config = SessionConfig::resolve(layers)?;
    tracing::debug!(base_uri = %config.base_uri, "session config resolved");
    Ok(config)
}

fn handle_get(config: &SessionConfig, cmd: GetCmd) -> Result<()> {
    let output = cmd.output;
    let query = build_query(cmd);
    // The configured timeout is the client default, so no per-call override.
    let session = config.build_session()?;

    let outcome = get_accounts(&session, &query, None).context("account lookup failed")?;
    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }

    match output {
        Output::Json => println!("{}", format::to_json(&outcome.records)?),
        Output::Table if outcome.records.is_empty() => eprintln!("No accounts found"),
        Output::Table => print!("{}", format::to_table(&outcome.records)),
    }
    Ok(())
}

fn build_query(cmd: GetCmd) -> AccountQuery {
    if let Some(id) = cmd.id {
        return AccountQuery::ById(id);
    }
    if cmd.keywords.is_some() || cmd.safe.is_some() {
        return AccountQuery::Legacy(LegacyQuery {
            keywords: cmd.keywords,
            safe: cmd.safe,
        });
    }
    AccountQuery::Modern(ModernQuery {
        search: cmd.search,
        search_type: cmd.search_type,
        sort: cmd.sort,
        offset: cmd.offset,
        limit: cmd.limit,
        filter: cmd.filter,
    })
}

fn handle_config_show(config: &SessionConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(&config.redacted()).context("failed to render config")?;
    print!("{rendered}");
    Ok(())
}
