use tracing_subscriber::EnvFilter;

use super::*;

#[derive(Parser)]
#[command(name = "tfs-server")]
#[command(about = "Chat file manager webhook server", long_about = None)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "TFS_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Write bound address to this file (dev/test convenience)
    #[arg(long)]
    addr_file: Option<PathBuf>,

    /// Data directory holding db.json
    #[arg(long, env = "TFS_DATA_DIR", default_value = "./tfs-data")]
    data_dir: PathBuf,

    /// Bot API token; without it replies are only logged
    #[arg(long, env = "TFS_BOT_TOKEN")]
    bot_token: Option<String>,

    /// Bot username used in public share links
    #[arg(long, env = "TFS_BOT_NICK", default_value = "tfs_bot")]
    bot_nick: String,

    /// Bot API base URL
    #[arg(long, env = "TFS_API_BASE", default_value = "https://api.telegram.org")]
    api_base: String,

    /// Secret Telegram must echo in the X-Telegram-Bot-Api-Secret-Token header
    #[arg(long, env = "TFS_WEBHOOK_SECRET")]
    webhook_secret: Option<String>,
}

pub(super) async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let storage = Storage::open(&args.data_dir).context("open storage")?;
    if args.bot_token.is_none() {
        warn!("no bot token configured, replies are only logged");
    }
    let courier = Courier::spawn(&args.api_base, args.bot_token.clone())?;

    let state = Arc::new(AppState {
        storage,
        config: BotConfig {
            bot_nick: args.bot_nick.clone(),
            ..BotConfig::default()
        },
        courier,
        webhook_secret_hash: args.webhook_secret.as_deref().map(hash_secret),
        user_locks: UserLocks::default(),
    });

    let app = build_router(state);
    let listener = bind_listener(args.addr).await?;
    let local_addr = listener.local_addr().context("read listener local addr")?;
    info!(addr = %local_addr, "tfs-server listening");
    maybe_write_addr_file(args.addr_file.as_ref(), local_addr)?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn bind_listener(addr: SocketAddr) -> Result<tokio::net::TcpListener> {
    tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("bind {}", addr))
}

fn maybe_write_addr_file(addr_file: Option<&PathBuf>, local_addr: SocketAddr) -> Result<()> {
    if let Some(addr_file) = addr_file {
        std::fs::write(addr_file, local_addr.to_string())
            .with_context(|| format!("write addr file {}", addr_file.display()))?;
    }
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
