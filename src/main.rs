use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tfs::bot::handle_inbound;
use tfs::engine::{BotConfig, PAGE_SIZE, listing};
use tfs::model::{Attachment, Entry, PartialUser, UserId};
use tfs::store::{EntryStore, Storage};
use tfs::transport::{Inbound, InboundBody};

#[derive(Parser)]
#[command(name = "tfs")]
#[command(about = "Chat file manager (offline turn runner)", long_about = None)]
struct Cli {
    /// Data directory holding db.json
    #[arg(long, env = "TFS_DATA_DIR", default_value = "./tfs-data")]
    data_dir: PathBuf,

    /// Bot username used in public share links
    #[arg(long, env = "TFS_BOT_NICK", default_value = "tfs_bot")]
    bot_nick: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one turn for a user and print the replies as JSON
    Turn {
        #[arg(long)]
        user: UserId,

        /// Display name of the user
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long)]
        lang: Option<String>,

        /// Button payload, e.g. `openDir.0`
        #[arg(long, conflicts_with_all = ["text", "upload", "contact"])]
        payload: Option<String>,

        /// Free text, as typed into the chat
        #[arg(long, conflicts_with_all = ["upload", "contact"])]
        text: Option<String>,

        /// Uploaded file as `<name>:<file_ref>`
        #[arg(long, conflicts_with = "contact")]
        upload: Option<String>,

        /// Shared contact as `<user_id>:<name>`
        #[arg(long)]
        contact: Option<String>,
    },

    /// Print a user's tree
    Tree {
        #[arg(long)]
        user: UserId,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::open(&cli.data_dir)?;

    match cli.command {
        Commands::Turn {
            user,
            name,
            lang,
            payload,
            text,
            upload,
            contact,
        } => {
            let body = if let Some(payload) = payload {
                InboundBody::Callback(payload)
            } else if let Some(text) = text {
                InboundBody::Text(text)
            } else if let Some(upload) = upload {
                let (name, file_ref) = upload
                    .split_once(':')
                    .context("--upload expects <name>:<file_ref>")?;
                InboundBody::Upload(Attachment {
                    owner: user,
                    name: name.to_string(),
                    file_ref: Some(file_ref.to_string()),
                })
            } else if let Some(contact) = contact {
                let (id, name) = contact
                    .split_once(':')
                    .context("--contact expects <user_id>:<name>")?;
                InboundBody::Contact(Attachment {
                    owner: id.parse().context("parse contact user id")?,
                    name: name.to_string(),
                    file_ref: None,
                })
            } else {
                anyhow::bail!("one of --payload, --text, --upload or --contact is required");
            };

            let inbound = Inbound {
                user: PartialUser { id: user, name, lang },
                callback_id: None,
                body,
            };
            let config = BotConfig {
                bot_nick: cli.bot_nick,
                page_size: PAGE_SIZE,
            };

            match handle_inbound(&storage, &config, &inbound)? {
                Some(handled) => println!(
                    "{}",
                    serde_json::to_string_pretty(&handled.replies).context("serialize replies")?
                ),
                None => println!("[]"),
            }
        }

        Commands::Tree { user } => {
            let db = storage.snapshot()?;
            let Some(root) = db.find_root(user)? else {
                println!("No tree for user {}", user);
                return Ok(());
            };
            print_tree(&db, &root, 0)?;
        }
    }

    Ok(())
}

fn print_tree(db: &tfs::store::Db, entry: &Entry, depth: usize) -> Result<()> {
    let marker = match entry.kind {
        tfs::model::EntryKind::Dir => "/",
        tfs::model::EntryKind::File => "",
        tfs::model::EntryKind::Label => " #",
    };
    let shared = if entry.shared { " (shared)" } else { "" };
    if depth == 0 {
        println!("{}{}", entry.path, shared);
    } else {
        println!("{}{}{}{}", "  ".repeat(depth), entry.name, marker, shared);
    }

    if entry.is_dir() {
        for child in listing(db, entry)? {
            print_tree(db, &child, depth + 1)?;
        }
    }
    Ok(())
}
