use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use axum::extract::State;
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use clap::Parser;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use tfs::bot::handle_inbound;
use tfs::engine::BotConfig;
use tfs::model::UserId;
use tfs::store::Storage;
use tfs::transport::{Inbound, Reply, TelegramClient, Update, parse_update};

#[path = "tfs_server/types.rs"]
mod types;
use self::types::*;
#[path = "tfs_server/http_error.rs"]
mod http_error;
use self::http_error::*;
#[path = "tfs_server/delivery.rs"]
mod delivery;
use self::delivery::*;
#[path = "tfs_server/handlers.rs"]
mod handlers;
use self::handlers::*;
#[path = "tfs_server/routes.rs"]
mod routes;
use self::routes::*;
#[path = "tfs_server/runtime.rs"]
mod runtime;

#[tokio::main]
async fn main() {
    if let Err(err) = runtime::run().await {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}
