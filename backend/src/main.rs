mod config;
mod services;
mod state;
mod store;

use crate::config::{Args, Config};
use crate::state::AppState;
use crate::store::ApplicationStore;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use common::codec::Codec;
use env_logger::Env;
use log::{error, info};
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = Config::load(Args::parse()).map_err(|e| {
        error!("invalid configuration: {}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let store = ApplicationStore::open(&config.database_path).map_err(|e| {
        error!("cannot open {}: {}", config.database_path.display(), e);
        io::Error::other(e.to_string())
    })?;

    let state = AppState {
        store,
        codec: Codec::new(config.codec.clone()),
    };

    info!(
        "Server running at http://{}:{} (database {})",
        config.host,
        config.port,
        config.database_path.display()
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(1024 * 1024)) // 1 MB
            .app_data(web::Data::new(state.clone()))
            .service(services::applications::configure_routes())
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
