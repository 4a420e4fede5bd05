mod config;
mod device;
mod error;
mod logging;
mod models;
mod rest;
mod service;

use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
pub async fn main() {
    logging::init();

    let config = match config::Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let db_conn = match models::establish_db_connection(&config).await {
        Ok(db_conn) => db_conn,
        Err(e) => {
            error!("Failed connecting to the database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = models::check_schema(&db_conn).await {
        error!("Database schema is not initialized: {}", e);
        std::process::exit(1);
    }

    let sensors = Arc::new(models::sensor::SensorRepository::new(&db_conn));
    let sensor_methods = Arc::new(models::sensor_method::SensorMethodRepository::new(&db_conn));
    let exchange = Arc::new(device::ReqwestExchange::new());
    let service = service::SensorService::new(sensors, sensor_methods, exchange);

    if let Err(e) = rest::dispatch_server(config.server_addr(), service).await {
        error!("Webserver failed: {}", e);
    }

    db_conn.close().await;
    info!("Closed database connection");
}
