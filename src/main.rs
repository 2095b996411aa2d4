mod attendance;
mod config;
mod db;
mod directory;
mod errors;
mod handlers;
mod images;
mod models;
mod utils;

use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use log::{error, info};
use std::io;
use std::sync::Arc;

use crate::config::Config;
use crate::directory::index::AttributeIndex;
use crate::directory::loader::DirectoryLoader;
use crate::directory::store::RecordStore;
use crate::images::{ImageGateway, ImageStore, MemoryImageStore, PgImageStore};

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|err| {
        error!("Invalid configuration: {}", err);
        io::Error::new(io::ErrorKind::InvalidInput, err.to_string())
    })?;

    let image_store: Arc<dyn ImageStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await.map_err(|err| {
                error!("Failed to connect to the image database: {}", err);
                io::Error::new(io::ErrorKind::Other, err.to_string())
            })?;
            Arc::new(PgImageStore::new(pool))
        }
        None => {
            info!("DATABASE_URL not set; images are kept in memory");
            Arc::new(MemoryImageStore::new())
        }
    };

    let loader = DirectoryLoader::new(
        config.data_source.clone(),
        config.fallback_path.clone(),
        config.source_timeout,
    )
    .map_err(|err| io::Error::new(io::ErrorKind::Other, err.to_string()))?
    .with_upload_limit(config.max_data_upload_bytes);

    let records = web::Data::new(RecordStore::new());
    let report = loader.reload(&records).await;
    info!(
        "Initial load: {} employees from {} ({:?})",
        report.count,
        report.source.as_str(),
        report.outcome
    );

    let loader = web::Data::new(loader);
    let images = web::Data::new(ImageGateway::new(image_store, config.image_policy.clone()));
    let index = web::Data::new(AttributeIndex::new());

    info!("Starting server at {}", config.bind_address);

    let server_records = records.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(server_records.clone())
            .app_data(loader.clone())
            .app_data(images.clone())
            .app_data(index.clone())
            .configure(handlers::configure)
    })
    .bind(&config.bind_address)?
    .run()
    .await?;

    records.clear();
    info!("Server stopped");
    Ok(())
}
