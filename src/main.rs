use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use dotenv::dotenv;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payguard::config::Settings;
use payguard::database::connection::{establish_pool, run_migrations};
use payguard::routes;
use payguard::services::auth::AuthService;
use payguard::services::gateway::StripeGateway;
use payguard::services::lifecycle::LifecycleEngine;
use payguard::services::storage::LocalDocumentStorage;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::load()?;

    let pool = establish_pool(&settings.database).await?;
    run_migrations(&pool).await?;

    // Every external client is built once here and injected; nothing is
    // global or re-created per request.
    let auth_service = AuthService::new(settings.auth.jwt_secret.clone());
    let gateway = Arc::new(StripeGateway::new(settings.stripe.clone())?);
    let storage = Arc::new(LocalDocumentStorage::new(&settings.upload.dir).await?);

    let engine = web::Data::new(LifecycleEngine::new(
        Arc::new(pool.clone()),
        Arc::new(pool.clone()),
        gateway,
        storage,
        settings.upload.clone(),
    ));

    let bind_addr = (settings.server.host.clone(), settings.server.port);
    info!("Starting server on {}:{}", bind_addr.0, bind_addr.1);

    let settings_data = web::Data::new(settings);
    let pool_data = web::Data::new(pool);
    let auth_data = web::Data::new(auth_service);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(pool_data.clone())
            .app_data(auth_data.clone())
            .app_data(settings_data.clone())
            .app_data(engine.clone())
            .service(web::scope("/api").configure(routes::api::scoped_config))
    })
    .bind(bind_addr)?
    .run()
    .await?;

    Ok(())
}
