use mongodb::{Client, Database, options::ClientOptions};
use taskhub_config::DatabaseSettings;
use tracing::info;

/// Opens the client and round-trips a ping against the application
/// database, so a bad URL or unreachable server fails startup instead
/// of the first request.
pub async fn connect(settings: &DatabaseSettings) -> Result<Database, mongodb::error::Error> {
    let mut options = ClientOptions::parse(&settings.url).await?;
    options.app_name = Some("taskhub".to_string());
    options.max_pool_size = settings.max_pool_size;
    options.min_pool_size = settings.min_pool_size;

    let client = Client::with_options(options)?;
    let db = client.database(&settings.name);

    db.run_command(bson::doc! { "ping": 1 }).await?;
    info!(db = %settings.name, "Connected to MongoDB");

    Ok(db)
}
