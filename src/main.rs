use anyhow::Result;
use koboloader::{
    config::{Config, KOBO_CSV_URL},
    fetch, load, process,
};
use reqwest::Client;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();
    info!("startup");

    let config = Config::from_env()?;
    let client = Client::new();

    // ─── 2) fetch export ─────────────────────────────────────────────
    info!("fetching data from KoboToolbox");
    let csv_text = fetch::fetch_csv(&client, KOBO_CSV_URL, &config.kobo).await?;
    info!(bytes = csv_text.len(), "data fetched");

    // ─── 3) normalize + derive ───────────────────────────────────────
    info!("processing data");
    let (records, skipped) = process::parse_csv(&csv_text)?;
    info!(rows = records.len(), skipped, "data processed");

    // ─── 4) full-replace load ────────────────────────────────────────
    info!("uploading data to Postgres");
    let mut conn = load::connect(&config.pg).await?;
    let inserted = load::load(&mut conn, &records).await?;
    info!(rows = inserted, "data loaded");

    Ok(())
}
