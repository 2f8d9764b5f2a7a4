//! Issue an API key for a user
//!
//! Run with: cargo run --bin issue_api_key -- --email ana@example.com
//!
//! Any active key of that user is revoked. The plaintext key is printed once
//! and never stored.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;

use personal_finance::handlers::{IssueApiKeyCommand, IssueApiKeyHandler};
use personal_finance::repository::PgStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let email = args
        .iter()
        .position(|a| a == "--email")
        .and_then(|i| args.get(i + 1))
        .ok_or_else(|| anyhow::anyhow!("usage: issue_api_key --email <address>"))?;

    let database_url = std::env::var("DATABASE_URL")?;

    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await?;

    let handler = IssueApiKeyHandler::new(Arc::new(PgStore::new(pool.clone())));
    let issued = handler.execute(IssueApiKeyCommand::new(email.as_str())).await?;

    println!("User:    {}", issued.user_mail);
    println!("Key ID:  {}", issued.key_id);
    println!("API key: {}", issued.api_key);
    if issued.revoked_previous > 0 {
        println!("Revoked {} previous key(s)", issued.revoked_previous);
    }

    pool.close().await;
    Ok(())
}
