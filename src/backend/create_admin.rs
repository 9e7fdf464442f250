/**
 * Admin Bootstrap Binary
 *
 * Creates the first admin account from `ADMIN_USERNAME`, `ADMIN_EMAIL` and
 * `ADMIN_PASSWORD` (or the `[admin]` table of the config file). Running it
 * again once any admin exists changes nothing.
 */

use gogo::backend::auth::{ensure_admin, BootstrapOutcome, PasswordHasher};
use gogo::backend::server::config::{load_store, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::load()?;
    if config.database_url.is_none() {
        tracing::warn!("No DATABASE_URL; the admin will only exist for the lifetime of this process");
    }

    let store = load_store(&config).await?;
    let passwords = PasswordHasher::new(config.bcrypt_cost);

    match ensure_admin(&store, &passwords, &config.admin).await? {
        BootstrapOutcome::AlreadyPresent => {
            tracing::info!("An admin account already exists; nothing to do");
        }
        BootstrapOutcome::Created(user) => {
            tracing::info!("Created admin {} ({})", user.username, user.id);
        }
    }

    Ok(())
}
