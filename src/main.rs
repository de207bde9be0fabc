/// Contactry - multi-tenant contact management backend
///
/// Account lifecycle, session handling, and tenant-scoped invitations for
/// the Contactry application.

mod account;
mod api;
mod auth;
mod config;
mod context;
mod credentials;
mod db;
mod error;
mod invite;
mod mailer;
mod server;
mod session;
mod token;

use config::ServerConfig;
use context::AppContext;
use error::ApiResult;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ApiResult<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contactry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    print_banner();

    let config = ServerConfig::from_env()?;
    let ctx = AppContext::new(config).await?;

    server::serve(ctx).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
   ______            __             __
  / ____/___  ____  / /_____ ______/ /________  __
 / /   / __ \/ __ \/ __/ __ `/ ___/ __/ ___/ / / /
/ /___/ /_/ / / / / /_/ /_/ / /__/ /_/ /  / /_/ /
\____/\____/_/ /_/\__/\__,_/\___/\__/_/   \__, /
                                         /____/
        Contact Management Backend v{}
        "#,
        env!("CARGO_PKG_VERSION")
    );
}
