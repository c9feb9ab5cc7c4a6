//! CommonGround - content service for a community nonprofit site

use clap::Parser;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commonground::{
    actions::{AuthActions, ContentActions},
    auth::{AuthProvider, DemoGate, GoTrueProvider, JwtValidator, LocalAuthProvider},
    cache::{CacheConfig, PageCache, PageRevalidator},
    config::Args,
    content::ContentRepository,
    db::{MemoryRowStore, MongoClient, MongoRowStore, RowStore},
    server::{self, AppState, StorageMode},
};

/// Connect a MongoDB-backed row store and apply indexes
async fn connect_store(uri: &str, db: &str) -> commonground::Result<MongoRowStore> {
    let store = MongoRowStore::new(MongoClient::new(uri, db).await?);
    store.ensure_indexes().await?;
    Ok(store)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let log_level = args.log_level.clone();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("commonground={},info", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = args.validate() {
        error!("Configuration error: {}", e);
        std::process::exit(1);
    }

    let demo_email = args.demo_account_email();
    let site_url = args.site_url();

    info!("======================================");
    info!("  CommonGround content service");
    info!("  {} ({})", env!("CARGO_PKG_VERSION"), env!("GIT_COMMIT_SHORT"));
    info!("======================================");
    info!("Listen: {}", args.listen);
    info!("Mode: {}", if args.dev_mode { "DEVELOPMENT" } else { "PRODUCTION" });
    info!("MongoDB: {}", args.mongodb_uri);
    info!("Site URL: {}", site_url);
    info!("Demo account: {}", demo_email.as_deref().unwrap_or("(disabled)"));
    info!("======================================");

    // Session token validation
    let jwt = match &args.jwt_secret {
        Some(secret) => match JwtValidator::new(secret.clone(), args.jwt_expiry_seconds) {
            Ok(jwt) => jwt,
            Err(e) => {
                error!("{}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("JWT_SECRET not set (dev mode), using insecure development secret");
            JwtValidator::new_dev()
        }
    };

    // Row stores: the regular handle and the service-role handle for contact
    // submissions. Both fall back to one in-memory store in dev mode.
    let (store, service_store, storage): (Arc<dyn RowStore>, Arc<dyn RowStore>, StorageMode) =
        match connect_store(&args.mongodb_uri, &args.mongodb_db).await {
            Ok(store) => {
                info!("MongoDB connected successfully");
                let service_uri = args.service_mongodb_uri();
                let store: Arc<dyn RowStore> = Arc::new(store);
                let service_store: Arc<dyn RowStore> = if service_uri == args.mongodb_uri {
                    Arc::clone(&store)
                } else {
                    match connect_store(service_uri, &args.mongodb_db).await {
                        Ok(s) => Arc::new(s),
                        Err(e) => {
                            error!("Service-role MongoDB connection failed: {}", e);
                            std::process::exit(1);
                        }
                    }
                };
                (store, service_store, StorageMode::MongoDb)
            }
            Err(e) => {
                if args.dev_mode {
                    warn!("MongoDB connection failed (dev mode, using in-memory store): {}", e);
                    let memory: Arc<dyn RowStore> = Arc::new(MemoryRowStore::new());
                    (Arc::clone(&memory), memory, StorageMode::Memory)
                } else {
                    error!("MongoDB connection failed: {}", e);
                    std::process::exit(1);
                }
            }
        };

    // Auth provider: hosted service when configured, local accounts otherwise
    let provider: Arc<dyn AuthProvider> = match args.hosted_auth() {
        Some((url, key)) => match GoTrueProvider::new(url, key, args.request_timeout_ms) {
            Ok(p) => {
                info!("Hosted auth service: {}", url);
                Arc::new(p)
            }
            Err(e) => {
                error!("Auth client setup failed: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            let local = LocalAuthProvider::new(jwt.clone());
            local.add_account(&args.dev_admin_email, &args.dev_admin_password)?;
            if let Some(demo) = &demo_email {
                local.add_account(demo, &args.dev_admin_password)?;
            }
            warn!("Using local auth provider (dev mode) - sign in as {}", args.dev_admin_email);
            Arc::new(local)
        }
    };

    // Page cache and invalidation
    let cache = Arc::new(PageCache::new(CacheConfig::from_env()));
    let revalidator = PageRevalidator::new(Arc::clone(&cache));
    let mut invalidations = revalidator.subscribe();
    tokio::spawn(async move {
        loop {
            match invalidations.recv().await {
                Ok(path) => debug!(path = %path, "Surface marked stale"),
                Err(RecvError::Lagged(skipped)) => debug!(skipped = skipped, "Invalidation log lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    let content = ContentActions::new(
        ContentRepository::new(store),
        ContentRepository::new(service_store),
        DemoGate::new(demo_email),
        Arc::new(revalidator),
    );
    let auth = AuthActions::new(provider, site_url);

    let state = Arc::new(AppState::new(args, jwt, content, auth, cache, storage));

    if let Err(e) = server::run(state).await {
        error!("Server error: {:?}", e);
        std::process::exit(1);
    }

    Ok(())
}
