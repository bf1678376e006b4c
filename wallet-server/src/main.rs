#[macro_use]
extern crate tracing;

use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use actix_cors::Cors;
use actix_web::{App, HttpServer};
use anyhow::Context;
use rand::Rng;
use rustls::{Certificate, PrivateKey, ServerConfig};
use rustls_pemfile::{certs, pkcs8_private_keys};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry;

use wallet_lib::auth::jwt::JWTAuth;
use wallet_lib::config::Config;
use wallet_repo::Repos;

const SERVICE_NAME: &str = "wallet-server";

#[actix_web::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default());
    let tracing_guard = tracing::subscriber::set_default(subscriber);
    info!("tracing initialized");

    let config = match get_config_file() {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            info!("No config file found, reading config from environment");
            Config::from_env()?
        }
    };

    let telemetry_layer = match &config.telemetry {
        Some(telemetry) => Some(wallet_lib::tracing::create_opentelemetry_layer(
            SERVICE_NAME,
            telemetry,
        )?),
        None => None,
    };

    let subscriber = registry::Registry::default()
        .with(LevelFilter::INFO)
        .with(tracing_subscriber::fmt::Layer::default())
        .with(telemetry_layer);
    tracing::subscriber::set_global_default(subscriber).context("Unable to set up subscriber")?;
    drop(tracing_guard);

    let repos = create_repos(&config).await?;
    if let Some(admin) = &config.admin {
        wallet_lib::admin::ensure_admin(repos.user_repo.as_ref(), admin).await?;
    }

    let secret = get_secret()?;
    let jwt_auth = JWTAuth::from_secret(secret);

    let signups_enabled = config.signups_enabled;
    let cors_origins = config.cors_origins.clone();
    let mut server = HttpServer::new(move || {
        let cors = cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
            .allow_any_method()
            .allow_any_header();

        App::new()
            .wrap(cors)
            .wrap(wallet_lib::tracing::create_middleware())
            .configure(wallet_lib::app_config_func(
                jwt_auth.clone(),
                repos.clone(),
                signups_enabled,
            ))
    });
    server = match config.ssl {
        None => {
            warn!("Using http");
            server.bind(&config.listen_address)?
        }
        Some(ssl_config) => {
            info!("Using https");

            let rustls_config = ServerConfig::builder()
                .with_safe_defaults()
                .with_no_client_auth();

            let mut cert_file = BufReader::new(
                File::open(ssl_config.certificate_chain_file)
                    .context("Error opening certificate chain file")?,
            );
            let mut key_file = BufReader::new(
                File::open(ssl_config.private_key_file)
                    .context("Error opening private key file")?,
            );

            let cert_chain = certs(&mut cert_file)
                .context("Unable to read certificate chain file")?
                .into_iter()
                .map(Certificate)
                .collect();
            let mut keys: Vec<PrivateKey> = pkcs8_private_keys(&mut key_file)
                .context("Unable to read private key file")?
                .into_iter()
                .map(PrivateKey)
                .collect();

            if keys.is_empty() {
                error!("No private key found in file");
                std::process::exit(1);
            }

            let rustls_config = rustls_config.with_single_cert(cert_chain, keys.remove(0))?;

            server.bind_rustls(&config.listen_address, rustls_config)?
        }
    };
    info!(listen_address = %config.listen_address, "Starting server");
    server.run().await?;

    Ok(())
}

async fn create_repos(config: &Config) -> Result<Repos, anyhow::Error> {
    match &config.database_url {
        Some(database_url) => {
            info!("Using postgres storage");
            wallet_repo::sqlx_repo::create_repos(database_url.clone(), config.max_pool_size).await
        }
        None => {
            warn!("No database configured, data is kept in memory");
            Ok(wallet_repo::mem_repo::create_repos())
        }
    }
}

fn get_config_file() -> Option<PathBuf> {
    let config_current_dir = PathBuf::from("config.toml");
    if config_current_dir.exists() {
        return Some(config_current_dir);
    }
    if let Ok(config_env) = std::env::var("CONFIGURATION_DIRECTORY") {
        let config_path = PathBuf::from(config_env).join("config.toml");
        if config_path.exists() {
            return Some(config_path);
        }
    }

    None
}

fn get_state_dir() -> PathBuf {
    if let Ok(state_env) = std::env::var("STATE_DIRECTORY") {
        return PathBuf::from(state_env);
    }

    PathBuf::from("data")
}

/// Gets the signing secret from the state directory, generating and saving a new one on first start
fn get_secret() -> Result<Vec<u8>, Box<dyn Error>> {
    let state_dir = get_state_dir();
    let secret_file = state_dir.join("secret");
    if secret_file.exists() {
        Ok(fs::read(secret_file)?)
    } else {
        let mut rng = rand::thread_rng();
        let mut secret: [u8; 128] = [0; 128];
        rng.fill(&mut secret);

        fs::create_dir_all(state_dir)?;
        fs::write(secret_file, secret)?;

        Ok(secret.to_vec())
    }
}
