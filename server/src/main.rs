mod config;
mod embedded;
mod routes;

use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;

async fn http_server(config: config::ServerConfig) -> std::io::Result<()> {
    let app = routes::router(&config);
    let addr = SocketAddr::from((config.ip_addr(), config.http_port));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr).serve(app.into_make_service()).await
}

async fn https_server(config: config::ServerConfig) -> std::io::Result<()> {
    let app = routes::router(&config);

    let cert_path = config.ssl_cert_path.as_deref().unwrap_or("server.crt");
    let key_path = config.ssl_key_path.as_deref().unwrap_or("server.key");

    let rustls_config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|e| {
            tracing::error!(
                "Failed to load SSL certificates (cert: '{}', key: '{}'): {}",
                cert_path,
                key_path,
                e
            );
            e
        })?;

    let addr = SocketAddr::from((config.ip_addr(), config.https_port));

    tracing::info!("HTTPS server listening on {}", addr);
    axum_server::bind_rustls(addr, rustls_config)
        .serve(app.into_make_service())
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| "Failed to install default rustls crypto provider")?;

    let config = config::Config::load_or_default();

    tracing_subscriber::fmt()
        .with_max_level(config.logging.tracing_level())
        .init();

    tracing::info!("Starting ProCam server");
    tracing::info!("Configuration loaded:");
    tracing::info!("  HTTP enabled: {}, port: {}", config.server.enable_http, config.server.http_port);
    tracing::info!("  HTTPS enabled: {}, port: {}", config.server.enable_https, config.server.https_port);
    tracing::info!("  Host: {}", config.server.host);
    tracing::info!("  Package dir: {}", config.server.pkg_dir);
    tracing::info!("  Log level: {}", config.logging.level);

    let mut tasks = Vec::new();

    if config.server.enable_http {
        let http_config = config.server.clone();
        tasks.push(tokio::spawn(async move { http_server(http_config).await }));
    } else {
        tracing::info!("HTTP server disabled in configuration");
    }

    if config.server.enable_https {
        let https_config = config.server.clone();
        tasks.push(tokio::spawn(async move { https_server(https_config).await }));
    } else {
        tracing::info!("HTTPS server disabled in configuration");
    }

    if tasks.is_empty() {
        tracing::error!("No servers enabled! Enable HTTP or HTTPS in the configuration.");
        return Err("No servers enabled".into());
    }

    for task in tasks {
        task.await??;
    }

    Ok(())
}
