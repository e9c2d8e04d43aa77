use crate::config::Config;
use crate::ort_classifier::OrtClassifier;
use crate::server::HttpServer;
use crate::storage::UploadStore;

use std::{error::Error, sync::Arc};
use tokio::{signal, sync::broadcast};

pub async fn start_app(config: Config) -> Result<(), Box<dyn Error>> {
    // A model that fails to load is fatal: no request is ever served.
    let classifier = match OrtClassifier::new(&config.model) {
        Ok(classifier) => Arc::new(classifier),
        Err(e) => {
            tracing::error!("Failed to load model: {:?}", e);
            return Err(Box::new(e));
        }
    };

    let uploads = match UploadStore::new(&config.storage.upload_dir) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to initialize upload storage: {:?}", e);
            return Err(Box::new(e));
        }
    };

    let server = HttpServer::new(classifier, uploads, &config).await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let server_shutdown_rx = shutdown_tx.subscribe();

    let server_handle = server.run(server_shutdown_rx).await?;

    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown.");

    let _ = shutdown_tx.send(());
    let _ = server_handle.await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
