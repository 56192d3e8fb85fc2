use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;

use docstream::application::ports::DocumentFetcher;
use docstream::application::services::{
    ConsumptionBindingController, DocumentIngress, DocumentProcessor, PendingReporter,
    ProcessingControl, ProcessingLedger, ProcessorConfig,
};
use docstream::domain::{SourceKind, StoragePath};
use docstream::infrastructure::fetch::{FileFetcher, HttpFetcher, RoutingFetcher, StoreFetcher};
use docstream::infrastructure::messaging::{
    BindingConfig, BindingRegistry, ConsumerBinding, InMemoryBroker,
};
use docstream::infrastructure::observability::{TracingConfig, init_tracing};
use docstream::infrastructure::storage::StoreFactory;
use docstream::infrastructure::text_processing::{ChunkSizing, ExtractorFactory, TokenTextSplitter};
use docstream::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = match std::env::var("APP_ENVIRONMENT") {
        Ok(value) => value.parse::<Environment>().map_err(anyhow::Error::msg)?,
        Err(_) => Environment::Local,
    };
    let settings = Settings::load(environment).context("failed to load settings")?;

    init_tracing(&TracingConfig::from_settings(environment, &settings.logging));

    let broker = Arc::new(InMemoryBroker::new());
    broker.declare(&settings.messaging.output_destination);

    let durable_store = StoreFactory::create_durable(&settings.storage)?;
    let staging_store = StoreFactory::create_staging(&settings.storage)?;

    let download_timeout = Duration::from_secs(settings.processing.download_timeout_secs);
    let http_fetcher: Arc<dyn DocumentFetcher> = Arc::new(HttpFetcher::new(download_timeout)?);
    let file_fetcher: Arc<dyn DocumentFetcher> = Arc::new(FileFetcher);
    let store_fetcher: Arc<dyn DocumentFetcher> =
        Arc::new(StoreFetcher::new(Arc::clone(&durable_store)));
    let fetcher = Arc::new(RoutingFetcher::new(vec![
        (SourceKind::Http, http_fetcher),
        (SourceKind::File, file_fetcher),
        (SourceKind::Hdfs, store_fetcher),
    ]));

    let extractor = ExtractorFactory::create(&settings.processing);
    let splitter = Arc::new(TokenTextSplitter::new(ChunkSizing::from_settings(
        &settings.chunking,
    )));

    let ledger = Arc::new(ProcessingLedger::new());
    let output_dir = StoragePath::from_raw(settings.storage.output_dir.clone());

    let processor = Arc::new(DocumentProcessor::new(
        fetcher,
        staging_store,
        extractor,
        splitter,
        Arc::clone(&durable_store),
        broker.clone(),
        Arc::clone(&ledger),
        ProcessorConfig {
            output_dir: output_dir.clone(),
            output_destination: settings.messaging.output_destination.clone(),
            chunk_size_bytes: settings.chunking.chunk_size_bytes,
            emission: settings.chunking.emission,
            max_document_bytes: Some(settings.processing.max_document_bytes).filter(|limit| *limit > 0),
            download_timeout,
            extraction_timeout: Duration::from_secs(settings.processing.extraction_timeout_secs),
        },
    ));

    let control = Arc::new(ProcessingControl::new(
        Arc::clone(&ledger),
        Arc::clone(&durable_store),
        output_dir,
    ));

    let binding = ConsumerBinding::new(
        BindingConfig::from_settings(&settings.messaging, control.is_enabled()),
        Arc::clone(&broker),
        processor,
    );
    let registry = Arc::new(BindingRegistry::new());
    registry.register(Arc::clone(&binding));
    let workers = binding.spawn_workers();

    let consumption = Arc::new(ConsumptionBindingController::new(
        registry.clone(),
        settings.messaging.binding_name.clone(),
    ));
    control.subscribe(consumption.clone());
    consumption.spawn_startup_guard(
        Arc::clone(&control),
        Duration::from_millis(settings.messaging.startup_stop_delay_ms),
    );

    let pending = Arc::new(PendingReporter::new(
        settings.pending.mode,
        broker.clone(),
        settings.messaging.input_destination.clone(),
        Arc::clone(&durable_store),
        StoragePath::from_raw(settings.storage.input_dir.clone()),
    ));

    let ingress = Arc::new(DocumentIngress::new(
        broker.clone(),
        settings.messaging.input_destination.clone(),
    ));

    let state = AppState {
        control,
        consumption,
        ledger,
        pending,
        ingress,
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("invalid server address")?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(
        %addr,
        environment = %environment,
        binding = %settings.messaging.binding_name,
        "Listening"
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.shutdown_all();
    for worker in workers {
        if let Err(e) = worker.await {
            tracing::warn!(error = %e, "Consumer worker ended abnormally");
        }
    }
    tracing::info!("Shutdown complete");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
