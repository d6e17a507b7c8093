use sweet_provider::{init_logging, serve, SweetProvider};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Sweet provider");
    serve(SweetProvider::new(env!("CARGO_PKG_VERSION"))).await
}
