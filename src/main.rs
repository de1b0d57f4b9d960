use order_server::{Config, Server, ServerState, init_logger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger();

    tracing::info!("Order server starting...");

    let config = Config::from_env();
    let state = ServerState::initialize(&config).await?;

    Server::with_state(config, state).run().await
}
