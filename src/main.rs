use dotenv::dotenv;
use rendezvous::app;
use rendezvous::modules::Modules;
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "rendezvous=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let modules = Modules::load_from_settings()
        .await
        .expect("Failed to load modules");

    info!("Starting server");
    info!("Listening on {}", modules.app.addr);
    axum::Server::bind(&modules.app.addr)
        .serve(
            app(modules.state())
                .await
                .into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .expect("Failed to run axum server");
}
