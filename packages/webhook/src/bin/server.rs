use clap::Parser;
use quizfunnel_webhook::{router, WebhookState, HOTMART_PATH};
use std::net::SocketAddr;
use tracing::info;

/// Hotmart webhook receiver for the quiz funnel
#[derive(Parser, Debug)]
#[command(name = "quizfunnel-webhook")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "3030")]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;

    let app = router(WebhookState::new());

    info!(%addr, path = HOTMART_PATH, "Webhook listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
