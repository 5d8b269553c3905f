use kv_cluster::config::{ControllerConfig, WorkerConfig};
use kv_cluster::controller::{self, ControllerState};
use kv_cluster::worker::{self, heartbeat, WorkerState};
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut role: Option<String> = None;
    let mut bind_addr: Option<SocketAddr> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--role" => {
                role = Some(args[i + 1].clone());
                i += 2;
            }
            "--bind" => {
                bind_addr = Some(args[i + 1].parse()?);
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let (Some(role), Some(bind_addr)) = (role, bind_addr) else {
        eprintln!("Usage: {} --role <controller|worker> --bind <addr:port>", args[0]);
        eprintln!("Example: {} --role controller --bind 0.0.0.0:8000", args[0]);
        eprintln!("Example: ID=w1 ADDRESS=http://localhost:8001 {} --role worker --bind 0.0.0.0:8001", args[0]);
        std::process::exit(1);
    };

    match role.as_str() {
        "controller" => run_controller(bind_addr).await,
        "worker" => run_worker(bind_addr).await,
        other => {
            eprintln!("Unknown role '{}', expected 'controller' or 'worker'", other);
            std::process::exit(1);
        }
    }
}

async fn run_controller(bind_addr: SocketAddr) -> anyhow::Result<()> {
    let cfg = ControllerConfig::from_env();
    tracing::info!(
        "Starting controller on {} (replicas={}, heartbeat_timeout={:?})",
        bind_addr,
        cfg.replicas,
        cfg.heartbeat_timeout
    );

    let state = ControllerState::new(cfg);

    // Failure detector runs for the life of the process.
    let _detector = kv_cluster::controller::detector::spawn(state.clone());

    let app = controller::router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Controller listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn run_worker(bind_addr: SocketAddr) -> anyhow::Result<()> {
    let cfg = WorkerConfig::from_env();
    tracing::info!(
        "Starting worker {} on {} (controller={}, quorum={}, data_dir={})",
        cfg.id,
        bind_addr,
        cfg.controller,
        cfg.write_quorum,
        cfg.data_dir.display()
    );

    let state = WorkerState::new(cfg).await?;
    tracing::info!("{} key(s) loaded from disk", state.store.len());

    let _heartbeat = heartbeat::spawn(state.clone());

    let app = worker::router(state);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Worker listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
