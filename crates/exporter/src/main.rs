mod cli;
mod server;


use clap::Parser;
use cli::Cli;
use lkl_exporter::recovery::recover;
use lkl_exporter::{metrics, Exporter};
use prometheus_client::registry::Registry;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};


fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    init_tracing(args.json_log);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(args))
}


fn init_tracing(json_log: bool) {
    use std::io::IsTerminal;

    let env_filter = tracing_subscriber::EnvFilter::builder().parse_lossy(
        std::env::var(tracing_subscriber::EnvFilter::DEFAULT_ENV)
            .unwrap_or("info".to_string()),
    );

    if std::io::stdout().is_terminal() && !json_log {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .json()
            .with_current_span(false)
            .init();
    }
}


async fn run(args: Cli) -> anyhow::Result<()> {
    if let Some(port) = args.prom_port {
        let mut registry = Registry::default();
        metrics::register_metrics(&mut registry);
        tokio::spawn(async move {
            if let Err(err) = server::run_server(registry, port).await {
                error!(error =? err, "metrics server failed");
            }
        });
    }

    let client = args.node_client()?;
    let sink = args.build_sink()?;

    let first_block = match args.start_block {
        Some(block) => block,
        None => recover(&sink).await
    };

    if args.exit_block.is_some_and(|exit_block| first_block >= exit_block) {
        info!("nothing to do, block #{} is at or above the exit block", first_block);
        return Ok(())
    }

    info!(node = %client.url(), sink = ?args.sink, "running exporter from block #{}", first_block);

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            shutdown_signal().await;
            info!("shutdown requested, finishing the current block");
            shutdown.cancel();
        }
    });

    let mut exporter = Exporter::new(client, sink, args.export_config(first_block))
        .with_shutdown(shutdown);

    let report = exporter.run().await?;

    info!(
        blocks = report.blocks,
        transactions = report.transactions,
        unresolved = report.unresolved,
        "export finished, last processed block: {}",
        report.last_block.map_or("none".to_string(), |b| b.to_string())
    );

    Ok(())
}


/// Resolves on ctrl-c or SIGTERM. A handler which fails to install is
/// logged and never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error =? err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            },
            Err(err) => {
                error!(error =? err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
