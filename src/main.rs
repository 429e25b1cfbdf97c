use anyhow::Result;
use kube::Client;
use tracing::{debug, info};

use kube_inventory::{load_config, KubeInventory, KubeLister, LineProtocolWriter};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cfg = load_config()?;
    info!(
        "namespace = {}, interval = {:?}",
        cfg.namespace.as_deref().unwrap_or("<all>"),
        cfg.collection_interval
    );

    let client = Client::try_default().await?;
    let lister = KubeLister::new(client, cfg.namespace.clone());
    let inventory = KubeInventory::new(lister, cfg.clone());
    info!("resources = {:?}", inventory.selected_resources());

    let mut ticker = tokio::time::interval(cfg.collection_interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                debug!("starting collection");
                inventory.gather(&LineProtocolWriter).await;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
