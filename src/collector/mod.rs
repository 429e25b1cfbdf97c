use std::future::Future;

use futures::future::join_all;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::accumulator::Accumulator;
use crate::error::{GatherError, ListError};
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::metrics;
use crate::metrics::base::list_with_deadline;
use crate::types::{Config, ResourceKind};

/// Gathers inventory metrics for every selected resource kind.
pub struct KubeInventory<L> {
    lister: L,
    config: Config,
    resource_filter: Filter,
    selector_filter: Filter,
}

impl<L: ResourceLister> KubeInventory<L> {
    pub fn new(lister: L, config: Config) -> Self {
        let resource_filter = Filter::new(&config.resource_include, &config.resource_exclude);
        let selector_filter = Filter::new(&config.selector_include, &config.selector_exclude);
        Self {
            lister,
            config,
            resource_filter,
            selector_filter,
        }
    }

    pub fn lister(&self) -> &L {
        &self.lister
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selector_filter(&self) -> &Filter {
        &self.selector_filter
    }

    /// Resource kinds that pass the resource include/exclude lists.
    pub fn selected_resources(&self) -> Vec<ResourceKind> {
        ResourceKind::ALL
            .into_iter()
            .filter(|kind| self.resource_filter.matches(kind.as_str()))
            .collect()
    }

    /// Run one collection cycle. Gatherers run concurrently and never abort each other.
    pub async fn gather(&self, acc: &dyn Accumulator) {
        let kinds = self.selected_resources();
        info!("Gathering {} resource kinds", kinds.len());
        join_all(kinds.into_iter().map(|kind| self.gather_resource(kind, acc))).await;
    }

    pub async fn gather_resource(&self, kind: ResourceKind, acc: &dyn Accumulator) {
        debug!("Gathering {}", kind);
        match kind {
            ResourceKind::Nodes => metrics::nodes::collect_nodes(self, acc).await,
            ResourceKind::Pods => metrics::pods::collect_pods(self, acc).await,
            ResourceKind::Deployments => metrics::deployments::collect_deployments(self, acc).await,
            ResourceKind::DaemonSets => metrics::daemonsets::collect_daemonsets(self, acc).await,
            ResourceKind::StatefulSets => metrics::statefulsets::collect_statefulsets(self, acc).await,
            ResourceKind::PersistentVolumes => {
                metrics::persistentvolumes::collect_persistent_volumes(self, acc).await
            }
            ResourceKind::PersistentVolumeClaims => {
                metrics::persistentvolumeclaims::collect_persistent_volume_claims(self, acc).await
            }
            ResourceKind::Services => metrics::services::collect_services(self, acc).await,
            ResourceKind::Endpoints => metrics::endpoints::collect_endpoints(self, acc).await,
            ResourceKind::Ingress => metrics::ingress::collect_ingresses(self, acc).await,
        }
    }

    /// Run a single list call under the configured response timeout.
    pub async fn fetch<T, F>(&self, kind: ResourceKind, fut: F) -> Result<Vec<T>, GatherError>
    where
        F: Future<Output = Result<Vec<T>, ListError>>,
    {
        let budget = self.config.response_timeout;
        list_with_deadline(Instant::now() + budget, budget, fut)
            .await
            .map_err(|e| GatherError::list(kind, e))
    }
}
