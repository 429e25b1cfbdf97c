use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::Deserialize;
use tokio::time::{timeout_at, Instant};
use tracing::warn;

use crate::error::{GatherError, ListError};
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, ResourceKind, Tags};

/// Usage of one container as reported by the metrics API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContainerMetrics {
    pub name: String,
    #[serde(default)]
    pub usage: BTreeMap<String, Quantity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PodMetrics {
    #[serde(default)]
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub containers: Vec<ContainerMetrics>,
}

#[derive(Debug, Deserialize)]
pub struct PodMetricsList {
    #[serde(default)]
    pub items: Vec<PodMetrics>,
}

/// Run a list call under an absolute deadline.
pub async fn list_with_deadline<T, F>(deadline: Instant, budget: Duration, fut: F) -> Result<T, ListError>
where
    F: Future<Output = Result<T, ListError>>,
{
    match timeout_at(deadline, fut).await {
        Ok(result) => result,
        Err(_) => Err(ListError::Timeout(budget)),
    }
}

/// Pods joined with whatever usage metrics were available.
#[derive(Debug, Default)]
pub struct PodInventory {
    pub pods: Vec<Pod>,
    pub usage: Vec<PodMetrics>,
}

impl PodInventory {
    /// Container usage recorded for the pod with the same name and namespace.
    /// The first match wins.
    pub fn usage_for(&self, pod: &Pod) -> Option<&[ContainerMetrics]> {
        self.usage
            .iter()
            .find(|m| m.metadata.name == pod.metadata.name && m.metadata.namespace == pod.metadata.namespace)
            .map(|m| m.containers.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Pod, Option<&[ContainerMetrics]>)> {
        self.pods.iter().map(move |p| (p, self.usage_for(p)))
    }
}

/// Fetch pods and pod usage metrics concurrently under one shared deadline.
///
/// A pod listing failure is returned; a usage failure is logged and the
/// inventory carries on with no usage data.
pub async fn correlate<L: ResourceLister + ?Sized>(lister: &L, budget: Duration) -> Result<PodInventory, GatherError> {
    let deadline = Instant::now() + budget;
    let (pods, usage) = tokio::join!(
        list_with_deadline(deadline, budget, lister.list_pods()),
        list_with_deadline(deadline, budget, lister.list_pod_metrics()),
    );

    let pods = pods.map_err(|e| GatherError::list(ResourceKind::Pods, e))?;
    let usage = usage.unwrap_or_else(|e| {
        warn!("Failed to load pod metrics: {}", e);
        Vec::new()
    });

    Ok(PodInventory { pods, usage })
}

/// Creation time of an object, `None` when unset.
pub fn creation_time(meta: &ObjectMeta) -> Option<DateTime<Utc>> {
    meta.creation_timestamp.as_ref().map(|t| t.0)
}

/// Creation time in Unix nanoseconds.
pub fn created_nanos(created: DateTime<Utc>) -> i64 {
    created.timestamp_nanos_opt().unwrap_or(i64::MAX)
}

/// Attach `<prefix><key>` tags for the label keys that pass `filter`.
pub fn insert_selector_tags(
    tags: &mut Tags,
    prefix: &str,
    labels: Option<&BTreeMap<String, String>>,
    filter: &Filter,
) {
    for (key, value) in labels.into_iter().flatten() {
        if filter.matches(key) {
            insert_tag(tags, format!("{}{}", prefix, key), value.as_str());
        }
    }
}
