use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{DaemonSet, Deployment, StatefulSet};
use k8s_openapi::api::core::v1::{
    Endpoints, Node, PersistentVolume, PersistentVolumeClaim, Pod, Service,
};
use k8s_openapi::api::networking::v1::Ingress;
use k8s_openapi::NamespaceResourceScope;
use kube::{api::ListParams, Api, Client, Resource};
use serde::de::DeserializeOwned;

use crate::error::ListError;
use crate::metrics::base::{PodMetrics, PodMetricsList};

/// One list call per resource kind. Deadlines are applied by the caller.
#[async_trait]
pub trait ResourceLister: Send + Sync {
    async fn list_nodes(&self) -> Result<Vec<Node>, ListError>;
    async fn list_pods(&self) -> Result<Vec<Pod>, ListError>;
    async fn list_pod_metrics(&self) -> Result<Vec<PodMetrics>, ListError>;
    async fn list_deployments(&self) -> Result<Vec<Deployment>, ListError>;
    async fn list_daemonsets(&self) -> Result<Vec<DaemonSet>, ListError>;
    async fn list_statefulsets(&self) -> Result<Vec<StatefulSet>, ListError>;
    async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>, ListError>;
    async fn list_persistent_volume_claims(&self) -> Result<Vec<PersistentVolumeClaim>, ListError>;
    async fn list_services(&self) -> Result<Vec<Service>, ListError>;
    async fn list_endpoints(&self) -> Result<Vec<Endpoints>, ListError>;
    async fn list_ingresses(&self) -> Result<Vec<Ingress>, ListError>;
}

/// `ResourceLister` backed by a `kube::Client`.
#[derive(Clone)]
pub struct KubeLister {
    client: Client,
    namespace: Option<String>,
}

impl KubeLister {
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        Self { client, namespace }
    }

    fn scoped<K>(&self) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }

    fn pod_metrics_path(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("/apis/metrics.k8s.io/v1beta1/namespaces/{}/pods", ns),
            None => "/apis/metrics.k8s.io/v1beta1/pods".to_string(),
        }
    }
}

async fn list_items<K>(api: Api<K>) -> Result<Vec<K>, ListError>
where
    K: Resource + Clone + DeserializeOwned + Debug,
{
    Ok(api.list(&ListParams::default()).await?.items)
}

#[async_trait]
impl ResourceLister for KubeLister {
    async fn list_nodes(&self) -> Result<Vec<Node>, ListError> {
        list_items(Api::<Node>::all(self.client.clone())).await
    }

    async fn list_pods(&self) -> Result<Vec<Pod>, ListError> {
        list_items(self.scoped::<Pod>()).await
    }

    async fn list_pod_metrics(&self) -> Result<Vec<PodMetrics>, ListError> {
        use http::Request as HttpRequest;
        let req = HttpRequest::builder()
            .method("GET")
            .uri(self.pod_metrics_path())
            .body(Vec::new())?;
        let list: PodMetricsList = self.client.request(req).await?;
        Ok(list.items)
    }

    async fn list_deployments(&self) -> Result<Vec<Deployment>, ListError> {
        list_items(self.scoped::<Deployment>()).await
    }

    async fn list_daemonsets(&self) -> Result<Vec<DaemonSet>, ListError> {
        list_items(self.scoped::<DaemonSet>()).await
    }

    async fn list_statefulsets(&self) -> Result<Vec<StatefulSet>, ListError> {
        list_items(self.scoped::<StatefulSet>()).await
    }

    async fn list_persistent_volumes(&self) -> Result<Vec<PersistentVolume>, ListError> {
        list_items(Api::<PersistentVolume>::all(self.client.clone())).await
    }

    async fn list_persistent_volume_claims(&self) -> Result<Vec<PersistentVolumeClaim>, ListError> {
        list_items(self.scoped::<PersistentVolumeClaim>()).await
    }

    async fn list_services(&self) -> Result<Vec<Service>, ListError> {
        list_items(self.scoped::<Service>()).await
    }

    async fn list_endpoints(&self) -> Result<Vec<Endpoints>, ListError> {
        list_items(self.scoped::<Endpoints>()).await
    }

    async fn list_ingresses(&self) -> Result<Vec<Ingress>, ListError> {
        list_items(self.scoped::<Ingress>()).await
    }
}
