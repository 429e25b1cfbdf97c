use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

pub const NODE_MEASUREMENT: &str = "kubernetes_node";
pub const POD_CONTAINER_MEASUREMENT: &str = "kubernetes_pod_container";
pub const DEPLOYMENT_MEASUREMENT: &str = "kubernetes_deployment";
pub const DAEMONSET_MEASUREMENT: &str = "kubernetes_daemonset";
pub const STATEFULSET_MEASUREMENT: &str = "kubernetes_statefulset";
pub const PERSISTENTVOLUME_MEASUREMENT: &str = "kubernetes_persistentvolume";
pub const PERSISTENTVOLUMECLAIM_MEASUREMENT: &str = "kubernetes_persistentvolumeclaim";
pub const SERVICE_MEASUREMENT: &str = "kubernetes_service";
pub const ENDPOINT_MEASUREMENT: &str = "kubernetes_endpoint";
pub const INGRESS_MEASUREMENT: &str = "kubernetes_ingress";

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` gathers across all namespaces.
    pub namespace: Option<String>,
    pub response_timeout: Duration,
    pub collection_interval: Duration,
    pub resource_include: Vec<String>,
    pub resource_exclude: Vec<String>,
    pub selector_include: Vec<String>,
    pub selector_exclude: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: None,
            response_timeout: Duration::from_secs(5),
            collection_interval: Duration::from_secs(60),
            resource_include: Vec::new(),
            resource_exclude: Vec::new(),
            selector_include: Vec::new(),
            selector_exclude: vec!["*".to_string()],
        }
    }
}

/// Resource kinds with a gatherer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Nodes,
    Pods,
    Deployments,
    DaemonSets,
    StatefulSets,
    PersistentVolumes,
    PersistentVolumeClaims,
    Services,
    Endpoints,
    Ingress,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 10] = [
        ResourceKind::Nodes,
        ResourceKind::Pods,
        ResourceKind::Deployments,
        ResourceKind::DaemonSets,
        ResourceKind::StatefulSets,
        ResourceKind::PersistentVolumes,
        ResourceKind::PersistentVolumeClaims,
        ResourceKind::Services,
        ResourceKind::Endpoints,
        ResourceKind::Ingress,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Nodes => "nodes",
            ResourceKind::Pods => "pods",
            ResourceKind::Deployments => "deployments",
            ResourceKind::DaemonSets => "daemonsets",
            ResourceKind::StatefulSets => "statefulsets",
            ResourceKind::PersistentVolumes => "persistentvolumes",
            ResourceKind::PersistentVolumeClaims => "persistentvolumeclaims",
            ResourceKind::Services => "services",
            ResourceKind::Endpoints => "endpoints",
            ResourceKind::Ingress => "ingress",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value of an emitted point.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl FieldValue {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(i64::from(v))
    }
}

impl From<usize> for FieldValue {
    fn from(v: usize) -> Self {
        FieldValue::Int(i64::try_from(v).unwrap_or(i64::MAX))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Str(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Str(v.to_string())
    }
}

pub type Fields = BTreeMap<String, FieldValue>;
pub type Tags = BTreeMap<String, String>;

/// Insert a tag, dropping it when the value is empty.
pub fn insert_tag(tags: &mut Tags, key: impl Into<String>, value: impl Into<String>) {
    let value = value.into();
    if !value.is_empty() {
        tags.insert(key.into(), value);
    }
}

/// The sole output artifact of a gather cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricPoint {
    pub measurement: String,
    pub fields: Fields,
    pub tags: Tags,
}

impl MetricPoint {
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|s| s.as_str())
    }
}
