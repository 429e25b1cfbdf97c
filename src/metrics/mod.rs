// Per-resource gatherers
pub mod base;
pub mod nodes;
pub mod pods;
pub mod deployments;
pub mod daemonsets;
pub mod statefulsets;
pub mod persistentvolumes;
pub mod persistentvolumeclaims;
pub mod services;
pub mod endpoints;
pub mod ingress;

// Re-export commonly used items
pub use base::{correlate, ContainerMetrics, PodInventory, PodMetrics, PodMetricsList};
pub use nodes::{gather_node, gather_node_count};
pub use pods::{container_state, gather_pod, ContainerState};
