use k8s_openapi::api::core::v1::Node;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::conditions::aggregate_node_conditions;
use crate::kubernetes::ResourceLister;
use crate::resources::{project_resources, NODE_ALLOCATABLE_FIELDS, NODE_CAPACITY_FIELDS};
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, NODE_MEASUREMENT};

const CLUSTER_NAMESPACE_ANNOTATION: &str = "cluster.x-k8s.io/cluster-namespace";

/// List nodes and emit the node count, per-node summaries and condition rows.
pub async fn collect_nodes<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let nodes = match inv.fetch(ResourceKind::Nodes, inv.lister().list_nodes()).await {
        Ok(nodes) => nodes,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    gather_node_count(nodes.len(), acc);

    for node in &nodes {
        gather_node(node, acc);
    }
}

pub fn gather_node_count(count: usize, acc: &dyn Accumulator) {
    let mut fields = Fields::new();
    fields.insert("node_count".into(), FieldValue::from(count));
    acc.add_fields(NODE_MEASUREMENT, fields, Tags::new());
}

pub fn gather_node(node: &Node, acc: &dyn Accumulator) {
    let mut tags = Tags::new();
    insert_tag(&mut tags, "node_name", node.metadata.name.clone().unwrap_or_default());
    if let Some(cluster_ns) = node
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(CLUSTER_NAMESPACE_ANNOTATION))
    {
        insert_tag(&mut tags, "cluster_namespace", cluster_ns.as_str());
    }
    if let Some(version) = node
        .status
        .as_ref()
        .and_then(|s| s.node_info.as_ref())
        .map(|info| info.kubelet_version.as_str())
    {
        insert_tag(&mut tags, "version", version);
    }

    let mut fields = Fields::new();
    let status = node.status.as_ref();
    if let Some(capacity) = status.and_then(|s| s.capacity.as_ref()) {
        project_resources(capacity, NODE_CAPACITY_FIELDS, &mut fields, acc);
    }
    if let Some(allocatable) = status.and_then(|s| s.allocatable.as_ref()) {
        project_resources(allocatable, NODE_ALLOCATABLE_FIELDS, &mut fields, acc);
    }

    let unschedulable = node
        .spec
        .as_ref()
        .and_then(|s| s.unschedulable)
        .unwrap_or(false);
    fields.insert("spec_unschedulable".into(), unschedulable.into());

    let conditions = status
        .and_then(|s| s.conditions.as_deref())
        .unwrap_or_default();
    let report = aggregate_node_conditions(conditions);
    report.summary.write_fields(&mut fields);

    acc.add_fields(NODE_MEASUREMENT, fields, tags.clone());

    for row in &report.rows {
        acc.add_fields(NODE_MEASUREMENT, row.fields(), row.tags(&tags));
    }
}
