use k8s_openapi::api::core::v1::{EndpointAddress, EndpointPort, Endpoints};

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, ENDPOINT_MEASUREMENT};

use super::base::{created_nanos, creation_time};

pub async fn collect_endpoints<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let endpoints = match inv
        .fetch(ResourceKind::Endpoints, inv.lister().list_endpoints())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for endpoint in &endpoints {
        gather_endpoint(endpoint, acc);
    }
}

/// Emit one point per address and port, for ready and not-ready addresses alike.
pub fn gather_endpoint(endpoint: &Endpoints, acc: &dyn Accumulator) {
    let Some(created) = creation_time(&endpoint.metadata) else {
        return;
    };

    let mut base_tags = Tags::new();
    insert_tag(&mut base_tags, "endpoint_name", endpoint.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut base_tags, "namespace", endpoint.metadata.namespace.clone().unwrap_or_default());

    let created = created_nanos(created);
    let generation = endpoint.metadata.generation.unwrap_or(0);

    for subset in endpoint.subsets.iter().flatten() {
        let ports = subset.ports.as_deref().unwrap_or_default();
        let addresses = subset
            .addresses
            .iter()
            .flatten()
            .map(|a| (a, true))
            .chain(subset.not_ready_addresses.iter().flatten().map(|a| (a, false)));

        for (address, ready) in addresses {
            let address_tags = address_tags(address, &base_tags);
            for port in ports {
                let mut fields = Fields::new();
                fields.insert("ready".into(), ready.into());
                fields.insert("port".into(), port.port.into());
                fields.insert("created".into(), FieldValue::Int(created));
                fields.insert("generation".into(), FieldValue::Int(generation));

                acc.add_fields(ENDPOINT_MEASUREMENT, fields, port_tags(port, &address_tags));
            }
        }
    }
}

fn address_tags(address: &EndpointAddress, base: &Tags) -> Tags {
    let mut tags = base.clone();
    insert_tag(&mut tags, "hostname", address.hostname.clone().unwrap_or_default());
    insert_tag(&mut tags, "node_name", address.node_name.clone().unwrap_or_default());
    // target reference becomes e.g. pod=web-0
    if let Some(target) = address.target_ref.as_ref() {
        if let Some(kind) = target.kind.as_deref() {
            insert_tag(&mut tags, kind.to_lowercase(), target.name.clone().unwrap_or_default());
        }
    }
    tags
}

fn port_tags(port: &EndpointPort, base: &Tags) -> Tags {
    let mut tags = base.clone();
    insert_tag(&mut tags, "port_name", port.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "port_protocol", port.protocol.clone().unwrap_or_default());
    tags
}
