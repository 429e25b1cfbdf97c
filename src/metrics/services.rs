use k8s_openapi::api::core::v1::{Service, ServicePort};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, SERVICE_MEASUREMENT};

use super::base::{created_nanos, creation_time, insert_selector_tags};

pub async fn collect_services<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let services = match inv
        .fetch(ResourceKind::Services, inv.lister().list_services())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for service in &services {
        gather_service(service, inv.selector_filter(), acc);
    }
}

/// Emit one point per declared port.
pub fn gather_service(service: &Service, selector_filter: &Filter, acc: &dyn Accumulator) {
    let Some(created) = creation_time(&service.metadata) else {
        return;
    };
    let Some(spec) = service.spec.as_ref() else {
        return;
    };

    let mut base_tags = Tags::new();
    insert_tag(&mut base_tags, "service_name", service.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut base_tags, "namespace", service.metadata.namespace.clone().unwrap_or_default());
    insert_tag(&mut base_tags, "cluster_ip", spec.cluster_ip.clone().unwrap_or_default());
    insert_tag(&mut base_tags, "external_name", spec.external_name.clone().unwrap_or_default());
    insert_selector_tags(&mut base_tags, "selector_", spec.selector.as_ref(), selector_filter);

    for port in spec.ports.iter().flatten() {
        let (fields, tags) = port_point(port, &base_tags, created_nanos(created), service.metadata.generation);
        acc.add_fields(SERVICE_MEASUREMENT, fields, tags);
    }
}

fn port_point(port: &ServicePort, base_tags: &Tags, created: i64, generation: Option<i64>) -> (Fields, Tags) {
    let mut fields = Fields::new();
    fields.insert("port".into(), port.port.into());
    if let Some(IntOrString::Int(target)) = port.target_port.as_ref() {
        fields.insert("target_port".into(), (*target).into());
    }
    fields.insert("created".into(), FieldValue::Int(created));
    fields.insert("generation".into(), FieldValue::Int(generation.unwrap_or(0)));

    let mut tags = base_tags.clone();
    insert_tag(&mut tags, "port_name", port.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "port_protocol", port.protocol.clone().unwrap_or_default());

    (fields, tags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::MemoryAccumulator;
    use chrono::{Duration, Utc};
    use k8s_openapi::api::core::v1::ServiceSpec;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
    use std::collections::BTreeMap;

    fn test_service(ports: Option<Vec<ServicePort>>) -> Service {
        let mut selector = BTreeMap::new();
        selector.insert("app".to_string(), "web".to_string());
        Service {
            metadata: ObjectMeta {
                name: Some("web".to_string()),
                namespace: Some("prod".to_string()),
                generation: Some(1),
                creation_timestamp: Some(Time(Utc::now() - Duration::days(2))),
                ..Default::default()
            },
            spec: Some(ServiceSpec {
                cluster_ip: Some("10.0.0.12".to_string()),
                selector: Some(selector),
                ports,
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_gather_service_one_point_per_port() {
        let acc = MemoryAccumulator::new();
        let service = test_service(Some(vec![
            ServicePort {
                name: Some("http".to_string()),
                port: 80,
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::Int(8080)),
                ..Default::default()
            },
            ServicePort {
                name: Some("metrics".to_string()),
                port: 9090,
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::String("metrics".to_string())),
                ..Default::default()
            },
        ]));

        gather_service(&service, &Filter::default(), &acc);

        let points = acc.points();
        assert_eq!(points.len(), 2);

        let http = points.iter().find(|p| p.tag("port_name") == Some("http")).unwrap();
        assert_eq!(http.field("port"), Some(&FieldValue::Int(80)));
        assert_eq!(http.field("target_port"), Some(&FieldValue::Int(8080)));
        assert_eq!(http.field("generation"), Some(&FieldValue::Int(1)));
        assert_eq!(http.tag("service_name"), Some("web"));
        assert_eq!(http.tag("namespace"), Some("prod"));
        assert_eq!(http.tag("cluster_ip"), Some("10.0.0.12"));
        assert_eq!(http.tag("port_protocol"), Some("TCP"));
        assert_eq!(http.tag("selector_app"), Some("web"));
        assert!(http.tag("external_name").is_none());

        let metrics = points.iter().find(|p| p.tag("port_name") == Some("metrics")).unwrap();
        assert!(metrics.field("target_port").is_none());
    }

    #[test]
    fn test_service_without_ports_emits_nothing() {
        let acc = MemoryAccumulator::new();
        gather_service(&test_service(None), &Filter::default(), &acc);
        assert!(acc.points().is_empty());
    }
}
