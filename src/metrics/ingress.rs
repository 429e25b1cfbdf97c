use k8s_openapi::api::networking::v1::{HTTPIngressPath, Ingress};

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, INGRESS_MEASUREMENT};

use super::base::{created_nanos, creation_time};

pub async fn collect_ingresses<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let ingresses = match inv
        .fetch(ResourceKind::Ingress, inv.lister().list_ingresses())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for ingress in &ingresses {
        gather_ingress(ingress, acc);
    }
}

/// Emit one point per load-balancer entry, rule and HTTP path.
///
/// Rules without an HTTP block carry no paths and emit nothing, as does an
/// ingress that has not been assigned a load balancer yet.
pub fn gather_ingress(ingress: &Ingress, acc: &dyn Accumulator) {
    let Some(created) = creation_time(&ingress.metadata) else {
        return;
    };
    let spec = ingress.spec.as_ref();
    let tls = spec
        .and_then(|s| s.tls.as_ref())
        .is_some_and(|entries| !entries.is_empty());
    let rules = spec.and_then(|s| s.rules.as_deref()).unwrap_or_default();
    let balancers = ingress
        .status
        .as_ref()
        .and_then(|s| s.load_balancer.as_ref())
        .and_then(|lb| lb.ingress.as_deref())
        .unwrap_or_default();

    let mut base_tags = Tags::new();
    insert_tag(&mut base_tags, "ingress_name", ingress.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut base_tags, "namespace", ingress.metadata.namespace.clone().unwrap_or_default());

    let created = created_nanos(created);
    let generation = ingress.metadata.generation.unwrap_or(0);

    for balancer in balancers {
        let mut lb_tags = base_tags.clone();
        insert_tag(&mut lb_tags, "ip", balancer.ip.clone().unwrap_or_default());
        insert_tag(&mut lb_tags, "hostname", balancer.hostname.clone().unwrap_or_default());

        for rule in rules {
            let Some(http) = rule.http.as_ref() else {
                continue;
            };
            for path in &http.paths {
                let mut tags = lb_tags.clone();
                insert_tag(&mut tags, "host", rule.host.clone().unwrap_or_default());

                let mut fields = path_point(path, &mut tags);
                fields.insert("tls".into(), tls.into());
                fields.insert("created".into(), FieldValue::Int(created));
                fields.insert("generation".into(), FieldValue::Int(generation));

                acc.add_fields(INGRESS_MEASUREMENT, fields, tags);
            }
        }
    }
}

fn path_point(path: &HTTPIngressPath, tags: &mut Tags) -> Fields {
    let mut fields = Fields::new();
    insert_tag(tags, "path", path.path.clone().unwrap_or_default());

    if let Some(service) = path.backend.service.as_ref() {
        insert_tag(tags, "backend_service_name", service.name.as_str());
        if let Some(number) = service.port.as_ref().and_then(|p| p.number) {
            fields.insert("backend_service_port".into(), number.into());
        }
    }
    fields
}
