use k8s_openapi::api::apps::v1::Deployment;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, DEPLOYMENT_MEASUREMENT};

use super::base::{created_nanos, creation_time, insert_selector_tags};

pub async fn collect_deployments<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let deployments = match inv
        .fetch(ResourceKind::Deployments, inv.lister().list_deployments())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for deployment in &deployments {
        gather_deployment(deployment, inv.selector_filter(), acc);
    }
}

pub fn gather_deployment(deployment: &Deployment, selector_filter: &Filter, acc: &dyn Accumulator) {
    let Some(created) = creation_time(&deployment.metadata) else {
        return;
    };
    let status = deployment.status.as_ref();

    let mut fields = Fields::new();
    fields.insert(
        "replicas_available".into(),
        FieldValue::from(status.and_then(|s| s.available_replicas).unwrap_or(0)),
    );
    fields.insert(
        "replicas_unavailable".into(),
        FieldValue::from(status.and_then(|s| s.unavailable_replicas).unwrap_or(0)),
    );
    fields.insert("created".into(), FieldValue::Int(created_nanos(created)));

    let mut tags = Tags::new();
    insert_tag(&mut tags, "deployment_name", deployment.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "namespace", deployment.metadata.namespace.clone().unwrap_or_default());
    insert_selector_tags(
        &mut tags,
        "selector_",
        deployment.spec.as_ref().and_then(|s| s.selector.match_labels.as_ref()),
        selector_filter,
    );

    acc.add_fields(DEPLOYMENT_MEASUREMENT, fields, tags);
}
