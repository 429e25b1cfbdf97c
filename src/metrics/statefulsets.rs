use k8s_openapi::api::apps::v1::StatefulSet;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, STATEFULSET_MEASUREMENT};

use super::base::{created_nanos, creation_time, insert_selector_tags};

pub async fn collect_statefulsets<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let statefulsets = match inv
        .fetch(ResourceKind::StatefulSets, inv.lister().list_statefulsets())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for statefulset in &statefulsets {
        gather_statefulset(statefulset, inv.selector_filter(), acc);
    }
}

pub fn gather_statefulset(statefulset: &StatefulSet, selector_filter: &Filter, acc: &dyn Accumulator) {
    let Some(created) = creation_time(&statefulset.metadata) else {
        return;
    };
    let status = statefulset.status.clone().unwrap_or_default();
    let spec = statefulset.spec.as_ref();

    let mut fields = Fields::new();
    fields.insert("created".into(), FieldValue::Int(created_nanos(created)));
    fields.insert("generation".into(), FieldValue::Int(statefulset.metadata.generation.unwrap_or(0)));
    fields.insert("replicas".into(), status.replicas.into());
    fields.insert("replicas_current".into(), status.current_replicas.unwrap_or(0).into());
    fields.insert("replicas_ready".into(), status.ready_replicas.unwrap_or(0).into());
    fields.insert("replicas_updated".into(), status.updated_replicas.unwrap_or(0).into());
    // unset spec.replicas defaults to 1 on the API server
    fields.insert(
        "spec_replicas".into(),
        spec.and_then(|s| s.replicas).unwrap_or(1).into(),
    );
    fields.insert(
        "observed_generation".into(),
        FieldValue::Int(status.observed_generation.unwrap_or(0)),
    );

    let mut tags = Tags::new();
    insert_tag(&mut tags, "statefulset_name", statefulset.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "namespace", statefulset.metadata.namespace.clone().unwrap_or_default());
    insert_selector_tags(
        &mut tags,
        "selector_",
        spec.and_then(|s| s.selector.match_labels.as_ref()),
        selector_filter,
    );

    acc.add_fields(STATEFULSET_MEASUREMENT, fields, tags);
}
