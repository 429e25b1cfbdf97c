use k8s_openapi::api::apps::v1::DaemonSet;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, DAEMONSET_MEASUREMENT};

use super::base::{created_nanos, creation_time, insert_selector_tags};

pub async fn collect_daemonsets<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let daemonsets = match inv
        .fetch(ResourceKind::DaemonSets, inv.lister().list_daemonsets())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for daemonset in &daemonsets {
        gather_daemonset(daemonset, inv.selector_filter(), acc);
    }
}

pub fn gather_daemonset(daemonset: &DaemonSet, selector_filter: &Filter, acc: &dyn Accumulator) {
    let Some(created) = creation_time(&daemonset.metadata) else {
        return;
    };
    let status = daemonset.status.clone().unwrap_or_default();

    let mut fields = Fields::new();
    fields.insert("generation".into(), FieldValue::Int(daemonset.metadata.generation.unwrap_or(0)));
    fields.insert("current_number_scheduled".into(), status.current_number_scheduled.into());
    fields.insert("desired_number_scheduled".into(), status.desired_number_scheduled.into());
    fields.insert("number_available".into(), status.number_available.unwrap_or(0).into());
    fields.insert("number_misscheduled".into(), status.number_misscheduled.into());
    fields.insert("number_ready".into(), status.number_ready.into());
    fields.insert("number_unavailable".into(), status.number_unavailable.unwrap_or(0).into());
    fields.insert(
        "updated_number_scheduled".into(),
        status.updated_number_scheduled.unwrap_or(0).into(),
    );
    fields.insert("created".into(), FieldValue::Int(created_nanos(created)));

    let mut tags = Tags::new();
    insert_tag(&mut tags, "daemonset_name", daemonset.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "namespace", daemonset.metadata.namespace.clone().unwrap_or_default());
    insert_selector_tags(
        &mut tags,
        "selector_",
        daemonset.spec.as_ref().and_then(|s| s.selector.match_labels.as_ref()),
        selector_filter,
    );

    acc.add_fields(DAEMONSET_MEASUREMENT, fields, tags);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::MemoryAccumulator;
    use chrono::{Duration, Utc};
    use k8s_openapi::api::apps::v1::DaemonSetStatus;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};

    #[test]
    fn test_gather_daemonset() {
        let acc = MemoryAccumulator::new();
        let daemonset = DaemonSet {
            metadata: ObjectMeta {
                name: Some("node-exporter".to_string()),
                namespace: Some("monitoring".to_string()),
                generation: Some(7),
                creation_timestamp: Some(Time(Utc::now() - Duration::days(1))),
                ..Default::default()
            },
            status: Some(DaemonSetStatus {
                current_number_scheduled: 3,
                desired_number_scheduled: 4,
                number_available: Some(2),
                number_misscheduled: 1,
                number_ready: 2,
                number_unavailable: None,
                updated_number_scheduled: Some(3),
                ..Default::default()
            }),
            ..Default::default()
        };

        gather_daemonset(&daemonset, &Filter::default(), &acc);

        let p = &acc.points()[0];
        assert_eq!(p.tag("daemonset_name"), Some("node-exporter"));
        assert_eq!(p.tag("namespace"), Some("monitoring"));
        assert_eq!(p.field("generation"), Some(&FieldValue::Int(7)));
        assert_eq!(p.field("current_number_scheduled"), Some(&FieldValue::Int(3)));
        assert_eq!(p.field("desired_number_scheduled"), Some(&FieldValue::Int(4)));
        assert_eq!(p.field("number_available"), Some(&FieldValue::Int(2)));
        assert_eq!(p.field("number_misscheduled"), Some(&FieldValue::Int(1)));
        assert_eq!(p.field("number_ready"), Some(&FieldValue::Int(2)));
        assert_eq!(p.field("number_unavailable"), Some(&FieldValue::Int(0)));
        assert_eq!(p.field("updated_number_scheduled"), Some(&FieldValue::Int(3)));
        assert!(p.field("created").and_then(FieldValue::as_i64).unwrap() > 0);
    }
}
