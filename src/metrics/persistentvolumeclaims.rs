use k8s_openapi::api::core::v1::PersistentVolumeClaim;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::types::{
    insert_tag, FieldValue, Fields, ResourceKind, Tags, PERSISTENTVOLUMECLAIM_MEASUREMENT,
};

use super::base::insert_selector_tags;

pub async fn collect_persistent_volume_claims<L: ResourceLister>(
    inv: &KubeInventory<L>,
    acc: &dyn Accumulator,
) {
    let claims = match inv
        .fetch(
            ResourceKind::PersistentVolumeClaims,
            inv.lister().list_persistent_volume_claims(),
        )
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for claim in &claims {
        gather_persistent_volume_claim(claim, inv.selector_filter(), acc);
    }
}

/// Numeric code of a claim phase, case-insensitive.
pub fn claim_phase_type(phase: &str) -> i64 {
    match phase.to_ascii_lowercase().as_str() {
        "bound" => 0,
        "lost" => 1,
        "pending" => 2,
        _ => 3,
    }
}

pub fn gather_persistent_volume_claim(
    claim: &PersistentVolumeClaim,
    selector_filter: &Filter,
    acc: &dyn Accumulator,
) {
    let phase = claim
        .status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .unwrap_or_default();
    let spec = claim.spec.as_ref();

    let mut fields = Fields::new();
    fields.insert("phase_type".into(), FieldValue::Int(claim_phase_type(&phase)));

    let mut tags = Tags::new();
    insert_tag(&mut tags, "pvc_name", claim.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "namespace", claim.metadata.namespace.clone().unwrap_or_default());
    insert_tag(&mut tags, "phase", phase);
    insert_tag(
        &mut tags,
        "storageclass",
        spec.and_then(|s| s.storage_class_name.clone()).unwrap_or_default(),
    );
    insert_selector_tags(
        &mut tags,
        "selector_",
        spec.and_then(|s| s.selector.as_ref())
            .and_then(|sel| sel.match_labels.as_ref()),
        selector_filter,
    );

    acc.add_fields(PERSISTENTVOLUMECLAIM_MEASUREMENT, fields, tags);
}
