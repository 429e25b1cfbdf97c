use k8s_openapi::api::core::v1::PersistentVolume;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::kubernetes::ResourceLister;
use crate::types::{insert_tag, FieldValue, Fields, ResourceKind, Tags, PERSISTENTVOLUME_MEASUREMENT};

pub async fn collect_persistent_volumes<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let volumes = match inv
        .fetch(ResourceKind::PersistentVolumes, inv.lister().list_persistent_volumes())
        .await
    {
        Ok(items) => items,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for volume in &volumes {
        gather_persistent_volume(volume, acc);
    }
}

/// Numeric code of a volume phase, case-insensitive.
pub fn volume_phase_type(phase: &str) -> i64 {
    match phase.to_ascii_lowercase().as_str() {
        "bound" => 0,
        "failed" => 1,
        "pending" => 2,
        "released" => 3,
        "available" => 4,
        _ => 5,
    }
}

pub fn gather_persistent_volume(volume: &PersistentVolume, acc: &dyn Accumulator) {
    let phase = volume
        .status
        .as_ref()
        .and_then(|s| s.phase.clone())
        .unwrap_or_default();

    let mut fields = Fields::new();
    fields.insert("phase_type".into(), FieldValue::Int(volume_phase_type(&phase)));

    let mut tags = Tags::new();
    insert_tag(&mut tags, "pv_name", volume.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "phase", phase);
    insert_tag(
        &mut tags,
        "storageclass",
        volume
            .spec
            .as_ref()
            .and_then(|s| s.storage_class_name.clone())
            .unwrap_or_default(),
    );

    acc.add_fields(PERSISTENTVOLUME_MEASUREMENT, fields, tags);
}
