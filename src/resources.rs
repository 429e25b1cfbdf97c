use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::api::resource::Quantity;

use crate::accumulator::ErrorSink;
use crate::parsing::{convert_quantity, parse_count};
use crate::types::{FieldValue, Fields};

/// Resource names that map onto emitted fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceName {
    Cpu,
    Memory,
    EphemeralStorage,
    Pods,
}

impl ResourceName {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cpu" => Some(ResourceName::Cpu),
            "memory" => Some(ResourceName::Memory),
            "ephemeral-storage" => Some(ResourceName::EphemeralStorage),
            "pods" => Some(ResourceName::Pods),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Conversion {
    /// Quantity string rescaled by the factor.
    Quantity(f64),
    /// Plain integer count.
    Count,
}

#[derive(Debug, Clone, Copy)]
pub struct ResourceField {
    pub resource: ResourceName,
    pub key: &'static str,
    pub conversion: Conversion,
}

const fn field(resource: ResourceName, key: &'static str, conversion: Conversion) -> ResourceField {
    ResourceField {
        resource,
        key,
        conversion,
    }
}

pub const NODE_CAPACITY_FIELDS: &[ResourceField] = &[
    field(ResourceName::Cpu, "capacity_cpu_cores", Conversion::Quantity(1.0)),
    field(ResourceName::Cpu, "capacity_millicpu_cores", Conversion::Quantity(1000.0)),
    field(ResourceName::EphemeralStorage, "capacity_ephemeral_storage_bytes", Conversion::Quantity(1.0)),
    field(ResourceName::Memory, "capacity_memory_bytes", Conversion::Quantity(1.0)),
    field(ResourceName::Pods, "capacity_pods", Conversion::Count),
];

pub const NODE_ALLOCATABLE_FIELDS: &[ResourceField] = &[
    field(ResourceName::Cpu, "allocatable_cpu_cores", Conversion::Quantity(1.0)),
    field(ResourceName::Cpu, "allocatable_millicpu_cores", Conversion::Quantity(1000.0)),
    field(ResourceName::EphemeralStorage, "allocatable_ephemeral_storage_bytes", Conversion::Quantity(1.0)),
    field(ResourceName::Memory, "allocatable_memory_bytes", Conversion::Quantity(1.0)),
    field(ResourceName::Pods, "allocatable_pods", Conversion::Count),
];

pub const CONTAINER_REQUEST_FIELDS: &[ResourceField] = &[
    field(ResourceName::Cpu, "resource_requests_millicpu_units", Conversion::Quantity(1000.0)),
    field(ResourceName::Memory, "resource_requests_memory_bytes", Conversion::Quantity(1.0)),
];

pub const CONTAINER_LIMIT_FIELDS: &[ResourceField] = &[
    field(ResourceName::Cpu, "resource_limits_millicpu_units", Conversion::Quantity(1000.0)),
    field(ResourceName::Memory, "resource_limits_memory_bytes", Conversion::Quantity(1.0)),
];

pub const CONTAINER_USAGE_FIELDS: &[ResourceField] = &[
    field(ResourceName::Cpu, "resource_usage_millicpu_units", Conversion::Quantity(1000.0)),
    field(ResourceName::Memory, "resource_usage_memory_bytes", Conversion::Quantity(1.0)),
];

/// Project a resource list onto `fields` using `table`.
///
/// A field is written only when the list declares its resource; unknown
/// resource names are ignored.
pub fn project_resources<S: ErrorSink + ?Sized>(
    resources: &BTreeMap<String, Quantity>,
    table: &[ResourceField],
    fields: &mut Fields,
    errors: &S,
) {
    for (name, quantity) in resources {
        let Some(resource) = ResourceName::from_name(name) else {
            continue;
        };
        for spec in table.iter().filter(|f| f.resource == resource) {
            let value = match spec.conversion {
                Conversion::Quantity(scale) => convert_quantity(&quantity.0, scale, errors),
                Conversion::Count => parse_count(&quantity.0),
            };
            fields.insert(spec.key.to_string(), FieldValue::Int(value));
        }
    }
}
