use k8s_openapi::api::core::v1::NodeCondition;

use crate::types::{insert_tag, FieldValue, Fields, Tags};

const DISK_PRESSURE: &str = "DiskPressure";
const MEMORY_PRESSURE: &str = "MemoryPressure";
const PID_PRESSURE: &str = "PIDPressure";
const NETWORK_UNAVAILABLE: &str = "NetworkUnavailable";
const READY: &str = "Ready";

const STATUS_TRUE: &str = "True";
const STATUS_FALSE: &str = "False";
const STATUS_UNKNOWN: &str = "Unknown";

/// Node health booleans derived from the condition list.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConditionSummary {
    pub disk_pressure: bool,
    pub memory_pressure: bool,
    pub pid_pressure: bool,
    pub network_available: bool,
    pub ready: bool,
}

impl ConditionSummary {
    pub fn write_fields(&self, fields: &mut Fields) {
        fields.insert("condition_disk_pressure".into(), self.disk_pressure.into());
        fields.insert("condition_memory_pressure".into(), self.memory_pressure.into());
        fields.insert("condition_pid_pressure".into(), self.pid_pressure.into());
        fields.insert("condition_network_available".into(), self.network_available.into());
        fields.insert("condition_ready".into(), self.ready.into());
    }
}

/// One discrete status row per input condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionRow {
    pub condition: String,
    pub status: String,
    /// True → 1, Unknown → 2, anything else → 0.
    pub status_condition: i64,
    /// Set only for the Ready condition.
    pub ready: Option<i64>,
}

impl ConditionRow {
    pub fn fields(&self) -> Fields {
        let mut fields = Fields::new();
        fields.insert("status_condition".into(), FieldValue::Int(self.status_condition));
        if let Some(ready) = self.ready {
            fields.insert("ready".into(), FieldValue::Int(ready));
        }
        fields
    }

    /// The row's own condition/status tags layered over `base`.
    pub fn tags(&self, base: &Tags) -> Tags {
        let mut tags = base.clone();
        insert_tag(&mut tags, "condition", self.condition.as_str());
        insert_tag(&mut tags, "status", self.status.as_str());
        tags
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConditionReport {
    pub summary: ConditionSummary,
    pub rows: Vec<ConditionRow>,
}

/// Reduce `(type, status)` pairs into the summary booleans and one row per entry.
pub fn aggregate<'a, I>(conditions: I) -> ConditionReport
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut report = ConditionReport::default();

    for (type_, status) in conditions {
        let summary = &mut report.summary;
        match type_ {
            DISK_PRESSURE => summary.disk_pressure |= status == STATUS_TRUE,
            MEMORY_PRESSURE => summary.memory_pressure |= status == STATUS_TRUE,
            PID_PRESSURE => summary.pid_pressure |= status == STATUS_TRUE,
            NETWORK_UNAVAILABLE => summary.network_available |= status == STATUS_FALSE,
            READY => summary.ready |= status == STATUS_TRUE,
            _ => {}
        }

        let status_condition = match status {
            STATUS_TRUE => 1,
            STATUS_UNKNOWN => 2,
            _ => 0,
        };
        let ready = (type_ == READY).then(|| i64::from(status == STATUS_TRUE));

        report.rows.push(ConditionRow {
            condition: type_.to_string(),
            status: status.to_string(),
            status_condition,
            ready,
        });
    }

    report
}

pub fn aggregate_node_conditions(conditions: &[NodeCondition]) -> ConditionReport {
    aggregate(conditions.iter().map(|c| (c.type_.as_str(), c.status.as_str())))
}
