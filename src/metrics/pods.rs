use std::collections::HashMap;

use k8s_openapi::api::core::v1::{Container, ContainerStatus, Pod};
use tracing::debug;

use crate::accumulator::Accumulator;
use crate::collector::KubeInventory;
use crate::filter::Filter;
use crate::kubernetes::ResourceLister;
use crate::resources::{
    project_resources, CONTAINER_LIMIT_FIELDS, CONTAINER_REQUEST_FIELDS, CONTAINER_USAGE_FIELDS,
};
use crate::types::{insert_tag, FieldValue, Fields, Tags, POD_CONTAINER_MEASUREMENT};

use super::base::{correlate, creation_time, insert_selector_tags, ContainerMetrics};

/// Current state of a container as derived from its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Running,
    Terminated,
    Waiting,
    Unknown,
}

impl ContainerState {
    pub fn code(&self) -> i64 {
        match self {
            ContainerState::Running => 0,
            ContainerState::Terminated => 1,
            ContainerState::Waiting => 2,
            ContainerState::Unknown => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerState::Running => "running",
            ContainerState::Terminated => "terminated",
            ContainerState::Waiting => "waiting",
            ContainerState::Unknown => "unknown",
        }
    }
}

/// State and reason of a container; a missing status reads as unknown.
pub fn container_state(status: &ContainerStatus) -> (ContainerState, Option<String>) {
    let Some(state) = status.state.as_ref() else {
        return (ContainerState::Unknown, None);
    };
    if state.running.is_some() {
        (ContainerState::Running, None)
    } else if let Some(terminated) = state.terminated.as_ref() {
        (ContainerState::Terminated, terminated.reason.clone())
    } else if let Some(waiting) = state.waiting.as_ref() {
        (ContainerState::Waiting, waiting.reason.clone())
    } else {
        (ContainerState::Unknown, None)
    }
}

/// List pods with their usage metrics and emit one point per declared container.
pub async fn collect_pods<L: ResourceLister>(inv: &KubeInventory<L>, acc: &dyn Accumulator) {
    let inventory = match correlate(inv.lister(), inv.config().response_timeout).await {
        Ok(inventory) => inventory,
        Err(e) => {
            acc.add_error(e);
            return;
        }
    };

    for (pod, usage) in inventory.iter() {
        gather_pod(pod, usage, inv.selector_filter(), acc);
    }
}

pub fn gather_pod(
    pod: &Pod,
    usage: Option<&[ContainerMetrics]>,
    selector_filter: &Filter,
    acc: &dyn Accumulator,
) {
    if creation_time(&pod.metadata).is_none() {
        debug!(
            "skipping pod {:?} without a creation timestamp",
            pod.metadata.name.as_deref().unwrap_or("")
        );
        return;
    }
    let Some(spec) = pod.spec.as_ref() else {
        return;
    };

    let statuses: HashMap<&str, &ContainerStatus> = pod
        .status
        .as_ref()
        .and_then(|s| s.container_statuses.as_ref())
        .map(|list| list.iter().map(|cs| (cs.name.as_str(), cs)).collect())
        .unwrap_or_default();

    let usage_by_container: HashMap<&str, &ContainerMetrics> = usage
        .unwrap_or_default()
        .iter()
        .map(|m| (m.name.as_str(), m))
        .collect();

    let unreported = ContainerStatus::default();
    for container in &spec.containers {
        let status = statuses.get(container.name.as_str()).copied().unwrap_or(&unreported);
        let container_usage = usage_by_container.get(container.name.as_str()).copied();
        gather_pod_container(pod, status, container, container_usage, selector_filter, acc);
    }
}

fn gather_pod_container(
    pod: &Pod,
    status: &ContainerStatus,
    container: &Container,
    usage: Option<&ContainerMetrics>,
    selector_filter: &Filter,
    acc: &dyn Accumulator,
) {
    let (state, state_reason) = container_state(status);
    let state_reason = state_reason.unwrap_or_default();
    let readiness = if status.ready { "ready" } else { "unready" };

    let mut fields = Fields::new();
    fields.insert("restarts_total".into(), FieldValue::from(status.restart_count));
    fields.insert("state_code".into(), FieldValue::Int(state.code()));

    // deprecated alias of state_reason, kept for existing dashboards
    if state == ContainerState::Terminated {
        fields.insert("terminated_reason".into(), state_reason.as_str().into());
    }
    if !state_reason.is_empty() {
        fields.insert("state_reason".into(), state_reason.as_str().into());
    }

    let pod_status = pod.status.as_ref();
    if let Some(reason) = pod_status.and_then(|s| s.reason.as_deref()).filter(|r| !r.is_empty()) {
        fields.insert("phase_reason".into(), reason.into());
    }

    let mut tags = Tags::new();
    insert_tag(&mut tags, "container_name", container.name.as_str());
    insert_tag(&mut tags, "namespace", pod.metadata.namespace.clone().unwrap_or_default());
    insert_tag(
        &mut tags,
        "node_name",
        pod.spec.as_ref().and_then(|s| s.node_name.clone()).unwrap_or_default(),
    );
    insert_tag(&mut tags, "pod_name", pod.metadata.name.clone().unwrap_or_default());
    insert_tag(&mut tags, "phase", pod_status.and_then(|s| s.phase.clone()).unwrap_or_default());
    insert_tag(&mut tags, "state", state.as_str());
    insert_tag(&mut tags, "readiness", readiness);

    insert_selector_tags(
        &mut tags,
        "node_selector_",
        pod.spec.as_ref().and_then(|s| s.node_selector.as_ref()),
        selector_filter,
    );

    if let Some(resources) = container.resources.as_ref() {
        if let Some(requests) = resources.requests.as_ref() {
            project_resources(requests, CONTAINER_REQUEST_FIELDS, &mut fields, acc);
        }
        if let Some(limits) = resources.limits.as_ref() {
            project_resources(limits, CONTAINER_LIMIT_FIELDS, &mut fields, acc);
        }
    }
    if let Some(usage) = usage {
        project_resources(&usage.usage, CONTAINER_USAGE_FIELDS, &mut fields, acc);
    }

    acc.add_fields(POD_CONTAINER_MEASUREMENT, fields, tags);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulator::MemoryAccumulator;
    use chrono::{Duration, Utc};
    use k8s_openapi::api::core::v1::{
        ContainerState as K8sContainerState, ContainerStateRunning, ContainerStateTerminated,
        ContainerStateWaiting, PodSpec, PodStatus, ResourceRequirements,
    };
    use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
    use std::collections::BTreeMap;

    fn quantities(entries: &[(&str, &str)]) -> BTreeMap<String, Quantity> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), Quantity(v.to_string())))
            .collect()
    }

    fn create_test_pod(name: &str, containers: &[&str]) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("default".to_string()),
                creation_timestamp: Some(Time(Utc::now() - Duration::minutes(10))),
                ..Default::default()
            },
            spec: Some(PodSpec {
                node_name: Some("worker-1".to_string()),
                containers: containers
                    .iter()
                    .map(|c| Container {
                        name: c.to_string(),
                        ..Default::default()
                    })
                    .collect(),
                ..Default::default()
            }),
            status: Some(PodStatus {
                phase: Some("Running".to_string()),
                ..Default::default()
            }),
        }
    }

    fn pass_all() -> Filter {
        Filter::default()
    }

    #[test]
    fn test_container_state() {
        let mut cs = ContainerStatus::default();
        assert_eq!(container_state(&cs), (ContainerState::Unknown, None));

        cs.state = Some(K8sContainerState::default());
        assert_eq!(container_state(&cs), (ContainerState::Unknown, None));

        cs.state = Some(K8sContainerState {
            running: Some(ContainerStateRunning::default()),
            ..Default::default()
        });
        assert_eq!(container_state(&cs), (ContainerState::Running, None));

        cs.state = Some(K8sContainerState {
            waiting: Some(ContainerStateWaiting {
                reason: Some("CrashLoopBackOff".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        });
        assert_eq!(
            container_state(&cs),
            (ContainerState::Waiting, Some("CrashLoopBackOff".to_string()))
        );
    }

    #[test]
    fn test_pod_without_creation_timestamp_is_skipped() {
        let acc = MemoryAccumulator::new();
        let mut pod = create_test_pod("ghost", &["app"]);
        pod.metadata.creation_timestamp = None;
        gather_pod(&pod, None, &pass_all(), &acc);
        assert!(acc.points().is_empty());
        assert_eq!(acc.error_count(), 0);
    }

    #[test]
    fn test_pod_without_containers_emits_nothing() {
        let acc = MemoryAccumulator::new();
        gather_pod(&create_test_pod("empty", &[]), None, &pass_all(), &acc);
        assert!(acc.points().is_empty());
        assert_eq!(acc.error_count(), 0);
    }

    #[test]
    fn test_unreported_container_status() {
        let acc = MemoryAccumulator::new();
        gather_pod(&create_test_pod("web-0", &["app"]), None, &pass_all(), &acc);

        let points = acc.points();
        assert_eq!(points.len(), 1);
        let p = &points[0];
        assert_eq!(p.measurement, POD_CONTAINER_MEASUREMENT);
        assert_eq!(p.tag("state"), Some("unknown"));
        assert_eq!(p.tag("readiness"), Some("unready"));
        assert_eq!(p.field("state_code"), Some(&FieldValue::Int(3)));
        assert_eq!(p.field("restarts_total"), Some(&FieldValue::Int(0)));
        assert!(p.field("state_reason").is_none());
        assert!(p.field("terminated_reason").is_none());
        assert!(p.field("phase_reason").is_none());
    }

    #[test]
    fn test_terminated_container_fields_and_tags() {
        let acc = MemoryAccumulator::new();
        let mut pod = create_test_pod("job-1", &["worker"]);
        let status = pod.status.as_mut().unwrap();
        status.phase = Some("Failed".to_string());
        status.reason = Some("Evicted".to_string());
        status.container_statuses = Some(vec![ContainerStatus {
            name: "worker".to_string(),
            ready: false,
            restart_count: 4,
            state: Some(K8sContainerState {
                terminated: Some(ContainerStateTerminated {
                    reason: Some("OOMKilled".to_string()),
                    exit_code: 137,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        gather_pod(&pod, None, &pass_all(), &acc);

        let p = &acc.points()[0];
        assert_eq!(p.field("restarts_total"), Some(&FieldValue::Int(4)));
        assert_eq!(p.field("state_code"), Some(&FieldValue::Int(1)));
        assert_eq!(p.field("state_reason"), Some(&FieldValue::from("OOMKilled")));
        assert_eq!(p.field("terminated_reason"), Some(&FieldValue::from("OOMKilled")));
        assert_eq!(p.field("phase_reason"), Some(&FieldValue::from("Evicted")));
        assert_eq!(p.tag("container_name"), Some("worker"));
        assert_eq!(p.tag("namespace"), Some("default"));
        assert_eq!(p.tag("node_name"), Some("worker-1"));
        assert_eq!(p.tag("pod_name"), Some("job-1"));
        assert_eq!(p.tag("phase"), Some("Failed"));
        assert_eq!(p.tag("state"), Some("terminated"));
        assert_eq!(p.tag("readiness"), Some("unready"));
    }

    #[test]
    fn test_resources_and_usage_fields() {
        let acc = MemoryAccumulator::new();
        let mut pod = create_test_pod("web-0", &["app", "sidecar"]);
        let spec = pod.spec.as_mut().unwrap();
        spec.containers[0].resources = Some(ResourceRequirements {
            requests: Some(quantities(&[("cpu", "250m"), ("memory", "128Mi")])),
            limits: Some(quantities(&[("cpu", "1")])),
            ..Default::default()
        });
        pod.status.as_mut().unwrap().container_statuses = Some(vec![ContainerStatus {
            name: "app".to_string(),
            ready: true,
            state: Some(K8sContainerState {
                running: Some(ContainerStateRunning::default()),
                ..Default::default()
            }),
            ..Default::default()
        }]);
        let usage = vec![ContainerMetrics {
            name: "app".to_string(),
            usage: quantities(&[("cpu", "12m"), ("memory", "64Mi")]),
        }];

        gather_pod(&pod, Some(&usage), &pass_all(), &acc);

        let points = acc.points();
        assert_eq!(points.len(), 2);
        let app = points.iter().find(|p| p.tag("container_name") == Some("app")).unwrap();
        assert_eq!(app.tag("state"), Some("running"));
        assert_eq!(app.tag("readiness"), Some("ready"));
        assert_eq!(app.field("state_code"), Some(&FieldValue::Int(0)));
        assert_eq!(app.field("resource_requests_millicpu_units"), Some(&FieldValue::Int(250)));
        assert_eq!(app.field("resource_requests_memory_bytes"), Some(&FieldValue::Int(134_217_728)));
        assert_eq!(app.field("resource_limits_millicpu_units"), Some(&FieldValue::Int(1000)));
        assert!(app.field("resource_limits_memory_bytes").is_none());
        assert_eq!(app.field("resource_usage_millicpu_units"), Some(&FieldValue::Int(12)));
        assert_eq!(app.field("resource_usage_memory_bytes"), Some(&FieldValue::Int(67_108_864)));

        let sidecar = points.iter().find(|p| p.tag("container_name") == Some("sidecar")).unwrap();
        assert!(sidecar.field("resource_usage_millicpu_units").is_none());
        assert!(sidecar.field("resource_requests_millicpu_units").is_none());
        assert_eq!(sidecar.tag("state"), Some("unknown"));
    }

    #[test]
    fn test_node_selector_tags_are_filtered() {
        let acc = MemoryAccumulator::new();
        let mut pod = create_test_pod("web-0", &["app"]);
        let mut selector = BTreeMap::new();
        selector.insert("env-prod".to_string(), "true".to_string());
        selector.insert("region".to_string(), "eu".to_string());
        pod.spec.as_mut().unwrap().node_selector = Some(selector);

        let filter = Filter::new(&["env-*".to_string()], &[]);
        gather_pod(&pod, None, &filter, &acc);

        let p = &acc.points()[0];
        assert_eq!(p.tag("node_selector_env-prod"), Some("true"));
        assert!(p.tag("node_selector_region").is_none());
    }

    #[test]
    fn test_default_selector_filter_drops_selector_tags() {
        let acc = MemoryAccumulator::new();
        let mut pod = create_test_pod("web-0", &["app"]);
        let mut selector = BTreeMap::new();
        selector.insert("disktype".to_string(), "ssd".to_string());
        pod.spec.as_mut().unwrap().node_selector = Some(selector);

        gather_pod(&pod, None, &Filter::new(&[], &["*".to_string()]), &acc);

        let p = &acc.points()[0];
        assert!(!p.tags.keys().any(|k| k.starts_with("node_selector_")));
    }

    #[test]
    fn test_unscheduled_pod_has_no_node_name_tag() {
        let acc = MemoryAccumulator::new();
        let mut pod = create_test_pod("pending-0", &["app"]);
        pod.spec.as_mut().unwrap().node_name = None;
        pod.status.as_mut().unwrap().phase = Some("Pending".to_string());

        gather_pod(&pod, None, &pass_all(), &acc);

        let p = &acc.points()[0];
        assert!(p.tag("node_name").is_none());
        assert_eq!(p.tag("phase"), Some("Pending"));
    }
}
