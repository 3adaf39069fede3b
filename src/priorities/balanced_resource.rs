use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Capacity, Node, Pod};

use super::Priority;

/// Prefers nodes where the pod's requested load is balanced across CPU and
/// memory relative to the node's free capacity: nodes that would become
/// lopsided (e.g. CPU-starved but memory-rich) score lower.
pub struct BalancedResourcePriority;

impl BalancedResourcePriority {
    fn fraction_of_capacity(requested: i64, capacity: i64) -> f64 {
        let capacity = if capacity == 0 { 1 } else { capacity };
        requested as f64 / capacity as f64
    }
}

impl Priority for BalancedResourcePriority {
    fn name(&self) -> &'static str {
        "BalancedResourcePriority"
    }

    fn map_node_score(
        &self,
        context: &mut dyn ClusterContext,
        pod: &Pod,
        node: &Node,
    ) -> Result<i64, SchedulerError> {
        let mut requested = Capacity::default();
        for container in &pod.spec.containers {
            requested.cpu_millis += container.resources.cpu_millis();
            requested.memory += container.resources.memory();
        }

        let allocatable = node.allocatable;
        let cpu_fraction = Self::fraction_of_capacity(requested.cpu_millis, allocatable.cpu_millis);
        let memory_fraction = Self::fraction_of_capacity(requested.memory, allocatable.memory);

        if cpu_fraction >= 1.0 || memory_fraction >= 1.0 {
            return Ok(0);
        }

        let diff = (cpu_fraction - memory_fraction).abs();
        Ok(((1.0 - diff) * context.max_priority() as f64).round() as i64)
    }
}
