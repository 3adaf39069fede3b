use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod, LABEL_CAPABILITY_PREFIX};

use super::{scale, Priority};

/// Scores a node by how many `capability.skippy.io/*` labels it shares
/// with the pod (exact key and value match) — a form of node affinity for
/// hardware/software capabilities (GPU, accelerators, ...).
pub struct CapabilityPriority;

impl Priority for CapabilityPriority {
    fn name(&self) -> &'static str {
        "CapabilityPriority"
    }

    fn map_node_score(
        &self,
        _context: &mut dyn ClusterContext,
        pod: &Pod,
        node: &Node,
    ) -> Result<i64, SchedulerError> {
        let mut score = 0i64;
        for (key, value) in node
            .labels
            .iter()
            .filter(|(key, _)| key.contains(LABEL_CAPABILITY_PREFIX))
        {
            if pod.spec.labels.get(key) == Some(value) {
                score += 1;
            }
        }
        Ok(score)
    }

    fn reduce_mapped_score(
        &self,
        context: &dyn ClusterContext,
        _pod: &Pod,
        _nodes: &[Node],
        node_scores: &[i64],
    ) -> Vec<i64> {
        scale(node_scores, context.max_priority())
    }
}
