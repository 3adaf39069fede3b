use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod};
use crate::utils::normalize_image_name;

use super::Priority;

const MB: u64 = 1024 * 1024;
const MIN_THRESHOLD: u64 = 23 * MB;
const MAX_THRESHOLD: u64 = 1000 * MB;

/// Threshold form of image locality: scores a node by how much of the
/// pod's image data it already has cached, weighted by how widely each
/// image is already spread across the fleet (images cached almost
/// everywhere contribute less, since locality there is less scarce).
///
/// <https://github.com/kubernetes/kubernetes/blob/master/pkg/scheduler/algorithm/priorities/image_locality.go>
pub struct ImageLocalityPriority;

impl ImageLocalityPriority {
    fn calculate_priority(max_priority: i64, sum_scores: f64) -> i64 {
        let clamped = sum_scores.clamp(MIN_THRESHOLD as f64, MAX_THRESHOLD as f64);
        (max_priority as f64 * (clamped - MIN_THRESHOLD as f64)
            / (MAX_THRESHOLD - MIN_THRESHOLD) as f64)
            .round() as i64
    }
}

impl Priority for ImageLocalityPriority {
    fn name(&self) -> &'static str {
        "ImageLocalityPriority"
    }

    fn map_node_score(
        &self,
        context: &mut dyn ClusterContext,
        pod: &Pod,
        node: &Node,
    ) -> Result<i64, SchedulerError> {
        let total_nodes = (context.node_count().max(1)) as f64;
        let cached = context.images_on_node(&node.name);

        let mut sum_scores = 0.0;
        for container in &pod.spec.containers {
            let image = normalize_image_name(&container.image);
            if !cached.contains(&image) {
                continue;
            }
            let state = context.get_image_state(&image)?;
            if let Some(size) = state.size_for_arch(node.arch()) {
                let spread = state.num_nodes as f64 / total_nodes;
                sum_scores += size as f64 * spread;
            }
        }

        Ok(Self::calculate_priority(context.max_priority(), sum_scores))
    }
}
