use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod, REGISTRY_NODE};
use crate::utils::normalize_image_name;

use super::Priority;

/// Scores nodes by how long it would take to pull every image the pod
/// needs but does not already have cached, from the registry. Lower
/// download time is better.
///
/// The reduction is the canonical linear-scaling-with-inverted-rank-offset
/// form: `score = floor(max_priority * (max - raw + min) / max)` over the
/// vector (dividing by the max raw time seen this round; zero when that max
/// is zero). An equivalent implementation could use [`super::scale_inverse`]
/// instead — both were present in earlier revisions of this priority; this
/// is the one that's locked in.
pub struct LatencyAwareImageLocalityPriority;

impl Priority for LatencyAwareImageLocalityPriority {
    fn name(&self) -> &'static str {
        "LatencyAwareImageLocalityPriority"
    }

    fn map_node_score(
        &self,
        context: &mut dyn ClusterContext,
        pod: &Pod,
        node: &Node,
    ) -> Result<i64, SchedulerError> {
        let cached = context.images_on_node(&node.name);
        let mut total_bytes = 0u64;
        for container in &pod.spec.containers {
            let image = normalize_image_name(&container.image);
            if cached.contains(&image) {
                continue;
            }
            let state = context.get_image_state(&image)?;
            if let Some(size) = state.size_for_arch(node.arch()) {
                total_bytes += size;
            }
        }

        let bandwidth = context.dl_bandwidth(REGISTRY_NODE, &node.name)?;
        Ok((total_bytes / bandwidth) as i64)
    }

    fn reduce_mapped_score(
        &self,
        context: &dyn ClusterContext,
        _pod: &Pod,
        _nodes: &[Node],
        node_scores: &[i64],
    ) -> Vec<i64> {
        let max_priority = context.max_priority();
        let max = *node_scores.iter().max().unwrap_or(&0);
        let min = *node_scores.iter().min().unwrap_or(&0);
        if max == 0 {
            return vec![0; node_scores.len()];
        }
        node_scores
            .iter()
            .map(|&raw| (max_priority * (max - raw + min)) / max)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_context::InMemoryClusterContext;
    use crate::model::{Capacity, Container, ImageState, PodSpec};
    use crate::storage::StorageIndex;
    use std::collections::HashMap;

    fn bandwidth_graph(nodes: &[&str], bytes_per_sec: u64) -> HashMap<String, HashMap<String, u64>> {
        let mut graph = HashMap::new();
        let mut edges = HashMap::new();
        for n in nodes {
            edges.insert(n.to_string(), bytes_per_sec);
        }
        graph.insert(REGISTRY_NODE.to_string(), edges);
        graph
    }

    #[test]
    fn node_with_image_already_cached_wins_the_reduction() {
        let mut size = HashMap::new();
        size.insert("amd64".to_string(), 12_500_000);
        let mut image_states = HashMap::new();
        image_states.insert("repo/img:v1".to_string(), ImageState::new(size));

        let mut labels = HashMap::new();
        labels.insert("beta.kubernetes.io/arch".to_string(), "amd64".to_string());
        let node_a = Node::new("a", Capacity::new(1000, 1024)).with_labels(labels.clone());
        let node_b = Node::new("b", Capacity::new(1000, 1024)).with_labels(labels);

        let mut ctx = InMemoryClusterContext::new(
            vec![node_a.clone(), node_b.clone()],
            image_states,
            bandwidth_graph(&["a", "b"], 12_500_000),
            StorageIndex::new(),
        );
        let pod = Pod::new(
            "p1",
            "default",
            PodSpec::new(vec![Container::new("repo/img:v1")]),
        );
        // Pre-cache the image on node a only, by directly placing then removing the pod
        // (keeps the image cache but releases the resources and pod list).
        ctx.place_pod_on_node(pod.clone(), "a").unwrap();
        ctx.remove_pod_from_node(&pod, "a");

        let raw_a = LatencyAwareImageLocalityPriority
            .map_node_score(&mut ctx, &pod, &node_a)
            .unwrap();
        let raw_b = LatencyAwareImageLocalityPriority
            .map_node_score(&mut ctx, &pod, &node_b)
            .unwrap();
        assert_eq!(raw_a, 0);
        assert!(raw_b > 0);

        let reduced = LatencyAwareImageLocalityPriority.reduce_mapped_score(
            &ctx,
            &pod,
            &[node_a, node_b],
            &[raw_a, raw_b],
        );
        assert!(reduced[0] > reduced[1]);
    }
}
