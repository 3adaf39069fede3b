use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod, LABEL_RECEIVES_FROM_STORAGE, LABEL_SENDS_TO_STORAGE};

use super::{scale_inverse, Priority};

enum Direction {
    Receive,
    Send,
}

/// Scores nodes by how long it would take to move the pod's input/output
/// data between the object store and the node, using the bandwidth graph
/// and storage index (the canonical form; see the module-level design
/// notes for the label-size + `next_storage_node` variant this supersedes).
/// Local access (the candidate node already hosts the data) is free.
pub struct DataLocalityPriority;

impl DataLocalityPriority {
    fn path_contribution(
        context: &dyn ClusterContext,
        node: &Node,
        path_label: Option<&str>,
        direction: Direction,
    ) -> Result<u64, SchedulerError> {
        let Some(path) = path_label else {
            return Ok(0);
        };
        let Some((bucket, name)) = path.split_once('/') else {
            return Ok(0);
        };
        let Some(item) = context.storage_index().stat(bucket, name) else {
            return Ok(0);
        };
        let hosts = context.storage_index().data_nodes(bucket, name);
        if hosts.contains(&node.name) {
            return Ok(0);
        }

        let mut min_bandwidth: Option<u64> = None;
        for host in &hosts {
            let bandwidth = match direction {
                Direction::Receive => context.dl_bandwidth(host, &node.name)?,
                Direction::Send => context.dl_bandwidth(&node.name, host)?,
            };
            min_bandwidth = Some(min_bandwidth.map_or(bandwidth, |m| m.min(bandwidth)));
        }

        Ok(match min_bandwidth {
            Some(bandwidth) if bandwidth > 0 => item.size / bandwidth,
            _ => 0,
        })
    }
}

impl Priority for DataLocalityPriority {
    fn name(&self) -> &'static str {
        "DataLocalityPriority"
    }

    fn map_node_score(
        &self,
        context: &mut dyn ClusterContext,
        pod: &Pod,
        node: &Node,
    ) -> Result<i64, SchedulerError> {
        let receives = pod.spec.labels.get(LABEL_RECEIVES_FROM_STORAGE).map(String::as_str);
        let sends = pod.spec.labels.get(LABEL_SENDS_TO_STORAGE).map(String::as_str);

        let receive_time = Self::path_contribution(context, node, receives, Direction::Receive)?;
        let send_time = Self::path_contribution(context, node, sends, Direction::Send)?;

        Ok((receive_time + send_time) as i64)
    }

    fn reduce_mapped_score(
        &self,
        context: &dyn ClusterContext,
        _pod: &Pod,
        _nodes: &[Node],
        node_scores: &[i64],
    ) -> Vec<i64> {
        scale_inverse(node_scores, context.max_priority())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster_context::InMemoryClusterContext;
    use crate::model::{Capacity, Container, DataItem, PodSpec};
    use crate::storage::StorageIndex;
    use std::collections::HashMap;

    #[test]
    fn storage_node_itself_has_zero_contribution() {
        let mut storage_index = StorageIndex::new();
        storage_index.make_bucket("in", "storage");
        storage_index.put(DataItem::new("in", "obj", 10_000_000)).unwrap();

        let mut bandwidth = HashMap::new();
        let mut edges = HashMap::new();
        edges.insert("x".to_string(), 10_000_000u64);
        bandwidth.insert("storage".to_string(), edges);

        let storage_node = Node::new("storage", Capacity::new(1000, 1024));
        let other_node = Node::new("x", Capacity::new(1000, 1024));

        let mut ctx = InMemoryClusterContext::new(
            vec![storage_node.clone(), other_node.clone()],
            HashMap::new(),
            bandwidth,
            storage_index,
        );

        let mut labels = HashMap::new();
        labels.insert(
            LABEL_RECEIVES_FROM_STORAGE.to_string(),
            "in/obj".to_string(),
        );
        let pod = Pod::new(
            "p1",
            "default",
            PodSpec::new(vec![Container::new("img")]).with_labels(labels),
        );

        let raw_storage = DataLocalityPriority
            .map_node_score(&mut ctx, &pod, &storage_node)
            .unwrap();
        let raw_other = DataLocalityPriority
            .map_node_score(&mut ctx, &pod, &other_node)
            .unwrap();
        assert_eq!(raw_storage, 0);
        assert_eq!(raw_other, 1);

        let reduced = DataLocalityPriority.reduce_mapped_score(
            &ctx,
            &pod,
            &[storage_node, other_node],
            &[raw_storage, raw_other],
        );
        assert_eq!(reduced, vec![10, 0]);
    }

    #[test]
    fn absent_path_labels_contribute_zero() {
        let mut ctx = InMemoryClusterContext::new(
            vec![Node::new("a", Capacity::new(1000, 1024))],
            HashMap::new(),
            HashMap::new(),
            StorageIndex::new(),
        );
        let node = Node::new("a", Capacity::new(1000, 1024));
        let pod = Pod::new("p1", "default", PodSpec::new(vec![Container::new("img")]));
        assert_eq!(
            DataLocalityPriority.map_node_score(&mut ctx, &pod, &node).unwrap(),
            0
        );
    }
}
