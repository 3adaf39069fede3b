//! The cluster-state contract the scheduler reads and mutates: node
//! inventory, the per-image cache, the bandwidth graph and the storage
//! index. `ClusterContext` is the "polymorphic value whose concrete
//! implementation is supplied by the embedder" the design calls for — the
//! scheduler only ever talks to `dyn ClusterContext`. [`InMemoryClusterContext`]
//! is the reference implementation used by the demo binary and the test
//! suite; a real deployment backs this with a topology loader instead.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use crate::error::SchedulerError;
use crate::model::{Node, Pod, REGISTRY_NODE};
use crate::storage::StorageIndex;
use crate::utils::normalize_image_name;

use crate::model::ImageState;

/// `bandwidth[from][to]` is bytes/second. Not required to be symmetric.
/// Must include [`REGISTRY_NODE`] as a key.
pub type BandwidthGraph = HashMap<String, HashMap<String, u64>>;

/// The cluster-state contract consumed and mutated by the scheduling
/// pipeline. See §4.3 of the design for the full operation list.
#[cfg_attr(test, mockall::automock)]
pub trait ClusterContext {
    /// All nodes, in a stable order preserved across calls between
    /// placements (the round-robin cursor relies on this).
    fn list_nodes(&self) -> Vec<Node>;

    fn get_node(&self, name: &str) -> Option<Node>;

    /// Total node count; overridden by implementations that can answer this
    /// without materializing the full node list.
    fn node_count(&self) -> usize {
        self.list_nodes().len()
    }

    /// Image metadata seeded at construction time, keyed by normalized
    /// image name.
    fn initial_image_states(&self) -> HashMap<String, ImageState>;

    fn bandwidth_graph(&self) -> &BandwidthGraph;

    /// The target of the next data-locality placement for `node`, used when
    /// a storage-index lookup is not possible. Retained for backwards
    /// compatibility; [`crate::priorities::DataLocalityPriority`] prefers
    /// the storage index when it is populated.
    fn next_storage_node(&self, node: &Node) -> String;

    fn storage_index(&self) -> &StorageIndex;

    /// Target range for normalized priority scores. Default 10.
    fn max_priority(&self) -> i64 {
        10
    }

    /// Bytes/second from `from` to `to`. A missing edge is a programmer
    /// error: the bandwidth graph is expected to be fully populated for
    /// every node pair the scheduler might query.
    fn dl_bandwidth(&self, from: &str, to: &str) -> Result<u64, SchedulerError> {
        self.bandwidth_graph()
            .get(from)
            .and_then(|edges| edges.get(to))
            .copied()
            .ok_or_else(|| {
                SchedulerError::ProgrammerError(format!(
                    "missing bandwidth edge {from} -> {to}"
                ))
            })
    }

    /// The set of normalized image names cached on `node_name`.
    fn images_on_node(&self, node_name: &str) -> HashSet<String>;

    /// Looks up image metadata, lazily calling [`Self::retrieve_image_state`]
    /// on a cache miss.
    fn get_image_state(&mut self, normalized_name: &str) -> Result<ImageState, SchedulerError>;

    /// Default remote image-size lookup: unsupported. Embedders that can
    /// query a registry override this.
    fn retrieve_image_state(&mut self, normalized_name: &str) -> Result<ImageState, SchedulerError> {
        Err(SchedulerError::UnsupportedImageQuery(
            normalized_name.to_string(),
        ))
    }

    /// Sizes (bytes), keyed by normalized image name, of every container
    /// image in `pod`, resolved for `arch`.
    fn image_sizes(&mut self, pod: &Pod, arch: Option<&str>) -> HashMap<String, u64> {
        let mut sizes = HashMap::new();
        for container in &pod.spec.containers {
            let name = normalize_image_name(&container.image);
            if let Ok(state) = self.get_image_state(&name) {
                if let Some(size) = state.size_for_arch(arch) {
                    sizes.insert(name, size);
                }
            }
        }
        sizes
    }

    /// Commits a placement: updates the image cache and deducts resources
    /// for every container, then appends `pod` to the node's pod list.
    fn place_pod_on_node(&mut self, pod: Pod, node_name: &str) -> Result<(), SchedulerError>;

    /// Inverse of the resource deduction in [`Self::place_pod_on_node`].
    /// Does not touch the image cache.
    fn remove_pod_from_node(&mut self, pod: &Pod, node_name: &str);

    /// Decrements `num_nodes` and drops the cache entry for every container
    /// image of `pod` that is cached on `node_name`.
    fn remove_pod_images_from_node(&mut self, pod: &Pod, node_name: &str);
}

/// In-memory reference `ClusterContext`. Used by the demo binary and the
/// integration test suite; not a production topology loader.
pub struct InMemoryClusterContext {
    node_order: Vec<String>,
    nodes: HashMap<String, Node>,
    image_states: HashMap<String, ImageState>,
    images_on_nodes: HashMap<String, HashSet<String>>,
    bandwidth: BandwidthGraph,
    storage_index: StorageIndex,
    storage_nodes: Vec<String>,
    next_storage_cursor: Cell<usize>,
}

impl InMemoryClusterContext {
    pub fn new(
        nodes: Vec<Node>,
        image_states: HashMap<String, ImageState>,
        mut bandwidth: BandwidthGraph,
        storage_index: StorageIndex,
    ) -> Self {
        bandwidth.entry(REGISTRY_NODE.to_string()).or_default();
        let node_order = nodes.iter().map(|n| n.name.clone()).collect();
        let storage_nodes: Vec<String> = nodes
            .iter()
            .filter(|n| n.name != REGISTRY_NODE)
            .map(|n| n.name.clone())
            .collect();
        let nodes = nodes.into_iter().map(|n| (n.name.clone(), n)).collect();
        Self {
            node_order,
            nodes,
            image_states,
            images_on_nodes: HashMap::new(),
            bandwidth,
            storage_index,
            storage_nodes,
            next_storage_cursor: Cell::new(0),
        }
    }

    pub fn storage_index_mut(&mut self) -> &mut StorageIndex {
        &mut self.storage_index
    }
}

impl ClusterContext for InMemoryClusterContext {
    fn list_nodes(&self) -> Vec<Node> {
        self.node_order
            .iter()
            .filter_map(|name| self.nodes.get(name).cloned())
            .collect()
    }

    fn get_node(&self, name: &str) -> Option<Node> {
        self.nodes.get(name).cloned()
    }

    fn node_count(&self) -> usize {
        self.node_order.len()
    }

    fn initial_image_states(&self) -> HashMap<String, ImageState> {
        self.image_states.clone()
    }

    fn bandwidth_graph(&self) -> &BandwidthGraph {
        &self.bandwidth
    }

    /// Unlike the trait default, an image never seen before is treated as a
    /// zero-size placeholder rather than a hard failure — this reference
    /// implementation has no registry to actually query.
    fn retrieve_image_state(&mut self, _normalized_name: &str) -> Result<ImageState, SchedulerError> {
        Ok(ImageState::default())
    }

    fn next_storage_node(&self, _node: &Node) -> String {
        if self.storage_nodes.is_empty() {
            return REGISTRY_NODE.to_string();
        }
        let idx = self.next_storage_cursor.get();
        self.next_storage_cursor
            .set((idx + 1) % self.storage_nodes.len());
        self.storage_nodes[idx].clone()
    }

    fn storage_index(&self) -> &StorageIndex {
        &self.storage_index
    }

    fn images_on_node(&self, node_name: &str) -> HashSet<String> {
        self.images_on_nodes
            .get(node_name)
            .cloned()
            .unwrap_or_default()
    }

    fn get_image_state(&mut self, normalized_name: &str) -> Result<ImageState, SchedulerError> {
        if let Some(state) = self.image_states.get(normalized_name) {
            return Ok(state.clone());
        }
        let state = self.retrieve_image_state(normalized_name)?;
        self.image_states
            .insert(normalized_name.to_string(), state.clone());
        Ok(state)
    }

    fn place_pod_on_node(&mut self, pod: Pod, node_name: &str) -> Result<(), SchedulerError> {
        let mut cpu_total = 0i64;
        let mut mem_total = 0i64;
        for container in &pod.spec.containers {
            let image = normalize_image_name(&container.image);
            let already_cached = self
                .images_on_nodes
                .get(node_name)
                .is_some_and(|cached| cached.contains(&image));
            if !already_cached {
                let mut state = self.get_image_state(&image)?;
                state.num_nodes += 1;
                self.image_states.insert(image.clone(), state);
                self.images_on_nodes
                    .entry(node_name.to_string())
                    .or_default()
                    .insert(image.clone());
            }
            cpu_total += container.resources.cpu_millis();
            mem_total += container.resources.memory();
        }

        let node = self.nodes.get_mut(node_name).ok_or_else(|| {
            SchedulerError::ProgrammerError(format!("unknown node {node_name}"))
        })?;
        node.allocatable.cpu_millis -= cpu_total;
        node.allocatable.memory -= mem_total;
        node.pods.push(pod);
        Ok(())
    }

    fn remove_pod_from_node(&mut self, pod: &Pod, node_name: &str) {
        let mut cpu_total = 0i64;
        let mut mem_total = 0i64;
        for container in &pod.spec.containers {
            cpu_total += container.resources.cpu_millis();
            mem_total += container.resources.memory();
        }
        if let Some(node) = self.nodes.get_mut(node_name) {
            node.allocatable.cpu_millis += cpu_total;
            node.allocatable.memory += mem_total;
            node.pods.retain(|p| p.id() != pod.id());
        }
    }

    fn remove_pod_images_from_node(&mut self, pod: &Pod, node_name: &str) {
        for container in &pod.spec.containers {
            let image = normalize_image_name(&container.image);
            let removed = self
                .images_on_nodes
                .get_mut(node_name)
                .is_some_and(|cached| cached.remove(&image));
            if removed {
                if let Some(state) = self.image_states.get_mut(&image) {
                    state.num_nodes = state.num_nodes.saturating_sub(1);
                }
            }
        }
    }
}
