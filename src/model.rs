//! Core data types shared by predicates, priorities, the cluster context and
//! the scheduler: nodes, pods, containers, capacities, image state and the
//! scheduling result.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Default CPU request applied to a container that does not specify one, in
/// millicores (0.1 cores).
pub const DEFAULT_MILLI_CPU_REQUEST: i64 = 100;
/// Default memory request applied to a container that does not specify one,
/// in bytes (200 MiB).
pub const DEFAULT_MEM_REQUEST: i64 = 200 * 1024 * 1024;

/// Node label carrying the CPU architecture (`amd64`, `arm`, `arm64`, ...).
pub const LABEL_ARCH: &str = "beta.kubernetes.io/arch";
/// Node/pod label carrying the edge-vs-cloud locality type.
pub const LABEL_LOCALITY_TYPE: &str = "locality.skippy.io/type";
/// Substring shared by all node capability labels (`capability.skippy.io/<name>`).
pub const LABEL_CAPABILITY_PREFIX: &str = "capability.skippy.io";
/// Pod label naming the storage path (`bucket/name`) a pod reads input from.
pub const LABEL_RECEIVES_FROM_STORAGE: &str = "data.skippy.io/receives-from-storage/path";
/// Pod label naming the storage path (`bucket/name`) a pod writes output to.
pub const LABEL_SENDS_TO_STORAGE: &str = "data.skippy.io/sends-to-storage/path";

/// Reserved node name used as the origin of image pulls in the bandwidth graph.
pub const REGISTRY_NODE: &str = "registry";

/// A pair of non-negative-at-rest resource quantities: CPU in millicores and
/// memory in bytes. Arithmetic is plain integer arithmetic; predicates are
/// what keep `allocatable` from going negative, not the type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capacity {
    pub cpu_millis: i64,
    pub memory: i64,
}

impl Capacity {
    pub fn new(cpu_millis: i64, memory: i64) -> Self {
        Self { cpu_millis, memory }
    }
}

/// A container's resource requests, keyed by resource name (`"cpu"`,
/// `"memory"`). Missing keys fall back to [`DEFAULT_MILLI_CPU_REQUEST`] /
/// [`DEFAULT_MEM_REQUEST`]. `"mem"` is accepted as an alias for `"memory"`
/// on read (the source material used both keys inconsistently; `"memory"`
/// is canonical).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRequest {
    requests: HashMap<String, i64>,
}

impl ResourceRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: i64) -> Self {
        self.requests.insert(key.into(), value);
        self
    }

    pub fn cpu_millis(&self) -> i64 {
        self.requests
            .get("cpu")
            .copied()
            .unwrap_or(DEFAULT_MILLI_CPU_REQUEST)
    }

    pub fn memory(&self) -> i64 {
        if let Some(v) = self.requests.get("memory") {
            return *v;
        }
        if let Some(v) = self.requests.get("mem") {
            return *v;
        }
        DEFAULT_MEM_REQUEST
    }
}

/// A container spec: the image to run and its resource requests. Every
/// container owns its own [`ResourceRequest`] — never a shared default, to
/// avoid the aliasing bugs the defaults were prone to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    pub image: String,
    pub resources: ResourceRequest,
}

impl Container {
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            resources: ResourceRequest::new(),
        }
    }

    pub fn with_resources(image: impl Into<String>, resources: ResourceRequest) -> Self {
        Self {
            image: image.into(),
            resources,
        }
    }
}

/// An ordered list of containers plus the label map used for scheduling
/// hints (locality, data placement, capability affinity).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodSpec {
    pub containers: Vec<Container>,
    pub labels: HashMap<String, String>,
}

impl PodSpec {
    pub fn new(containers: Vec<Container>) -> Self {
        Self {
            containers,
            labels: HashMap::new(),
        }
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }
}

/// A workload unit to be placed on exactly one node. Identity is
/// `(namespace, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    pub spec: PodSpec,
}

impl Pod {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>, spec: PodSpec) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            spec,
        }
    }

    pub fn id(&self) -> (&str, &str) {
        (&self.namespace, &self.name)
    }
}

/// A worker machine: immutable total capacity, mutable remaining
/// (`allocatable`) capacity, labels and the pods currently placed on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    pub capacity: Capacity,
    pub allocatable: Capacity,
    pub labels: HashMap<String, String>,
    pub pods: Vec<Pod>,
}

impl Node {
    pub fn new(name: impl Into<String>, capacity: Capacity) -> Self {
        Self {
            name: name.into(),
            capacity,
            allocatable: capacity,
            labels: HashMap::new(),
            pods: Vec::new(),
        }
    }

    pub fn with_labels(mut self, labels: HashMap<String, String>) -> Self {
        self.labels = labels;
        self
    }

    pub fn arch(&self) -> Option<&str> {
        self.labels.get(LABEL_ARCH).map(|s| s.as_str())
    }
}

/// Per-image record of per-architecture sizes and the count of nodes caching
/// it. `image_states` owns these; `images_on_nodes` only ever records
/// presence, never a second copy of the size map, so updates always go
/// through [`crate::cluster_context::ClusterContext::place_pod_on_node`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageState {
    pub size: HashMap<String, u64>,
    pub num_nodes: u32,
}

impl ImageState {
    pub fn new(size: HashMap<String, u64>) -> Self {
        Self { size, num_nodes: 0 }
    }

    /// Size for `arch`, falling back to any present architecture entry if
    /// `arch` is absent (logging a warning, per the latency-aware
    /// image-locality priority's documented fallback).
    pub fn size_for_arch(&self, arch: Option<&str>) -> Option<u64> {
        if let Some(arch) = arch {
            if let Some(size) = self.size.get(arch) {
                return Some(*size);
            }
        }
        if let Some((fallback_arch, size)) = self.size.iter().next() {
            log::warn!(
                "image has no size entry for arch {:?}, falling back to {}",
                arch,
                fallback_arch
            );
            return Some(*size);
        }
        None
    }
}

/// An item of data in the object store: `(bucket, name, size_bytes)`.
/// Identity is `(bucket, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataItem {
    pub bucket: String,
    pub name: String,
    pub size: u64,
}

impl DataItem {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>, size: u64) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
            size,
        }
    }

    pub fn key(&self) -> (&str, &str) {
        (&self.bucket, &self.name)
    }
}

/// The outcome of one `schedule()` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingResult {
    pub suggested_host: Option<Node>,
    pub feasible_nodes: usize,
    pub needed_images: Option<Vec<String>>,
}

impl SchedulingResult {
    pub fn no_feasible_node() -> Self {
        Self {
            suggested_host: None,
            feasible_nodes: 0,
            needed_images: None,
        }
    }
}
