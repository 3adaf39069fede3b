//! Scheduling core for Skippy, an edge-cloud container orchestrator.
//!
//! Given a pod and a fleet of nodes, [`scheduler::Scheduler`] decides which
//! single node to place the pod on: filter feasible nodes with
//! [`predicates`], rank them with weighted [`priorities`], and commit the
//! placement through a [`cluster_context::ClusterContext`]. Topology
//! loading, bandwidth-graph construction, persistence and the outer CLI are
//! external collaborators — this crate only specifies the interfaces they
//! plug into.

pub mod cluster_context;
pub mod error;
pub mod model;
pub mod predicates;
pub mod priorities;
pub mod scheduler;
pub mod storage;
pub mod utils;

pub use cluster_context::{BandwidthGraph, ClusterContext, InMemoryClusterContext};
pub use error::SchedulerError;
pub use model::{
    Capacity, Container, DataItem, ImageState, Node, Pod, PodSpec, ResourceRequest,
    SchedulingResult,
};
pub use scheduler::Scheduler;
pub use storage::StorageIndex;
