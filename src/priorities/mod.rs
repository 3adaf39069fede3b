//! Node scoring functions. A priority maps each feasible node to a raw
//! score, then reduces the full score vector (typically rank
//! normalization); the scheduler multiplies the reduced scores by the
//! priority's configured weight and accumulates per-node totals.

mod balanced_resource;
mod capability;
mod data_locality;
mod equal;
mod image_locality;
mod latency_image_locality;
mod locality_type;
mod scale;

pub use balanced_resource::BalancedResourcePriority;
pub use capability::CapabilityPriority;
pub use data_locality::DataLocalityPriority;
pub use equal::EqualPriority;
pub use image_locality::ImageLocalityPriority;
pub use latency_image_locality::LatencyAwareImageLocalityPriority;
pub use locality_type::LocalityTypePriority;
pub use scale::{scale, scale_inverse};

use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod};

pub trait Priority {
    fn name(&self) -> &'static str;

    /// Calculates the raw score of `node` for `pod`.
    fn map_node_score(
        &self,
        context: &mut dyn ClusterContext,
        pod: &Pod,
        node: &Node,
    ) -> Result<i64, SchedulerError>;

    /// Post-processes the raw score vector for all feasible nodes. The
    /// default does not modify the scores.
    fn reduce_mapped_score(
        &self,
        _context: &dyn ClusterContext,
        _pod: &Pod,
        _nodes: &[Node],
        node_scores: &[i64],
    ) -> Vec<i64> {
        node_scores.to_vec()
    }
}

/// The scheduler's default weighted priority list: one of each of
/// BalancedResource, LatencyAwareImageLocality, LocalityType, DataLocality
/// and Capability, each weighted 1.0.
pub fn default_weighted_priorities() -> Vec<(f64, Box<dyn Priority>)> {
    vec![
        (1.0, Box::new(BalancedResourcePriority)),
        (1.0, Box::new(LatencyAwareImageLocalityPriority)),
        (1.0, Box::new(LocalityTypePriority)),
        (1.0, Box::new(DataLocalityPriority)),
        (1.0, Box::new(CapabilityPriority)),
    ]
}
