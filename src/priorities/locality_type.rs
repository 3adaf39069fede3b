use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod, LABEL_LOCALITY_TYPE};

use super::Priority;

/// Prefers edge nodes over cloud nodes, reading the
/// `locality.skippy.io/type` node label. Any value other than `"edge"`
/// (including `"cloud"` or a missing label) scores 0.
pub struct LocalityTypePriority;

impl Priority for LocalityTypePriority {
    fn name(&self) -> &'static str {
        "LocalityTypePriority"
    }

    fn map_node_score(
        &self,
        context: &mut dyn ClusterContext,
        _pod: &Pod,
        node: &Node,
    ) -> Result<i64, SchedulerError> {
        let score = match node.labels.get(LABEL_LOCALITY_TYPE).map(String::as_str) {
            Some("edge") => context.max_priority(),
            _ => 0,
        };
        Ok(score)
    }
}
