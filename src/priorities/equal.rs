use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod};

use super::Priority;

/// Scores every node identically. Useful as a baseline or when no other
/// priority should influence placement.
pub struct EqualPriority;

impl Priority for EqualPriority {
    fn name(&self) -> &'static str {
        "EqualPriority"
    }

    fn map_node_score(
        &self,
        _context: &mut dyn ClusterContext,
        _pod: &Pod,
        _node: &Node,
    ) -> Result<i64, SchedulerError> {
        Ok(1)
    }
}
