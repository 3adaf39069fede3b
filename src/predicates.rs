//! Boolean feasibility checks. A predicate is a pure function
//! `(context, pod, node) -> bool`; predicates are composed by conjunction
//! and short-circuit, logging each sub-predicate's outcome at debug level.

use log::debug;

use crate::cluster_context::ClusterContext;
use crate::model::{Capacity, Node, Pod};

pub trait Predicate {
    fn name(&self) -> &'static str;

    fn passes_predicate(&self, context: &dyn ClusterContext, pod: &Pod, node: &Node) -> bool;
}

/// Conjoins a list of predicates, short-circuiting on the first failure and
/// logging every sub-predicate's outcome at debug level.
pub struct CombinedPredicate {
    predicates: Vec<Box<dyn Predicate>>,
}

impl CombinedPredicate {
    pub fn new(predicates: Vec<Box<dyn Predicate>>) -> Self {
        Self { predicates }
    }
}

impl Predicate for CombinedPredicate {
    fn name(&self) -> &'static str {
        "CombinedPredicate"
    }

    fn passes_predicate(&self, context: &dyn ClusterContext, pod: &Pod, node: &Node) -> bool {
        self.predicates.iter().all(|predicate| {
            let result = predicate.passes_predicate(context, pod, node);
            debug!(
                "Pod {} / Node {} / {}: {}",
                pod.name,
                node.name,
                predicate.name(),
                if result { "Passed" } else { "Failed" }
            );
            result
        })
    }
}

/// Checks that a node has sufficient allocatable CPU and memory to run
/// every container in the pod, with default requests applied.
///
/// <https://github.com/kubernetes/kubernetes/blob/eaa78b88ac25a61bfb1aa81d118c5ffeda041b64/pkg/scheduler/algorithm/predicates/predicates.go#L769>
pub struct PodFitsResourcesPredicate;

impl Predicate for PodFitsResourcesPredicate {
    fn name(&self) -> &'static str {
        "PodFitsResourcesPredicate"
    }

    fn passes_predicate(&self, _context: &dyn ClusterContext, pod: &Pod, node: &Node) -> bool {
        let mut requested = Capacity::default();
        for container in &pod.spec.containers {
            requested.cpu_millis += container.resources.cpu_millis();
            requested.memory += container.resources.memory();
        }
        let allocatable = node.allocatable;
        let passed =
            requested.memory <= allocatable.memory && requested.cpu_millis <= allocatable.cpu_millis;
        debug!(
            "Pod {} requests {}m / {}B. Available on node {}: {}m / {}B. Passed: {}",
            pod.name,
            requested.cpu_millis,
            requested.memory,
            node.name,
            allocatable.cpu_millis,
            allocatable.memory,
            passed
        );
        passed
    }
}

/// The default predicate list: resource-fit only. New predicates can be
/// added here without touching the scheduler.
pub fn default_predicates() -> Vec<Box<dyn Predicate>> {
    vec![Box::new(PodFitsResourcesPredicate)]
}
