//! The scheduling pipeline: sample a bounded slice of nodes with a
//! round-robin cursor for fleet-wide fairness, filter by predicate,
//! score the survivors with weighted priorities, pick the argmax, and
//! commit the placement.

use log::debug;

use crate::cluster_context::ClusterContext;
use crate::error::SchedulerError;
use crate::model::{Node, Pod, SchedulingResult};
use crate::predicates::{default_predicates, Predicate};
use crate::priorities::{default_weighted_priorities, Priority};
use crate::utils::normalize_image_name;

/// https://github.com/kubernetes/kubernetes/blob/c1f40a5310b0abfe9a4fbddc24955360821a324b/pkg/scheduler/core/generic_scheduler.go#L58
const MIN_FEASIBLE_NODES_TO_FIND: i64 = 100;
/// https://github.com/kubernetes/kubernetes/blob/c1f40a5310b0abfe9a4fbddc24955360821a324b/pkg/scheduler/core/generic_scheduler.go#L63
const MIN_FEASIBLE_NODES_PERCENTAGE_TO_FIND: i64 = 5;
/// https://github.com/kubernetes/kubernetes/blob/c1f40a5310b0abfe9a4fbddc24955360821a324b/pkg/scheduler/api/types.go#L40
const DEFAULT_PERCENTAGE_OF_NODES_TO_SCORE: i64 = 50;

pub struct Scheduler {
    predicates: Vec<Box<dyn Predicate>>,
    priorities: Vec<(f64, Box<dyn Priority>)>,
    percentage_of_nodes_to_score: i64,
    last_scored_node_index: usize,
}

impl Scheduler {
    pub fn new(percentage_of_nodes_to_score: i64) -> Self {
        Self {
            predicates: default_predicates(),
            priorities: default_weighted_priorities(),
            percentage_of_nodes_to_score,
            last_scored_node_index: 0,
        }
    }

    pub fn with_predicates_and_priorities(
        percentage_of_nodes_to_score: i64,
        predicates: Vec<Box<dyn Predicate>>,
        priorities: Vec<(f64, Box<dyn Priority>)>,
    ) -> Self {
        Self {
            predicates,
            priorities,
            percentage_of_nodes_to_score,
            last_scored_node_index: 0,
        }
    }

    /// How many feasible nodes the scheduler will accept before stopping,
    /// given the total node count. Mirrors Kubernetes's
    /// `percentage_of_nodes_to_score` tuning knob.
    fn num_feasible_nodes_to_find(&self, num_all_nodes: i64) -> i64 {
        if num_all_nodes < 5 || self.percentage_of_nodes_to_score >= 100 {
            return num_all_nodes;
        }

        let mut adaptive_percentage = self.percentage_of_nodes_to_score;
        if adaptive_percentage <= 0 {
            adaptive_percentage = DEFAULT_PERCENTAGE_OF_NODES_TO_SCORE - num_all_nodes / 125;
            if adaptive_percentage < MIN_FEASIBLE_NODES_PERCENTAGE_TO_FIND {
                adaptive_percentage = MIN_FEASIBLE_NODES_PERCENTAGE_TO_FIND;
            }
        }

        let num_nodes = num_all_nodes * adaptive_percentage / 100;
        if num_nodes < MIN_FEASIBLE_NODES_TO_FIND {
            MIN_FEASIBLE_NODES_TO_FIND
        } else {
            num_nodes
        }
    }

    fn passes_predicates(&self, context: &dyn ClusterContext, pod: &Pod, node: &Node) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.passes_predicate(context, pod, node))
    }

    /// Decides which node to place `pod` on, mutating `context` to reflect
    /// the placement when one is found. A pipeline run never fails with
    /// "no feasible node" — that case is represented by a `null`
    /// `suggested_host`. Errors here mean a predicate or priority hit an
    /// unrecoverable invariant violation (missing bandwidth edge, etc).
    pub fn schedule(
        &mut self,
        context: &mut dyn ClusterContext,
        pod: Pod,
    ) -> Result<SchedulingResult, SchedulerError> {
        debug!("Received a new pod to schedule: {}", pod.name);

        let nodes = context.list_nodes();
        if nodes.is_empty() {
            return Ok(SchedulingResult::no_feasible_node());
        }

        let target = self.num_feasible_nodes_to_find(nodes.len() as i64).max(0) as usize;

        let start = self.last_scored_node_index % nodes.len();
        let mut feasible_nodes: Vec<Node> = Vec::new();
        let mut last_accepted_base_index: Option<usize> = None;
        for lap_index in 0..nodes.len() {
            if feasible_nodes.len() >= target {
                break;
            }
            let base_index = (start + lap_index) % nodes.len();
            let node = &nodes[base_index];
            if self.passes_predicates(context, &pod, node) {
                feasible_nodes.push(node.clone());
                last_accepted_base_index = Some(base_index);
            }
        }

        if let Some(index) = last_accepted_base_index {
            self.last_scored_node_index = (index + 1) % nodes.len();
        }

        if feasible_nodes.is_empty() {
            return Ok(SchedulingResult::no_feasible_node());
        }

        let mut totals = vec![0f64; feasible_nodes.len()];
        for (weight, priority) in &self.priorities {
            let mut raw_scores = Vec::with_capacity(feasible_nodes.len());
            for node in &feasible_nodes {
                raw_scores.push(priority.map_node_score(context, &pod, node)?);
            }
            let reduced = priority.reduce_mapped_score(context, &pod, &feasible_nodes, &raw_scores);
            debug!(
                "Pod {} / {}: {:?}",
                pod.name,
                priority.name(),
                reduced
            );
            for (total, score) in totals.iter_mut().zip(reduced.iter()) {
                *total += *score as f64 * weight;
            }
        }

        let mut best_index = 0usize;
        let mut best_score = totals[0];
        for (index, score) in totals.iter().enumerate().skip(1) {
            if *score > best_score {
                best_score = *score;
                best_index = index;
            }
        }

        let chosen = feasible_nodes[best_index].clone();

        let needed_images: Vec<String> = pod
            .spec
            .containers
            .iter()
            .map(|c| normalize_image_name(&c.image))
            .filter(|image| !context.images_on_node(&chosen.name).contains(image))
            .collect();

        context.place_pod_on_node(pod, &chosen.name)?;
        let chosen = context
            .get_node(&chosen.name)
            .unwrap_or(chosen);

        debug!(
            "Found best node {}. Remaining allocatable resources: {:?}",
            chosen.name, chosen.allocatable
        );

        Ok(SchedulingResult {
            suggested_host: Some(chosen),
            feasible_nodes: feasible_nodes.len(),
            needed_images: Some(needed_images),
        })
    }
}
