use anyhow::Result;
use clap::Parser;
use log::info;
use std::collections::HashMap;

use skippy_scheduler::{
    Capacity, Container, InMemoryClusterContext, Node, Pod, PodSpec, ResourceRequest,
    SchedulerError, StorageIndex,
};

/// Schedule a single demo pod onto an in-memory fleet and print the result.
///
/// This binary exists to exercise the scheduling core end to end; real
/// deployments wire a topology loader and a pod source into the library
/// directly rather than going through this CLI.
#[derive(Parser)]
#[command(author, version, about = "Skippy scheduler demo", long_about = None)]
struct Args {
    /// Number of demo edge/cloud nodes to generate.
    #[arg(long, default_value_t = 4)]
    nodes: usize,

    /// percentage_of_nodes_to_score passed to the scheduler.
    #[arg(long, default_value_t = 100)]
    percentage_of_nodes_to_score: i64,

    /// Container image for the demo pod.
    #[arg(long, default_value = "edgerun/ml-wf-1:0.33")]
    image: String,

    /// Print the scheduling result as JSON instead of plain text.
    #[arg(long)]
    json: bool,
}

fn demo_cluster(node_count: usize) -> InMemoryClusterContext {
    let mut nodes = Vec::new();
    for i in 0..node_count {
        let mut labels = HashMap::new();
        labels.insert("beta.kubernetes.io/arch".to_string(), "amd64".to_string());
        labels.insert(
            "locality.skippy.io/type".to_string(),
            if i == 0 { "edge".to_string() } else { "cloud".to_string() },
        );
        let node = Node::new(format!("node-{i}"), Capacity::new(2000, 4 * 1024 * 1024 * 1024))
            .with_labels(labels);
        nodes.push(node);
    }

    let mut bandwidth = HashMap::new();
    let mut registry_edges = HashMap::new();
    for node in &nodes {
        registry_edges.insert(node.name.clone(), 50_000_000u64);
    }
    bandwidth.insert("registry".to_string(), registry_edges);

    InMemoryClusterContext::new(nodes, HashMap::new(), bandwidth, StorageIndex::new())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("Skippy scheduler demo");
    println!("=====================");
    info!("Building a demo cluster with {} nodes", args.nodes);

    let mut context = demo_cluster(args.nodes);
    let mut scheduler = skippy_scheduler::Scheduler::new(args.percentage_of_nodes_to_score);

    let pod = Pod::new(
        "demo-pod",
        "default",
        PodSpec::new(vec![Container::with_resources(
            args.image.clone(),
            ResourceRequest::new().with("cpu", 500).with("memory", 512 * 1024 * 1024),
        )]),
    );

    let result = scheduler
        .schedule(&mut context, pod)
        .map_err(|e: SchedulerError| anyhow::anyhow!(e))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result.suggested_host {
        Some(host) => {
            println!("Placed on: {}", host.name);
            println!("Feasible nodes considered: {}", result.feasible_nodes);
            println!(
                "Images to pull: {:?}",
                result.needed_images.unwrap_or_default()
            );
        }
        None => {
            println!("No feasible node found ({} considered)", result.feasible_nodes);
        }
    }

    Ok(())
}
