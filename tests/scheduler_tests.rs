//! Integration tests for the full scheduling pipeline, covering the
//! scenarios the core is expected to get right end to end.

use std::collections::HashMap;

use skippy_scheduler::model::{LABEL_LOCALITY_TYPE, LABEL_RECEIVES_FROM_STORAGE};
use skippy_scheduler::priorities::{DataLocalityPriority, LocalityTypePriority};
use skippy_scheduler::{
    Capacity, Container, DataItem, ImageState, InMemoryClusterContext, Node, Pod, PodSpec,
    ResourceRequest, Scheduler, StorageIndex,
};

fn node(name: &str, cpu_millis: i64, memory: i64) -> Node {
    Node::new(name, Capacity::new(cpu_millis, memory))
}

#[test]
fn s1_empty_cluster_returns_null_suggestion() {
    let mut ctx = InMemoryClusterContext::new(vec![], HashMap::new(), HashMap::new(), StorageIndex::new());
    let mut scheduler = Scheduler::new(100);
    let pod = Pod::new("p1", "default", PodSpec::new(vec![Container::new("img")]));

    let result = scheduler.schedule(&mut ctx, pod).unwrap();
    assert!(result.suggested_host.is_none());
    assert_eq!(result.feasible_nodes, 0);
    assert!(result.needed_images.is_none());
}

#[test]
fn s2_single_fit_places_pod_and_updates_state() {
    let n1 = node("node1", 1000, 1024 * 1024 * 1024);
    let mut registry_edges = HashMap::new();
    registry_edges.insert("node1".to_string(), 50_000_000u64);
    let mut bandwidth = HashMap::new();
    bandwidth.insert("registry".to_string(), registry_edges);
    let mut ctx =
        InMemoryClusterContext::new(vec![n1], HashMap::new(), bandwidth, StorageIndex::new());
    let mut scheduler = Scheduler::new(100);
    let pod = Pod::new(
        "p1",
        "default",
        PodSpec::new(vec![Container::new("repo/app")]),
    );

    let result = scheduler.schedule(&mut ctx, pod).unwrap();
    let host = result.suggested_host.unwrap();
    assert_eq!(host.name, "node1");
    assert_eq!(result.feasible_nodes, 1);
    assert_eq!(result.needed_images, Some(vec!["repo/app:latest".to_string()]));
    assert_eq!(host.allocatable.cpu_millis, 900);
    assert_eq!(host.allocatable.memory, 1024 * 1024 * 1024 - 200 * 1024 * 1024);

    let state = ctx.get_image_state("repo/app:latest").unwrap();
    assert_eq!(state.num_nodes, 1);
}

#[test]
fn s3_resource_exhaustion_returns_null_suggestion() {
    let mut n1 = node("node1", 1000, 1024 * 1024 * 1024);
    n1.allocatable.cpu_millis = 50;
    let mut ctx =
        InMemoryClusterContext::new(vec![n1], HashMap::new(), HashMap::new(), StorageIndex::new());
    let mut scheduler = Scheduler::new(100);
    let pod = Pod::new("p1", "default", PodSpec::new(vec![Container::new("img")]));

    let result = scheduler.schedule(&mut ctx, pod).unwrap();
    assert!(result.suggested_host.is_none());
    assert_eq!(result.feasible_nodes, 0);
}

#[test]
fn s4_edge_preference_picks_the_edge_node() {
    let mut edge_labels = HashMap::new();
    edge_labels.insert(LABEL_LOCALITY_TYPE.to_string(), "edge".to_string());
    let mut cloud_labels = HashMap::new();
    cloud_labels.insert(LABEL_LOCALITY_TYPE.to_string(), "cloud".to_string());

    let node_a = node("a", 1000, 1024 * 1024 * 1024).with_labels(edge_labels);
    let node_b = node("b", 1000, 1024 * 1024 * 1024).with_labels(cloud_labels);

    let mut ctx = InMemoryClusterContext::new(
        vec![node_a, node_b],
        HashMap::new(),
        HashMap::new(),
        StorageIndex::new(),
    );
    let mut scheduler = Scheduler::with_predicates_and_priorities(
        100,
        skippy_scheduler::predicates::default_predicates(),
        vec![(1.0, Box::new(LocalityTypePriority))],
    );
    let pod = Pod::new("p1", "default", PodSpec::new(vec![Container::new("img")]));

    let result = scheduler.schedule(&mut ctx, pod).unwrap();
    assert_eq!(result.suggested_host.unwrap().name, "a");
}

#[test]
fn s5_image_locality_bandwidth_prefers_node_with_image_cached() {
    let arch_label = |node: Node| {
        let mut labels = HashMap::new();
        labels.insert("beta.kubernetes.io/arch".to_string(), "amd64".to_string());
        node.with_labels(labels)
    };
    let node_a = arch_label(node("a", 1000, 1024 * 1024 * 1024));
    let node_b = arch_label(node("b", 1000, 1024 * 1024 * 1024));

    let mut size = HashMap::new();
    size.insert("amd64".to_string(), 100_000_000u64);
    let mut image_states = HashMap::new();
    image_states.insert("repo/app:v1".to_string(), ImageState::new(size));

    let mut bandwidth = HashMap::new();
    let mut registry_edges = HashMap::new();
    registry_edges.insert("a".to_string(), 12_500_000u64);
    registry_edges.insert("b".to_string(), 12_500_000u64);
    bandwidth.insert("registry".to_string(), registry_edges);

    let mut ctx = InMemoryClusterContext::new(
        vec![node_a.clone(), node_b],
        image_states,
        bandwidth,
        StorageIndex::new(),
    );

    // Pre-cache the image on node a (place then release resources, keep the cache).
    let seed_pod = Pod::new("seed", "default", PodSpec::new(vec![Container::new("repo/app:v1")]));
    ctx.place_pod_on_node(seed_pod.clone(), "a").unwrap();
    ctx.remove_pod_from_node(&seed_pod, "a");

    let mut scheduler = Scheduler::with_predicates_and_priorities(
        100,
        skippy_scheduler::predicates::default_predicates(),
        vec![(1.0, Box::new(skippy_scheduler::priorities::LatencyAwareImageLocalityPriority))],
    );
    let pod = Pod::new("p1", "default", PodSpec::new(vec![Container::new("repo/app:v1")]));

    let result = scheduler.schedule(&mut ctx, pod).unwrap();
    assert_eq!(result.suggested_host.unwrap().name, "a");
    assert_eq!(result.needed_images, Some(vec![]));
}

#[test]
fn s6_data_locality_prefers_the_storage_node() {
    let mut storage_index = StorageIndex::new();
    storage_index.make_bucket("in", "storage");
    storage_index.put(DataItem::new("in", "obj", 10_000_000)).unwrap();

    let storage_node = node("storage", 1000, 1024 * 1024 * 1024);
    let other_node = node("x", 1000, 1024 * 1024 * 1024);

    let mut bandwidth = HashMap::new();
    let mut storage_edges = HashMap::new();
    storage_edges.insert("x".to_string(), 10_000_000u64);
    bandwidth.insert("storage".to_string(), storage_edges);

    let mut ctx = InMemoryClusterContext::new(
        vec![storage_node, other_node],
        HashMap::new(),
        bandwidth,
        storage_index,
    );

    let mut labels = HashMap::new();
    labels.insert(LABEL_RECEIVES_FROM_STORAGE.to_string(), "in/obj".to_string());
    let pod = Pod::new(
        "p1",
        "default",
        PodSpec::new(vec![Container::new("img")]).with_labels(labels),
    );

    let mut scheduler = Scheduler::with_predicates_and_priorities(
        100,
        skippy_scheduler::predicates::default_predicates(),
        vec![(1.0, Box::new(DataLocalityPriority))],
    );

    let result = scheduler.schedule(&mut ctx, pod).unwrap();
    assert_eq!(result.suggested_host.unwrap().name, "storage");
}

#[test]
fn round_robin_cursor_advances_across_calls_on_a_large_fleet() {
    // With 300 identical nodes and percentage_of_nodes_to_score=10, the
    // sampling target clamps to the 100-node minimum (< the fleet size), so
    // each call only scores a 100-node window. Because every node is
    // identical, every priority ties within a window and the stable
    // tie-break picks the first node in that window — i.e. the node at the
    // cursor. Three consecutive calls should therefore land on three
    // distinct 100-node-apart nodes, demonstrating the cursor advances
    // instead of re-scoring the same window every time.
    let nodes: Vec<Node> = (0..300)
        .map(|i| node(&format!("n{i}"), 100_000, 100 * 1024 * 1024 * 1024))
        .collect();
    let mut registry_edges = HashMap::new();
    for n in &nodes {
        registry_edges.insert(n.name.clone(), 50_000_000u64);
    }
    let mut bandwidth = HashMap::new();
    bandwidth.insert("registry".to_string(), registry_edges);

    let mut ctx = InMemoryClusterContext::new(nodes, HashMap::new(), bandwidth, StorageIndex::new());
    let mut scheduler = Scheduler::new(10);

    let mut chosen = Vec::new();
    for i in 0..3 {
        let resources = ResourceRequest::new().with("cpu", 1).with("memory", 1);
        let pod = Pod::new(
            format!("p{i}"),
            "default",
            PodSpec::new(vec![Container::with_resources("img", resources)]),
        );
        let result = scheduler.schedule(&mut ctx, pod).unwrap();
        chosen.push(result.suggested_host.unwrap().name);
    }

    assert_eq!(chosen, vec!["n0", "n100", "n200"]);
}
