//! Benchmarks for task graph operations
//!
//! Run with: cargo bench -p mosaicflow-task-graph

#![allow(clippy::unwrap_used)]

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use mosaicflow_task_graph::{TaskGraph, TaskNodeData};
use std::hint::black_box;

/// Simple task type for benchmarking
#[derive(Debug, Clone)]
struct BenchTask {
    inputs: Vec<String>,
    outputs: Vec<String>,
}

impl BenchTask {
    fn new(inputs: Vec<String>, output: String) -> Self {
        Self {
            inputs,
            outputs: vec![output],
        }
    }
}

impl TaskNodeData for BenchTask {
    fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(String::as_str)
    }

    fn output_names(&self) -> impl Iterator<Item = &str> {
        self.outputs.iter().map(String::as_str)
    }
}

/// Many projection-like tasks all reading the output of one root.
fn generate_wide_graph(task_count: usize) -> TaskGraph<BenchTask> {
    let mut graph = TaskGraph::new();
    graph
        .add_task("root", BenchTask::new(vec![], "root.hdr".to_string()))
        .unwrap();

    for i in 0..task_count {
        let task = BenchTask::new(vec!["root.hdr".to_string()], format!("p{i}.fits"));
        graph.add_task(&format!("task_{i}"), task).unwrap();
    }

    graph.add_data_flow_edges(|_| true).unwrap();
    graph
}

/// A linear chain where each task reads the previous output.
fn generate_deep_graph(depth: usize) -> TaskGraph<BenchTask> {
    let mut graph = TaskGraph::new();
    graph
        .add_task("task_0", BenchTask::new(vec![], "f0".to_string()))
        .unwrap();

    for i in 1..depth {
        let task = BenchTask::new(vec![format!("f{}", i - 1)], format!("f{i}"));
        graph.add_task(&format!("task_{i}"), task).unwrap();
    }

    graph.add_data_flow_edges(|_| true).unwrap();
    graph
}

/// Fan-out then fan-in, like per-image projection followed by one co-add.
fn generate_diamond_graph(width: usize, depth: usize) -> TaskGraph<BenchTask> {
    let mut graph = TaskGraph::new();
    graph
        .add_task("root", BenchTask::new(vec![], "root.out".to_string()))
        .unwrap();

    let mut prev_level: Vec<String> = vec!["root.out".to_string()];
    for level in 0..depth {
        let mut current_level = Vec::new();
        for w in 0..width {
            let output = format!("level_{level}_{w}.out");
            let task = BenchTask::new(prev_level.clone(), output.clone());
            graph
                .add_task(&format!("level_{level}_task_{w}"), task)
                .unwrap();
            current_level.push(output);
        }
        prev_level = current_level;
    }

    graph
        .add_task("final", BenchTask::new(prev_level, "mosaic.fits".to_string()))
        .unwrap();
    graph.add_data_flow_edges(|_| true).unwrap();
    graph
}

fn benchmark_topological_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("topological_sort");

    for count in [50, 100, 200, 500] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let graph = generate_wide_graph(count);
            b.iter(|| black_box(graph.topological_sort().unwrap()));
        });
    }

    group.finish();
}

fn benchmark_deep_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("deep_chain_parallel_groups");

    for depth in [10, 20, 50, 100] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            let graph = generate_deep_graph(depth);
            b.iter(|| black_box(graph.get_parallel_groups().unwrap()));
        });
    }

    group.finish();
}

fn benchmark_diamond_graph(c: &mut Criterion) {
    let mut group = c.benchmark_group("diamond_graph");

    for (width, depth) in [(5, 5), (10, 5), (5, 10), (10, 10)] {
        let label = format!("w{width}_d{depth}");
        group.bench_with_input(
            BenchmarkId::from_parameter(&label),
            &(width, depth),
            |b, &(width, depth)| {
                let graph = generate_diamond_graph(width, depth);
                b.iter(|| black_box(graph.get_parallel_groups().unwrap()));
            },
        );
    }

    group.finish();
}

fn benchmark_edge_inference(c: &mut Criterion) {
    let mut group = c.benchmark_group("edge_inference");

    for count in [100, 500, 1000, 2000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            b.iter(|| black_box(generate_wide_graph(count)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_topological_sort,
    benchmark_deep_chain,
    benchmark_diamond_graph,
    benchmark_edge_inference,
);

criterion_main!(benches);
