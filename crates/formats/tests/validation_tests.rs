//! Validation of large generated workflows.

use mosaicflow_core::{File, ResolvedWorkflow, Task, Workflow, WorkflowBuilder};
use mosaicflow_formats::{Violation, validate_workflow};

/// `t000000 -> t000001 -> ...`, each task reading the previous task's output.
fn chain(len: usize) -> Workflow {
    let mut builder = WorkflowBuilder::new("deep");
    builder.add_file(File::remote("f0", "https://example.org/f0.fits"));
    for i in 0..len {
        builder.add_file(File::local(format!("f{}", i + 1)));
        builder
            .add_task(
                Task::new(format!("t{i:06}"), "mProject")
                    .input(format!("f{i}"))
                    .output(format!("f{}", i + 1)),
            )
            .unwrap();
    }
    builder.build()
}

#[test]
fn test_deep_chain_validates() {
    let workflow = chain(100_000);
    let report = validate_workflow(&workflow);
    assert!(report.is_valid(), "{:?}", report.errors.first());
    assert_eq!(report.tasks, 100_000);
    assert!(report.warnings.is_empty());

    let resolved = ResolvedWorkflow::resolve(workflow).unwrap();
    assert_eq!(resolved.dag().order().len(), 100_000);
}

#[test]
fn test_cycle_members_are_reported() {
    let mut builder = WorkflowBuilder::new("looped");
    builder.add_file(File::local("a"));
    builder.add_file(File::local("b"));
    builder.add_file(File::local("c"));
    builder
        .add_task(Task::new("head", "mAdd").input("c").output("a"))
        .unwrap();
    builder
        .add_task(Task::new("middle", "mAdd").input("a").output("b"))
        .unwrap();
    builder
        .add_task(Task::new("tail", "mAdd").input("b").output("c"))
        .unwrap();

    let report = validate_workflow(&builder.build());
    assert_eq!(
        report.errors,
        vec![Violation::Cycle {
            tasks: vec!["head".to_string(), "middle".to_string(), "tail".to_string()],
        }]
    );
}
