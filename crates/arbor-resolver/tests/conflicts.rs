mod common;

use arbor_core::config::{ResolverSettings, TieBreak};
use arbor_core::dependency::{Exclusion, ManagedDependency, Scope};
use arbor_resolver::CollectRequest;
use common::{child_names, dep, root, run, run_with, MemoryRepository};

fn diamond() -> MemoryRepository {
    MemoryRepository::new()
        .artifact("org.test:a:1.0", vec![dep("org.test:c:1.0")])
        .artifact("org.test:b:1.0", vec![dep("org.test:c:2.0")])
        .artifact("org.test:c:1.0", vec![])
        .artifact("org.test:c:2.0", vec![])
}

fn diamond_request() -> CollectRequest {
    CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:a:1.0"), dep("org.test:b:1.0")],
        vec![],
    )
}

#[test]
fn test_nearest_wins_over_higher_version() {
    let repo = MemoryRepository::new()
        .artifact("org.test:a:1.0", vec![dep("org.test:c:2.0")])
        .artifact("org.test:c:1.0", vec![])
        .artifact("org.test:c:2.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:a:1.0"), dep("org.test:c:1.0")],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    assert_eq!(child_names(&result.root), vec!["a", "c"]);
    assert!(result.root.children[0].children.is_empty());
    assert_eq!(result.root.find("c").unwrap().coordinate.version, "1.0");

    assert_eq!(result.conflicts.len(), 1);
    let conflict = &result.conflicts.conflicts[0];
    assert_eq!(conflict.requested, "2.0");
    assert_eq!(conflict.resolved, "1.0");
    assert_eq!(conflict.reason, "nearest wins (depth 1 vs 2)");
}

#[test]
fn test_first_declared_wins_at_equal_depth() {
    let result = run(&diamond(), &diamond_request()).unwrap();
    let tree = &result.root;

    assert_eq!(child_names(&tree.children[0]), vec!["c"]);
    assert!(tree.children[1].children.is_empty());
    assert_eq!(tree.find("c").unwrap().coordinate.version, "1.0");
    assert_eq!(result.conflicts.conflicts[0].reason, "first declared wins (depth 2)");
}

#[test]
fn test_highest_version_tie_break() {
    let settings = ResolverSettings {
        tie_break: TieBreak::HighestVersion,
        ..ResolverSettings::default()
    };
    let result = run_with(&diamond(), &diamond_request(), settings).unwrap();
    let tree = &result.root;

    assert!(tree.children[0].children.is_empty());
    assert_eq!(child_names(&tree.children[1]), vec!["c"]);
    assert_eq!(tree.find("c").unwrap().coordinate.version, "2.0");
}

#[test]
fn test_same_version_is_not_a_conflict() {
    let repo = MemoryRepository::new()
        .artifact("org.test:a:1.0", vec![dep("org.test:c:1.0")])
        .artifact("org.test:b:1.0", vec![dep("org.test:c:1.0")])
        .artifact("org.test:c:1.0", vec![]);

    let result = run(&repo, &diamond_request()).unwrap();
    assert!(result.conflicts.is_empty());
    assert_eq!(result.root.iter().filter(|n| n.coordinate.artifact == "c").count(), 1);
    // c is read once even though it is reached twice
    assert_eq!(repo.reads(), 3);
}

#[test]
fn test_classifier_makes_a_separate_key() {
    let repo = MemoryRepository::new().artifact("org.test:c:1.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![
            dep("org.test:c:1.0"),
            dep("org.test:c:1.0").with_type("test-jar"),
        ],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    assert_eq!(result.root.children.len(), 2);
    assert_eq!(result.root.children[1].coordinate.classifier, "tests");
    assert_eq!(result.root.children[1].coordinate.extension, "jar");
}

#[test]
fn test_runtime_parent_demotes_compile_child() {
    let repo = MemoryRepository::new()
        .artifact("org.test:r:1.0", vec![dep("org.test:c:1.0")])
        .artifact("org.test:c:1.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:r:1.0").with_scope(Scope::Runtime)],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    assert_eq!(result.root.find("c").unwrap().scope, Scope::Runtime);
}

#[test]
fn test_runtime_parent_overrides_provided_and_system_children() {
    let repo = MemoryRepository::new()
        .artifact(
            "org.test:r:1.0",
            vec![
                dep("org.test:p:1.0").with_scope(Scope::Provided),
                dep("org.test:s:1.0").with_scope(Scope::System),
                dep("org.test:t:1.0").with_scope(Scope::Test),
            ],
        )
        .artifact("org.test:p:1.0", vec![])
        .artifact("org.test:s:1.0", vec![])
        .artifact("org.test:t:1.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:r:1.0").with_scope(Scope::Runtime)],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    assert_eq!(result.root.find("p").unwrap().scope, Scope::Runtime);
    assert_eq!(result.root.find("s").unwrap().scope, Scope::Runtime);
    assert_eq!(result.root.find("t").unwrap().scope, Scope::Test);
}

#[test]
fn test_test_scope_sticks_to_children() {
    let repo = MemoryRepository::new()
        .artifact("org.test:t:1.0", vec![dep("org.test:c:1.0").with_scope(Scope::Runtime)])
        .artifact("org.test:c:1.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:t:1.0").with_scope(Scope::Test)],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    assert_eq!(result.root.find("c").unwrap().scope, Scope::Test);
}

#[test]
fn test_provided_dependencies_keep_no_children() {
    let repo = MemoryRepository::new()
        .artifact("org.test:p:1.0", vec![dep("org.test:x:1.0")])
        .artifact("org.test:x:1.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:p:1.0").with_scope(Scope::Provided)],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    let p = &result.root.children[0];
    assert_eq!(p.scope, Scope::Provided);
    assert!(p.children.is_empty());
}

#[test]
fn test_provided_children_are_never_read() {
    let repo = MemoryRepository::new().artifact("org.test:p:1.0", vec![dep("org.test:gone:1.0")]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:p:1.0").with_scope(Scope::Provided)],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert!(result.is_complete());
    assert_eq!(repo.reads(), 1);
}

#[test]
fn test_optional_only_when_every_path_is_optional() {
    let repo = MemoryRepository::new()
        .artifact("org.test:o:1.0", vec![dep("org.test:c:1.0")])
        .artifact("org.test:a:1.0", vec![dep("org.test:c:1.0")])
        .artifact("org.test:c:1.0", vec![]);
    let settings = || ResolverSettings {
        include_optional: true,
        ..ResolverSettings::default()
    };

    // c under o wins, but it is also reachable without an optional edge
    let mixed = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:o:1.0").with_optional(true), dep("org.test:a:1.0")],
        vec![],
    );
    let result = run_with(&repo, &mixed, settings()).unwrap();
    assert_eq!(child_names(&result.root.children[0]), vec!["c"]);
    assert!(result.root.children[0].optional);
    assert!(!result.root.find("c").unwrap().optional);

    let only_optional = CollectRequest::from_descriptor(
        root(),
        vec![
            dep("org.test:o:1.0").with_optional(true),
            dep("org.test:a:1.0").with_optional(true),
        ],
        vec![],
    );
    let result = run_with(&repo, &only_optional, settings()).unwrap();
    assert!(result.root.find("c").unwrap().optional);
}

#[test]
fn test_deep_test_dependencies_are_dropped() {
    let repo = MemoryRepository::new()
        .artifact("org.test:a:1.0", vec![dep("org.test:b:1.0")])
        .artifact(
            "org.test:b:1.0",
            vec![dep("junit:junit:4.13").with_scope(Scope::Test)],
        )
        .artifact("junit:junit:4.13", vec![]);
    let request = CollectRequest::from_descriptor(root(), vec![dep("org.test:a:1.0")], vec![]);

    let result = run(&repo, &request).unwrap();
    assert!(result.root.find("junit").is_none());
    assert!(result.root.find("b").is_some());
}

#[test]
fn test_exclusions_cut_whole_subtrees() {
    let repo = MemoryRepository::new()
        .artifact("org.test:a:1.0", vec![dep("org.test:b:1.0")])
        .artifact("org.test:b:1.0", vec![dep("org.log:log:1.0")])
        .artifact("org.log:log:1.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:a:1.0").with_exclusion(Exclusion::new("org.log", "*"))],
        vec![],
    );

    let result = run(&repo, &request).unwrap();
    assert!(result.root.find("b").is_some());
    assert!(result.root.find("log").is_none());
}

#[test]
fn test_direct_version_beats_management() {
    let repo = MemoryRepository::new()
        .artifact("org.test:a:1.0", vec![])
        .artifact("org.test:a:2.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:a:1.0")],
        vec![ManagedDependency::new("org.test", "a").with_version("2.0")],
    );

    let result = run(&repo, &request).unwrap();
    let a = &result.root.children[0];
    assert_eq!(a.coordinate.version, "1.0");
    assert_eq!(a.premanaged_version, None);
}

#[test]
fn test_nested_management_overrides_inherited() {
    let repo = MemoryRepository::new()
        .with_managed(
            "org.test:a:1.0",
            vec![dep("org.test:b:1.0")],
            vec![ManagedDependency::new("org.test", "c").with_version("3.0")],
        )
        .artifact("org.test:b:1.0", vec![dep("org.test:c:1.0")])
        .artifact("org.test:c:1.0", vec![])
        .artifact("org.test:c:2.0", vec![])
        .artifact("org.test:c:3.0", vec![]);
    let request = CollectRequest::from_descriptor(
        root(),
        vec![dep("org.test:a:1.0")],
        vec![ManagedDependency::new("org.test", "c").with_version("2.0")],
    );

    let result = run(&repo, &request).unwrap();
    let c = result.root.find("c").unwrap();
    assert_eq!(c.coordinate.version, "3.0");
    assert_eq!(c.premanaged_version.as_deref(), Some("1.0"));
}

#[test]
fn test_path_to_dependency() {
    let result = run(&diamond(), &diamond_request()).unwrap();
    let path = result.root.find_path("org.test:c").unwrap();
    let names: Vec<&str> = path.iter().map(|n| n.coordinate.artifact.as_str()).collect();
    assert_eq!(names, vec!["app", "a", "c"]);
}
