#![no_main]

use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use permtree_core::{FlagKind, Hierarchy, Node, PermissionEngine};

#[derive(Debug, Arbitrary)]
struct Input {
    /// Parent selector per node; 0 makes a root.
    shape: Vec<u8>,
    ops: Vec<(u8, bool, bool)>,
    search: String,
}

fuzz_target!(|input: Input| {
    let count = input.shape.len().clamp(1, 64);
    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut roots = Vec::new();
    for i in 0..count {
        let selector = input.shape.get(i).copied().unwrap_or(0) as usize;
        if i == 0 || selector == 0 {
            roots.push(i);
        } else {
            children[selector % i].push(i);
        }
    }

    fn build(i: usize, children: &[Vec<usize>]) -> Node {
        Node::new(format!("n{i}"), format!("Node {i}"))
            .with_children(children[i].iter().map(|&c| build(c, children)).collect())
    }
    let hierarchy = Arc::new(
        Hierarchy::new(roots.into_iter().map(|r| build(r, &children)).collect())
            .expect("generated ids are unique"),
    );

    // Filtering must not panic on arbitrary terms.
    let filtered = hierarchy.filter(&input.search);
    assert!(filtered.expanded.iter().all(|id| hierarchy.contains(id)));

    let mut engine = PermissionEngine::new(Arc::clone(&hierarchy));
    for &(node, write, value) in input.ops.iter().take(256) {
        let id = format!("n{}", node as usize % count);
        let kind = if write { FlagKind::Write } else { FlagKind::Read };
        let report = engine.set_flag(&id, kind, value).expect("generated id exists");
        assert_eq!(Some(report.ancestors_updated), hierarchy.depth_of(&id));

        let violations = engine.check_invariants();
        assert!(violations.is_empty(), "after {id} {kind}={value}: {violations:?}");
    }

    // Flatten then reload keeps every flag's checked bit.
    let flat = engine.flatten();
    let mut reloaded = PermissionEngine::new(Arc::clone(&hierarchy));
    reloaded.load_initial(&flat);
    assert_eq!(reloaded.flatten(), flat);
});
