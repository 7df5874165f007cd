//! Integration tests for the scanning library


use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use harness::{TestDir, basic_dir, relatives};
use scantree::test_utils::{assert_tree_eq, scan_path_at};
use scantree::{
    CyclicLinkedDir, DirNode, LinkedDir, Node, RecursionFilter, ScanConfig, ScanError, ScanPath,
    Scanner, Tree, scantree,
};

fn scan(test_dir: &TestDir, config: ScanConfig) -> Result<Tree, ScanError> {
    Scanner::new(config).scan(test_dir.path())
}

fn dir(test_dir: &TestDir, relative: &str, files: &[&str], directories: Vec<Tree>) -> Tree {
    Tree(Node::Dir(DirNode::new(
        test_dir.scan_path(relative),
        files.iter().map(|f| test_dir.scan_path(f)).collect(),
        directories,
    )))
}

#[test]
fn test_basic_tree() {
    let test_dir = basic_dir();
    let tree = scantree(test_dir.path()).unwrap();

    let expected = dir(
        &test_dir,
        "",
        &["f1"],
        vec![
            dir(
                &test_dir,
                "d1",
                &["d1/f1"],
                vec![dir(&test_dir, "d1/d11", &["d1/d11/f1"], Vec::new())],
            ),
            dir(&test_dir, "d2", &["d2/f1"], Vec::new()),
        ],
    );
    assert_tree_eq(&tree, &expected);
    assert_eq!(tree, expected);
}

#[test]
fn test_leafpaths_scenario() {
    let test_dir = TestDir::new();
    test_dir.add_file("f1", "");
    test_dir.add_file("d1/f1", "");
    test_dir.add_file("d2/f1", "");

    let tree = scantree(test_dir.path()).unwrap();
    assert_eq!(relatives(&tree.leafpaths()), ["d1/f1", "d2/f1", "f1"]);
    assert_eq!(relatives(&tree.filepaths()), ["d1/f1", "d2/f1", "f1"]);
}

#[test]
fn test_not_a_directory() {
    let test_dir = basic_dir();

    let err = scantree(test_dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, ScanError::NotFound { .. }));
    assert!(err.to_string().contains("No such directory"));

    let err = scantree(test_dir.path().join("f1")).unwrap_err();
    assert!(matches!(err, ScanError::NotADirectory { .. }));
    assert!(err.to_string().contains("Is not a directory"));
}

#[test]
fn test_empty_root() {
    let test_dir = TestDir::new();
    let tree = scantree(test_dir.path()).unwrap();
    assert_eq!(tree.is_empty(), Some(true));
    // an empty root is itself a leaf of the node graph
    assert_eq!(relatives(&tree.leafpaths()), [""]);
    assert!(tree.filepaths().is_empty());
}

#[test]
fn test_include_empty() {
    let test_dir = basic_dir();
    test_dir.add_dir("d3/d31");
    test_dir.add_dir("d4");

    let tree = scantree(test_dir.path()).unwrap();
    let names: Vec<_> = tree
        .as_dir()
        .unwrap()
        .directories
        .iter()
        .map(|d| d.path().relative_str())
        .collect();
    assert_eq!(names, ["d1", "d2"]);

    let tree = scan(
        &test_dir,
        ScanConfig {
            include_empty: true,
            ..ScanConfig::default()
        },
    )
    .unwrap();
    assert_eq!(
        relatives(&tree.leafpaths()),
        ["d1/d11/f1", "d1/f1", "d2/f1", "d3/d31", "d4", "f1"]
    );
    let d3 = &tree.as_dir().unwrap().directories[2];
    assert_eq!(d3.is_empty(), Some(false));
    assert_eq!(d3.as_dir().unwrap().directories[0].is_empty(), Some(true));
}

#[test]
fn test_no_empty_children_by_default() {
    let test_dir = TestDir::new();
    test_dir.add_dir("a/b/c");
    test_dir.add_file("x/f", "");
    test_dir.add_dir("x/empty");

    let tree = scantree(test_dir.path()).unwrap();
    let mut empty_children = 0;
    tree.apply(&mut |_: &ScanPath| (), &mut |node: Node<(), bool>| {
        let dir = node.as_dir().unwrap();
        empty_children += dir.directories.iter().filter(|&&empty| empty).count();
        dir.is_empty()
    });
    assert_eq!(empty_children, 0);
    assert_eq!(relatives(&tree.leafpaths()), ["x/f"]);
}

#[test]
fn test_cyclic_links() {
    let test_dir = TestDir::new();
    test_dir.add_dir("d1");
    test_dir.add_symlink("d1/link_back_d1", "d1");
    test_dir.add_symlink("d1/link_back_root", "");

    let tree = scantree(test_dir.path()).unwrap();
    let expected = Tree(Node::Dir(DirNode::new(
        test_dir.scan_path(""),
        Vec::new(),
        vec![Tree(Node::Dir(DirNode::new(
            test_dir.scan_path("d1"),
            Vec::new(),
            vec![
                Tree(Node::Cyclic(CyclicLinkedDir {
                    path: test_dir.scan_path("d1/link_back_d1"),
                    target_path: test_dir.scan_path("d1"),
                })),
                Tree(Node::Cyclic(CyclicLinkedDir {
                    path: test_dir.scan_path("d1/link_back_root"),
                    target_path: test_dir.scan_path(""),
                })),
            ],
        )))],
    )));
    assert_tree_eq(&tree, &expected);
    assert_eq!(
        relatives(&tree.leafpaths()),
        ["d1/link_back_d1", "d1/link_back_root"]
    );
}

#[test]
fn test_cyclic_links_disallowed() {
    let test_dir = TestDir::new();
    test_dir.add_dir("d1");
    test_dir.add_symlink("d1/link_back_d1", "d1");

    let err = scan(
        &test_dir,
        ScanConfig {
            allow_cyclic_links: false,
            ..ScanConfig::default()
        },
    )
    .unwrap_err();

    let real_d1 = test_dir.scan_path("d1").real().display().to_string();
    let expected = format!(
        "Symlink recursion: Real path '{}' was encountered at '{}' and then '{}'.",
        real_d1,
        test_dir.path().join("d1").display(),
        test_dir.path().join("d1/link_back_d1").display(),
    );
    assert_eq!(err.to_string(), expected);
    assert_eq!(err.kind(), scantree::ErrorKind::Cycle);
}

#[test]
fn test_follow_links() {
    let test_dir = TestDir::new();
    test_dir.add_file("outside/f1", "");
    test_dir.add_file("outside/d/f2", "");
    test_dir.add_file("root/f", "");
    test_dir.add_symlink("root/link", "outside");
    let root = test_dir.path().join("root");

    let tree = scantree(&root).unwrap();
    assert_eq!(
        relatives(&tree.filepaths()),
        ["f", "link/d/f2", "link/f1"]
    );
    let link = &tree.as_dir().unwrap().directories[0];
    assert!(link.path().is_symlink());
    assert!(matches!(link.0, Node::Dir(_)));
    assert_eq!(
        link.path().real(),
        scan_path_at(test_dir.path(), "outside").real()
    );

    let visited = AtomicUsize::new(0);
    let config = ScanConfig {
        follow_links: false,
        ..ScanConfig::default()
    };
    let node = Scanner::new(config)
        .scan_with(
            &root,
            |path| {
                visited.fetch_add(1, Ordering::SeqCst);
                path
            },
            Tree,
        )
        .unwrap();
    assert_eq!(visited.load(Ordering::SeqCst), 1);
    let expected = Tree(Node::Dir(DirNode::new(
        scan_path_at(&root, ""),
        vec![scan_path_at(&root, "f")],
        vec![Tree(Node::Linked(LinkedDir {
            path: scan_path_at(&root, "link"),
        }))],
    )));
    assert_tree_eq(&node, &expected);
    assert_eq!(node.as_dir().unwrap().directories[0].is_empty(), None);
}

#[test]
fn test_symlinked_file_and_dir_filters() {
    let test_dir = TestDir::new();
    test_dir.add_file("root/f1", "");
    test_dir.add_file("target_dir/f2", "");
    test_dir.add_file("target_file", "");
    test_dir.add_symlink("root/linked_dir", "target_dir");
    test_dir.add_symlink("root/linked_file", "target_file");
    let root = test_dir.path().join("root");

    let all = Scanner::default().scan(&root).unwrap();
    assert_eq!(
        relatives(&all.filepaths()),
        ["f1", "linked_dir/f2", "linked_file"]
    );

    let no_dirs = Scanner::default()
        .with_filter(RecursionFilter::new().linked_dirs(false))
        .scan(&root)
        .unwrap();
    assert_eq!(relatives(&no_dirs.leafpaths()), ["f1", "linked_file"]);

    let no_files = Scanner::default()
        .with_filter(RecursionFilter::new().linked_files(false))
        .scan(&root)
        .unwrap();
    assert_eq!(relatives(&no_files.leafpaths()), ["f1", "linked_dir/f2"]);
}

#[test]
fn test_match_patterns() {
    let test_dir = TestDir::new();
    test_dir.add_file("main.rs", "");
    test_dir.add_file("notes.txt", "");
    test_dir.add_file("src/lib.rs", "");
    test_dir.add_file("src/test_lib.rs", "");
    test_dir.add_file("docs/readme.txt", "");

    let filter = RecursionFilter::with_patterns(["*.rs", "!test_*.rs"]).unwrap();
    let tree = Scanner::default()
        .with_filter(filter)
        .scan(test_dir.path())
        .unwrap();
    // docs/ holds nothing that matches and is dropped as empty
    assert_eq!(relatives(&tree.leafpaths()), ["main.rs", "src/lib.rs"]);
}

#[test]
fn test_closure_filter() {
    let test_dir = basic_dir();
    let tree = Scanner::default()
        .with_filter(|path: &ScanPath| !path.relative().starts_with("d1"))
        .scan(test_dir.path())
        .unwrap();
    assert_eq!(relatives(&tree.filepaths()), ["d2/f1", "f1"]);
}

#[test]
fn test_apply_idempotent() {
    let test_dir = basic_dir();
    test_dir.add_symlink("d2/back", "");
    let tree = scantree(test_dir.path()).unwrap();

    let copy: Tree = tree.apply(&mut ScanPath::clone, &mut Tree);
    assert_tree_eq(&copy, &tree);
    assert_eq!(copy, tree);
}

#[test]
fn test_fold_during_scan() {
    let test_dir = basic_dir();
    let total: u64 = Scanner::default()
        .scan_with(
            test_dir.path(),
            |path| path.stat().map(|m| m.len()).unwrap_or(0),
            |node: Node<u64, u64>| {
                node.as_dir().map_or(0, |dir| {
                    dir.files.iter().sum::<u64>() + dir.directories.iter().sum::<u64>()
                })
            },
        )
        .unwrap();
    assert_eq!(total, 4 * "file1".len() as u64);
}

fn linked_files_dir(links: usize) -> TestDir {
    let test_dir = TestDir::new();
    test_dir.add_file("target", "");
    for i in 0..links {
        test_dir.add_symlink(&format!("link_{i}"), "target");
    }
    test_dir
}

fn count_transform_calls(test_dir: &TestDir, config: ScanConfig) -> usize {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let tree = Scanner::new(config)
        .scan_with(
            test_dir.path(),
            move |path| {
                counter.fetch_add(1, Ordering::SeqCst);
                path.relative_str()
            },
            Tree,
        )
        .unwrap();
    // every link still shows up in the tree, cached or not
    assert_eq!(tree.as_dir().unwrap().files.len(), 4);
    calls.load(Ordering::SeqCst)
}

#[test]
fn test_cache_file_transform() {
    let test_dir = linked_files_dir(3);

    assert_eq!(count_transform_calls(&test_dir, ScanConfig::default()), 4);
    let cached = ScanConfig {
        cache_file_transform: true,
        ..ScanConfig::default()
    };
    assert_eq!(count_transform_calls(&test_dir, cached), 1);
}

#[test]
fn test_cache_file_transform_parallel() {
    let test_dir = linked_files_dir(3);

    let parallel = ScanConfig {
        jobs: 2,
        ..ScanConfig::default()
    };
    assert_eq!(count_transform_calls(&test_dir, parallel.clone()), 4);
    let cached = ScanConfig {
        cache_file_transform: true,
        ..parallel
    };
    assert_eq!(count_transform_calls(&test_dir, cached), 1);
}

#[test]
fn test_parallel_matches_sequential() {
    let test_dir = basic_dir();
    test_dir.add_symlink("d2/link_d1", "d1");
    test_dir.add_symlink("d1/d11/back", "d1");

    let sequential = scantree(test_dir.path()).unwrap();
    for jobs in [0, 2, 4] {
        let parallel = scan(
            &test_dir,
            ScanConfig {
                jobs,
                ..ScanConfig::default()
            },
        )
        .unwrap();
        assert_tree_eq(&parallel, &sequential);
    }
}

#[test]
fn test_parallel_transform_results() {
    let test_dir = basic_dir();
    let names = |jobs| {
        Scanner::new(ScanConfig {
            jobs,
            ..ScanConfig::default()
        })
        .scan_with(test_dir.path(), |path| path.relative_str(), Tree)
        .unwrap()
    };

    let sequential: Tree<String> = names(1);
    let parallel: Tree<String> = names(3);
    assert_eq!(parallel, sequential);
}
