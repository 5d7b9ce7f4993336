use obst_dp::utils::approx_eq;
use obst_dp::{ObstEngine, RootSearch};
use proptest::prelude::*;

fn labels(n: usize) -> Vec<String> {
    (0..n).map(|k| format!("k{k:03}")).collect()
}

/// `(p, q)` for `n` keys; `p[0] = 0`.
fn instance(max_n: usize) -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (0usize..=max_n).prop_flat_map(|n| {
        (
            prop::collection::vec(0.0f64..1.0, n),
            prop::collection::vec(0.0f64..1.0, n + 1),
        )
            .prop_map(|(p, q)| {
                let mut with_sentinel = vec![0.0];
                with_sentinel.extend(p);
                (with_sentinel, q)
            })
    })
}

#[test]
fn concrete_three_key_scenario() {
    let labels = ["A", "B", "C"];
    let p = [0.0, 0.3, 0.1, 0.1];
    let q = [0.1, 0.1, 0.1, 0.2];
    let (tables, tree) = ObstEngine::new().run_with_tables(&p, &q, &labels).unwrap();
    let top = tables.top_root().unwrap();
    assert_eq!(labels[top], "B");
    assert_eq!(tree.root().unwrap().label, "B");
    assert_eq!(tree.in_order(), vec!["A", "B", "C"]);
    assert!(approx_eq(tables.optimal_cost(), 1.9));
}

#[test]
fn zero_keys_give_empty_tree() {
    let empty: [&str; 0] = [];
    let (tables, tree) = ObstEngine::new()
        .run_with_tables(&[0.0], &[0.0], &empty)
        .unwrap();
    assert!(tables.is_empty());
    assert!(tree.is_empty());
    assert_eq!(tables.root(1, 0), None);

    let tables = ObstEngine::new().build_tables(&[0.0], &[0.35]).unwrap();
    assert!(approx_eq(tables.optimal_cost(), 0.35));
    assert!(approx_eq(tables.optimal_cost(), tables.total_weight()));
}

#[test]
fn single_key_tree() {
    let (tables, tree) = ObstEngine::new()
        .run_with_tables(&[0.0, 0.6], &[0.15, 0.25], &["only"])
        .unwrap();
    assert_eq!(tree.node_count(), 1);
    assert_eq!(tree.root().unwrap().label, "only");
    assert!(approx_eq(tables.cost(1, 1).unwrap(), 0.15 + 0.6 + 0.25));
    assert!(approx_eq(tables.optimal_cost(), tables.total_weight()));
}

#[test]
fn skewed_probabilities_produce_chain() {
    // Strictly decreasing weights pull each range's root to its left end.
    let p = [0.0, 0.5, 0.25, 0.125, 0.0625];
    let q = [0.0; 5];
    let (_, tree) = ObstEngine::new()
        .run(&p, &q, &["a", "b", "c", "d"])
        .unwrap();
    assert_eq!(tree.root().unwrap().label, "a");
    assert_eq!(tree.height(), 4);
    assert_eq!(tree.leaf_count(), 1);
}

proptest! {
    #[test]
    fn in_order_is_label_order((p, q) in instance(14)) {
        let n = p.len() - 1;
        let labels = labels(n);
        let (_, tree) = ObstEngine::new().run(&p, &q, &labels).unwrap();
        let expected: Vec<&str> = labels.iter().map(String::as_str).collect();
        prop_assert_eq!(tree.in_order(), expected);
    }

    #[test]
    fn cost_dominates_weight((p, q) in instance(14)) {
        let tables = ObstEngine::new().build_tables(&p, &q).unwrap();
        let n = tables.n();
        if n >= 1 {
            let (e, w) = (tables.optimal_cost(), tables.total_weight());
            prop_assert!(e >= w - 1e-9, "E={e} < W={w}");
            if n == 1 {
                prop_assert!(approx_eq(e, w));
            }
        }
    }

    #[test]
    fn rebuilding_is_idempotent((p, q) in instance(12)) {
        let labels = labels(p.len() - 1);
        let engine = ObstEngine::new();
        let (t1, tree1) = engine.run_with_tables(&p, &q, &labels).unwrap();
        let (t2, tree2) = engine.run_with_tables(&p, &q, &labels).unwrap();
        prop_assert_eq!(t1.root_table(), t2.root_table());
        prop_assert!(approx_eq(t1.optimal_cost(), t2.optimal_cost()));
        prop_assert_eq!(tree1, tree2);
    }

    #[test]
    fn roots_are_monotone((p, q) in instance(14)) {
        let tables = ObstEngine::new().build_tables(&p, &q).unwrap();
        let n = tables.n();
        for i in 1..=n {
            for j in i..=n {
                let r = tables.root(i, j);
                prop_assert!(r.is_some(), "Root[{i}][{j}] unset");
                let r = r.unwrap();
                prop_assert!((i..=j).contains(&r));
                if j > i {
                    prop_assert!(tables.root(i, j - 1).unwrap() <= r);
                    prop_assert!(r <= tables.root(i + 1, j).unwrap());
                }
            }
        }
    }

    #[test]
    fn tree_cost_matches_table((p, q) in instance(14)) {
        let labels = labels(p.len() - 1);
        for search in [RootSearch::Knuth, RootSearch::Full] {
            let (cost, tree) = ObstEngine::with_root_search(search)
                .run(&p, &q, &labels)
                .unwrap();
            if labels.is_empty() {
                prop_assert!(tree.is_empty());
                continue;
            }
            let measured = tree.expected_cost(&p, &q).unwrap();
            prop_assert!(approx_eq(measured, cost), "tree={measured} table={cost}");
        }
    }

    #[test]
    fn bounded_search_never_beats_exhaustive((p, q) in instance(12)) {
        let knuth = ObstEngine::new().build_tables(&p, &q).unwrap();
        let full = ObstEngine::with_root_search(RootSearch::Full)
            .build_tables(&p, &q)
            .unwrap();
        prop_assert!(knuth.optimal_cost() >= full.optimal_cost() - 1e-9);
    }
}
