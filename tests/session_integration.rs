use obst_dp::traits::Lexicographic;
use obst_dp::utils::approx_eq;
use obst_dp::{KeySet, ObstEngine, ObstEngineBuilder, ObstError, ObstSession, RootSearch, SessionState};

fn fresh_tree_labels(keys: &KeySet) -> Vec<String> {
    let (_, tree) = ObstEngine::new()
        .run(&keys.p_with_sentinel(), keys.q(), keys.labels())
        .unwrap();
    tree.in_order().into_iter().map(str::to_string).collect()
}

#[test]
fn edits_rebuild_from_scratch() {
    let mut session = ObstSession::new();
    let keys = KeySet::new(vec!["30", "10", "20"], vec![0.3, 0.2, 0.5], None).unwrap();
    session.build(keys).unwrap();
    assert_eq!(session.tree().root().unwrap().label, "20");

    session.insert("25", 0.9).unwrap();
    assert_eq!(session.keys().labels(), &["10", "20", "25", "30"]);
    assert_eq!(session.tree().in_order(), vec!["10", "20", "25", "30"]);
    assert_eq!(session.tree().root().unwrap().label, "25");

    // The incremental result equals a fresh build over the same keys.
    let fresh = ObstEngine::new()
        .run(
            &session.keys().p_with_sentinel(),
            session.keys().q(),
            session.keys().labels(),
        )
        .unwrap()
        .1;
    assert_eq!(session.tree(), &fresh);

    session.delete("25").unwrap();
    assert_eq!(session.tree().root().unwrap().label, "20");
    assert_eq!(session.state(), SessionState::Built);
}

#[test]
fn deleting_unknown_label_changes_nothing() {
    let mut session = ObstSession::new();
    session
        .build(KeySet::new(vec!["a", "b", "c"], vec![0.2, 0.5, 0.3], None).unwrap())
        .unwrap();
    let keys_before = session.keys().clone();
    let tree_before = session.tree().clone();

    let err = session.delete("zz").unwrap_err();
    assert!(matches!(err, ObstError::LabelNotFound(ref l) if l == "zz"));
    assert_eq!(session.keys(), &keys_before);
    assert_eq!(session.tree(), &tree_before);
}

#[test]
fn gap_probabilities_lock_the_key_set() {
    let mut session = ObstSession::new();
    let keys = KeySet::new(
        vec!["A", "B", "C"],
        vec![0.3, 0.1, 0.1],
        Some(vec![0.1, 0.1, 0.1, 0.2]),
    )
    .unwrap();
    session.build(keys).unwrap();
    let tree_before = session.tree().clone();

    assert!(matches!(
        session.insert("D", 0.1),
        Err(ObstError::DummyProbabilitiesInUse)
    ));
    assert!(matches!(
        session.delete("A"),
        Err(ObstError::DummyProbabilitiesInUse)
    ));
    assert_eq!(session.tree(), &tree_before);
    assert_eq!(session.keys().len(), 3);
    assert!(approx_eq(session.expected_cost().unwrap(), 1.9));
}

#[test]
fn duplicate_insert_is_rejected_without_side_effects() {
    let mut session = ObstSession::new();
    session.insert("7", 0.5).unwrap();
    session.insert("12", 0.5).unwrap();
    let before = session.tree().clone();
    assert!(matches!(
        session.insert("12", 0.1),
        Err(ObstError::DuplicateLabel(_))
    ));
    assert!(matches!(
        session.insert("x", -1.0),
        Err(ObstError::InvalidProbability { .. })
    ));
    assert_eq!(session.tree(), &before);
    assert_eq!(session.keys().labels(), &["7", "12"]);
}

#[test]
fn growing_one_key_at_a_time_matches_fresh_builds() {
    let mut session = ObstSession::new();
    let inserts = [("50", 0.1), ("8", 0.4), ("120", 0.05), ("33", 0.2), ("9", 0.25)];
    for (label, p) in inserts {
        session.insert(label, p).unwrap();
        assert_eq!(
            session.tree().in_order(),
            fresh_tree_labels(session.keys())
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
        );
        let tables = session.tables().unwrap();
        assert!(approx_eq(
            session.expected_cost().unwrap(),
            tables.optimal_cost()
        ));
    }
    assert_eq!(session.keys().labels(), &["8", "9", "33", "50", "120"]);
}

#[test]
fn reset_returns_to_empty() {
    let mut session = ObstSession::new();
    session.insert("a", 1.0).unwrap();
    session.reset();
    assert_eq!(session.state(), SessionState::Empty);
    assert!(session.keys().is_empty());
    assert!(matches!(session.delete("a"), Err(ObstError::EmptyTree)));
    assert!(matches!(session.tables(), Err(ObstError::EmptyTree)));
}

#[test]
fn custom_engine_and_order_are_honoured() {
    let engine = ObstEngineBuilder::new()
        .with_root_search(RootSearch::Full)
        .build();
    let mut session = ObstSession::with_engine(engine, Lexicographic);
    session.insert("9", 0.5).unwrap();
    session.insert("10", 0.5).unwrap();
    assert_eq!(session.engine().root_search(), RootSearch::Full);
    assert_eq!(session.tree().in_order(), vec!["10", "9"]);
}
