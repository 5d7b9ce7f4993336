//! Example: optimal binary search tree for the CLRS keys.
//!
//! Run with:
//! `cargo run --example obst_demo`

use obst_dp::dot::{to_dot, DotStyle};
use obst_dp::{KeySet, ObstEngine, ObstSession};

fn main() -> obst_dp::Result<()> {
    // CLRS 15.5: five keys with success and gap probabilities.
    let labels = ["k1", "k2", "k3", "k4", "k5"];
    let p = [0.0, 0.15, 0.10, 0.05, 0.10, 0.20];
    let q = [0.05, 0.10, 0.05, 0.05, 0.05, 0.10];

    let (tables, tree) = ObstEngine::new().run_with_tables(&p, &q, &labels)?;
    println!("Expected search cost: {:.4}", tables.optimal_cost());
    print!("{}", tree.render_sideways());
    println!("{}", tree.stats());
    print!("{}", tables.render());

    // Editing needs a key set without gap probabilities.
    let mut session = ObstSession::new();
    session.build(KeySet::new(
        vec!["10", "20", "30"],
        vec![0.2, 0.5, 0.3],
        None,
    )?)?;
    session.insert("25", 0.9)?;
    session.delete("10")?;
    println!("After edits:");
    print!("{}", session.tree().render_sideways());
    print!("{}", to_dot(session.tree(), &DotStyle::default()));
    Ok(())
}
