use std::collections::BTreeMap;
use std::env;
use std::time::Instant;

use obst_dp::utils::approx_eq;
use obst_dp::{ObstEngine, ObstTables, RootSearch, Tree};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("scale_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    eprintln!("\n{}", "=".repeat(80));
    eprintln!("OBST Scaling Probe: Performance and Correctness Testing");
    eprintln!("{}", "=".repeat(80));
    eprintln!();
    eprintln!("Builds optimal binary search trees of increasing size and checks:");
    eprintln!("  • Correctness: bounded root search agrees with exhaustive search (up to n = {})", options.verify_limit);
    eprintln!("  • Consistency: reconstructed tree cost equals E[1][n], in-order is sorted, roots are monotone (bounded search)");
    eprintln!("  • Cost: wall-clock time and resident memory as n grows (tables are O(n²))");
    eprintln!();
    eprintln!("{}", "=".repeat(80));
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/3] Knuth-bounded search, no gap probabilities...");
    measurements.extend(run_scenario(
        "knuth_no_gaps",
        &[16, 64, 256, 512, 1024, 2048],
        &options,
        &mut sys,
        |n| (success_weights(n), vec![0.0; n + 1]),
        RootSearch::Knuth,
        true,
    ));
    eprintln!();

    eprintln!("[2/3] Knuth-bounded search with gap probabilities...");
    measurements.extend(run_scenario(
        "knuth_with_gaps",
        &[16, 64, 256, 512, 1024, 2048],
        &options,
        &mut sys,
        |n| (success_weights(n), gap_weights(n)),
        RootSearch::Knuth,
        false,
    ));
    eprintln!();

    eprintln!("[3/3] Exhaustive root search (cubic reference)...");
    measurements.extend(run_scenario(
        "full_search",
        &[16, 64, 128, 256, 512],
        &options,
        &mut sys,
        |n| (success_weights(n), gap_weights(n)),
        RootSearch::Full,
        false,
    ));
    eprintln!();

    print_summary(&measurements, &options);

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("scale_probe output error: {err}");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 256usize;

        while let Some(arg) = args.next() {
            let arg: String = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value: String = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = parse_limit(value)?;
            } else if arg == "--verify-limit" {
                let value: String = args
                    .next()
                    .ok_or_else(|| "missing value after --verify-limit".to_string())?
                    .into();
                verify_limit = parse_limit(&value)?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self {
            format,
            verify_limit,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --release --bin scale_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Largest key count cross-checked against exhaustive search (default: 256)
  -h, --help                    Print this help message

Examples:
  cargo run --release --bin scale_probe
  cargo run --release --bin scale_probe -- --format table --verify-limit 128
"
        );
    }
}

fn parse_limit(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| "verify limit must be a positive integer".to_string())
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

#[derive(Clone)]
struct Measurement {
    scenario: &'static str,
    size_desc: String,
    wall_s: f64,
    rss_delta_kib: u64,
    verification_status: VerificationStatus,
    verification_detail: Option<String>,
}

#[derive(Clone, Copy)]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            VerificationStatus::Passed => "✓",
            VerificationStatus::Failed => "✗",
            VerificationStatus::NotChecked => "○",
        }
    }
}

/// Build and check one tree per size.
///
/// `compare_full` cross-checks the optimal cost against exhaustive search;
/// only meaningful without gap probabilities, where both searches agree.
fn run_scenario<F>(
    scenario: &'static str,
    sizes: &[usize],
    options: &Options,
    sys: &mut System,
    inputs: F,
    search: RootSearch,
    compare_full: bool,
) -> Vec<Measurement>
where
    F: Fn(usize) -> (Vec<f64>, Vec<f64>),
{
    let engine = ObstEngine::with_root_search(search);
    let total = sizes.len();
    sizes
        .iter()
        .enumerate()
        .map(|(idx, &n)| {
            eprint!("      [{}/{}] Testing n = {}... ", idx + 1, total, n);
            let mut cost_result = 0.0f64;
            let mut height_result = 0usize;
            let m = measure(scenario, format!("n={n}"), sys, || {
                let (p, q) = inputs(n);
                let labels = numeric_labels(n);
                let (tables, tree) = match engine.run_with_tables(&p, &q, &labels) {
                    Ok(built) => built,
                    Err(err) => return (VerificationStatus::Failed, Some(err.to_string())),
                };
                cost_result = tables.optimal_cost();
                height_result = tree.height();

                if n > options.verify_limit {
                    return (VerificationStatus::NotChecked, None);
                }
                match verify(&tables, &tree, &p, &q, &labels, search, compare_full) {
                    Ok(()) => (VerificationStatus::Passed, None),
                    Err(detail) => (VerificationStatus::Failed, Some(detail)),
                }
            });
            eprintln!(
                "{} cost={:.6}, height={}, time={:.3}s, status={}",
                m.verification_status.icon(),
                cost_result,
                height_result,
                m.wall_s,
                m.verification_status.label()
            );
            m
        })
        .collect()
}

fn verify(
    tables: &ObstTables,
    tree: &Tree,
    p: &[f64],
    q: &[f64],
    labels: &[String],
    search: RootSearch,
    compare_full: bool,
) -> Result<(), String> {
    let n = tables.n();
    if tree.in_order() != labels.iter().map(String::as_str).collect::<Vec<_>>() {
        return Err("in-order traversal differs from label order".to_string());
    }
    let tree_cost = tree.expected_cost(p, q).map_err(|e| e.to_string())?;
    if !approx_eq(tree_cost, tables.optimal_cost()) {
        return Err(format!(
            "tree cost {tree_cost:.9} != E[1][n] {:.9}",
            tables.optimal_cost()
        ));
    }
    // Exhaustive search may pick non-monotone roots once gaps are modelled.
    let check_monotone = search == RootSearch::Knuth;
    for i in 1..=n {
        for j in i + 1..=n {
            if check_monotone && tables.root(i, j) < tables.root(i, j - 1) {
                return Err(format!("Root[{i}][{j}] decreased as j grew"));
            }
        }
    }
    if compare_full {
        let baseline = ObstEngine::with_root_search(RootSearch::Full)
            .build_tables(p, q)
            .map_err(|e| e.to_string())?;
        if !approx_eq(baseline.optimal_cost(), tables.optimal_cost()) {
            return Err(format!(
                "expected {:.9}, got {:.9}",
                baseline.optimal_cost(),
                tables.optimal_cost()
            ));
        }
    }
    Ok(())
}

fn print_summary(measurements: &[Measurement], options: &Options) {
    eprintln!("\n{}", "=".repeat(80));
    eprintln!("Test Summary");
    eprintln!("{}", "=".repeat(80));
    eprintln!();

    let mut passed = 0;
    let mut failed = 0;
    let mut not_checked = 0;
    for m in measurements {
        match m.verification_status {
            VerificationStatus::Passed => passed += 1,
            VerificationStatus::Failed => failed += 1,
            VerificationStatus::NotChecked => not_checked += 1,
        }
    }

    let total = measurements.len().max(1) as f64;
    eprintln!("Verification Results:");
    eprintln!("  Total tests: {}", measurements.len());
    eprintln!("  ✓ Passed: {} ({:.1}%)", passed, 100.0 * passed as f64 / total);
    eprintln!("  ✗ Failed: {} ({:.1}%)", failed, 100.0 * failed as f64 / total);
    eprintln!(
        "  ○ Not checked (n > {}): {} ({:.1}%)",
        options.verify_limit,
        not_checked,
        100.0 * not_checked as f64 / total
    );
    eprintln!();

    if failed > 0 {
        eprintln!("Failed Tests:");
        for m in measurements {
            if matches!(m.verification_status, VerificationStatus::Failed) {
                eprintln!("  ✗ {} ({})", m.scenario, m.size_desc);
                if let Some(ref detail) = m.verification_detail {
                    eprintln!("     Error: {detail}");
                }
            }
        }
        eprintln!();
    }

    eprintln!("Performance Statistics by Scenario:");
    eprintln!();
    let mut by_scenario: BTreeMap<&str, Vec<&Measurement>> = BTreeMap::new();
    for m in measurements {
        by_scenario.entry(m.scenario).or_default().push(m);
    }
    for (scenario, ms) in &by_scenario {
        let min_time = ms.iter().map(|m| m.wall_s).fold(f64::INFINITY, f64::min);
        let max_time = ms.iter().map(|m| m.wall_s).fold(0.0, f64::max);
        let max_mem = ms.iter().map(|m| m.rss_delta_kib).max().unwrap_or(0);
        eprintln!("  {scenario}:");
        eprintln!("    Tests: {}", ms.len());
        eprintln!("    Time: min={min_time:.3}s, max={max_time:.3}s");
        eprintln!("    Memory: max_delta={max_mem} KiB");
        if let (Some(first), Some(last)) = (ms.first(), ms.last()) {
            if ms.len() >= 2 && first.wall_s > 0.0 {
                eprintln!(
                    "    Scaling: {:.1}x slower from {} to {}",
                    last.wall_s / first.wall_s,
                    first.size_desc,
                    last.size_desc
                );
            }
        }
        eprintln!();
    }

    eprintln!("{}", "=".repeat(80));
    if failed == 0 {
        eprintln!("✓ All verified tests passed.");
    } else {
        eprintln!("✗ {failed} test(s) failed. Please review the errors above.");
    }
    eprintln!();
    eprintln!("Interpretation:");
    eprintln!("  • knuth_* time should grow roughly quadratically in n, full_search cubically");
    eprintln!("  • memory grows with the three (n+2)² tables");
    eprintln!("{}", "=".repeat(80));
    eprintln!();
}

fn measure<F>(
    scenario: &'static str,
    size_desc: String,
    sys: &mut System,
    compute: F,
) -> Measurement
where
    F: FnOnce() -> (VerificationStatus, Option<String>),
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (status, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        scenario,
        size_desc,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        verification_status: status,
        verification_detail: detail,
    }
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,size_desc,wall_s,rss_delta_kib,verification_status,verification_detail");
    for m in measurements {
        let detail = m
            .verification_detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let col1 = measurements
        .iter()
        .map(|m| m.scenario.len())
        .fold("scenario".len(), usize::max);
    let col2 = measurements
        .iter()
        .map(|m| m.size_desc.len())
        .fold("size".len(), usize::max);

    println!(
        "{:<col1$}  {:<col2$}  {:>12}  {:>14}  {:>12}  detail",
        "scenario", "size", "wall_s", "rss_delta_kib", "status"
    );
    println!("{:-<col1$}  {:-<col2$}  {:-<12}  {:-<14}  {:-<12}  {:-<12}", "", "", "", "", "", "");
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>12.3}  {:>14}  {:>12}  {}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            m.verification_detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    println!("[");
    for (idx, m) in measurements.iter().enumerate() {
        let detail = match m.verification_detail.as_ref() {
            Some(d) => format!("\"{}\"", d.replace('"', "'")),
            None => "null".to_string(),
        };
        println!(
            "  {{\"scenario\":\"{}\",\"size\":\"{}\",\"wall_s\":{:.3},\"rss_delta_kib\":{},\"verification\":{{\"status\":\"{}\",\"detail\":{}}}}}{}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            detail,
            if idx + 1 == measurements.len() { "" } else { "," }
        );
    }
    println!("]");
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    match get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        Some(process) => process.memory() / 1024,
        None => 0,
    }
}

fn numeric_labels(n: usize) -> Vec<String> {
    (1..=n).map(|k| (k * 10).to_string()).collect()
}

/// Deterministic, uneven success probabilities with `p[0] = 0`, summing to 0.8.
fn success_weights(n: usize) -> Vec<f64> {
    let raw: Vec<f64> = (1..=n).map(|k| ((k * 7919) % 97 + 1) as f64).collect();
    let total: f64 = raw.iter().sum();
    std::iter::once(0.0)
        .chain(raw.into_iter().map(|w| 0.8 * w / total))
        .collect()
}

/// Deterministic gap probabilities summing to 0.2.
fn gap_weights(n: usize) -> Vec<f64> {
    let raw: Vec<f64> = (0..=n).map(|g| ((g * 104_729) % 31 + 1) as f64).collect();
    let total: f64 = raw.iter().sum();
    raw.into_iter().map(|w| 0.2 * w / total).collect()
}
