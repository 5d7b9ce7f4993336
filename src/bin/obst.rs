use std::env;

use obst_dp::dot::{to_dot, write_dot_file, DotStyle};
use obst_dp::traits::NumericAware;
use obst_dp::{KeySet, ObstEngineBuilder, ObstError, ObstSession, RootSearch};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("obst: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    if let Err(err) = run(options) {
        eprintln!("obst: {err}");
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<(), ObstError> {
    let engine = ObstEngineBuilder::new()
        .with_root_search(options.root_search)
        .build();
    let mut session = ObstSession::with_engine(engine, NumericAware);

    if !options.labels.is_empty() || !options.p.is_empty() || options.q.is_some() {
        let keys = KeySet::new(options.labels, options.p, options.q)?;
        session.build(keys)?;
    }

    let mut rejected = 0usize;
    for edit in &options.edits {
        let outcome = match edit {
            Edit::Insert(label, p) => session.insert(label.as_str(), *p).map(|_| ()),
            Edit::Delete(label) => session.delete(label).map(|_| ()),
        };
        match outcome {
            Ok(()) => eprintln!("{edit}: ok"),
            Err(err) => {
                rejected += 1;
                eprintln!("{edit}: rejected ({err})");
            }
        }
    }

    for section in &options.show {
        match section {
            Section::Tree => {
                println!("===== Tree =====");
                if session.tree().is_empty() {
                    println!("(empty)");
                } else {
                    print!("{}", session.tree().render_sideways());
                }
            }
            Section::Stats => {
                println!("===== Tree Analysis =====");
                println!("{}", session.tree().stats());
                if session.tree().is_empty() {
                    println!("Expected Search Cost: -");
                } else {
                    println!("Expected Search Cost: {:.4}", session.expected_cost()?);
                }
            }
            Section::Tables => {
                println!("===== Derived Tables =====");
                match session.tables() {
                    Ok(tables) => print!("{}", tables.render()),
                    Err(ObstError::EmptyTree) => println!("(no data)"),
                    Err(err) => return Err(err),
                }
            }
            Section::Data => {
                println!("===== Entered Data =====");
                print!("{}", session.keys().render());
            }
            Section::Dot => match &options.dot_path {
                Some(path) => {
                    write_dot_file(path, session.tree(), &DotStyle::default())?;
                    eprintln!("DOT file generated successfully: {path}");
                }
                None => print!("{}", to_dot(session.tree(), &DotStyle::default())),
            },
        }
    }

    if rejected > 0 {
        eprintln!("{rejected} edit(s) rejected; the tree reflects the accepted ones");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Tree,
    Stats,
    Tables,
    Data,
    Dot,
}

impl Section {
    fn parse_list(value: &str) -> Result<Vec<Self>, String> {
        let mut sections = Vec::new();
        for item in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            match item {
                "tree" => sections.push(Section::Tree),
                "stats" => sections.push(Section::Stats),
                "tables" => sections.push(Section::Tables),
                "data" => sections.push(Section::Data),
                "dot" => sections.push(Section::Dot),
                "all" => sections.extend([
                    Section::Data,
                    Section::Tree,
                    Section::Stats,
                    Section::Tables,
                    Section::Dot,
                ]),
                other => return Err(format!("unknown section '{other}'")),
            }
        }
        Ok(sections)
    }
}

#[derive(Debug, Clone)]
enum Edit {
    Insert(String, f64),
    Delete(String),
}

impl std::fmt::Display for Edit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Edit::Insert(label, p) => write!(f, "insert {label} (p={p})"),
            Edit::Delete(label) => write!(f, "delete {label}"),
        }
    }
}

struct Options {
    labels: Vec<String>,
    p: Vec<f64>,
    q: Option<Vec<f64>>,
    edits: Vec<Edit>,
    show: Vec<Section>,
    dot_path: Option<String>,
    root_search: RootSearch,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut labels = Vec::new();
        let mut p = Vec::new();
        let mut q = None;
        let mut edits = Vec::new();
        let mut show = None;
        let mut dot_path = None;
        let mut root_search = RootSearch::Knuth;

        while let Some(arg) = args.next() {
            let arg: String = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            }
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag.to_string(), Some(value.to_string())),
                _ => (arg.clone(), None),
            };
            let mut value = || -> Result<String, String> {
                match &inline {
                    Some(v) => Ok(v.clone()),
                    None => args
                        .next()
                        .map(Into::into)
                        .ok_or_else(|| format!("missing value after {flag}")),
                }
            };
            match flag.as_str() {
                "--labels" => {
                    labels = value()?
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect();
                }
                "--p" => p = parse_floats(&value()?)?,
                "--q" => q = Some(parse_floats(&value()?)?),
                "--insert" => {
                    let raw = value()?;
                    let (label, prob) = raw
                        .rsplit_once(':')
                        .ok_or_else(|| format!("--insert expects label:p, got '{raw}'"))?;
                    let prob = prob
                        .parse::<f64>()
                        .map_err(|_| format!("invalid probability '{prob}'"))?;
                    edits.push(Edit::Insert(label.to_string(), prob));
                }
                "--delete" => edits.push(Edit::Delete(value()?)),
                "--show" => show = Some(Section::parse_list(&value()?)?),
                "--dot" => dot_path = Some(value()?),
                "--root-search" => {
                    let raw = value()?;
                    root_search = raw.parse().map_err(|err: ObstError| err.to_string())?;
                }
                _ => return Err(format!("unrecognized argument '{arg}'")),
            }
        }

        let mut show = show.unwrap_or_else(|| vec![Section::Tree]);
        if dot_path.is_some() && !show.contains(&Section::Dot) {
            show.push(Section::Dot);
        }

        Ok(Self {
            labels,
            p,
            q,
            edits,
            show,
            dot_path,
            root_search,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: obst [options]

Options:
  --labels <a,b,c>              Key labels (sorted numerically where all digits)
  --p <x,y,z>                   Success probability per label, same order as --labels
  --q <g0,...,gn>               Gap probabilities for the sorted order (n+1 values);
                                omitting it keeps the tree editable
  --insert <label:p>            Insert a key after building (repeatable)
  --delete <label>              Delete a key after building (repeatable)
  --show <sections>             Comma list of tree,stats,tables,data,dot,all (default: tree)
  --dot <path>                  Write the Graphviz DOT description to <path>
  --root-search <knuth|full>    Candidate root strategy (default: knuth)
  -h, --help                    Print this help message

Examples:
  obst --labels A,B,C --p 0.3,0.1,0.1 --q 0.1,0.1,0.1,0.2 --show all
  obst --labels 10,20,30 --p 0.2,0.5,0.3 --insert 25:0.4 --delete 10 --show tree,stats
"
        );
    }
}

fn parse_floats(value: &str) -> Result<Vec<f64>, String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .map_err(|_| format!("invalid number '{s}'"))
        })
        .collect()
}
