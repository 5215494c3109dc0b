//! Quoll CLI
//!
//! Parses selectors and runs queries against JSON tree fixtures, for testing
//! and debugging the selector engine.

mod tree;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use quoll_common::recorded_warnings;
use quoll_dom::{DomTree, NodeId};
use quoll_selectors::{Component, Error, FeatureInfo, Query, Selectors};

/// Quoll: CSS selector parsing and matching from the command line
#[derive(Parser, Debug)]
#[command(name = "quoll")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Show the analyzed branches of a selector
    quoll parse 'ul > li:nth-child(odd of .item), ol li'

    # Same, as JSON
    quoll parse --json ':is(h1, h2):has(+ p)'

    # Print the path of every match in a tree fixture
    quoll query 'li.item' --tree page.json

    # Test one element, addressed by element child indices
    quoll matches ':first-child' --tree page.json --node /0/1/0

    # Query inside a shadow tree
    quoll query ':host > *' --tree page.json --scope /0/1/2/#shadow
"#)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse and analyze a selector
    Parse {
        /// Selector text
        selector: String,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print every element matching the selector, in document order
    Query {
        /// Selector text
        selector: String,

        #[command(flatten)]
        fixture: TreeArgs,

        /// Only print the first match
        #[arg(long)]
        first: bool,
    },

    /// Test whether one element matches the selector
    Matches {
        /// Selector text
        selector: String,

        #[command(flatten)]
        fixture: TreeArgs,

        /// Path of the element to test
        #[arg(long, value_name = "PATH")]
        node: String,
    },

    /// Find the nearest inclusive ancestor matching the selector
    Closest {
        /// Selector text
        selector: String,

        #[command(flatten)]
        fixture: TreeArgs,

        /// Path of the element to start from
        #[arg(long, value_name = "PATH")]
        node: String,
    },
}

/// Tree fixture and query context shared by the matching subcommands.
#[derive(Args, Debug)]
struct TreeArgs {
    /// JSON tree fixture
    #[arg(long, value_name = "FILE")]
    tree: PathBuf,

    /// Path of the scoping node; a `#shadow` path enables shadow context
    #[arg(long, value_name = "PATH")]
    scope: Option<String>,

    /// Namespace binding, e.g. `svg=http://www.w3.org/2000/svg`
    #[arg(long = "namespace", value_name = "PREFIX=URI")]
    namespaces: Vec<String>,

    /// Path of the element that has focus
    #[arg(long, value_name = "PATH")]
    focus: Option<String>,

    /// Path of the element that is the document's target
    #[arg(long, value_name = "PATH")]
    target: Option<String>,
}

/// A loaded fixture plus the resolved query context.
struct Session {
    tree: DomTree,
    scope: Option<NodeId>,
    focus: Option<NodeId>,
    target: Option<NodeId>,
    namespaces: Vec<(String, String)>,
}

impl Session {
    fn load(args: &TreeArgs) -> Result<Self> {
        let tree = tree::load(&args.tree)?;
        let resolve = |path: Option<&str>| path.map(|path| tree::resolve(&tree, path)).transpose();
        let scope = resolve(args.scope.as_deref())?;
        let focus = resolve(args.focus.as_deref())?;
        let target = resolve(args.target.as_deref())?;
        let namespaces = args
            .namespaces
            .iter()
            .map(|binding| {
                binding
                    .split_once('=')
                    .map(|(prefix, uri)| (prefix.to_string(), uri.to_string()))
                    .with_context(|| format!("namespace binding '{binding}' is not PREFIX=URI"))
            })
            .collect::<Result<_>>()?;
        Ok(Self {
            tree,
            scope,
            focus,
            target,
            namespaces,
        })
    }

    fn query<'a>(&'a self, selectors: &'a Selectors) -> Query<'a, DomTree> {
        let mut query = Query::new(&self.tree, selectors).warn(true);
        if let Some(scope) = self.scope {
            query = query.scope(scope);
        }
        if let Some(focus) = self.focus {
            query = query.focus(focus);
        }
        if let Some(target) = self.target {
            query = query.target(target);
        }
        for (prefix, uri) in &self.namespaces {
            query = query.namespace(prefix.as_str(), uri.as_str());
        }
        query
    }

    fn print_node(&self, node: NodeId) {
        println!(
            "{}  {}",
            tree::path_of(&self.tree, node).cyan(),
            tree::label(&self.tree, node)
        );
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(selector_err) = err
                .downcast_ref::<Error>()
                .and_then(Error::as_invalid_selector)
                .or_else(|| err.downcast_ref())
            {
                eprintln!("{} {selector_err}", "error:".red().bold());
                if !selector_err.detail().is_empty() {
                    eprintln!("  {}", selector_err.detail().dimmed());
                }
            } else {
                eprintln!("{} {err:#}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Parse { selector, json } => {
            let selectors = Selectors::parse(selector)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&selectors)?);
            } else {
                print_analysis(&selectors);
            }
        }
        Command::Query {
            selector,
            fixture,
            first,
        } => {
            let selectors = Selectors::parse(selector)?;
            let session = Session::load(&fixture)?;
            let query = session.query(&selectors);
            let root = session.scope.unwrap_or(NodeId::ROOT);
            if first {
                match query.first_match(root)? {
                    Some(node) => session.print_node(node),
                    None => println!("{}", "no match".dimmed()),
                }
            } else {
                let mut count = 0usize;
                for node in query.all_matches(root) {
                    session.print_node(node?);
                    count += 1;
                }
                println!("{}", format!("{count} match(es)").dimmed());
            }
        }
        Command::Matches {
            selector,
            fixture,
            node,
        } => {
            let selectors = Selectors::parse(selector)?;
            let session = Session::load(&fixture)?;
            let node = tree::resolve(&session.tree, &node)?;
            let matched = session.query(&selectors).matches(node)?;
            if matched {
                println!("{}", "true".green());
            } else {
                println!("{}", "false".red());
            }
        }
        Command::Closest {
            selector,
            fixture,
            node,
        } => {
            let selectors = Selectors::parse(selector)?;
            let session = Session::load(&fixture)?;
            let node = tree::resolve(&session.tree, &node)?;
            match session.query(&selectors).closest(node)? {
                Some(found) => session.print_node(found),
                None => println!("{}", "no match".dimmed()),
            }
        }
    }
    print_warnings();
    Ok(())
}

/// Print each branch as its compounds and combinators, then the feature flags.
fn print_analysis(selectors: &Selectors) {
    println!("{} {}", "Selector:".bold(), selectors.source());
    for (index, branch) in selectors.branches().iter().enumerate() {
        println!("{}", format!("Branch {index}").bold());
        for component in &branch.components {
            match component {
                Component::Compound(compound) => {
                    println!("  {}", "compound".cyan());
                    for simple in &compound.simple_selectors {
                        println!("    {simple:?}");
                    }
                }
                Component::Combinator(combinator) => {
                    println!("  {} '{combinator}'", "combinator".yellow());
                }
            }
        }
    }
    print_features(selectors.info());
}

fn print_features(info: &FeatureInfo) {
    let flags = [
        (":has()", info.has_has_pseudo_func),
        ("logical pseudo-class", info.has_logical_pseudo_func),
        ("nested selector", info.has_nested_selector),
        (":nth-child(of S)", info.has_nth_child_of_selector),
        (":state()", info.has_state_pseudo_class),
    ];
    println!("{}", "Features".bold());
    for (name, present) in flags {
        let mark = if present { "yes".green().to_string() } else { "no".dimmed().to_string() };
        println!("  {name}: {mark}");
    }
}

/// Summarize warnings emitted while matching; each was already printed once.
fn print_warnings() {
    let warnings = recorded_warnings();
    if !warnings.is_empty() {
        eprintln!("{}", format!("{} warning(s)", warnings.len()).yellow());
    }
}
