use clap::{Parser, Subcommand};
use jsxp_lexer::DEFAULT_MAX_DEPTH;
use jsxp_parser::{Document, NodeDumper, ParseOptions};
use std::path::Path;

#[derive(Parser)]
#[command(name = "jsxp")]
#[command(about = "jsxp: parse JSX-style markup embedded in PHP source")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the markup tree of every top-level element
    Dump {
        /// Input source file
        path: String,

        /// Suffix each node with its [startLine - endLine]
        #[arg(long)]
        positions: bool,

        /// Print the tree as JSON instead of the indented dump
        #[arg(long)]
        json: bool,

        /// Maximum nesting depth: open tags plus nested host expressions
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },

    /// Check a source file for markup errors without printing the tree
    Check {
        /// Input source file
        path: String,

        /// Maximum nesting depth: open tags plus nested host expressions
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Dump {
            path,
            positions,
            json,
            max_depth,
        } => cmd_dump(&path, positions, json, max_depth),
        Command::Check { path, max_depth } => cmd_check(&path, max_depth),
    }
}

fn read_source(path: &str) -> String {
    let p = Path::new(path);
    if !p.exists() {
        eprintln!("Error: file not found: {path}");
        std::process::exit(1);
    }
    match std::fs::read_to_string(p) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {path}: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_or_exit(path: &str, max_depth: usize) -> Document {
    let source = read_source(path);
    let options = ParseOptions { max_depth };

    match Document::parse_with(&source, &options) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("{path}: {e}");
            std::process::exit(1);
        }
    }
}

fn cmd_dump(path: &str, positions: bool, json: bool, max_depth: usize) {
    let doc = parse_or_exit(path, max_depth);

    if json {
        match serde_json::to_string_pretty(&doc) {
            Ok(out) => println!("{out}"),
            Err(e) => {
                eprintln!("Error serializing {path}: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let dumper = NodeDumper::new().with_positions(positions);
    println!("{}", dumper.dump(&doc));
}

fn cmd_check(path: &str, max_depth: usize) {
    let doc = parse_or_exit(path, max_depth);
    eprintln!("OK: {path} ({} markup regions)", doc.elements.len());
}
