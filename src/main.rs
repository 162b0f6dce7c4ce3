//! khl - highlight keywords in a file
//!
//! Paints the file to the terminal, or renders it as HTML with keyword
//! matches wrapped in highlight elements.

use std::env;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;

use keyword_highlighter::config::{export_json, Config};
use keyword_highlighter::display::Display;
use keyword_highlighter::terminal::Terminal;
use keyword_highlighter::{
    highlight_tree, EditorHighlighter, Element, HighlightError, Result, TextSnapshot, Viewport,
};

/// Command line options
#[derive(Debug, Default)]
struct Options {
    rules: Option<PathBuf>,
    file: Option<PathBuf>,
    html: bool,
    line_numbers: bool,
    export: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("KH_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(options) = parse_args(&args)? else {
        return Ok(());
    };

    let config = match &options.rules {
        Some(path) => Config::from_path(path)?,
        None => Config::load(),
    };

    if options.export {
        println!("{}", export_json(&config.keywords)?);
        return Ok(());
    }

    let text = match &options.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    if options.html {
        let mut root = render_paragraphs(&text);
        highlight_tree(&mut root, &config.keywords);
        println!("{}", root.to_html());
        return Ok(());
    }

    let highlighter = EditorHighlighter::new(&text, &config.keywords);
    let display = Display {
        show_line_numbers: options.line_numbers,
    };
    let mut terminal = Terminal::stdout();
    let viewport = Viewport::whole(&TextSnapshot::new(&text));
    display.render(&mut terminal, &text, &highlighter, viewport)
}

/// Parse arguments; None means the invocation is already handled
fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(None);
            }
            "--version" | "-V" => {
                println!("khl {}", env!("CARGO_PKG_VERSION"));
                return Ok(None);
            }
            "--rules" | "-r" => {
                let path = iter
                    .next()
                    .ok_or_else(|| HighlightError::Message(format!("{} needs a file", arg)))?;
                options.rules = Some(PathBuf::from(path));
            }
            "--html" => options.html = true,
            "--line-numbers" | "-n" => options.line_numbers = true,
            "--export" => options.export = true,
            other if other.starts_with('-') && other != "-" => {
                return Err(HighlightError::Message(format!("Unknown option: {}", other)));
            }
            "-" => options.file = None,
            file => options.file = Some(PathBuf::from(file)),
        }
    }

    Ok(Some(options))
}

/// Build a rendered tree with one paragraph per blank-line separated block
fn render_paragraphs(text: &str) -> Element {
    text.split("\n\n")
        .filter(|block| !block.trim().is_empty())
        .fold(Element::new("div").with_class("markdown-rendered"), |root, block| {
            root.with_child(Element::new("p").with_text(block.trim_matches('\n')))
        })
}

fn print_usage() {
    println!("khl {} - highlight keywords in text", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: khl [OPTIONS] [FILE]");
    println!();
    println!("Reads FILE, or standard input when FILE is absent or '-'.");
    println!();
    println!("Options:");
    println!("  -r, --rules FILE    Load keyword rules from a TOML or JSON file");
    println!("                      (default: ~/.keyword-highlighter.toml)");
    println!("      --html          Print an HTML rendering instead of painting");
    println!("  -n, --line-numbers  Show line numbers");
    println!("      --export        Print the loaded rules as JSON and exit");
    println!("  -h, --help          Show this help message");
    println!("  -V, --version       Show version information");
    println!();
    println!("Set KH_LOG (e.g. KH_LOG=debug) to control diagnostics on stderr.");
}
