//! `linkrank` - rank the pages of a link graph.
//!
//! # Usage
//!
//! ```bash
//! # Built-in sample web graph, convergence-gated
//! linkrank
//!
//! # Edge list from a file, dangling-aware, top 5
//! linkrank --edges links.txt --policy dangling --top 5
//!
//! # Edge list from stdin, write a Graphviz diagram
//! cat links.txt | linkrank --edges - --dot web.dot
//! ```

use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use linkrank::{
    parse_edges, rank, DotRenderer, LinkGraph, RankConfig, RankPolicy, Ranking, Renderer,
};
use tracing::Level;

#[derive(Parser)]
#[command(name = "linkrank")]
#[command(about = "PageRank over a hyperlink graph", long_about = None)]
struct Cli {
    /// Edge list, one `source target` per line (`-` reads stdin). Defaults to a sample graph.
    #[arg(long, value_name = "FILE")]
    edges: Option<PathBuf>,

    /// How dangling pages and stopping are handled
    #[arg(long, value_enum, default_value = "convergence")]
    policy: PolicyArg,

    /// Damping factor
    #[arg(long, default_value = "0.85", allow_negative_numbers = true)]
    damping: f64,

    /// Iteration budget
    #[arg(long, default_value = "100")]
    iterations: usize,

    /// L1 convergence threshold
    #[arg(long, default_value = "1e-8", allow_negative_numbers = true)]
    tolerance: f64,

    /// Only print the highest-ranked pages
    #[arg(long)]
    top: Option<usize>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write a Graphviz diagram sized by rank
    #[arg(long, value_name = "FILE")]
    dot: Option<PathBuf>,

    /// Print the adjacency listing before the ranks
    #[arg(long)]
    show_graph: bool,

    /// More log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Fixed iterations, dangling mass leaks
    Basic,
    /// Fixed iterations, dangling mass redistributed
    Dangling,
    /// Stop at convergence, dangling mass leaks
    Convergence,
    /// Stop at convergence, dangling mass redistributed
    DanglingConvergence,
}

impl From<PolicyArg> for RankPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Basic => RankPolicy::Basic,
            PolicyArg::Dangling => RankPolicy::Dangling,
            PolicyArg::Convergence => RankPolicy::Convergence,
            PolicyArg::DanglingConvergence => RankPolicy::DanglingConvergence,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// `page: rank` lines
    Text,
    /// Ranking and run report as JSON
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let graph = match &cli.edges {
        Some(path) => load_graph(path)?,
        None => sample_graph(),
    };

    let config = RankConfig::new()
        .with_damping(cli.damping)
        .with_iterations(cli.iterations)
        .with_tolerance(cli.tolerance);
    let ranking = rank(&graph, config, cli.policy.into()).context("ranking failed")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if cli.show_graph {
        writeln!(out, "{graph}\n")?;
    }
    write_ranking(&mut out, &ranking, cli.format, cli.top)?;

    if let Some(path) = &cli.dot {
        let file =
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
        let mut renderer = DotRenderer::new(BufWriter::new(file));
        renderer
            .render(&graph, &ranking)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    Ok(())
}

fn write_ranking<W: Write>(
    mut out: W,
    ranking: &Ranking<String>,
    format: OutputFormat,
    top: Option<usize>,
) -> Result<()> {
    match format {
        OutputFormat::Text => match top {
            Some(k) => {
                for (page, score) in ranking.top_k(k) {
                    writeln!(out, "{page}: {score:.6}")?;
                }
            }
            None => writeln!(out, "{ranking}")?,
        },
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, ranking)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

fn load_graph(path: &Path) -> Result<LinkGraph<String>> {
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read edges from stdin")?;
        buf
    } else {
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?
    };
    let edges =
        parse_edges(&text).with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(LinkGraph::from_edges(edges))
}

/// Seven-page web with one dangling page (`A`).
fn sample_graph() -> LinkGraph<String> {
    let web: [(&str, &[&str]); 7] = [
        ("A", &[]),
        ("B", &["C", "G"]),
        ("C", &["A"]),
        ("D", &["C"]),
        ("E", &["C"]),
        ("F", &["C", "G"]),
        ("G", &["B"]),
    ];
    LinkGraph::from_adjacency(web.iter().map(|&(page, links)| {
        (
            page.to_string(),
            links.iter().map(|l| l.to_string()).collect::<Vec<_>>(),
        )
    }))
}
