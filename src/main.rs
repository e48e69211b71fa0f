use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use arbor_io::{CsvReader, RequestReader, TreeReader, TreeWriter};
use arbor_tree::{
    Algorithm, CartPartition, DEFAULT_MAX_DEPTH, Row, TreeConfig, TreeNode, Value,
    build_classification_tree, build_tree, predict_batch, render_text,
};

#[derive(Parser)]
#[command(name = "arbor")]
#[command(about = "Decision tree induction (ID3, CART, CART regression) over tabular data")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose (debug-level) logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Number of threads for batch prediction (defaults to all cores)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand)]
enum Command {
    /// Build a tree from a headed CSV file
    Build {
        /// Path to the input CSV file
        #[arg(long)]
        data: PathBuf,

        /// Target column (defaults to the last column)
        #[arg(long)]
        target: Option<String>,

        /// Comma-separated feature columns (defaults to every non-target column)
        #[arg(long, value_delimiter = ',')]
        attributes: Option<Vec<String>>,

        /// Induction algorithm: "id3", "cart", or "regression"
        #[arg(long, default_value = "id3")]
        algorithm: String,

        /// Depth limit for regression trees
        #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
        max_depth: usize,

        /// CART partitioning: "multiway" or "binary"
        #[arg(long, default_value = "multiway")]
        cart_partition: String,

        /// Write the tree JSON to this path
        #[arg(long)]
        output: Option<PathBuf>,

        /// Print a text drawing of the tree to stderr
        #[arg(long, default_value_t = false)]
        render: bool,
    },

    /// Build an ID3 tree from a JSON request {dataset, targetAttribute, attributes}
    Request {
        /// Path to the request JSON file
        #[arg(long)]
        input: PathBuf,

        /// Write the tree JSON to this path (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Predict targets with a saved tree
    Predict {
        /// Path to the tree JSON file
        #[arg(long)]
        tree: PathBuf,

        /// One sample as repeated name=value pairs
        #[arg(long = "sample", conflicts_with = "data")]
        sample: Vec<String>,

        /// CSV file of samples, one per row
        #[arg(long)]
        data: Option<PathBuf>,
    },

    /// Draw a saved tree as text
    Render {
        /// Path to the tree JSON file
        #[arg(long)]
        tree: PathBuf,
    },
}

// --- JSON stdout output structs ---

#[derive(Serialize)]
struct BuildOutput {
    algorithm: String,
    n_samples: usize,
    n_nodes: usize,
    n_leaves: usize,
    depth: usize,
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct SampleOutput {
    prediction: Option<Value>,
    confidence: Option<f64>,
    path: Vec<String>,
    error: Option<String>,
}

#[derive(Serialize)]
struct BatchOutput {
    n_samples: usize,
    n_resolved: usize,
    predictions: Vec<Option<Value>>,
}

fn parse_algorithm(s: &str) -> Result<Algorithm> {
    match s {
        "id3" => Ok(Algorithm::Id3),
        "cart" => Ok(Algorithm::Cart),
        "regression" => Ok(Algorithm::Regression),
        other => anyhow::bail!("unknown algorithm: {other} (expected id3, cart, or regression)"),
    }
}

fn parse_cart_partition(s: &str) -> Result<CartPartition> {
    match s {
        "multiway" => Ok(CartPartition::Multiway),
        "binary" => Ok(CartPartition::Binary),
        other => anyhow::bail!("unknown CART partition: {other} (expected multiway or binary)"),
    }
}

fn parse_sample(pairs: &[String]) -> Result<Row> {
    pairs
        .iter()
        .map(|pair| {
            let Some((name, value)) = pair.split_once('=') else {
                anyhow::bail!("invalid sample pair: {pair} (expected name=value)");
            };
            Ok((name.trim().to_string(), Value::parse_cell(value.trim())))
        })
        .collect()
}

fn write_or_print(tree: &TreeNode, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => TreeWriter::new(path)?.write(tree)?,
        None => println!("{}", serde_json::to_string_pretty(tree)?),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match (cli.verbose, cli.quiet) {
        (true, _) => "debug",
        (_, true) => "error",
        _ => "info",
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Some(threads) = cli.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure thread pool")?;
        info!(threads, "thread pool configured");
    }

    match cli.command {
        Command::Build {
            data,
            target,
            attributes,
            algorithm,
            max_depth,
            cart_partition,
            output,
            render,
        } => {
            let table = CsvReader::new(&data)
                .read()
                .context("failed to read input CSV")?;

            let target = target.unwrap_or_else(|| table.default_target().to_string());
            let attributes = attributes.unwrap_or_else(|| {
                table
                    .columns()
                    .iter()
                    .filter(|c| **c != target)
                    .cloned()
                    .collect()
            });

            let config = TreeConfig::new(parse_algorithm(&algorithm)?)
                .with_max_depth(max_depth)
                .with_cart_partition(parse_cart_partition(&cart_partition)?);
            let tree = build_tree(table.rows(), &target, &attributes, &config)
                .context("tree construction failed")?;
            info!(target = %target, n_attributes = attributes.len(), "tree built");

            if render {
                eprint!("{}", render_text(&tree));
            }
            if let Some(path) = &output {
                TreeWriter::new(path)?.write(&tree)?;
            }

            let summary = BuildOutput {
                algorithm,
                n_samples: tree.n_samples(),
                n_nodes: tree.n_nodes(),
                n_leaves: tree.n_leaves(),
                depth: tree.depth(),
                output,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Command::Request { input, output } => {
            let request = RequestReader::new(&input)
                .read()
                .context("failed to read build request")?;
            let tree = build_classification_tree(
                &request.dataset,
                &request.target_attribute,
                &request.attributes,
            )
            .context("tree construction failed")?;
            write_or_print(&tree, output.as_ref())?;
        }

        Command::Predict { tree, sample, data } => {
            let tree = TreeReader::new(&tree)
                .read()
                .context("failed to read tree")?;

            if let Some(data) = data {
                let table = CsvReader::new(&data)
                    .read()
                    .context("failed to read samples CSV")?;
                let predictions: Vec<Option<Value>> = predict_batch(&tree, table.rows())
                    .into_iter()
                    .map(Result::ok)
                    .collect();
                let summary = BatchOutput {
                    n_samples: predictions.len(),
                    n_resolved: predictions.iter().filter(|p| p.is_some()).count(),
                    predictions,
                };
                info!(
                    n_samples = summary.n_samples,
                    n_resolved = summary.n_resolved,
                    "batch prediction complete"
                );
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                if sample.is_empty() {
                    anyhow::bail!("predict needs --sample name=value pairs or --data");
                }
                let row = parse_sample(&sample)?;
                let path = tree.decision_path(&row);
                let result = tree.predict(&row);
                let summary = SampleOutput {
                    prediction: result.as_ref().ok().map(|v| (*v).clone()),
                    confidence: path.terminal().confidence(),
                    path: path.branches().iter().map(|b| b.to_string()).collect(),
                    error: result.err().map(|e| e.to_string()),
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }

        Command::Render { tree } => {
            let tree = TreeReader::new(&tree)
                .read()
                .context("failed to read tree")?;
            print!("{}", render_text(&tree));
        }
    }

    Ok(())
}
