use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;
use xmlmap::{Branch, EncodeOptions, Node};

#[derive(Debug, Parser)]
#[command(
    name = "xmlmap",
    version,
    about = "Convert between XML documents and JSON maps"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode XML into a JSON tree
    Decode {
        #[command(flatten)]
        io: IoArgs,
        /// Keep the root element name as the single top-level key
        #[arg(long)]
        with_root: bool,
    },
    /// Encode a JSON tree as XML
    Encode {
        #[command(flatten)]
        io: IoArgs,
        /// Wrap leaf text in CDATA sections
        #[arg(long)]
        cdata: bool,
        /// Name of the wrapping root element
        #[arg(long, value_name = "NAME", default_value = xmlmap::DEFAULT_ROOT)]
        root: String,
    },
    /// Pretty-print an XML document
    Format {
        #[command(flatten)]
        io: IoArgs,
    },
    /// Decode the root's direct children into a flat JSON object
    Flat {
        #[command(flatten)]
        io: IoArgs,
    },
}

#[derive(Debug, Args)]
struct IoArgs {
    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,
    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Decode { io, with_root } => {
            let input = read_input(&io.input)?;
            let tree = if with_root {
                let (name, tree) = xmlmap::decode_document(&input)?;
                Node::Branch(Branch::from_iter([(name, tree)]))
            } else {
                xmlmap::decode(&input)?
            };
            let json = serde_json::to_string_pretty(&tree).context("failed to serialize tree")?;
            write_output(&io.output, &json)
        }
        Command::Encode { io, cdata, root } => {
            if !xmlmap::is_xml_name(&root) {
                bail!("invalid root element name {root:?}");
            }
            let input = read_input(&io.input)?;
            let tree: Node = serde_json::from_str(&input).context("input is not a JSON tree")?;
            let options = EncodeOptions::cdata(cdata).with_root_name(root);
            debug!(root = %options.root_name, cdata, "encoding tree");
            write_output(&io.output, &xmlmap::encode_with_options(&tree, &options))
        }
        Command::Format { io } => {
            let input = read_input(&io.input)?;
            write_output(&io.output, &xmlmap::format(&input)?)
        }
        Command::Flat { io } => {
            let input = read_input(&io.input)?;
            let entries = xmlmap::decode_flat(&input)?;
            let json =
                serde_json::to_string_pretty(&entries).context("failed to serialize entries")?;
            write_output(&io.output, &json)
        }
    }
}

fn read_input(path: &Option<PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read stdin")?;
            if buffer.trim().is_empty() {
                bail!("no input provided on stdin");
            }
            Ok(buffer)
        }
    }
}

fn write_output(path: &Option<PathBuf>, data: &str) -> Result<()> {
    let mut data = data.to_string();
    if !data.ends_with('\n') {
        data.push('\n');
    }
    match path {
        Some(path) => std::fs::write(path, data)
            .with_context(|| format!("failed to write output file {}", path.display())),
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(data.as_bytes())
                .context("failed to write stdout")?;
            Ok(())
        }
    }
}
