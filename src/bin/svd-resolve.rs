//! Reads a CMSIS-SVD file, resolves it and writes the result.
//!
//! Usage: `svd-resolve <input.svd> [-o <output.svd>] [--no-resolve] [--list] [-v...]`

use anyhow::Context;
use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use std::{
  fs,
  io::{self, Write},
  path::PathBuf,
};

use svd_resolver::{DeviceTree, NodeId};

#[derive(Parser, Debug)]
#[command(name = "svd-resolve")]
#[command(about = "Resolve derivations, inherited properties and dim templates of an SVD file")]
struct Args {
  /// Path to the SVD file to read
  input: PathBuf,

  /// Where to write the resulting SVD file. Defaults to stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Write the file back as read, without resolving anything
  #[arg(long)]
  no_resolve: bool,

  /// Print the element hierarchy instead of XML
  #[arg(long)]
  list: bool,

  /// More log output; repeat for more detail
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

fn list(tree: &DeviceTree, id: NodeId, depth: usize, out: &mut String) {
  let node = tree.node(id);
  let name = node.name.as_deref().unwrap_or("<anonymous>");
  match node.attributes.offset() {
    Some(offset) => out.push_str(&format!(
      "{}{} {} @ {:#x}\n",
      "  ".repeat(depth),
      node.level(),
      name,
      offset
    )),
    None => out.push_str(&format!("{}{} {}\n", "  ".repeat(depth), node.level(), name)),
  }

  for level in tree.child_levels(id) {
    if let Some(collection) = tree.children(id, level) {
      for child in collection.values() {
        list(tree, *child, depth + 1, out);
      }
    }
  }
}

fn main() -> anyhow::Result<()> {
  let args = Args::parse();

  let level = match args.verbose {
    0 => LevelFilter::Warn,
    1 => LevelFilter::Info,
    2 => LevelFilter::Debug,
    _ => LevelFilter::Trace,
  };
  SimpleLogger::new().with_level(level).init()?;

  let xml = fs::read_to_string(&args.input)
    .with_context(|| format!("Failed to read {}", args.input.display()))?;
  let mut tree = DeviceTree::from_xml(&xml)
    .with_context(|| format!("Failed to parse {}", args.input.display()))?;

  if !args.no_resolve {
    info!("Resolving {}", args.input.display());
    tree = tree
      .resolve()
      .with_context(|| format!("Failed to resolve {}", args.input.display()))?;
  }

  if args.list {
    let mut out = String::new();
    list(&tree, tree.root(), 0, &mut out);
    print!("{}", out);
    return Ok(());
  }

  match args.output {
    Some(ref path) => {
      let file = fs::File::create(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
      let mut writer = io::BufWriter::new(file);
      tree.write(&mut writer)?;
      writer.flush()?;
      info!("Wrote {}", path.display());
    }
    None => tree.write(io::stdout().lock())?,
  }

  Ok(())
}
