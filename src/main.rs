#![allow(missing_docs)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod cmd;

#[derive(Parser)]
#[command(name = "refjson", about = "JSON document inspection tools")]
struct Cli {
	#[command(subcommand)]
	command: Commands,
}

#[derive(Subcommand)]
enum Commands {
	Check {
		path: PathBuf,
	},
	Print {
		path: PathBuf,
	},
	Minify {
		path: PathBuf,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err}");
		std::process::exit(1);
	}
}

fn run() -> refjson::reflect::Result<()> {
	let cli = Cli::parse();

	match cli.command {
		Commands::Check { path } => cmd::check::run(path),
		Commands::Print { path } => cmd::print::run(path),
		Commands::Minify { path } => cmd::minify::run(path),
	}
}
