use std::path::PathBuf;

use refjson::reflect::{Result, parse};

/// Parse a file and report the node count, or fail with the positioned
/// parse error.
pub fn run(path: PathBuf) -> Result<()> {
	let text = std::fs::read_to_string(&path)?;
	let doc = parse(&text)?;
	println!("ok: {} nodes", doc.len());
	Ok(())
}
