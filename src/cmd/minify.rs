use std::path::PathBuf;

use refjson::reflect::{Result, parse};

/// Parse a file and emit its minimal textual form.
pub fn run(path: PathBuf) -> Result<()> {
	let text = std::fs::read_to_string(&path)?;
	let doc = parse(&text)?;
	println!("{}", doc.to_json_string());
	Ok(())
}
