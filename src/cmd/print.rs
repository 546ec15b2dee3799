use std::path::PathBuf;

use refjson::reflect::{DataType, Document, NodeId, Result, escape_json, parse};

/// Parse a file and pretty-print the document, tab-indented with one
/// value per line.
pub fn run(path: PathBuf) -> Result<()> {
	let text = std::fs::read_to_string(&path)?;
	let doc = parse(&text)?;

	let mut out = String::new();
	render(&doc, doc.root_id(), 0, &mut out);
	println!("{out}");
	Ok(())
}

fn render(doc: &Document, id: NodeId, indent: usize, out: &mut String) {
	let node = doc.node(id);
	if !node.name.is_empty() {
		out.push_str(&format!("\"{}\" : ", escape_json(&node.name)));
	}

	match node.kind {
		DataType::Undefined | DataType::Number | DataType::Boolean | DataType::Null => {
			out.push_str(&node.data);
		}
		DataType::String => {
			out.push_str(&format!("\"{}\"", escape_json(&node.data)));
		}
		DataType::Array | DataType::Object => {
			let (open, close) = if node.kind == DataType::Object { ('{', '}') } else { ('[', ']') };
			out.push(open);
			for (i, child) in node.children.iter().enumerate() {
				if i > 0 {
					out.push(',');
				}
				out.push('\n');
				out.push_str(&"\t".repeat(indent + 1));
				render(doc, *child, indent + 1, out);
			}
			if !node.children.is_empty() {
				out.push('\n');
				out.push_str(&"\t".repeat(indent));
			}
			out.push(close);
		}
	}
}
