use std::io::Write;

/// Kind of a parsed JSON node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
	/// Placeholder for a keyed node whose value has not been scanned yet.
	Undefined,
	/// Numeric literal, raw text kept in `data`.
	Number,
	/// String literal, unescaped text kept in `data`.
	String,
	/// `true` or `false`, literal text kept in `data`.
	Boolean,
	/// Ordered container of unnamed children.
	Array,
	/// Ordered container of named children.
	Object,
	/// The `null` literal.
	Null,
}

/// Index of a node within its owning [`Document`] arena.
pub type NodeId = usize;

/// One node of a parsed JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
	/// Node kind.
	pub kind: DataType,
	/// Key under the enclosing object; empty for array entries and the root.
	pub name: String,
	/// Scalar payload text; unused for arrays and objects.
	pub data: String,
	/// Child node indices for arrays and objects, in document order.
	pub children: Vec<NodeId>,
}

impl Node {
	pub(crate) fn new(kind: DataType) -> Self {
		Self {
			kind,
			name: String::new(),
			data: String::new(),
			children: Vec::new(),
		}
	}
}

/// A parsed JSON document.
///
/// All nodes live in one growable arena and reference each other by index,
/// so arena growth never invalidates a previously issued [`NodeId`]. The
/// arena is released as a whole when the document drops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
	nodes: Vec<Node>,
}

impl Document {
	pub(crate) fn with_capacity(reserve_nodes: usize) -> Self {
		Self {
			nodes: Vec::with_capacity(reserve_nodes),
		}
	}

	pub(crate) fn push(&mut self, node: Node) -> NodeId {
		self.nodes.push(node);
		self.nodes.len() - 1
	}

	pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
		&mut self.nodes[id]
	}

	/// Root node id; node 0 by construction.
	pub fn root_id(&self) -> NodeId {
		0
	}

	/// Root node of the document.
	pub fn root(&self) -> &Node {
		&self.nodes[0]
	}

	/// Node by arena index.
	pub fn node(&self, id: NodeId) -> &Node {
		&self.nodes[id]
	}

	/// Total number of nodes in the arena.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether the arena holds no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Look up a child of an object node by key. Returns `None` for
	/// non-object nodes and unknown keys.
	pub fn child_by_name(&self, id: NodeId, name: &str) -> Option<NodeId> {
		let parent = self.node(id);
		if parent.kind != DataType::Object {
			return None;
		}
		parent.children.iter().copied().find(|child| self.nodes[*child].name == name)
	}

	/// Look up a child of an object or array node by position.
	pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
		let parent = self.node(id);
		if parent.kind != DataType::Object && parent.kind != DataType::Array {
			return None;
		}
		parent.children.get(index).copied()
	}

	/// Iterate the children of a node in document order.
	pub fn children(&self, id: NodeId) -> impl Iterator<Item = &Node> {
		self.node(id).children.iter().map(|child| &self.nodes[*child])
	}

	/// Write the document in its minimal textual form (no whitespace).
	pub fn write_json<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
		self.write_node(out, self.root_id(), false)
	}

	/// Render the document in its minimal textual form.
	pub fn to_json_string(&self) -> String {
		let mut buf = Vec::new();
		// Vec<u8> writes cannot fail.
		let _ = self.write_json(&mut buf);
		String::from_utf8(buf).unwrap_or_default()
	}

	fn write_node<W: Write>(&self, out: &mut W, id: NodeId, named: bool) -> std::io::Result<()> {
		let node = self.node(id);
		if named && !node.name.is_empty() {
			write!(out, "\"{}\":", escape_json(&node.name))?;
		}

		match node.kind {
			DataType::Undefined | DataType::Number | DataType::Boolean | DataType::Null => {
				write!(out, "{}", node.data)?;
			}
			DataType::String => {
				write!(out, "\"{}\"", escape_json(&node.data))?;
			}
			DataType::Array | DataType::Object => {
				let object = node.kind == DataType::Object;
				write!(out, "{}", if object { '{' } else { '[' })?;
				for (i, child) in node.children.iter().enumerate() {
					if i > 0 {
						write!(out, ",")?;
					}
					self.write_node(out, *child, object)?;
				}
				write!(out, "{}", if object { '}' } else { ']' })?;
			}
		}

		Ok(())
	}
}

/// Escape text for inclusion in a JSON string literal.
pub fn escape_json(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	for ch in text.chars() {
		match ch {
			'"' => out.push_str("\\\""),
			'\\' => out.push_str("\\\\"),
			'\u{0008}' => out.push_str("\\b"),
			'\u{000C}' => out.push_str("\\f"),
			'\n' => out.push_str("\\n"),
			'\r' => out.push_str("\\r"),
			'\t' => out.push_str("\\t"),
			ch if (ch as u32) < 0x20 => {
				out.push_str(&format!("\\u{:04x}", ch as u32));
			}
			ch => out.push(ch),
		}
	}
	out
}
