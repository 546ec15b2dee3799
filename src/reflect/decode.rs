use std::any::{Any, TypeId};

use crate::reflect::document::{DataType, Document, NodeId};
use crate::reflect::primitive::{is_primitive, load_primitive};
use crate::reflect::registry::{CompositeKind, MemberDescriptor, Registry, TypeDescriptor};
use crate::reflect::sequence::SequenceHandle;
use crate::reflect::status::{LoadReport, LoadStatus};

/// Knobs for the decode walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
	/// Nesting depth at which the walk stops descending. The value itself
	/// counts as depth 1.
	pub max_depth: u32,
}

impl Default for DecodeOptions {
	fn default() -> Self {
		Self { max_depth: 25 }
	}
}

/// Populate a registered value from a parsed document node.
///
/// Fields present in the document overwrite the target; fields absent or
/// malformed leave the target untouched and are reported per member in the
/// returned [`LoadReport`], whose children mirror the registered member
/// order. Decode never fails as a whole.
///
/// # Panics
///
/// Panics if `T` is neither a supported primitive nor registered.
pub fn decode<T: 'static>(registry: &Registry, target: &mut T, doc: &Document, node: NodeId) -> LoadReport {
	decode_with_options(registry, target, doc, node, &DecodeOptions::default())
}

/// [`decode`] with explicit options.
pub fn decode_with_options<T: 'static>(
	registry: &Registry,
	target: &mut T,
	doc: &Document,
	node: NodeId,
	options: &DecodeOptions,
) -> LoadReport {
	let shape = resolve_shape::<T>(registry);
	load_value(registry, target, &shape, doc, Some(node), 1, options)
}

/// Shape of the value currently being walked, projected from either a type
/// descriptor or a member snapshot.
struct Shape<'a> {
	type_id: TypeId,
	kind: CompositeKind,
	members: &'a [MemberDescriptor],
	sequence: Option<&'a SequenceHandle>,
}

impl<'a> Shape<'a> {
	fn of_member(member: &'a MemberDescriptor) -> Self {
		Self {
			type_id: member.type_id,
			kind: member.kind,
			members: &member.members,
			sequence: member.sequence.as_ref(),
		}
	}

	fn of_type(desc: &'a TypeDescriptor) -> Self {
		Self {
			type_id: desc.type_id,
			kind: desc.kind,
			members: &desc.members,
			sequence: desc.sequence.as_ref(),
		}
	}
}

fn resolve_shape<T: 'static>(registry: &Registry) -> Shape<'_> {
	let id = TypeId::of::<T>();

	if registry.enum_descriptor(id).is_some() {
		return Shape {
			type_id: id,
			kind: CompositeKind::Enum,
			members: &[],
			sequence: None,
		};
	}

	if let Some(desc) = registry.descriptor(id) {
		return Shape::of_type(desc);
	}

	if is_primitive(id) {
		return Shape {
			type_id: id,
			kind: CompositeKind::None,
			members: &[],
			sequence: None,
		};
	}

	panic!("cannot decode into `{}`: type is not registered", std::any::type_name::<T>());
}

fn load_value(
	registry: &Registry,
	target: &mut dyn Any,
	shape: &Shape<'_>,
	doc: &Document,
	node: Option<NodeId>,
	depth: u32,
	options: &DecodeOptions,
) -> LoadReport {
	let Some(node) = node else {
		return LoadReport::leaf(LoadStatus::Missing);
	};
	if depth > options.max_depth {
		return LoadReport::leaf(LoadStatus::MaxNestDepthExceeded);
	}

	match shape.kind {
		CompositeKind::Enum => load_enum(registry, target, shape.type_id, doc, node),
		CompositeKind::Struct => load_struct(registry, target, shape.members, doc, node, depth, options),
		CompositeKind::Sequence => load_sequence(registry, target, shape, doc, node, depth, options),
		CompositeKind::None => LoadReport::leaf(load_primitive(target, doc.node(node))),
	}
}

fn load_struct(
	registry: &Registry,
	target: &mut dyn Any,
	members: &[MemberDescriptor],
	doc: &Document,
	node: NodeId,
	depth: u32,
	options: &DecodeOptions,
) -> LoadReport {
	if doc.node(node).kind != DataType::Object {
		return LoadReport::leaf(LoadStatus::BadFormat);
	}

	let mut children = Vec::with_capacity(members.len());
	for member in members {
		let child_node = doc.child_by_name(node, &member.name);
		let report = match member.access.get_mut(target) {
			Some(field) => load_value(registry, field, &Shape::of_member(member), doc, child_node, depth + 1, options),
			None => LoadReport::leaf(LoadStatus::BadFormat),
		};
		children.push(report);
	}

	// an object that names none of the registered members is treated as
	// absent as a whole, never matched positionally
	let status = if !members.is_empty() && children.iter().all(|c| c.status == LoadStatus::Missing) {
		LoadStatus::Missing
	} else {
		LoadStatus::Loaded
	};
	LoadReport::with_children(status, children)
}

fn load_sequence(
	registry: &Registry,
	target: &mut dyn Any,
	shape: &Shape<'_>,
	doc: &Document,
	node: NodeId,
	depth: u32,
	options: &DecodeOptions,
) -> LoadReport {
	if doc.node(node).kind != DataType::Array {
		return LoadReport::leaf(LoadStatus::BadFormat);
	}
	let (Some(handle), Some(element)) = (shape.sequence, shape.members.first()) else {
		return LoadReport::leaf(LoadStatus::BadFormat);
	};

	// descriptor and value disagreeing means the caller passed a target of
	// the wrong container type
	let ids: Vec<NodeId> = doc.node(node).children.clone();
	if !handle.resize(target, ids.len()) {
		return LoadReport::leaf(LoadStatus::BadFormat);
	}

	let mut children = Vec::with_capacity(ids.len());
	for (i, child_node) in ids.into_iter().enumerate() {
		let report = match handle.element_mut(target, i) {
			Some(item) => load_value(registry, item, &Shape::of_member(element), doc, Some(child_node), depth + 1, options),
			None => LoadReport::leaf(LoadStatus::BadFormat),
		};
		children.push(report);
	}

	LoadReport::with_children(LoadStatus::Loaded, children)
}

/// Enums load from a string node through the registered name mapping; an
/// unmapped name reports `Missing` and leaves the target untouched.
fn load_enum(registry: &Registry, target: &mut dyn Any, type_id: TypeId, doc: &Document, node: NodeId) -> LoadReport {
	let Some(desc) = registry.enum_descriptor(type_id) else {
		return LoadReport::leaf(LoadStatus::BadFormat);
	};

	let n = doc.node(node);
	if n.kind != DataType::String {
		return LoadReport::leaf(LoadStatus::BadFormat);
	}

	let Some(raw) = desc.value_of(&n.data) else {
		return LoadReport::leaf(LoadStatus::Missing);
	};
	if desc.write_raw(target, raw) {
		LoadReport::leaf(LoadStatus::Loaded)
	} else {
		LoadReport::leaf(LoadStatus::BadFormat)
	}
}
