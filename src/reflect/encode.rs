use std::any::{Any, TypeId};
use std::io::Write;

use crate::reflect::primitive::{format_primitive, is_primitive};
use crate::reflect::registry::{CompositeKind, MemberDescriptor, Registry, TypeDescriptor};
use crate::reflect::sequence::SequenceHandle;

/// Layout switches for encoded output. Independent and combinable; flags
/// attached to types and members at registration time merge into the flags
/// passed at the call site as the walk descends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
	/// Suppress member names; structs collapse to array form.
	pub no_names: bool,
	/// Collapse output to a single line, keeping spaces.
	pub single_line: bool,
	/// Emit no whitespace at all.
	pub minimal: bool,
}

impl FormatFlags {
	/// Union of two flag sets.
	pub fn merge(self, other: Self) -> Self {
		Self {
			no_names: self.no_names || other.no_names,
			single_line: self.single_line || other.single_line,
			minimal: self.minimal || other.minimal,
		}
	}
}

/// Shape of the value currently being walked: its traversal kind plus the
/// descriptor parts the walk needs.
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

	fn primitive(type_id: TypeId) -> Self {
		Self {
			type_id,
			kind: CompositeKind::None,
			members: &[],
			sequence: None,
		}
	}
}

/// Encode a registered value as JSON text. `name`, when non-empty, becomes
/// the key of the emitted value.
///
/// # Panics
///
/// Panics if `T` is neither a supported primitive nor registered, if a
/// registered sequence value does not match its adapter, or if an
/// unregistered type is reached mid-walk. These are registration bugs, not
/// data errors.
pub fn encode<T: 'static, W: Write>(registry: &Registry, value: &T, out: &mut W, name: &str, flags: FormatFlags) -> std::io::Result<()> {
	let (shape, effective) = resolve_shape::<T>(registry, flags);
	// name suppression at the root follows the call-site flags only;
	// type-level no_names governs the value's own interior
	let name = if flags.no_names { "" } else { name };
	write_value(registry, out, value, name, &shape, effective, 0)
}

/// Encode a registered value into a fresh string.
pub fn encode_to_string<T: 'static>(registry: &Registry, value: &T, name: &str, flags: FormatFlags) -> String {
	let mut buf = Vec::new();
	// Vec<u8> writes cannot fail.
	let _ = encode(registry, value, &mut buf, name, flags);
	String::from_utf8_lossy(&buf).into_owned()
}

fn resolve_shape<T: 'static>(registry: &Registry, flags: FormatFlags) -> (Shape<'_>, FormatFlags) {
	let id = TypeId::of::<T>();

	if registry.enum_descriptor(id).is_some() {
		let shape = Shape {
			type_id: id,
			kind: CompositeKind::Enum,
			members: &[],
			sequence: None,
		};
		return (shape, flags);
	}

	if let Some(desc) = registry.descriptor(id) {
		return (Shape::of_type(desc), flags.merge(desc.flags));
	}

	if is_primitive(id) {
		return (Shape::primitive(id), flags);
	}

	panic!("cannot encode `{}`: type is not registered", std::any::type_name::<T>());
}

fn write_value<W: Write>(
	registry: &Registry,
	out: &mut W,
	value: &dyn Any,
	name: &str,
	shape: &Shape<'_>,
	flags: FormatFlags,
	indent: usize,
) -> std::io::Result<()> {
	write_indent(out, indent, flags)?;

	let named = !name.is_empty();
	if named {
		if flags.minimal {
			write!(out, "\"{}\":", crate::reflect::document::escape_json(name))?;
		} else {
			write!(out, "\"{}\" : ", crate::reflect::document::escape_json(name))?;
		}
	}

	match shape.kind {
		CompositeKind::Enum => write_enum(registry, out, value, shape.type_id),
		CompositeKind::Struct => write_struct(registry, out, value, shape, flags, indent, named),
		CompositeKind::Sequence => write_sequence(registry, out, value, shape, flags, indent, named),
		CompositeKind::None => match format_primitive(value) {
			Some(token) => write!(out, "{token}"),
			None => panic!("cannot encode value: unknown primitive type"),
		},
	}
}

/// Enums render as their mapped name, or the `INVALID_ENUM` sentinel when
/// the value has no mapping. Silent degradation, not a failure.
fn write_enum<W: Write>(registry: &Registry, out: &mut W, value: &dyn Any, type_id: TypeId) -> std::io::Result<()> {
	let mapped = registry
		.enum_descriptor(type_id)
		.and_then(|desc| desc.read_raw(value).and_then(|raw| desc.name_of(raw).map(str::to_owned)));

	match mapped {
		Some(name) => write!(out, "\"{}\"", crate::reflect::document::escape_json(&name)),
		None => write!(out, "\"INVALID_ENUM\""),
	}
}

fn write_struct<W: Write>(
	registry: &Registry,
	out: &mut W,
	value: &dyn Any,
	shape: &Shape<'_>,
	flags: FormatFlags,
	indent: usize,
	named: bool,
) -> std::io::Result<()> {
	// with names suppressed a struct collapses to array form
	let (open, close) = if flags.no_names { ('[', ']') } else { ('{', '}') };
	let inner = open_container(out, open, flags, indent, named)?;

	for (i, member) in shape.members.iter().enumerate() {
		if i > 0 {
			write_separator(out, flags)?;
		}

		let field = member
			.access
			.get(value)
			.unwrap_or_else(|| panic!("accessor for member `{}` rejected the parent value", member.name));
		// the container's flags decide whether its children carry keys
		let child_name = if flags.no_names { "" } else { member.name.as_str() };
		write_value(registry, out, field, child_name, &Shape::of_member(member), flags.merge(member.flags), inner)?;
	}

	close_container(out, close, flags, indent)
}

fn write_sequence<W: Write>(
	registry: &Registry,
	out: &mut W,
	value: &dyn Any,
	shape: &Shape<'_>,
	flags: FormatFlags,
	indent: usize,
	named: bool,
) -> std::io::Result<()> {
	let handle = shape.sequence.unwrap_or_else(|| panic!("sequence descriptor has no adapter"));
	let count = handle
		.len(value)
		.unwrap_or_else(|| panic!("sequence adapter rejected the container value"));
	let element = shape
		.members
		.first()
		.unwrap_or_else(|| panic!("sequence descriptor has no element member"));

	let inner = open_container(out, '[', flags, indent, named)?;

	for i in 0..count {
		if i > 0 {
			write_separator(out, flags)?;
		}

		let item = handle
			.element(value, i)
			.unwrap_or_else(|| panic!("sequence adapter rejected element {i}"));
		write_value(registry, out, item, "", &Shape::of_member(element), flags.merge(element.flags), inner)?;
	}

	close_container(out, ']', flags, indent)
}

/// Open a container bracket and return the child indent level. In pretty
/// mode the bracket moves to its own line when a key was just printed.
fn open_container<W: Write>(out: &mut W, open: char, flags: FormatFlags, indent: usize, named: bool) -> std::io::Result<usize> {
	if flags.minimal {
		write!(out, "{open}")?;
		Ok(0)
	} else if flags.single_line {
		write!(out, "{open} ")?;
		Ok(0)
	} else {
		if named {
			writeln!(out)?;
			write_indent(out, indent, flags)?;
		}
		writeln!(out, "{open}")?;
		Ok(indent + 1)
	}
}

fn close_container<W: Write>(out: &mut W, close: char, flags: FormatFlags, indent: usize) -> std::io::Result<()> {
	if flags.minimal {
		write!(out, "{close}")
	} else if flags.single_line {
		write!(out, " {close}")
	} else {
		writeln!(out)?;
		write_indent(out, indent, flags)?;
		write!(out, "{close}")
	}
}

fn write_separator<W: Write>(out: &mut W, flags: FormatFlags) -> std::io::Result<()> {
	if flags.minimal {
		write!(out, ",")
	} else if flags.single_line {
		write!(out, ", ")
	} else {
		writeln!(out, ",")
	}
}

fn write_indent<W: Write>(out: &mut W, indent: usize, flags: FormatFlags) -> std::io::Result<()> {
	if flags.minimal || flags.single_line {
		return Ok(());
	}
	for _ in 0..indent {
		write!(out, "\t")?;
	}
	Ok(())
}
