use std::any::{Any, TypeId};

use crate::reflect::document::{DataType, Node, escape_json};
use crate::reflect::status::LoadStatus;

/// The fixed set of primitive leaf types the codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Primitive {
	Bool,
	I8,
	U8,
	I16,
	U16,
	I32,
	U32,
	I64,
	U64,
	F32,
	F64,
	Str,
}

/// Classify a type id as one of the supported primitives.
pub(crate) fn primitive_of(id: TypeId) -> Option<Primitive> {
	if id == TypeId::of::<bool>() {
		Some(Primitive::Bool)
	} else if id == TypeId::of::<i8>() {
		Some(Primitive::I8)
	} else if id == TypeId::of::<u8>() {
		Some(Primitive::U8)
	} else if id == TypeId::of::<i16>() {
		Some(Primitive::I16)
	} else if id == TypeId::of::<u16>() {
		Some(Primitive::U16)
	} else if id == TypeId::of::<i32>() {
		Some(Primitive::I32)
	} else if id == TypeId::of::<u32>() {
		Some(Primitive::U32)
	} else if id == TypeId::of::<i64>() {
		Some(Primitive::I64)
	} else if id == TypeId::of::<u64>() {
		Some(Primitive::U64)
	} else if id == TypeId::of::<f32>() {
		Some(Primitive::F32)
	} else if id == TypeId::of::<f64>() {
		Some(Primitive::F64)
	} else if id == TypeId::of::<String>() {
		Some(Primitive::Str)
	} else {
		None
	}
}

/// Whether a type id names a supported primitive.
pub(crate) fn is_primitive(id: TypeId) -> bool {
	primitive_of(id).is_some()
}

/// Render a primitive value as one JSON token. Floats are fixed at six
/// fractional digits; strings come back quoted and escaped. `None` means
/// the value is not one of the supported primitives.
pub(crate) fn format_primitive(value: &dyn Any) -> Option<String> {
	let kind = primitive_of(value.type_id())?;
	let token = match kind {
		Primitive::Bool => value.downcast_ref::<bool>()?.to_string(),
		Primitive::I8 => value.downcast_ref::<i8>()?.to_string(),
		Primitive::U8 => value.downcast_ref::<u8>()?.to_string(),
		Primitive::I16 => value.downcast_ref::<i16>()?.to_string(),
		Primitive::U16 => value.downcast_ref::<u16>()?.to_string(),
		Primitive::I32 => value.downcast_ref::<i32>()?.to_string(),
		Primitive::U32 => value.downcast_ref::<u32>()?.to_string(),
		Primitive::I64 => value.downcast_ref::<i64>()?.to_string(),
		Primitive::U64 => value.downcast_ref::<u64>()?.to_string(),
		Primitive::F32 => format!("{:.6}", value.downcast_ref::<f32>()?),
		Primitive::F64 => format!("{:.6}", value.downcast_ref::<f64>()?),
		Primitive::Str => format!("\"{}\"", escape_json(value.downcast_ref::<String>()?)),
	};
	Some(token)
}

/// Write one document node into a primitive target. Node kind and text
/// must match the target exactly: integers reject fractional number text
/// rather than truncating it.
pub(crate) fn load_primitive(target: &mut dyn Any, node: &Node) -> LoadStatus {
	let Some(kind) = primitive_of((*target).type_id()) else {
		return LoadStatus::BadFormat;
	};

	let loaded = match kind {
		Primitive::Bool => node.kind == DataType::Boolean && set_parsed::<bool>(target, &node.data),
		Primitive::I8 => node.kind == DataType::Number && set_parsed::<i8>(target, &node.data),
		Primitive::U8 => node.kind == DataType::Number && set_parsed::<u8>(target, &node.data),
		Primitive::I16 => node.kind == DataType::Number && set_parsed::<i16>(target, &node.data),
		Primitive::U16 => node.kind == DataType::Number && set_parsed::<u16>(target, &node.data),
		Primitive::I32 => node.kind == DataType::Number && set_parsed::<i32>(target, &node.data),
		Primitive::U32 => node.kind == DataType::Number && set_parsed::<u32>(target, &node.data),
		Primitive::I64 => node.kind == DataType::Number && set_parsed::<i64>(target, &node.data),
		Primitive::U64 => node.kind == DataType::Number && set_parsed::<u64>(target, &node.data),
		Primitive::F32 => node.kind == DataType::Number && set_parsed::<f32>(target, &node.data),
		Primitive::F64 => node.kind == DataType::Number && set_parsed::<f64>(target, &node.data),
		Primitive::Str => {
			if node.kind != DataType::String {
				false
			} else if let Some(slot) = target.downcast_mut::<String>() {
				slot.clear();
				slot.push_str(&node.data);
				true
			} else {
				false
			}
		}
	};

	if loaded { LoadStatus::Loaded } else { LoadStatus::BadFormat }
}

fn set_parsed<T: std::str::FromStr + 'static>(target: &mut dyn Any, text: &str) -> bool {
	match (target.downcast_mut::<T>(), text.parse::<T>()) {
		(Some(slot), Ok(value)) => {
			*slot = value;
			true
		}
		_ => false,
	}
}
