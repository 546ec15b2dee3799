use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use crate::reflect::encode::FormatFlags;
use crate::reflect::primitive::is_primitive;
use crate::reflect::sequence::{SequenceHandle, VecOps};

/// Traversal classification of a registered or referenced type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
	/// Primitive leaf (number, boolean, or string).
	None,
	/// Registered enum with a name/value mapping.
	Enum,
	/// Registered struct with named members.
	Struct,
	/// Registered contiguous homogeneous container.
	Sequence,
}

type GetFn = Arc<dyn for<'a> Fn(&'a dyn Any) -> Option<&'a dyn Any> + Send + Sync>;
type GetMutFn = Arc<dyn for<'a> Fn(&'a mut dyn Any) -> Option<&'a mut dyn Any> + Send + Sync>;

/// Type-erased accessor pair extracting one field from its parent value.
/// Captured from typed functions at registration time; downcast failure
/// yields `None` so the walk can degrade instead of panicking.
#[derive(Clone)]
pub(crate) struct FieldAccess {
	get: GetFn,
	get_mut: GetMutFn,
}

impl FieldAccess {
	fn new<P: 'static, F: 'static>(get: fn(&P) -> &F, get_mut: fn(&mut P) -> &mut F) -> Self {
		let erased_get: GetFn = Arc::new(move |parent: &dyn Any| parent.downcast_ref::<P>().map(|p| get(p) as &dyn Any));
		let erased_get_mut: GetMutFn =
			Arc::new(move |parent: &mut dyn Any| parent.downcast_mut::<P>().map(|p| get_mut(p) as &mut dyn Any));
		Self {
			get: erased_get,
			get_mut: erased_get_mut,
		}
	}

	/// Accessor that returns the value itself; used for sequence elements,
	/// where the adapter already produced the element reference.
	fn identity() -> Self {
		let get: GetFn = Arc::new(|value: &dyn Any| Some(value));
		let get_mut: GetMutFn = Arc::new(|value: &mut dyn Any| Some(value));
		Self { get, get_mut }
	}

	pub(crate) fn get<'a>(&self, parent: &'a dyn Any) -> Option<&'a dyn Any> {
		(self.get)(parent)
	}

	pub(crate) fn get_mut<'a>(&self, parent: &'a mut dyn Any) -> Option<&'a mut dyn Any> {
		(self.get_mut)(parent)
	}
}

/// Description of one struct member or sequence element.
///
/// `members` is a deep snapshot of the referenced type's descriptor taken
/// at registration time; re-registering the referenced type later does not
/// retroactively change parents composed before that.
#[derive(Clone)]
pub struct MemberDescriptor {
	/// Field name, used as the JSON key.
	pub name: String,
	/// Type id of the member's value type.
	pub type_id: TypeId,
	/// Traversal classification of the member's value type.
	pub kind: CompositeKind,
	/// Formatting flags attached at registration, merged during encode.
	pub flags: FormatFlags,
	/// Snapshot of the referenced type's own members.
	pub members: Vec<MemberDescriptor>,
	pub(crate) sequence: Option<SequenceHandle>,
	pub(crate) access: FieldAccess,
}

/// Description of one registered struct or sequence type.
#[derive(Clone)]
pub struct TypeDescriptor {
	/// Name the type was registered under.
	pub name: String,
	/// The registered type's id.
	pub type_id: TypeId,
	/// `Struct` or `Sequence`.
	pub kind: CompositeKind,
	/// Formatting flags attached at registration.
	pub flags: FormatFlags,
	/// Struct members in registration order; for a sequence, exactly one
	/// entry describing the element type.
	pub members: Vec<MemberDescriptor>,
	pub(crate) sequence: Option<SequenceHandle>,
}

type EnumReadFn = Arc<dyn Fn(&dyn Any) -> Option<i32> + Send + Sync>;
type EnumWriteFn = Arc<dyn Fn(&mut dyn Any, i32) -> bool + Send + Sync>;

/// Description of one registered enum: a bidirectional name/value mapping
/// plus get/set bridges between the native value and its `i32` raw.
#[derive(Clone)]
pub struct EnumDescriptor {
	/// Name the enum was registered under.
	pub name: String,
	/// The registered enum's type id.
	pub type_id: TypeId,
	by_name: HashMap<String, i32>,
	by_value: HashMap<i32, String>,
	read: EnumReadFn,
	write: EnumWriteFn,
}

impl EnumDescriptor {
	/// Raw value for a registered member name.
	pub fn value_of(&self, name: &str) -> Option<i32> {
		self.by_name.get(name).copied()
	}

	/// Registered member name for a raw value.
	pub fn name_of(&self, value: i32) -> Option<&str> {
		self.by_value.get(&value).map(String::as_str)
	}

	/// Number of registered members.
	pub fn len(&self) -> usize {
		self.by_name.len()
	}

	/// Whether no members have been registered yet.
	pub fn is_empty(&self) -> bool {
		self.by_name.is_empty()
	}

	pub(crate) fn read_raw(&self, value: &dyn Any) -> Option<i32> {
		(self.read)(value)
	}

	pub(crate) fn write_raw(&self, target: &mut dyn Any, raw: i32) -> bool {
		(self.write)(target, raw)
	}
}

/// Process-scoped table mapping type ids to structural descriptors.
///
/// Registration mistakes (duplicate types or member names, unregistered
/// member types, empty names) are programmer errors and panic loudly; they
/// reflect a registration bug, not untrusted input. The registry has no
/// internal locking: callers sharing one across threads must serialize
/// access themselves.
#[derive(Default)]
pub struct Registry {
	structs: HashMap<TypeId, TypeDescriptor>,
	enums: HashMap<TypeId, EnumDescriptor>,
}

impl Registry {
	/// Empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Declare a struct type. Members are appended afterwards with
	/// [`Registry::register_member`].
	pub fn register_struct<T: 'static>(&mut self, name: &str, flags: FormatFlags) -> TypeId {
		let id = TypeId::of::<T>();
		self.check_new_type(id, name);

		self.structs.insert(
			id,
			TypeDescriptor {
				name: name.to_owned(),
				type_id: id,
				kind: CompositeKind::Struct,
				flags,
				members: Vec::new(),
				sequence: None,
			},
		);
		id
	}

	/// Declare `Vec<T>` as a sequence type. Allocates the type-erased
	/// adapter for element type `T` and snapshots `T`'s descriptor as the
	/// single element member, so `T` (if composite) must be registered
	/// first.
	pub fn register_sequence<T: Default + 'static>(&mut self, name: &str, flags: FormatFlags) -> TypeId {
		let id = TypeId::of::<Vec<T>>();
		self.check_new_type(id, name);

		let element = self.describe::<T>("element", FieldAccess::identity(), FormatFlags::default());
		let handle: SequenceHandle = Arc::new(VecOps::<T>::new());

		self.structs.insert(
			id,
			TypeDescriptor {
				name: name.to_owned(),
				type_id: id,
				kind: CompositeKind::Sequence,
				flags,
				members: vec![element],
				sequence: Some(handle),
			},
		);
		id
	}

	/// Declare an enum type. `read` and `write` bridge the native value to
	/// and from its 32-bit raw representation; member names and values are
	/// added with [`Registry::register_enum_value`].
	pub fn register_enum<E: 'static>(&mut self, name: &str, read: fn(&E) -> i32, write: fn(i32) -> Option<E>) -> TypeId {
		let id = TypeId::of::<E>();
		self.check_new_type(id, name);

		let erased_read: EnumReadFn = Arc::new(move |value: &dyn Any| value.downcast_ref::<E>().map(read));
		let erased_write: EnumWriteFn = Arc::new(move |target: &mut dyn Any, raw: i32| {
			match (target.downcast_mut::<E>(), write(raw)) {
				(Some(slot), Some(value)) => {
					*slot = value;
					true
				}
				_ => false,
			}
		});

		self.enums.insert(
			id,
			EnumDescriptor {
				name: name.to_owned(),
				type_id: id,
				by_name: HashMap::new(),
				by_value: HashMap::new(),
				read: erased_read,
				write: erased_write,
			},
		);
		id
	}

	/// Add one name/value pair to a registered enum. Names and values must
	/// each be unique within the enum.
	pub fn register_enum_value<E: 'static>(&mut self, name: &str, value: i32) {
		assert!(!name.is_empty(), "enum member name must not be empty");

		let id = TypeId::of::<E>();
		let Some(desc) = self.enums.get_mut(&id) else {
			panic!("enum type for member `{name}` is not registered");
		};
		assert!(
			!desc.by_name.contains_key(name),
			"enum `{}` already has a member named `{name}`",
			desc.name
		);
		assert!(
			!desc.by_value.contains_key(&value),
			"enum `{}` already has a member with value {value}",
			desc.name
		);

		desc.by_name.insert(name.to_owned(), value);
		desc.by_value.insert(value, name.to_owned());
	}

	/// Append a member to a registered struct. `F` must be a primitive or
	/// an already registered struct, sequence, or enum; if composite, its
	/// descriptor is deep-copied into the parent at this point.
	pub fn register_member<P: 'static, F: 'static>(&mut self, name: &str, get: fn(&P) -> &F, get_mut: fn(&mut P) -> &mut F) {
		self.register_member_with_flags(name, get, get_mut, FormatFlags::default());
	}

	/// [`Registry::register_member`] with per-member formatting flags.
	pub fn register_member_with_flags<P: 'static, F: 'static>(
		&mut self,
		name: &str,
		get: fn(&P) -> &F,
		get_mut: fn(&mut P) -> &mut F,
		flags: FormatFlags,
	) {
		assert!(!name.is_empty(), "member name must not be empty");

		let parent_id = TypeId::of::<P>();
		let parent = self
			.structs
			.get(&parent_id)
			.unwrap_or_else(|| panic!("parent type for member `{name}` is not registered"));
		assert!(
			parent.kind == CompositeKind::Struct,
			"members can only be registered on struct types, `{}` is a sequence",
			parent.name
		);
		assert!(
			parent.members.iter().all(|member| member.name != name),
			"struct `{}` already has a member named `{name}`",
			parent.name
		);

		let member = self.describe::<F>(name, FieldAccess::new(get, get_mut), flags);
		if let Some(parent) = self.structs.get_mut(&parent_id) {
			parent.members.push(member);
		}
	}

	/// Remove one registered type. Descriptors already copied into other
	/// structs are snapshots and remain valid.
	pub fn unregister<T: 'static>(&mut self) {
		let id = TypeId::of::<T>();
		let removed = self.structs.remove(&id).is_some() || self.enums.remove(&id).is_some();
		assert!(removed, "cannot unregister a type that was never registered");
	}

	/// Remove every registered type and adapter.
	pub fn clear(&mut self) {
		self.structs.clear();
		self.enums.clear();
	}

	/// Struct or sequence descriptor by type id.
	pub fn descriptor(&self, id: TypeId) -> Option<&TypeDescriptor> {
		self.structs.get(&id)
	}

	/// Enum descriptor by type id.
	pub fn enum_descriptor(&self, id: TypeId) -> Option<&EnumDescriptor> {
		self.enums.get(&id)
	}

	/// Whether `T` was registered as a struct, sequence, or enum.
	pub fn is_registered<T: 'static>(&self) -> bool {
		let id = TypeId::of::<T>();
		self.structs.contains_key(&id) || self.enums.contains_key(&id)
	}

	fn check_new_type(&self, id: TypeId, name: &str) {
		assert!(!name.is_empty(), "type name must not be empty");
		assert!(
			!self.structs.contains_key(&id) && !self.enums.contains_key(&id),
			"type `{name}` is already registered"
		);
	}

	/// Build a member descriptor for value type `F`, deep-copying the
	/// referenced descriptor when `F` is a registered composite.
	fn describe<F: 'static>(&self, name: &str, access: FieldAccess, flags: FormatFlags) -> MemberDescriptor {
		let id = TypeId::of::<F>();

		if self.enums.contains_key(&id) {
			return MemberDescriptor {
				name: name.to_owned(),
				type_id: id,
				kind: CompositeKind::Enum,
				flags,
				members: Vec::new(),
				sequence: None,
				access,
			};
		}

		if let Some(desc) = self.structs.get(&id) {
			return MemberDescriptor {
				name: name.to_owned(),
				type_id: id,
				kind: desc.kind,
				flags: flags.merge(desc.flags),
				members: desc.members.clone(),
				sequence: desc.sequence.clone(),
				access,
			};
		}

		if is_primitive(id) {
			return MemberDescriptor {
				name: name.to_owned(),
				type_id: id,
				kind: CompositeKind::None,
				flags,
				members: Vec::new(),
				sequence: None,
				access,
			};
		}

		panic!("member `{name}` has a type that is neither primitive nor registered");
	}
}

#[cfg(test)]
mod tests {
	use super::{CompositeKind, Registry};
	use crate::reflect::encode::FormatFlags;
	use std::any::TypeId;

	#[derive(Default)]
	struct Vec3 {
		x: f32,
		y: f32,
		z: f32,
	}

	fn register_vec3(registry: &mut Registry) {
		registry.register_struct::<Vec3>("Vec3", FormatFlags::default());
		registry.register_member::<Vec3, f32>("x", |v| &v.x, |v| &mut v.x);
		registry.register_member::<Vec3, f32>("y", |v| &v.y, |v| &mut v.y);
		registry.register_member::<Vec3, f32>("z", |v| &v.z, |v| &mut v.z);
	}

	#[test]
	fn struct_members_keep_registration_order() {
		let mut registry = Registry::new();
		register_vec3(&mut registry);

		let desc = registry.descriptor(TypeId::of::<Vec3>()).expect("Vec3 registered");
		assert_eq!(desc.kind, CompositeKind::Struct);
		let names: Vec<&str> = desc.members.iter().map(|m| m.name.as_str()).collect();
		assert_eq!(names, ["x", "y", "z"]);
		for member in &desc.members {
			assert_eq!(member.kind, CompositeKind::None);
		}
	}

	#[test]
	fn sequence_descriptor_holds_one_element_member() {
		let mut registry = Registry::new();
		register_vec3(&mut registry);
		registry.register_sequence::<Vec3>("Vec<Vec3>", FormatFlags::default());

		let desc = registry.descriptor(TypeId::of::<Vec<Vec3>>()).expect("sequence registered");
		assert_eq!(desc.kind, CompositeKind::Sequence);
		assert_eq!(desc.members.len(), 1);
		assert_eq!(desc.members[0].kind, CompositeKind::Struct);
		assert_eq!(desc.members[0].members.len(), 3);
		assert!(desc.sequence.is_some());
	}

	#[test]
	fn nested_member_is_a_snapshot() {
		#[derive(Default)]
		struct Holder {
			position: Vec3,
		}

		let mut registry = Registry::new();
		register_vec3(&mut registry);
		registry.register_struct::<Holder>("Holder", FormatFlags::default());
		registry.register_member::<Holder, Vec3>("position", |h| &h.position, |h| &mut h.position);

		// re-register Vec3 with fewer members after composition
		registry.unregister::<Vec3>();
		registry.register_struct::<Vec3>("Vec3", FormatFlags::default());
		registry.register_member::<Vec3, f32>("x", |v| &v.x, |v| &mut v.x);

		let holder = registry.descriptor(TypeId::of::<Holder>()).expect("Holder registered");
		assert_eq!(holder.members[0].members.len(), 3, "snapshot must not follow re-registration");
	}

	#[test]
	fn field_access_reads_and_writes_through_erasure() {
		let mut registry = Registry::new();
		register_vec3(&mut registry);

		let desc = registry.descriptor(TypeId::of::<Vec3>()).expect("Vec3 registered");
		let mut value = Vec3 { x: 1.0, y: 2.0, z: 3.0 };

		let y = desc.members[1].access.get(&value).expect("parent type matches");
		assert_eq!(y.downcast_ref::<f32>(), Some(&2.0));

		let z = desc.members[2].access.get_mut(&mut value).expect("parent type matches");
		*z.downcast_mut::<f32>().expect("f32 field") = 9.0;
		assert_eq!(value.z, 9.0);

		// wrong parent type degrades to None instead of panicking
		assert!(desc.members[0].access.get(&5_u8).is_none());
	}

	#[test]
	fn enum_mapping_is_bidirectional() {
		#[derive(Default, PartialEq, Debug)]
		enum Mode {
			#[default]
			Off,
			On,
		}

		let mut registry = Registry::new();
		registry.register_enum::<Mode>(
			"Mode",
			|mode| match mode {
				Mode::Off => 0,
				Mode::On => 1,
			},
			|raw| match raw {
				0 => Some(Mode::Off),
				1 => Some(Mode::On),
				_ => None,
			},
		);
		registry.register_enum_value::<Mode>("Off", 0);
		registry.register_enum_value::<Mode>("On", 1);

		let desc = registry.enum_descriptor(TypeId::of::<Mode>()).expect("Mode registered");
		assert_eq!(desc.value_of("On"), Some(1));
		assert_eq!(desc.name_of(0), Some("Off"));
		assert_eq!(desc.len(), 2);

		assert_eq!(desc.read_raw(&Mode::On), Some(1));
		let mut target = Mode::Off;
		assert!(desc.write_raw(&mut target, 1));
		assert_eq!(target, Mode::On);
		assert!(!desc.write_raw(&mut target, 7), "unmapped raw value must not write");
	}

	#[test]
	fn unregister_then_reregister_is_allowed() {
		let mut registry = Registry::new();
		register_vec3(&mut registry);
		registry.unregister::<Vec3>();
		assert!(!registry.is_registered::<Vec3>());
		register_vec3(&mut registry);
		assert!(registry.is_registered::<Vec3>());
	}

	#[test]
	fn clear_empties_both_tables() {
		let mut registry = Registry::new();
		register_vec3(&mut registry);
		registry.clear();
		assert!(!registry.is_registered::<Vec3>());
	}

	#[test]
	#[should_panic(expected = "already registered")]
	fn duplicate_type_registration_panics() {
		let mut registry = Registry::new();
		register_vec3(&mut registry);
		registry.register_struct::<Vec3>("Vec3", FormatFlags::default());
	}

	#[test]
	#[should_panic(expected = "already has a member named")]
	fn duplicate_member_name_panics() {
		let mut registry = Registry::new();
		register_vec3(&mut registry);
		registry.register_member::<Vec3, f32>("x", |v| &v.x, |v| &mut v.x);
	}

	#[test]
	#[should_panic(expected = "neither primitive nor registered")]
	fn unregistered_member_type_panics() {
		struct Unknown;
		#[derive(Default)]
		struct Holder {
			field: Option<Unknown>,
		}

		let mut registry = Registry::new();
		registry.register_struct::<Holder>("Holder", FormatFlags::default());
		registry.register_member::<Holder, Option<Unknown>>("field", |h| &h.field, |h| &mut h.field);
	}

	#[test]
	#[should_panic(expected = "is not registered")]
	fn member_on_unregistered_parent_panics() {
		let mut registry = Registry::new();
		registry.register_member::<Vec3, f32>("x", |v| &v.x, |v| &mut v.x);
	}
}
