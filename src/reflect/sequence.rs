use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

/// Type-erased operations over a contiguous, resizable, homogeneous
/// container. One implementation exists per element type; the walk selects
/// it through the registered descriptor instead of knowing the element type
/// at the call site.
///
/// Every operation is fallible: handing a value of the wrong container type
/// returns `None`/`false` so the caller can degrade to a bad-format status.
pub trait SequenceOps {
	/// Number of elements currently stored.
	fn len(&self, seq: &dyn Any) -> Option<usize>;
	/// Borrow the element at `index`.
	fn element<'a>(&self, seq: &'a dyn Any, index: usize) -> Option<&'a dyn Any>;
	/// Mutably borrow the element at `index`.
	fn element_mut<'a>(&self, seq: &'a mut dyn Any, index: usize) -> Option<&'a mut dyn Any>;
	/// Reserve capacity for `additional` more elements.
	fn reserve(&self, seq: &mut dyn Any, additional: usize) -> bool;
	/// Grow or shrink the container to exactly `len` elements, filling new
	/// slots with the element default.
	fn resize(&self, seq: &mut dyn Any, len: usize) -> bool;
}

/// Shared handle to a sequence adapter, cloned into descriptor snapshots.
pub type SequenceHandle = Arc<dyn SequenceOps + Send + Sync>;

/// Adapter for `Vec<T>`.
pub(crate) struct VecOps<T> {
	marker: PhantomData<fn() -> T>,
}

impl<T> VecOps<T> {
	pub(crate) fn new() -> Self {
		Self { marker: PhantomData }
	}
}

impl<T: Default + 'static> SequenceOps for VecOps<T> {
	fn len(&self, seq: &dyn Any) -> Option<usize> {
		seq.downcast_ref::<Vec<T>>().map(Vec::len)
	}

	fn element<'a>(&self, seq: &'a dyn Any, index: usize) -> Option<&'a dyn Any> {
		seq.downcast_ref::<Vec<T>>()?.get(index).map(|item| item as &dyn Any)
	}

	fn element_mut<'a>(&self, seq: &'a mut dyn Any, index: usize) -> Option<&'a mut dyn Any> {
		seq.downcast_mut::<Vec<T>>()?.get_mut(index).map(|item| item as &mut dyn Any)
	}

	fn reserve(&self, seq: &mut dyn Any, additional: usize) -> bool {
		match seq.downcast_mut::<Vec<T>>() {
			Some(vec) => {
				vec.reserve(additional);
				true
			}
			None => false,
		}
	}

	fn resize(&self, seq: &mut dyn Any, len: usize) -> bool {
		match seq.downcast_mut::<Vec<T>>() {
			Some(vec) => {
				vec.resize_with(len, T::default);
				true
			}
			None => false,
		}
	}
}
