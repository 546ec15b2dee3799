/// Outcome of loading one field during a decode walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
	/// Initial state; never observed in a finished report.
	#[default]
	NotYetLoaded,
	/// The field was present, well-typed, and written.
	Loaded,
	/// The field was absent from the document.
	Missing,
	/// The field was present but its node kind or text did not match.
	BadFormat,
	/// Recursion stopped at the configured nesting ceiling.
	MaxNestDepthExceeded,
}

/// Per-field decode outcome tree, mirroring the shape of the decoded value.
///
/// A decode call always completes and returns a full report even when some
/// fields fail; the caller decides whether partial success is acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
	/// Outcome for this field.
	pub status: LoadStatus,
	/// Outcomes for nested members (structs) or elements (sequences).
	pub children: Vec<LoadReport>,
}

impl LoadReport {
	/// Leaf report with no nested outcomes.
	pub fn leaf(status: LoadStatus) -> Self {
		Self {
			status,
			children: Vec::new(),
		}
	}

	/// Report for a composite with per-child outcomes.
	pub fn with_children(status: LoadStatus, children: Vec<LoadReport>) -> Self {
		Self { status, children }
	}

	/// Nested report by member or element position.
	pub fn child(&self, index: usize) -> Option<&LoadReport> {
		self.children.get(index)
	}

	/// Whether this field and everything beneath it loaded.
	pub fn ok(&self) -> bool {
		self.status == LoadStatus::Loaded && self.children.iter().all(LoadReport::ok)
	}
}

#[cfg(test)]
mod tests {
	use super::{LoadReport, LoadStatus};

	#[test]
	fn ok_requires_every_level_loaded() {
		let good = LoadReport::with_children(
			LoadStatus::Loaded,
			vec![LoadReport::leaf(LoadStatus::Loaded), LoadReport::leaf(LoadStatus::Loaded)],
		);
		assert!(good.ok());

		let partial = LoadReport::with_children(
			LoadStatus::Loaded,
			vec![LoadReport::leaf(LoadStatus::Loaded), LoadReport::leaf(LoadStatus::Missing)],
		);
		assert!(!partial.ok());
		assert_eq!(partial.child(1).map(|r| r.status), Some(LoadStatus::Missing));
	}
}
