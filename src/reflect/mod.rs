//! Runtime type registry and JSON codec.
//!
//! Types register their structure (members, element types, enum name
//! mappings) once at startup; [`encode`] and [`decode`] then walk any
//! registered value generically, so adding a field to a registered struct
//! needs one extra registration line and no per-type codec code.

mod decode;
mod document;
mod encode;
mod error;
mod parser;
mod primitive;
mod registry;
mod sequence;
mod status;

/// Decode walk entry points and options.
pub use decode::{DecodeOptions, decode, decode_with_options};
/// Parsed document model and string escaping helper.
pub use document::{DataType, Document, Node, NodeId, escape_json};
/// Encode walk entry points and formatting flags.
pub use encode::{FormatFlags, encode, encode_to_string};
/// Error and result aliases.
pub use error::{Error, ParseError, ParseErrorKind, Result};
/// JSON text parsing entry points and token classifiers.
pub use parser::{is_boolean, is_null, is_number, parse, parse_with_capacity};
/// Type registry and descriptor types.
pub use registry::{CompositeKind, EnumDescriptor, MemberDescriptor, Registry, TypeDescriptor};
/// Type-erased sequence adapter trait and handle.
pub use sequence::{SequenceHandle, SequenceOps};
/// Per-field decode outcome types.
pub use status::{LoadReport, LoadStatus};
