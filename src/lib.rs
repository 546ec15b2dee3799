//! Reflective JSON serialization: a runtime type registry plus a JSON text
//! codec that converts registered native values to and from JSON documents
//! without per-type marshalling code.

/// Type registry, JSON parser, document model, and encode/decode walks.
pub mod reflect;
