/// Parse validation command.
pub mod check;
/// Minimal-form output command.
pub mod minify;
/// Pretty-printing command.
pub mod print;
