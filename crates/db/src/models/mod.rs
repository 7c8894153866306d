//! Row structs mirroring the schema, plus conversions into domain types.

pub mod playlist;
pub mod screen;
