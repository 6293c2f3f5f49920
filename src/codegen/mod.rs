//! Code Generation
//!
//! Emits schema definitions from a metamodel. The emitters only read the
//! validated data model; they never see raw JSON.
//!
//! - [`names`]: transliteration of free-text names into identifiers
//! - [`protobuf`]: proto3 emitter

pub mod names;
pub mod protobuf;

pub use names::format_field_name;
pub use protobuf::{proto_type, ProtobufGenerator};
