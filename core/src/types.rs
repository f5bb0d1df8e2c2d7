//! Domain value objects reported by the del.icio.us API.
//!
//! # Design
//! Both types are produced only by response parsing and are plain immutable
//! values. Field order mirrors document order: parsers never sort or
//! deduplicate, so equality in tests is positional.

/// A named, ordered grouping of tag names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub name: String,
    pub tags: Vec<String>,
}

/// A tag name with its usage count, as reported by the tag listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub count: u32,
}
