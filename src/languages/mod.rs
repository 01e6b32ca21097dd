//! Language registry: the set of languages the platform can translate
//! between, and the metadata the routing core needs about each one.
//!
//! Languages fall in two groups:
//!
//! - regular languages, served directly by the general-purpose model
//! - "native" (low-resource) languages, served by a dedicated model and
//!   bridged through the pivot language for unsupported pairs
//!
//! The registry is an immutable value built at startup and shared by
//! reference. Codes follow the FLORES convention (e.g. `spa_Latn`).

mod registry;

pub use registry::{Language, LanguageRegistry};
