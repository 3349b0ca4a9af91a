//! Page templates keyed by decoded marker payload.
//!
//! A template describes where the page lies relative to the printed
//! marker, in *marker units*: the marker itself is the unit square with
//! its top-left corner at the origin, x along the marker's top edge and y
//! along its left edge.
//!
//! The table is an immutable value built once at startup (from the
//! built-in layouts or a JSON file) and shared with the matcher.

mod builtins;
mod matcher;
mod table;
mod template;

pub use builtins::builtin_templates;
pub use matcher::TemplateMatcher;
pub use table::{TemplateIoError, TemplateTable};
pub use template::{PageExtent, PageTemplate, TemplateError};
