//! Assembly renderers.

mod intrinsics;
mod json;

pub use json::{JsonRenderer, MANIFEST_FILE, template_file};
