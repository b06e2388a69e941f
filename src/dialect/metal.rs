//! Metal Shading Language (`.metal`).
//!
//! Thread coordinates are expected as kernel parameters named
//! `thread_pos`, `group_pos`, `group_size` and `grid_groups`; the launcher
//! binds them with the matching attributes.

use std::borrow::Cow;

use super::{builtin_axis, Dialect, Style, AXES};
use crate::syntax::{FunctionKind, Qualifier};

const PRELUDE: &str = "#include <metal_stdlib>\nusing namespace metal;\n";

pub struct MetalDialect {
    style: Style,
}

impl MetalDialect {
    pub fn new() -> Self {
        Self {
            style: Style::spaces(4).allman(),
        }
    }
}

impl Default for MetalDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for MetalDialect {
    fn name(&self) -> &str {
        "metal"
    }

    fn file_extension(&self) -> &str {
        ".metal"
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn qualifier(&self, q: Qualifier) -> Option<&str> {
        match q {
            Qualifier::Const => Some("const"),
            Qualifier::Volatile => Some("volatile"),
            Qualifier::Restrict => None,
            Qualifier::Global => Some("device"),
            Qualifier::Shared => Some("threadgroup"),
            Qualifier::Constant => Some("constant"),
        }
    }

    fn function_prefix(&self, kind: FunctionKind) -> Option<&str> {
        match kind {
            FunctionKind::Kernel => Some("kernel"),
            FunctionKind::Device | FunctionKind::Plain => None,
        }
    }

    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match builtin_axis(name) {
            Some((family, axis)) => {
                let base = match family {
                    "inner_id" => "thread_pos",
                    "outer_id" => "group_pos",
                    "inner_dim" => "group_size",
                    _ => "grid_groups",
                };
                Cow::Owned(format!("{}.{}", base, AXES[axis]))
            }
            None => Cow::Borrowed(name),
        }
    }

    fn pragma(&self, text: &str) -> Option<String> {
        if text.starts_with("omp") {
            return None;
        }
        Some(text.to_string())
    }

    fn prelude(&self) -> Option<&str> {
        Some(PRELUDE)
    }
}
