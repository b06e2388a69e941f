//! OpenCL C (`.cl`). No namespaces; builtins are work-item functions.

use std::borrow::Cow;

use super::{builtin_axis, Dialect, Style};
use crate::syntax::{FunctionKind, Qualifier};

pub struct OpenClDialect {
    style: Style,
}

impl OpenClDialect {
    pub fn new() -> Self {
        Self {
            style: Style::spaces(4).uncuddled(),
        }
    }
}

impl Default for OpenClDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for OpenClDialect {
    fn name(&self) -> &str {
        "opencl"
    }

    fn file_extension(&self) -> &str {
        ".cl"
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn qualifier(&self, q: Qualifier) -> Option<&str> {
        match q {
            Qualifier::Const => Some("const"),
            Qualifier::Volatile => Some("volatile"),
            Qualifier::Restrict => Some("restrict"),
            Qualifier::Global => Some("__global"),
            Qualifier::Shared => Some("__local"),
            Qualifier::Constant => Some("__constant"),
        }
    }

    fn function_prefix(&self, kind: FunctionKind) -> Option<&str> {
        match kind {
            FunctionKind::Kernel => Some("__kernel"),
            FunctionKind::Device | FunctionKind::Plain => None,
        }
    }

    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match builtin_axis(name) {
            Some((family, axis)) => {
                let func = match family {
                    "inner_id" => "get_local_id",
                    "outer_id" => "get_group_id",
                    "inner_dim" => "get_local_size",
                    _ => "get_num_groups",
                };
                Cow::Owned(format!("{}({})", func, axis))
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

    fn supports_namespaces(&self) -> bool {
        false
    }
}
