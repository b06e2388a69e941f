//! Plain C++ for the host CPU. Builtins become loop variables of the
//! surrounding launcher.

use std::borrow::Cow;

use super::{builtin_axis, Dialect, Style};
use crate::syntax::{FunctionKind, Qualifier};

pub struct SerialDialect {
    style: Style,
}

impl SerialDialect {
    pub fn new() -> Self {
        Self {
            style: Style::spaces(2),
        }
    }
}

impl Default for SerialDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for SerialDialect {
    fn name(&self) -> &str {
        "serial"
    }

    fn file_extension(&self) -> &str {
        ".cpp"
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn qualifier(&self, q: Qualifier) -> Option<&str> {
        match q {
            Qualifier::Const => Some("const"),
            Qualifier::Volatile => Some("volatile"),
            Qualifier::Restrict => Some("__restrict__"),
            Qualifier::Global | Qualifier::Shared | Qualifier::Constant => None,
        }
    }

    fn function_prefix(&self, kind: FunctionKind) -> Option<&str> {
        match kind {
            FunctionKind::Kernel => Some("extern \"C\""),
            FunctionKind::Device | FunctionKind::Plain => None,
        }
    }

    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match builtin_axis(name) {
            Some((family, axis)) => Cow::Owned(format!("_{}{}", family, axis)),
            None => Cow::Borrowed(name),
        }
    }
}
