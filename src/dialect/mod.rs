//! Target dialects: the surface-syntax rules the emitter delegates to.
//!
//! The emitter decides *what* is printed and in which order; a `Dialect`
//! decides *how* it is spelled: layout style, qualifier keywords, function
//! prefixes, builtin identifiers and which pragmas survive.

mod cuda;
mod metal;
mod opencl;
mod serial;

#[cfg(test)]
mod tests;

use std::borrow::Cow;

use crate::syntax::{FunctionKind, Qualifier, Spelling};

pub use cuda::CudaDialect;
pub use metal::MetalDialect;
pub use opencl::OpenClDialect;
pub use serial::SerialDialect;

/// Layout knobs shared by every dialect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Style {
    /// One level of indentation.
    pub indent: String,
    /// Allman braces: `{` on its own line.
    pub brace_on_new_line: bool,
    /// `} else {` on one line instead of `}` / `else {`.
    pub cuddle_else: bool,
}

impl Style {
    pub fn spaces(width: usize) -> Self {
        Self {
            indent: " ".repeat(width),
            brace_on_new_line: false,
            cuddle_else: true,
        }
    }

    pub fn allman(mut self) -> Self {
        self.brace_on_new_line = true;
        self.cuddle_else = false;
        self
    }

    pub fn uncuddled(mut self) -> Self {
        self.cuddle_else = false;
        self
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::spaces(2)
    }
}

/// Spelling rules for one target backend.
pub trait Dialect: Send + Sync {
    /// Target name (e.g. "cuda", "opencl").
    fn name(&self) -> &str;
    /// File extension for emitted source (e.g. ".cu").
    fn file_extension(&self) -> &str;
    fn style(&self) -> &Style;

    /// Qualifier keyword, `None` when the target has no equivalent.
    fn qualifier(&self, q: Qualifier) -> Option<&str>;

    /// Prefix printed before a function signature (`__global__`, ...).
    fn function_prefix(&self, kind: FunctionKind) -> Option<&str>;

    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }

    fn type_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(name)
    }

    /// Translate a pragma body; `None` drops the pragma.
    fn pragma(&self, text: &str) -> Option<String> {
        Some(text.to_string())
    }

    /// Targets without namespaces get namespace bodies inlined.
    fn supports_namespaces(&self) -> bool {
        true
    }

    /// Text emitted once before a whole program.
    fn prelude(&self) -> Option<&str> {
        None
    }
}

/// Leaf renderers see a dialect through the narrow `Spelling` view.
pub struct DialectSpelling<'a>(pub &'a dyn Dialect);

impl Spelling for DialectSpelling<'_> {
    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.0.identifier(name)
    }

    fn type_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.0.type_name(name)
    }

    fn qualifier(&self, q: Qualifier) -> Option<&str> {
        self.0.qualifier(q)
    }
}

/// Names accepted by `create_dialect`.
pub const BUILTIN_DIALECTS: [&str; 4] = ["serial", "cuda", "opencl", "metal"];

/// Create a built-in dialect by target name.
pub fn create_dialect(name: &str) -> Option<Box<dyn Dialect>> {
    match name {
        "serial" | "cpp" | "c++" => Some(Box::new(SerialDialect::new())),
        "cuda" => Some(Box::new(CudaDialect::new())),
        "opencl" | "cl" => Some(Box::new(OpenClDialect::new())),
        "metal" | "msl" => Some(Box::new(MetalDialect::new())),
        _ => None,
    }
}

/// Kernel builtins spelled `inner_id0`, `outer_dim2`, ...: split into the
/// family and axis so each dialect only maps the family.
pub(crate) fn builtin_axis(name: &str) -> Option<(&str, usize)> {
    let axis = match name.as_bytes().last()? {
        b'0' => 0,
        b'1' => 1,
        b'2' => 2,
        _ => return None,
    };
    let family = &name[..name.len() - 1];
    match family {
        "inner_id" | "outer_id" | "inner_dim" | "outer_dim" => Some((family, axis)),
        _ => None,
    }
}

pub(crate) const AXES: [&str; 3] = ["x", "y", "z"];
