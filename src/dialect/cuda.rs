//! CUDA C++ (`.cu`).

use std::borrow::Cow;

use super::{builtin_axis, Dialect, Style, AXES};
use crate::syntax::{FunctionKind, Qualifier};

pub struct CudaDialect {
    style: Style,
}

impl CudaDialect {
    pub fn new() -> Self {
        Self {
            style: Style::spaces(2),
        }
    }
}

impl Default for CudaDialect {
    fn default() -> Self {
        Self::new()
    }
}

impl Dialect for CudaDialect {
    fn name(&self) -> &str {
        "cuda"
    }

    fn file_extension(&self) -> &str {
        ".cu"
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn qualifier(&self, q: Qualifier) -> Option<&str> {
        match q {
            Qualifier::Const => Some("const"),
            Qualifier::Volatile => Some("volatile"),
            Qualifier::Restrict => Some("__restrict__"),
            Qualifier::Global => None,
            Qualifier::Shared => Some("__shared__"),
            Qualifier::Constant => Some("__constant__"),
        }
    }

    fn function_prefix(&self, kind: FunctionKind) -> Option<&str> {
        match kind {
            FunctionKind::Kernel => Some("extern \"C\" __global__"),
            FunctionKind::Device => Some("__device__"),
            FunctionKind::Plain => None,
        }
    }

    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if name == "barrier" {
            return Cow::Borrowed("__syncthreads");
        }
        match builtin_axis(name) {
            Some((family, axis)) => {
                let base = match family {
                    "inner_id" => "threadIdx",
                    "outer_id" => "blockIdx",
                    "inner_dim" => "blockDim",
                    _ => "gridDim",
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
}
