use std::sync::Arc;

use serde::Deserialize;

use super::expr::Expr;
use super::token::Token;
use super::Spelling;

/// Storage and address-space qualifiers attached to a declared type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    Const,
    Volatile,
    /// Pointer does not alias (`__restrict__`, `restrict`).
    Restrict,
    /// Device global memory.
    Global,
    /// Work-group / thread-block shared memory.
    Shared,
    /// Read-only constant memory.
    Constant,
}

impl Qualifier {
    /// Qualifiers written after the pointer stars.
    fn is_pointer_qualifier(self) -> bool {
        matches!(self, Qualifier::Restrict)
    }
}

/// A declared type, treated as opaque immutable data by the tree.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Type {
    pub name: Arc<str>,
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    #[serde(default)]
    pub pointers: u8,
}

impl Type {
    pub fn named(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            qualifiers: Vec::new(),
            pointers: 0,
        }
    }

    pub fn pointer_to(mut self) -> Self {
        self.pointers += 1;
        self
    }

    pub fn with(mut self, qualifier: Qualifier) -> Self {
        if !self.qualifiers.contains(&qualifier) {
            self.qualifiers.push(qualifier);
        }
        self
    }

    pub fn has(&self, qualifier: Qualifier) -> bool {
        self.qualifiers.contains(&qualifier)
    }

    /// Qualifiers and base name, without pointer stars.
    pub fn render_base(&self, sp: &dyn Spelling) -> String {
        let mut parts: Vec<String> = self
            .qualifiers
            .iter()
            .filter(|q| !q.is_pointer_qualifier())
            .filter_map(|q| sp.qualifier(*q))
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        parts.push(sp.type_name(&self.name).into_owned());
        parts.join(" ")
    }

    /// Pointer stars plus trailing pointer qualifiers, e.g. `*__restrict__ `.
    fn render_stars(&self, sp: &dyn Spelling) -> String {
        let mut s = "*".repeat(self.pointers as usize);
        if self.pointers > 0 {
            for q in self.qualifiers.iter().filter(|q| q.is_pointer_qualifier()) {
                if let Some(spelled) = sp.qualifier(*q).filter(|s| !s.is_empty()) {
                    s.push_str(spelled);
                    s.push(' ');
                }
            }
        }
        s
    }

    /// Render `type name`, e.g. `const float *__restrict__ a`.
    pub fn render_declarator(&self, name: &str, sp: &dyn Spelling) -> String {
        format!("{} {}{}", self.render_base(sp), self.render_stars(sp), name)
    }

    /// Render the type alone, as in casts and return types.
    pub fn render(&self, sp: &dyn Spelling) -> String {
        let stars = self.render_stars(sp);
        if stars.is_empty() {
            self.render_base(sp)
        } else {
            format!("{} {}", self.render_base(sp), stars.trim_end())
        }
    }
}

/// One entry of a declaration statement: `float tile[16][16] = {0}`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct VarDecl {
    pub name: Token,
    #[serde(rename = "type")]
    pub ty: Type,
    #[serde(default)]
    pub dims: Vec<Expr>,
    #[serde(default)]
    pub init: Option<Expr>,
}

impl VarDecl {
    pub fn new(name: &str, ty: Type) -> Self {
        Self {
            name: Token::ident(name),
            ty,
            dims: Vec::new(),
            init: None,
        }
    }

    pub fn with_init(mut self, init: Expr) -> Self {
        self.init = Some(init);
        self
    }

    pub fn with_dim(mut self, dim: Expr) -> Self {
        self.dims.push(dim);
        self
    }

    /// Everything after the base type: stars, name, dimensions, initializer.
    pub fn render_tail(&self, sp: &dyn Spelling) -> String {
        let mut s = self.ty.render_stars(sp);
        s.push_str(&sp.identifier(self.name.as_str()));
        for dim in &self.dims {
            s.push('[');
            s.push_str(&dim.render(sp));
            s.push(']');
        }
        if let Some(init) = &self.init {
            s.push_str(" = ");
            s.push_str(&init.render(sp));
        }
        s
    }

    /// Full single declaration, e.g. `int i = 0`.
    pub fn render(&self, sp: &dyn Spelling) -> String {
        format!("{} {}", self.ty.render_base(sp), self.render_tail(sp))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Entry point launched from the host.
    Kernel,
    /// Called from device code only.
    Device,
    #[default]
    Plain,
}

/// A function signature: prototypes and definitions share it.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FunctionSig {
    pub name: Token,
    #[serde(default)]
    pub kind: FunctionKind,
    #[serde(rename = "returns")]
    pub return_type: Type,
    #[serde(default)]
    pub params: Vec<VarDecl>,
}

impl FunctionSig {
    pub fn new(name: &str, return_type: Type) -> Self {
        Self {
            name: Token::ident(name),
            kind: FunctionKind::Plain,
            return_type,
            params: Vec::new(),
        }
    }

    pub fn kernel(name: &str) -> Self {
        Self {
            kind: FunctionKind::Kernel,
            ..Self::new(name, Type::named("void"))
        }
    }

    pub fn with_param(mut self, param: VarDecl) -> Self {
        self.params.push(param);
        self
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Render `void add(const float *a, int n)` without qualifiers.
    pub fn render(&self, sp: &dyn Spelling) -> String {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| {
                let mut s = p.ty.render_declarator(&sp.identifier(p.name.as_str()), sp);
                for dim in &p.dims {
                    s.push_str(&format!("[{}]", dim.render(sp)));
                }
                s
            })
            .collect();
        format!(
            "{} {}({})",
            self.return_type.render(sp),
            sp.identifier(self.name()),
            params.join(", ")
        )
    }
}
