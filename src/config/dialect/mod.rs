//! Dialect override files.
//!
//! A TOML file derives a new dialect from a built-in one:
//!
//! ```toml
//! [dialect]
//! name = "cuda-wide"
//! extends = "cuda"
//!
//! [style]
//! indent = 4
//! brace_on_new_line = true
//!
//! [qualifiers]
//! restrict = "__restrict"
//!
//! [identifiers]
//! inner_id0 = "tid.x"
//!
//! [pragmas]
//! drop = ["unroll"]
//! ```


use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::dialect::{create_dialect, Dialect, Style, BUILTIN_DIALECTS};
use crate::syntax::{FunctionKind, Qualifier};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read dialect config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
    #[error("invalid dialect name '{0}'")]
    InvalidName(String),
    #[error("unknown base dialect '{0}'")]
    UnknownBase(String),
    #[error("unknown qualifier '{0}' in [qualifiers]")]
    UnknownQualifier(String),
}

impl ConfigError {
    /// Suggestion shown under the error.
    pub fn help(&self) -> Option<String> {
        match self {
            ConfigError::UnknownBase(_) => Some(format!(
                "built-in dialects: {}",
                BUILTIN_DIALECTS.join(", ")
            )),
            ConfigError::UnknownQualifier(_) => Some(
                "qualifiers: const, volatile, restrict, global, shared, constant".to_string(),
            ),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectConfig {
    pub dialect: DialectSection,
    #[serde(default)]
    pub style: StyleSection,
    #[serde(default)]
    pub qualifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub identifiers: BTreeMap<String, String>,
    #[serde(default)]
    pub pragmas: PragmaSection,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DialectSection {
    pub name: String,
    pub extends: String,
    pub extension: Option<String>,
    pub namespaces: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StyleSection {
    /// Indent width in spaces.
    pub indent: Option<usize>,
    /// Indent with one tab per level; wins over `indent`.
    #[serde(default)]
    pub tabs: bool,
    pub brace_on_new_line: Option<bool>,
    pub cuddle_else: Option<bool>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PragmaSection {
    /// Pragmas starting with any of these words are dropped.
    #[serde(default)]
    pub drop: Vec<String>,
}

impl DialectConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })?;
        validate_name(&config.dialect.name)?;
        Ok(config)
    }

    /// Resolve the base dialect and apply the overrides.
    pub fn build(self) -> Result<ConfiguredDialect, ConfigError> {
        let base = create_dialect(&self.dialect.extends)
            .ok_or_else(|| ConfigError::UnknownBase(self.dialect.extends.clone()))?;

        let mut qualifiers = HashMap::new();
        for (key, spelling) in self.qualifiers {
            let q = parse_qualifier(&key).ok_or(ConfigError::UnknownQualifier(key))?;
            qualifiers.insert(q, spelling);
        }

        let mut style = base.style().clone();
        if self.style.tabs {
            style.indent = "\t".to_string();
        } else if let Some(width) = self.style.indent {
            style.indent = " ".repeat(width);
        }
        if let Some(brace) = self.style.brace_on_new_line {
            style.brace_on_new_line = brace;
        }
        if let Some(cuddle) = self.style.cuddle_else {
            style.cuddle_else = cuddle;
        }

        debug!(
            name = %self.dialect.name,
            extends = base.name(),
            identifiers = self.identifiers.len(),
            "configured dialect"
        );
        Ok(ConfiguredDialect {
            base,
            name: self.dialect.name,
            extension: self.dialect.extension,
            namespaces: self.dialect.namespaces,
            style,
            qualifiers,
            identifiers: self.identifiers.into_iter().collect(),
            dropped_pragmas: self.pragmas.drop,
        })
    }
}

/// Names end up in output file names.
fn validate_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty()
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
        || name.starts_with('.')
    {
        return Err(ConfigError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn parse_qualifier(key: &str) -> Option<Qualifier> {
    Some(match key {
        "const" => Qualifier::Const,
        "volatile" => Qualifier::Volatile,
        "restrict" => Qualifier::Restrict,
        "global" => Qualifier::Global,
        "shared" => Qualifier::Shared,
        "constant" => Qualifier::Constant,
        _ => return None,
    })
}

/// A built-in dialect with file-provided overrides layered on top.
pub struct ConfiguredDialect {
    base: Box<dyn Dialect>,
    name: String,
    extension: Option<String>,
    namespaces: Option<bool>,
    style: Style,
    /// An empty spelling drops the qualifier.
    qualifiers: HashMap<Qualifier, String>,
    identifiers: HashMap<String, String>,
    dropped_pragmas: Vec<String>,
}

impl ConfiguredDialect {
    pub fn base(&self) -> &dyn Dialect {
        self.base.as_ref()
    }
}

impl Dialect for ConfiguredDialect {
    fn name(&self) -> &str {
        &self.name
    }

    fn file_extension(&self) -> &str {
        match &self.extension {
            Some(ext) => ext.as_str(),
            None => self.base.file_extension(),
        }
    }

    fn style(&self) -> &Style {
        &self.style
    }

    fn qualifier(&self, q: Qualifier) -> Option<&str> {
        match self.qualifiers.get(&q) {
            Some(spelled) if spelled.is_empty() => None,
            Some(spelled) => Some(spelled.as_str()),
            None => self.base.qualifier(q),
        }
    }

    fn function_prefix(&self, kind: FunctionKind) -> Option<&str> {
        self.base.function_prefix(kind)
    }

    fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self.identifiers.get(name) {
            Some(mapped) => Cow::Owned(mapped.clone()),
            None => self.base.identifier(name),
        }
    }

    fn type_name<'a>(&self, name: &'a str) -> Cow<'a, str> {
        self.base.type_name(name)
    }

    fn pragma(&self, text: &str) -> Option<String> {
        let first = text.split_whitespace().next().unwrap_or("");
        if self.dropped_pragmas.iter().any(|p| p == first) {
            return None;
        }
        self.base.pragma(text)
    }

    fn supports_namespaces(&self) -> bool {
        self.namespaces
            .unwrap_or_else(|| self.base.supports_namespaces())
    }

    fn prelude(&self) -> Option<&str> {
        self.base.prelude()
    }
}

/// Resolve a `--target` argument: a built-in name or a path to a `.toml`
/// override file.
pub fn resolve_dialect(target: &str) -> Result<Box<dyn Dialect>, ConfigError> {
    if target.ends_with(".toml") {
        let config = DialectConfig::load(Path::new(target))?;
        return Ok(Box::new(config.build()?));
    }
    create_dialect(target).ok_or_else(|| ConfigError::UnknownBase(target.to_string()))
}
