use std::fmt;

/// Stable discriminant of a statement variant.
///
/// Values are part of the fingerprint format and must never be reordered;
/// new variants take the next free number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum StmtKind {
    Block = 0,
    Pragma = 1,
    Function = 2,
    FunctionDecl = 3,
    ClassAccess = 4,
    Expression = 5,
    Declaration = 6,
    Goto = 7,
    GotoLabel = 8,
    Namespace = 9,
    If = 10,
    Elif = 11,
    Else = 12,
    For = 13,
    While = 14,
    Switch = 15,
    Case = 16,
    Default = 17,
    Continue = 18,
    Break = 19,
    Return = 20,
}

impl StmtKind {
    pub const ALL: [StmtKind; 21] = [
        StmtKind::Block,
        StmtKind::Pragma,
        StmtKind::Function,
        StmtKind::FunctionDecl,
        StmtKind::ClassAccess,
        StmtKind::Expression,
        StmtKind::Declaration,
        StmtKind::Goto,
        StmtKind::GotoLabel,
        StmtKind::Namespace,
        StmtKind::If,
        StmtKind::Elif,
        StmtKind::Else,
        StmtKind::For,
        StmtKind::While,
        StmtKind::Switch,
        StmtKind::Case,
        StmtKind::Default,
        StmtKind::Continue,
        StmtKind::Break,
        StmtKind::Return,
    ];

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    /// Variants that own a child sequence and a scope.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            StmtKind::Block
                | StmtKind::FunctionDecl
                | StmtKind::Namespace
                | StmtKind::If
                | StmtKind::Elif
                | StmtKind::Else
                | StmtKind::For
                | StmtKind::While
                | StmtKind::Switch
        )
    }

    /// Variants that delimit a goto-label region.
    pub fn is_label_region(self) -> bool {
        matches!(self, StmtKind::FunctionDecl)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StmtKind::Block => "block",
            StmtKind::Pragma => "pragma",
            StmtKind::Function => "function",
            StmtKind::FunctionDecl => "function-declaration",
            StmtKind::ClassAccess => "class-access",
            StmtKind::Expression => "expression",
            StmtKind::Declaration => "declaration",
            StmtKind::Goto => "goto",
            StmtKind::GotoLabel => "goto-label",
            StmtKind::Namespace => "namespace",
            StmtKind::If => "if",
            StmtKind::Elif => "elif",
            StmtKind::Else => "else",
            StmtKind::For => "for",
            StmtKind::While => "while",
            StmtKind::Switch => "switch",
            StmtKind::Case => "case",
            StmtKind::Default => "default",
            StmtKind::Continue => "continue",
            StmtKind::Break => "break",
            StmtKind::Return => "return",
        }
    }
}

impl fmt::Display for StmtKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
