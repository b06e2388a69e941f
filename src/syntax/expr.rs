//! Expression trees as seen by the statement tree.
//!
//! Expressions are produced by a separate parser and carried opaquely:
//! statements own them, clone them as a unit and ask them to render
//! themselves. Leaf spellings are shared `Token`s.

use serde::Deserialize;

use super::token::Token;
use super::types::Type;
use super::Spelling;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum BinOp {
    #[serde(rename = "*")]
    Mul,
    #[serde(rename = "/")]
    Div,
    #[serde(rename = "%")]
    Rem,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "<<")]
    Shl,
    #[serde(rename = ">>")]
    Shr,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "&")]
    BitAnd,
    #[serde(rename = "^")]
    BitXor,
    #[serde(rename = "|")]
    BitOr,
    #[serde(rename = "&&")]
    And,
    #[serde(rename = "||")]
    Or,
    #[serde(rename = "=")]
    Assign,
    #[serde(rename = "+=")]
    AddAssign,
    #[serde(rename = "-=")]
    SubAssign,
    #[serde(rename = "*=")]
    MulAssign,
    #[serde(rename = "/=")]
    DivAssign,
}

impl BinOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Rem => "%",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Shl => "<<",
            BinOp::Shr => ">>",
            BinOp::Lt => "<",
            BinOp::Le => "<=",
            BinOp::Gt => ">",
            BinOp::Ge => ">=",
            BinOp::Eq => "==",
            BinOp::Ne => "!=",
            BinOp::BitAnd => "&",
            BinOp::BitXor => "^",
            BinOp::BitOr => "|",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Assign => "=",
            BinOp::AddAssign => "+=",
            BinOp::SubAssign => "-=",
            BinOp::MulAssign => "*=",
            BinOp::DivAssign => "/=",
        }
    }

    /// C precedence level; higher binds tighter.
    pub fn precedence(&self) -> u8 {
        match self {
            BinOp::Mul | BinOp::Div | BinOp::Rem => 10,
            BinOp::Add | BinOp::Sub => 9,
            BinOp::Shl | BinOp::Shr => 8,
            BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => 7,
            BinOp::Eq | BinOp::Ne => 6,
            BinOp::BitAnd => 5,
            BinOp::BitXor => 4,
            BinOp::BitOr => 3,
            BinOp::And => 2,
            BinOp::Or => 1,
            BinOp::Assign
            | BinOp::AddAssign
            | BinOp::SubAssign
            | BinOp::MulAssign
            | BinOp::DivAssign => 0,
        }
    }

    fn is_right_assoc(&self) -> bool {
        self.precedence() == 0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum UnaryOp {
    #[serde(rename = "-")]
    Neg,
    #[serde(rename = "!")]
    Not,
    #[serde(rename = "~")]
    BitNot,
    #[serde(rename = "*")]
    Deref,
    #[serde(rename = "&")]
    AddrOf,
    #[serde(rename = "++")]
    PreInc,
    #[serde(rename = "--")]
    PreDec,
    #[serde(rename = "x++")]
    PostInc,
    #[serde(rename = "x--")]
    PostDec,
}

impl UnaryOp {
    fn is_postfix(&self) -> bool {
        matches!(self, UnaryOp::PostInc | UnaryOp::PostDec)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UnaryOp::Neg => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
            UnaryOp::Deref => "*",
            UnaryOp::AddrOf => "&",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }
}

const PREC_UNARY: u8 = 11;
const PREC_POSTFIX: u8 = 12;

/// An opaque expression root.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Ident(Token),
    Literal(Token),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        #[serde(rename = "else")]
        otherwise: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Member {
        base: Box<Expr>,
        field: Token,
        #[serde(default)]
        arrow: bool,
    },
    Cast {
        #[serde(rename = "type")]
        ty: Type,
        expr: Box<Expr>,
    },
    /// Brace initializer list: `{0, 1, 2}`.
    List(Vec<Expr>),
}

impl Expr {
    pub fn ident(name: &str) -> Self {
        Expr::Ident(Token::ident(name))
    }

    pub fn literal(text: &str) -> Self {
        Expr::Literal(Token::literal(text))
    }

    pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::binary(BinOp::Assign, target, value)
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn call(callee: &str, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(Expr::ident(callee)),
            args,
        }
    }

    pub fn index(base: Expr, index: Expr) -> Self {
        Expr::Index {
            base: Box::new(base),
            index: Box::new(index),
        }
    }

    pub fn member(base: Expr, field: &str) -> Self {
        Expr::Member {
            base: Box::new(base),
            field: Token::ident(field),
            arrow: false,
        }
    }

    fn precedence(&self) -> u8 {
        match self {
            Expr::Ident(_) | Expr::Literal(_) | Expr::List(_) => u8::MAX,
            Expr::Call { .. } | Expr::Index { .. } | Expr::Member { .. } => PREC_POSTFIX,
            Expr::Unary { op, .. } if op.is_postfix() => PREC_POSTFIX,
            Expr::Unary { .. } | Expr::Cast { .. } => PREC_UNARY,
            Expr::Binary { op, .. } => op.precedence(),
            // Below assignment only in the sense that it needs parens inside
            // any binary operand.
            Expr::Ternary { .. } => 0,
        }
    }

    /// Render to a single line, spelling identifiers through `sp`.
    pub fn render(&self, sp: &dyn Spelling) -> String {
        let mut out = String::new();
        self.write(&mut out, sp);
        out
    }

    fn write(&self, out: &mut String, sp: &dyn Spelling) {
        match self {
            Expr::Ident(tok) => out.push_str(&sp.identifier(tok.as_str())),
            Expr::Literal(tok) => out.push_str(tok.as_str()),
            Expr::Unary { op, operand } => {
                if op.is_postfix() {
                    operand.write_operand(out, sp, PREC_POSTFIX, false);
                    out.push_str(op.as_str());
                } else {
                    out.push_str(op.as_str());
                    // `- -x` must not collapse into `--x`
                    if let Expr::Unary { op: inner, .. } = operand.as_ref() {
                        if inner.as_str().starts_with(op.as_str()) {
                            out.push(' ');
                        }
                    }
                    operand.write_operand(out, sp, PREC_UNARY, false);
                }
            }
            Expr::Binary { op, lhs, rhs } => {
                let prec = op.precedence();
                let right_assoc = op.is_right_assoc();
                lhs.write_operand(out, sp, prec, right_assoc);
                out.push(' ');
                out.push_str(op.as_str());
                out.push(' ');
                rhs.write_operand(out, sp, prec, !right_assoc);
            }
            Expr::Ternary {
                cond,
                then,
                otherwise,
            } => {
                cond.write_operand(out, sp, 1, true);
                out.push_str(" ? ");
                then.write(out, sp);
                out.push_str(" : ");
                otherwise.write(out, sp);
            }
            Expr::Call { callee, args } => {
                callee.write_operand(out, sp, PREC_POSTFIX, false);
                out.push('(');
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    arg.write(out, sp);
                }
                out.push(')');
            }
            Expr::Index { base, index } => {
                base.write_operand(out, sp, PREC_POSTFIX, false);
                out.push('[');
                index.write(out, sp);
                out.push(']');
            }
            Expr::Member { base, field, arrow } => {
                base.write_operand(out, sp, PREC_POSTFIX, false);
                out.push_str(if *arrow { "->" } else { "." });
                out.push_str(field.as_str());
            }
            Expr::Cast { ty, expr } => {
                out.push('(');
                out.push_str(&ty.render(sp));
                out.push(')');
                expr.write_operand(out, sp, PREC_UNARY, false);
            }
            Expr::List(items) => {
                out.push('{');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write(out, sp);
                }
                out.push('}');
            }
        }
    }

    /// Write as the operand of an operator with precedence `parent`,
    /// adding parentheses when this expression binds looser. `strict`
    /// also parenthesizes equal precedence (the non-associative side).
    fn write_operand(&self, out: &mut String, sp: &dyn Spelling, parent: u8, strict: bool) {
        let prec = self.precedence();
        if prec < parent || (strict && prec == parent) {
            out.push('(');
            self.write(out, sp);
            out.push(')');
        } else {
            self.write(out, sp);
        }
    }
}
