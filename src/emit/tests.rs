use super::*;
use crate::dialect::{create_dialect, CudaDialect, MetalDialect, OpenClDialect, SerialDialect, Style};
use crate::syntax::{
    BinOp, Expr, FunctionKind, FunctionSig, Qualifier, Token, Type, UnaryOp, VarDecl,
};
use crate::tree::{Access, Stmt};

fn assign(target: &str, value: &str) -> Stmt {
    Stmt::Expression(Expr::assign(Expr::ident(target), Expr::literal(value)))
}

fn cmp(op: BinOp, lhs: &str, rhs: &str) -> Expr {
    Expr::binary(op, Expr::ident(lhs), Expr::literal(rhs))
}

/// if (x < 0) y = 1; elif (x == 0) y = 2; elif (x == 1) y = 3; else y = 4;
fn if_chain() -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let c = tree.expr(cmp(BinOp::Lt, "x", "0")).unwrap();
    let iff = tree.push(root, Stmt::if_(c)).unwrap();
    tree.push(iff, assign("y", "1")).unwrap();
    for (value, body) in [("0", "2"), ("1", "3")] {
        let c = tree.expr(cmp(BinOp::Eq, "x", value)).unwrap();
        let e = tree.add(Stmt::elif(c)).unwrap();
        tree.add_elif(iff, e).unwrap();
        tree.push(e, assign("y", body)).unwrap();
    }
    let e = tree.add(Stmt::else_()).unwrap();
    tree.set_else(iff, e).unwrap();
    tree.push(e, assign("y", "4")).unwrap();
    tree
}

/// for (int i = 0; i < 10; i = i + 1) { x = x + 1; }
fn for_loop() -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let init = tree
        .add(Stmt::Declaration(vec![
            VarDecl::new("i", Type::named("int")).with_init(Expr::literal("0"))
        ]))
        .unwrap();
    let test = tree.expr(cmp(BinOp::Lt, "i", "10")).unwrap();
    let update = tree
        .expr(Expr::assign(
            Expr::ident("i"),
            Expr::binary(BinOp::Add, Expr::ident("i"), Expr::literal("1")),
        ))
        .unwrap();
    let f = tree
        .push(root, Stmt::for_(Some(init), Some(test), Some(update)))
        .unwrap();
    tree.declare(f, "i", init).unwrap();
    tree.push(
        f,
        Stmt::Expression(Expr::assign(
            Expr::ident("x"),
            Expr::binary(BinOp::Add, Expr::ident("x"), Expr::literal("1")),
        )),
    )
    .unwrap();
    tree
}

fn program(tree: &StatementTree, dialect: &dyn Dialect) -> String {
    emit(tree, tree.root(), dialect)
}

// --- Control flow ---

#[test]
fn test_if_chain_cuddled() {
    let tree = if_chain();
    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "if (x < 0) {\n  y = 1;\n} else if (x == 0) {\n  y = 2;\n} else if (x == 1) {\n  y = 3;\n} else {\n  y = 4;\n}\n"
    );
}

#[test]
fn test_if_chain_uncuddled() {
    let tree = if_chain();
    assert_eq!(
        program(&tree, &OpenClDialect::new()),
        "if (x < 0) {\n    y = 1;\n}\nelse if (x == 0) {\n    y = 2;\n}\nelse if (x == 1) {\n    y = 3;\n}\nelse {\n    y = 4;\n}\n"
    );
}

#[test]
fn test_if_chain_allman() {
    let tree = if_chain();
    let out = program(&tree, &MetalDialect::new());
    assert!(out.starts_with("if (x < 0)\n{\n    y = 1;\n}\nelse if (x == 0)\n{\n"));
    assert!(out.ends_with("else\n{\n    y = 4;\n}\n"));
}

#[test]
fn test_elif_order_follows_attachment() {
    let out = program(&if_chain(), &SerialDialect::new());
    let first = out.find("x == 0").unwrap();
    let second = out.find("x == 1").unwrap();
    let last = out.find("else {").unwrap();
    assert!(first < second && second < last);
}

#[test]
fn test_for_loop_header() {
    let tree = for_loop();
    assert_eq!(
        program(&tree, &CudaDialect::new()),
        "for (int i = 0; i < 10; i = i + 1) {\n  x = x + 1;\n}\n"
    );
}

#[test]
fn test_for_loop_empty_slots() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let f = tree.push(root, Stmt::for_(None, None, None)).unwrap();
    tree.push(f, Stmt::Break).unwrap();
    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "for (;;) {\n  break;\n}\n"
    );

    let mut tree = StatementTree::new();
    let root = tree.root();
    let test = tree.expr(cmp(BinOp::Lt, "i", "n")).unwrap();
    tree.push(root, Stmt::for_(None, Some(test), None)).unwrap();
    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "for (; i < n;) {\n}\n"
    );
}

#[test]
fn test_for_loop_from_two_clones_two_dialects() {
    let source = for_loop();
    let a = source.fork().unwrap();
    let b = source.fork().unwrap();

    let cuda = program(&a, &CudaDialect::new());
    let metal = program(&b, &MetalDialect::new());
    assert_ne!(cuda, metal);
    assert_eq!(
        metal,
        "for (int i = 0; i < 10; i = i + 1)\n{\n    x = x + 1;\n}\n"
    );

    assert_eq!(a.kinds(a.root()), source.kinds(source.root()));
    assert_eq!(b.kinds(b.root()), a.kinds(a.root()));
    assert_eq!(a.len(), b.len());

    // Same statements, different surface: identical once whitespace and
    // braces are normalized away.
    let squash = |s: &str| s.split_whitespace().collect::<String>();
    assert_eq!(squash(&cuda), squash(&metal));
}

#[test]
fn test_while_and_do_while() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let c = tree.expr(cmp(BinOp::Lt, "i", "n")).unwrap();
    let w = tree.push(root, Stmt::do_while(c)).unwrap();
    tree.push(
        w,
        Stmt::Expression(Expr::unary(UnaryOp::PostInc, Expr::ident("i"))),
    )
    .unwrap();
    let c = tree.expr(Expr::ident("busy")).unwrap();
    tree.push(root, Stmt::while_(c)).unwrap();

    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "do {\n  i++;\n} while (i < n);\nwhile (busy) {\n}\n"
    );
    assert_eq!(
        program(&tree, &MetalDialect::new()),
        "do\n{\n    i++;\n}\nwhile (i < n);\nwhile (busy)\n{\n}\n"
    );
}

#[test]
fn test_switch_passes_duplicate_cases_through() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let c = tree.expr(Expr::ident("v")).unwrap();
    let sw = tree.push(root, Stmt::switch(c)).unwrap();
    for callee in ["a", "b"] {
        tree.push(sw, Stmt::Case(Expr::literal("1"))).unwrap();
        tree.push(sw, Stmt::Expression(Expr::call(callee, vec![]))).unwrap();
        tree.push(sw, Stmt::Break).unwrap();
    }
    tree.push(sw, Stmt::Default).unwrap();
    tree.push(sw, Stmt::Expression(Expr::call("c", vec![]))).unwrap();

    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "switch (v) {\ncase 1:\n  a();\n  break;\ncase 1:\n  b();\n  break;\ndefault:\n  c();\n}\n"
    );
}

// --- Functions, labels, namespaces ---

fn scale_kernel() -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let sig = FunctionSig::kernel("scale")
        .with_param(VarDecl::new("n", Type::named("int")))
        .with_param(VarDecl::new(
            "x",
            Type::named("float")
                .pointer_to()
                .with(Qualifier::Restrict),
        ));
    let f = tree.push(root, Stmt::function_decl(sig)).unwrap();
    tree.push(
        f,
        Stmt::Declaration(vec![
            VarDecl::new("i", Type::named("int")).with_init(Expr::ident("inner_id0"))
        ]),
    )
    .unwrap();
    let c = tree.expr(Expr::binary(BinOp::Lt, Expr::ident("i"), Expr::ident("n"))).unwrap();
    let iff = tree.push(f, Stmt::if_(c)).unwrap();
    let elem = Expr::index(Expr::ident("x"), Expr::ident("i"));
    tree.push(
        iff,
        Stmt::Expression(Expr::assign(
            elem.clone(),
            Expr::binary(BinOp::Mul, elem, Expr::literal("2")),
        )),
    )
    .unwrap();
    tree
}

#[test]
fn test_kernel_cuda() {
    let tree = scale_kernel();
    assert_eq!(
        program(&tree, &CudaDialect::new()),
        "extern \"C\" __global__ void scale(int n, float *__restrict__ x) {\n  int i = threadIdx.x;\n  if (i < n) {\n    x[i] = x[i] * 2;\n  }\n}\n"
    );
}

#[test]
fn test_kernel_opencl() {
    let tree = scale_kernel();
    assert_eq!(
        program(&tree, &OpenClDialect::new()),
        "__kernel void scale(int n, float *restrict x) {\n    int i = get_local_id(0);\n    if (i < n) {\n        x[i] = x[i] * 2;\n    }\n}\n"
    );
}

#[test]
fn test_prelude_only_for_programs() {
    let tree = scale_kernel();
    let metal = MetalDialect::new();
    let full = emit_program(&tree, &metal);
    assert!(full.starts_with("#include <metal_stdlib>\nusing namespace metal;\n\nkernel void scale("));
    assert!(!program(&tree, &metal).contains("#include"));
}

#[test]
fn test_labels_outdented() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let f = tree
        .push(root, Stmt::function_decl(FunctionSig::new("f", Type::named("void"))))
        .unwrap();
    tree.push(f, Stmt::Goto(Token::ident("done"))).unwrap();
    tree.push(f, Stmt::GotoLabel(Token::ident("done"))).unwrap();
    tree.push(f, Stmt::Return(None)).unwrap();
    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "void f() {\n  goto done;\ndone:\n  return;\n}\n"
    );
}

#[test]
fn test_class_access_and_return_value() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let ns = tree.push(root, Stmt::namespace("detail")).unwrap();
    tree.push(ns, Stmt::ClassAccess(Access::Private)).unwrap();
    let mut sig = FunctionSig::new("one", Type::named("int"));
    sig.kind = FunctionKind::Device;
    let f = tree.push(ns, Stmt::function_decl(sig)).unwrap();
    tree.push(f, Stmt::Return(Some(Expr::literal("1")))).unwrap();
    assert_eq!(
        program(&tree, &CudaDialect::new()),
        "namespace detail {\nprivate:\n  __device__ int one() {\n    return 1;\n  }\n}\n"
    );
}

#[test]
fn test_namespace_flattened_and_pragmas_filtered() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    tree.push(root, Stmt::Pragma(Token::pragma(" omp parallel for"))).unwrap();
    tree.push(root, Stmt::Pragma(Token::pragma("unroll"))).unwrap();
    let ns = tree.push(root, Stmt::namespace("util")).unwrap();
    let sig = FunctionSig::new("clamp", Type::named("int"))
        .with_param(VarDecl::new("v", Type::named("int")));
    tree.push(ns, Stmt::Function(sig)).unwrap();

    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "#pragma omp parallel for\n#pragma unroll\nnamespace util {\n  int clamp(int v);\n}\n"
    );
    assert_eq!(
        program(&tree, &OpenClDialect::new()),
        "#pragma unroll\nint clamp(int v);\n"
    );
}

// --- Declarations and qualifiers ---

#[test]
fn test_declaration_groups_shared_base() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    tree.push(
        root,
        Stmt::Declaration(vec![
            VarDecl::new("a", Type::named("int")).with_init(Expr::literal("0")),
            VarDecl::new("b", Type::named("int").pointer_to()),
            VarDecl::new("c", Type::named("float")),
        ]),
    )
    .unwrap();
    assert_eq!(
        program(&tree, &SerialDialect::new()),
        "int a = 0, *b; float c;\n"
    );
}

#[test]
fn test_shared_memory_spelling() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    tree.push(
        root,
        Stmt::Declaration(vec![VarDecl::new("tile", Type::named("float").with(Qualifier::Shared))
            .with_dim(Expr::literal("16"))]),
    )
    .unwrap();
    let spelled: Vec<String> = ["serial", "cuda", "opencl", "metal"]
        .iter()
        .map(|name| {
            let dialect = create_dialect(name).unwrap();
            program(&tree, dialect.as_ref())
        })
        .collect();
    assert_eq!(
        spelled,
        vec![
            "float tile[16];\n",
            "__shared__ float tile[16];\n",
            "__local float tile[16];\n",
            "threadgroup float tile[16];\n",
        ]
    );
}

// --- Structure ---

#[test]
fn test_nested_block_and_subtree_emit() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let outer = tree.push(root, Stmt::block()).unwrap();
    let inner = tree.push(outer, Stmt::block()).unwrap();
    tree.push(inner, Stmt::Continue).unwrap();
    let serial = SerialDialect::new();
    assert_eq!(program(&tree, &serial), "{\n  {\n    continue;\n  }\n}\n");
    assert_eq!(emit(&tree, inner, &serial), "{\n  continue;\n}\n");
}

#[test]
fn test_emit_leaves_tree_untouched() {
    let tree = if_chain();
    let before = tree.preorder(tree.root());
    let first = program(&tree, &SerialDialect::new());
    let second = program(&tree, &SerialDialect::new());
    assert_eq!(first, second);
    assert_eq!(tree.preorder(tree.root()), before);
}

#[test]
fn test_unknown_statement_emits_nothing() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let gone = tree.push(root, Stmt::Break).unwrap();
    tree.remove(gone).unwrap();
    assert_eq!(emit(&tree, gone, &SerialDialect::new()), "");
}

struct Flat(Style);

impl Dialect for Flat {
    fn name(&self) -> &str {
        "flat"
    }

    fn file_extension(&self) -> &str {
        ".c"
    }

    fn style(&self) -> &Style {
        &self.0
    }

    fn qualifier(&self, _q: Qualifier) -> Option<&str> {
        None
    }

    fn function_prefix(&self, _kind: FunctionKind) -> Option<&str> {
        None
    }
}

#[test]
fn test_deep_nesting_uses_heap_stack() {
    const DEPTH: usize = 100_000;
    let mut tree = StatementTree::new();
    // Built inside-out so every append sees a parentless owner.
    let mut inner = tree.add(Stmt::Break).unwrap();
    for _ in 0..DEPTH {
        let outer = tree.add(Stmt::block()).unwrap();
        tree.append(outer, inner).unwrap();
        inner = outer;
    }
    let root = tree.root();
    tree.append(root, inner).unwrap();

    let out = program(&tree, &Flat(Style::spaces(0)));
    assert_eq!(out.lines().count(), 2 * DEPTH + 1);
    assert_eq!(out.lines().nth(DEPTH), Some("break;"));
}

#[test]
fn test_indent_restored_after_nested_blocks() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let a = tree.push(root, Stmt::block()).unwrap();
    let b = tree.push(a, Stmt::block()).unwrap();
    tree.push(b, Stmt::GotoLabel(Token::ident("l"))).unwrap();
    tree.push(b, Stmt::Break).unwrap();
    tree.push(a, Stmt::Continue).unwrap();
    tree.push(root, Stmt::GotoLabel(Token::ident("top"))).unwrap();

    assert_eq!(
        program(&tree, &Flat(Style::spaces(3))),
        "{\n   {\n   l:\n      break;\n   }\n   continue;\n}\ntop:\n"
    );
}

#[test]
fn test_deep_nesting_indents_once_per_level() {
    const DEPTH: usize = 2_000;
    let mut tree = StatementTree::new();
    let mut inner = tree.add(Stmt::Break).unwrap();
    for _ in 0..DEPTH {
        let outer = tree.add(Stmt::block()).unwrap();
        tree.append(outer, inner).unwrap();
        inner = outer;
    }
    let root = tree.root();
    tree.append(root, inner).unwrap();

    let out = program(&tree, &Flat(Style::spaces(1)));
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2 * DEPTH + 1);
    assert_eq!(lines[DEPTH], format!("{}break;", " ".repeat(DEPTH)));
    assert_eq!(lines[DEPTH + 1], format!("{}}}", " ".repeat(DEPTH - 1)));
    assert_eq!(lines[2 * DEPTH], "}");
}
