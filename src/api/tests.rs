use super::*;
use crate::dialect::create_dialect;
use crate::syntax::{BinOp, Expr, Token, Type, VarDecl};
use crate::tree::{StatementTree, Stmt};

fn dialects(names: &[&str]) -> Vec<Box<dyn Dialect>> {
    names.iter().map(|n| create_dialect(n).unwrap()).collect()
}

/// for (int i = 0; i < 10; i = i + 1) { x = x + 1; }
fn for_tree() -> StatementTree {
    let mut tree = StatementTree::new();
    let root = tree.root();
    let init = tree
        .add(Stmt::Declaration(vec![
            VarDecl::new("i", Type::named("int")).with_init(Expr::literal("0"))
        ]))
        .unwrap();
    let test = tree
        .expr(Expr::binary(BinOp::Lt, Expr::ident("i"), Expr::literal("10")))
        .unwrap();
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

#[test]
fn test_outputs_follow_request_order() {
    let tree = for_tree();
    let compiled = compile_targets(
        &tree,
        &dialects(&["metal", "serial", "cuda", "opencl"]),
        &CompileOptions::default(),
    )
    .unwrap();
    let names: Vec<&str> = compiled.outputs.iter().map(|o| o.target.as_str()).collect();
    assert_eq!(names, vec!["metal", "serial", "cuda", "opencl"]);
    assert!(compiled.warnings.is_empty());
}

#[test]
fn test_every_target_fingerprints_like_the_source() {
    let tree = for_tree();
    let compiled = compile_targets(
        &tree,
        &dialects(&["serial", "cuda"]),
        &CompileOptions::default(),
    )
    .unwrap();
    let [a, b] = compiled.outputs.as_slice() else {
        panic!("expected two outputs");
    };
    assert_eq!(a.fingerprint, b.fingerprint);
    assert_eq!(a.fingerprint, crate::hash::fingerprint(&tree, tree.root()));
    assert_eq!(a.source, "for (int i = 0; i < 10; i = i + 1) {\n  x = x + 1;\n}\n");
    assert_eq!(a.source, b.source);
    assert_eq!((a.extension.as_str(), b.extension.as_str()), (".cpp", ".cu"));
}

#[test]
fn test_prelude_toggle() {
    let tree = for_tree();
    let metal = dialects(&["metal"]);
    let with = compile_targets(&tree, &metal, &CompileOptions::default()).unwrap();
    let without = compile_targets(
        &tree,
        &metal,
        &CompileOptions {
            prelude: false,
            ..CompileOptions::default()
        },
    )
    .unwrap();
    assert!(with.outputs[0].source.starts_with("#include <metal_stdlib>"));
    assert!(without.outputs[0].source.starts_with("for ("));
}

#[test]
fn test_validation_errors_abort() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    tree.push(root, Stmt::GotoLabel(Token::ident("l"))).unwrap();
    tree.push(root, Stmt::GotoLabel(Token::ident("l"))).unwrap();

    let errors = compile_targets(&tree, &dialects(&["cuda"]), &CompileOptions::default())
        .unwrap_err();
    assert_eq!(errors.len(), 1);

    let skipped = compile_targets(
        &tree,
        &dialects(&["cuda"]),
        &CompileOptions {
            validate: false,
            ..CompileOptions::default()
        },
    )
    .unwrap();
    assert_eq!(skipped.outputs[0].source, "l:\nl:\n");
}

#[test]
fn test_warnings_are_returned() {
    let mut tree = StatementTree::new();
    let root = tree.root();
    tree.push(root, Stmt::Goto(Token::ident("nowhere"))).unwrap();
    let compiled = compile_targets(&tree, &dialects(&["serial"]), &CompileOptions::default())
        .unwrap();
    assert_eq!(compiled.warnings.len(), 1);
    assert_eq!(compiled.outputs.len(), 1);
}

#[test]
fn test_source_tree_untouched() {
    let tree = for_tree();
    let before = tree.len();
    compile_targets(&tree, &dialects(&["cuda", "metal"]), &CompileOptions::default()).unwrap();
    assert_eq!(tree.len(), before);
}

#[test]
fn test_resolve_dialects_collects_every_error() {
    let targets = vec!["cuda".to_string(), "hip".to_string(), "vk".to_string()];
    let errors = resolve_dialects(&targets).err().unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].message.contains("hip"));
}

#[test]
fn test_compile_kernel_file_uses_file_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("saxpy.json");
    std::fs::write(&path, r#"{ "statements": [ "break" ] }"#).unwrap();
    let (name, compiled) = compile_kernel_file(
        &path,
        &["opencl".to_string()],
        &CompileOptions::default(),
    )
    .unwrap();
    assert_eq!(name, "saxpy");
    assert_eq!(compiled.outputs[0].source, "break;\n");
}
