use super::*;

#[test]
fn test_factory_resolves_builtins_and_aliases() {
    for name in BUILTIN_DIALECTS {
        let dialect = create_dialect(name).unwrap();
        assert_eq!(dialect.name(), name);
    }
    assert_eq!(create_dialect("cl").unwrap().name(), "opencl");
    assert_eq!(create_dialect("msl").unwrap().name(), "metal");
    assert!(create_dialect("hip").is_none());
}

#[test]
fn test_file_extensions() {
    let exts: Vec<String> = BUILTIN_DIALECTS
        .iter()
        .map(|n| create_dialect(n).unwrap().file_extension().to_string())
        .collect();
    assert_eq!(exts, vec![".cpp", ".cu", ".cl", ".metal"]);
}

#[test]
fn test_builtin_axis_parsing() {
    assert_eq!(builtin_axis("inner_id0"), Some(("inner_id", 0)));
    assert_eq!(builtin_axis("outer_dim2"), Some(("outer_dim", 2)));
    assert_eq!(builtin_axis("inner_id3"), None);
    assert_eq!(builtin_axis("thread0"), None);
    assert_eq!(builtin_axis(""), None);
    assert_eq!(builtin_axis("é"), None);
}

#[test]
fn test_builtin_identifiers_per_target() {
    let spelled = |target: &str, name: &str| {
        create_dialect(target)
            .unwrap()
            .identifier(name)
            .into_owned()
    };
    assert_eq!(spelled("cuda", "inner_id1"), "threadIdx.y");
    assert_eq!(spelled("cuda", "outer_dim0"), "gridDim.x");
    assert_eq!(spelled("cuda", "barrier"), "__syncthreads");
    assert_eq!(spelled("opencl", "outer_id2"), "get_group_id(2)");
    assert_eq!(spelled("metal", "inner_dim0"), "group_size.x");
    assert_eq!(spelled("serial", "inner_id0"), "_inner_id0");
    assert_eq!(spelled("opencl", "barrier"), "barrier");
}

#[test]
fn test_plain_identifiers_are_borrowed() {
    let cuda = CudaDialect::new();
    assert!(matches!(cuda.identifier("count"), Cow::Borrowed("count")));
}

#[test]
fn test_qualifier_spellings() {
    let cuda = CudaDialect::new();
    let cl = OpenClDialect::new();
    let metal = MetalDialect::new();
    assert_eq!(cuda.qualifier(Qualifier::Shared), Some("__shared__"));
    assert_eq!(cl.qualifier(Qualifier::Global), Some("__global"));
    assert_eq!(metal.qualifier(Qualifier::Global), Some("device"));
    assert_eq!(metal.qualifier(Qualifier::Restrict), None);
    assert_eq!(SerialDialect::new().qualifier(Qualifier::Shared), None);
}

#[test]
fn test_function_prefixes() {
    assert_eq!(
        CudaDialect::new().function_prefix(FunctionKind::Kernel),
        Some("extern \"C\" __global__")
    );
    assert_eq!(
        CudaDialect::new().function_prefix(FunctionKind::Device),
        Some("__device__")
    );
    assert_eq!(OpenClDialect::new().function_prefix(FunctionKind::Device), None);
    assert_eq!(MetalDialect::new().function_prefix(FunctionKind::Kernel), Some("kernel"));
}

#[test]
fn test_omp_pragmas_dropped_on_devices() {
    assert_eq!(SerialDialect::new().pragma("omp parallel"), Some("omp parallel".into()));
    assert_eq!(CudaDialect::new().pragma("omp parallel"), None);
    assert_eq!(CudaDialect::new().pragma("unroll 4"), Some("unroll 4".into()));
}

#[test]
fn test_styles() {
    assert_eq!(SerialDialect::new().style(), &Style::spaces(2));
    let metal = MetalDialect::new();
    assert!(metal.style().brace_on_new_line);
    assert!(!metal.style().cuddle_else);
    assert!(!OpenClDialect::new().style().cuddle_else);
    assert!(!OpenClDialect::new().supports_namespaces());
}

#[test]
fn test_spelling_view_forwards() {
    let cuda = CudaDialect::new();
    let sp = DialectSpelling(&cuda);
    assert_eq!(Spelling::identifier(&sp, "inner_id2"), "threadIdx.z");
    assert_eq!(Spelling::qualifier(&sp, Qualifier::Restrict), Some("__restrict__"));
}
