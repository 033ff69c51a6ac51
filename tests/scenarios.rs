use bashlint::{
    ast2command, ast2template, ast2tokens, bash_parser, fill_default_value, get_utilities,
    paren_parser, ArgType, Ast, LinearizeError, NodeKind, Policy, PolicyError,
};

#[test]
fn find_with_exec_normalizes_and_templates() {
    let ast = bash_parser("find . -name \"*.txt\" -exec rm {} \\;", true);
    let find = ast.children(ast.root())[0];
    assert_eq!(ast.node(find).kind, NodeKind::Utility);
    assert_eq!(ast.node(find).value, "find");

    let options: Vec<&str> = ast
        .children(find)
        .iter()
        .map(|c| ast.node(*c))
        .filter(|n| n.kind == NodeKind::Option)
        .map(|n| n.value.as_str())
        .collect();
    assert_eq!(options, vec!["-name", "-exec::;"]);

    let name = ast.children(find)[1];
    let pattern = ast.node(ast.children(name)[0]);
    assert_eq!(pattern.arg_type, Some(ArgType::Regex));

    let template = ast2template(&ast, ast.root(), &Policy::preset("template").unwrap()).unwrap();
    assert!(template.starts_with("find -exec"));
    assert!(template.find("-exec").unwrap() < template.find("-name").unwrap());
    assert!(template.contains("\\;"));
    assert!(template.contains("-name Regex"));
}

#[test]
fn pipeline_round_trips_through_serializer() {
    let ast = bash_parser("ls -la | grep foo", true);
    let pipeline = ast.children(ast.root())[0];
    assert_eq!(ast.node(pipeline).kind, NodeKind::Pipeline);
    let ls = ast.children(pipeline)[0];
    let grep = ast.children(pipeline)[1];
    assert_eq!(ast.children(ls).len(), 2);
    assert_eq!(ast.node(ast.children(grep)[0]).value, "foo");

    let text = ast2command(&ast, ast.root(), &Policy::default()).unwrap();
    assert_eq!(text, "ls -l -a | grep foo");
    assert_eq!(bash_parser(&text, true), ast);
}

#[test]
fn empty_pipeline_emits_separator_when_loose() {
    let mut ast = Ast::new();
    let pipe = ast.add_child(ast.root(), NodeKind::Pipeline, "|");
    let loose = Policy::preset("loose").unwrap();
    assert_eq!(ast2tokens(&ast, pipe, &loose).unwrap(), vec!["|"]);

    let err = ast2tokens(&ast, pipe, &Policy::default()).unwrap_err();
    assert!(matches!(err, LinearizeError::ArityViolation { found: 0, .. }));
}

#[test]
fn fill_head_number_default() {
    let mut ast = Ast::new();
    let head = ast.add_child(ast.root(), NodeKind::Utility, "head");
    let n = ast.add_child(head, NodeKind::Option, "-n");
    let arg = ast.add_argument(n, "Number", ArgType::Number);
    let root = ast.root();
    fill_default_value(&mut ast, root);
    assert_eq!(ast.node(arg).value, "10");
}

#[test]
fn utilities_collected_through_exec() {
    let ast = bash_parser("find . -name foo -exec grep bar \\;", true);
    let names: Vec<String> = get_utilities(&ast, ast.root()).into_iter().collect();
    assert_eq!(names, vec!["find", "grep"]);
}

#[test]
fn paren_expression_groups() {
    let ast = paren_parser("( and ( b ) ( a ) )");
    let root = ast.root();
    assert_eq!(ast.node(ast.children(root)[0]).value, "and");
    let first_group = ast.children(root)[1];
    assert_eq!(ast.node(ast.children(first_group)[0]).value, "a");
}

#[test]
fn policy_conflicts_rejected_at_construction() {
    let err = Policy::from_toml_str("keep_common_args = true").unwrap_err();
    assert!(matches!(err, PolicyError::Conflict(_)));
    let err = Policy::from_toml_str("with_parent = true\nwith_prefix = true").unwrap_err();
    assert!(matches!(err, PolicyError::Conflict(_)));
    let err = Policy::from_toml_str("bogus = true").unwrap_err();
    assert!(matches!(err, PolicyError::Config(_)));
    assert!(matches!(Policy::preset("fast"), Err(PolicyError::UnknownPreset(_))));

    let policy = Policy::from_toml_str("arg_type_only = true\nkeep_common_args = true").unwrap();
    assert!(policy.keep_common_args());
    assert!(policy.recover_quotation());
}
