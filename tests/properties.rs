use bashlint::linearizer::{abstract_arguments, ast2list, ast2tokens, Order};
use bashlint::parser::{list2ast, normalize_ast};
use bashlint::policy::{Policy, PolicyFlags};
use bashlint::serializer::ast2command;
use bashlint::NodeKind;
use proptest::prelude::*;
use proptest::sample::{select, subsequence};

const MAX_INPUT_BYTES: usize = 128;

fn words(flags: Vec<&str>) -> String {
    flags.iter().map(|f| format!(" {}", f)).collect()
}

fn ls_command() -> impl Strategy<Value = String> {
    (
        subsequence(vec!["-l", "-a", "-r", "-t", "-h"], 0..=5).prop_shuffle(),
        select(vec!["", " /tmp", " src", " ."]),
    )
        .prop_map(|(flags, path)| format!("ls{}{}", words(flags), path))
}

fn grep_command() -> impl Strategy<Value = String> {
    (
        subsequence(vec!["-i", "-v", "-n", "-c", "-w"], 0..=3).prop_shuffle(),
        select(vec!["foo", "'a b'", "\"*.rs\"", "^main", "\"-v\"", "'--'", "-e foo -e bar", "-e bar -e foo"]),
        select(vec!["", " log.txt", " src/lib.rs"]),
    )
        .prop_map(|(flags, pattern, file)| format!("grep{} {}{}", words(flags), pattern, file))
}

fn sort_command() -> impl Strategy<Value = String> {
    subsequence(vec!["-r", "-n", "-u"], 0..=3)
        .prop_shuffle()
        .prop_map(|flags| format!("sort{}", words(flags)))
}

fn head_command() -> impl Strategy<Value = String> {
    (select(vec!["head", "tail"]), 1u32..500).prop_map(|(name, n)| format!("{} -n {}", name, n))
}

fn find_command() -> impl Strategy<Value = String> {
    (
        select(vec![".", "/var/log", "~"]),
        select(vec!["", " -name '*.log'", " -iname foo"]),
        select(vec!["", " -type f", " -size +10k", " -mtime -7"]),
        select(vec![
            "",
            " -exec rm {} \\;",
            " -exec grep -l foo {} +",
            " -exec echo \"+\" {} \\;",
            " -print",
        ]),
    )
        .prop_map(|(dir, name, filter, action)| format!("find {}{}{}{}", dir, name, filter, action))
}

fn simple_command() -> impl Strategy<Value = String> {
    prop_oneof![
        ls_command(),
        grep_command(),
        sort_command(),
        head_command(),
        find_command(),
    ]
}

fn pipeline() -> impl Strategy<Value = String> {
    proptest::collection::vec(simple_command(), 1..=3).prop_map(|cmds| cmds.join(" | "))
}

/// The same flag set in two different orders.
fn permuted_flags() -> impl Strategy<Value = (Vec<&'static str>, Vec<&'static str>)> {
    subsequence(vec!["-l", "-a", "-r", "-t", "-h", "-S"], 0..=6)
        .prop_flat_map(|flags| (Just(flags.clone()), Just(flags).prop_shuffle()))
}

proptest! {
    #[test]
    fn sentinel_sequence_decodes_to_same_tree(cmd in pipeline()) {
        let ast = normalize_ast(&cmd, true);
        let list = ast2list(&ast, ast.root(), Order::Dfs, &Policy::default()).unwrap();
        let decoded = list2ast(&list);
        prop_assert_eq!(decoded, ast, "sequence: {:?}", list);
    }

    #[test]
    fn serialized_command_is_a_fixed_point(cmd in pipeline()) {
        let policy = Policy::default();
        let ast = normalize_ast(&cmd, true);
        let text = ast2command(&ast, ast.root(), &policy).unwrap();
        let again = normalize_ast(&text, true);
        prop_assert_eq!(again, ast, "{} -> {}", cmd, text);
    }

    #[test]
    fn flag_order_does_not_change_sorted_tokens((a, b) in permuted_flags(), path in select(vec!["", " /tmp"])) {
        let policy = Policy::default().with_ignore_flag_order(true);
        let left = normalize_ast(&format!("ls{}{}", words(a), path), true);
        let right = normalize_ast(&format!("ls{}{}", words(b), path), true);
        prop_assert_eq!(
            ast2tokens(&left, left.root(), &policy).unwrap(),
            ast2tokens(&right, right.root(), &policy).unwrap()
        );
        prop_assert!(left.isomorphic(&right, true));
    }

    #[test]
    fn repeated_flag_order_does_not_change_sorted_tokens(
        patterns in subsequence(vec!["foo", "bar", "'a b'", "\"-n\""], 2..=4),
    ) {
        let policy = Policy::default().with_ignore_flag_order(true);
        let forward: String = patterns.iter().map(|p| format!(" -e {}", p)).collect();
        let backward: String = patterns.iter().rev().map(|p| format!(" -e {}", p)).collect();
        let left = normalize_ast(&format!("grep{} f", forward), true);
        let right = normalize_ast(&format!("grep{} f", backward), true);
        prop_assert_eq!(
            ast2tokens(&left, left.root(), &policy).unwrap(),
            ast2tokens(&right, right.root(), &policy).unwrap()
        );
        prop_assert!(left.isomorphic(&right, true));
    }

    #[test]
    fn argument_abstraction_is_idempotent(cmd in pipeline(), keep_common in any::<bool>()) {
        let policy = Policy::new(PolicyFlags {
            arg_type_only: true,
            keep_common_args: keep_common,
            ..Default::default()
        })
        .unwrap();
        let mut ast = normalize_ast(&cmd, true);
        let once = ast2tokens(&ast, ast.root(), &policy).unwrap();
        abstract_arguments(&mut ast, &policy);
        let abstracted = ast.clone();
        prop_assert_eq!(ast2tokens(&ast, ast.root(), &policy).unwrap(), once);
        abstract_arguments(&mut ast, &policy);
        prop_assert_eq!(ast, abstracted);
    }

    #[test]
    fn single_child_pipeline_is_transparent_when_loose(cmd in simple_command()) {
        let loose = Policy::preset("loose").unwrap();
        let mut ast = normalize_ast(&cmd, true);
        let utility = ast.children(ast.root())[0];
        let pipe = ast.create(NodeKind::Pipeline, "|");
        ast.attach(pipe, utility);
        prop_assert_eq!(
            ast2tokens(&ast, pipe, &loose).unwrap(),
            ast2tokens(&ast, utility, &loose).unwrap()
        );
    }

    #[test]
    fn loose_conversions_accept_any_input(
        bytes in proptest::collection::vec(any::<u8>(), 0..=MAX_INPUT_BYTES)
    ) {
        let input = String::from_utf8_lossy(&bytes).into_owned();
        let loose = Policy::preset("loose").unwrap();
        let ast = normalize_ast(&input, true);
        prop_assert!(ast2tokens(&ast, ast.root(), &loose).is_ok());
        prop_assert!(ast2command(&ast, ast.root(), &loose).is_ok());
        let list = ast2list(&ast, ast.root(), Order::Dfs, &loose).unwrap();
        let _ = list2ast(&list);
    }
}
