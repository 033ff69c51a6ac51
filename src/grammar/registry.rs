//! Grammar Registry
//!
//! Static knowledge about the utilities the normalizer understands: their
//! options, positional argument types and frequency band. The tables are
//! built once on first use and are read-only afterwards.

use std::collections::{HashMap, HashSet};

use regex_lite::Regex as Pattern;

use crate::grammar::types::{
    ArgType, Associativity, Frequency, OptionSpec, UtilitySpec,
};

use ArgType::*;

/// Separates a display flag from its statement terminator (`-exec::;`).
pub const TERMINATOR_MARKER: &str = "::";

const FIND_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("-name", Regex),
    OptionSpec::value("-iname", Regex),
    OptionSpec::value("-path", Regex),
    OptionSpec::value("-ipath", Regex),
    OptionSpec::value("-regex", Regex),
    OptionSpec::value("-iregex", Regex),
    OptionSpec::value("-wholename", Regex),
    OptionSpec::value("-type", Other),
    OptionSpec::value("-xtype", Other),
    OptionSpec::value("-size", Size),
    OptionSpec::value("-mtime", Timespan),
    OptionSpec::value("-atime", Timespan),
    OptionSpec::value("-ctime", Timespan),
    OptionSpec::value("-mmin", Timespan),
    OptionSpec::value("-amin", Timespan),
    OptionSpec::value("-cmin", Timespan),
    OptionSpec::value("-newer", File),
    OptionSpec::value("-perm", Permission),
    OptionSpec::value("-user", Username),
    OptionSpec::value("-group", Groupname),
    OptionSpec::value("-maxdepth", Number),
    OptionSpec::value("-mindepth", Number),
    OptionSpec::value("-links", Number),
    OptionSpec::value("-inum", Number),
    OptionSpec::value("-printf", Other),
    OptionSpec::value("-fprint", File),
    OptionSpec::value("-newermt", DateTime),
    OptionSpec::flag("-print"),
    OptionSpec::flag("-print0"),
    OptionSpec::flag("-ls"),
    OptionSpec::flag("-delete"),
    OptionSpec::flag("-prune"),
    OptionSpec::flag("-depth"),
    OptionSpec::flag("-empty"),
    OptionSpec::flag("-follow"),
    OptionSpec::flag("-mount"),
    OptionSpec::flag("-xdev"),
    OptionSpec::flag("-quit"),
    OptionSpec::flag("-true"),
    OptionSpec::flag("-false"),
    OptionSpec::flag("-readable"),
    OptionSpec::flag("-writable"),
    OptionSpec::flag("-executable"),
    OptionSpec::flag("-L"),
    OptionSpec::flag("-H"),
    OptionSpec::flag("-P"),
    OptionSpec::command("-exec"),
    OptionSpec::command("-execdir"),
    OptionSpec::command("-ok"),
    OptionSpec::command("-okdir"),
];

const GREP_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-i"),
    OptionSpec::flag("-v"),
    OptionSpec::flag("-r"),
    OptionSpec::flag("-R"),
    OptionSpec::flag("-n"),
    OptionSpec::flag("-l"),
    OptionSpec::flag("-L"),
    OptionSpec::flag("-c"),
    OptionSpec::flag("-w"),
    OptionSpec::flag("-x"),
    OptionSpec::flag("-o"),
    OptionSpec::flag("-q"),
    OptionSpec::flag("-s"),
    OptionSpec::flag("-h"),
    OptionSpec::flag("-H"),
    OptionSpec::flag("-E"),
    OptionSpec::flag("-F"),
    OptionSpec::flag("-P"),
    OptionSpec::flag("-I"),
    OptionSpec::flag("-z"),
    OptionSpec::value("-e", Regex),
    OptionSpec::value("-f", File),
    OptionSpec::value("-m", Number),
    OptionSpec::value("-A", Number),
    OptionSpec::value("-B", Number),
    OptionSpec::value("-C", Number),
    OptionSpec::value("--include", Regex),
    OptionSpec::value("--exclude", Regex),
    OptionSpec::value("--exclude-dir", Regex),
    OptionSpec::value("--color", Other),
    OptionSpec::flag("--recursive"),
    OptionSpec::flag("--ignore-case"),
    OptionSpec::flag("--invert-match"),
    OptionSpec::flag("--count"),
    OptionSpec::flag("--files-with-matches"),
];

const LS_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-a"),
    OptionSpec::flag("-A"),
    OptionSpec::flag("-l"),
    OptionSpec::flag("-h"),
    OptionSpec::flag("-R"),
    OptionSpec::flag("-r"),
    OptionSpec::flag("-t"),
    OptionSpec::flag("-S"),
    OptionSpec::flag("-d"),
    OptionSpec::flag("-1"),
    OptionSpec::flag("-i"),
    OptionSpec::flag("-F"),
    OptionSpec::flag("-s"),
    OptionSpec::flag("-u"),
    OptionSpec::value("--sort", Other),
    OptionSpec::value("--color", Other),
];

const HEAD_TAIL_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("-n", Number),
    OptionSpec::value("-c", Size),
    OptionSpec::flag("-q"),
    OptionSpec::flag("-v"),
    OptionSpec::flag("-f"),
    OptionSpec::flag("-F"),
    OptionSpec::value("--lines", Number),
    OptionSpec::value("--bytes", Size),
];

const RM_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-r"),
    OptionSpec::flag("-R"),
    OptionSpec::flag("-f"),
    OptionSpec::flag("-i"),
    OptionSpec::flag("-v"),
    OptionSpec::flag("-d"),
    OptionSpec::flag("--recursive"),
    OptionSpec::flag("--force"),
];

const CP_MV_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-r"),
    OptionSpec::flag("-R"),
    OptionSpec::flag("-f"),
    OptionSpec::flag("-i"),
    OptionSpec::flag("-n"),
    OptionSpec::flag("-v"),
    OptionSpec::flag("-p"),
    OptionSpec::flag("-a"),
    OptionSpec::flag("-u"),
    OptionSpec::value("-t", Directory),
    OptionSpec::value("--target-directory", Directory),
];

const MKDIR_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-p"),
    OptionSpec::flag("-v"),
    OptionSpec::value("-m", Permission),
];

const CHMOD_CHOWN_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-R"),
    OptionSpec::flag("-v"),
    OptionSpec::flag("-c"),
    OptionSpec::flag("-f"),
    OptionSpec::flag("-h"),
    OptionSpec::value("--reference", File),
];

const WC_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-l"),
    OptionSpec::flag("-w"),
    OptionSpec::flag("-c"),
    OptionSpec::flag("-m"),
    OptionSpec::flag("-L"),
];

const SORT_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-n"),
    OptionSpec::flag("-r"),
    OptionSpec::flag("-u"),
    OptionSpec::flag("-f"),
    OptionSpec::flag("-h"),
    OptionSpec::flag("-V"),
    OptionSpec::flag("-b"),
    OptionSpec::flag("-s"),
    OptionSpec::value("-k", Other),
    OptionSpec::value("-t", Other),
    OptionSpec::value("-o", File),
];

const UNIQ_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-c"),
    OptionSpec::flag("-d"),
    OptionSpec::flag("-u"),
    OptionSpec::flag("-i"),
    OptionSpec::value("-f", Number),
    OptionSpec::value("-s", Number),
];

const CUT_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("-d", Other),
    OptionSpec::value("-f", Other),
    OptionSpec::value("-c", Other),
    OptionSpec::value("-b", Other),
    OptionSpec::flag("-s"),
    OptionSpec::flag("--complement"),
];

const TR_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-d"),
    OptionSpec::flag("-s"),
    OptionSpec::flag("-c"),
    OptionSpec::flag("-C"),
];

const XARGS_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-0"),
    OptionSpec::flag("-r"),
    OptionSpec::flag("-t"),
    OptionSpec::flag("-p"),
    OptionSpec::value("-I", ReservedWord),
    OptionSpec::value("-n", Number),
    OptionSpec::value("-P", Number),
    OptionSpec::value("-L", Number),
    OptionSpec::value("-d", Other),
    OptionSpec::value("-s", Number),
];

const ECHO_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-n"),
    OptionSpec::flag("-e"),
    OptionSpec::flag("-E"),
];

const TAR_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-c"),
    OptionSpec::flag("-x"),
    OptionSpec::flag("-t"),
    OptionSpec::flag("-z"),
    OptionSpec::flag("-j"),
    OptionSpec::flag("-J"),
    OptionSpec::flag("-v"),
    OptionSpec::value("-f", File),
    OptionSpec::value("-C", Directory),
    OptionSpec::value("--exclude", Regex),
];

const DU_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-s"),
    OptionSpec::flag("-h"),
    OptionSpec::flag("-a"),
    OptionSpec::flag("-c"),
    OptionSpec::flag("-k"),
    OptionSpec::flag("-m"),
    OptionSpec::value("-d", Number),
    OptionSpec::value("--max-depth", Number),
];

const SED_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-n"),
    OptionSpec::flag("-E"),
    OptionSpec::flag("-r"),
    OptionSpec::flag("-i"),
    OptionSpec::value("-e", Regex),
    OptionSpec::value("-f", File),
];

const AWK_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("-F", Other),
    OptionSpec::value("-v", Other),
    OptionSpec::value("-f", File),
];

const TOUCH_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-a"),
    OptionSpec::flag("-m"),
    OptionSpec::flag("-c"),
    OptionSpec::value("-d", DateTime),
    OptionSpec::value("-t", DateTime),
    OptionSpec::value("-r", File),
];

const LN_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-s"),
    OptionSpec::flag("-f"),
    OptionSpec::flag("-n"),
    OptionSpec::flag("-v"),
];

const DIFF_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-u"),
    OptionSpec::flag("-r"),
    OptionSpec::flag("-q"),
    OptionSpec::flag("-i"),
    OptionSpec::flag("-w"),
    OptionSpec::flag("-b"),
];

const CAT_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-n"),
    OptionSpec::flag("-b"),
    OptionSpec::flag("-s"),
    OptionSpec::flag("-A"),
    OptionSpec::flag("-E"),
    OptionSpec::flag("-T"),
    OptionSpec::flag("-v"),
];

const TEE_OPTIONS: &[OptionSpec] = &[OptionSpec::flag("-a"), OptionSpec::flag("-i")];

const GZIP_OPTIONS: &[OptionSpec] = &[
    OptionSpec::flag("-d"),
    OptionSpec::flag("-c"),
    OptionSpec::flag("-k"),
    OptionSpec::flag("-r"),
    OptionSpec::flag("-v"),
    OptionSpec::flag("-9"),
];

const SPLIT_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("-l", Number),
    OptionSpec::value("-b", Size),
    OptionSpec::value("-n", Number),
    OptionSpec::flag("-d"),
];

const STAT_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("-c", Other),
    OptionSpec::value("--format", Other),
    OptionSpec::flag("-L"),
];

const SEQ_OPTIONS: &[OptionSpec] = &[
    OptionSpec::value("-s", Other),
    OptionSpec::value("-f", Other),
    OptionSpec::flag("-w"),
];

const NO_OPTIONS: &[OptionSpec] = &[];

const fn spec(
    name: &'static str,
    options: &'static [OptionSpec],
    positional: &'static [ArgType],
) -> UtilitySpec {
    UtilitySpec { name, options, positional, takes_command: false, logic: false }
}

const UTILITY_TABLE: &[UtilitySpec] = &[
    UtilitySpec {
        name: "find",
        options: FIND_OPTIONS,
        positional: &[Path],
        takes_command: false,
        logic: true,
    },
    UtilitySpec {
        name: "xargs",
        options: XARGS_OPTIONS,
        positional: &[Other],
        takes_command: true,
        logic: false,
    },
    UtilitySpec {
        name: "sudo",
        options: &[OptionSpec::value("-u", Username), OptionSpec::flag("-E")],
        positional: &[Other],
        takes_command: true,
        logic: false,
    },
    spec("grep", GREP_OPTIONS, &[Regex, File]),
    spec("egrep", GREP_OPTIONS, &[Regex, File]),
    spec("ls", LS_OPTIONS, &[Path]),
    spec("head", HEAD_TAIL_OPTIONS, &[File]),
    spec("tail", HEAD_TAIL_OPTIONS, &[File]),
    spec("rm", RM_OPTIONS, &[File]),
    spec("cp", CP_MV_OPTIONS, &[File]),
    spec("mv", CP_MV_OPTIONS, &[File]),
    spec("mkdir", MKDIR_OPTIONS, &[Directory]),
    spec("rmdir", &[OptionSpec::flag("-p")], &[Directory]),
    spec("chmod", CHMOD_CHOWN_OPTIONS, &[Permission, File]),
    spec("chown", CHMOD_CHOWN_OPTIONS, &[Username, File]),
    spec("chgrp", CHMOD_CHOWN_OPTIONS, &[Groupname, File]),
    spec("cat", CAT_OPTIONS, &[File]),
    spec("wc", WC_OPTIONS, &[File]),
    spec("sort", SORT_OPTIONS, &[File]),
    spec("uniq", UNIQ_OPTIONS, &[File]),
    spec("cut", CUT_OPTIONS, &[File]),
    spec("tr", TR_OPTIONS, &[Regex]),
    spec("echo", ECHO_OPTIONS, &[Other]),
    spec("tar", TAR_OPTIONS, &[File]),
    spec("du", DU_OPTIONS, &[Path]),
    spec("sed", SED_OPTIONS, &[Regex, File]),
    spec("awk", AWK_OPTIONS, &[Other, File]),
    spec("touch", TOUCH_OPTIONS, &[File]),
    spec("ln", LN_OPTIONS, &[Path]),
    spec("basename", NO_OPTIONS, &[Path, Other]),
    spec("dirname", NO_OPTIONS, &[Path]),
    spec("diff", DIFF_OPTIONS, &[File]),
    spec("tee", TEE_OPTIONS, &[File]),
    spec("gzip", GZIP_OPTIONS, &[File]),
    spec("split", SPLIT_OPTIONS, &[File, Other]),
    spec("stat", STAT_OPTIONS, &[Path]),
    spec("md5sum", NO_OPTIONS, &[File]),
    spec("readlink", &[OptionSpec::flag("-f"), OptionSpec::flag("-e")], &[Path]),
    spec("seq", SEQ_OPTIONS, &[Number]),
    spec("comm", &[OptionSpec::flag("-1"), OptionSpec::flag("-2"), OptionSpec::flag("-3")], &[File]),
    spec("paste", &[OptionSpec::value("-d", Other), OptionSpec::flag("-s")], &[File]),
    spec("file", &[OptionSpec::flag("-b"), OptionSpec::flag("-i")], &[Path]),
    spec("tac", NO_OPTIONS, &[File]),
    spec("rev", NO_OPTIONS, &[File]),
    spec("nl", NO_OPTIONS, &[File]),
    spec("zcat", NO_OPTIONS, &[File]),
    spec("sleep", NO_OPTIONS, &[Timespan]),
    spec("pwd", NO_OPTIONS, &[]),
    spec("cd", NO_OPTIONS, &[Directory]),
];

/// High-frequency (in-vocabulary) utilities.
const TOP_UTILITIES: &[&str] = &[
    "find", "xargs", "grep", "rm", "echo", "ls", "sort", "chmod", "wc", "cat", "cut",
    "head", "mv", "chown", "cp", "mkdir", "tr", "tail", "dirname", "tar", "uniq", "ln",
    "basename", "du", "sed", "awk", "touch", "diff", "sudo", "pwd", "cd",
];

const UTILITIES_20_TO_15: &[&str] = &[
    "rsync", "split", "comm", "paste", "md5sum", "readlink", "tee", "gzip", "file", "stat",
];

const UTILITIES_15_TO_10: &[&str] = &[
    "rmdir", "seq", "join", "tac", "rev", "fold", "nl", "od", "zcat", "column", "chgrp",
    "egrep", "sleep",
];

/// Arguments frequent enough to stay literal in template mode.
const COMMON_ARGUMENTS: &[&str] = &[".", "..", "/", "~", "*", "-", "0", "1", "f", "d", "l"];

lazy_static::lazy_static! {
    static ref UTILITIES: HashMap<&'static str, &'static UtilitySpec> =
        UTILITY_TABLE.iter().map(|s| (s.name, s)).collect();

    static ref FREQUENCIES: HashMap<&'static str, Frequency> = {
        let mut m = HashMap::new();
        for name in UTILITIES_15_TO_10 {
            m.insert(*name, Frequency::Band15To10);
        }
        for name in UTILITIES_20_TO_15 {
            m.insert(*name, Frequency::Band20To15);
        }
        for name in TOP_UTILITIES {
            m.insert(*name, Frequency::Top);
        }
        m
    };

    static ref COMMON: HashSet<&'static str> = COMMON_ARGUMENTS.iter().copied().collect();

    static ref SIGNED_NUMBER_RE: Pattern = Pattern::new(r"^[+-]?\d+(\.\d+)?$").unwrap();
    static ref SIZE_RE: Pattern = Pattern::new(r"^[+-]?\d+(\.\d+)?[bcwkKMGTP]$").unwrap();
    static ref TIMESPAN_RE: Pattern = Pattern::new(r"^[+-]?\d+[smhdw]$").unwrap();
    static ref PERMISSION_RE: Pattern =
        Pattern::new(r"^([0-7]{3,4}|[ugoa]*[+=-][rwxXst]+(,[ugoa]*[+=-][rwxXst]+)*)$").unwrap();
    static ref DATETIME_RE: Pattern =
        Pattern::new(r"^\d{1,4}[/-]\d{1,2}[/-]\d{1,4}([ T]\d+:\d+(:\d+)?)?$").unwrap();
}

/// Look up a recognized utility.
pub fn lookup(name: &str) -> Option<&'static UtilitySpec> {
    UTILITIES.get(name).copied()
}

pub fn frequency(name: &str) -> Frequency {
    FREQUENCIES.get(name).copied().unwrap_or(Frequency::Other)
}

pub fn is_high_frequency(name: &str) -> bool {
    frequency(name) == Frequency::Top
}

pub fn is_low_frequency(name: &str) -> bool {
    matches!(frequency(name), Frequency::Band20To15 | Frequency::Band15To10)
}

pub fn is_common_argument(value: &str) -> bool {
    COMMON.contains(value)
}

/// Binary logic keywords accepted inside `find` expressions.
pub fn is_binary_logic_op(word: &str) -> bool {
    matches!(word, "-and" | "-or" | "-a" | "-o" | ",")
}

/// Unary logic keywords and the side their operand sits on.
pub fn unary_logic_op(word: &str) -> Option<Associativity> {
    match word {
        "-not" | "!" => Some(Associativity::Right),
        _ => None,
    }
}

/// Options whose value embeds a statement terminator.
pub fn is_terminated_option(flag: &str) -> bool {
    flag.starts_with("-exec") || flag.starts_with("-ok")
}

/// Split `-exec::;` into the display flag and its terminator.
pub fn split_terminator(value: &str) -> (&str, Option<&str>) {
    if is_terminated_option(value) {
        if let Some((flag, op)) = value.split_once(TERMINATOR_MARKER) {
            return (flag, Some(op));
        }
    }
    (value, None)
}

pub fn join_terminator(flag: &str, terminator: &str) -> String {
    format!("{}{}{}", flag, TERMINATOR_MARKER, terminator)
}

/// Shell spelling of a terminator; a bare `;` must be escaped.
pub fn render_terminator(op: &str) -> &str {
    if op == ";" {
        "\\;"
    } else {
        op
    }
}

/// Guess the type of a word when the registry does not pin it down.
pub fn infer_arg_type(word: &str) -> ArgType {
    if SIGNED_NUMBER_RE.is_match(word) {
        Number
    } else if SIZE_RE.is_match(word) {
        Size
    } else if TIMESPAN_RE.is_match(word) {
        Timespan
    } else if DATETIME_RE.is_match(word) {
        DateTime
    } else if PERMISSION_RE.is_match(word) && !word.chars().all(|c| c.is_ascii_digit()) {
        Permission
    } else if word.contains('/') || word.starts_with('.') || word.starts_with('~') {
        Path
    } else if word.contains('*') || word.contains('?') || word.contains('[') {
        Regex
    } else {
        Other
    }
}

/// Resolve the type of a positional argument, preferring the registry entry.
///
/// A registry type of `Number` or `Permission` is only kept when the word looks
/// like one; a signed quantity refines `Other`.
pub fn positional_arg_type(spec: Option<&UtilitySpec>, index: usize, word: &str) -> ArgType {
    let inferred = infer_arg_type(word);
    match spec.and_then(|s| s.positional_type(index)) {
        Some(Number) if inferred != Number => inferred,
        Some(Other) if inferred.is_quantity() => inferred,
        Some(t) => t,
        None => inferred,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::types::ArgType::*;
    use crate::grammar::types::OptionArity;

    #[test]
    fn test_lookup_known_utility() {
        let find = lookup("find").unwrap();
        assert!(find.logic);
        assert_eq!(find.option("-name").unwrap().arity, OptionArity::Value(Regex));
        assert_eq!(find.option("-exec").unwrap().arity, OptionArity::Command);
        assert!(lookup("frobnicate").is_none());
    }

    #[test]
    fn test_frequency_bands() {
        assert_eq!(frequency("find"), Frequency::Top);
        assert_eq!(frequency("tee"), Frequency::Band20To15);
        assert_eq!(frequency("rmdir"), Frequency::Band15To10);
        assert_eq!(frequency("emacs"), Frequency::Other);
        assert!(is_low_frequency("rev"));
        assert!(!is_low_frequency("grep"));
    }

    #[test]
    fn test_split_terminator() {
        assert_eq!(split_terminator("-exec::;"), ("-exec", Some(";")));
        assert_eq!(split_terminator("-okdir::+"), ("-okdir", Some("+")));
        assert_eq!(split_terminator("-name"), ("-name", None));
        assert_eq!(join_terminator("-exec", ";"), "-exec::;");
        assert_eq!(render_terminator(";"), "\\;");
        assert_eq!(render_terminator("+"), "+");
    }

    #[test]
    fn test_infer_arg_type() {
        assert_eq!(infer_arg_type("+7"), Number);
        assert_eq!(infer_arg_type("10k"), Size);
        assert_eq!(infer_arg_type("-100c"), Size);
        assert_eq!(infer_arg_type("5d"), Timespan);
        assert_eq!(infer_arg_type("u+x"), Permission);
        assert_eq!(infer_arg_type("/tmp/x"), Path);
        assert_eq!(infer_arg_type("*.txt"), Regex);
        assert_eq!(infer_arg_type("foo"), Other);
    }

    #[test]
    fn test_positional_arg_type() {
        let grep = lookup("grep");
        assert_eq!(positional_arg_type(grep, 0, "foo"), Regex);
        assert_eq!(positional_arg_type(grep, 1, "a.txt"), File);
        let chmod = lookup("chmod");
        assert_eq!(positional_arg_type(chmod, 0, "755"), Permission);
        assert_eq!(positional_arg_type(None, 0, "42"), Number);
    }
}
