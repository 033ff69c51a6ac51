use clap::{Parser, Subcommand};
use similar::{ChangeTag, TextDiff};
use std::io::Read;
use tracing_subscriber::EnvFilter;

use bashlint::bash::{split_commands, Bash, BashOptions};
use bashlint::classify::categorize_utilities;
use bashlint::policy::Policy;
use bashlint::serializer::ast2command;
use bashlint::PolicyError;

#[derive(Parser)]
#[command(name = "bashlint")]
#[command(about = "Normalize shell commands into typed ASTs and token streams")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    mode: Mode,

    /// Command to process (otherwise read from --file or stdin, one per line)
    #[arg(short = 'c', global = true)]
    command: Option<String>,

    /// File with one command per line
    #[arg(short = 'f', long = "file", global = true)]
    file: Option<String>,

    /// Policy file (TOML)
    #[arg(long = "policy", global = true)]
    policy: Option<String>,

    /// Named policy: tokens, template, command, sequence, loose
    #[arg(long = "preset", global = true)]
    preset: Option<String>,

    /// Tolerate arity violations
    #[arg(long = "loose", global = true)]
    loose: bool,

    /// Order each utility's children by value
    #[arg(long = "ignore-flag-order", global = true)]
    ignore_flag_order: bool,
}

#[derive(Subcommand)]
enum Mode {
    /// Print the normalized AST
    Parse {
        /// Print the tree as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Print the token sequence
    Tokens,
    /// Print the argument-type template
    Template,
    /// Print the re-serialized command
    Command,
    /// Print the sentinel sequence
    List,
    /// Print utilities by frequency band as JSON
    Utilities,
    /// Check that re-serialized commands normalize to the same tree
    Check,
}

impl Mode {
    fn default_preset(&self) -> &'static str {
        match self {
            Mode::Template => "template",
            Mode::List => "sequence",
            Mode::Command | Mode::Check => "command",
            _ => "tokens",
        }
    }
}

fn load_policy(cli: &Cli) -> Result<Policy, String> {
    let loaded: Result<Policy, PolicyError> = match cli.policy {
        Some(ref path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Cannot read policy file: {}: {}", path, e))?;
            Policy::from_toml_str(&text)
        }
        None => Policy::preset(cli.preset.as_deref().unwrap_or(cli.mode.default_preset())),
    };

    let mut policy = loaded.map_err(|e| e.to_string())?;
    if cli.loose {
        policy = policy.with_loose(true);
    }
    if cli.ignore_flag_order {
        policy = policy.with_ignore_flag_order(true);
    }
    Ok(policy)
}

fn read_input(cli: &Cli) -> Result<String, String> {
    if let Some(ref c) = cli.command {
        return Ok(c.clone());
    }
    if let Some(ref file) = cli.file {
        return std::fs::read_to_string(file)
            .map_err(|e| format!("Cannot read command file: {}: {}", file, e));
    }
    use std::io::IsTerminal;
    if std::io::stdin().is_terminal() {
        return Err("No command provided. Use -c 'command', --file, or pipe via stdin.".to_string());
    }
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .map_err(|e| format!("Cannot read stdin: {}", e))?;
    Ok(buf)
}

/// Unified diff of two pretty-printed trees.
fn format_tree_diff(before: &str, after: &str) -> String {
    let diff = TextDiff::from_lines(before, after);
    let mut output = String::new();
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-",
            ChangeTag::Insert => "+",
            ChangeTag::Equal => " ",
        };
        output.push_str(sign);
        output.push_str(change.value());
    }
    output
}

/// Process one command. Returns false when the command failed.
fn run(bash: &mut Bash, mode: &Mode, cmd: &str) -> bool {
    let result: Result<String, String> = match mode {
        Mode::Parse { json } => {
            let ast = bash.parse(cmd);
            if *json {
                serde_json::to_string(&ast).map_err(|e| e.to_string())
            } else {
                Ok(ast.to_string().trim_end().to_string())
            }
        }
        Mode::Tokens => bash.tokens(cmd).map(|t| t.join(" ")).map_err(|e| e.to_string()),
        Mode::Template => bash.template(cmd).map_err(|e| e.to_string()),
        Mode::Command => bash.command(cmd).map_err(|e| e.to_string()),
        Mode::List => bash.list(cmd).map(|t| t.join(" ")).map_err(|e| e.to_string()),
        Mode::Utilities => {
            let ast = bash.parse(cmd);
            serde_json::to_string(&categorize_utilities(&ast)).map_err(|e| e.to_string())
        }
        Mode::Check => {
            let ast = bash.parse(cmd);
            match ast2command(&ast, ast.root(), bash.policy()) {
                Ok(text) => {
                    let again = bash.parse(&text);
                    if again.isomorphic(&ast, bash.policy().ignore_flag_order()) {
                        Ok(format!("ok: {}", text))
                    } else {
                        Err(format!(
                            "not a fixed point: {}\n{}",
                            text,
                            format_tree_diff(&ast.to_string(), &again.to_string())
                        ))
                    }
                }
                Err(e) => Err(e.to_string()),
            }
        }
    };

    for diagnostic in bash.diagnostics() {
        tracing::warn!("{}: {}", cmd, diagnostic);
    }

    match result {
        Ok(text) => {
            println!("{}", text);
            true
        }
        Err(e) => {
            eprintln!("bashlint: {}: {}", cmd, e);
            false
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bashlint=warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let policy = match load_policy(&cli) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    let input = match read_input(&cli) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let mut bash = Bash::new(BashOptions { policy: Some(policy) });
    let mut failures = 0;
    for cmd in split_commands(&input) {
        if !run(&mut bash, &cli.mode, &cmd) {
            failures += 1;
        }
    }

    std::process::exit(if failures == 0 { 0 } else { 1 });
}
