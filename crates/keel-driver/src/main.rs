use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Once;

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use clap::{Parser, Subcommand};
use keel_driver::{ArtifactTree, BatchCompiler, DirectoryProvider, ScriptTarget, SourceProvider};
use keel_lexer::TokenKind;
use tracing_subscriber::EnvFilter;

static INIT_LOGGING: Once = Once::new();

#[derive(Parser)]
#[command(
    name = "keel",
    version = "0.1.0",
    about = "Keel TypeScript to JavaScript compiler",
    long_about = "Compiles one TypeScript entry file at a time to CommonJS JavaScript,\nresolving imports through a source directory."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an entry file and print the JavaScript
    Compile {
        /// Entry file, relative to --root
        entry: String,

        /// Directory files are resolved against
        #[arg(long, default_value = ".")]
        root: PathBuf,

        /// Language level of the output (es3, es5, es2015)
        #[arg(long, default_value_t = ScriptTarget::Es5)]
        target: ScriptTarget,
    },

    /// Report diagnostics for an entry file without emitting
    Check {
        /// Entry file, relative to --root
        entry: String,

        /// Directory files are resolved against
        #[arg(long, default_value = ".")]
        root: PathBuf,

        #[arg(long, default_value_t = ScriptTarget::Es5)]
        target: ScriptTarget,
    },

    /// Compile every script below a prefix of a directory tree
    Build {
        /// Project directory
        input: PathBuf,

        /// Where the tree and its compiled scripts are written
        output: PathBuf,

        /// Only files whose path starts with this are compiled
        #[arg(long, default_value = ".atomist")]
        prefix: String,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Lex a TypeScript file and show tokens (debug)
    Lex {
        /// Input TypeScript file
        input: PathBuf,

        /// Show token positions
        #[arg(short, long)]
        positions: bool,
    },

    /// Parse a TypeScript file and show AST (debug)
    Parse {
        /// Input TypeScript file
        input: PathBuf,
    },
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match cli.command {
        Commands::Compile { entry, root, target } => compile_command(&entry, root, target),
        Commands::Check { entry, root, target } => check_command(&entry, root, target),
        Commands::Build {
            input,
            output,
            prefix,
            verbose,
        } => build_command(&input, &output, prefix, verbose),
        Commands::Lex { input, positions } => lex_command(input, positions),
        Commands::Parse { input } => parse_command(input),
    }
}

/// Installs the log subscriber when `RUST_LOG` asks for one
fn init_logging() {
    if std::env::var_os("RUST_LOG").is_none() {
        return;
    }
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .try_init();
    });
}

fn compile_command(entry: &str, root: PathBuf, target: ScriptTarget) -> ExitCode {
    let provider = DirectoryProvider::new(root);
    match keel_driver::compile_with_target(entry, &provider, target) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            eprint!("{}", failure);
            ExitCode::FAILURE
        }
    }
}

fn check_command(entry: &str, root: PathBuf, target: ScriptTarget) -> ExitCode {
    let provider = DirectoryProvider::new(root);
    let diagnostics = keel_driver::check(entry, &provider, target);
    if diagnostics.is_empty() {
        println!("No problems found in {}", entry);
        return ExitCode::SUCCESS;
    }

    for diagnostic in &diagnostics {
        let code = format!("TS{}", diagnostic.code);
        let message = diagnostic.message_text("\n");
        match &diagnostic.file {
            Some(file) => {
                let source = provider.get_source(&file.file_name, entry).unwrap_or_default();
                let end = file.start + file.length.max(1);
                report_error(&code, &message, file.start, end, &file.file_name, &source);
            }
            None => eprintln!("{} {}: {}", diagnostic.category, code, message),
        }
    }
    eprintln!("\n{} problem(s) found", diagnostics.len());
    ExitCode::FAILURE
}

fn build_command(input: &Path, output: &Path, prefix: String, verbose: bool) -> ExitCode {
    let tree = match ArtifactTree::from_directory(input) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Error reading {}: {}", input.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let batch = BatchCompiler::new(prefix);
    if !batch.supports(&tree) {
        eprintln!("Nothing to compile in {}", input.display());
        return ExitCode::FAILURE;
    }
    if verbose {
        for source in batch.sources(&tree) {
            println!("Compiling: {}", source);
        }
    }

    let compiled = match batch.compile(&tree).into_result() {
        Ok(compiled) => compiled,
        Err(e) => {
            eprint!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = compiled.write_to(output) {
        eprintln!("Error writing {}: {}", output.display(), e);
        return ExitCode::FAILURE;
    }
    if verbose {
        println!("Wrote {} files to {}", compiled.len(), output.display());
    }
    ExitCode::SUCCESS
}

fn lex_command(input: PathBuf, positions: bool) -> ExitCode {
    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();
    let (tokens, errors) = keel_lexer::tokenize(&source, 0);

    println!("Tokens for {}:\n", filename);
    println!("{}", "=".repeat(80));

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::Eof {
            println!("\n{:4} | {:?}", i, token.kind);
            break;
        }

        if positions {
            println!(
                "{:4} | {:20?} | {:?} | {}..{}",
                i, token.kind, token.value, token.span.start, token.span.end
            );
        } else {
            println!("{:4} | {:20?} | {:?}", i, token.kind, token.value);
        }
    }

    println!("{}", "=".repeat(80));
    println!("\nTotal tokens: {}", tokens.len());

    if !errors.is_empty() {
        println!("\nLexer errors found: {}", errors.len());
        for error in &errors {
            let code = format!("TS{}", error.code);
            report_error(&code, &error.message, error.span.start, error.span.end, &filename, &source);
        }
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn parse_command(input: PathBuf) -> ExitCode {
    let source = match fs::read_to_string(&input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let filename = input.to_string_lossy().to_string();
    let (program, errors) = keel_parser::parse(&source, 0);
    if errors.is_empty() {
        println!("{:#?}", program);
        return ExitCode::SUCCESS;
    }

    for error in &errors {
        let code = format!("TS{}", error.code);
        report_error(&code, &error.message, error.span.start, error.span.end, &filename, &source);
    }
    ExitCode::FAILURE
}

fn report_error(code: &str, message: &str, start: usize, end: usize, filename: &str, source: &str) {
    let end = end.max(start).min(source.len());
    let start = start.min(end);
    let span = (filename, start..end);
    let printed = Report::build(ReportKind::Error, span.clone())
        .with_config(Config::default().with_index_type(IndexType::Byte))
        .with_code(code)
        .with_message(message)
        .with_label(Label::new(span).with_message(message).with_color(Color::Red))
        .finish()
        .eprint((filename, Source::from(source)));
    if let Err(e) = printed {
        eprintln!("{}: error {}: {}", filename, code, e);
    }
}
