//! # Keel Driver
//!
//! Single-file compilation on top of `keel-program`. A caller hands over an
//! entry file name and a [`SourceProvider`]; [`compile`] builds a fresh
//! [`ProviderHost`], checks the program phase by phase through a
//! [`PhaseGate`], emits, and returns either the JavaScript or a
//! [`CompileFailure`] carrying the `<#>`-wrapped report.
//!
//! The crate also holds the source providers, the batch compiler used by
//! the `keel build` command, and the `keel` binary itself.

pub mod batch;
pub mod error;
pub mod gate;
pub mod host;
pub mod provider;
pub mod reporter;

pub use batch::{BatchCompiler, BatchOutcome, FileFailure};
pub use error::{BatchError, CompileFailure, SourceError};
pub use gate::PhaseGate;
pub use host::ProviderHost;
pub use keel_program::{Diagnostic, Phase, ScriptTarget};
pub use provider::{ArtifactTree, DirectoryProvider, SourceProvider, TreeProvider};
pub use reporter::Reporter;

use keel_program::{CompilerHost, CompilerOptions, Program};
use tracing::debug;

/// Everything one compilation produced
#[derive(Debug, Clone)]
pub struct Compilation {
    /// Concatenated emit output, even when the compilation failed
    pub output: String,
    /// Diagnostics of the checking phases that ran, in phase order
    pub checking: Vec<Diagnostic>,
    pub emit: Vec<Diagnostic>,
    pub gate: PhaseGate,
    new_line: String,
}

impl Compilation {
    pub fn failed(&self) -> bool {
        self.gate.fails(self.emit.len())
    }

    /// Checking diagnostics followed by emit diagnostics
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.checking.iter().chain(self.emit.iter())
    }

    /// Rendered lines of every diagnostic, without sentinels
    pub fn report(&self) -> String {
        let reporter = Reporter::new(self.new_line.as_str());
        let mut report = reporter.render_all(&self.checking);
        report.push_str(&reporter.render_all(&self.emit));
        report
    }

    pub fn into_result(self) -> Result<String, CompileFailure> {
        if self.failed() {
            Err(CompileFailure::new(self.report()))
        } else {
            Ok(self.output)
        }
    }
}

/// Compiles `entry` for the default target
pub fn compile(entry: &str, provider: &dyn SourceProvider) -> Result<String, CompileFailure> {
    compile_with_target(entry, provider, ScriptTarget::default())
}

pub fn compile_with_target(
    entry: &str,
    provider: &dyn SourceProvider,
    target: ScriptTarget,
) -> Result<String, CompileFailure> {
    run(entry, provider, target).into_result()
}

/// Checks and emits `entry`, keeping every diagnostic for the caller
pub fn run(entry: &str, provider: &dyn SourceProvider, target: ScriptTarget) -> Compilation {
    let mut host = ProviderHost::new(entry, provider);
    let program = create_program(entry, target, &mut host);
    let (gate, checking) = check_phases(&program);
    let emit = program.emit(&mut host).diagnostics;
    let new_line = host.get_new_line();
    debug!(
        entry,
        checking = checking.len(),
        emit = emit.len(),
        "compilation finished"
    );
    Compilation {
        output: host.into_output(),
        checking,
        emit,
        gate,
        new_line,
    }
}

/// Runs the checking phases of `entry` without emitting
pub fn check(entry: &str, provider: &dyn SourceProvider, target: ScriptTarget) -> Vec<Diagnostic> {
    let mut host = ProviderHost::new(entry, provider);
    let program = create_program(entry, target, &mut host);
    check_phases(&program).1
}

fn create_program(entry: &str, target: ScriptTarget, host: &mut dyn CompilerHost) -> Program {
    let options = CompilerOptions {
        target,
        ..CompilerOptions::default()
    };
    Program::create(&[entry.to_string()], options, host)
}

fn check_phases(program: &Program) -> (PhaseGate, Vec<Diagnostic>) {
    let mut gate = PhaseGate::new();
    let mut diagnostics = Vec::new();
    while let Some(phase) = gate.next_phase() {
        let found = match phase {
            Phase::Syntactic => program.syntactic_diagnostics(),
            Phase::Global => program.global_diagnostics(),
            Phase::Semantic => program.semantic_diagnostics(),
            // not a checking phase
            Phase::Emit => Vec::new(),
        };
        gate.record(phase, found.len());
        diagnostics.extend(found);
    }
    (gate, diagnostics)
}
