/// Scripted command runner for unit tests
use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::subscriber::DefaultGuard;

use super::command::{CommandOutput, CommandRunner, CommandSpec};
use crate::logging::{self, LogSettings};

impl CommandOutput {
    pub fn ok(stdout: &str) -> Self {
        Self {
            code: Some(0),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    pub fn failed(code: i32, stderr: &str) -> Self {
        Self {
            code: Some(code),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }
}

impl CommandSpec {
    pub fn has_arg(&self, arg: &str) -> bool {
        self.get_args().iter().any(|a| a == arg)
    }
}

/// Records every command it is asked to run and answers from a script.
///
/// Commands succeed with empty output unless a rule registered with
/// [`ScriptedRunner::respond`] matches the rendered command line by prefix.
#[derive(Default)]
pub struct ScriptedRunner {
    calls: Mutex<Vec<CommandSpec>>,
    rules: Vec<(String, CommandOutput)>,
    unlaunchable: Vec<String>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `output`
    pub fn respond(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.rules.push((prefix.to_string(), output));
        self
    }

    /// Make commands starting with `prefix` fail with `stderr`
    pub fn fail(self, prefix: &str, stderr: &str) -> Self {
        self.respond(prefix, CommandOutput::failed(1, stderr))
    }

    /// Pretend `program` is not installed
    pub fn without_program(mut self, program: &str) -> Self {
        self.unlaunchable.push(program.to_string());
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Rendered command lines, in execution order
    pub fn command_lines(&self) -> Vec<String> {
        self.calls().iter().map(ToString::to_string).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn execute(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());

        if self.unlaunchable.iter().any(|p| p == spec.program()) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} not found", spec.program()),
            ));
        }

        let line = spec.to_string();
        let output = self
            .rules
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| CommandOutput::ok(""));

        Ok(output)
    }
}

/// Sends log events on the current thread to a temporary log file until
/// dropped
pub struct LogCapture {
    _guard: DefaultGuard,
    path: PathBuf,
    _dir: tempfile::TempDir,
}

impl LogCapture {
    pub fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upgrade.log");
        let settings = LogSettings {
            file: path.clone(),
            level: "debug".to_string(),
            console: false,
        };
        let guard = tracing::subscriber::set_default(logging::subscriber(&settings).unwrap());

        Self {
            _guard: guard,
            path,
            _dir: dir,
        }
    }

    /// Lines written so far
    pub fn lines(&self) -> Vec<String> {
        std::fs::read_to_string(&self.path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }
}
