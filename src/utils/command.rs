/// Command execution utilities shared by the az, helm and kubectl wrappers
use async_trait::async_trait;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, error, info};

use crate::error::UpgradeError;
use crate::upgrade::Step;

/// Result from command execution with captured output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Create from tokio Command output
    fn from_output(output: std::process::Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Text describing why the command failed
    pub fn failure_message(&self) -> String {
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        match self.code {
            Some(code) => format!("exited with status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// An external command: program, arguments and optional working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
}

impl CommandSpec {
    pub fn new<S: Into<String>>(program: S) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Add a single argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the child process inside `dir`. The caller's working directory
    /// is left untouched.
    pub fn current_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn get_args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> Option<&Path> {
        self.current_dir.as_deref()
    }

    /// `program`, or `program in <dir>` when a working directory is set
    pub fn launch_target(&self) -> String {
        match self.working_dir() {
            Some(dir) => format!("`{}` in {}", self.program, dir.display()),
            None => format!("`{}`", self.program),
        }
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Executes external commands.
///
/// The production implementation is [`SystemRunner`]; tests substitute a
/// scripted runner so the upgrade sequence can be exercised without `az`,
/// `helm` or `kubectl` on the machine.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run a command to completion and capture its output
    async fn execute(&self, spec: &CommandSpec) -> io::Result<CommandOutput>;

    /// Run a command as one step of the upgrade.
    ///
    /// Captured stdout is logged at info level and returned on success. On a
    /// non-zero exit the captured error text is logged at error level and
    /// returned inside [`UpgradeError::CommandFailed`].
    async fn run_step(&self, step: Step, spec: &CommandSpec) -> Result<String, UpgradeError> {
        debug!(%step, command = %spec, "Running command");

        let output = match self.execute(spec).await {
            Ok(output) => output,
            Err(source) => {
                let target = spec.launch_target();
                error!("Could not launch {}: {}", target, source);
                return Err(UpgradeError::Launch {
                    step,
                    target,
                    source,
                });
            }
        };

        if !output.success() {
            let message = output.failure_message();
            error!("{}", message);
            return Err(UpgradeError::CommandFailed { step, message });
        }

        let stdout = output.stdout.trim();
        if !stdout.is_empty() {
            info!("{}", stdout);
        }

        Ok(output.stdout)
    }
}

/// Runs commands as real child processes
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn execute(&self, spec: &CommandSpec) -> io::Result<CommandOutput> {
        let mut command = Command::new(spec.program());
        command
            .args(spec.get_args())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = spec.working_dir() {
            if !dir.is_dir() {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("directory {} does not exist", dir.display()),
                ));
            }
            command.current_dir(dir);
        }

        let output = command.output().await?;
        Ok(CommandOutput::from_output(output))
    }
}

/// Check if a command-line tool is installed
pub async fn check_tool_installed<R: CommandRunner + ?Sized>(
    runner: &R,
    tool_name: &str,
    version_args: &[&str],
    install_url: &str,
) -> Result<(), UpgradeError> {
    let spec = CommandSpec::new(tool_name).args(version_args.iter().copied());

    match runner.execute(&spec).await {
        Ok(out) if out.success() => {
            debug!("Found {}", tool_name);
            Ok(())
        }
        _ => Err(UpgradeError::ToolMissing {
            tool: tool_name.to_string(),
            install_url: install_url.to_string(),
        }),
    }
}
