//! External command execution.
//!
//! All interaction with external tools goes through [`CommandExecutor`].
//! [`SystemExecutor`] spawns real processes; [`RecordingExecutor`] only
//! records what would have run and answers from scripted responses, which is
//! how dry runs and tests observe the packaging pipeline.

use crate::packager::{Error, Result, git::LOG_COMMAND_PREFIX};
use std::{
    fmt,
    path::{Path, PathBuf},
    process::Stdio,
    sync::Mutex,
};

/// Commit reported by the dry-run executor for `git rev-parse`.
pub const DRY_RUN_COMMIT: &str = "e5812a9fd2cda317b503325a702ba3c1c37861d9";

/// A program invocation: program name plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    /// Creates an invocation of `program` without arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Program name.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments, without the program name.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// True if `[program, args..]` begins with `prefix`.
    fn starts_with(&self, prefix: &[String]) -> bool {
        let words = std::iter::once(&self.program).chain(self.args.iter());
        prefix.len() <= self.args.len() + 1 && words.zip(prefix).all(|(a, b)| a == b)
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Raw standard error
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Standard output decoded as UTF-8, lossily.
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Capability to run an external command and capture its output.
///
/// Implementations return [`Error::CommandFailed`] for a non-zero exit status,
/// so callers only ever see output of commands that succeeded.
#[allow(async_fn_in_trait)]
pub trait CommandExecutor {
    /// Runs `command` to completion.
    async fn execute(&self, command: &CommandLine) -> Result<CommandOutput>;
}

impl<E: CommandExecutor> CommandExecutor for &E {
    async fn execute(&self, command: &CommandLine) -> Result<CommandOutput> {
        (**self).execute(command).await
    }
}

/// Runs commands as child processes inside a working directory.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    root: PathBuf,
}

impl SystemExecutor {
    /// Creates an executor running every command in `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Working directory of spawned commands.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl CommandExecutor for SystemExecutor {
    async fn execute(&self, command: &CommandLine) -> Result<CommandOutput> {
        log::info!("Executing {}", command);

        let program = which::which(command.program()).map_err(|e| {
            Error::GenericError(format!("{} not found in PATH: {}", command.program(), e))
        })?;

        let output = tokio::process::Command::new(&program)
            .args(command.arguments())
            .current_dir(&self.root)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| Error::GenericError(format!("Failed to execute {}: {}", command, e)))?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command: command.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[derive(Debug, Clone)]
enum Response {
    Output(Vec<u8>),
    Failure { code: i32, stderr: String },
}

/// Records commands instead of running them.
///
/// Responses are matched by the longest `[program, args..]` prefix; commands
/// without a scripted response succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    responses: Vec<(Vec<String>, Response)>,
    recorded: Mutex<Vec<CommandLine>>,
}

impl RecordingExecutor {
    /// Creates an executor without scripted responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor for `--dry-run`: answers the git queries of a source
    /// archive run with a fixed commit and an empty tree.
    pub fn dry_run() -> Self {
        Self::new()
            .respond(["git", "rev-parse"], format!("{DRY_RUN_COMMIT}\n"))
            .respond(LOG_COMMAND_PREFIX, "time=2024-03-14T15:40:25-07:00\n")
    }

    /// Answers commands starting with `prefix` with `stdout`.
    pub fn respond<I, S>(mut self, prefix: I, stdout: impl Into<Vec<u8>>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = prefix.into_iter().map(Into::into).collect();
        self.responses.push((prefix, Response::Output(stdout.into())));
        self
    }

    /// Makes commands starting with `prefix` fail.
    pub fn fail<I, S>(mut self, prefix: I, code: i32, stderr: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = prefix.into_iter().map(Into::into).collect();
        self.responses.push((
            prefix,
            Response::Failure {
                code,
                stderr: stderr.into(),
            },
        ));
        self
    }

    /// Commands executed so far, in order.
    pub fn recorded(&self) -> Vec<CommandLine> {
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl CommandExecutor for RecordingExecutor {
    async fn execute(&self, command: &CommandLine) -> Result<CommandOutput> {
        log::info!("Executing (recorded) {}", command);
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(command.clone());

        let response = self
            .responses
            .iter()
            .filter(|(prefix, _)| command.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, response)| response.clone());

        match response {
            Some(Response::Output(stdout)) => Ok(CommandOutput {
                stdout,
                stderr: Vec::new(),
            }),
            Some(Response::Failure { code, stderr }) => Err(Error::CommandFailed {
                command: command.to_string(),
                code: Some(code),
                stderr,
            }),
            None => Ok(CommandOutput::default()),
        }
    }
}
