//! Seams to the document-processing host.
//!
//! The orchestration core never touches a process or a document directly: it
//! attaches dependencies through [`DocumentHost`] and runs subprocesses through
//! [`ProcessRunner`]. [`SystemRunner`] is the real subprocess implementation.

use crate::extension::dependencies::HtmlDependency;
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;

/// Document-side collaborator that receives dependencies.
pub trait DocumentHost {
    /// Attach a dependency to the whole document.
    fn add_dependency(&mut self, dependency: &HtmlDependency);

    /// Attach a dependency to the dependency owned by a named extension.
    fn attach_to_dependency(&mut self, extension: &str, dependency: &HtmlDependency);

    /// Relative path from the current page to the project root, if the document
    /// belongs to a project.
    fn project_offset(&self) -> Option<&str>;
}

/// Failure of a piped subprocess call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeError {
    /// Executable not found in PATH.
    NotFound { program: String },
    /// Process ran and exited unsuccessfully.
    Failed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    /// Spawning or talking to the process failed.
    Io { program: String, message: String },
}

impl std::fmt::Display for PipeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound { program } => write!(f, "'{program}' not found in PATH"),
            Self::Failed {
                program,
                exit_code,
                stderr,
            } => {
                let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                if stderr.is_empty() {
                    write!(f, "'{program}' exited with status {code}")
                } else {
                    write!(f, "'{program}' exited with status {code}: {stderr}")
                }
            }
            Self::Io { program, message } => write!(f, "I/O error running '{program}': {message}"),
        }
    }
}

impl std::error::Error for PipeError {}

/// Generic "run a command with piped stdin, capture stdout" utility.
pub trait ProcessRunner {
    fn pipe(&self, program: &str, args: &[String], input: &str) -> Result<String, PipeError>;
}

/// Runs real subprocesses, blocking until each one exits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl SystemRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for SystemRunner {
    fn pipe(&self, program: &str, args: &[String], input: &str) -> Result<String, PipeError> {
        if which::which(program).is_err() {
            return Err(PipeError::NotFound {
                program: program.to_string(),
            });
        }

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| PipeError::Io {
                program: program.to_string(),
                message: format!("failed to spawn: {e}"),
            })?;

        // Drain both pipes while stdin is written so a chatty child cannot block us.
        let stdout_handle = child
            .stdout
            .take()
            .map(|stdout| thread::spawn(move || read_pipe_to_string(stdout)));
        let stderr_handle = child
            .stderr
            .take()
            .map(|stderr| thread::spawn(move || read_pipe_to_string(stderr)));

        if let Some(mut stdin) = child.stdin.take() {
            // A child that exits without reading its input closes the pipe early;
            // its exit status tells the real story.
            if let Err(e) = stdin.write_all(input.as_bytes())
                && e.kind() != std::io::ErrorKind::BrokenPipe
            {
                drop(stdin);
                abandon(&mut child, stdout_handle, stderr_handle);
                return Err(PipeError::Io {
                    program: program.to_string(),
                    message: format!("failed to write to stdin: {e}"),
                });
            }
        }

        let status = child.wait().map_err(|e| PipeError::Io {
            program: program.to_string(),
            message: format!("failed to wait: {e}"),
        })?;

        let io_err = |message: String| PipeError::Io {
            program: program.to_string(),
            message,
        };
        let stdout = join_reader(stdout_handle).map_err(io_err)?;
        let stderr = join_reader(stderr_handle).map_err(io_err)?;

        if !status.success() {
            return Err(PipeError::Failed {
                program: program.to_string(),
                exit_code: status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(stdout)
    }
}

type ReaderHandle = Option<thread::JoinHandle<std::io::Result<String>>>;

/// Kill and reap a child we gave up on, then collect its reader threads.
fn abandon(child: &mut Child, stdout_handle: ReaderHandle, stderr_handle: ReaderHandle) {
    let _ = child.kill();
    let _ = child.wait();
    let _ = join_reader(stdout_handle);
    let _ = join_reader(stderr_handle);
}

fn read_pipe_to_string<R: Read>(mut pipe: R) -> std::io::Result<String> {
    let mut buf = Vec::new();
    pipe.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).to_string())
}

fn join_reader(handle: ReaderHandle) -> Result<String, String> {
    match handle {
        Some(handle) => match handle.join() {
            Ok(res) => res.map_err(|e| format!("failed to read output: {e}")),
            Err(_) => Err("output reader thread panicked".to_string()),
        },
        None => Ok(String::new()),
    }
}
