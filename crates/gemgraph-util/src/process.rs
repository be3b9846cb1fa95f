use std::process::{Command, Output};

use crate::errors::GemgraphError;

/// Runs the host tools gemgraph shells out to (`gem`, `sha256sum`, `shasum`)
/// with captured output.
pub struct CommandBuilder {
    program: String,
    args: Vec<String>,
}

impl CommandBuilder {
    /// Create a new builder for the given program.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Execute the command and return its output.
    pub fn exec(&self) -> Result<Output, GemgraphError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        tracing::debug!("exec {} {}", self.program, self.args.join(" "));
        cmd.output().map_err(|e| GemgraphError::Command {
            program: self.program.clone(),
            message: e.to_string(),
        })
    }

    /// Execute the command and return its stdout, failing on a non-zero exit.
    pub fn exec_stdout(&self) -> Result<String, GemgraphError> {
        let output = self.exec()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GemgraphError::Command {
                program: self.program.clone(),
                message: format!("exited with {}: {}", output.status, stderr.trim()),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
