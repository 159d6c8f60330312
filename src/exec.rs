use std::process::{Command, Stdio};

#[derive(thiserror::Error, Debug)]
pub enum ExecError {
    #[error("empty command")]
    EmptyCommand,
    #[error("error spawning \"{program}\" ({source})")]
    SpawnError {
        program: String,
        source: std::io::Error,
    },
    #[error("\"{0}\" terminated without an exit code")]
    NoExitCode(String),
}

/// Seam for running external commands, so the driver can be tested against
/// a mock instead of spawning real processes.
#[cfg_attr(any(test, feature = "mockall"), mockall::automock)]
pub trait Exec {
    /// Run `program` with `args` and the given extra environment variables,
    /// wait for it to finish, and return its exit code.
    fn exec(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<i32, ExecError>;
}

pub struct CommandExec {}

impl Exec for CommandExec {
    fn exec(
        &self,
        program: &str,
        args: &[String],
        env: &[(String, String)],
    ) -> Result<i32, ExecError> {
        log::info!("executing: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ExecError::SpawnError {
                program: program.to_string(),
                source,
            })?;

        // stdout and stderr are both logged at the same level, matching the
        // combined capture the callers expect.
        for line in String::from_utf8_lossy(&output.stdout).lines() {
            log::info!("{}: {}", program, line);
        }
        for line in String::from_utf8_lossy(&output.stderr).lines() {
            log::info!("{}: {}", program, line);
        }

        output
            .status
            .code()
            .ok_or_else(|| ExecError::NoExitCode(program.to_string()))
    }
}
