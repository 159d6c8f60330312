use crate::exec::ExecError;

#[derive(thiserror::Error, Debug)]
pub enum BackupError {
    #[error(transparent)]
    ExecError(#[from] ExecError),
    #[error("{command} returns {code}")]
    CommandFailed { command: String, code: i32 },
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error("error deriving folder name from path ({0})")]
    PathConversionError(String),
}
