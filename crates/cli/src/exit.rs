use std::process::ExitCode;

/// How a completed run ended. Fatal errors travel as `anyhow::Error` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// Finished, but at least one file was skipped or failed.
    Incomplete,
}

impl Status {
    pub fn from_clean(clean: bool) -> Self {
        if clean {
            Status::Success
        } else {
            Status::Incomplete
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Status::Success => 0,
            Status::Incomplete => 3,
        }
    }
}

pub const FATAL: u8 = 1;

pub fn finish(result: anyhow::Result<Status>) -> ExitCode {
    match result {
        Ok(status) => ExitCode::from(status.code()),
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::from(FATAL)
        }
    }
}
