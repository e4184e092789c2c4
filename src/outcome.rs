use std::process::ExitStatus;

use errors::*;
use invocation::USAGE;

pub const USAGE_EXIT: i32 = 1;
pub const FAILURE_EXIT: i32 = 1;
pub const LAUNCH_FAILURE_EXIT: i32 = 127;
pub const SIGNAL_EXIT_BASE: i32 = 128;

/// How the child finished. Exactly one per invocation.
#[derive(Debug)]
pub enum Outcome {
    Exited(i32),
    Signaled(i32),
    LaunchFailed(Error),
}

impl Outcome {
    pub fn from_status(status: ExitStatus) -> Outcome {
        if let Some(code) = status.code() {
            return Outcome::Exited(code);
        }
        match signal_of(&status) {
            Some(signal) => Outcome::Signaled(signal),
            None => Outcome::Exited(FAILURE_EXIT),
        }
    }

    pub fn exit_code(&self) -> i32 {
        match *self {
            Outcome::Exited(code) => code,
            Outcome::Signaled(signal) => SIGNAL_EXIT_BASE + signal,
            Outcome::LaunchFailed(_) => LAUNCH_FAILURE_EXIT,
        }
    }
}

#[cfg(unix)]
fn signal_of(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn signal_of(_: &ExitStatus) -> Option<i32> {
    None
}

pub fn exit_code_of(err: &Error) -> i32 {
    match *err.kind() {
        ErrorKind::MissingCommand | ErrorKind::MissingDestination => USAGE_EXIT,
        _ => FAILURE_EXIT,
    }
}

/// Report whatever needs reporting and settle on the code to exit with.
/// Only called once both channels are drained and the sink is closed.
pub fn conclude(result: Result<Outcome>) -> i32 {
    match result {
        Ok(outcome) => {
            match outcome {
                Outcome::LaunchFailed(ref err) => report(err),
                Outcome::Signaled(signal) => debug!("child killed by signal {}", signal),
                Outcome::Exited(code) => debug!("child exited with {}", code),
            }
            outcome.exit_code()
        }
        Err(err) => {
            report(&err);
            exit_code_of(&err)
        }
    }
}

fn report(err: &Error) {
    match *err.kind() {
        ErrorKind::MissingCommand | ErrorKind::MissingDestination => eprintln!("{}", USAGE),
        _ => (),
    }
    eprintln!("tee-pipefail: {}", render(err));
}

fn render(err: &Error) -> String {
    err.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(": ")
}
