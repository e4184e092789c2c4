extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate error_chain;
#[macro_use]
extern crate log;
extern crate structopt;
#[cfg(test)]
extern crate tempdir;

use std::env;
use std::ffi::OsString;
use std::process;
use std::sync::Arc;

use structopt::StructOpt;

mod duplicator;
mod errors;
mod invocation;
mod outcome;
mod runner;
mod sink;

use errors::*;
use invocation::Invocation;
use outcome::Outcome;
use sink::Sink;

/// Run a command, duplicating its stdout and stderr into <file> while still
/// showing them, and exit with the command's own status.
#[derive(StructOpt, Debug)]
#[structopt(name = "tee-pipefail", raw(setting = "clap::AppSettings::TrailingVarArg"))]
struct Opt {
    /// Append to <file> rather than overwriting it.
    #[structopt(short = "a", long = "append")]
    append: bool,
    /// <command> [args...] <file>
    #[structopt(name = "ARGS", parse(from_os_str))]
    tokens: Vec<OsString>,
}

fn tee(tokens: Vec<OsString>, append: bool) -> Result<Outcome> {
    let invocation = Invocation::resolve(tokens, append)?;
    debug!("invocation: {:?}", invocation);

    // Opened up front so a bad destination is reported before anything runs.
    let sink = Arc::new(Sink::open(&invocation.destination, invocation.append)?);
    let outcome = runner::run(&invocation, &sink);
    let closed = sink.close();

    let outcome = outcome?;
    closed?;
    Ok(outcome)
}

fn main() {
    env_logger::init();

    debug!("✭: {:?}", env::args_os().collect::<Vec<_>>());
    let Opt { append, tokens } = Opt::from_args();

    let code = outcome::conclude(tee(tokens, append));
    process::exit(code);
}
