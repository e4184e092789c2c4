use std::io::{self, Read, Write};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use duplicator::{duplicate, Channel, Transfer};
use errors::*;
use invocation::Invocation;
use outcome::Outcome;
use sink::Sink;

/// Launch the command and tee both of its output channels into our own
/// stdout/stderr and the sink. Returns once the child is reaped and both
/// channels are drained.
pub fn run(invocation: &Invocation, sink: &Arc<Sink>) -> Result<Outcome> {
    run_with(invocation, sink, io::stdout(), io::stderr())
}

pub fn run_with<O, E>(invocation: &Invocation, sink: &Arc<Sink>, stdout: O, stderr: E) -> Result<Outcome>
where
    O: Write + Send + 'static,
    E: Write + Send + 'static,
{
    let mut cmd = Command::new(&invocation.command);
    cmd.args(&invocation.arguments)
        .stdin(Stdio::inherit())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    debug!("⇒ {} ({:?}) → {:?}", invocation.command_line(), cmd, sink.path());
    let mut child = match cmd.spawn().chain_err(|| ErrorKind::Launch(invocation.program_name())) {
        Ok(child) => child,
        Err(e) => {
            debug!("⇍ {}: {}", invocation.program_name(), e);
            return Ok(Outcome::LaunchFailed(e));
        }
    };

    let child_stdout = child.stdout.take().ok_or(ErrorKind::Channel(Channel::Stdout.name()))?;
    let child_stderr = child.stderr.take().ok_or(ErrorKind::Channel(Channel::Stderr.name()))?;
    let out = spawn_duplicator(Channel::Stdout, child_stdout, stdout, sink.clone());
    let err = spawn_duplicator(Channel::Stderr, child_stderr, stderr, sink.clone());

    let (status, out, err) = settle(invocation, &mut child, out, err)?;
    debug!("⇐ {} ({:?})", invocation.program_name(), status);
    debug!(
        "teed {} bytes in {} chunks, {} bytes in {} chunks",
        out.bytes, out.chunks, err.bytes, err.chunks
    );

    Ok(Outcome::from_status(status))
}

fn spawn_duplicator<R, W>(
    channel: Channel,
    source: R,
    console: W,
    sink: Arc<Sink>,
) -> Result<JoinHandle<Result<Transfer>>>
where
    R: Read + Send + 'static,
    W: Write + Send + 'static,
{
    let handle = thread::Builder::new()
        .name(format!("tee-{}", channel))
        .spawn(move || duplicate(channel, source, console, &sink))
        .chain_err(|| ErrorKind::Channel(channel.name()))?;
    Ok(handle)
}

/// Reap the child and join whichever duplicators got started, and only then
/// look at any of the results.
fn settle(
    invocation: &Invocation,
    child: &mut Child,
    out: Result<JoinHandle<Result<Transfer>>>,
    err: Result<JoinHandle<Result<Transfer>>>,
) -> Result<(ExitStatus, Transfer, Transfer)> {
    let status = child
        .wait()
        .chain_err(|| format!("waiting for {}", invocation.program_name()));
    let out = out.and_then(|h| join(Channel::Stdout, h));
    let err = err.and_then(|h| join(Channel::Stderr, h));
    Ok((status?, out?, err?))
}

fn join(channel: Channel, handle: JoinHandle<Result<Transfer>>) -> Result<Transfer> {
    match handle.join() {
        Ok(res) => res,
        Err(_) => bail!(ErrorKind::Channel(channel.name())),
    }
}
