use std::fmt;
use std::io::{self, Read, Write};

use errors::*;
use sink::Sink;

const CHUNK_SIZE: usize = 8 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Stdout,
    Stderr,
}

impl Channel {
    pub fn name(&self) -> &'static str {
        match *self {
            Channel::Stdout => "stdout",
            Channel::Stderr => "stderr",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub bytes: u64,
    pub chunks: u64,
}

/// Forward everything readable from `source` to both `console` and `sink`,
/// chunk by chunk, until end of stream.
///
/// The source is always drained, so the child never stalls on a full pipe:
/// a failing console is dropped from the fan-out with a warning, and a
/// failing sink is dropped too but its first error is returned at the end.
pub fn duplicate<R, W>(channel: Channel, mut source: R, mut console: W, sink: &Sink) -> Result<Transfer>
where
    R: Read,
    W: Write,
{
    let mut buf = [0u8; CHUNK_SIZE];
    let mut transfer = Transfer::default();
    let mut console_open = true;
    let mut sink_error = None;

    loop {
        let n = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).chain_err(|| ErrorKind::Channel(channel.name())),
        };
        let chunk = &buf[..n];

        if console_open {
            if let Err(e) = console.write_all(chunk).and_then(|()| console.flush()) {
                warn!("{}: console went away, file only from here: {}", channel, e);
                console_open = false;
            }
        }

        if sink_error.is_none() {
            if let Err(e) = sink.write(chunk) {
                warn!("{}: writing {:?} failed: {}", channel, sink.path(), e);
                sink_error = Some(e);
            }
        }

        transfer.bytes += n as u64;
        transfer.chunks += 1;
    }

    debug!("{}: drained {:?}", channel, transfer);
    match sink_error {
        Some(e) => Err(e),
        None => Ok(transfer),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    /// Hands out its data in fixed-size pieces, like a pipe would.
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
        interrupted: bool,
    }

    impl<'a> Read for Trickle<'a> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(io::Error::new(io::ErrorKind::Interrupted, "signal"));
            }
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "pipe exploded"))
        }
    }

    impl Write for Broken {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal closed"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sink_in(dir: &TempDir) -> Sink {
        Sink::open(&dir.path().join("out.log"), false).expect("open sink")
    }

    #[test]
    fn copies_to_console_and_sink() {
        let dir = TempDir::new("dup").expect("tempdir");
        let sink = sink_in(&dir);
        let data = b"first output\nsecond output\nno newline at end";
        let source = Trickle { data: data, step: 5, interrupted: false };
        let mut console = Vec::new();

        let transfer = duplicate(Channel::Stdout, source, &mut console, &sink).expect("duplicate");
        sink.close().expect("close");

        assert_eq!(console, data.to_vec());
        assert_eq!(fs::read(dir.path().join("out.log")).expect("read"), data.to_vec());
        assert_eq!(transfer.bytes, data.len() as u64);
        assert_eq!(transfer.chunks, (data.len() as u64 + 4) / 5);
    }

    #[test]
    fn empty_source_writes_nothing() {
        let dir = TempDir::new("dup").expect("tempdir");
        let sink = sink_in(&dir);
        let mut console = Vec::new();

        let transfer = duplicate(Channel::Stderr, io::empty(), &mut console, &sink).expect("duplicate");

        assert_eq!(transfer, Transfer::default());
        assert!(console.is_empty());
    }

    #[test]
    fn dead_console_still_fills_sink() {
        let dir = TempDir::new("dup").expect("tempdir");
        let sink = sink_in(&dir);
        let data = b"still recorded\n";

        duplicate(Channel::Stdout, &data[..], Broken, &sink).expect("duplicate");
        sink.close().expect("close");

        assert_eq!(fs::read(dir.path().join("out.log")).expect("read"), data.to_vec());
    }

    #[test]
    fn source_error_names_channel() {
        let dir = TempDir::new("dup").expect("tempdir");
        let sink = sink_in(&dir);

        let err = duplicate(Channel::Stderr, Broken, io::sink(), &sink).expect_err("should fail");
        match *err.kind() {
            ErrorKind::Channel(name) => assert_eq!(name, "stderr"),
            ref other => panic!("Expected channel error, got {:?}", other),
        }
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn full_sink_still_drains_to_console() {
        use std::path::Path;

        let sink = Sink::open(Path::new("/dev/full"), false).expect("open /dev/full");
        let data = b"first output\nsecond output\n";
        let source = Trickle { data: data, step: 7, interrupted: false };
        let mut console = Vec::new();

        let err = duplicate(Channel::Stdout, source, &mut console, &sink).expect_err("sink is full");

        match *err.kind() {
            ErrorKind::Sink(ref p) => assert_eq!(p, Path::new("/dev/full")),
            ref other => panic!("Expected sink error, got {:?}", other),
        }
        assert_eq!(console, data.to_vec());
    }
}
