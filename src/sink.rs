//! Output sink: ordered text writes for replies, echoes, and history dumps.

use std::io::{self, Stderr, Stdout, Write};

pub trait OutputSink {
    /// Write `text` and make it visible before returning.
    fn write(&mut self, text: &str) -> io::Result<()>;

    /// Surface a recovered failure to the user, out of band from `write`.
    fn report(&mut self, message: &str) -> io::Result<()>;
}

/// Sink over a pair of writers: content goes to `out`, reports to `err`.
#[derive(Debug)]
pub struct WriterSink<O, E> {
    out: O,
    err: E,
}

pub type StdoutSink = WriterSink<Stdout, Stderr>;

impl StdoutSink {
    pub fn stdout() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> WriterSink<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

impl<O: Write, E: Write> OutputSink for WriterSink<O, E> {
    fn write(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        self.out.flush()
    }

    fn report(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.err, "error: {message}")?;
        self.err.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::{OutputSink, WriterSink};

    #[test]
    fn writes_and_reports_go_to_separate_writers() {
        let mut sink = WriterSink::new(Vec::new(), Vec::new());

        sink.write("Hel").expect("write");
        sink.write("lo").expect("write");
        sink.report("boom").expect("report");

        let (out, err) = sink.into_inner();
        assert_eq!(String::from_utf8(out).expect("utf8"), "Hello");
        assert_eq!(String::from_utf8(err).expect("utf8"), "error: boom\n");
    }
}
