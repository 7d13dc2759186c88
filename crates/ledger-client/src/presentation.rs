//! # Result Presentation
//!
//! Renders workflow results to the primary channel and reports to the
//! diagnostic channel. Write failures on either channel are dropped: display
//! never fails a workflow.

use std::io::{self, Stderr, Stdout, Write};

use serde_json::Value;

/// Label printed before a rendered contract result.
pub const RESULT_LABEL: &str = "[Return]";

/// Primary and diagnostic output channels.
pub struct Console<O, E> {
    out: O,
    err: E,
}

impl Console<Stdout, Stderr> {
    /// Process standard output and standard error.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Console<O, E> {
    /// Bind explicit writers.
    pub fn new(out: O, err: E) -> Self {
        Self { out, err }
    }

    /// The primary channel.
    pub fn out(&self) -> &O {
        &self.out
    }

    /// The diagnostic channel.
    pub fn err(&self) -> &E {
        &self.err
    }

    /// Release the writers.
    pub fn into_parts(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Render a contract result. Absent values render nothing.
    pub fn render(&mut self, value: Option<&Value>) {
        let _ = render(&mut self.out, value);
    }

    /// Write one line to the primary channel.
    pub fn say(&mut self, line: &str) {
        let _ = writeln!(self.out, "{line}");
        let _ = self.out.flush();
    }

    /// Write one line to the diagnostic channel.
    pub fn report(&mut self, line: &str) {
        let _ = writeln!(self.err, "{line}");
        let _ = self.err.flush();
    }

    /// Write an error and its full cause chain to the diagnostic channel.
    pub fn diagnose(&mut self, chain: &[String]) {
        let mut lines = chain.iter();
        if let Some(head) = lines.next() {
            let _ = writeln!(self.err, "error: {head}");
        }
        for cause in lines {
            let _ = writeln!(self.err, "  caused by: {cause}");
        }
        let _ = self.err.flush();
    }
}

/// Write `value` as a labeled, indented JSON document.
pub fn render<W: Write>(out: &mut W, value: Option<&Value>) -> io::Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let pretty = serde_json::to_string_pretty(value)?;
    writeln!(out, "{RESULT_LABEL}")?;
    writeln!(out, "{pretty}")?;
    out.flush()
}
