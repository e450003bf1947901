//! Result emitter.

use std::io::{self, Write};

use imgtag_models::{ImageReference, OutputLine, Prediction, RecordId};

/// Writes one comma-joined line per classified record.
///
/// Every line is flushed as soon as it is written.
pub struct ResultEmitter<W: Write> {
    out: W,
    lines_written: u64,
}

impl<W: Write> ResultEmitter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines_written: 0,
        }
    }

    /// Write the line for `id`. Returns `false` without writing when the
    /// prediction is empty.
    pub fn emit(
        &mut self,
        id: &RecordId,
        image_url: Option<&ImageReference>,
        prediction: &Prediction,
    ) -> io::Result<bool> {
        if prediction.is_empty() {
            return Ok(false);
        }

        let line = OutputLine::new(id, image_url, prediction);
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        self.lines_written += 1;

        Ok(true)
    }

    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
