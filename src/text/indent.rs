use std::fmt;

pub const INDENT: usize = 2;

/// Prefixes every non-empty line written through it with [`INDENT`] spaces.
///
/// Wrapping an `IndentWriter` in another one stacks the indentation, which is
/// how nested genomes end up visually nested.
pub struct IndentWriter<'a> {
    inner: &'a mut dyn fmt::Write,
    at_line_start: bool,
}

impl<'a> IndentWriter<'a> {
    pub fn new(inner: &'a mut dyn fmt::Write) -> Self {
        Self {
            inner,
            at_line_start: true,
        }
    }
}

impl fmt::Write for IndentWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for line in s.split_inclusive('\n') {
            if self.at_line_start && line != "\n" {
                self.inner.write_str(&" ".repeat(INDENT))?;
            }
            self.inner.write_str(line)?;
            self.at_line_start = line.ends_with('\n');
        }
        Ok(())
    }
}
