use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Buffered destination for scenario listings and reports: a file when
/// `--output` is given, stdout otherwise.
pub struct ReportSink {
    inner: BufWriter<Box<dyn Write>>,
    destination: Option<PathBuf>,
}

impl ReportSink {
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let writer: Box<dyn Write> = match path {
            Some(path) => Box::new(
                File::create(path)
                    .with_context(|| format!("failed to create {}", path.display()))?,
            ),
            None => Box::new(io::stdout()),
        };
        Ok(Self {
            inner: BufWriter::new(writer),
            destination: path.map(Path::to_path_buf),
        })
    }

    /// Flush everything written so far.
    pub fn finish(mut self) -> Result<()> {
        self.inner.flush().with_context(|| match &self.destination {
            Some(path) => format!("failed to write {}", path.display()),
            None => "failed to write report to stdout".to_string(),
        })
    }
}

impl Write for ReportSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
