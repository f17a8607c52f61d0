//! Helper module for diagnostic output.
//!
//! A [`Log`] writes human-readable reports to some sink, standard error by
//! default, but only if the report's volume does not exceed the configured
//! one. Diagnostics are best effort: Failing to write a report does not fail
//! the computation being reported on.

use std::io::Write;

use crate::opt::Volume;

/// A volume-gated diagnostic log.
#[derive(Debug)]
pub struct Log<W: Write = std::io::Stderr> {
    volume: Volume,
    sink: W,
}

impl Log {
    /// Create a new log writing to standard error.
    pub fn stderr(volume: Volume) -> Self {
        Self::new(volume, std::io::stderr())
    }
}

impl<W: Write> Log<W> {
    /// Create a new log writing to the given sink.
    pub fn new(volume: Volume, sink: W) -> Self {
        Self { volume, sink }
    }

    /// Get the volume.
    pub fn volume(&self) -> Volume {
        self.volume
    }

    /// Write the report at regular volume.
    pub fn regular<D: std::fmt::Display>(&mut self, report: D) {
        if self.volume != Volume::Silent {
            let _ = writeln!(self.sink, "{}", report);
        }
    }

    /// Write the report at detailed volume.
    pub fn detailed<D: std::fmt::Display>(&mut self, report: D) {
        if self.volume == Volume::Detailed {
            let _ = writeln!(self.sink, "{}", report);
        }
    }

    /// Consume this log and return its sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[cfg(test)]
mod test {
    use super::Log;
    use crate::opt::Volume;

    fn render(volume: Volume) -> String {
        let mut log = Log::new(volume, Vec::new());
        assert_eq!(log.volume(), volume);
        log.regular("regular");
        log.detailed(format_args!("detailed {}", 42));
        String::from_utf8(log.into_inner()).unwrap()
    }

    #[test]
    fn test_volume() {
        assert_eq!(render(Volume::Silent), "");
        assert_eq!(render(Volume::Regular), "regular\n");
        assert_eq!(render(Volume::Detailed), "regular\ndetailed 42\n");
    }
}
