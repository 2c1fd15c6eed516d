//! Streaming text report.
//!
//! Segments are written and flushed as soon as they finish, so a run that
//! stops on a failure still shows every completed segment.

use crate::format::fmt_general;
use crate::report::{ModeReport, RunReport, SegmentReport};
use std::io::{self, Write};
use ulpcheck_core::RoundingMode;

/// Receives report pieces as the run progresses
pub trait ReportSink {
    /// One segment finished
    fn segment_finished(&mut self, mode: RoundingMode, segment: &SegmentReport) -> io::Result<()>;

    /// All segments of a mode finished
    fn mode_finished(&mut self, mode: &ModeReport) -> io::Result<()>;

    /// The whole run finished
    fn run_finished(&mut self, _report: &RunReport) -> io::Result<()> {
        Ok(())
    }
}

/// Discards everything; used when the report is rendered at the end
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn segment_finished(&mut self, _: RoundingMode, _: &SegmentReport) -> io::Result<()> {
        Ok(())
    }

    fn mode_finished(&mut self, _: &ModeReport) -> io::Result<()> {
        Ok(())
    }
}

/// Human-readable histogram tables
#[derive(Debug)]
pub struct ReportPrinter<W: Write> {
    out: W,
}

impl<W: Write> ReportPrinter<W> {
    /// Print to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ReportPrinter<W> {
    fn segment_finished(&mut self, mode: RoundingMode, segment: &SegmentReport) -> io::Result<()> {
        let total = segment.total();
        writeln!(
            self.out,
            "Checking rounding mode {:13}, {}, count {}",
            mode.name(),
            segment.label,
            total
        )?;
        for (ulp, count) in &segment.histogram {
            let percent = if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            };
            writeln!(
                self.out,
                "    {}: {:16} {:6.2}%",
                fmt_general(ulp, 0, 6),
                count,
                percent
            )?;
        }
        self.out.flush()
    }

    fn mode_finished(&mut self, mode: &ModeReport) -> io::Result<()> {
        writeln!(self.out, "elapsed {}: {:.3}s", mode.mode.name(), mode.elapsed_secs)?;
        writeln!(self.out)?;
        self.out.flush()
    }

    fn run_finished(&mut self, report: &RunReport) -> io::Result<()> {
        writeln!(self.out, "{}", "=".repeat(60))?;
        writeln!(
            self.out,
            "{}: max {} ulp, {} failure(s), total elapsed {:.3}s",
            report.meta.function.name,
            fmt_general(report.max_ulp(), 0, 6),
            report.failures(),
            report.elapsed_secs
        )?;
        self.out.flush()
    }
}
