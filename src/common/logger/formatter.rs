use core::fmt as core_fmt;

use time::{format_description::BorrowedFormatItem, macros::format_description};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self, FmtContext,
        format::{FormatEvent, FormatFields},
    },
    registry::LookupSpan,
};

const TIMESTAMP: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second].[subsecond digits:3]");

/// Escape codes used by one output. Empty strings when color is off.
#[derive(Clone, Copy)]
struct Palette {
    reset: &'static str,
    bold: &'static str,
    dim: &'static str,
}

impl Palette {
    const ANSI: Self = Self {
        reset: "\x1b[0m",
        bold: "\x1b[1m",
        dim: "\x1b[2m",
    };
    const PLAIN: Self = Self {
        reset: "",
        bold: "",
        dim: "",
    };

    fn level(&self, level: Level) -> &'static str {
        if self.reset.is_empty() {
            return "";
        }
        match level {
            Level::ERROR => "\x1b[31m",
            Level::WARN => "\x1b[33m",
            Level::INFO => "\x1b[32m",
            Level::DEBUG => "\x1b[34m",
            Level::TRACE => "\x1b[35m",
        }
    }
}

fn timestamp() -> String {
    time::OffsetDateTime::now_local()
        .unwrap_or_else(|_| time::OffsetDateTime::now_utc())
        .format(TIMESTAMP)
        .unwrap_or_else(|_| "Unknown Time".to_string())
}

/// `[timestamp] LEVEL target: line > message`, optionally colored.
pub struct CustomFormatter {
    palette: Palette,
}

impl CustomFormatter {
    pub fn new(use_ansi: bool) -> Self {
        Self {
            palette: if use_ansi { Palette::ANSI } else { Palette::PLAIN },
        }
    }
}

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: fmt::format::Writer<'_>,
        event: &Event<'_>,
    ) -> core_fmt::Result {
        let Palette { reset, bold, dim } = self.palette;
        let metadata = event.metadata();
        let level = *metadata.level();
        let line = metadata.line().map_or_else(|| "??".to_string(), |l| l.to_string());

        write!(
            writer,
            "{dim}[{}]{reset} {}{bold}{: <5}{reset} {dim}{}: {}{reset} > ",
            timestamp(),
            self.palette.level(level),
            level.as_str(),
            metadata.target(),
            line,
        )?;
        ctx.format_fields(writer.by_ref(), event)?;

        // Reset so colors never leak into the shell.
        writeln!(writer, "{reset}")
    }
}
