use std::io;

use nu_ansi_term::Color::{self, Blue, DarkGray, Magenta, Red, Yellow};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields,
    },
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::{cli::Args, utils::Colored};

/// Collects the message of an event and any extra `key=value` fields.
#[derive(Default)]
struct EventVisitor {
    message: Option<String>,
    fields: Vec<String>,
}

impl tracing::field::Visit for EventVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        } else {
            self.fields.push(format!("{}={:?}", field.name(), value));
        }
    }
}

fn level_tag(level: Level) -> Option<(Color, &'static str)> {
    match level {
        Level::TRACE => Some((Magenta, "[TRACE]")),
        Level::DEBUG => Some((Blue, "[DEBUG]")),
        Level::INFO => None,
        Level::WARN => Some((Yellow, "[WARN]")),
        Level::ERROR => Some((Red, "[ERROR]")),
    }
}

/// Compact human readable event format: a colored level tag (none for
/// info), the message, then extra fields dimmed.
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        if let Some((color, tag)) = level_tag(*event.metadata().level()) {
            write!(writer, "{} ", Colored(color, tag))?;
        }

        write!(writer, "{}", visitor.message.unwrap_or_default())?;

        if !visitor.fields.is_empty() {
            write!(writer, " {}", Colored(DarkGray, visitor.fields.join(" ")))?;
        }

        writeln!(writer)
    }
}

pub fn setup_logging(args: &Args) {
    let filter_level = if args.quiet {
        Level::ERROR
    } else if args.verbose >= 2 {
        Level::TRACE
    } else if args.verbose == 1 {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let builder = fmt::Subscriber::builder()
        .with_env_filter(format!("quarry={filter_level}"))
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_span_events(FmtSpan::NONE)
        // stdout carries command results only
        .with_writer(io::stderr)
        .compact()
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json_logs {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(CustomFormatter).finish())
    };

    if let Err(err) = subscriber.try_init() {
        eprintln!("Failed to set tracing subscriber: {err}");
    }
}
