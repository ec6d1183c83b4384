//! Tracing setup shared by the relay binaries.
//!
//! Provider events (target `llm_provider::*`) get their own compact layer with
//! UTC timestamps and source locations, so upstream calls stand out from
//! request logs. Everything else goes through a plain `fmt` layer.

use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::filter::{Directive, ParseError};
use tracing_subscriber::fmt::{format::Writer, time::FormatTime};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "llm_provider";

/// `2025-09-12T10:20:30Z`
#[derive(Clone, Copy, Debug, Default)]
struct UtcSeconds;

impl FormatTime for UtcSeconds {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&stamp)
    }
}

pub fn is_provider_event(meta: &Metadata<'_>) -> bool {
    meta.target().starts_with(TARGET_PREFIX)
}

/// Layer that renders only provider events.
///
/// ANSI colors are enabled when stdout is a terminal.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_ansi(io::stdout().is_terminal())
        .event_format(
            fmt::format()
                .compact()
                .with_timer(UtcSeconds)
                .with_level(true)
                .with_target(true)
                .with_source_location(true),
        )
        .with_filter(filter::filter_fn(is_provider_event))
}

/// `llm_provider=<level>`.
pub fn level_directive(level: Level) -> Result<Directive, ParseError> {
    Directive::from_str(&format!(
        "{TARGET_PREFIX}={}",
        level.as_str().to_ascii_lowercase()
    ))
}

/// `RUST_LOG` (or `default` when unset or invalid) with `provider_level`
/// applied to this crate.
pub fn env_filter_with_level(default: &str, provider_level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match level_directive(provider_level) {
        Ok(directive) => base.add_directive(directive),
        Err(_) => base,
    }
}

/// Installs the global subscriber: the env filter, a plain layer for
/// everything outside this crate, and [`layer`] for provider events.
///
/// # Errors
/// Fails if a global subscriber is already set.
pub fn init(default: &str, provider_level: Level) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter_with_level(default, provider_level))
        .with(
            fmt::layer()
                .with_target(false)
                .with_filter(filter::filter_fn(|meta: &Metadata<'_>| !is_provider_event(meta))),
        )
        .with(layer())
        .try_init()
}
