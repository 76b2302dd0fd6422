//! Observability setup for folio: tracing subscriber and optional
//! OpenTelemetry export.

pub mod tracing_setup;
