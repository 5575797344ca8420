//! Metrics collection for quote computations
//!
//! Counts quotes by outcome and records how long each one took, using Prometheus.

use crate::error::Result;
use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::time::Instant;

lazy_static! {
    /// Global Prometheus registry instance
    pub static ref REGISTRY_INSTANCE: Registry = Registry::new();

    /// Counter for quotes by outcome (`ok`, `invalid_argument`, `overflow`, ...)
    pub static ref QUOTE_COUNTER_VEC: CounterVec =
        CounterVec::new(Opts::new("quote_counter", "quote counter"), &["outcome"]).unwrap();

    /// Histogram of quote computation times
    pub static ref QUOTE_HISTOGRAM_VEC: HistogramVec = HistogramVec::new(
        HistogramOpts::new("quote_cost", "quote cost"),
        &["outcome"]
    )
    .unwrap();
}

/// Registers all metric collectors with the global registry
pub fn init_registry() {
    let _ = REGISTRY_INSTANCE.register(Box::new(QUOTE_COUNTER_VEC.clone()));
    let _ = REGISTRY_INSTANCE.register(Box::new(QUOTE_HISTOGRAM_VEC.clone()));
}

fn outcome_label<T>(result: &Result<T>) -> &'static str {
    use crate::error::SettleError::*;
    match result {
        Ok(_) => "ok",
        Err(InvalidArgument(_)) => "invalid_argument",
        Err(Overflow(_)) => "overflow",
        Err(Parse { .. }) => "parse",
        Err(Config(_)) => "config",
        Err(UnknownInstrument(_)) => "unknown_instrument",
    }
}

/// Runs a quote computation and records its outcome and duration
///
/// # Arguments
///
/// * `handler` - Computation to execute and measure
///
/// # Returns
///
/// Returns the result of the handler unchanged
pub fn record_quote<F, T>(handler: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let start = Instant::now();
    let result = handler();
    let outcome = outcome_label(&result);

    QUOTE_COUNTER_VEC.with_label_values(&[outcome]).inc();
    QUOTE_HISTOGRAM_VEC
        .with_label_values(&[outcome])
        .observe(start.elapsed().as_secs_f64());

    result
}

/// Renders the registry in the Prometheus text exposition format
pub fn gather_text() -> prometheus::Result<String> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&REGISTRY_INSTANCE.gather(), &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SettleError;

    #[test]
    fn test_record_quote_counts_outcomes() {
        init_registry();
        let ok_before = QUOTE_COUNTER_VEC.with_label_values(&["ok"]).get();
        let bad_before = QUOTE_COUNTER_VEC
            .with_label_values(&["invalid_argument"])
            .get();

        assert_eq!(record_quote(|| Ok(7)), Ok(7));
        let failed: Result<()> = record_quote(|| Err(SettleError::invalid("nope")));
        assert!(failed.is_err());

        assert!(QUOTE_COUNTER_VEC.with_label_values(&["ok"]).get() >= ok_before + 1.0);
        assert!(
            QUOTE_COUNTER_VEC
                .with_label_values(&["invalid_argument"])
                .get()
                >= bad_before + 1.0
        );

        let text = gather_text().unwrap();
        assert!(text.contains("quote_counter"));
        assert!(text.contains("quote_cost"));
    }
}
