use tracing::{Span, field};

use super::TraceId;

/// Root span for one unit of engine work (an evaluation pass, a sweep, a
/// pushed or manual refresh). `trigger` and `partitions` are recorded once
/// known; `partitions` stays empty when nothing is refetched.
pub fn root_span(name: &'static str, trace_id: &TraceId) -> Span {
    tracing::info_span!(
        "root",
        name = %name,
        trace_id = %trace_id,
        trigger = field::Empty,
        partitions = field::Empty
    )
}

/// Child span; inherits the trace id from the enclosing root span.
pub fn child_span(name: &'static str) -> Span {
    tracing::info_span!("child", name = %name, partition = field::Empty)
}
