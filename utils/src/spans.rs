//! Pre-built [`tracing::Span`] constructors for common explorer operations.
//!
//! Using consistent span names and field sets across crates makes it easy to
//! filter and correlate traces for one request.

use tracing::{debug_span, info_span, Span};

/// Span covering one confirmation-delay computation.
pub fn confirmation_span(unit: &str) -> Span {
    info_span!("confirmation", unit = %unit)
}

/// Span covering the main-chain descent of a single trace.
pub fn descent_span(start: &str) -> Span {
    debug_span!("mc_descent", start = %start)
}

/// Span covering the aggregation of one unit's detail record.
pub fn unit_info_span(unit: &str) -> Span {
    info_span!("unit_info", unit = %unit)
}

/// Span covering a graph listing request.
pub fn listing_span(kind: &str, limit: usize) -> Span {
    debug_span!("listing", kind = %kind, limit = %limit)
}

/// Span covering a single HTTP API route handled by the RPC server.
pub fn rpc_span(route: &str) -> Span {
    info_span!("rpc", route = %route)
}

/// Span covering a snapshot import into a store backend.
pub fn import_span(units: usize) -> Span {
    info_span!("import", units = %units)
}
