//! Single test binary entry point.
//!
//! All integration tests compile into one binary to keep link time down.
//!
//! Structure:
//! - unit: Single-component tests through the public API
//! - integration: Pool, layout and builder workflows end to end

mod helpers;
