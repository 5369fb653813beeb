//! Property-based tests
//!
//! Invariants checked with proptest across many generated inputs:
//!
//! - `pipeline_props`: generation workflow
//!   - Valid text yields exactly `count` suggestions or a typed failure
//!   - Out-of-range text never reaches a collaborator
//!   - Exactly one audit or error record per gated attempt
//!   - Rate limiter permits exactly when below the ceiling
//!
//! Async workflows run on a current-thread runtime per case.
