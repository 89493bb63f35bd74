//! Unit tests for `trawl_core` types.

mod span_tests;
