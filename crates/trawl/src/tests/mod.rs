//! Unit and behaviour tests for `trawl`.

mod support;

mod matcher_tests;
mod visitor_tests;
