//! Unit and behaviour tests for `trawl_syntax`.
