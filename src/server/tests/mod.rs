//! End-to-end tests of the dispatch engine
