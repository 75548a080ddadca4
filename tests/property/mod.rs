//! Property-based tests for path addressing

mod addressing;
