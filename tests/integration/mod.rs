//! Integration tests for the webpack configuration helper

mod build_flow;
mod cli;
mod config_integration;
mod lifecycle;
mod registry;
