// Project Gate - Library Root
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// All modules exported here for use by the binary and tests.

pub mod paths;
pub mod config;
pub mod error;
pub mod guard;
pub mod envelope;
pub mod schema;
pub mod files;
pub mod exec;
pub mod notify;
pub mod dispatch;
pub mod mcp;
