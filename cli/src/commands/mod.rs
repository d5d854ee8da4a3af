// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the jobwizard CLI

pub mod config;
pub mod draft;
pub mod request;

pub use self::config::ConfigCommand;
pub use self::draft::DraftCommand;
pub use self::request::RequestCommand;
