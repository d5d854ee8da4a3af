// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! Wizard state, category schemas and the pure rules that act on them.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** No I/O; collaborators are described as traits

pub mod category;
pub mod form;
pub mod wizard;
pub mod schema;
pub mod validation;
pub mod staging;
pub mod step;
pub mod payload;
pub mod draft;
pub mod repository;
pub mod collaborators;
pub mod events;
pub mod config;
