// fataar-rs: Android library archive merger
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |        table / remap / merge ..
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |   config  +  store        |
//!              |  TOML layers, BuildContext |
//!              '--+--------+--------+------'
//!                 |        |        |
//!                 v        v        v
//!              remap     values   manifest
//!           classfile  sanitize   external
//!            rtable      xml      merger
//!                 |        |
//!                 +---+----+
//!                     v
//!                  archive
//!          exploded AAR layout, namespaces
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod archive;
pub mod classfile;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod logging;
pub mod manifest;
pub mod remap;
pub mod rtable;
pub mod sanitize;
pub mod store;
pub mod utility;
pub mod values;
pub mod xml;
