// SPDX-License-Identifier: MIT

//! Checkpointed human-in-the-loop approval workflows
//!
//! A fixed pipeline of pure step functions runs up to an interrupt
//! boundary, persists its state under a caller-assigned thread id, and
//! resumes to a terminal step once a human decision is submitted.

pub mod data;
pub mod flow;
pub mod server;
