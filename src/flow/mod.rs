// SPDX-License-Identifier: MIT

pub mod engine;
pub mod error;
pub mod nodes;
pub mod router;
pub mod state;
pub mod store;
