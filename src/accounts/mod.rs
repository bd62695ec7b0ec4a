// SPDX-License-Identifier: GPL-3.0-only
pub mod book;
pub mod models;

pub use book::AccountBook;
pub use models::{Account, AccountSummary};
