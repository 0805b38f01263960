// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! clawbowl-storage: the durable catalog of `Sandbox` rows and registered
//! push device tokens, backed by `sqlx`/SQLite.

pub mod catalog;
pub mod device_token;
pub mod error;
pub mod sqlite_catalog;

pub use catalog::{Catalog, NewSandbox};
pub use device_token::{DeviceTokenStore, SqliteDeviceTokenStore};
pub use error::CatalogError;
pub use sqlite_catalog::SqliteCatalog;
