// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Port Allocator (C1).
//!
//! Allocation itself is a pure function over the already-used set; the
//! uniqueness constraint on `Sandbox.port` enforced by the catalog's
//! transactional insert is the actual ground truth (spec.md §4.1) — a
//! caller that allocates without an enclosing transaction is racing and
//! must retry on conflict.

use std::collections::HashSet;
use std::ops::RangeInclusive;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PortAllocError {
    #[error("no ports available in range")]
    NoPortsAvailable,
}

#[derive(Debug, Clone)]
pub struct PortAllocator {
    range: RangeInclusive<u16>,
}

impl PortAllocator {
    pub fn new(range: RangeInclusive<u16>) -> Self {
        Self { range }
    }

    /// Lowest port in range not present in `used`.
    pub fn allocate(&self, used: &[u16]) -> Result<u16, PortAllocError> {
        let used: HashSet<u16> = used.iter().copied().collect();
        self.range
            .clone()
            .find(|port| !used.contains(port))
            .ok_or(PortAllocError::NoPortsAvailable)
    }
}

#[cfg(test)]
#[path = "port_allocator_tests.rs"]
mod tests;
