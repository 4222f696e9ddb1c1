// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for cluster DNS discovery.
//!
//! Reading the cluster domain out of the resolver configuration can fail in
//! three distinct ways, and callers react differently to each:
//! - the file cannot be opened
//! - reading fails part way through the file
//! - the file is readable but carries no `search ... svc.<domain>` directive
//!
//! Only the last one means "the data is absent". Callers typically substitute
//! [`DEFAULT_CLUSTER_DOMAIN`](crate::constants::DEFAULT_CLUSTER_DOMAIN) in that case.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by [`get_cluster_domain`](crate::dns::get_cluster_domain).
#[derive(Error, Debug)]
pub enum ClusterDomainError {
    /// The resolver configuration file could not be opened
    #[error("Failed to open resolver configuration {}: {source}", path.display())]
    Open {
        /// Path that was opened
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A line of the resolver configuration could not be read
    ///
    /// Lines are scanned as raw bytes, so only genuine I/O failures end up here.
    /// Any domain matched before the failure is discarded.
    #[error("Failed to scan resolver configuration {} at line {line}: {source}", path.display())]
    Scan {
        /// Path being scanned
        path: PathBuf,
        /// 1-based number of the line that failed
        line: usize,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No `search` directive carried a `svc.<domain>` entry
    #[error("Failed to find cluster domain in {}", path.display())]
    NotFound {
        /// Path that was scanned
        path: PathBuf,
    },
}

impl ClusterDomainError {
    /// Returns true when the file was read successfully but held no cluster domain.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
