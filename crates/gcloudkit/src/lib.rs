//! # gcloudkit
//!
//! Typed access to the Google Cloud control plane through the `gcloud` CLI.
//!
//! This crate provides functionality for:
//! - Querying project, billing, service, IAM and bucket state (read-only)
//! - Issuing the matching mutations (create, link, enable, bind)
//! - Classifying gcloud failures into "not found", "already exists",
//!   permission and network errors
//!
//! ## Example
//!
//! ```no_run
//! use gcloudkit::backend::{Backend, default_backend};
//! use gcloudkit::BucketSpec;
//!
//! let gcloud = default_backend().expect("gcloud not available");
//!
//! if !gcloud.bucket_exists("acme-infra", "acme-tfstate").expect("query failed") {
//!     let bucket = BucketSpec {
//!         name: "acme-tfstate".to_string(),
//!         location: "us-central1".to_string(),
//!         uniform_access: true,
//!     };
//!     match gcloud.create_bucket("acme-infra", &bucket) {
//!         Ok(()) => println!("created"),
//!         Err(e) if e.is_conflict() => println!("someone else created it"),
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod error;
pub mod exec;
pub mod types;

pub use backend::{Backend, default_backend};
pub use error::{Error, ErrorCategory, Result};
pub use types::{
    BucketSpec, IamBinding, IamPolicy, IamScope, ProjectSpec, ServiceAccountSpec, bucket_url,
    service_account_email, service_account_member,
};
