//! Request-scoped background removal pipeline: scratch storage, external tool
//! invocation, and unconditional cleanup.
#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions, clippy::multiple_crate_versions)]

mod error;
mod invoker;
mod pipeline;
mod storage;

pub use error::{EngineError, EngineResult};
pub use invoker::{CommandInvoker, ToolCommand, TransformInvoker};
pub use pipeline::{Delivery, OUTPUT_CONTENT_TYPE, Pipeline, UploadedAsset};
pub use storage::TempStore;
