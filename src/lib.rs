//! Rewrite G-code so an interrupted print can resume at a chosen layer height.
//!
//! [`resume::transform`] is the whole job for library users: it finds the
//! first layer at or above the requested height, comments out homing, Z moves
//! and everything else ahead of it, and prepends a provenance header. The
//! [`service`] module exposes the same operation, plus sandboxed file access,
//! over a framed JSON protocol.

pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod resume;
pub mod service;

pub use config::{ResumeConfig, ServiceConfig};
pub use error::{ResumeError, ServiceError};
pub use resume::{transform, RewriteStats, TransformResult};
