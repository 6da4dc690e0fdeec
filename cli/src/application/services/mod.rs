//! Application services — use-case orchestration.
//!
//! Each service module composes domain logic with port trait calls. Services
//! import only from `crate::domain` and `crate::application` — never from
//! `crate::infra`.

pub mod runner;
pub mod staging;
