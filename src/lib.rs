//! This library crate turns one configuration payload and one container image into a reachable service
//! running on Kubernetes.
//!
//! Submodules have been introduced to split responsibilities. The low-level [`library`] contains project
//! agnostic helpers, the [`domain`] describes workload identities, configuration payloads and the resource
//! templates, and the [`module`] layer orchestrates binding and submission against the control plane.

#![deny(missing_docs)]

pub mod constants;
pub mod domain;
pub mod library;
pub mod module;
