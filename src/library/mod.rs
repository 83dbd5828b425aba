//! Independent and project agnostic libraries
//!
//! Nothing in here knows about workloads or Kubernetes, everything domain specific lives
//! in the [`domain`](super::domain) module.

pub mod helpers;
