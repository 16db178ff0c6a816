//! Pure taxonomy resolution and policy evaluation (no IO).
//!
//! Input: environment/segment records and a compliance catalog loaded elsewhere.
//! Output: a resolved taxonomy (when it passes) plus findings, verdict and summary data.

#![forbid(unsafe_code)]

pub mod inheritance;
pub mod labels;
pub mod model;
pub mod plugins;
pub mod policy;
pub mod problem;
pub mod report;
pub mod rules;
pub mod xref;

mod engine;
mod fingerprint;

pub use engine::{Resolution, evaluate, resolve};

#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod test_support;
