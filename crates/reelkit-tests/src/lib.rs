//! Integration test crate for Reelkit.
//!
//! This crate exists solely to hold cross-crate integration tests.
//! It depends on every reelkit crate to verify they work together.

#[cfg(test)]
mod support;

#[cfg(test)]
mod scenarios;

#[cfg(test)]
mod export;

#[cfg(test)]
mod session;
