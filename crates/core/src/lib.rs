//! Core library for codeforge
//!
//! This crate implements the **Functional Core** of the codeforge service,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The codeforge project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`codeforge_core`** (this crate): Deterministic transformations and filesystem
//!   primitives with no network or async dependencies
//! - **`codeforge`**: Model-provider I/O, HTTP, and orchestration (the Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! Functions in this crate adhere to these principles:
//!
//! - **Deterministic**: Same input always produces the same output (filesystem
//!   primitives are deterministic over the tree they are given)
//! - **No hidden effects**: No network calls, no global state, no async
//! - **Testable**: Can be tested with fixture data and temp directories, no mocking
//!
//! # Module Organization
//!
//! The core crate is organized by pipeline stage:
//!
//! - [`contract`]: Structured-output contract enforcement for model completions
//! - [`manifest`]: Project manifest model and file path validation
//! - [`materialize`]: Manifest-to-disk tree materialization
//! - [`archive`]: Zip packaging of materialized project trees
//! - [`workspace`]: Request-scoped workspace naming, listing, and retention
//! - [`prompt`]: Prompt builders for the generation and review calls
//!
//! Each module contains:
//!
//! - **Domain models**: Structured types for manifests, outputs, and workspace entries
//! - **Transformation functions**: The deterministic stage logic
//! - **Comprehensive tests**: Unit tests using fixture data and temp directories

pub mod archive;
pub mod contract;
pub mod manifest;
pub mod materialize;
pub mod prompt;
pub mod workspace;
