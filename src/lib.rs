// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Unused / redundant code
#![warn(unused_results)]
#![warn(unused_qualifications)]

//! Instanced particle "splash" effect built on wgpu.
//!
//! A splash is a small, fixed pool of instances of one dome-shaped mesh.
//! Every frame each instance grows, fades out through a noise-driven
//! discard threshold, and is reseeded with a fresh random scale and
//! rotation once fully faded.
//!
//! # Key entry points
//!
//! - [`app::SplashApp`] - the effect handle a host attaches, ticks and
//!   tears down
//! - [`animation::SplashAnimator`] - the per-frame grow/fade/reset rule
//! - [`geometry::build_instanced_geometry`] - extends a source mesh with
//!   per-instance attribute buffers
//! - [`renderer::SplashRenderer`] - uploads dirty buffers and issues the
//!   instanced draw
//! - [`options::SplashOptions`] - tunables with TOML preset support
//!
//! # Architecture
//!
//! The model is loaded once on a background thread and handed back through
//! a cancellable [`assets::PendingLoad`]. Until it resolves the app renders
//! nothing. After it resolves the app owns the instanced geometry and
//! mutates it in place on the host's frame callback; the renderer only
//! re-uploads buffers whose dirty flag is set.

pub mod animation;
pub mod app;
pub mod assets;
pub mod error;
pub mod geometry;
pub mod gpu;
pub mod options;
pub mod renderer;
pub mod scene;
pub mod shading;
pub mod splash;
