//! Core dialog logic – catalog access, session lifecycle, selection and
//! response transports.
//!
//! Nothing in this module depends on any TUI or rendering crate.  The host
//! window is reached only through the [`transport::HostWindow`] trait and the
//! network only through [`catalog::CatalogClient`].

pub mod catalog;
pub mod controller;
pub mod error;
pub mod form;
pub mod resource;
pub mod results;
pub mod session;
pub mod transport;
