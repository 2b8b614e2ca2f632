//! Host window implementations.
//!
//! The dialog never talks to its opener directly; it writes through a
//! [`crate::core::transport::HostWindow`].  In the terminal the opener is
//! the wrapping process, which reads the exit lines on stdout.

pub mod terminal;
