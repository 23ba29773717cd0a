//! Scroll-spy navigation for single-page sites.
//!
//! The core ([`spy`], [`scroll`], [`navigate`]) is plain Rust behind the
//! capability traits in [`host`]; [`dom`] and [`hooks`] bind it to the browser
//! and Yew.

pub mod config;
pub mod dom;
pub mod error;
pub mod hooks;
pub mod host;
pub mod navigate;
pub mod scroll;
pub mod spy;

pub mod components {
    pub mod nav;
}
pub mod pages {
    pub mod home;
}

pub use error::{Error, Result};
