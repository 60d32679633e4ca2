//! Configuration for release packaging.
//!
//! [`Settings`] is an explicit value built once by [`SettingsBuilder`] and
//! passed to the [`Releaser`](crate::packager::Releaser). Nothing is read from
//! ambient state after it is built.

mod builder;
mod core;

pub use builder::SettingsBuilder;
pub use core::Settings;
