//! Terminal output helpers

pub mod icons;

pub use icons::StatusIcon;
