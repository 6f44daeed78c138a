//! Domain layer for Usage

pub mod entities;
pub mod pricing;
