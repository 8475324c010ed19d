//! Organizational structure: unidad organizacional -> area -> ambiente -> cargo.

pub mod unidad_service;
pub mod area_service;
pub mod ambiente_service;
pub mod cargo_service;
