//! Location chain: ciudad -> distrito -> nucleo.

pub mod ciudad_service;
pub mod distrito_service;
pub mod nucleo_service;
