//! Accounting classification: grupo contable -> auxiliar.

pub mod grupo_contable_service;
pub mod auxiliar_service;
