//! Service layer of the fixed-asset registry.
//! - Business rules on top of the `models` entities: uniqueness, generated
//!   codes, soft state and the audit trail.
//! - Authentication and the permission catalog.
//! - Building valuation with UFV indices and PDF reports.

pub mod errors;
pub mod auth;
pub mod codes;
pub mod pagination;
pub mod persist;
pub mod status_service;
pub mod audit_service;
#[cfg(test)]
pub mod test_support;

pub mod rbac;
pub mod role_service;
pub mod user_service;
pub mod seeder;

pub mod geografia;
pub mod estructura;
pub mod personal_service;
pub mod contabilidad;
pub mod ufv_service;

pub mod valuation;
pub mod edificio_service;
pub mod movimientos;

pub mod report;
