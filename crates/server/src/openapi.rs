use chrono::NaiveDate;
use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(utoipa::ToSchema)]
pub struct ChangePasswordRequest { pub current_password: String, pub new_password: String }

#[derive(utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub full_name: String,
    pub role_id: Uuid,
    pub personal_id: Option<Uuid>,
    pub password: String,
}

#[derive(utoipa::ToSchema)]
pub struct PermissionsRequest {
    /// Permission codes such as `edificios.read`.
    pub permissions: Vec<String>,
}

#[derive(utoipa::ToSchema)]
pub struct BajaRequest {
    pub edificio_id: Uuid,
    pub date: NaiveDate,
    pub reason: String,
    pub resolution: String,
}

/// Query accepted by every paginated listing.
#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// 1-based, defaults to 1
    pub page: Option<u32>,
    /// defaults to 20, capped at 100
    pub per_page: Option<u32>,
    /// `ACTIVO` or `INACTIVO`
    pub status: Option<String>,
    /// Case-insensitive search term
    pub q: Option<String>,
}

#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditQuery {
    pub entity: Option<String>,
    pub user_id: Option<Uuid>,
    /// CREAR, ACTUALIZAR, ESTADO, ELIMINAR, BAJA, ANULAR, LOGIN, PASSWORD or PERMISOS
    pub action: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::auth::change_password,
        crate::routes::geografia::list_ciudades,
        crate::routes::estructura::list_ambientes,
        crate::routes::estructura::next_ambiente_code,
        crate::routes::estructura::export_ambientes,
        crate::routes::personal::list_personal,
        crate::routes::personal::export_personal,
        crate::routes::contabilidad::next_grupo_code,
        crate::routes::contabilidad::next_auxiliar_code,
        crate::routes::contabilidad::export_auxiliares,
        crate::routes::ufv::list_ufvs,
        crate::routes::ufv::latest_ufv,
        crate::routes::ufv::ufv_by_date,
        crate::routes::ufv::export_ufvs,
        crate::routes::edificios::list_edificios,
        crate::routes::edificios::export_edificios,
        crate::routes::edificios::edificio_history,
        crate::routes::edificios::edificio_valuation,
        crate::routes::movimientos::list_bajas,
        crate::routes::movimientos::register_baja,
        crate::routes::movimientos::annul_baja,
        crate::routes::rbac::list_permissions,
        crate::routes::rbac::set_role_permissions,
        crate::routes::users::list_users,
        crate::routes::users::create_user,
        crate::routes::audit::list_audit,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            ChangePasswordRequest,
            CreateUserRequest,
            PermissionsRequest,
            BajaRequest,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "geografia"),
        (name = "estructura"),
        (name = "personal"),
        (name = "contabilidad"),
        (name = "ufv"),
        (name = "edificios"),
        (name = "movimientos"),
        (name = "rbac"),
        (name = "usuarios"),
        (name = "bitacora")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_domain_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/auth/login"));
        assert!(paths.contains_key("/edificios/{id}/valoracion"));
        assert!(paths.contains_key("/bajas/{id}/anular"));
        assert!(paths.contains_key("/bitacora"));
    }
}
