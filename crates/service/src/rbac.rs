//! Static permission catalog.
//!
//! Every resource has `{resource}.read` and `{resource}.write`; resources
//! with a PDF listing also get `{resource}.export`.

/// `(resource, human label, exportable)`
pub const RESOURCES: &[(&str, &str, bool)] = &[
    ("usuarios", "usuarios", false),
    ("roles", "roles", false),
    ("bitacora", "bitacora", false),
    ("ciudades", "ciudades", false),
    ("distritos", "distritos", false),
    ("nucleos", "nucleos", false),
    ("unidades", "unidades organizacionales", false),
    ("areas", "areas", false),
    ("ambientes", "ambientes", true),
    ("cargos", "cargos", false),
    ("personal", "personal", true),
    ("grupos_contables", "grupos contables", false),
    ("auxiliares", "auxiliares contables", true),
    ("ufvs", "UFV", true),
    ("edificios", "edificios", true),
    ("ampliaciones", "ampliaciones", false),
    ("remodelaciones", "remodelaciones", false),
    ("bajas", "bajas", false),
];

pub const ADMIN_ROLE: &str = "ADMINISTRADOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDef {
    pub code: String,
    pub module: String,
    pub description: String,
}

pub fn catalog() -> Vec<PermissionDef> {
    let mut out = Vec::with_capacity(RESOURCES.len() * 3);
    for (resource, label, exportable) in RESOURCES {
        out.push(def(resource, "read", format!("Ver {label}")));
        out.push(def(resource, "write", format!("Registrar y modificar {label}")));
        if *exportable {
            out.push(def(resource, "export", format!("Exportar {label} a PDF")));
        }
    }
    out
}

fn def(resource: &str, access: &str, description: String) -> PermissionDef {
    PermissionDef { code: format!("{resource}.{access}"), module: resource.to_string(), description }
}

pub fn is_known(code: &str) -> bool {
    let Some((resource, access)) = code.split_once('.') else { return false };
    RESOURCES.iter().any(|(r, _, exportable)| {
        *r == resource && (access == "read" || access == "write" || (access == "export" && *exportable))
    })
}
