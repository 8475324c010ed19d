use chrono::NaiveDateTime;
use htmlescape::encode_minimal;

#[derive(Debug, Clone, Default)]
pub struct ReportTable {
    pub title: String,
    pub subtitle: Option<String>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    pub fn new(title: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Short rows are padded with empty cells.
    pub fn push(&mut self, mut row: Vec<String>) {
        row.resize(self.columns.len().max(row.len()), String::new());
        self.rows.push(row);
    }
}

const STYLE: &str = "body{font-family:Arial,Helvetica,sans-serif;font-size:10px;color:#222}\
header{border-bottom:2px solid #1f3864;margin-bottom:8px}\
header h1{font-size:14px;margin:0}header h2{font-size:12px;margin:2px 0}\
header p{margin:2px 0;color:#555}\
table{width:100%;border-collapse:collapse}\
th{background:#1f3864;color:#fff;text-align:left;padding:4px}\
td{border-bottom:1px solid #ccc;padding:3px 4px}\
tr:nth-child(even) td{background:#f3f5f9}\
footer{margin-top:8px;font-weight:bold}";

/// Standalone HTML page with every cell escaped.
pub fn render_html(table: &ReportTable, institution: &str, generated_at: NaiveDateTime) -> String {
    let mut out = String::with_capacity(1024 + table.rows.len() * 128);
    out.push_str("<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>");
    out.push_str(&encode_minimal(&table.title));
    out.push_str("</title><style>");
    out.push_str(STYLE);
    out.push_str("</style></head><body><header><h1>");
    out.push_str(&encode_minimal(institution));
    out.push_str("</h1><h2>");
    out.push_str(&encode_minimal(&table.title));
    out.push_str("</h2>");
    if let Some(sub) = &table.subtitle {
        out.push_str("<p>");
        out.push_str(&encode_minimal(sub));
        out.push_str("</p>");
    }
    out.push_str(&format!("<p>Generado: {}</p></header>", generated_at.format("%d/%m/%Y %H:%M")));

    out.push_str("<table><thead><tr><th>#</th>");
    for c in &table.columns {
        out.push_str("<th>");
        out.push_str(&encode_minimal(c));
        out.push_str("</th>");
    }
    out.push_str("</tr></thead><tbody>");
    for (i, row) in table.rows.iter().enumerate() {
        out.push_str(&format!("<tr><td>{}</td>", i + 1));
        for cell in row {
            out.push_str("<td>");
            out.push_str(&encode_minimal(cell));
            out.push_str("</td>");
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    out.push_str(&format!("<footer>Total registros: {}</footer></body></html>", table.rows.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 6).unwrap().and_hms_opt(14, 30, 0).unwrap()
    }

    #[test]
    fn cells_are_escaped() {
        let mut t = ReportTable::new("Edificios", &["Código", "Nombre"]);
        t.push(vec!["E-1".into(), "<script>alert('x')</script> & co".into()]);
        let html = render_html(&t, "Gobierno <Municipal>", at());
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&amp; co"));
        assert!(html.contains("Gobierno &lt;Municipal&gt;"));
    }

    #[test]
    fn header_and_footer() {
        let mut t = ReportTable::new("UFV", &["Fecha", "Valor"]).with_subtitle("Del 01/01/2024 al 31/01/2024");
        t.push(vec!["01/01/2024".into(), "2.46000".into()]);
        t.push(vec!["02/01/2024".into()]);
        let html = render_html(&t, "Registro", at());
        assert!(html.contains("Generado: 06/05/2024 14:30"));
        assert!(html.contains("Del 01/01/2024 al 31/01/2024"));
        assert!(html.contains("Total registros: 2"));
        assert_eq!(t.rows[1].len(), 2);
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn empty_table_still_renders() {
        let t = ReportTable::new("Personal", &["CI"]);
        let html = render_html(&t, "Registro", at());
        assert!(html.contains("<tbody></tbody>"));
        assert!(html.contains("Total registros: 0"));
    }
}
