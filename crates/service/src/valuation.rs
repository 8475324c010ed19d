//! UFV restatement of building values.
//!
//! An amount recorded on day `a` is worth `amount * UFV(b) / UFV(a)` on day
//! `b`. Each line is rounded to cents; the total is the sum of rounded lines.

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Adquisicion,
    Ampliacion,
    Remodelacion,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationLine {
    pub kind: LineKind,
    pub source_id: Uuid,
    pub date: NaiveDate,
    pub original_value: f64,
    pub ufv_origin: f64,
    pub adjusted_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Valuation {
    pub edificio_id: Uuid,
    pub date: NaiveDate,
    pub ufv_date: NaiveDate,
    pub ufv_target: f64,
    pub lines: Vec<ValuationLine>,
    pub total_original: f64,
    pub total_adjusted: f64,
}

pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// `amount` restated from index `ufv_origin` to `ufv_target`.
pub fn restate(amount: f64, ufv_origin: f64, ufv_target: f64) -> f64 {
    if ufv_origin <= 0.0 {
        return round2(amount);
    }
    round2(amount * ufv_target / ufv_origin)
}

/// One recorded amount before restatement.
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub kind: LineKind,
    pub source_id: Uuid,
    pub date: NaiveDate,
    pub value: f64,
    pub ufv_origin: f64,
}

pub fn build(edificio_id: Uuid, date: NaiveDate, ufv_date: NaiveDate, ufv_target: f64, entries: &[Entry]) -> Valuation {
    let lines: Vec<ValuationLine> = entries
        .iter()
        .map(|e| ValuationLine {
            kind: e.kind,
            source_id: e.source_id,
            date: e.date,
            original_value: round2(e.value),
            ufv_origin: e.ufv_origin,
            adjusted_value: restate(e.value, e.ufv_origin, ufv_target),
        })
        .collect();
    let total_original = round2(lines.iter().map(|l| l.original_value).sum());
    let total_adjusted = round2(lines.iter().map(|l| l.adjusted_value).sum());
    Valuation { edificio_id, date, ufv_date, ufv_target, lines, total_original, total_adjusted }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn restate_scales_by_index_ratio() {
        assert_eq!(restate(100_000.0, 2.0, 2.5), 125_000.0);
        assert_eq!(restate(1000.0, 2.34567, 2.34567), 1000.0);
        assert_eq!(restate(10.0, 3.0, 1.0), 3.33);
    }

    #[test]
    fn build_sums_rounded_lines() {
        let id = Uuid::new_v4();
        let entries = [
            Entry { kind: LineKind::Adquisicion, source_id: id, date: day(2015, 1, 2), value: 500_000.0, ufv_origin: 2.03 },
            Entry { kind: LineKind::Ampliacion, source_id: Uuid::new_v4(), date: day(2020, 6, 1), value: 80_000.0, ufv_origin: 2.33 },
            Entry { kind: LineKind::Remodelacion, source_id: Uuid::new_v4(), date: day(2022, 3, 15), value: 0.0, ufv_origin: 2.38 },
        ];
        let v = build(id, day(2024, 1, 1), day(2023, 12, 29), 2.46, &entries);
        assert_eq!(v.lines.len(), 3);
        assert_eq!(v.lines[0].adjusted_value, 605_911.33);
        assert_eq!(v.lines[1].adjusted_value, 84_463.52);
        assert_eq!(v.lines[2].adjusted_value, 0.0);
        assert_eq!(v.total_original, 580_000.0);
        assert_eq!(v.total_adjusted, 690_374.85);
    }

    #[test]
    fn line_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&LineKind::Ampliacion).unwrap(), "\"ampliacion\"");
    }
}
