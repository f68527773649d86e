use csv::WriterBuilder;
use std::io::Write;

use crate::batch::BatchSummary;
use crate::error::Result;

pub const SUMMARY_COLUMNS: [&str; 5] = [
    "Puissance (dBm)",
    "Temps de charge (h)",
    "Temps de recharge (min)",
    "Ecart type (min)",
    "Nombre de séquences",
];

pub fn summary_file_name(label: &str) -> String {
    format!("ChargeRechargeSummary_{}.csv", label)
}

/// Write the batch table, one row per file; missing values become empty fields.
pub fn write_summary_csv<W: Write>(writer: W, summary: &BatchSummary) -> Result<()> {
    let mut out = WriterBuilder::new().from_writer(writer);
    out.write_record(SUMMARY_COLUMNS)?;
    for row in &summary.rows {
        out.write_record([
            optional(row.power_level_dbm),
            optional(row.first_charge_h),
            optional(row.mean_recharge_min),
            optional(row.std_recharge_min),
            row.cycle_count.to_string(),
        ])?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::recharge::FileSummary;

    #[test]
    fn writes_french_columns_and_blank_missing_values() {
        let summary = BatchSummary {
            label: "Rectenna unitaire".into(),
            rows: vec![
                FileSummary {
                    source: "u_10dBm.csv".into(),
                    power_level_dbm: Some(10),
                    first_charge_h: Some(2.5),
                    mean_recharge_min: None,
                    std_recharge_min: None,
                    cycle_count: 1,
                },
                FileSummary {
                    source: "u_12dBm.csv".into(),
                    power_level_dbm: Some(12),
                    first_charge_h: Some(1.25),
                    mean_recharge_min: Some(3.0),
                    std_recharge_min: Some(0.5),
                    cycle_count: 4,
                },
            ],
        };
        let mut buf = Vec::new();
        write_summary_csv(&mut buf, &summary).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines[0],
            "Puissance (dBm),Temps de charge (h),Temps de recharge (min),Ecart type (min),Nombre de séquences"
        );
        assert_eq!(lines[1], "10,2.5,,,1");
        assert_eq!(lines[2], "12,1.25,3,0.5,4");
    }

    #[test]
    fn file_name_carries_label() {
        assert_eq!(
            summary_file_name("Réseau de rectenna"),
            "ChargeRechargeSummary_Réseau de rectenna.csv"
        );
    }
}
