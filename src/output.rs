use std::fs;
use std::path::{Path, PathBuf};
use csv::Writer;
use serde::Serialize;

use crate::compliance::ComplianceReport;
use crate::errors::Result;
use crate::mask::Coord;
use crate::metrics::Metrics;

/// Per-image result as written to reports
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub filename: String,
    pub image_width: u32,
    pub image_height: u32,
    pub metrics: Metrics,
    pub compliance: ComplianceReport,
    pub max_width_point: Option<Coord>,
}

/// Write the JSON report for one image to `<output_dir>/reports/<filename>.json`
pub fn write_report_json<P: AsRef<Path>>(record: &AnalysisRecord, output_dir: P) -> Result<PathBuf> {
    let output_path = output_dir
        .as_ref()
        .join("reports")
        .join(format!("{}.json", record.filename));

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(record)?;
    fs::write(&output_path, json)?;

    Ok(output_path)
}

/// Write one summary row per image to `<output_dir>/summary.csv`
pub fn write_summary_csv<P: AsRef<Path>>(records: &[AnalysisRecord], output_dir: P) -> Result<PathBuf> {
    let output_path = output_dir.as_ref().join("summary.csv");

    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_path(&output_path)?;
    write_summary(&mut writer, records)?;

    Ok(output_path)
}

fn write_summary<W: std::io::Write>(writer: &mut Writer<W>, records: &[AnalysisRecord]) -> Result<()> {
    writer.write_record([
        "Image",
        "Area",
        "Length",
        "Average_Width",
        "Maximum_Width",
        "Area_Per_Length_Width",
        "Area_Ratio",
        "Endpoint_Count",
        "Branch_Point_Count",
        "Estimated_Branch_Count",
        "Max_Width_X",
        "Max_Width_Y",
        "Criteria_Evaluated",
        "Compliance",
    ])?;

    for record in records {
        let m = &record.metrics;
        let (max_x, max_y) = match record.max_width_point {
            Some(c) => (c.x.to_string(), c.y.to_string()),
            None => (String::new(), String::new()),
        };

        writer.write_record(&[
            record.filename.clone(),
            format!("{:.6}", m.area),
            format!("{:.6}", m.length),
            format!("{:.6}", m.avg_width),
            format!("{:.6}", m.max_width),
            format!("{:.6}", m.area_per_length_width),
            format!("{:.6}", record.compliance.area_ratio),
            m.endpoint_count.to_string(),
            m.branch_point_count.to_string(),
            m.estimated_branch_count.to_string(),
            max_x,
            max_y,
            record.compliance.evaluated_count().to_string(),
            record.compliance.verdict().to_string(),
        ])?;
    }

    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::ComplianceLimits;
    use crate::mask::BinaryMask;
    use crate::pipeline::analyze;

    fn record_for(rows: &[&str], filename: &str) -> AnalysisRecord {
        let mask = BinaryMask::from_rows(rows).unwrap();
        let limits = ComplianceLimits {
            max_width_limit: Some(1.5),
            ..ComplianceLimits::none()
        };
        let analysis = analyze(&mask, 1.0, &limits).unwrap();
        AnalysisRecord {
            filename: filename.to_string(),
            image_width: mask.width(),
            image_height: mask.height(),
            metrics: analysis.metrics,
            compliance: analysis.compliance,
            max_width_point: analysis.max_width_point,
        }
    }

    #[test]
    fn test_summary_rows() {
        let records = vec![
            record_for(&["............", ".##########.", "............"], "line"),
            record_for(&["....", "....", "...."], "blank"),
        ];
        let mut writer = Writer::from_writer(Vec::new());
        write_summary(&mut writer, &records).unwrap();
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Image,Area,Length"));
        assert!(lines[1].starts_with("line,10.000000,10.000000,2.000000,2.000000"));
        assert!(lines[1].ends_with(",2,0,1,1,1,1,Fail"));
        assert!(lines[2].ends_with(",,,1,Pass"));
    }

    #[test]
    fn test_report_json_fields() {
        let record = record_for(&["............", ".##########.", "............"], "line");
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["filename"], "line");
        assert_eq!(value["metrics"]["endpoint_count"], 2);
        assert_eq!(value["max_width_point"]["x"], 1);
        assert_eq!(value["compliance"]["criteria"][0]["criterion"], "max_width");
        assert_eq!(value["compliance"]["criteria"][0]["status"], "fail");
        assert_eq!(value["compliance"]["criteria"][1]["status"], "not_evaluated");
        assert_eq!(value["compliance"]["overall_pass"], false);
    }
}
