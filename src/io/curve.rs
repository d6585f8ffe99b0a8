//! Write curve JSON files.
//!
//! Curve JSON is the hand-off format for external chart renderers:
//! - title and axis labels
//! - the buffer volume and `(stoichiometry, probability)` points
//! - the fitted coefficients, for reference
//!
//! The schema is defined by `domain::CurveFile`.

use std::fs::File;
use std::path::Path;

use chrono::Local;
use tracing::info;

use crate::domain::{CurveFile, CurveFrame, FittedModel};
use crate::error::AppError;

/// Build the serializable file body for a frame.
pub fn curve_file(frame: &CurveFrame, model: &FittedModel) -> CurveFile {
    CurveFile {
        tool: "emul".to_string(),
        generated_at: Local::now().to_rfc3339(),
        model: *model,
        frame: frame.clone(),
    }
}

/// Write a curve JSON file.
pub fn write_curve_json(path: &Path, frame: &CurveFrame, model: &FittedModel) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create curve JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &curve_file(frame, model))
        .map_err(|e| AppError::input(format!("Failed to write curve JSON: {e}")))?;

    info!(path = %path.display(), points = frame.curve.points.len(), "wrote curve JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::predict_curve_in_range;

    #[test]
    fn curve_json_carries_labels_and_points() {
        let model = FittedModel::new(0.5, -0.2, 1.0);
        let curve = predict_curve_in_range(&model, 1.0, 1.0, 10.0, 5).unwrap();
        let frame = CurveFrame::new(curve);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("curve.json");
        write_curve_json(&path, &frame, &model).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["x_label"], "K3PO4 stoichiometry");
        assert_eq!(value["y_label"], "Likelihood of no emulsion");
        assert_eq!(value["curve"]["buffer"], 1.0);
        assert_eq!(value["curve"]["points"].as_array().unwrap().len(), 5);
        assert_eq!(value["model"]["intercept"], 0.5);
    }
}
