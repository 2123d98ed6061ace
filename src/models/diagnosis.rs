use serde::{Deserialize, Serialize};

/// Structured diagnosis returned by the model.
///
/// All three fields are required; the model is constrained to this shape via
/// the response schema, and deserialization is the local enforcement point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisReport {
    /// Disease classification: one of AMD, DME or NORMAL.
    pub disease: String,

    /// Whether the uploaded image looks like an OCT scan at all.
    #[serde(rename = "isOCTScan")]
    pub is_oct_scan: bool,

    /// The model's reasoning for the prediction.
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_model_output() {
        let report: DiagnosisReport = serde_json::from_str(
            r#"{"disease":"AMD","isOCTScan":true,"explanation":"drusen deposits visible"}"#,
        )
        .expect("Failed to parse report");

        assert_eq!(report.disease, "AMD");
        assert!(report.is_oct_scan);
        assert_eq!(report.explanation, "drusen deposits visible");
    }

    #[test]
    fn rejects_missing_fields() {
        let result: Result<DiagnosisReport, _> =
            serde_json::from_str(r#"{"disease":"NORMAL","explanation":"clear retina"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let report = DiagnosisReport {
            disease: "DME".to_string(),
            is_oct_scan: true,
            explanation: "macular edema".to_string(),
        };

        let value = serde_json::to_value(&report).expect("Failed to serialize report");
        assert_eq!(value["disease"], "DME");
        assert_eq!(value["isOCTScan"], true);
        assert_eq!(value["explanation"], "macular edema");
    }
}
