#[cfg(test)]
mod tests {
    use crate::parsing::json_parser::{parse_light_curve_json, parse_light_curve_json_str};
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Test parsing a plain JD light curve
    #[test]
    fn test_parse_basic() {
        let json = r#"{
            "target": "Kepler-8",
            "time": [2455000.0, 2455000.02, 2455000.04],
            "flux": [1.0, 1.01, 0.99],
            "flux_err": [0.01, 0.01, 0.01]
        }"#;

        let result = parse_light_curve_json_str(json);
        assert!(result.is_ok(), "Should parse: {:?}", result.err());
        let lc = result.unwrap();
        assert_eq!(lc.target, "Kepler-8");
        assert_eq!(lc.len(), 3);
        assert_eq!(lc.fluxes(), vec![1.0, 1.01, 0.99]);
    }

    /// Nulls become NaN and make the sample invalid
    #[test]
    fn test_nulls_become_nan() {
        let json = r#"{
            "target": "Kepler-8",
            "time": [0.0, 1.0],
            "flux": [null, 1.0],
            "flux_err": [0.1, null]
        }"#;

        let lc = parse_light_curve_json_str(json).unwrap();
        assert!(lc.samples[0].flux.is_nan());
        assert!(!lc.samples[1].is_valid());
    }

    /// BKJD timestamps are shifted to JD
    #[test]
    fn test_bkjd_conversion() {
        let json = r#"{
            "target": "Kepler-8",
            "time_format": "bkjd",
            "time": [100.5],
            "flux": [1.0],
            "flux_err": [0.1]
        }"#;

        let lc = parse_light_curve_json_str(json).unwrap();
        assert_eq!(lc.times(), vec![2_454_933.5]);
    }

    /// Mismatched column lengths are rejected
    #[test]
    fn test_column_length_mismatch() {
        let json = r#"{
            "target": "Kepler-8",
            "time": [0.0, 1.0],
            "flux": [1.0],
            "flux_err": [0.1, 0.1]
        }"#;

        let result = parse_light_curve_json_str(json);
        assert!(result.is_err());
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("inconsistent"), "got: {}", message);
    }

    /// Test error on invalid JSON syntax
    #[test]
    fn test_invalid_json() {
        let result = parse_light_curve_json_str("{ not json");
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Invalid light curve JSON"));
    }

    #[test]
    fn test_empty_target_rejected() {
        let json = r#"{"target": "  ", "time": [], "flux": [], "flux_err": []}"#;
        assert!(parse_light_curve_json_str(json).is_err());
    }

    /// Test parsing from a file
    #[test]
    fn test_parse_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{"target": "KIC 6922244", "time": [0.0], "flux": [5.0], "flux_err": [0.5]}}"#
        )
        .unwrap();

        let lc = parse_light_curve_json(temp_file.path()).unwrap();
        assert_eq!(lc.target, "KIC 6922244");
    }

    #[test]
    fn test_missing_file() {
        let result = parse_light_curve_json(std::path::Path::new("/nonexistent/lc.json"));
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Failed to read JSON file"));
    }
}
