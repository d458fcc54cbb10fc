use crate::common::images::PngBuilder;
use crate::common::test_utils::create_temp_file;
use bareblocks::{AnomalyFlag, InspectConfig, InspectError, Inspector};

#[test]
fn partial_config_file_keeps_defaults() {
    let file = create_temp_file(br#"{"anomaly": {"non_pixel_ratio_threshold": 0.05}}"#);
    let config = InspectConfig::from_json_file(file.path()).unwrap();
    assert_eq!(config.anomaly.non_pixel_ratio_threshold, 0.05);
    assert_eq!(config.anomaly.high_entropy_threshold, 7.5);
    assert!(config.structure.verify_crc);
    assert_eq!(config.io, InspectConfig::default().io);
}

#[test]
fn threshold_changes_flags() {
    let png = PngBuilder::new(1, 1).idat(1000).build();
    let default = Inspector::default().inspect_bytes(&png, "x.png").unwrap();
    assert!(!default.anomalies().has(AnomalyFlag::LargeNonPixelData));

    let strict = InspectConfig::from_json_str(r#"{"anomaly":{"non_pixel_ratio_threshold":0.01}}"#).unwrap();
    let report = Inspector::new(strict).unwrap().inspect_bytes(&png, "x.png").unwrap();
    assert!(report.anomalies().has(AnomalyFlag::LargeNonPixelData));
}

#[test]
fn invalid_config_is_rejected() {
    let err = InspectConfig::from_json_str(r#"{"io":{"max_sniff_size":4}}"#).unwrap_err();
    assert!(matches!(err, InspectError::Config(_)));

    let err = InspectConfig::from_json_str("not json").unwrap_err();
    assert!(matches!(err, InspectError::Config(_)));

    let mut config = InspectConfig::default();
    config.structure.max_records = 0;
    assert!(Inspector::new(config).is_err());
}

#[test]
fn record_limit_stops_the_walk() {
    let mut builder = PngBuilder::new(1, 1);
    for i in 0..10 {
        builder = builder.text("Comment", &format!("note {}", i));
    }
    let png = builder.idat(4096).build();
    let mut config = InspectConfig::default();
    config.structure.max_records = 4;
    let report = Inspector::new(config).unwrap().inspect_bytes(&png, "x.png").unwrap();
    let s = report.structure();
    assert_eq!(s.records.len(), 4);
    assert_eq!(s.pixel_bytes + s.non_pixel_bytes, s.total_bytes);
    assert!(report.uncertainties().iter().any(|u| u.starts_with("unsupported")));
}

#[test]
fn config_round_trips_through_json() {
    let config = InspectConfig::default();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(InspectConfig::from_json_str(&json).unwrap(), config);
}
