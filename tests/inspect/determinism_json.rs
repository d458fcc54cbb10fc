use crate::common::images::{minimal_png, sample_jpeg, PngBuilder};
use crate::common::test_utils::create_named_file;
use bareblocks::inspect::{inspect_bytes, inspect_path};
use bareblocks::InspectionReport;

fn workflow_png() -> Vec<u8> {
    PngBuilder::new(32, 32)
        .text("prompt", r#"{"3":{"class_type":"KSampler","inputs":{"seed":1}},"6":{"class_type":"CLIPTextEncode","inputs":{"text":"__animals__ in a field"}}}"#)
        .ztxt("workflow", r#"{"nodes":[{"id":3,"type":"KSampler"}],"links":[]}"#)
        .idat(2048)
        .build()
}

#[test]
fn json_output_is_stable_for_same_input() {
    let (_dir, path) = create_named_file("stable.png", &workflow_png());
    let j1 = inspect_path(&path).unwrap().to_json_string().unwrap();
    let j2 = inspect_path(&path).unwrap().to_json_string().unwrap();
    assert_eq!(j1, j2, "JSON outputs differ across identical runs");

    let j3 = inspect_bytes(&workflow_png(), "stable.png")
        .unwrap()
        .to_json_string()
        .unwrap();
    assert_eq!(j1, j3, "path and in-memory inspection disagree");
}

#[test]
fn top_level_fields_in_fixed_order() {
    let json = inspect_bytes(&minimal_png(), "x.png")
        .unwrap()
        .to_json_string()
        .unwrap();
    let keys = [
        "\"summary\"",
        "\"structure\"",
        "\"metadata\"",
        "\"payloads\"",
        "\"aiMetadata\"",
        "\"anomalies\"",
        "\"warnings\"",
        "\"uncertainties\"",
    ];
    let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]), "{}", json);
}

#[test]
fn report_schema_values() {
    let report = inspect_bytes(&workflow_png(), "wf.png").unwrap();
    let v: serde_json::Value = serde_json::from_str(&report.to_json_string().unwrap()).unwrap();

    assert_eq!(v["summary"]["containerType"], "PNG");
    assert_eq!(v["summary"]["confidence"], "high");
    assert_eq!(v["summary"]["magicBytes"], "89504e470d0a1a0a0000000d49484452");
    assert_eq!(v["summary"]["hasAiMetadata"], true);
    assert_eq!(v["structure"]["records"][0]["typeTag"], "IHDR");
    assert_eq!(v["payloads"][0]["classification"], "json");
    assert_eq!(v["payloads"][0]["sourceTag"], "tEXt:prompt");
    assert_eq!(v["payloads"][1]["provenance"][1], "inflate");
    assert_eq!(v["aiMetadata"]["tool"], "ComfyUI");
    assert_eq!(v["aiMetadata"]["graphDetected"], true);
    assert_eq!(v["aiMetadata"]["wildcardsPresent"], true);
    assert_eq!(v["anomalies"]["flags"][0], "custom_chunks_present");
    assert!(v["anomalies"]["nonPixelRatio"].as_f64().unwrap() < 0.3);
}

#[test]
fn report_parses_back() {
    for (data, name) in [(workflow_png(), "wf.png"), (sample_jpeg(Some(b"hi")), "c.jpg")] {
        let json = inspect_bytes(&data, name).unwrap().to_json_string().unwrap();
        let back = InspectionReport::from_json_str(&json).unwrap();
        assert_eq!(back.to_json_string().unwrap(), json);
    }
}
