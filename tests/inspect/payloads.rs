use crate::common::images::{sample_jpeg, zlib, PngBuilder};
use bareblocks::core::inspect::DecodeStep;
use bareblocks::inspect::inspect_bytes;
use bareblocks::{Classification, InspectConfig, Inspector, PayloadContent};
use serde_json::json;

fn single_payload(png: &[u8]) -> bareblocks::PayloadRecord {
    let report = inspect_bytes(png, "x.png").unwrap();
    assert_eq!(report.payloads().len(), 1);
    report.payloads()[0].clone()
}

#[test]
fn keyword_value_round_trip() {
    let cases = [
        ("Comment", "plain words", None),
        ("Title", "  padded  ", None),
        ("prompt", r#"{"3":{"inputs":{"text":"a cat"}}}"#, Some(json!({"3":{"inputs":{"text":"a cat"}}}))),
        ("Count", "42", Some(json!(42))),
        ("Author", "Zoë", None),
    ];
    for (keyword, value, parsed) in cases {
        let png = PngBuilder::new(1, 1).text(keyword, value).idat(64).build();
        let p = single_payload(&png);
        assert_eq!(p.keyword.as_deref(), Some(keyword));
        assert_eq!(p.source_tag, format!("tEXt:{}", keyword));
        match parsed {
            Some(v) => assert_eq!(p.content.as_json(), Some(&v), "{}", keyword),
            None => assert_eq!(p.content.as_text(), Some(value), "{}", keyword),
        }
    }
}

#[test]
fn compressed_text_is_inflated() {
    let png = PngBuilder::new(1, 1)
        .ztxt("workflow", r#"{"links":[[1,2]]}"#)
        .idat(64)
        .build();
    let p = single_payload(&png);
    assert_eq!(p.classification(), Classification::Json);
    assert_eq!(
        p.provenance,
        [DecodeStep::KeywordSplit, DecodeStep::Inflate, DecodeStep::Utf8, DecodeStep::Json]
    );
    assert!(p.is_workflow_candidate);

    let report = inspect_bytes(&png, "x.png").unwrap();
    // a links-only graph names no specific tool
    assert_eq!(report.ai_metadata().tool.as_deref(), Some("Unknown Workflow Tool"));
    assert!(report.ai_metadata().graph_detected);
}

#[test]
fn international_text() {
    let png = PngBuilder::new(1, 1)
        .itxt("Description", "ein Bild von einem Hund")
        .idat(64)
        .build();
    let p = single_payload(&png);
    assert_eq!(p.content.as_text(), Some("ein Bild von einem Hund"));
    assert_eq!(p.source_tag, "iTXt:Description");
}

#[test]
fn latin1_text_is_an_uncertainty() {
    let mut data = b"Author\0".to_vec();
    data.extend_from_slice(b"Jos\xe9");
    let png = PngBuilder::new(1, 1).chunk(b"tEXt", &data).idat(64).build();
    let report = inspect_bytes(&png, "x.png").unwrap();
    assert_eq!(report.payloads()[0].content.as_text(), Some("José"));
    assert!(report.uncertainties().iter().any(|u| u.starts_with("lossy_decode")));
}

#[test]
fn broken_stream_falls_back_to_binary() {
    let mut data = b"workflow\0\0".to_vec();
    data.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x11]);
    let png = PngBuilder::new(1, 1).chunk(b"zTXt", &data).idat(64).build();
    let report = inspect_bytes(&png, "x.png").unwrap();
    let p = &report.payloads()[0];
    assert!(matches!(p.content, PayloadContent::Binary { .. }));
    assert_eq!(p.keyword.as_deref(), Some("workflow"));
    assert_eq!(p.provenance.last(), Some(&DecodeStep::BinaryFallback));
    assert!(report.uncertainties().iter().any(|u| u.starts_with("inflate_failed")));
    assert!(report.ai_metadata().tool.is_none());
}

#[test]
fn missing_separator_is_binary() {
    let png = PngBuilder::new(1, 1).chunk(b"tEXt", b"no separator here").idat(64).build();
    let report = inspect_bytes(&png, "x.png").unwrap();
    let p = &report.payloads()[0];
    assert_eq!(p.classification(), Classification::Binary);
    assert!(p.keyword.is_none());
    assert_eq!(p.source_tag, "tEXt");
    assert!(report
        .uncertainties()
        .iter()
        .any(|u| u.starts_with("undecodable_payload")));
}

#[test]
fn inflate_ceiling_caps_output() {
    let big = "x".repeat(10_000);
    let png = PngBuilder::new(1, 1).ztxt("Comment", &big).idat(64).build();
    let mut config = InspectConfig::default();
    config.payloads.max_inflated_bytes = 100;
    let report = Inspector::new(config).unwrap().inspect_bytes(&png, "x.png").unwrap();
    assert_eq!(report.payloads()[0].content.as_text().map(str::len), Some(100));
    assert!(report.uncertainties().iter().any(|u| u.starts_with("payload_capped")));
}

#[test]
fn jpeg_comments_can_be_ignored() {
    let jpg = sample_jpeg(Some(b"comfy"));
    let mut config = InspectConfig::default();
    config.payloads.jpeg_comments = false;
    let report = Inspector::new(config).unwrap().inspect_bytes(&jpg, "x.jpg").unwrap();
    assert!(report.payloads().is_empty());
    assert!(report.ai_metadata().tool.is_none());
}

#[test]
fn zlib_helper_produces_a_stream() {
    let z = zlib(b"abc");
    assert_eq!(z[0], 0x78);
}
