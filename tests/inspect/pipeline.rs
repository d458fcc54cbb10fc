use crate::common::images::{
    minimal_png, sample_bmp, sample_gif, sample_jpeg, sample_webp_lossless, PngBuilder,
};
use crate::common::test_utils::{assert_bytes_accounted, create_named_file};
use bareblocks::inspect::{inspect_bytes, inspect_path};
use bareblocks::{AnomalyFlag, Classification, ContainerFamily, InspectError, Stage};

#[test]
fn minimal_png_is_clean() {
    let report = inspect_bytes(&minimal_png(), "minimal.png").unwrap();
    assert!(report.payloads().is_empty());
    assert!(report.ai_metadata().tool.is_none());
    assert!(report.anomalies().flags.is_empty());
    assert!(report.warnings().is_empty());
    assert!(report.uncertainties().is_empty());
    assert!(!report.summary().has_payloads);
    assert!(!report.summary().has_ai_metadata);
    assert_bytes_accounted(&report);

    let props = report.metadata().image_properties.as_ref().unwrap();
    assert_eq!((props.format.as_str(), props.mode.as_str()), ("PNG", "RGBA"));
    assert_eq!((props.width, props.height), (1, 1));
}

#[test]
fn comfyui_workflow_in_text_chunk() {
    let png = PngBuilder::new(64, 64)
        .text("workflow", r#"{"nodes":{"1":{"class_type":"KSampler"}}}"#)
        .idat(4096)
        .build();
    let report = inspect_bytes(&png, "comfy.png").unwrap();

    assert_eq!(report.payloads().len(), 1);
    let payload = &report.payloads()[0];
    assert_eq!(payload.classification(), Classification::Json);
    assert_eq!(payload.source_tag, "tEXt:workflow");
    assert!(payload.is_workflow_candidate);

    let ai = report.ai_metadata();
    assert_eq!(ai.tool.as_deref(), Some("ComfyUI"));
    assert!(ai.graph_detected);
    assert!(report.summary().has_ai_metadata);
    assert!(report.anomalies().has(AnomalyFlag::CustomChunksPresent));
}

#[test]
fn automatic1111_parameters() {
    let params = "a lighthouse at dusk, {oil|watercolor} painting\n\
                  Negative prompt: blurry\n\
                  Steps: 20, Sampler: Euler a, CFG scale: 7, Seed: 1";
    let png = PngBuilder::new(64, 64).text("parameters", params).idat(4096).build();
    let report = inspect_bytes(&png, "a1111.png").unwrap();

    let ai = report.ai_metadata();
    assert_eq!(ai.tool.as_deref(), Some("Automatic1111"));
    assert!(ai.wildcards_present);
    assert!(ai.resolved_prompt_available);
    assert!(ai.graph_detected);
    assert_eq!(report.payloads()[0].classification(), Classification::Text);
}

#[test]
fn jpeg_comment_payload() {
    let jpg = sample_jpeg(Some(b"Made with NovelAI\0"));
    let report = inspect_bytes(&jpg, "nai.jpg").unwrap();
    assert_eq!(report.summary().container.family, ContainerFamily::Jpeg);
    assert_eq!(report.payloads().len(), 1);
    assert_eq!(report.payloads()[0].source_tag, "0xFFFE");
    assert_eq!(report.payloads()[0].content.as_text(), Some("Made with NovelAI"));
    assert_eq!(report.ai_metadata().tool.as_deref(), Some("NovelAI"));
    assert!(report.structure().end_marker_found);
    assert_bytes_accounted(&report);

    let props = report.metadata().image_properties.as_ref().unwrap();
    assert_eq!((props.width, props.height), (16, 8));
    assert_eq!(props.dpi, Some([72.0, 72.0]));
}

#[test]
fn gif_comment_payload() {
    let comment = br#"{"workflow":{"last_node_id":3}}"#;
    let report = inspect_bytes(&sample_gif(Some(comment)), "anim.gif").unwrap();
    assert_eq!(report.summary().container.family, ContainerFamily::Gif);
    let payload = &report.payloads()[0];
    assert_eq!(payload.source_tag, "COM");
    assert_eq!(payload.classification(), Classification::Json);
    assert!(report.ai_metadata().graph_detected);
    assert_bytes_accounted(&report);
}

#[test]
fn bmp_and_webp_pipelines() {
    let report = inspect_bytes(&sample_bmp(16, 16), "img.bmp").unwrap();
    assert_eq!(report.summary().container.family, ContainerFamily::Bmp);
    assert!(report.payloads().is_empty());
    assert!(report.anomalies().flags.is_empty());
    assert_bytes_accounted(&report);
    let props = report.metadata().image_properties.as_ref().unwrap();
    assert_eq!((props.width, props.height, props.mode.as_str()), (16, 16, "RGB"));

    let report = inspect_bytes(&sample_webp_lossless(), "img.webp").unwrap();
    assert_eq!(report.summary().container.family, ContainerFamily::Webp);
    assert!(report.structure().end_marker_found);
    assert_bytes_accounted(&report);
    let props = report.metadata().image_properties.as_ref().unwrap();
    assert_eq!((props.width, props.height), (4, 3));
}

#[test]
fn inspect_from_disk_uses_file_name() {
    let (_dir, path) = create_named_file("photo.png", &minimal_png());
    let report = inspect_path(&path).unwrap();
    assert_eq!(report.summary().file_name, "photo.png");
    assert_eq!(report.summary().file_size, minimal_png().len() as u64);
    assert_eq!(report.summary().sha256.len(), 64);
}

#[test]
fn mismatched_extension_is_an_uncertainty() {
    let report = inspect_bytes(&minimal_png(), "photo.jpg").unwrap();
    assert_eq!(report.summary().mime_hint, "image/png");
    assert!(report
        .uncertainties()
        .iter()
        .any(|u| u.contains("mime_mismatch")));
}

#[test]
fn fatal_errors_name_their_stage() {
    let (_dir, path) = create_named_file("empty.png", &[]);
    let err = inspect_path(&path).unwrap_err();
    assert!(matches!(err, InspectError::Stage { stage: Stage::Intake, .. }));
    assert!(matches!(err.root(), InspectError::EmptyInput));

    let err = inspect_bytes(b"%PDF-1.7 not an image", "doc.pdf").unwrap_err();
    assert!(matches!(err, InspectError::Stage { stage: Stage::ContainerId, .. }));
    assert!(err.to_string().contains("container-id"));

    let err = inspect_path("/definitely/not/here.png").unwrap_err();
    assert!(matches!(err.root(), InspectError::Io(_)));
}
