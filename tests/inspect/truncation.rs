use crate::common::images::{minimal_png, sample_gif, sample_jpeg, sample_webp_lossless, PngBuilder};
use crate::common::test_utils::assert_bytes_accounted;
use bareblocks::inspect::inspect_bytes;
use bareblocks::AnomalyFlag;

#[test]
fn png_truncated_mid_chunk() {
    let png = PngBuilder::new(4, 4).text("Comment", "hi").idat(512).build();
    let cut = &png[..png.len() - 300];
    let report = inspect_bytes(cut, "cut.png").unwrap();
    let s = report.structure();

    assert!(s.truncated);
    assert!(!s.end_marker_found);
    let tags: Vec<String> = s.records.iter().map(|r| r.type_tag.to_string()).collect();
    assert_eq!(tags, ["IHDR", "tEXt", "IDAT"]);
    assert!(s.records[2].clipped);
    assert!(report.anomalies().has(AnomalyFlag::TruncatedStructure));
    assert!(report.warnings().iter().any(|w| w.starts_with("clipped_length")));
    // payloads before the cut are still extracted
    assert_eq!(report.payloads().len(), 1);
    assert_bytes_accounted(&report);
}

#[test]
fn png_missing_iend() {
    let png = PngBuilder::new(1, 1).idat(256).build_unterminated();
    let report = inspect_bytes(&png, "x.png").unwrap();
    assert!(report.structure().truncated);
    assert!(report
        .warnings()
        .iter()
        .any(|w| w.starts_with("missing_end_marker")));
    assert_bytes_accounted(&report);
}

#[test]
fn every_prefix_is_accounted() {
    let samples = [
        minimal_png(),
        sample_jpeg(Some(b"comment")),
        sample_gif(Some(b"comment")),
        sample_webp_lossless(),
    ];
    for sample in samples {
        // 16 bytes keeps every signature intact
        for len in 16..sample.len() {
            let report = inspect_bytes(&sample[..len], "prefix").unwrap();
            assert_bytes_accounted(&report);
            assert_eq!(report.structure().total_bytes, len as u64);
        }
    }
}

#[test]
fn jpeg_without_eoi() {
    let mut jpg = sample_jpeg(None);
    jpg.truncate(jpg.len() - 2);
    let report = inspect_bytes(&jpg, "x.jpg").unwrap();
    assert!(!report.structure().end_marker_found);
    assert!(report.structure().records.last().unwrap().is_pixel_data);
    assert_bytes_accounted(&report);
}
