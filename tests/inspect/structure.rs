use crate::common::images::{minimal_png, png_chunk, sample_gif, sample_jpeg, PngBuilder};
use crate::common::test_utils::{assert_bytes_accounted, create_temp_file};
use bareblocks::inspect::{inspect_bytes, read_range, IOUtils};
use bareblocks::{AnomalyFlag, RecordTag};
use std::io::Cursor;

#[test]
fn png_chunk_lengths_sum_to_file_size() {
    let png = PngBuilder::new(8, 8)
        .text("Software", "test")
        .idat(100)
        .idat(50)
        .build();
    let report = inspect_bytes(&png, "x.png").unwrap();
    let s = report.structure();
    let sum: u64 = s.records.iter().map(|r| r.length as u64 + 12).sum();
    assert_eq!(8 + sum, s.total_bytes);
    assert_eq!(s.pixel_bytes, 150);
    assert_eq!(s.non_pixel_bytes, s.total_bytes - 150);
    assert_bytes_accounted(&report);

    let tags: Vec<String> = s.records.iter().map(|r| r.type_tag.to_string()).collect();
    assert_eq!(tags, ["IHDR", "tEXt", "IDAT", "IDAT", "IEND"]);
    assert!(s.records.iter().all(|r| r.crc_valid == Some(true)));
}

#[test]
fn reported_ranges_can_be_read_back() {
    let png = PngBuilder::new(8, 8).text("Comment", "hello").idat(64).build();
    let report = inspect_bytes(&png, "x.png").unwrap();
    let text = report
        .structure()
        .records
        .iter()
        .find(|r| r.type_tag == RecordTag::FourCC(*b"tEXt"))
        .unwrap();

    let mut cur = Cursor::new(&png);
    let bytes = read_range(&mut cur, text.data_offset, text.length as u64, png.len() as u64).unwrap();
    assert_eq!(bytes, b"Comment\0hello");

    let file = create_temp_file(&png);
    let from_disk = IOUtils::read_file_range(file.path(), text.data_offset, text.length as u64).unwrap();
    assert_eq!(from_disk, bytes);

    assert!(read_range(&mut cur, png.len() as u64 - 2, 4, png.len() as u64).is_err());
    assert!(read_range(&mut cur, u64::MAX, 2, png.len() as u64).is_err());
}

#[test]
fn crc_mismatch_is_flagged_not_fatal() {
    let mut png = minimal_png();
    // last byte of the IHDR CRC
    png[8 + 8 + 13 + 3] ^= 0xff;
    let report = inspect_bytes(&png, "x.png").unwrap();
    assert_eq!(report.structure().records[0].crc_valid, Some(false));
    assert!(report.anomalies().has(AnomalyFlag::CrcMismatch));
    assert!(report.warnings().iter().any(|w| w.starts_with("crc_mismatch")));
    assert_bytes_accounted(&report);
}

#[test]
fn trailing_bytes_after_iend() {
    let mut png = minimal_png();
    png.extend_from_slice(b"appended secret");
    let report = inspect_bytes(&png, "x.png").unwrap();
    assert_eq!(report.structure().trailing_bytes, 15);
    assert!(report.structure().end_marker_found);
    assert!(report.anomalies().has(AnomalyFlag::TrailingData));
    assert_bytes_accounted(&report);
}

#[test]
fn unknown_chunks_are_listed_in_order() {
    let png = PngBuilder::new(1, 1)
        .chunk(b"prVt", &[1, 2, 3])
        .idat(256)
        .build();
    let report = inspect_bytes(&png, "x.png").unwrap();
    let rec = &report.structure().records[1];
    assert_eq!(rec.type_tag.to_string(), "prVt");
    assert_eq!(rec.byte_offset, 33);
    assert_eq!(rec.data_offset, 41);
    assert_eq!(rec.length, 3);
    assert!(!rec.is_pixel_data);
}

#[test]
fn jpeg_segments() {
    let jpg = sample_jpeg(None);
    let report = inspect_bytes(&jpg, "x.jpg").unwrap();
    let s = report.structure();
    let tags: Vec<String> = s.records.iter().map(|r| r.type_tag.to_string()).collect();
    assert_eq!(tags, ["0xFFE0", "0xFFC0", "0xFFDA"]);
    assert_eq!(s.records[0].length, 14);
    assert!(s.records[2].is_pixel_data);
    assert!(s.end_marker_found);
    assert_bytes_accounted(&report);
}

#[test]
fn gif_blocks() {
    let report = inspect_bytes(&sample_gif(None), "x.gif").unwrap();
    let tags: Vec<String> = report
        .structure()
        .records
        .iter()
        .map(|r| r.type_tag.to_string())
        .collect();
    assert_eq!(tags, ["HDR", "IMG", "LZW", "TRAILER"]);
    assert_bytes_accounted(&report);
}

#[test]
fn crc_checks_can_be_disabled() {
    use bareblocks::{InspectConfig, Inspector};

    let mut png = minimal_png();
    png[8 + 8 + 13 + 3] ^= 0xff;
    let mut config = InspectConfig::default();
    config.structure.verify_crc = false;
    let report = Inspector::new(config).unwrap().inspect_bytes(&png, "x.png").unwrap();
    assert!(report.structure().records.iter().all(|r| r.crc_valid.is_none()));
    assert!(report.anomalies().flags.is_empty());
}

#[test]
fn chunk_helper_matches_builder() {
    let png = PngBuilder::new(1, 1).build_unterminated();
    assert_eq!(&png[8..], png_chunk(b"IHDR", &[0, 0, 0, 1, 0, 0, 0, 1, 8, 6, 0, 0, 0]).as_slice());
}
