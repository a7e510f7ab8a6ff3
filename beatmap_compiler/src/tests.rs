use super::*;
use crate::parser::parse_rows;
use std::{env, fs};

#[test]
fn compile_minimal_beatmap_sorted_by_hit_time() {
    let src = "beat_index,time_s,pad\n1,2.5,3\n0,1.0,1\n2,2.5,8\n";

    let map = compile_str(src).unwrap();
    assert_eq!(map.len(), 3);
    assert_eq!(map.offset_s, 0.0);
    assert_eq!(map.beats[0].beat_index, 0);
    assert_eq!(map.beats[0].pad.get(), 1);
    // Equal times keep file order.
    assert_eq!(map.beats[1].beat_index, 1);
    assert_eq!(map.beats[2].beat_index, 2);
}

#[test]
fn header_is_case_and_space_insensitive() {
    let src = " Beat_Index , TIME_S ,Pad\n0,0.5,2\n";
    let map = compile_str(src).unwrap();
    assert_eq!(map.len(), 1);
}

#[test]
fn wrong_header_is_e1001() {
    let err = compile_str("index,time,pad\n0,1.0,1\n").unwrap_err();
    assert_eq!(err.code, "E1001");
    assert_eq!(err.kind, CompileErrorKind::Parse);
    assert_eq!(err.line, 1);
    assert_eq!(err.context.as_deref(), Some("index,time,pad"));
}

#[test]
fn empty_source_is_e1001() {
    let err = compile_str("").unwrap_err();
    assert_eq!(err.code, "E1001");
}

#[test]
fn bad_row_values_report_code_and_line() {
    let err = compile_str("beat_index,time_s,pad\n0,1.0,1\nx,1.5,2\n").unwrap_err();
    assert_eq!(err.code, "E1002");
    assert_eq!(err.line, 3);
    assert_eq!(err.column, Some(1));

    let err = compile_str("beat_index,time_s,pad\n0,soon,1\n").unwrap_err();
    assert_eq!(err.code, "E1003");

    let err = compile_str("beat_index,time_s,pad\n0,1.0,one\n").unwrap_err();
    assert_eq!(err.code, "E1004");
}

#[test]
fn pad_out_of_range_is_validation_error() {
    let err = compile_str("beat_index,time_s,pad\n0,1.0,9\n").unwrap_err();
    assert_eq!(err.code, "E1005");
    assert_eq!(err.beat_index, Some(0));
    assert_eq!(err.kind, CompileErrorKind::Validation);
    assert_eq!(
        err.to_string(),
        "E1005: pad out of range 1..=8: 9 (line 2)"
    );
}

#[test]
fn non_finite_time_is_rejected() {
    let err = compile_str("beat_index,time_s,pad\n4,inf,1\n").unwrap_err();
    assert_eq!(err.code, "E3001");
    assert_eq!(err.kind, CompileErrorKind::Validation);
    assert_eq!(err.beat_index, Some(4));
}

#[test]
fn short_rows_are_skipped() {
    let rows = parse_rows("beat_index,time_s,pad\n0,1.0\n1,2.0,4\n").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].line, 3);
    assert_eq!(rows[0].pad.get(), 4);
}

#[test]
fn named_source_gets_calibration_offset() {
    let options = CompileOptions {
        source_name: Some("PPPP.csv".to_string()),
        ..CompileOptions::default()
    };
    let map = compile_str_with_options("beat_index,time_s,pad\n0,1.0,1\n", options).unwrap();
    assert!((map.offset_s - 1.19).abs() < 1e-9);
    assert!((map.beats[0].t_hit - 2.19).abs() < 1e-9);
}

#[test]
fn negative_shifted_time_clamps_to_zero() {
    let mut offsets = BTreeMap::new();
    offsets.insert("early.csv".to_string(), -2.0);
    let options = CompileOptions {
        source_name: Some("early.csv".to_string()),
        offsets,
    };
    let map = compile_str_with_options("beat_index,time_s,pad\n0,1.0,1\n", options).unwrap();
    assert_eq!(map.beats[0].t_hit, 0.0);
}

#[test]
fn compile_file_uses_file_name_for_offset() {
    let dir = env::temp_dir().join(format!("fitfighter_beatmap_offset_{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("Shape_of_You_Beatmap.csv");
    fs::write(&path, "beat_index,time_s,pad\n0,0.0,5\n").unwrap();

    let map = compile_file(&path).unwrap();
    assert_eq!(map.source.as_deref(), Some("Shape_of_You_Beatmap.csv"));
    assert!((map.beats[0].t_hit - 1.12).abs() < 1e-9);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_file_is_e2001() {
    let missing = env::temp_dir().join(format!("fitfighter_missing_{}.csv", std::process::id()));
    let _ = fs::remove_file(&missing);

    let err = compile_file(&missing).unwrap_err();
    assert_eq!(err.code, "E2001");
    assert_eq!(err.kind, CompileErrorKind::Io);
    assert!(err.file.is_some());
}
