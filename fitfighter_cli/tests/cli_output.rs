use std::{env, fs, path::PathBuf, process::Command};

fn norm_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "")
}

fn temp_beatmap(name: &str, contents: &str) -> PathBuf {
    let path = env::temp_dir().join(format!(
        "fitfighter_cli_{name}_{}.csv",
        std::process::id()
    ));
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn inspect_prints_timeline() {
    let exe = env!("CARGO_BIN_EXE_fitfighter");
    let map = temp_beatmap("inspect", "beat_index,time_s,pad\n0,0.5,1\n1,0.5,8\n2,1.0,4\n");

    let output = Command::new(exe)
        .args(["inspect", map.to_str().unwrap()])
        .output()
        .unwrap();
    let _ = fs::remove_file(&map);

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("3 beats"));
    assert!(stdout.contains("Time(s)  | 1 2 3 4 5 6 7 8 | Beats"));
    assert!(stdout.contains("   0.500 | N . . . . . . N | 0,1"));
    assert!(stdout.contains("   1.000 | . . . N . . . . | 2"));
}

#[test]
fn malformed_header_is_e1001() {
    let exe = env!("CARGO_BIN_EXE_fitfighter");
    let map = temp_beatmap("bad_header", "index,time,pad\n0,0.5,1\n");

    let output = Command::new(exe)
        .args(["inspect", map.to_str().unwrap()])
        .output()
        .unwrap();
    let _ = fs::remove_file(&map);

    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("Error: beatmap load failed"));
    assert!(stderr.contains("Caused by:"));
    assert!(stderr.contains("E1001"));
}

#[test]
fn missing_beatmap_is_e2001() {
    let exe = env!("CARGO_BIN_EXE_fitfighter");
    let missing = env::temp_dir().join(format!(
        "fitfighter_cli_missing_{}.csv",
        std::process::id()
    ));
    let _ = fs::remove_file(&missing);

    let output = Command::new(exe)
        .args(["inspect", missing.to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("E2001"));
}

#[test]
fn out_of_range_pad_is_e1005() {
    let exe = env!("CARGO_BIN_EXE_fitfighter");
    let map = temp_beatmap("bad_pad", "beat_index,time_s,pad\n0,0.5,9\n");

    let output = Command::new(exe)
        .args(["inspect", map.to_str().unwrap()])
        .output()
        .unwrap();
    let _ = fs::remove_file(&map);

    assert_eq!(output.status.code(), Some(1));
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("E1005: pad out of range 1..=8: 9 (line 2)"));
}

#[test]
fn help_lists_game_modes() {
    let exe = env!("CARGO_BIN_EXE_fitfighter");
    let output = Command::new(exe).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for sub in ["combo", "friend-foe", "rhythm", "inspect"] {
        assert!(stdout.contains(sub), "help is missing {sub}");
    }
}

#[test]
fn rhythm_rejects_bad_beatmap_before_starting() {
    let exe = env!("CARGO_BIN_EXE_fitfighter");
    let missing = env::temp_dir().join(format!(
        "fitfighter_cli_rhythm_missing_{}.csv",
        std::process::id()
    ));
    let _ = fs::remove_file(&missing);

    let output = Command::new(exe)
        .args(["rhythm", "1", "song.wav", missing.to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("Error: beatmap load failed"));
    assert!(!stderr.contains("audio load failed"));
}
