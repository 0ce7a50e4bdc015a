use std::{borrow::Cow, path::PathBuf};

fn write_test_gif(path: &std::path::Path) {
    let palette = [0u8, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255];
    let mut buf = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut buf, 8, 4, &palette).unwrap();
        for idx in 1u8..=3 {
            let mut frame = gif::Frame::default();
            frame.width = 8;
            frame.height = 4;
            frame.dispose = gif::DisposalMethod::Keep;
            frame.buffer = Cow::Owned(vec![idx; 32]);
            encoder.write_frame(&frame).unwrap();
        }
    }
    std::fs::write(path, buf).unwrap();
}

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_gifsheet")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "gifsheet.exe"
            } else {
                "gifsheet"
            });
            p
        })
}

#[test]
fn cli_sheet_writes_png() {
    let dir = PathBuf::from("target").join("cli_smoke");
    std::fs::create_dir_all(&dir).unwrap();

    let gif_path = dir.join("anim.gif");
    let out_path = dir.join("nested").join("sheet.png");
    let _ = std::fs::remove_file(&out_path);
    write_test_gif(&gif_path);

    let status = std::process::Command::new(exe())
        .args(["sheet", "--in"])
        .arg(&gif_path)
        .arg("--out")
        .arg(&out_path)
        .args(["--size", "48", "--keep-aspect", "--pixel-perfect"])
        .args(["--background", "#ffffff"])
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (48, 48));
}

#[test]
fn cli_sheet_reads_json_config() {
    let dir = PathBuf::from("target").join("cli_smoke_config");
    std::fs::create_dir_all(&dir).unwrap();

    let gif_path = dir.join("anim.gif");
    let cfg_path = dir.join("config.json");
    let out_path = dir.join("sheet.png");
    let _ = std::fs::remove_file(&out_path);
    write_test_gif(&gif_path);
    std::fs::write(
        &cfg_path,
        r#"{ "output_size": 30, "columns": 3, "pixel_perfect": true }"#,
    )
    .unwrap();

    let status = std::process::Command::new(exe())
        .args(["sheet", "--in"])
        .arg(&gif_path)
        .arg("--config")
        .arg(&cfg_path)
        .arg("--out")
        .arg(&out_path)
        .status()
        .unwrap();

    assert!(status.success());
    let img = image::open(&out_path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (30, 30));
    // One row of three cells; the bottom of every cell is filled.
    assert_eq!(img.get_pixel(5, 29).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(15, 29).0, [0, 255, 0, 255]);
    assert_eq!(img.get_pixel(25, 29).0, [0, 0, 255, 255]);
}

#[test]
fn cli_rejects_non_gif_input() {
    let dir = PathBuf::from("target").join("cli_smoke_reject");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("anim.png");
    std::fs::write(&path, b"not relevant").unwrap();

    let status = std::process::Command::new(exe())
        .args(["info", "--in"])
        .arg(&path)
        .status()
        .unwrap();
    assert!(!status.success());
}

#[test]
fn cli_info_lists_frames() {
    let dir = PathBuf::from("target").join("cli_smoke_info");
    std::fs::create_dir_all(&dir).unwrap();
    let gif_path = dir.join("anim.GIF");
    write_test_gif(&gif_path);

    let out = std::process::Command::new(exe())
        .args(["info", "--in"])
        .arg(&gif_path)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("frames:     3"));
    assert!(stdout.contains("canvas:     8x4"));
    assert!(stdout.contains("keep"));
}
