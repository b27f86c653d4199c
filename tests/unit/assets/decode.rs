use std::path::PathBuf;

use super::*;

#[test]
fn png_round_trip_keeps_straight_rgba() {
    let raw = vec![100u8, 50, 200, 128, 0, 0, 0, 0, 255, 1, 2, 3];
    let img = Image::new(3, 1, raw.clone()).unwrap();

    let png = encode_png(&img).unwrap();
    let back = decode_image(&png).unwrap();
    assert_eq!(back.width(), 3);
    assert_eq!(back.height(), 1);
    assert_eq!(back.pixels(), raw.as_slice());
}

#[test]
fn decode_rejects_garbage() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, BlurError::Other(_)));
}

#[test]
fn load_missing_file_names_the_path() {
    let path = PathBuf::from("target").join("rowblur_missing").join("nope.png");
    let err = load_image(&path).unwrap_err();
    assert!(err.to_string().contains("nope.png"));
}

#[test]
fn save_then_load_from_disk() {
    let dir = PathBuf::from("target").join("rowblur_decode_unit");
    let path = dir.join("nested").join("out.png");
    let _ = std::fs::remove_file(&path);

    let img = Image::filled(4, 2, [9, 8, 7, 255]).unwrap();
    save_png(&img, &path).unwrap();
    assert_eq!(load_image(&path).unwrap(), img);
}
