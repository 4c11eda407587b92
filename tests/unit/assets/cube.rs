use super::*;

fn synthetic_3d(n: usize) -> (String, Vec<f32>) {
    let mut text = String::from("# generated\nTITLE \"ramp\"\n");
    text.push_str(&format!("LUT_3D_SIZE {n}\n\n"));
    let mut expected = Vec::new();
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                let v = [r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0];
                text.push_str(&format!("{} {} {}\n", v[0], v[1], v[2]));
                expected.extend_from_slice(&v);
            }
        }
    }
    (text, expected)
}

fn identity_3d(n: usize) -> String {
    let mut text = format!("LUT_3D_SIZE {n}\n");
    let d = (n - 1) as f32;
    for b in 0..n {
        for g in 0..n {
            for r in 0..n {
                text.push_str(&format!("{} {} {}\n", r as f32 / d, g as f32 / d, b as f32 / d));
            }
        }
    }
    text
}

#[test]
fn parses_synthetic_3d_in_file_order() {
    let (text, expected) = synthetic_3d(4);
    let lut = CubeLut::parse(&text).unwrap();
    assert_eq!(lut.dim, LutDim::ThreeD);
    assert_eq!(lut.size, 4);
    assert_eq!(lut.title.as_deref(), Some("ramp"));
    assert_eq!(lut.entry_count(), 64);
    assert_eq!(lut.data, expected);
    assert_eq!(lut.domain_min, [0.0; 3]);
    assert_eq!(lut.domain_max, [1.0; 3]);
}

#[test]
fn parses_1d_with_domain() {
    let text = "LUT_1D_SIZE 2\nDOMAIN_MIN 0 0 0\nDOMAIN_MAX 2 2 2\n0 0 0\n1 1 1\n";
    let lut = CubeLut::parse(text).unwrap();
    assert_eq!(lut.dim, LutDim::OneD);
    assert_eq!(lut.domain_max, [2.0; 3]);
    assert_eq!(lut.sample([1.0, 2.0, 0.0]), [0.5, 1.0, 0.0]);
}

#[test]
fn rejects_size_one() {
    let err = CubeLut::parse("LUT_3D_SIZE 1\n0 0 0\n").unwrap_err();
    assert!(matches!(err, LutError::SizeOutOfRange { size: 1, .. }));
    let err = CubeLut::parse("LUT_1D_SIZE 1\n0 0 0\n").unwrap_err();
    assert!(matches!(err, LutError::SizeOutOfRange { size: 1, .. }));
}

#[test]
fn rejects_oversized_3d() {
    let err = CubeLut::parse("LUT_3D_SIZE 300\n").unwrap_err();
    assert!(matches!(
        err,
        LutError::SizeOutOfRange {
            size: 300,
            max: 256,
            ..
        }
    ));
}

#[test]
fn accepts_large_1d_within_range() {
    let mut text = String::from("LUT_1D_SIZE 300\n");
    for _ in 0..300 {
        text.push_str("0.5 0.5 0.5\n");
    }
    assert_eq!(CubeLut::parse(&text).unwrap().entry_count(), 300);
}

#[test]
fn rejects_both_size_declarations() {
    let err = CubeLut::parse("LUT_1D_SIZE 2\nLUT_3D_SIZE 2\n").unwrap_err();
    assert_eq!(err, LutError::ConflictingSize { line: 2 });
}

#[test]
fn rejects_inverted_domain_on_any_channel() {
    for channel in 0..3 {
        let mut min = [0.0f32; 3];
        min[channel] = 1.5;
        let text = format!(
            "LUT_1D_SIZE 2\nDOMAIN_MIN {} {} {}\nDOMAIN_MAX 1 1 1\n0 0 0\n1 1 1\n",
            min[0], min[1], min[2]
        );
        let err = CubeLut::parse(&text).unwrap_err();
        assert!(
            matches!(err, LutError::InvertedDomain { channel: c, .. } if c == channel),
            "{err:?}"
        );
    }
}

#[test]
fn rejects_missing_size() {
    assert_eq!(
        CubeLut::parse("TITLE \"x\"\n# nothing\n").unwrap_err(),
        LutError::MissingSize
    );
}

#[test]
fn rejects_malformed_numbers() {
    let err = CubeLut::parse("LUT_1D_SIZE 2\n0 0 0\n1 1x 1\n").unwrap_err();
    assert_eq!(
        err,
        LutError::MalformedNumber {
            line: 3,
            token: "1x".to_string()
        }
    );
    let err = CubeLut::parse("LUT_3D_SIZE two\n").unwrap_err();
    assert!(matches!(err, LutError::MalformedNumber { line: 1, .. }));
}

#[test]
fn rejects_wrong_entry_count_and_arity() {
    let err = CubeLut::parse("LUT_1D_SIZE 3\n0 0 0\n1 1 1\n").unwrap_err();
    assert_eq!(err, LutError::EntryCount { expected: 3, found: 2 });
    let err = CubeLut::parse("LUT_1D_SIZE 2\n0 0\n").unwrap_err();
    assert!(matches!(err, LutError::WrongArity { found: 2, .. }));
}

#[test]
fn rejects_overlong_lines() {
    let text = format!("# {}\nLUT_1D_SIZE 2\n0 0 0\n1 1 1\n", "x".repeat(300));
    assert!(matches!(
        CubeLut::parse(&text).unwrap_err(),
        LutError::LineTooLong { line: 1, .. }
    ));
}

#[test]
fn tolerates_missing_or_invalid_title() {
    let lut = CubeLut::parse("TITLE untitled\nLUT_1D_SIZE 2\n0 0 0\n1 1 1\n").unwrap();
    assert_eq!(lut.title, None);
}

#[test]
fn data_before_size_is_unexpected() {
    let err = CubeLut::parse("0 0 0\nLUT_1D_SIZE 2\n").unwrap_err();
    assert!(matches!(err, LutError::Unexpected { line: 1, .. }));
}

#[test]
fn trilinear_identity_preserves_colour() {
    let lut = CubeLut::parse(&identity_3d(5)).unwrap();
    let out = lut.sample([0.3, 0.6, 0.9]);
    for (o, e) in out.iter().zip([0.3, 0.6, 0.9]) {
        assert!((o - e).abs() < 1e-5);
    }
    assert_eq!(lut.sample([-1.0, 2.0, 0.0]), [0.0, 1.0, 0.0]);
}

#[test]
fn apply_rgba8_keeps_alpha() {
    let text = "LUT_1D_SIZE 2\n1 1 1\n0 0 0\n";
    let lut = CubeLut::parse(text).unwrap();
    let mut px = vec![0u8, 255, 51, 7, 255, 0, 0, 200];
    lut.apply_rgba8(&mut px).unwrap();
    assert_eq!(px, vec![255, 0, 204, 7, 0, 255, 255, 200]);
    assert!(lut.apply_rgba8(&mut [0u8; 3]).is_err());
}

#[test]
fn texture_data_matches_dimension() {
    let lut = CubeLut::parse(&identity_3d(2)).unwrap();
    assert!(matches!(lut.texture_data(), TextureData::Lut3d { size: 2, rgb } if rgb.len() == 24));
}
