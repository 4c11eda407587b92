use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FxError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(FxError::asset("x").to_string().contains("asset error:"));
    assert!(FxError::device("x").to_string().contains("device error:"));
    assert!(
        FxError::from(LutError::MissingSize)
            .to_string()
            .contains("lut error:")
    );
}

#[test]
fn lut_errors_carry_line_numbers() {
    let err = LutError::MalformedNumber {
        line: 7,
        token: "0.x".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("line 7"));
    assert!(msg.contains("0.x"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FxError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
