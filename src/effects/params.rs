//! Helpers for reading per-instance JSON parameter blocks.
//!
//! `null` means "no attached data": every field falls back to its default.

use crate::foundation::error::{FxError, FxResult};

pub type ParamMap = serde_json::Map<String, serde_json::Value>;

/// Borrow `params` as an object, or `None` when it is `null`.
pub fn object<'a>(
    effect: &str,
    params: &'a serde_json::Value,
) -> FxResult<Option<&'a ParamMap>> {
    if params.is_null() {
        return Ok(None);
    }
    params
        .as_object()
        .map(Some)
        .ok_or_else(|| FxError::validation(format!("{effect} params must be an object")))
}

/// Finite number at `key`, if present.
pub fn number(effect: &str, params: Option<&ParamMap>, key: &str) -> FxResult<Option<f32>> {
    let Some(v) = params.and_then(|p| p.get(key)) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    let f = v
        .as_f64()
        .ok_or_else(|| FxError::validation(format!("{effect}.{key} must be a number")))?
        as f32;
    if !f.is_finite() {
        return Err(FxError::validation(format!("{effect}.{key} must be finite")));
    }
    Ok(Some(f))
}

/// Fixed-length array of finite numbers at `key`, if present.
pub fn array<const N: usize>(
    effect: &str,
    params: Option<&ParamMap>,
    key: &str,
) -> FxResult<Option<[f32; N]>> {
    let Some(v) = params.and_then(|p| p.get(key)) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    let items = v.as_array().filter(|a| a.len() == N).ok_or_else(|| {
        FxError::validation(format!("{effect}.{key} must be an array of {N} numbers"))
    })?;
    let mut out = [0.0f32; N];
    for (slot, item) in out.iter_mut().zip(items) {
        *slot = item
            .as_f64()
            .map(|x| x as f32)
            .filter(|x| x.is_finite())
            .ok_or_else(|| {
                FxError::validation(format!("{effect}.{key} must contain finite numbers"))
            })?;
    }
    Ok(Some(out))
}

/// Non-empty string at `key`, if present.
pub fn string<'a>(
    effect: &str,
    params: Option<&'a ParamMap>,
    key: &str,
) -> FxResult<Option<&'a str>> {
    let Some(v) = params.and_then(|p| p.get(key)) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    let s = v
        .as_str()
        .ok_or_else(|| FxError::validation(format!("{effect}.{key} must be a string")))?;
    if s.trim().is_empty() {
        return Err(FxError::validation(format!("{effect}.{key} must be non-empty")));
    }
    Ok(Some(s))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/params.rs"]
mod tests;
