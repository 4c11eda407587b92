//! Cube-format colour lookup tables.

use std::path::Path;

use anyhow::Context;
use rayon::prelude::*;

use crate::foundation::error::{FxError, FxResult, LutError};
use crate::render::device::TextureData;

/// Longest accepted line, excluding the line terminator.
pub const MAX_LINE_BYTES: usize = 251;
pub const LUT_1D_SIZE_RANGE: (u32, u32) = (2, 65_536);
pub const LUT_3D_SIZE_RANGE: (u32, u32) = (2, 256);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LutDim {
    OneD,
    ThreeD,
}

/// Parsed Cube LUT.
///
/// `data` holds RGB triples in file order: for 3-D tables red varies fastest, then green,
/// then blue.
#[derive(Clone, Debug, PartialEq)]
pub struct CubeLut {
    pub title: Option<String>,
    pub dim: LutDim,
    pub size: u32,
    pub domain_min: [f32; 3],
    pub domain_max: [f32; 3],
    pub data: Vec<f32>,
}

impl CubeLut {
    /// Read and parse a `.cube` file.
    pub fn load(path: &Path) -> FxResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read cube lut '{}'", path.display()))?;
        Ok(Self::parse(&text)?)
    }

    pub fn parse(text: &str) -> Result<Self, LutError> {
        let mut title = None;
        let mut domain_min = [0.0f32; 3];
        let mut domain_max = [1.0f32; 3];
        let mut size: Option<(LutDim, u32)> = None;
        let mut data = Vec::<f32>::new();

        for (idx, raw) in text.lines().enumerate() {
            let line_no = idx + 1;
            if raw.len() > MAX_LINE_BYTES {
                return Err(LutError::LineTooLong {
                    line: line_no,
                    len: raw.len(),
                    max: MAX_LINE_BYTES,
                });
            }
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let Some(head) = fields.next() else {
                continue;
            };

            if !starts_numeric(head) {
                if !data.is_empty() {
                    return Err(LutError::Unexpected {
                        line: line_no,
                        text: line.to_string(),
                    });
                }
                match head {
                    "TITLE" => {
                        title = parse_title(line[head.len()..].trim());
                        if title.is_none() {
                            tracing::debug!(line = line_no, "ignoring malformed TITLE");
                        }
                    }
                    "DOMAIN_MIN" => domain_min = parse_triple(line, line_no)?,
                    "DOMAIN_MAX" => domain_max = parse_triple(line, line_no)?,
                    "LUT_1D_SIZE" | "LUT_3D_SIZE" => {
                        if size.is_some() {
                            return Err(LutError::ConflictingSize { line: line_no });
                        }
                        size = Some(parse_size(head, line, line_no)?);
                    }
                    _ => tracing::debug!(line = line_no, keyword = head, "skipping unknown keyword"),
                }
                continue;
            }

            if size.is_none() {
                return Err(LutError::Unexpected {
                    line: line_no,
                    text: line.to_string(),
                });
            }
            data.extend_from_slice(&parse_triple_fields(line, line_no)?);
        }

        let Some((dim, size)) = size else {
            return Err(LutError::MissingSize);
        };

        for channel in 0..3 {
            if domain_min[channel] > domain_max[channel] {
                return Err(LutError::InvertedDomain {
                    channel,
                    min: domain_min,
                    max: domain_max,
                });
            }
        }

        let expected = match dim {
            LutDim::OneD => size as usize,
            LutDim::ThreeD => (size as usize).pow(3),
        };
        let found = data.len() / 3;
        if found != expected {
            return Err(LutError::EntryCount { expected, found });
        }

        Ok(Self {
            title,
            dim,
            size,
            domain_min,
            domain_max,
            data,
        })
    }

    /// Number of RGB entries (`n` or `n³`).
    pub fn entry_count(&self) -> usize {
        self.data.len() / 3
    }

    /// Texel layout for uploading this table as a lookup texture.
    pub fn texture_data(&self) -> TextureData<'_> {
        match self.dim {
            LutDim::OneD => TextureData::Lut1d {
                size: self.size,
                rgb: &self.data,
            },
            LutDim::ThreeD => TextureData::Lut3d {
                size: self.size,
                rgb: &self.data,
            },
        }
    }

    /// Map one colour through the table (linear for 1-D, trilinear for 3-D).
    pub fn sample(&self, rgb: [f32; 3]) -> [f32; 3] {
        let n = self.size as usize;
        let max_i = (n - 1) as f32;
        let mut pos = [0.0f32; 3];
        for c in 0..3 {
            let range = self.domain_max[c] - self.domain_min[c];
            let t = if range > 0.0 {
                ((rgb[c] - self.domain_min[c]) / range).clamp(0.0, 1.0)
            } else {
                0.0
            };
            pos[c] = if t.is_finite() { t * max_i } else { 0.0 };
        }

        match self.dim {
            LutDim::OneD => {
                let mut out = [0.0f32; 3];
                for c in 0..3 {
                    let (i0, i1, f) = split(pos[c], n);
                    let a = self.data[i0 * 3 + c];
                    let b = self.data[i1 * 3 + c];
                    out[c] = a + (b - a) * f;
                }
                out
            }
            LutDim::ThreeD => {
                let (r0, r1, fr) = split(pos[0], n);
                let (g0, g1, fg) = split(pos[1], n);
                let (b0, b1, fb) = split(pos[2], n);
                let at = |r: usize, g: usize, b: usize| -> [f32; 3] {
                    let i = ((b * n + g) * n + r) * 3;
                    [self.data[i], self.data[i + 1], self.data[i + 2]]
                };
                let mut out = [0.0f32; 3];
                for (c, o) in out.iter_mut().enumerate() {
                    let c00 = lerp(at(r0, g0, b0)[c], at(r1, g0, b0)[c], fr);
                    let c10 = lerp(at(r0, g1, b0)[c], at(r1, g1, b0)[c], fr);
                    let c01 = lerp(at(r0, g0, b1)[c], at(r1, g0, b1)[c], fr);
                    let c11 = lerp(at(r0, g1, b1)[c], at(r1, g1, b1)[c], fr);
                    *o = lerp(lerp(c00, c10, fg), lerp(c01, c11, fg), fb);
                }
                out
            }
        }
    }

    /// Apply the table in place to straight-alpha RGBA8 pixels. Alpha is untouched.
    pub fn apply_rgba8(&self, pixels: &mut [u8]) -> FxResult<()> {
        if !pixels.len().is_multiple_of(4) {
            return Err(FxError::validation("rgba8 buffer length must be a multiple of 4"));
        }
        pixels.par_chunks_mut(4).for_each(|px| {
            let rgb = [
                f32::from(px[0]) / 255.0,
                f32::from(px[1]) / 255.0,
                f32::from(px[2]) / 255.0,
            ];
            let out = self.sample(rgb);
            for c in 0..3 {
                px[c] = (out[c].clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });
        Ok(())
    }
}

fn starts_numeric(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
}

fn parse_title(rest: &str) -> Option<String> {
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(inner.to_string())
}

fn parse_number(token: &str, line: usize) -> Result<f32, LutError> {
    token
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| LutError::MalformedNumber {
            line,
            token: token.to_string(),
        })
}

fn parse_triple_fields(fields: &str, line: usize) -> Result<[f32; 3], LutError> {
    let tokens: Vec<&str> = fields.split_whitespace().collect();
    if tokens.len() != 3 {
        return Err(LutError::WrongArity {
            line,
            expected: 3,
            found: tokens.len(),
        });
    }
    Ok([
        parse_number(tokens[0], line)?,
        parse_number(tokens[1], line)?,
        parse_number(tokens[2], line)?,
    ])
}

/// `KEYWORD r g b`
fn parse_triple(line: &str, line_no: usize) -> Result<[f32; 3], LutError> {
    let rest = line.split_once(char::is_whitespace).map_or("", |(_, r)| r);
    parse_triple_fields(rest, line_no)
}

fn parse_size(keyword: &str, line: &str, line_no: usize) -> Result<(LutDim, u32), LutError> {
    let tokens: Vec<&str> = line.split_whitespace().skip(1).collect();
    if tokens.len() != 1 {
        return Err(LutError::WrongArity {
            line: line_no,
            expected: 1,
            found: tokens.len(),
        });
    }
    let size = tokens[0]
        .parse::<u64>()
        .map_err(|_| LutError::MalformedNumber {
            line: line_no,
            token: tokens[0].to_string(),
        })?;
    let (dim, keyword, (min, max)) = if keyword == "LUT_1D_SIZE" {
        (LutDim::OneD, "LUT_1D_SIZE", LUT_1D_SIZE_RANGE)
    } else {
        (LutDim::ThreeD, "LUT_3D_SIZE", LUT_3D_SIZE_RANGE)
    };
    if size < u64::from(min) || size > u64::from(max) {
        return Err(LutError::SizeOutOfRange {
            line: line_no,
            keyword,
            size,
            min,
            max,
        });
    }
    Ok((dim, size as u32))
}

fn split(pos: f32, n: usize) -> (usize, usize, f32) {
    let i0 = (pos.floor() as usize).min(n - 1);
    let i1 = (i0 + 1).min(n - 1);
    (i0, i1, pos - i0 as f32)
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cube.rs"]
mod tests;
