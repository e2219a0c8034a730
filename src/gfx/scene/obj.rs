//! # OBJ Mesh Parsing
//!
//! Converts OBJ text into a flat, draw-ordered vertex list. Only the geometry
//! directives are read:
//!
//! - `v x y z` - vertex position
//! - `vt u [v]` - texture coordinate
//! - `vn x y z` - vertex normal
//! - `f r1 r2 r3 ...` - polygon face, each reference `v[/t][/n]` with 1-based indices
//!
//! Every other directive (comments, `o`, `g`, `s`, `usemtl`, `mtllib`, ...) is ignored.
//! Faces with more than three references are split into a triangle fan, which
//! is only correct for convex, planar polygons.

use cgmath::{Vector3, Zero};
use log::debug;

use super::{bounding_box::BoundingBox, vertex::Vertex};
use crate::error::{RenderError, Result};

/// Geometry produced from OBJ text
#[derive(Debug, Clone)]
pub struct ObjData {
    /// Expanded vertices, three per triangle, in draw order
    pub vertices: Vec<Vertex>,
    /// Extent of the source positions
    pub bounding_box: BoundingBox,
    /// Mean of the source positions
    pub centroid: Vector3<f32>,
    /// Number of `f` directives read
    pub face_count: usize,
}

impl Default for ObjData {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            bounding_box: BoundingBox::default(),
            centroid: Vector3::zero(),
            face_count: 0,
        }
    }
}

impl ObjData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

/// One `v[/t][/n]` reference from a face, indices still 1-based
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRef {
    pub position: usize,
    pub tex_coord: Option<usize>,
    pub normal: Option<usize>,
}

impl FaceRef {
    /// Parses a single face token such as `3`, `3/1`, `3//2` or `3/1/2`
    pub fn parse(token: &str) -> std::result::Result<Self, String> {
        let mut parts = token.split('/');

        let position = match parts.next() {
            Some(p) if !p.is_empty() => parse_index(p, token)?,
            _ => return Err(format!("face reference '{}' has no position index", token)),
        };
        let tex_coord = match parts.next() {
            Some(t) if !t.is_empty() => Some(parse_index(t, token)?),
            _ => None,
        };
        let normal = match parts.next() {
            Some(n) if !n.is_empty() => Some(parse_index(n, token)?),
            _ => None,
        };
        if parts.next().is_some() {
            return Err(format!("face reference '{}' has too many components", token));
        }

        Ok(Self {
            position,
            tex_coord,
            normal,
        })
    }
}

fn parse_index(text: &str, token: &str) -> std::result::Result<usize, String> {
    match text.parse::<usize>() {
        Ok(0) => Err(format!("face reference '{}' uses index 0; indices are 1-based", token)),
        Ok(index) => Ok(index),
        Err(_) => Err(format!("face reference '{}' has invalid index '{}'", token, text)),
    }
}

/// Splits a polygon's references into triangles
///
/// - Fewer than three references: passed through, padded with the last
///   reference into one degenerate triangle.
/// - Three references: returned unchanged.
/// - N ≥ 4 references: a fan from `refs[0]`. The seed triangle
///   `(refs[0], refs[1], refs[2])` is followed by `(refs[i], refs[0], refs[i-1])`
///   for every remaining `i` in `1..N`. The `i = 1` step collapses to a
///   zero-area triangle and `i = 2` would repeat the seed, so it is skipped.
///   The result is always N-1 triangles whose areas sum to the polygon's.
pub fn triangulate<T: Copy>(refs: &[T]) -> Vec<[T; 3]> {
    let n = refs.len();
    match n {
        0 => Vec::new(),
        1..=3 => vec![[refs[0], refs[1.min(n - 1)], refs[n - 1]]],
        _ => {
            let mut triangles = Vec::with_capacity(n - 1);
            triangles.push([refs[0], refs[1], refs[2]]);
            for i in (1..n).filter(|&i| i != 2) {
                triangles.push([refs[i], refs[0], refs[i - 1]]);
            }
            triangles
        }
    }
}

/// Parses OBJ text into expanded vertices plus bounding geometry
///
/// Fails with [`RenderError::MalformedMesh`] on unparsable numbers, indices
/// outside the declared lists, or when only some face references carry
/// texture-coordinate or normal indices.
pub fn parse_obj(text: &str) -> Result<ObjData> {
    let mut positions: Vec<Vector3<f32>> = Vec::new();
    let mut tex_coords: Vec<[f32; 2]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();

    let mut position_indices: Vec<usize> = Vec::new();
    let mut tex_coord_indices: Vec<usize> = Vec::new();
    let mut normal_indices: Vec<usize> = Vec::new();
    let mut face_count = 0;

    for (line_index, line) in text.lines().enumerate() {
        let line_number = line_index + 1;
        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            continue;
        };

        match directive {
            "v" => {
                let [x, y, z] = parse_floats::<3>(tokens, 3, line_number, directive)?;
                positions.push(Vector3::new(x, y, z));
            }
            "vt" => tex_coords.push(parse_floats::<2>(tokens, 1, line_number, directive)?),
            "vn" => normals.push(parse_floats::<3>(tokens, 3, line_number, directive)?),
            "f" => {
                let refs = tokens
                    .map(FaceRef::parse)
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|reason| malformed(line_number, reason))?;
                if refs.is_empty() {
                    debug!("Skipping empty face on line {}", line_number);
                    continue;
                }
                face_count += 1;

                for triangle in triangulate(&refs) {
                    for face_ref in triangle {
                        position_indices.push(face_ref.position);
                        if let Some(t) = face_ref.tex_coord {
                            tex_coord_indices.push(t);
                        }
                        if let Some(n) = face_ref.normal {
                            normal_indices.push(n);
                        }
                    }
                }
            }
            _ => {}
        }
    }

    check_alignment("texture-coordinate", tex_coord_indices.len(), position_indices.len())?;
    check_alignment("normal", normal_indices.len(), position_indices.len())?;

    let mut vertices = Vec::with_capacity(position_indices.len());
    for (i, &position_index) in position_indices.iter().enumerate() {
        let position = lookup(&positions, position_index, "vertex")?;
        let normal = match normal_indices.get(i) {
            Some(&index) => lookup(&normals, index, "normal")?,
            None => [0.0; 3],
        };
        let tex_coord = match tex_coord_indices.get(i) {
            Some(&index) => lookup(&tex_coords, index, "texture-coordinate")?,
            None => [0.0; 2],
        };
        vertices.push(Vertex::new(position.into(), normal, tex_coord));
    }

    let data = ObjData {
        bounding_box: BoundingBox::from_positions(&positions),
        centroid: centroid(&positions),
        vertices,
        face_count,
    };

    debug!(
        "Parsed OBJ: {} positions, {} faces, {} vertices",
        positions.len(),
        data.face_count,
        data.vertex_count()
    );

    Ok(data)
}

/// Arithmetic mean of `positions`, or the zero vector when empty
pub fn centroid(positions: &[Vector3<f32>]) -> Vector3<f32> {
    if positions.is_empty() {
        return Vector3::zero();
    }
    let sum = positions
        .iter()
        .fold(Vector3::zero(), |acc: Vector3<f32>, p| acc + p);
    sum / positions.len() as f32
}

fn parse_floats<const N: usize>(
    mut tokens: std::str::SplitWhitespace<'_>,
    required: usize,
    line: usize,
    directive: &str,
) -> Result<[f32; N]> {
    let mut values = [0.0; N];
    for (i, slot) in values.iter_mut().enumerate() {
        match tokens.next() {
            Some(token) => {
                *slot = token.parse().map_err(|_| {
                    malformed(line, format!("invalid number '{}' in '{}'", token, directive))
                })?;
            }
            None if i < required => {
                return Err(malformed(
                    line,
                    format!("'{}' needs {} components", directive, required),
                ));
            }
            None => break,
        }
    }
    Ok(values)
}

fn check_alignment(attribute: &str, count: usize, positions: usize) -> Result<()> {
    if count == 0 || count == positions {
        return Ok(());
    }
    Err(RenderError::MalformedMesh(format!(
        "{} {} indices for {} vertex references; faces must index attributes consistently",
        count, attribute, positions
    )))
}

fn lookup<T: Copy>(list: &[T], index: usize, attribute: &str) -> Result<T> {
    list.get(index - 1).copied().ok_or_else(|| {
        RenderError::MalformedMesh(format!(
            "{} index {} out of range ({} defined)",
            attribute,
            index,
            list.len()
        ))
    })
}

fn malformed(line: usize, reason: impl std::fmt::Display) -> RenderError {
    RenderError::MalformedMesh(format!("line {}: {}", line, reason))
}
