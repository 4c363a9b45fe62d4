//! XYZ/CSV point cloud format support
//!
//! Plain text, one point per line: `x y z` optionally followed by `r g b`.
//! Values may be separated by whitespace, commas or semicolons. Lines starting
//! with `#` are comments. A first line with non-numeric tokens is treated as a
//! header and used to locate the columns by name.

use crate::PointCloudReader;
use cloudlabel_core::{Error, LoadedCloud, Point3f, PointCloud, Result, Rgb};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Column types that can be parsed from XYZ/CSV files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    X,
    Y,
    Z,
    Red,
    Green,
    Blue,
    Unknown,
}

impl ColumnType {
    /// Parse column type from header name
    pub fn from_header(header: &str) -> Self {
        match header.trim().to_lowercase().as_str() {
            "x" | "px" | "pos_x" | "position_x" => ColumnType::X,
            "y" | "py" | "pos_y" | "position_y" => ColumnType::Y,
            "z" | "pz" | "pos_z" | "position_z" => ColumnType::Z,
            "r" | "red" => ColumnType::Red,
            "g" | "green" => ColumnType::Green,
            "b" | "blue" => ColumnType::Blue,
            _ => ColumnType::Unknown,
        }
    }
}

/// Column positions of the values we read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    xyz: [usize; 3],
    rgb: Option<[usize; 3]>,
}

impl Layout {
    fn from_header(columns: &[&str]) -> Result<Self> {
        let types: Vec<ColumnType> = columns.iter().map(|c| ColumnType::from_header(c)).collect();
        let find = |wanted: ColumnType| types.iter().position(|&t| t == wanted);

        let missing = || Error::InvalidData(format!("Header has no x/y/z columns: {:?}", columns));
        let xyz = [
            find(ColumnType::X).ok_or_else(missing)?,
            find(ColumnType::Y).ok_or_else(missing)?,
            find(ColumnType::Z).ok_or_else(missing)?,
        ];
        let rgb = match (find(ColumnType::Red), find(ColumnType::Green), find(ColumnType::Blue)) {
            (Some(r), Some(g), Some(b)) => Some([r, g, b]),
            _ => None,
        };
        Ok(Self { xyz, rgb })
    }

    fn positional(column_count: usize) -> Self {
        Self {
            xyz: [0, 1, 2],
            rgb: (column_count >= 6).then_some([3, 4, 5]),
        }
    }
}

fn split_values(line: &str) -> Vec<&str> {
    line.split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect()
}

pub struct XyzReader;

impl XyzReader {
    pub fn read_from<R: BufRead>(reader: R) -> Result<LoadedCloud> {
        let mut layout: Option<Layout> = None;
        let mut points = Vec::new();
        let mut raw_colors: Vec<Rgb> = Vec::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("//") {
                continue;
            }

            let values = split_values(trimmed);
            let current = match layout {
                Some(layout) => layout,
                None => {
                    let is_header = values.iter().any(|v| v.parse::<f64>().is_err());
                    let detected = if is_header {
                        Layout::from_header(&values)?
                    } else {
                        Layout::positional(values.len())
                    };
                    layout = Some(detected);
                    if is_header {
                        continue;
                    }
                    detected
                }
            };

            let value = |column: usize| -> Result<f32> {
                let token = values.get(column).ok_or_else(|| {
                    Error::InvalidData(format!("Line {}: missing column {}", line_number + 1, column + 1))
                })?;
                token.parse::<f32>().map_err(|_| {
                    Error::InvalidData(format!("Line {}: invalid number '{}'", line_number + 1, token))
                })
            };

            let [xi, yi, zi] = current.xyz;
            points.push(Point3f::new(value(xi)?, value(yi)?, value(zi)?));
            if let Some([ri, gi, bi]) = current.rgb {
                raw_colors.push([value(ri)?, value(gi)?, value(bi)?]);
            }
        }

        let colors = if raw_colors.is_empty() {
            None
        } else {
            // Integer 0-255 channels unless every value already fits in [0, 1]
            let scale = if raw_colors.iter().flatten().any(|&c| c > 1.0) { 255.0 } else { 1.0 };
            Some(raw_colors.into_iter().map(|c| c.map(|v| v / scale)).collect())
        };

        LoadedCloud::new(PointCloud::from_points(points), colors)
    }
}

impl PointCloudReader for XyzReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<LoadedCloud> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}
