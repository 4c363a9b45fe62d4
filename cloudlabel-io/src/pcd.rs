//! PCD (Point Cloud Data) format support
//!
//! Reads ASCII and binary PCD files. Coordinates come from the `x`, `y`, `z`
//! fields; colors from a packed `rgb` or `rgba` field when one is present.

use crate::PointCloudReader;
use cloudlabel_core::{rgb_from_u8, Error, LoadedCloud, Point3f, PointCloud, Result, Rgb};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// PCD data format variants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdDataFormat {
    Ascii,
    Binary,
    BinaryCompressed,
}

/// PCD field data types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdFieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl PcdFieldType {
    fn parse(type_str: &str, size: usize) -> Result<Self> {
        match (type_str, size) {
            ("I", 1) => Ok(PcdFieldType::I8),
            ("I", 2) => Ok(PcdFieldType::I16),
            ("I", 4) => Ok(PcdFieldType::I32),
            ("U", 1) => Ok(PcdFieldType::U8),
            ("U", 2) => Ok(PcdFieldType::U16),
            ("U", 4) => Ok(PcdFieldType::U32),
            ("F", 4) => Ok(PcdFieldType::F32),
            ("F", 8) => Ok(PcdFieldType::F64),
            _ => Err(Error::InvalidData(format!(
                "Unknown field type/size combination: {}/{}",
                type_str, size
            ))),
        }
    }

    fn size(self) -> usize {
        match self {
            PcdFieldType::I8 | PcdFieldType::U8 => 1,
            PcdFieldType::I16 | PcdFieldType::U16 => 2,
            PcdFieldType::I32 | PcdFieldType::U32 | PcdFieldType::F32 => 4,
            PcdFieldType::F64 => 8,
        }
    }
}

/// PCD field definition
#[derive(Debug, Clone)]
pub struct PcdField {
    pub name: String,
    pub field_type: PcdFieldType,
    pub count: usize,
}

/// Upper bound on how many points are reserved up front from a header
const MAX_PREALLOCATED_POINTS: usize = 1 << 20;

/// PCD header information
#[derive(Debug, Clone)]
pub struct PcdHeader {
    pub version: String,
    pub fields: Vec<PcdField>,
    pub width: usize,
    pub height: usize,
    pub data_format: PcdDataFormat,
}

impl PcdHeader {
    /// `WIDTH * HEIGHT`, or an error when the product does not fit in `usize`
    pub fn point_count(&self) -> Result<usize> {
        self.width.checked_mul(self.height).ok_or_else(|| {
            Error::InvalidData(format!(
                "PCD point count overflows: WIDTH {} * HEIGHT {}",
                self.width, self.height
            ))
        })
    }

    fn field_position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// One decoded field value, kept with its raw bits so packed colors survive
#[derive(Debug, Clone, Copy)]
enum PcdValue {
    Int(i64),
    Float(f64, u32),
}

impl PcdValue {
    fn as_f64(self) -> f64 {
        match self {
            PcdValue::Int(v) => v as f64,
            PcdValue::Float(v, _) => v,
        }
    }

    /// Interpret the value as a packed `0x00RRGGBB` color
    fn as_packed_rgb(self) -> Rgb {
        let bits = match self {
            PcdValue::Int(v) => v as u32,
            PcdValue::Float(_, bits) => bits,
        };
        rgb_from_u8([(bits >> 16) as u8, (bits >> 8) as u8, bits as u8])
    }
}

pub struct PcdReader;

impl PcdReader {
    /// Read PCD header
    pub fn read_header<R: BufRead>(reader: &mut R) -> Result<PcdHeader> {
        let mut version = None;
        let mut names = Vec::new();
        let mut sizes = Vec::new();
        let mut types = Vec::new();
        let mut counts = Vec::new();
        let mut width = None;
        let mut height = None;
        let mut points = None;
        let data_format;

        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(Error::InvalidData("Unexpected end of file in PCD header".to_string()));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = trimmed.split_whitespace().collect();
            let values = &parts[1..];
            match parts[0] {
                "VERSION" => version = values.first().map(|v| v.to_string()),
                "FIELDS" => names = values.iter().map(|v| v.to_string()).collect(),
                "SIZE" => sizes = parse_all(values, "SIZE")?,
                "TYPE" => types = values.iter().map(|v| v.to_string()).collect(),
                "COUNT" => counts = parse_all(values, "COUNT")?,
                "WIDTH" => width = values.first().map(|v| parse_one(v, "WIDTH")).transpose()?,
                "HEIGHT" => height = values.first().map(|v| parse_one(v, "HEIGHT")).transpose()?,
                "POINTS" => points = values.first().map(|v| parse_one(v, "POINTS")).transpose()?,
                "DATA" => {
                    data_format = match values.first().copied() {
                        Some("ascii") => PcdDataFormat::Ascii,
                        Some("binary") => PcdDataFormat::Binary,
                        Some("binary_compressed") => PcdDataFormat::BinaryCompressed,
                        other => {
                            return Err(Error::InvalidData(format!("Unknown PCD DATA format: {:?}", other)))
                        }
                    };
                    break;
                }
                // VIEWPOINT and unknown keys carry nothing we use
                _ => {}
            }
        }

        let version = version.ok_or_else(|| Error::InvalidData("Missing VERSION in PCD header".to_string()))?;
        let height = height.unwrap_or(1);
        let width = match (width, points) {
            (Some(width), _) => width,
            (None, Some(points)) => points,
            (None, None) => return Err(Error::InvalidData("Missing WIDTH in PCD header".to_string())),
        };

        if counts.is_empty() {
            counts = vec![1; names.len()];
        }
        if names.len() != sizes.len() || names.len() != types.len() || names.len() != counts.len() {
            return Err(Error::InvalidData(
                "Mismatch between FIELDS, SIZE, TYPE, and COUNT declarations".to_string(),
            ));
        }

        let fields = names
            .into_iter()
            .zip(types.iter().zip(sizes.iter()))
            .zip(counts)
            .map(|((name, (type_str, &size)), count)| {
                if count == 0 {
                    return Err(Error::InvalidData(format!("PCD field {} has COUNT 0", name)));
                }
                Ok(PcdField {
                    name,
                    field_type: PcdFieldType::parse(type_str, size)?,
                    count,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let header = PcdHeader {
            version,
            fields,
            width,
            height,
            data_format,
        };
        let declared = header.point_count()?;
        if let Some(points) = points {
            if points != declared {
                return Err(Error::InvalidData(format!(
                    "POINTS ({}) doesn't match WIDTH * HEIGHT ({})",
                    points, declared
                )));
            }
        }
        Ok(header)
    }

    /// Read a whole PCD stream into a cloud
    pub fn read_from<R: BufRead>(reader: &mut R) -> Result<LoadedCloud> {
        let header = Self::read_header(reader)?;

        let position = |name: &str| {
            header
                .field_position(name)
                .ok_or_else(|| Error::InvalidData(format!("Missing {} field in PCD header", name)))
        };
        let (xi, yi, zi) = (position("x")?, position("y")?, position("z")?);
        let color_index = header
            .field_position("rgb")
            .or_else(|| header.field_position("rgba"));

        let point_count = header.point_count()?;
        let reserve = point_count.min(MAX_PREALLOCATED_POINTS);
        let mut points = Vec::with_capacity(reserve);
        let mut colors = color_index.map(|_| Vec::with_capacity(reserve));

        let mut record = Vec::with_capacity(header.fields.len());
        for _ in 0..point_count {
            record.clear();
            match header.data_format {
                PcdDataFormat::Ascii => Self::read_ascii_record(reader, &header, &mut record)?,
                PcdDataFormat::Binary => Self::read_binary_record(reader, &header, &mut record)?,
                PcdDataFormat::BinaryCompressed => {
                    return Err(Error::UnsupportedFormat(
                        "Binary compressed PCD format not supported".to_string(),
                    ))
                }
            }

            let value = |i: usize| {
                record
                    .get(i)
                    .copied()
                    .ok_or_else(|| Error::InvalidData("PCD record is missing a declared field".to_string()))
            };
            points.push(Point3f::new(
                value(xi)?.as_f64() as f32,
                value(yi)?.as_f64() as f32,
                value(zi)?.as_f64() as f32,
            ));
            if let (Some(colors), Some(ci)) = (colors.as_mut(), color_index) {
                colors.push(value(ci)?.as_packed_rgb());
            }
        }

        LoadedCloud::new(PointCloud::from_points(points), colors)
    }

    /// Read one ASCII line, keeping the first value of each field
    fn read_ascii_record<R: BufRead>(reader: &mut R, header: &PcdHeader, record: &mut Vec<PcdValue>) -> Result<()> {
        let mut line = String::new();
        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(Error::InvalidData("PCD file has fewer points than declared".to_string()));
            }
            if !line.trim().is_empty() {
                break;
            }
        }

        let mut values = line.split_whitespace();
        for field in &header.fields {
            for i in 0..field.count {
                let token = values
                    .next()
                    .ok_or_else(|| Error::InvalidData("Not enough values in ASCII PCD line".to_string()))?;
                if i == 0 {
                    record.push(parse_ascii_value(token, field.field_type)?);
                }
            }
        }
        Ok(())
    }

    /// Read one little-endian binary record, keeping the first value of each field
    fn read_binary_record<R: Read>(reader: &mut R, header: &PcdHeader, record: &mut Vec<PcdValue>) -> Result<()> {
        let mut buf = [0u8; 8];
        for field in &header.fields {
            let size = field.field_type.size();
            for i in 0..field.count {
                reader.read_exact(&mut buf[..size])?;
                if i == 0 {
                    record.push(decode_binary_value(&buf[..size], field.field_type));
                }
            }
        }
        Ok(())
    }
}

impl PointCloudReader for PcdReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<LoadedCloud> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        Self::read_from(&mut reader)
    }
}

fn parse_one(value: &str, key: &str) -> Result<usize> {
    value
        .parse::<usize>()
        .map_err(|_| Error::InvalidData(format!("Invalid {} value: {}", key, value)))
}

fn parse_all(values: &[&str], key: &str) -> Result<Vec<usize>> {
    values.iter().map(|v| parse_one(v, key)).collect()
}

fn parse_ascii_value(token: &str, field_type: PcdFieldType) -> Result<PcdValue> {
    let invalid = || Error::InvalidData(format!("Invalid {:?} value: {}", field_type, token));
    match field_type {
        PcdFieldType::F32 => {
            let v = token.parse::<f32>().map_err(|_| invalid())?;
            Ok(PcdValue::Float(v as f64, v.to_bits()))
        }
        PcdFieldType::F64 => {
            let v = token.parse::<f64>().map_err(|_| invalid())?;
            Ok(PcdValue::Float(v, (v as f32).to_bits()))
        }
        _ => token.parse::<i64>().map(PcdValue::Int).map_err(|_| invalid()),
    }
}

fn decode_binary_value(bytes: &[u8], field_type: PcdFieldType) -> PcdValue {
    let mut b4 = [0u8; 4];
    let mut b8 = [0u8; 8];
    match field_type {
        PcdFieldType::I8 => PcdValue::Int(bytes[0] as i8 as i64),
        PcdFieldType::U8 => PcdValue::Int(bytes[0] as i64),
        PcdFieldType::I16 => PcdValue::Int(i16::from_le_bytes([bytes[0], bytes[1]]) as i64),
        PcdFieldType::U16 => PcdValue::Int(u16::from_le_bytes([bytes[0], bytes[1]]) as i64),
        PcdFieldType::I32 => {
            b4.copy_from_slice(bytes);
            PcdValue::Int(i32::from_le_bytes(b4) as i64)
        }
        PcdFieldType::U32 => {
            b4.copy_from_slice(bytes);
            PcdValue::Int(u32::from_le_bytes(b4) as i64)
        }
        PcdFieldType::F32 => {
            b4.copy_from_slice(bytes);
            let v = f32::from_le_bytes(b4);
            PcdValue::Float(v as f64, v.to_bits())
        }
        PcdFieldType::F64 => {
            b8.copy_from_slice(bytes);
            let v = f64::from_le_bytes(b8);
            PcdValue::Float(v, (v as f32).to_bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const ASCII_HEADER: &str = "# .PCD v0.7 - Point Cloud Data file format
VERSION 0.7
FIELDS x y z rgb
SIZE 4 4 4 4
TYPE F F F U
COUNT 1 1 1 1
WIDTH 2
HEIGHT 1
VIEWPOINT 0 0 0 1 0 0 0
POINTS 2
DATA ascii
";

    #[test]
    fn test_ascii_with_packed_rgb() {
        let data = format!("{}1 2 3 16711680\n4 5 6 255\n", ASCII_HEADER);
        let cloud = PcdReader::read_from(&mut Cursor::new(data)).unwrap();

        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.points[1], Point3f::new(4.0, 5.0, 6.0));
        let colors = cloud.colors.unwrap();
        assert_relative_eq!(colors[0][0], 1.0);
        assert_relative_eq!(colors[1][2], 1.0);
        assert_relative_eq!(colors[1][0], 0.0);
    }

    #[test]
    fn test_binary_xyz() {
        let header = "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 1\nWIDTH 2\nHEIGHT 1\nDATA binary\n";
        let mut data = header.as_bytes().to_vec();
        for v in [1.0f32, 2.0, 3.0, -1.0, -2.0, -3.0] {
            data.extend_from_slice(&v.to_le_bytes());
        }

        let cloud = PcdReader::read_from(&mut Cursor::new(data)).unwrap();
        assert_eq!(cloud.points[0], Point3f::new(1.0, 2.0, 3.0));
        assert_eq!(cloud.points[1], Point3f::new(-1.0, -2.0, -3.0));
        assert!(cloud.colors.is_none());
    }

    #[test]
    fn test_truncated_data() {
        let data = format!("{}1 2 3 0\n", ASCII_HEADER);
        assert!(PcdReader::read_from(&mut Cursor::new(data)).is_err());
    }

    #[test]
    fn test_header_errors() {
        let missing_z = "VERSION 0.7\nFIELDS x y\nSIZE 4 4\nTYPE F F\nCOUNT 1 1\nWIDTH 1\nHEIGHT 1\nDATA ascii\n1 2\n";
        assert!(PcdReader::read_from(&mut Cursor::new(missing_z)).is_err());

        let mismatch = "VERSION 0.7\nFIELDS x y z\nSIZE 4 4\nTYPE F F F\nWIDTH 1\nDATA ascii\n";
        assert!(PcdReader::read_header(&mut Cursor::new(mismatch)).is_err());

        let no_data = "VERSION 0.7\nFIELDS x y z\n";
        assert!(PcdReader::read_header(&mut Cursor::new(no_data)).is_err());

        let zero_count = "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nCOUNT 1 1 0\nWIDTH 1\nDATA ascii\n1 2\n";
        assert!(matches!(
            PcdReader::read_from(&mut Cursor::new(zero_count)),
            Err(Error::InvalidData(_))
        ));

        let huge = format!(
            "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nWIDTH {}\nHEIGHT 2\nDATA ascii\n1 2 3\n",
            usize::MAX
        );
        assert!(matches!(
            PcdReader::read_from(&mut Cursor::new(huge)),
            Err(Error::InvalidData(_))
        ));
    }

    #[test]
    fn test_large_declared_count_with_short_body() {
        let data = "VERSION 0.7\nFIELDS x y z\nSIZE 4 4 4\nTYPE F F F\nWIDTH 4000000000\nDATA ascii\n1 2 3\n";
        assert!(PcdReader::read_from(&mut Cursor::new(data)).is_err());
    }
}
