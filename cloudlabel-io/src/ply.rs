//! PLY format support

use crate::PointCloudReader;
use cloudlabel_core::{rgb_from_u8, Error, LoadedCloud, Point3f, PointCloud, Result, Rgb};
use ply_rs::{
    parser::Parser,
    ply::{DefaultElement, Property},
};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

pub struct PlyReader;

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<LoadedCloud> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut points = Vec::new();
        let mut colors = Vec::new();
        let mut has_colors = true;

        if let Some(vertex_element) = ply.payload.get("vertex") {
            points.reserve(vertex_element.len());
            for vertex in vertex_element {
                let x = extract_property_value(vertex, "x")?;
                let y = extract_property_value(vertex, "y")?;
                let z = extract_property_value(vertex, "z")?;
                points.push(Point3f::new(x, y, z));

                if has_colors {
                    match extract_color(vertex) {
                        Some(color) => colors.push(color),
                        None => has_colors = false,
                    }
                }
            }
        }

        let colors = (has_colors && !colors.is_empty()).then_some(colors);
        LoadedCloud::new(PointCloud::from_points(points), colors)
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(format!(
            "Property '{}' not found or invalid type",
            name
        ))),
    }
}

/// Extract a vertex color; integer channels are 8-bit, float channels are already normalized
fn extract_color(element: &DefaultElement) -> Option<Rgb> {
    let channel = |names: [&str; 2]| names.iter().find_map(|name| element.get(*name));

    let r = channel(["red", "r"])?;
    let g = channel(["green", "g"])?;
    let b = channel(["blue", "b"])?;

    match (r, g, b) {
        (Property::UChar(r), Property::UChar(g), Property::UChar(b)) => Some(rgb_from_u8([*r, *g, *b])),
        (Property::Float(r), Property::Float(g), Property::Float(b)) => Some([*r, *g, *b]),
        (Property::Double(r), Property::Double(g), Property::Double(b)) => {
            Some([*r as f32, *g as f32, *b as f32])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ply_rs::{
        ply::{Addable, ElementDef, Ply, PropertyDef, PropertyType, ScalarType},
        writer::Writer,
    };
    use std::fs;
    use std::io::BufWriter;

    /// Writes an ASCII PLY fixture, with `red/green/blue` uchar properties when colors are present
    fn write_ply(cloud: &LoadedCloud, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = cloud.len();
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        if cloud.has_colors() {
            for name in ["red", "green", "blue"] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::UChar),
                ));
            }
        }
        ply.header.elements.add(vertex_element);

        let mut vertices = Vec::with_capacity(cloud.len());
        for (i, point) in cloud.points.iter().enumerate() {
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Float(point.x));
            vertex.insert("y".to_string(), Property::Float(point.y));
            vertex.insert("z".to_string(), Property::Float(point.z));
            if let Some(colors) = &cloud.colors {
                let [r, g, b] = colors[i].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
                vertex.insert("red".to_string(), Property::UChar(r));
                vertex.insert("green".to_string(), Property::UChar(g));
                vertex.insert("blue".to_string(), Property::UChar(b));
            }
            vertices.push(vertex);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let mut writer_instance = Writer::new();
        writer_instance.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }

    #[test]
    fn test_ply_colored_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("colored.ply");

        let points = PointCloud::from_points(vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.5, -2.0),
        ]);
        let cloud = LoadedCloud::new(points, Some(vec![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])).unwrap();

        write_ply(&cloud, &path).unwrap();
        let loaded = PlyReader::read_point_cloud(&path).unwrap();

        assert_eq!(loaded.points, cloud.points);
        let colors = loaded.colors.expect("colors should survive the round trip");
        assert_relative_eq!(colors[0][0], 1.0);
        assert_relative_eq!(colors[1][2], 1.0);
    }

    #[test]
    fn test_ply_without_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.ply");
        fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 3\nproperty float x\nproperty float y\nproperty float z\nend_header\n0 0 0\n1 0 0\n0 1 0\n",
        )
        .unwrap();

        let loaded = PlyReader::read_point_cloud(&path).unwrap();
        assert_eq!(loaded.len(), 3);
        assert!(loaded.colors.is_none());
    }

    #[test]
    fn test_ply_missing_coordinate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ply");
        fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nend_header\n0 0\n",
        )
        .unwrap();

        assert!(matches!(PlyReader::read_point_cloud(&path), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_ply_without_vertices_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faces_only.ply");
        fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 0\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
        )
        .unwrap();

        assert!(matches!(PlyReader::read_point_cloud(&path), Err(Error::EmptyCloud)));
    }
}
