use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use super::Geometry;
use crate::error::ReaderError;
use ndarray::{Array2, Axis};
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;
use ply_rs::{parser, ply};

struct Vertex {
    point: [f32; 3],
}

impl ply::PropertyAccess for Vertex {
    fn new() -> Self {
        Vertex { point: [0f32; 3] }
    }
    fn set_property(&mut self, key: String, property: ply::Property) {
        match (key.as_ref(), property) {
            ("x", ply::Property::Float(v)) => self.point[0] = v,
            ("y", ply::Property::Float(v)) => self.point[1] = v,
            ("z", ply::Property::Float(v)) => self.point[2] = v,
            (_, _) => (),
        }
    }
}

/// Reads the vertex positions of a PLY file.
pub fn read_ply<P>(filepath: P) -> Result<Geometry, ReaderError>
where
    P: AsRef<Path>,
{
    let mut f = std::io::BufReader::new(File::open(filepath)?);

    let vertex_parser = parser::Parser::<Vertex>::new();
    let header = vertex_parser.read_header(&mut f)?;

    let element = header
        .elements
        .get("vertex")
        .ok_or_else(|| ReaderError::decode("PLY file has no vertex element"))?;
    let vertex_vec = vertex_parser.read_payload_for_element(&mut f, element, &header)?;

    Ok(Geometry {
        points: Array2::<f32>::from_shape_fn((vertex_vec.len(), 3), |(i, c)| {
            vertex_vec[i].point[c]
        }),
    })
}

/// Writes the points of a geometry as an ASCII PLY file.
pub fn write_ply<P>(filepath: P, geom: &Geometry) -> Result<(), ReaderError>
where
    P: AsRef<Path>,
{
    let mut ply = {
        let mut ply = Ply::<DefaultElement>::new();
        let mut vertex_element = ElementDef::new("vertex".to_string());
        ["x", "y", "z"].iter().for_each(|key| {
            vertex_element.properties.add(PropertyDef::new(
                key.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        });

        let vertex_array: Vec<DefaultElement> = geom
            .points
            .axis_iter(Axis(0))
            .map(|point| {
                let mut elem = DefaultElement::new();
                elem.insert("x".to_string(), Property::Float(point[0]));
                elem.insert("y".to_string(), Property::Float(point[1]));
                elem.insert("z".to_string(), Property::Float(point[2]));
                elem
            })
            .collect();

        ply.header.elements.add(vertex_element);
        ply.payload.insert("vertex".to_string(), vertex_array);
        ply.make_consistent()
            .map_err(|err| ReaderError::decode(format!("Inconsistent PLY: {err:?}")))?;
        ply
    };

    ply.header.encoding = Encoding::Ascii;

    let mut buf = BufWriter::new(File::create(filepath)?);
    Writer::new().write_ply(&mut buf, &mut ply)?;

    Ok(())
}
