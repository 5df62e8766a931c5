use std::str::FromStr;

use nalgebra::{vector, Vector3};
use roxmltree::{Document, Node};

use super::{ImageXYZC, VolumeError};

const OME_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";

/// Order of planes in the file, the first two letters are always `XY`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionOrder {
    XYZCT,
    XYZTC,
    XYCZT,
    XYCTZ,
    XYTZC,
    XYTCZ,
}

impl DimensionOrder {
    /// Plane dimensions from the fastest changing one
    fn plane_axes(self) -> [Axis; 3] {
        use Axis::*;
        match self {
            DimensionOrder::XYZCT => [Z, C, T],
            DimensionOrder::XYZTC => [Z, T, C],
            DimensionOrder::XYCZT => [C, Z, T],
            DimensionOrder::XYCTZ => [C, T, Z],
            DimensionOrder::XYTZC => [T, Z, C],
            DimensionOrder::XYTCZ => [T, C, Z],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DimensionOrder::XYZCT => "XYZCT",
            DimensionOrder::XYZTC => "XYZTC",
            DimensionOrder::XYCZT => "XYCZT",
            DimensionOrder::XYCTZ => "XYCTZ",
            DimensionOrder::XYTZC => "XYTZC",
            DimensionOrder::XYTCZ => "XYTCZ",
        }
    }
}

impl FromStr for DimensionOrder {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let order = match s {
            "XYZCT" => DimensionOrder::XYZCT,
            "XYZTC" => DimensionOrder::XYZTC,
            "XYCZT" => DimensionOrder::XYCZT,
            "XYCTZ" => DimensionOrder::XYCTZ,
            "XYTZC" => DimensionOrder::XYTZC,
            "XYTCZ" => DimensionOrder::XYTCZ,
            _ => {
                return Err(VolumeError::InvalidAttribute {
                    name: "DimensionOrder",
                    value: s.to_string(),
                })
            }
        };
        Ok(order)
    }
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Z,
    C,
    T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelType {
    Uint8,
    Uint16,
}

impl PixelType {
    pub fn as_str(self) -> &'static str {
        match self {
            PixelType::Uint8 => "uint8",
            PixelType::Uint16 => "uint16",
        }
    }
}

impl FromStr for PixelType {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uint8" => Ok(PixelType::Uint8),
            "uint16" => Ok(PixelType::Uint16),
            other => Err(VolumeError::UnsupportedPixelType(other.to_string())),
        }
    }
}

/// Image description stored in the OME-XML `ImageDescription` of the first page
#[derive(Debug, Clone, PartialEq)]
pub struct OmeMetadata {
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub physical_size: Vector3<f32>,
    pub dimension_order: DimensionOrder,
    pub pixel_type: PixelType,
    pub channel_names: Vec<String>,
}

impl OmeMetadata {
    /// Layout of a plain tiff stack, every page is one z slice of a single channel
    pub fn single_channel(size_x: usize, size_y: usize, size_z: usize, pixel_type: PixelType) -> OmeMetadata {
        OmeMetadata {
            size_x,
            size_y,
            size_z,
            size_c: 1,
            size_t: 1,
            physical_size: vector![1.0, 1.0, 1.0],
            dimension_order: DimensionOrder::XYZCT,
            pixel_type,
            channel_names: vec!["Ch0".to_string()],
        }
    }

    pub fn from_image(image: &ImageXYZC) -> OmeMetadata {
        OmeMetadata {
            size_x: image.size_x(),
            size_y: image.size_y(),
            size_z: image.size_z(),
            size_c: image.size_c(),
            size_t: 1,
            physical_size: image.physical_size(),
            dimension_order: DimensionOrder::XYZCT,
            pixel_type: PixelType::Uint16,
            channel_names: image.channels().iter().map(|c| c.name.clone()).collect(),
        }
    }

    pub fn parse(xml: &str) -> Result<OmeMetadata, VolumeError> {
        OmeMetadata::parse_with_page_limit(xml, usize::MAX)
    }

    /// Parse metadata of a file holding `page_limit` pages
    ///
    /// Fails when the described planes do not fit into the file.
    pub fn parse_with_page_limit(xml: &str, page_limit: usize) -> Result<OmeMetadata, VolumeError> {
        let document = Document::parse(xml)?;
        let pixels = document
            .descendants()
            .find(|n| n.tag_name().name() == "Pixels")
            .ok_or(VolumeError::MissingElement("Pixels"))?;

        let size_x = required_attr(&pixels, "SizeX")?;
        let size_y = required_attr(&pixels, "SizeY")?;
        let size_z: usize = optional_attr(&pixels, "SizeZ")?.unwrap_or(1);
        let size_c: usize = optional_attr(&pixels, "SizeC")?.unwrap_or(1);
        let size_t: usize = optional_attr(&pixels, "SizeT")?.unwrap_or(1);

        let physical_size = vector![
            optional_attr(&pixels, "PhysicalSizeX")?.unwrap_or(1.0),
            optional_attr(&pixels, "PhysicalSizeY")?.unwrap_or(1.0),
            optional_attr(&pixels, "PhysicalSizeZ")?.unwrap_or(1.0)
        ];

        let dimension_order = optional_attr(&pixels, "DimensionOrder")?.unwrap_or(DimensionOrder::XYZCT);
        let pixel_type: PixelType = pixels
            .attribute("Type")
            .ok_or(VolumeError::MissingAttribute("Type"))?
            .parse()?;

        if size_x == 0 || size_y == 0 || size_z == 0 || size_c == 0 || size_t == 0 {
            return Err(VolumeError::Layout(format!(
                "zero sized dimension in {size_x}x{size_y}x{size_z}, {size_c} channels, {size_t} time points"
            )));
        }

        let planes = size_z
            .checked_mul(size_c)
            .and_then(|p| p.checked_mul(size_t))
            .ok_or_else(|| {
                VolumeError::Layout(format!(
                    "plane count of {size_z} slices, {size_c} channels, {size_t} time points overflows"
                ))
            })?;
        if planes > page_limit {
            return Err(VolumeError::Layout(format!(
                "{planes} planes described, file has {page_limit} pages"
            )));
        }

        let mut channel_names: Vec<String> = pixels
            .children()
            .filter(|n| n.tag_name().name() == "Channel")
            .enumerate()
            .map(|(i, n)| n.attribute("Name").map(str::to_string).unwrap_or_else(|| format!("Ch{i}")))
            .collect();
        for i in channel_names.len()..size_c {
            channel_names.push(format!("Ch{i}"));
        }
        channel_names.truncate(size_c);

        Ok(OmeMetadata {
            size_x,
            size_y,
            size_z,
            size_c,
            size_t,
            physical_size,
            dimension_order,
            pixel_type,
            channel_names,
        })
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><OME xmlns="{OME_NAMESPACE}"><Image ID="Image:0" Name="omevol"><Pixels ID="Pixels:0" DimensionOrder="{}" Type="{}" SizeX="{}" SizeY="{}" SizeZ="{}" SizeC="{}" SizeT="{}" PhysicalSizeX="{}" PhysicalSizeY="{}" PhysicalSizeZ="{}">"#,
            self.dimension_order.as_str(),
            self.pixel_type.as_str(),
            self.size_x,
            self.size_y,
            self.size_z,
            self.size_c,
            self.size_t,
            self.physical_size.x,
            self.physical_size.y,
            self.physical_size.z,
        );
        for (i, name) in self.channel_names.iter().enumerate() {
            xml.push_str(&format!(
                r#"<Channel ID="Channel:0:{i}" Name="{}" SamplesPerPixel="1"/>"#,
                escape_attr(name)
            ));
        }
        xml.push_str("</Pixels></Image></OME>");
        xml
    }

    /// Number of pages (planes) the file should contain
    pub fn plane_count(&self) -> usize {
        self.size_z * self.size_c * self.size_t
    }

    /// Index of the page holding plane `(z, c, t)`
    pub fn page_index(&self, z: usize, c: usize, t: usize) -> usize {
        let mut index = 0;
        let mut stride = 1;
        for axis in self.dimension_order.plane_axes() {
            let (coord, size) = match axis {
                Axis::Z => (z, self.size_z),
                Axis::C => (c, self.size_c),
                Axis::T => (t, self.size_t),
            };
            index += coord * stride;
            stride *= size;
        }
        index
    }
}

fn optional_attr<T: FromStr>(node: &Node<'_, '_>, name: &'static str) -> Result<Option<T>, VolumeError> {
    match node.attribute(name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| VolumeError::InvalidAttribute {
                name,
                value: value.to_string(),
            }),
    }
}

fn required_attr<T: FromStr>(node: &Node<'_, '_>, name: &'static str) -> Result<T, VolumeError> {
    optional_attr(node, name)?.ok_or(VolumeError::MissingAttribute(name))
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
