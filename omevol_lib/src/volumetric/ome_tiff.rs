use std::{fs::File, io::Cursor, path::Path, time::Instant};

use memmap::Mmap;
use nalgebra::vector;
use tiff::{
    decoder::{Decoder, DecodingResult, Limits},
    encoder::{colortype, TiffEncoder},
    tags::Tag,
    ColorType,
};

use super::{
    ome_xml::{OmeMetadata, PixelType},
    Channel, ImageXYZC, VolumeError,
};

/// Load time point 0 of an OME-TIFF file
///
/// Files without OME-XML are read as a single channel z stack.
pub fn load_ome_tiff<P>(path: P) -> Result<ImageXYZC, VolumeError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let started = Instant::now();

    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };

    let mut decoder = Decoder::new(Cursor::new(&mmap[..]))?.with_limits(Limits::unlimited());

    let (width, height) = decoder.dimensions()?;
    let pixel_type = pixel_type_of(decoder.colortype()?)?;

    let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();
    let pages = count_pages(&mmap)?;
    let meta = match description.as_deref().map(str::trim_start) {
        Some(xml) if xml.starts_with('<') => OmeMetadata::parse_with_page_limit(xml, pages)?,
        _ => {
            log::debug!("{path:?} has no OME-XML, reading pages as z slices");
            OmeMetadata::single_channel(width as usize, height as usize, pages, pixel_type)
        }
    };

    if (meta.size_x, meta.size_y) != (width as usize, height as usize) {
        return Err(VolumeError::PageSize {
            page: 0,
            expected: (meta.size_x as u32, meta.size_y as u32),
            found: (width, height),
        });
    }

    let planes = read_pages(&mut decoder, &meta)?;
    let image = assemble(&meta, planes)?;

    log::info!(
        "Loaded {path:?}: {}x{}x{} voxels, {} channels in {:?}",
        image.size_x(),
        image.size_y(),
        image.size_z(),
        image.size_c(),
        started.elapsed()
    );

    Ok(image)
}

fn pixel_type_of(color_type: ColorType) -> Result<PixelType, VolumeError> {
    match color_type {
        ColorType::Gray(8) => Ok(PixelType::Uint8),
        ColorType::Gray(16) => Ok(PixelType::Uint16),
        other => Err(VolumeError::UnsupportedPixelType(format!("{other:?}"))),
    }
}

fn count_pages(data: &[u8]) -> Result<usize, VolumeError> {
    let mut decoder = Decoder::new(Cursor::new(data))?;
    let mut pages = 1;
    while decoder.more_images() {
        decoder.next_image()?;
        pages += 1;
    }
    Ok(pages)
}

/// Decode the pages of time point 0, indexed by `z + c * size_z`
fn read_pages<R>(
    decoder: &mut Decoder<R>,
    meta: &OmeMetadata,
) -> Result<Vec<Option<Vec<u16>>>, VolumeError>
where
    R: std::io::Read + std::io::Seek,
{
    let plane_len = meta.size_x * meta.size_y;
    let mut wanted = vec![None; meta.plane_count()];
    for c in 0..meta.size_c {
        for z in 0..meta.size_z {
            wanted[meta.page_index(z, c, 0)] = Some(z + c * meta.size_z);
        }
    }

    let last_page = wanted.iter().rposition(Option::is_some).unwrap_or(0);
    let mut planes = vec![None; meta.size_z * meta.size_c];

    for (page, slot) in wanted.iter().enumerate().take(last_page + 1) {
        if page > 0 {
            if !decoder.more_images() {
                return Err(VolumeError::PageCount {
                    expected: last_page + 1,
                    found: page,
                });
            }
            decoder.next_image()?;
        }

        let slot = match slot {
            Some(slot) => *slot,
            None => continue,
        };

        let dims = decoder.dimensions()?;
        if dims != (meta.size_x as u32, meta.size_y as u32) {
            return Err(VolumeError::PageSize {
                page,
                expected: (meta.size_x as u32, meta.size_y as u32),
                found: dims,
            });
        }

        let plane = match decoder.read_image()? {
            DecodingResult::U8(data) => data.into_iter().map(u16::from).collect(),
            DecodingResult::U16(data) => data,
            _ => {
                return Err(VolumeError::UnsupportedPixelType(format!(
                    "{:?}",
                    decoder.colortype()?
                )))
            }
        };
        if plane.len() != plane_len {
            return Err(VolumeError::DataLength {
                expected: plane_len,
                found: plane.len(),
            });
        }
        planes[slot] = Some(plane);
    }

    Ok(planes)
}

fn assemble(meta: &OmeMetadata, mut planes: Vec<Option<Vec<u16>>>) -> Result<ImageXYZC, VolumeError> {
    let plane_len = meta.size_x * meta.size_y;
    let mut channels = Vec::with_capacity(meta.size_c);

    for c in 0..meta.size_c {
        let mut data = Vec::with_capacity(plane_len * meta.size_z);
        for z in 0..meta.size_z {
            let plane = planes[z + c * meta.size_z]
                .take()
                .ok_or_else(|| VolumeError::Layout(format!("missing plane z {z} c {c}")))?;
            data.extend_from_slice(&plane);
        }
        channels.push(Channel::new(meta.channel_names[c].clone(), data));
    }

    ImageXYZC::new(
        vector![meta.size_x, meta.size_y, meta.size_z],
        meta.physical_size,
        channels,
    )
}

/// Write the volume as 16-bit grayscale pages in XYZCT order
pub fn write_ome_tiff<P>(path: P, image: &ImageXYZC) -> Result<(), VolumeError>
where
    P: AsRef<Path>,
{
    let meta = OmeMetadata::from_image(image);
    let description = meta.to_xml();

    let mut file = File::create(path.as_ref())?;
    let mut encoder = TiffEncoder::new(&mut file)?;

    let plane_len = image.size_x() * image.size_y();
    let width = image.size_x() as u32;
    let height = image.size_y() as u32;

    for (c, channel) in image.channels().iter().enumerate() {
        for (z, plane) in channel.data().chunks(plane_len).enumerate() {
            let mut page = encoder.new_image::<colortype::Gray16>(width, height)?;
            if c == 0 && z == 0 {
                page.encoder()
                    .write_tag(Tag::ImageDescription, description.as_str())?;
            }
            page.write_data(plane)?;
        }
    }

    log::debug!("Written {:?}", path.as_ref());
    Ok(())
}
