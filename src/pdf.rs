use super::error::{Error, Result};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;
use std::path::Path;

/// pixels per inch of the embedded chart image
pub const DPI: u32 = 100;

const POINTS_PER_INCH: u32 = 72;

fn pdf_error(e: impl std::fmt::Display) -> Error {
    Error::Render(format!("could not build pdf: {}", e))
}

/// Builds a one page PDF showing an RGB8 image that fills the page.
pub fn image_page(rgb: &[u8], size: (u32, u32)) -> Result<Vec<u8>> {
    let (width, height) = size;
    if rgb.len() != (width * height * 3) as usize {
        return Err(pdf_error(format!(
            "image buffer of {} bytes does not match {}x{} rgb",
            rgb.len(),
            width,
            height
        )));
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(rgb).map_err(pdf_error)?;
    let compressed = encoder.finish().map_err(pdf_error)?;

    let page_w = (width * POINTS_PER_INCH / DPI) as i64;
    let page_h = (height * POINTS_PER_INCH / DPI) as i64;

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        compressed,
    ));
    // scale the unit square to the page and paint the image on it
    let content = format!("q {} 0 0 {} 0 0 cm /Im0 Do Q", page_w, page_h);
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { "Im0" => image_id },
        },
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(pdf_error)?;
    Ok(bytes)
}

/// Writes the image page to `fout`, overwriting it.
pub fn write_image_page(fout: &Path, rgb: &[u8], size: (u32, u32)) -> Result<()> {
    let bytes = image_page(rgb, size)?;
    std::fs::write(fout, bytes).map_err(|e| Error::io(fout, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_page_sized_from_the_image() {
        let rgb = vec![255u8; 200 * 100 * 3];
        let bytes = image_page(&rgb, (200, 100)).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert_eq!(pages.len(), 1);
    }

    #[test]
    fn mismatched_buffer_is_rejected() {
        let rgb = vec![0u8; 10];
        assert!(matches!(
            image_page(&rgb, (200, 100)).unwrap_err(),
            Error::Render(_)
        ));
    }
}
