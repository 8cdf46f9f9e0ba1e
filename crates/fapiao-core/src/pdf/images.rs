//! Decoding of image XObjects embedded in scanned PDFs.

use image::{DynamicImage, GrayImage, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use tracing::trace;

/// The largest decodable image drawn on a page. Scans usually carry one
/// full-page image plus small logos or stamps.
pub(crate) fn largest_page_image(doc: &Document, page_id: ObjectId) -> Option<DynamicImage> {
    let resources = page_resources(doc, page_id)?;
    let xobjects = resources.get(b"XObject").ok()?;
    let Ok((_, Object::Dictionary(xobjects))) = doc.dereference(xobjects) else {
        return None;
    };

    xobjects
        .iter()
        .filter_map(|(_, reference)| doc.dereference(reference).ok())
        .filter_map(|(_, object)| decode_image_object(doc, object))
        .max_by_key(|image| u64::from(image.width()) * u64::from(image.height()))
}

/// Every decodable image in the document, in object order.
pub(crate) fn all_images(doc: &Document) -> Vec<DynamicImage> {
    doc.objects
        .values()
        .filter_map(|object| decode_image_object(doc, object))
        .collect()
}

/// Deepest `/Parent` chain followed when looking for inherited resources.
const MAX_INHERITANCE_DEPTH: usize = 32;

/// Page resources, following `/Parent` links for inherited ones.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut node_id = page_id;
    for _ in 0..MAX_INHERITANCE_DEPTH {
        let Ok(Object::Dictionary(node)) = doc.get_object(node_id) else {
            return None;
        };

        if let Ok(resources) = node.get(b"Resources") {
            if let Ok((_, Object::Dictionary(resources))) = doc.dereference(resources) {
                return Some(resources.clone());
            }
        }

        match node.get(b"Parent") {
            Ok(Object::Reference(parent_id)) => node_id = *parent_id,
            _ => return None,
        }
    }

    trace!(?page_id, "page tree too deep or cyclic");
    None
}

fn decode_image_object(doc: &Document, object: &Object) -> Option<DynamicImage> {
    let Object::Stream(stream) = object else {
        return None;
    };
    let dict = &stream.dict;

    if dict.get(b"Subtype").ok()?.as_name().ok()? != b"Image" {
        return None;
    }

    let width = u32::try_from(dict.get(b"Width").ok()?.as_i64().ok()?).ok()?;
    let height = u32::try_from(dict.get(b"Height").ok()?.as_i64().ok()?).ok()?;
    trace!(width, height, "image object");

    let filter = dict.get(b"Filter").ok().and_then(|filter| match filter {
        Object::Name(name) => Some(name.as_slice()),
        Object::Array(filters) => filters.last().and_then(|f| f.as_name().ok()),
        _ => None,
    });

    match filter {
        // JPEG data is stored as-is
        Some(b"DCTDecode") => {
            return image::load_from_memory_with_format(&stream.content, image::ImageFormat::Jpeg)
                .ok();
        }
        Some(b"JPXDecode") | Some(b"CCITTFaxDecode") | Some(b"JBIG2Decode") => {
            trace!(filter = ?filter.map(String::from_utf8_lossy), "unsupported image filter");
            return None;
        }
        _ => {}
    }

    let data = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());

    let color_space = dict
        .get(b"ColorSpace")
        .ok()
        .and_then(|space| match space {
            Object::Name(name) => Some(name.clone()),
            Object::Array(parts) => parts.first().and_then(|o| o.as_name().ok()).map(<[u8]>::to_vec),
            Object::Reference(id) => doc
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(<[u8]>::to_vec),
            _ => None,
        })
        .unwrap_or_else(|| b"DeviceRGB".to_vec());

    let bits = dict
        .get(b"BitsPerComponent")
        .ok()
        .and_then(|o| o.as_i64().ok())
        .unwrap_or(8);

    image_from_raw(&data, width, height, &color_space, bits)
}

/// Build an image from uncompressed 8-bit samples.
fn image_from_raw(
    data: &[u8],
    width: u32,
    height: u32,
    color_space: &[u8],
    bits_per_component: i64,
) -> Option<DynamicImage> {
    if bits_per_component != 8 {
        trace!(bits_per_component, "unsupported sample depth");
        return None;
    }

    let pixels = width as usize * height as usize;
    match color_space {
        b"DeviceGray" | b"G" | b"CalGray" => {
            let samples = data.get(..pixels)?.to_vec();
            GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8)
        }
        b"DeviceRGB" | b"RGB" | b"CalRGB" => {
            let samples = data.get(..pixels * 3)?.to_vec();
            RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8)
        }
        b"DeviceCMYK" | b"CMYK" => {
            let samples = data.get(..pixels * 4)?;
            let rgb = samples
                .chunks_exact(4)
                .flat_map(|cmyk| {
                    let k = 255 - u16::from(cmyk[3]);
                    [0, 1, 2].map(|i| ((255 - u16::from(cmyk[i])) * k / 255) as u8)
                })
                .collect();
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        }
        other => {
            trace!(color_space = %String::from_utf8_lossy(other), "unsupported color space");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use lopdf::dictionary;

    #[test]
    fn test_gray_and_rgb_samples() {
        let gray = image_from_raw(&[0, 64, 128, 255], 2, 2, b"DeviceGray", 8).unwrap();
        assert_eq!(gray.dimensions(), (2, 2));

        let rgb = image_from_raw(&[255, 0, 0, 0, 255, 0], 2, 1, b"DeviceRGB", 8).unwrap();
        assert_eq!(rgb.get_pixel(1, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_cmyk_is_converted() {
        let image = image_from_raw(&[0, 0, 0, 0, 0, 0, 0, 255], 2, 1, b"DeviceCMYK", 8).unwrap();
        assert_eq!(image.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_short_or_unsupported_data_is_rejected() {
        assert!(image_from_raw(&[0, 1], 2, 2, b"DeviceGray", 8).is_none());
        assert!(image_from_raw(&[0; 4], 2, 2, b"DeviceGray", 1).is_none());
        assert!(image_from_raw(&[0; 4], 2, 2, b"Indexed", 8).is_none());
    }

    #[test]
    fn test_cyclic_page_tree_has_no_resources() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
                "Parent" => page_id,
            }),
        );
        doc.objects.insert(
            page_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            }),
        );

        assert!(page_resources(&doc, page_id).is_none());
        assert!(largest_page_image(&doc, page_id).is_none());
    }

    #[test]
    fn test_resources_inherited_from_parent() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1i64,
                "Resources" => lopdf::dictionary! { "ProcSet" => vec!["PDF".into()] },
            }),
        );
        doc.objects.insert(
            page_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
            }),
        );

        let resources = page_resources(&doc, page_id).unwrap();
        assert!(resources.has(b"ProcSet"));
    }
}
