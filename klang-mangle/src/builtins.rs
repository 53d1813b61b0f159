//! The registry of opaque compute builtin names.
//!
//! Maps builtin kinds and their shape parameters to the canonical vendor
//! name that appears, length-prefixed, inside mangled symbols. The mapping
//! is bijective over every shape the registry admits and is frozen: names
//! may be appended for new shapes, never changed or reassigned.

use klang_struct::{BuiltinType, ImageDim, ImageType};

const fn dim_code(dim: ImageDim) -> &'static str {
    match dim {
        ImageDim::Dim1D => "1d",
        ImageDim::Dim1DArray => "1darray",
        ImageDim::Dim1DBuffer => "1dbuffer",
        ImageDim::Dim2D => "2d",
        ImageDim::Dim2DArray => "2darray",
        ImageDim::Dim3D => "3d",
    }
}

/// The canonical name of a builtin, or `None` if the shape has no defined
/// encoding (depth and multisample flags are only valid on 2d and 2darray
/// images).
///
/// Image names are built as `ocl_image` + dimension code, then `msaa` if
/// multisampled, then `depth` if depth; `msaa` always precedes `depth`.
pub fn lookup_name(ty: &BuiltinType) -> Option<String> {
    match ty {
        BuiltinType::Event => Some(String::from("ocl_event")),
        BuiltinType::Sampler => Some(String::from("ocl_sampler")),
        BuiltinType::Image(img) => {
            if (img.depth || img.multisampled) && !img.dim.accepts_shape_flags() {
                return None;
            }
            let mut name = String::from("ocl_image");
            name.push_str(dim_code(img.dim));
            if img.multisampled {
                name.push_str("msaa");
            }
            if img.depth {
                name.push_str("depth");
            }
            Some(name)
        }
    }
}

/// The builtin a canonical name denotes, or `None` for unregistered names.
///
/// Decoded images default the decode-only shape fields: sampled at runtime,
/// read-only access.
pub fn lookup_kind(name: &str) -> Option<BuiltinType> {
    match name {
        "ocl_event" => return Some(BuiltinType::Event),
        "ocl_sampler" => return Some(BuiltinType::Sampler),
        _ => {}
    }
    let mut rest = name.strip_prefix("ocl_image")?;
    let mut depth = false;
    let mut multisampled = false;
    if let Some(prefix) = rest.strip_suffix("depth") {
        depth = true;
        rest = prefix;
    }
    if let Some(prefix) = rest.strip_suffix("msaa") {
        multisampled = true;
        rest = prefix;
    }
    let dim = match rest {
        "1d" => ImageDim::Dim1D,
        "1darray" => ImageDim::Dim1DArray,
        "1dbuffer" => ImageDim::Dim1DBuffer,
        "2d" => ImageDim::Dim2D,
        "2darray" => ImageDim::Dim2DArray,
        "3d" => ImageDim::Dim3D,
        _ => return None,
    };
    if (depth || multisampled) && !dim.accepts_shape_flags() {
        return None;
    }
    let mut img = ImageType::new(dim);
    img.depth = depth;
    img.multisampled = multisampled;
    Some(BuiltinType::Image(img))
}

/// Every builtin the registry defines a canonical name for.
pub fn enumerate() -> Vec<BuiltinType> {
    let mut entries = vec![BuiltinType::Event, BuiltinType::Sampler];
    for dim in ImageDim::ALL {
        entries.push(BuiltinType::Image(ImageType::new(dim)));
    }
    for dim in [ImageDim::Dim2D, ImageDim::Dim2DArray] {
        entries.push(BuiltinType::Image(ImageType::new(dim).with_depth()));
        entries.push(BuiltinType::Image(ImageType::new(dim).with_multisampling()));
        entries.push(BuiltinType::Image(
            ImageType::new(dim).with_multisampling().with_depth(),
        ));
    }
    entries
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_fixed_names() {
        assert_eq!(
            lookup_name(&BuiltinType::Event).as_deref(),
            Some("ocl_event")
        );
        assert_eq!(
            lookup_name(&BuiltinType::Sampler).as_deref(),
            Some("ocl_sampler")
        );
        let img = ImageType::new(ImageDim::Dim1D);
        assert_eq!(
            lookup_name(&BuiltinType::Image(img)).as_deref(),
            Some("ocl_image1d")
        );
    }

    #[test]
    fn test_msaa_precedes_depth() {
        let img = ImageType::new(ImageDim::Dim2DArray)
            .with_multisampling()
            .with_depth();
        assert_eq!(
            lookup_name(&BuiltinType::Image(img)).as_deref(),
            Some("ocl_image2darraymsaadepth")
        );
    }

    #[test]
    fn test_flags_rejected_off_2d() {
        let img = ImageType::new(ImageDim::Dim3D).with_depth();
        assert_eq!(lookup_name(&BuiltinType::Image(img)), None);
        let img = ImageType::new(ImageDim::Dim1DBuffer).with_multisampling();
        assert_eq!(lookup_name(&BuiltinType::Image(img)), None);
        assert_eq!(lookup_kind("ocl_image3ddepth"), None);
    }

    #[test]
    fn test_wrong_flag_order_rejected() {
        // depth must follow msaa in the name, never precede it
        assert_eq!(lookup_kind("ocl_image2ddepthmsaa"), None);
    }

    #[test]
    fn test_unknown_names_rejected() {
        assert_eq!(lookup_kind("garbage"), None);
        assert_eq!(lookup_kind("ocl_image4d"), None);
        assert_eq!(lookup_kind("ocl_imag"), None);
    }

    #[test]
    fn test_registry_is_bijective() {
        let entries = enumerate();
        assert_eq!(entries.len(), 14);
        let mut seen = Vec::new();
        for builtin in &entries {
            let name = lookup_name(builtin).expect("enumerated shape must have a name");
            assert!(!seen.contains(&name), "duplicate name {}", name);
            assert_eq!(lookup_kind(&name).as_ref(), Some(builtin));
            seen.push(name);
        }
    }
}
