//! Image normalization into a model input tensor.

use image::{imageops, DynamicImage};
use ndarray::Array4;

use crate::model::{InputSpec, TensorLayout};

/// Prepare a batch-of-one input tensor for `spec`.
///
/// - Force 3-channel RGB (alpha is dropped, grayscale is replicated)
/// - Stretch-resize to the model size in one pass, no padding
/// - Reorder channels, scale and subtract the per-channel mean
/// - Lay out as NHWC or NCHW with a leading batch dimension of 1
pub fn prepare_input(image: &DynamicImage, spec: &InputSpec) -> Array4<f32> {
    let rgb = image.to_rgb8();
    let resized = imageops::resize(&rgb, spec.width, spec.height, spec.filter);

    let normalize = |x: usize, y: usize, c: usize| -> f32 {
        let pixel = resized.get_pixel(x as u32, y as u32);
        let value = pixel[spec.channel_order.source_channel(c)] as f32 * spec.scale;
        (value - spec.mean[c]) / spec.std[c]
    };

    let (h, w) = (spec.height as usize, spec.width as usize);
    match spec.layout {
        TensorLayout::Nhwc => Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| normalize(x, y, c)),
        TensorLayout::Nchw => Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| normalize(x, y, c)),
    }
}
