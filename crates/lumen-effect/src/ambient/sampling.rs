use lumen_strip::{Rgb8, Side, StripFrame, StripLayout};

use crate::capture::CaptureImage;

/// Source index sampled for destination index `i`.
///
/// Nearest-smaller scaling `floor(i * src_len / dest_len)`; no interpolation.
pub fn compress_index(i: usize, dest_len: usize, src_len: usize) -> usize {
    if dest_len == 0 {
        return 0;
    }
    i * src_len / dest_len
}

/// Fill `dest` from `src` by index compression. Leaves `dest` untouched
/// when `src` is empty.
pub fn compress_into(dest: &mut [Rgb8], src: &[Rgb8]) {
    if src.is_empty() {
        return;
    }
    let dest_len = dest.len();
    for (i, led) in dest.iter_mut().enumerate() {
        *led = src[compress_index(i, dest_len, src.len())];
    }
}

/// Map the outer edges of `image` onto the sides of a fresh frame.
pub fn edges_to_frame(layout: StripLayout, image: &CaptureImage) -> StripFrame {
    let mut frame = StripFrame::new(layout);
    compress_into(frame.side_mut(Side::Right), &image.right_column());
    compress_into(frame.side_mut(Side::Top), image.top_row());
    compress_into(frame.side_mut(Side::Left), &image.left_column());
    compress_into(frame.side_mut(Side::Bottom), image.bottom_row());
    frame
}
