use crate::foundation::core::{Bitmap, Rgba8};
use crate::foundation::error::{SheetError, SheetResult};

/// Straight-alpha source-over of one pixel.
pub fn over(dst: Rgba8, src: Rgba8) -> Rgba8 {
    let sa = u32::from(src[3]);
    if sa == 0 {
        return dst;
    }
    if sa == 255 {
        return src;
    }

    let da = u32::from(dst[3]);
    // Destination alpha that survives under the source.
    let dw = mul_div255(da, 255 - sa);
    let oa = sa + dw;
    if oa == 0 {
        return [0, 0, 0, 0];
    }

    let mut out = [0u8; 4];
    for i in 0..3 {
        let c = u32::from(src[i]) * sa + u32::from(dst[i]) * dw;
        out[i] = ((c + oa / 2) / oa).min(255) as u8;
    }
    out[3] = oa.min(255) as u8;
    out
}

/// Source-over `src` onto `dst`; both must cover the same pixel grid.
pub fn over_in_place(dst: &mut Bitmap, src: &Bitmap) -> SheetResult<()> {
    if !dst.has_same_size(src) || dst.data.len() != src.data.len() {
        return Err(SheetError::container(format!(
            "over_in_place expects equal-size rgba8 buffers ({}x{} vs {}x{})",
            dst.width, dst.height, src.width, src.height
        )));
    }
    for (d, s) in dst.data.chunks_exact_mut(4).zip(src.data.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Source-over `src` onto `dst` with its top-left corner at `(x, y)`.
///
/// Anything falling outside `dst` is dropped.
pub fn blit_over(dst: &mut Bitmap, src: &Bitmap, x: u32, y: u32) {
    if x >= dst.width || y >= dst.height {
        return;
    }
    let w = src.width.min(dst.width - x) as usize;
    let h = src.height.min(dst.height - y) as usize;
    let dst_stride = dst.width as usize * 4;
    let src_stride = src.width as usize * 4;

    for row in 0..h {
        let d0 = (y as usize + row) * dst_stride + x as usize * 4;
        let s0 = row * src_stride;
        let d_row = &mut dst.data[d0..d0 + w * 4];
        let s_row = &src.data[s0..s0 + w * 4];
        for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
            let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
            d.copy_from_slice(&out);
        }
    }
}

/// Scale colour by alpha, in place, for filtering.
pub(crate) fn premultiply_in_place(img: &mut image::RgbaImage) {
    for px in img.pixels_mut() {
        let a = u32::from(px[3]);
        if a == 0 {
            px.0 = [0, 0, 0, 0];
            continue;
        }
        for c in &mut px.0[..3] {
            *c = mul_div255(u32::from(*c), a) as u8;
        }
    }
}

/// Inverse of [`premultiply_in_place`]; colour of fully transparent pixels is zeroed.
pub(crate) fn unpremultiply_in_place(img: &mut image::RgbaImage) {
    for px in img.pixels_mut() {
        let a = u32::from(px[3]);
        if a == 0 {
            px.0 = [0, 0, 0, 0];
            continue;
        }
        for c in &mut px.0[..3] {
            *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

fn mul_div255(x: u32, y: u32) -> u32 {
    (x * y + 127) / 255
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn over_src_alpha_0_is_noop() {
        let dst = [10, 20, 30, 40];
        let src = [255, 255, 255, 0];
        assert_eq!(over(dst, src), dst);
    }

    #[test]
    fn over_src_opaque_replaces_dst() {
        let dst = [0, 0, 0, 255];
        let src = [255, 0, 0, 255];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_dst_transparent_returns_src() {
        let dst = [0, 0, 0, 0];
        let src = [100, 110, 120, 200];
        assert_eq!(over(dst, src), src);
    }

    #[test]
    fn over_half_alpha_on_opaque_mixes_colors() {
        let out = over([0, 0, 0, 255], [255, 255, 255, 128]);
        assert_eq!(out[3], 255);
        assert!(out[0] > 120 && out[0] < 135);
    }

    #[test]
    fn over_in_place_rejects_mismatched_sizes() {
        let mut dst = Bitmap::new(2, 2);
        let src = Bitmap::new(1, 2);
        assert!(over_in_place(&mut dst, &src).is_err());
    }

    #[test]
    fn blit_over_clips_to_destination() {
        let mut dst = Bitmap::new(3, 3);
        let src = Bitmap::filled(2, 2, [9, 9, 9, 255]);
        blit_over(&mut dst, &src, 2, 2);
        assert_eq!(dst.pixel(2, 2), Some([9, 9, 9, 255]));
        assert_eq!(dst.pixel(1, 1), Some([0, 0, 0, 0]));
        let painted = dst.data.chunks_exact(4).filter(|p| p[3] != 0).count();
        assert_eq!(painted, 1);
    }

    #[test]
    fn premultiply_round_trip_keeps_opaque_and_clears_invisible() {
        let mut img = image::RgbaImage::from_raw(
            3,
            1,
            vec![200, 100, 50, 255, 9, 9, 9, 0, 255, 255, 255, 128],
        )
        .unwrap();
        premultiply_in_place(&mut img);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 0]);
        assert_eq!(img.get_pixel(2, 0).0, [128, 128, 128, 128]);

        unpremultiply_in_place(&mut img);
        assert_eq!(img.get_pixel(0, 0).0, [200, 100, 50, 255]);
        assert_eq!(img.get_pixel(2, 0).0, [255, 255, 255, 128]);
    }
}
