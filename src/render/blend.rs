//! Source-over compositing of tiles onto the portrait canvas

use image::{Rgba, RgbaImage};

/// Draw `tile` with its top-left corner at `(x, y)`, which may lie outside
/// the canvas. Pixels falling outside are clipped.
pub(crate) fn blit(canvas: &mut RgbaImage, tile: &RgbaImage, x: i32, y: i32) {
    let (canvas_width, canvas_height) = (canvas.width() as i64, canvas.height() as i64);

    for (sy, row) in tile.rows().enumerate() {
        let dest_y = y as i64 + sy as i64;
        if dest_y < 0 {
            continue;
        }
        if dest_y >= canvas_height {
            break;
        }

        for (sx, src) in row.enumerate() {
            let dest_x = x as i64 + sx as i64;
            if dest_x < 0 {
                continue;
            }
            if dest_x >= canvas_width {
                break;
            }
            // Fully transparent source, skip
            if src[3] == 0 {
                continue;
            }

            let (dx, dy) = (dest_x as u32, dest_y as u32);
            let blended = source_over(src, canvas.get_pixel(dx, dy));
            canvas.put_pixel(dx, dy, blended);
        }
    }
}

/// Porter-Duff "source over" on straight (non-premultiplied) alpha.
pub(crate) fn source_over(src: &Rgba<u8>, dst: &Rgba<u8>) -> Rgba<u8> {
    let src_alpha = src[3] as f32 / 255.0;
    let dst_alpha = dst[3] as f32 / 255.0;

    // out_alpha = src_alpha + dst_alpha * (1 - src_alpha)
    let out_alpha = src_alpha + dst_alpha * (1.0 - src_alpha);
    if out_alpha == 0.0 {
        return Rgba([0, 0, 0, 0]);
    }

    let composite = |s: u8, d: u8| -> u8 {
        let (s, d) = (s as f32 / 255.0, d as f32 / 255.0);
        let result = (s * src_alpha + d * dst_alpha * (1.0 - src_alpha)) / out_alpha;
        (result.clamp(0.0, 1.0) * 255.0).round() as u8
    };

    Rgba([
        composite(src[0], dst[0]),
        composite(src[1], dst[1]),
        composite(src[2], dst[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
