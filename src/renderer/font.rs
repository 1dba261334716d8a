use super::RenderConfig;

pub(crate) const FONT_WIDTH: usize = 5;
pub(crate) const FONT_HEIGHT: usize = 7;
pub(crate) const STATUS_PAD_TOP: usize = 3;
pub(crate) const STATUS_PAD_BOTTOM: usize = 2;
pub(crate) const STATUS_BAR_HEIGHT: usize = STATUS_PAD_TOP + FONT_HEIGHT + STATUS_PAD_BOTTOM;

const STATUS_BG: [u8; 3] = [0x0D, 0x0D, 0x0D];
const STATUS_SEPARATOR: [u8; 3] = [0x33, 0x33, 0x33];
const STATUS_TEXT: [u8; 3] = [0x88, 0x88, 0x88];
const STATUS_LEFT_PAD: usize = 4;

/// 5x7 glyph rows, lower 5 bits used (bit 4 is the leftmost column).
/// Upper-case letters are folded to lower case by the callers.
pub(crate) const fn glyph(ch: u8) -> [u8; FONT_HEIGHT] {
    match ch {
        b' ' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        b'.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00],
        b'-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        b'/' => [0x01, 0x02, 0x02, 0x04, 0x08, 0x08, 0x10],
        b'>' => [0x10, 0x08, 0x04, 0x02, 0x04, 0x08, 0x10],
        b'=' => [0x00, 0x00, 0x1F, 0x00, 0x1F, 0x00, 0x00],
        b'[' => [0x0E, 0x08, 0x08, 0x08, 0x08, 0x08, 0x0E],
        b']' => [0x0E, 0x02, 0x02, 0x02, 0x02, 0x02, 0x0E],
        b'|' => [0x04, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        b'+' => [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00],
        b',' => [0x00, 0x00, 0x00, 0x00, 0x0C, 0x04, 0x08],
        b'(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        b')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        b':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        b'0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        b'1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        b'2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        b'3' => [0x0E, 0x11, 0x01, 0x06, 0x01, 0x11, 0x0E],
        b'4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        b'5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        b'6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        b'7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        b'8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        b'9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        b'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        b'b' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E],
        b'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        b'd' => [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F],
        b'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        b'f' => [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        b'g' => [0x00, 0x00, 0x0F, 0x11, 0x0F, 0x01, 0x0E],
        b'h' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11],
        b'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        b'j' => [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C],
        b'k' => [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12],
        b'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        b'm' => [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11],
        b'n' => [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        b'o' => [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        b'p' => [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10],
        b'q' => [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01],
        b'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        b's' => [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        b't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        b'u' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D],
        b'v' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04],
        b'w' => [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A],
        b'x' => [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11],
        b'y' => [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        b'z' => [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F],
        _ => [0x00; FONT_HEIGHT],
    }
}

/// Write one opaque pixel; out-of-buffer writes are dropped.
#[inline]
fn put_pixel(buf: &mut [u8], frame_width: usize, x: usize, y: usize, color: [u8; 3]) {
    if x >= frame_width {
        return;
    }
    let offset = (y * frame_width + x) * 4;
    if let Some(px) = buf.get_mut(offset..offset + 4) {
        px.copy_from_slice(&[color[0], color[1], color[2], 255]);
    }
}

/// Blit one glyph scaled to `cw x ch` pixels (nearest neighbour).
fn draw_glyph(buf: &mut [u8], frame_width: usize, x: usize, y: usize, byte: u8, color: [u8; 3], cw: usize, ch: usize) {
    let g = glyph(byte.to_ascii_lowercase());
    for py in 0..ch {
        let bits = g[py * FONT_HEIGHT / ch];
        for px in 0..cw {
            let col = px * FONT_WIDTH / cw;
            if bits & (1 << (FONT_WIDTH - 1 - col)) != 0 {
                put_pixel(buf, frame_width, x + px, y + py, color);
            }
        }
    }
}

/// Draw text at native size. Returns the x position after the last character.
pub(crate) fn draw_text(buf: &mut [u8], frame_width: usize, x: usize, y: usize, text: &str, color: [u8; 3]) -> usize {
    let mut cx = x;
    for &byte in text.as_bytes() {
        draw_glyph(buf, frame_width, cx, y, byte, color, FONT_WIDTH, FONT_HEIGHT);
        cx += FONT_WIDTH + 1;
    }
    cx
}

/// Draw text with each character sized to `cw x ch` pixels.
/// Returns the x position after the last character.
pub(crate) fn draw_text_sized(buf: &mut [u8], frame_width: usize, x: usize, y: usize, text: &str, color: [u8; 3], cw: usize, ch: usize) -> usize {
    let step = cw + cw / 5 + 1;
    let mut cx = x;
    for &byte in text.as_bytes() {
        draw_glyph(buf, frame_width, cx, y, byte, color, cw, ch);
        cx += step;
    }
    cx
}

/// Longest prefix of `text` that fits in `width` pixels, with `..` when cut.
fn fit_status(text: &str, width: usize) -> String {
    let step = FONT_WIDTH + 1;
    let max_chars = width / step;
    if text.len() <= max_chars {
        return text.to_string();
    }
    if max_chars < 2 {
        return String::new();
    }
    let mut out: String = text.chars().take(max_chars - 2).collect();
    out.push_str("..");
    out
}

/// Fill the status bar below the field and write `text` into it.
pub fn render_status(buf: &mut [u8], cfg: &RenderConfig, text: &str) {
    let fw = cfg.frame_width;
    let top = cfg.status_y();

    for y in top..cfg.frame_height {
        let color = if y == top { STATUS_SEPARATOR } else { STATUS_BG };
        for x in 0..fw {
            put_pixel(buf, fw, x, y, color);
        }
    }

    let left = STATUS_LEFT_PAD + cfg.display_x_offset;
    let line = fit_status(text, fw.saturating_sub(left));
    draw_text(buf, fw, left, top + STATUS_PAD_TOP, &line, STATUS_TEXT);
}
