//! Shared SVG writing helpers for metafile conversion.
//!
//! All functions append to an existing `String` buffer instead of returning
//! fresh strings.

use std::fmt::Write;

/// Write an integer coordinate.
///
/// ```
/// use odr::images::svg_utils::write_num;
///
/// let mut buf = String::new();
/// write_num(&mut buf, -42);
/// assert_eq!(buf, "-42");
/// ```
#[inline]
pub fn write_num(buf: &mut String, n: i64) {
    let mut buffer = itoa::Buffer::new();
    buf.push_str(buffer.format(n));
}

/// Write an `0x00RRGGBB` colour as `#rrggbb`.
///
/// ```
/// use odr::images::svg_utils::write_color_hex;
///
/// let mut buf = String::new();
/// write_color_hex(&mut buf, 0x00FF8000);
/// assert_eq!(buf, "#ff8000");
/// ```
#[inline]
pub fn write_color_hex(buf: &mut String, color: u32) {
    let _ = write!(
        buf,
        "#{:02x}{:02x}{:02x}",
        (color >> 16) & 0xFF,
        (color >> 8) & 0xFF,
        color & 0xFF
    );
}

/// Write ` name="#rrggbb"`, or ` name="none"` for an unset colour.
#[inline]
pub fn write_paint_attr(buf: &mut String, name: &str, color: Option<u32>) {
    buf.push(' ');
    buf.push_str(name);
    buf.push_str("=\"");
    match color {
        Some(color) => write_color_hex(buf, color),
        None => buf.push_str("none"),
    }
    buf.push('"');
}

/// Write a `points` list: `x1,y1 x2,y2 ...`.
pub fn write_points(buf: &mut String, points: &[(i32, i32)]) {
    for (i, &(x, y)) in points.iter().enumerate() {
        if i > 0 {
            buf.push(' ');
        }
        write_num(buf, x as i64);
        buf.push(',');
        write_num(buf, y as i64);
    }
}

/// Write SVG path data for closed sub-paths.
pub fn write_closed_path(buf: &mut String, polygons: &[Vec<(i32, i32)>]) {
    for polygon in polygons {
        let Some((&(x, y), rest)) = polygon.split_first() else {
            continue;
        };
        buf.push('M');
        write_num(buf, x as i64);
        buf.push(' ');
        write_num(buf, y as i64);
        for &(x, y) in rest {
            buf.push('L');
            write_num(buf, x as i64);
            buf.push(' ');
            write_num(buf, y as i64);
        }
        buf.push('Z');
    }
}
