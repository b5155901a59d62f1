// SVM to SVG converter
//
// Replays the drawing actions of a StarView metafile against a small
// graphics state (line and fill colour) and writes one SVG element per
// shape. Actions without a vector counterpart are skipped.

use super::parser::{ByteReader, SvmParser, SvmRecord};
use crate::common::Result;
use crate::images::svg_utils::{write_closed_path, write_num, write_paint_attr, write_points};

pub(crate) const META_LINE_ACTION: u16 = 102;
pub(crate) const META_RECT_ACTION: u16 = 103;
pub(crate) const META_ELLIPSE_ACTION: u16 = 105;
pub(crate) const META_POLYLINE_ACTION: u16 = 109;
pub(crate) const META_POLYGON_ACTION: u16 = 110;
pub(crate) const META_POLYPOLYGON_ACTION: u16 = 111;
pub(crate) const META_LINECOLOR_ACTION: u16 = 132;
pub(crate) const META_FILLCOLOR_ACTION: u16 = 133;

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    line: Option<u32>,
    fill: Option<u32>,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            line: Some(0x000000),
            fill: Some(0xFFFFFF),
        }
    }
}

pub struct SvmSvgConverter {
    parser: SvmParser,
}

impl SvmSvgConverter {
    pub fn new(parser: SvmParser) -> Self {
        Self { parser }
    }

    pub fn convert_to_svg(&self) -> Result<String> {
        let header = &self.parser.header;
        let (ox, oy) = header.map_mode.origin;

        let mut svg = String::with_capacity(256 + self.parser.records.len() * 64);
        svg.push_str(r#"<svg xmlns="http://www.w3.org/2000/svg" width=""#);
        write_num(&mut svg, header.width as i64);
        svg.push_str(r#"" height=""#);
        write_num(&mut svg, header.height as i64);
        svg.push_str(r#"" viewBox=""#);
        write_num(&mut svg, -(ox as i64));
        svg.push(' ');
        write_num(&mut svg, -(oy as i64));
        svg.push(' ');
        write_num(&mut svg, header.width as i64);
        svg.push(' ');
        write_num(&mut svg, header.height as i64);
        svg.push_str("\">");

        let mut state = GraphicsState::default();
        for record in &self.parser.records {
            if let Err(e) = self.process_record(record, &mut state, &mut svg) {
                log::warn!("skipping malformed SVM action {}: {}", record.action, e);
            }
        }

        svg.push_str("</svg>");
        Ok(svg)
    }

    pub fn convert_to_svg_bytes(&self) -> Result<Vec<u8>> {
        Ok(self.convert_to_svg()?.into_bytes())
    }

    fn process_record(&self, record: &SvmRecord, state: &mut GraphicsState, svg: &mut String) -> Result<()> {
        let mut reader = ByteReader::new(&record.data);
        match record.action {
            META_LINE_ACTION => {
                let (x1, y1) = reader.point()?;
                let (x2, y2) = reader.point()?;
                svg.push_str("<line x1=\"");
                write_num(svg, x1 as i64);
                svg.push_str("\" y1=\"");
                write_num(svg, y1 as i64);
                svg.push_str("\" x2=\"");
                write_num(svg, x2 as i64);
                svg.push_str("\" y2=\"");
                write_num(svg, y2 as i64);
                svg.push('"');
                write_paint_attr(svg, "stroke", state.line);
                svg.push_str("/>");
            },
            META_RECT_ACTION => {
                let (left, top, right, bottom) = rectangle(&mut reader)?;
                svg.push_str("<rect x=\"");
                write_num(svg, left);
                svg.push_str("\" y=\"");
                write_num(svg, top);
                svg.push_str("\" width=\"");
                write_num(svg, right - left);
                svg.push_str("\" height=\"");
                write_num(svg, bottom - top);
                svg.push('"');
                write_shape_paint(svg, state);
                svg.push_str("/>");
            },
            META_ELLIPSE_ACTION => {
                let (left, top, right, bottom) = rectangle(&mut reader)?;
                // centre and radii in doubled units avoid fractions
                svg.push_str("<ellipse cx=\"");
                write_half(svg, left + right);
                svg.push_str("\" cy=\"");
                write_half(svg, top + bottom);
                svg.push_str("\" rx=\"");
                write_half(svg, right - left);
                svg.push_str("\" ry=\"");
                write_half(svg, bottom - top);
                svg.push('"');
                write_shape_paint(svg, state);
                svg.push_str("/>");
            },
            META_POLYLINE_ACTION => {
                let points = reader.polygon()?;
                svg.push_str("<polyline points=\"");
                write_points(svg, &points);
                svg.push_str("\" fill=\"none\"");
                write_paint_attr(svg, "stroke", state.line);
                svg.push_str("/>");
            },
            META_POLYGON_ACTION => {
                let points = reader.polygon()?;
                svg.push_str("<polygon points=\"");
                write_points(svg, &points);
                svg.push('"');
                write_shape_paint(svg, state);
                svg.push_str("/>");
            },
            META_POLYPOLYGON_ACTION => {
                let count = reader.u16()?;
                let polygons = (0..count)
                    .map(|_| reader.polygon())
                    .collect::<Result<Vec<_>>>()?;
                svg.push_str("<path d=\"");
                write_closed_path(svg, &polygons);
                svg.push_str("\" fill-rule=\"evenodd\"");
                write_shape_paint(svg, state);
                svg.push_str("/>");
            },
            META_LINECOLOR_ACTION => {
                let color = reader.u32()?;
                let set = reader.u8()? != 0;
                state.line = set.then_some(color & 0x00FF_FFFF);
            },
            META_FILLCOLOR_ACTION => {
                let color = reader.u32()?;
                let set = reader.u8()? != 0;
                state.fill = set.then_some(color & 0x00FF_FFFF);
            },
            _ => {},
        }
        Ok(())
    }
}

fn rectangle(reader: &mut ByteReader<'_>) -> Result<(i64, i64, i64, i64)> {
    Ok((
        reader.i32()? as i64,
        reader.i32()? as i64,
        reader.i32()? as i64,
        reader.i32()? as i64,
    ))
}

fn write_shape_paint(svg: &mut String, state: &GraphicsState) {
    write_paint_attr(svg, "fill", state.fill);
    write_paint_attr(svg, "stroke", state.line);
}

/// Write `n / 2` with at most one decimal.
fn write_half(svg: &mut String, n: i64) {
    if n < 0 {
        svg.push('-');
    }
    write_num(svg, n.unsigned_abs() as i64 / 2);
    if n % 2 != 0 {
        svg.push_str(".5");
    }
}
