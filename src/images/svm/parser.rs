// StarView metafile parser
//
// Splits an SVM stream into its header and a list of action records.
// Every record carries its own byte length, so unknown actions are skipped
// without being understood.

use crate::common::{Error, Result};

pub const SVM_MAGIC: &[u8; 6] = b"VCLMTF";

/// Length of a version-compat block header (u16 version + u32 length).
const COMPAT_SIZE: usize = 6;

/// Little-endian cursor over a byte slice.
#[derive(Debug, Clone)]
pub(crate) struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(crate) fn bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(Error::ConversionFailure(format!(
                "SVM data truncated at offset {} ({} more bytes needed)",
                self.pos,
                len - self.remaining()
            )));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16> {
        let b = self.bytes(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub(crate) fn u32(&mut self) -> Result<u32> {
        let b = self.bytes(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn i32(&mut self) -> Result<i32> {
        let b = self.bytes(4)?;
        Ok(i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub(crate) fn point(&mut self) -> Result<(i32, i32)> {
        Ok((self.i32()?, self.i32()?))
    }

    /// A `u16` point count followed by that many points.
    pub(crate) fn polygon(&mut self) -> Result<Vec<(i32, i32)>> {
        let count = self.u16()? as usize;
        if self.remaining() < count * 8 {
            return Err(Error::ConversionFailure(format!(
                "SVM polygon of {} points truncated at offset {}",
                count, self.pos
            )));
        }
        (0..count).map(|_| self.point()).collect()
    }
}

/// Mapping between logical coordinates and the output device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvmMapMode {
    pub unit: u16,
    pub origin: (i32, i32),
    pub scale_x: (i32, i32),
    pub scale_y: (i32, i32),
}

#[derive(Debug, Clone)]
pub struct SvmHeader {
    pub version: u16,
    pub compression: u32,
    pub map_mode: SvmMapMode,
    pub width: i32,
    pub height: i32,
    pub action_count: u32,
}

impl SvmHeader {
    /// Parse the header; the reader is left at the first action.
    fn parse(reader: &mut ByteReader<'_>) -> Result<Self> {
        if reader.bytes(SVM_MAGIC.len())? != SVM_MAGIC {
            return Err(Error::ConversionFailure("missing SVM signature".to_string()));
        }

        let version = reader.u16()?;
        let header_len = reader.u32()? as usize;
        let header_end = reader.position() + header_len;

        let compression = reader.u32()?;

        let _map_version = reader.u16()?;
        let _map_len = reader.u32()?;
        let unit = reader.u16()?;
        let origin = reader.point()?;
        let scale_x = (reader.i32()?, reader.i32()?);
        let scale_y = (reader.i32()?, reader.i32()?);
        let _simple = reader.u8()?;

        let width = reader.i32()?;
        let height = reader.i32()?;
        let action_count = reader.u32()?;

        // Newer writers append fields inside the compat block.
        if header_end > reader.position() {
            reader.bytes(header_end - reader.position())?;
        }

        Ok(Self {
            version,
            compression,
            map_mode: SvmMapMode {
                unit,
                origin,
                scale_x,
                scale_y,
            },
            width,
            height,
            action_count,
        })
    }
}

/// One metafile action with its raw payload.
#[derive(Debug, Clone)]
pub struct SvmRecord {
    pub action: u16,
    pub version: u16,
    pub data: Vec<u8>,
}

/// Parsed StarView metafile.
#[derive(Debug, Clone)]
pub struct SvmParser {
    pub header: SvmHeader,
    pub records: Vec<SvmRecord>,
}

impl SvmParser {
    pub fn new(data: &[u8]) -> Result<Self> {
        let mut reader = ByteReader::new(data);
        let header = SvmHeader::parse(&mut reader)?;
        if header.compression != 0 {
            return Err(Error::Unsupported(format!(
                "compressed StarView metafile (mode {})",
                header.compression
            )));
        }

        let mut records = Vec::with_capacity((header.action_count as usize).min(4096));
        for index in 0..header.action_count {
            if reader.remaining() < 2 + COMPAT_SIZE {
                log::warn!(
                    "SVM declares {} actions but data ends after {}",
                    header.action_count,
                    index
                );
                break;
            }
            let action = reader.u16()?;
            let version = reader.u16()?;
            let len = reader.u32()? as usize;
            let data = reader.bytes(len)?.to_vec();
            records.push(SvmRecord {
                action,
                version,
                data,
            });
        }

        Ok(Self { header, records })
    }

    pub fn width(&self) -> i32 {
        self.header.width
    }

    pub fn height(&self) -> i32 {
        self.header.height
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    /// Writes SVM streams for tests.
    #[derive(Debug, Default)]
    pub(crate) struct SvmWriter {
        actions: Vec<(u16, Vec<u8>)>,
        width: i32,
        height: i32,
    }

    impl SvmWriter {
        pub(crate) fn new(width: i32, height: i32) -> Self {
            Self {
                actions: Vec::new(),
                width,
                height,
            }
        }

        pub(crate) fn action(mut self, action: u16, payload: Vec<u8>) -> Self {
            self.actions.push((action, payload));
            self
        }

        pub(crate) fn build(&self) -> Vec<u8> {
            let mut out = Vec::new();
            out.extend_from_slice(b"VCLMTF");
            out.extend_from_slice(&1u16.to_le_bytes());
            let len_pos = out.len();
            out.extend_from_slice(&0u32.to_le_bytes());
            let start = out.len();
            out.extend_from_slice(&0u32.to_le_bytes()); // compression
            out.extend_from_slice(&1u16.to_le_bytes());
            out.extend_from_slice(&27u32.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            for v in [0i32, 0, 1, 1, 1, 1] {
                out.extend_from_slice(&v.to_le_bytes());
            }
            out.push(1);
            out.extend_from_slice(&self.width.to_le_bytes());
            out.extend_from_slice(&self.height.to_le_bytes());
            out.extend_from_slice(&(self.actions.len() as u32).to_le_bytes());
            let header_len = (out.len() - start) as u32;
            out[len_pos..len_pos + 4].copy_from_slice(&header_len.to_le_bytes());

            for (action, payload) in &self.actions {
                out.extend_from_slice(&action.to_le_bytes());
                out.extend_from_slice(&1u16.to_le_bytes());
                out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
                out.extend_from_slice(payload);
            }
            out
        }
    }

    pub(crate) fn ints(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    pub(crate) fn polygon(points: &[(i32, i32)]) -> Vec<u8> {
        let mut out = (points.len() as u16).to_le_bytes().to_vec();
        for &(x, y) in points {
            out.extend_from_slice(&x.to_le_bytes());
            out.extend_from_slice(&y.to_le_bytes());
        }
        out
    }

    pub(crate) fn color(rgb: u32, set: bool) -> Vec<u8> {
        let mut out = rgb.to_le_bytes().to_vec();
        out.push(u8::from(set));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::fixture::*;
    use super::*;

    #[test]
    fn test_parse_header_and_records() {
        let data = SvmWriter::new(800, 600)
            .action(103, ints(&[0, 0, 10, 10]))
            .action(9999, vec![1, 2, 3])
            .build();
        let svm = SvmParser::new(&data).unwrap();
        assert_eq!(svm.width(), 800);
        assert_eq!(svm.height(), 600);
        assert_eq!(svm.header.map_mode.scale_x, (1, 1));
        assert_eq!(svm.records.len(), 2);
        assert_eq!(svm.records[1].action, 9999);
        assert_eq!(svm.records[1].data, vec![1, 2, 3]);
    }

    #[test]
    fn test_truncated_record_is_an_error() {
        let mut data = SvmWriter::new(10, 10).action(103, ints(&[0, 0, 10, 10])).build();
        data.truncate(data.len() - 4);
        assert!(SvmParser::new(&data).is_err());
    }

    #[test]
    fn test_missing_actions_are_tolerated() {
        let mut data = SvmWriter::new(10, 10).action(103, ints(&[0, 0, 1, 1])).build();
        // claim five actions
        let count_pos = data.len() - (2 + 6 + 16) - 4;
        data[count_pos..count_pos + 4].copy_from_slice(&5u32.to_le_bytes());
        let svm = SvmParser::new(&data).unwrap();
        assert_eq!(svm.records.len(), 1);
    }

    #[test]
    fn test_rejects_non_svm() {
        assert!(SvmParser::new(b"GIF89a").is_err());
        assert!(SvmParser::new(b"").is_err());
    }
}
