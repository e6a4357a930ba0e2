use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tracing::debug;

use crate::constants::npy::MAGIC;
use crate::data::FeatureMatrix;
use crate::errors::DatasetError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endian {
    Little,
    Big,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ElementType {
    F32(Endian),
    F64(Endian),
}

impl ElementType {
    fn parse(descr: &str) -> Option<Self> {
        let (order, kind) = descr.split_at_checked(1)?;
        let endian = match order {
            "<" | "=" => Endian::Little,
            ">" => Endian::Big,
            _ => return None,
        };
        match kind {
            "f4" => Some(Self::F32(endian)),
            "f8" => Some(Self::F64(endian)),
            _ => None,
        }
    }

    fn width(self) -> usize {
        match self {
            Self::F32(_) => 4,
            Self::F64(_) => 8,
        }
    }

    fn decode(self, bytes: &[u8]) -> f32 {
        match self {
            Self::F32(endian) => {
                let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
                match endian {
                    Endian::Little => f32::from_le_bytes(raw),
                    Endian::Big => f32::from_be_bytes(raw),
                }
            }
            Self::F64(endian) => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(&bytes[..8]);
                let value = match endian {
                    Endian::Little => f64::from_le_bytes(raw),
                    Endian::Big => f64::from_be_bytes(raw),
                };
                value as f32
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
struct Header {
    element: ElementType,
    fortran_order: bool,
    shape: Vec<usize>,
}

/// Decode a 2-D floating point `.npy` file into a row-major [`FeatureMatrix`].
///
/// `f8` data is narrowed to `f32`. Column-major (`fortran_order`) payloads are
/// transposed. Declared sizes are checked against the file length before any
/// buffer is allocated.
pub fn read_npy_matrix(path: &Path) -> Result<FeatureMatrix, DatasetError> {
    let file = File::open(path)
        .map_err(|err| DatasetError::parse(path, format!("failed opening for read: {err}")))?;
    let file_len = file
        .metadata()
        .map_err(|err| DatasetError::parse(path, format!("failed reading metadata: {err}")))?
        .len();
    let mut reader = BufReader::new(file);
    let (header, offset) = read_header(&mut reader, path, file_len)?;

    let &[rows, dim] = header.shape.as_slice() else {
        return Err(DatasetError::parse(
            path,
            format!("expected a 2-D matrix, found shape {:?}", header.shape),
        ));
    };
    let width = header.element.width();
    let byte_len = rows
        .checked_mul(dim)
        .and_then(|count| count.checked_mul(width))
        .ok_or_else(|| DatasetError::parse(path, "matrix shape overflows"))?;
    let available = file_len.saturating_sub(offset);
    if byte_len as u64 > available {
        return Err(DatasetError::parse(
            path,
            format!("truncated payload: shape ({rows}, {dim}) needs {byte_len} bytes, file holds {available}"),
        ));
    }
    let mut payload = Vec::with_capacity(byte_len);
    reader
        .take(byte_len as u64)
        .read_to_end(&mut payload)
        .map_err(|err| DatasetError::parse(path, format!("failed reading payload: {err}")))?;
    if payload.len() != byte_len {
        return Err(DatasetError::parse(
            path,
            format!("truncated payload: read {} of {byte_len} bytes", payload.len()),
        ));
    }
    if let ElementType::F64(_) = header.element {
        debug!(
            "[recdata:reader] narrowing f8 matrix {} ({rows} x {dim}) to f32",
            path.display()
        );
    }

    let decoded: Vec<f32> = payload
        .chunks_exact(width)
        .map(|chunk| header.element.decode(chunk))
        .collect();
    let values = if header.fortran_order {
        let mut row_major = vec![0f32; decoded.len()];
        for col in 0..dim {
            for row in 0..rows {
                row_major[row * dim + col] = decoded[col * rows + row];
            }
        }
        row_major
    } else {
        decoded
    };
    FeatureMatrix::from_row_major(rows, dim, values)
        .ok_or_else(|| DatasetError::parse(path, "decoded value count does not match shape"))
}

/// Parse the preamble and header dict; returns the header and the payload offset.
fn read_header(
    reader: &mut impl Read,
    path: &Path,
    file_len: u64,
) -> Result<(Header, u64), DatasetError> {
    let truncated = |err: std::io::Error| DatasetError::parse(path, format!("truncated header: {err}"));
    let mut preamble = [0u8; 8];
    reader.read_exact(&mut preamble).map_err(truncated)?;
    if &preamble[..6] != MAGIC {
        return Err(DatasetError::parse(path, "missing .npy magic"));
    }
    let (header_len, len_field) = match preamble[6] {
        1 => {
            let mut raw = [0u8; 2];
            reader.read_exact(&mut raw).map_err(truncated)?;
            (usize::from(u16::from_le_bytes(raw)), 2)
        }
        2 | 3 => {
            let mut raw = [0u8; 4];
            reader.read_exact(&mut raw).map_err(truncated)?;
            (u32::from_le_bytes(raw) as usize, 4)
        }
        major => {
            return Err(DatasetError::parse(
                path,
                format!("unsupported .npy version {major}"),
            ));
        }
    };
    let offset = preamble.len() as u64 + len_field + header_len as u64;
    if offset > file_len {
        return Err(DatasetError::parse(
            path,
            format!("truncated header: declares {header_len} bytes, file holds {file_len}"),
        ));
    }
    let mut raw = vec![0u8; header_len];
    reader.read_exact(&mut raw).map_err(truncated)?;
    let text = String::from_utf8_lossy(&raw);
    let header = parse_header(&text).map_err(|reason| DatasetError::parse(path, reason))?;
    Ok((header, offset))
}

fn parse_header(text: &str) -> Result<Header, String> {
    let descr = dict_value(text, "descr")
        .and_then(quoted)
        .ok_or("header has no 'descr'")?;
    let element =
        ElementType::parse(descr).ok_or_else(|| format!("unsupported dtype '{descr}'"))?;
    let fortran_order = match dict_value(text, "fortran_order") {
        Some(value) if value.starts_with("True") => true,
        Some(value) if value.starts_with("False") => false,
        _ => return Err("header has no 'fortran_order'".to_string()),
    };
    let shape_text = dict_value(text, "shape")
        .and_then(|value| value.strip_prefix('('))
        .and_then(|value| value.split_once(')'))
        .map(|(inner, _)| inner)
        .ok_or("header has no 'shape'")?;
    let shape = shape_text
        .split(',')
        .map(str::trim)
        .filter(|dim| !dim.is_empty())
        .map(|dim| {
            dim.trim_end_matches('L')
                .parse::<usize>()
                .map_err(|_| format!("bad shape dimension '{dim}'"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Header {
        element,
        fortran_order,
        shape,
    })
}

fn dict_value<'a>(text: &'a str, key: &str) -> Option<&'a str> {
    ["'", "\""].iter().find_map(|quote| {
        let needle = format!("{quote}{key}{quote}");
        let start = text.find(&needle)? + needle.len();
        let rest = text[start..].trim_start().strip_prefix(':')?;
        Some(rest.trim_start())
    })
}

fn quoted(value: &str) -> Option<&str> {
    let quote = value.chars().next().filter(|ch| *ch == '\'' || *ch == '"')?;
    let inner = &value[1..];
    inner.find(quote).map(|end| &inner[..end])
}

/// Encode a row-major `f32` matrix as a version 1 `.npy` payload.
pub fn encode_npy_f32(rows: usize, dim: usize, values: &[f32]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '<f4', 'fortran_order': False, 'shape': ({rows}, {dim}), }}"
    );
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    header.push_str(&" ".repeat((64 - unpadded % 64) % 64));
    header.push('\n');

    let mut bytes = Vec::with_capacity(MAGIC.len() + 4 + header.len() + values.len() * 4);
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&(header.len() as u16).to_le_bytes());
    bytes.extend_from_slice(header.as_bytes());
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}
