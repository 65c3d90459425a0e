//! WOFF and WOFF2 unwrapping.
//!
//! ttf-parser reads raw sfnt data only, so compressed web font containers are
//! unpacked here first. WOFF2 tables stored with a glyph transform (`glyf`,
//! `loca` and sometimes `hmtx`) are dropped instead of reconstructed: none of
//! the extracted metrics live in them.

use fontfall_traits::FontParseError;
use std::borrow::Cow;
use std::io::Read;

const WOFF_SIGNATURE: &[u8; 4] = b"wOFF";
const WOFF2_SIGNATURE: &[u8; 4] = b"wOF2";
const COLLECTION_FLAVOR: u32 = 0x7474_6366; // 'ttcf'

const WOFF_HEADER_LEN: usize = 44;
const WOFF2_HEADER_LEN: usize = 48;

/// Tags addressable by index in a WOFF2 table directory entry.
const KNOWN_TAGS: [&[u8; 4]; 63] = [
    b"cmap", b"head", b"hhea", b"hmtx", b"maxp", b"name", b"OS/2", b"post", b"cvt ", b"fpgm", b"glyf", b"loca",
    b"prep", b"CFF ", b"VORG", b"EBDT", b"EBLC", b"gasp", b"hdmx", b"kern", b"LTSH", b"PCLT", b"VDMX", b"vhea",
    b"vmtx", b"BASE", b"GDEF", b"GPOS", b"GSUB", b"EBSC", b"JSTF", b"MATH", b"CBDT", b"CBLC", b"COLR", b"CPAL",
    b"SVG ", b"sbix", b"acnt", b"avar", b"bdat", b"bloc", b"bsln", b"cvar", b"fdsc", b"feat", b"fmtx", b"fvar",
    b"gvar", b"hsty", b"just", b"lcar", b"mort", b"morx", b"opbd", b"prop", b"trak", b"Zapf", b"Silf", b"Glat",
    b"Gloc", b"Feat", b"Sill",
];
const EXPLICIT_TAG: u8 = 0x3f;

/// One sfnt table: tag and raw bytes.
pub type Table = ([u8; 4], Vec<u8>);

/// Returns the sfnt inside a WOFF/WOFF2 container, or `data` itself when it
/// is not one.
pub fn unwrap_container(data: &[u8]) -> Result<Cow<'_, [u8]>, FontParseError> {
    if data.starts_with(WOFF_SIGNATURE) {
        decode_woff(data).map(Cow::Owned)
    } else if data.starts_with(WOFF2_SIGNATURE) {
        decode_woff2(data).map(Cow::Owned)
    } else {
        Ok(Cow::Borrowed(data))
    }
}

/// Index of `tag` in the WOFF2 known-tag table.
pub(crate) fn known_tag_index(tag: &[u8; 4]) -> Option<u8> {
    KNOWN_TAGS.iter().position(|known| *known == tag).map(|i| i as u8)
}

fn decode_woff(data: &[u8]) -> Result<Vec<u8>, FontParseError> {
    let mut r = Reader::new(data, "WOFF");
    r.skip(4)?; // signature
    let flavor = r.u32()?;
    r.skip(4)?; // length
    let num_tables = r.u16()?;
    r.skip(WOFF_HEADER_LEN - 14)?;

    let mut tables = Vec::with_capacity(usize::from(num_tables));
    for _ in 0..num_tables {
        let tag = r.tag()?;
        let offset = r.u32()? as usize;
        let comp_length = r.u32()? as usize;
        let orig_length = r.u32()? as usize;
        r.skip(4)?; // origChecksum

        let stored = offset
            .checked_add(comp_length)
            .and_then(|end| data.get(offset..end))
            .ok_or_else(|| malformed("WOFF", "table data out of bounds"))?;
        let table = if comp_length < orig_length {
            inflate(stored, orig_length)?
        } else if comp_length == orig_length {
            stored.to_vec()
        } else {
            return Err(malformed("WOFF", "stored table larger than original"));
        };
        tables.push((tag, table));
    }
    Ok(assemble_sfnt(flavor, tables))
}

fn inflate(stored: &[u8], orig_length: usize) -> Result<Vec<u8>, FontParseError> {
    let mut table = Vec::with_capacity(orig_length);
    flate2::read::ZlibDecoder::new(stored)
        .read_to_end(&mut table)
        .map_err(|e| malformed("WOFF", &e.to_string()))?;
    if table.len() != orig_length {
        return Err(malformed("WOFF", "inflated table has the wrong length"));
    }
    Ok(table)
}

struct Woff2Entry {
    tag: [u8; 4],
    stored_length: usize,
    transformed: bool,
}

fn decode_woff2(data: &[u8]) -> Result<Vec<u8>, FontParseError> {
    let mut r = Reader::new(data, "WOFF2");
    r.skip(4)?; // signature
    let flavor = r.u32()?;
    if flavor == COLLECTION_FLAVOR {
        return Err(FontParseError::UnrecognizedFormat(
            "WOFF2 font collections are not supported".to_string(),
        ));
    }
    r.skip(4)?; // length
    let num_tables = r.u16()?;
    r.skip(2 + 4)?; // reserved, totalSfntSize
    let compressed_length = r.u32()? as usize;
    r.skip(WOFF2_HEADER_LEN - 24)?;

    let mut entries = Vec::with_capacity(usize::from(num_tables));
    for _ in 0..num_tables {
        let flags = r.u8()?;
        let tag = match flags & 0x3f {
            EXPLICIT_TAG => r.tag()?,
            index => **KNOWN_TAGS
                .get(usize::from(index))
                .ok_or_else(|| malformed("WOFF2", "unknown table tag index"))?,
        };
        let version = flags >> 6;
        let orig_length = r.base128()? as usize;
        // glyf and loca invert the meaning of version 0 and 3.
        let transformed = if &tag == b"glyf" || &tag == b"loca" {
            version != 3
        } else {
            version != 0
        };
        let stored_length = if transformed { r.base128()? as usize } else { orig_length };
        entries.push(Woff2Entry {
            tag,
            stored_length,
            transformed,
        });
    }

    let compressed = r.bytes(compressed_length)?;
    let mut stream = Vec::new();
    brotli::Decompressor::new(compressed, 4096)
        .read_to_end(&mut stream)
        .map_err(|e| malformed("WOFF2", &e.to_string()))?;

    let mut tables = Vec::with_capacity(entries.len());
    let mut offset = 0usize;
    for entry in entries {
        let end = offset
            .checked_add(entry.stored_length)
            .ok_or_else(|| malformed("WOFF2", "table length overflow"))?;
        let table = stream
            .get(offset..end)
            .ok_or_else(|| malformed("WOFF2", "table data past the end of the stream"))?;
        offset = end;
        if !entry.transformed {
            tables.push((entry.tag, table.to_vec()));
        }
    }
    Ok(assemble_sfnt(flavor, tables))
}

/// Lays out an sfnt: offset table, sorted table records, 4-byte aligned data.
pub fn assemble_sfnt(flavor: u32, mut tables: Vec<Table>) -> Vec<u8> {
    tables.sort_by(|a, b| a.0.cmp(&b.0));

    let num_tables = tables.len() as u32;
    let entry_selector = num_tables.checked_ilog2().unwrap_or(0);
    let search_range = if num_tables == 0 { 0 } else { (1u32 << entry_selector) * 16 };
    let range_shift = (num_tables * 16).saturating_sub(search_range);

    let directory_len = 12 + 16 * tables.len();
    let mut out = Vec::with_capacity(directory_len + tables.iter().map(|(_, t)| t.len() + 3).sum::<usize>());
    out.extend_from_slice(&flavor.to_be_bytes());
    out.extend_from_slice(&(num_tables as u16).to_be_bytes());
    out.extend_from_slice(&(search_range as u16).to_be_bytes());
    out.extend_from_slice(&(entry_selector as u16).to_be_bytes());
    out.extend_from_slice(&(range_shift as u16).to_be_bytes());

    let mut body = Vec::new();
    for (tag, data) in &tables {
        out.extend_from_slice(tag);
        out.extend_from_slice(&checksum(data).to_be_bytes());
        out.extend_from_slice(&((directory_len + body.len()) as u32).to_be_bytes());
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());

        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
    }
    out.extend_from_slice(&body);
    out
}

fn checksum(data: &[u8]) -> u32 {
    data.chunks(4).fold(0u32, |sum, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        sum.wrapping_add(u32::from_be_bytes(word))
    })
}

fn malformed(container: &str, detail: &str) -> FontParseError {
    FontParseError::UnrecognizedFormat(format!("malformed {} container: {}", container, detail))
}

/// Big-endian cursor over a container header.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    container: &'static str,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8], container: &'static str) -> Self {
        Self { data, pos: 0, container }
    }

    fn bytes(&mut self, len: usize) -> Result<&'a [u8], FontParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| malformed(self.container, "truncated"))?;
        let data = self.data;
        let slice = &data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn skip(&mut self, len: usize) -> Result<(), FontParseError> {
        self.bytes(len).map(|_| ())
    }

    fn u8(&mut self) -> Result<u8, FontParseError> {
        Ok(self.bytes(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, FontParseError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, FontParseError> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn tag(&mut self) -> Result<[u8; 4], FontParseError> {
        let b = self.bytes(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }

    /// WOFF2 variable-length integer: at most five bytes, no leading zeros.
    fn base128(&mut self) -> Result<u32, FontParseError> {
        let mut value = 0u32;
        for i in 0..5 {
            let byte = self.u8()?;
            if i == 0 && byte == 0x80 {
                return Err(malformed(self.container, "UIntBase128 with leading zeros"));
            }
            if value & 0xFE00_0000 != 0 {
                return Err(malformed(self.container, "UIntBase128 overflow"));
            }
            value = (value << 7) | u32::from(byte & 0x7f);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(malformed(self.container, "UIntBase128 longer than five bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestFont;

    const OPEN_SANS_WOFF2: &[u8] = include_bytes!("../tests/fixtures/open-sans-regular.woff2");

    fn table_tags(sfnt: &[u8]) -> Vec<[u8; 4]> {
        let count = usize::from(u16::from_be_bytes([sfnt[4], sfnt[5]]));
        (0..count)
            .map(|i| {
                let at = 12 + 16 * i;
                [sfnt[at], sfnt[at + 1], sfnt[at + 2], sfnt[at + 3]]
            })
            .collect()
    }

    #[test]
    fn test_plain_sfnt_is_borrowed() {
        let bytes = TestFont::default().build();
        assert!(matches!(unwrap_container(&bytes).unwrap(), Cow::Borrowed(_)));
    }

    #[test]
    fn test_woff_round_trips_to_identical_tables() {
        let font = TestFont::new("Packed Sans").with_units_per_em(1000);
        let woff = font.build_woff();
        let sfnt = unwrap_container(&woff).unwrap();
        assert_eq!(sfnt.as_ref(), font.build().as_slice());
    }

    #[test]
    fn test_woff2_round_trips_to_identical_tables() {
        let font = TestFont::new("Brotli Sans").with_metrics(1900, -500, 0);
        let woff2 = font.build_woff2();
        let sfnt = unwrap_container(&woff2).unwrap();
        assert_eq!(sfnt.as_ref(), font.build().as_slice());
    }

    #[test]
    fn test_real_woff2_drops_transformed_glyph_tables() {
        let sfnt = unwrap_container(OPEN_SANS_WOFF2).unwrap();
        let tags = table_tags(&sfnt);

        assert!(tags.contains(b"head"));
        assert!(tags.contains(b"hhea"));
        assert!(tags.contains(b"OS/2"));
        assert!(tags.contains(b"name"));
        assert!(!tags.contains(b"glyf"));
        assert!(!tags.contains(b"loca"));
        let mut sorted = tags.clone();
        sorted.sort();
        assert_eq!(tags, sorted);
    }

    #[test]
    fn test_truncated_woff2_is_malformed() {
        let err = unwrap_container(&OPEN_SANS_WOFF2[..200]).unwrap_err();
        assert!(err.to_string().contains("malformed WOFF2"), "{}", err);
    }

    #[test]
    fn test_woff2_collection_is_rejected() {
        let mut bytes = TestFont::default().build_woff2();
        bytes[4..8].copy_from_slice(b"ttcf");
        let err = unwrap_container(&bytes).unwrap_err();
        assert!(err.to_string().contains("collections"));
    }

    #[test]
    fn test_woff_table_out_of_bounds() {
        let mut bytes = TestFont::default().build_woff();
        // Point the first table record's offset past the end of the file.
        bytes[WOFF_HEADER_LEN + 4..WOFF_HEADER_LEN + 8].copy_from_slice(&u32::MAX.to_be_bytes());
        assert!(unwrap_container(&bytes).is_err());
    }

    #[test]
    fn test_base128() {
        let mut r = Reader::new(&[0x3f], "WOFF2");
        assert_eq!(r.base128().unwrap(), 63);

        let mut r = Reader::new(&[0x81, 0x00], "WOFF2");
        assert_eq!(r.base128().unwrap(), 128);

        let mut r = Reader::new(&[0x8f, 0xff, 0xff, 0xff, 0x7f], "WOFF2");
        assert_eq!(r.base128().unwrap(), u32::MAX);

        assert!(Reader::new(&[0x80, 0x01], "WOFF2").base128().is_err());
        assert!(Reader::new(&[0x90, 0x80, 0x80, 0x80, 0x00], "WOFF2").base128().is_err());
        assert!(Reader::new(&[0xff; 6], "WOFF2").base128().is_err());
    }

    #[test]
    fn test_sfnt_header_fields() {
        let tables = (0..5).map(|i| ([b'a', b'b', b'c', b'0' + i], vec![i; 3])).collect();
        let sfnt = assemble_sfnt(0x0001_0000, tables);
        let read = |at: usize| u16::from_be_bytes([sfnt[at], sfnt[at + 1]]);
        assert_eq!(read(4), 5);
        assert_eq!(read(6), 64); // searchRange
        assert_eq!(read(8), 2); // entrySelector
        assert_eq!(read(10), 16); // rangeShift
    }
}
