//! Synthetic font fixtures.
//!
//! Builds the smallest sfnt that ttf-parser accepts: `head`, `hhea`, `maxp`
//! and a one-record `name` table. No glyph outlines are emitted. The same
//! tables can be wrapped in WOFF and WOFF2 containers.

use crate::container::{Table, assemble_sfnt, known_tag_index};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use std::io::Write;

const TRUETYPE_FLAVOR: u32 = 0x0001_0000;

/// Builder for a minimal TrueType font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFont {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub line_gap: i16,
    pub family_name: String,
}

impl Default for TestFont {
    fn default() -> Self {
        Self {
            units_per_em: 2048,
            ascender: 1854,
            descender: -434,
            line_gap: 67,
            family_name: "Test Sans".to_string(),
        }
    }
}

impl TestFont {
    pub fn new(family_name: impl Into<String>) -> Self {
        Self {
            family_name: family_name.into(),
            ..Self::default()
        }
    }

    pub fn with_units_per_em(mut self, units_per_em: u16) -> Self {
        self.units_per_em = units_per_em;
        self
    }

    pub fn with_metrics(mut self, ascender: i16, descender: i16, line_gap: i16) -> Self {
        self.ascender = ascender;
        self.descender = descender;
        self.line_gap = line_gap;
        self
    }

    /// The font as a plain sfnt.
    pub fn build(&self) -> Vec<u8> {
        assemble_sfnt(TRUETYPE_FLAVOR, self.tables())
    }

    /// The font wrapped in a WOFF container, each table zlib-compressed when
    /// that makes it smaller.
    pub fn build_woff(&self) -> Vec<u8> {
        let tables = self.tables();
        let data_start = 44 + 20 * tables.len();

        let mut directory = Vec::new();
        let mut body = Vec::new();
        for (tag, data) in &tables {
            let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(data).expect("compress into memory");
            let compressed = encoder.finish().expect("compress into memory");
            let stored = if compressed.len() < data.len() { compressed } else { data.clone() };

            directory.extend_from_slice(tag);
            directory.extend_from_slice(&((data_start + body.len()) as u32).to_be_bytes());
            directory.extend_from_slice(&(stored.len() as u32).to_be_bytes());
            directory.extend_from_slice(&(data.len() as u32).to_be_bytes());
            directory.extend_from_slice(&0u32.to_be_bytes()); // origChecksum, unchecked

            body.extend_from_slice(&stored);
            while body.len() % 4 != 0 {
                body.push(0);
            }
        }

        let total = data_start + body.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"wOFF");
        out.extend_from_slice(&TRUETYPE_FLAVOR.to_be_bytes());
        out.extend_from_slice(&(total as u32).to_be_bytes());
        out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // reserved
        out.extend_from_slice(&(self.build().len() as u32).to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
        out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
        out.extend_from_slice(&[0u8; 20]); // metadata and private blocks
        out.extend_from_slice(&directory);
        out.extend_from_slice(&body);
        out
    }

    /// The font wrapped in a WOFF2 container. Every table is stored
    /// untransformed in a single brotli stream.
    pub fn build_woff2(&self) -> Vec<u8> {
        let tables = self.tables();

        let mut directory = Vec::new();
        let mut stream = Vec::new();
        for (tag, data) in &tables {
            match known_tag_index(tag) {
                Some(index) => directory.push(index),
                None => {
                    directory.push(0x3f);
                    directory.extend_from_slice(tag);
                }
            }
            push_base128(&mut directory, data.len() as u32);
            stream.extend_from_slice(data);
        }

        let mut compressed = Vec::new();
        {
            let mut writer = brotli::CompressorWriter::new(&mut compressed, 4096, 9, 22);
            writer.write_all(&stream).expect("compress into memory");
        }

        let mut total = 48 + directory.len() + compressed.len();
        let padding = (4 - total % 4) % 4;
        total += padding;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"wOF2");
        out.extend_from_slice(&TRUETYPE_FLAVOR.to_be_bytes());
        out.extend_from_slice(&(total as u32).to_be_bytes());
        out.extend_from_slice(&(tables.len() as u16).to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes()); // reserved
        out.extend_from_slice(&(self.build().len() as u32).to_be_bytes());
        out.extend_from_slice(&(compressed.len() as u32).to_be_bytes());
        out.extend_from_slice(&1u16.to_be_bytes()); // majorVersion
        out.extend_from_slice(&0u16.to_be_bytes()); // minorVersion
        out.extend_from_slice(&[0u8; 20]); // metadata and private blocks
        out.extend_from_slice(&directory);
        out.extend_from_slice(&compressed);
        out.resize(total, 0);
        out
    }

    fn tables(&self) -> Vec<Table> {
        vec![
            (*b"head", self.head()),
            (*b"hhea", self.hhea()),
            (*b"maxp", maxp()),
            (*b"name", self.name()),
        ]
    }

    fn head(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(54);
        t.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // version
        t.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // fontRevision
        t.extend_from_slice(&0u32.to_be_bytes()); // checksumAdjustment
        t.extend_from_slice(&0x5F0F_3CF5u32.to_be_bytes()); // magicNumber
        t.extend_from_slice(&0u16.to_be_bytes()); // flags
        t.extend_from_slice(&self.units_per_em.to_be_bytes());
        t.extend_from_slice(&[0u8; 16]); // created, modified
        t.extend_from_slice(&[0u8; 8]); // xMin, yMin, xMax, yMax
        t.extend_from_slice(&0u16.to_be_bytes()); // macStyle
        t.extend_from_slice(&8u16.to_be_bytes()); // lowestRecPPEM
        t.extend_from_slice(&2i16.to_be_bytes()); // fontDirectionHint
        t.extend_from_slice(&0i16.to_be_bytes()); // indexToLocFormat
        t.extend_from_slice(&0i16.to_be_bytes()); // glyphDataFormat
        t
    }

    fn hhea(&self) -> Vec<u8> {
        let mut t = Vec::with_capacity(36);
        t.extend_from_slice(&0x0001_0000u32.to_be_bytes());
        t.extend_from_slice(&self.ascender.to_be_bytes());
        t.extend_from_slice(&self.descender.to_be_bytes());
        t.extend_from_slice(&self.line_gap.to_be_bytes());
        t.extend_from_slice(&[0u8; 24]); // advance, bearings, caret, reserved, metricDataFormat
        t.extend_from_slice(&1u16.to_be_bytes()); // numberOfHMetrics
        t
    }

    fn name(&self) -> Vec<u8> {
        let encoded: Vec<u8> = self
            .family_name
            .encode_utf16()
            .flat_map(u16::to_be_bytes)
            .collect();

        let mut t = Vec::new();
        t.extend_from_slice(&0u16.to_be_bytes()); // format
        t.extend_from_slice(&1u16.to_be_bytes()); // count
        t.extend_from_slice(&18u16.to_be_bytes()); // stringOffset
        t.extend_from_slice(&3u16.to_be_bytes()); // platformID: Windows
        t.extend_from_slice(&1u16.to_be_bytes()); // encodingID: Unicode BMP
        t.extend_from_slice(&0x0409u16.to_be_bytes()); // languageID: en-US
        t.extend_from_slice(&1u16.to_be_bytes()); // nameID: family
        t.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
        t.extend_from_slice(&0u16.to_be_bytes()); // string offset
        t.extend_from_slice(&encoded);
        t
    }
}

/// Most significant group first, continuation bit on all but the last byte.
fn push_base128(out: &mut Vec<u8>, mut value: u32) {
    let mut groups = Vec::with_capacity(5);
    loop {
        groups.push((value & 0x7f) as u8);
        value >>= 7;
        if value == 0 {
            break;
        }
    }
    for (i, group) in groups.iter().enumerate().rev() {
        out.push(if i == 0 { *group } else { group | 0x80 });
    }
}

fn maxp() -> Vec<u8> {
    let mut t = Vec::with_capacity(6);
    t.extend_from_slice(&0x0000_5000u32.to_be_bytes());
    t.extend_from_slice(&1u16.to_be_bytes()); // numGlyphs
    t
}
