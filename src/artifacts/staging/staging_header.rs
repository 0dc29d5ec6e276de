use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::staging::{HEADER_SIZE, SIGNATURE, VERSION};
use anyhow::anyhow;
use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Read, Write};

#[derive(Debug, Clone, new)]
pub struct StagingHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl StagingHeader {
    pub(crate) fn empty() -> Self {
        StagingHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            entries_count: 0,
        }
    }
}

impl Packable for StagingHeader {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for StagingHeader {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut marker = [0u8; 4];
        reader
            .read_exact(&mut marker)
            .map_err(|_| anyhow!("Invalid header size"))?;

        let marker = String::from_utf8(marker.to_vec())
            .map_err(|_| anyhow!("Invalid marker in staging header"))?;
        let version = reader.read_u32::<byteorder::NetworkEndian>()?;
        let entries_count = reader.read_u32::<byteorder::NetworkEndian>()?;

        Ok(StagingHeader {
            marker,
            version,
            entries_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_is_twelve_network_order_bytes() {
        let header = StagingHeader::new(SIGNATURE.to_string(), VERSION, 3);
        let bytes = header.serialize().unwrap();

        assert_eq!(bytes.as_ref(), b"STAG\0\0\0\x01\0\0\0\x03");

        let parsed = StagingHeader::deserialize(Cursor::new(bytes.to_vec())).unwrap();
        assert_eq!(parsed.entries_count, 3);
        assert_eq!(parsed.marker, SIGNATURE);
    }

    #[test]
    fn truncated_header_is_rejected() {
        assert!(StagingHeader::deserialize(Cursor::new(b"ST".to_vec())).is_err());
    }
}
