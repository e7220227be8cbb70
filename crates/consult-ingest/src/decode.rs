//! Strict text decoding with an ordered list of candidate encodings.
//!
//! Transcripts in the source corpus were saved with inconsistent encodings.
//! Each candidate is tried without replacement characters, so a file either
//! decodes cleanly or fails with every attempted encoding named.

use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{IngestError, Result};

#[derive(Debug, Clone)]
pub struct TextDecoder {
    encodings: Vec<&'static Encoding>,
}

impl TextDecoder {
    /// Resolves a primary encoding label and optional fallbacks.
    pub fn from_labels<S: AsRef<str>>(primary: &str, fallbacks: &[S]) -> Result<Self> {
        let mut encodings = vec![resolve_label(primary)?];
        for label in fallbacks {
            let encoding = resolve_label(label.as_ref())?;
            if !encodings.contains(&encoding) {
                encodings.push(encoding);
            }
        }
        Ok(Self { encodings })
    }

    pub fn utf8() -> Self {
        Self {
            encodings: vec![encoding_rs::UTF_8],
        }
    }

    pub fn encodings(&self) -> &[&'static Encoding] {
        &self.encodings
    }

    /// Decodes `bytes`, returning the text and the encoding that succeeded.
    ///
    /// A byte order mark overrides the candidate list.
    pub fn decode(&self, bytes: &[u8], path: &Path) -> Result<(String, &'static Encoding)> {
        if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
            return encoding
                .decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])
                .map(|text| (text.into_owned(), encoding))
                .ok_or_else(|| IngestError::Decode {
                    path: path.to_path_buf(),
                    attempted: format!("{} (byte order mark)", encoding.name()),
                });
        }

        for (idx, encoding) in self.encodings.iter().copied().enumerate() {
            if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes)
            {
                if idx > 0 {
                    tracing::debug!(
                        path = %path.display(),
                        encoding = encoding.name(),
                        "decoded with fallback encoding"
                    );
                }
                return Ok((text.into_owned(), encoding));
            }
        }

        Err(IngestError::Decode {
            path: path.to_path_buf(),
            attempted: self
                .encodings
                .iter()
                .map(|encoding| encoding.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    /// Reads a whole file and decodes it.
    pub fn read_to_string(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).map_err(|e| IngestError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.decode(&bytes, path).map(|(text, _)| text)
    }
}

fn resolve_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| IngestError::UnknownEncoding {
        label: label.to_string(),
    })
}
