use anyhow::{anyhow, Result};
use std::io::BufRead;
use std::path::Path;

use crate::util::dna;

/// Marker that starts a header line; such lines carry no sequence.
pub const HEADER_MARKER: u8 = b'>';

/// Normalized reference sequence (upper case, legal symbols only).
#[derive(Debug, Clone, Default)]
pub struct Reference {
    pub seq: Vec<u8>,
    /// Number of header lines skipped.
    pub headers: usize,
    /// Number of input symbols dropped by the legality filter.
    pub dropped: usize,
}

impl Reference {
    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    pub fn into_seq(self) -> Vec<u8> {
        self.seq
    }
}

pub struct ReferenceReader<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> ReferenceReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new() }
    }

    /// Reads every line: headers are skipped, everything else is case-folded,
    /// filtered and appended. Sequence before the first header is kept.
    pub fn read_all(mut self) -> Result<Reference> {
        let mut out = Reference::default();
        loop {
            self.buf.clear();
            let n = self.reader.read_until(b'\n', &mut self.buf)?;
            if n == 0 {
                break;
            }
            if self.buf.first() == Some(&HEADER_MARKER) {
                out.headers += 1;
                continue;
            }
            let line = trim_eol(&self.buf);
            let added = dna::append_normalized(line, &mut out.seq);
            out.dropped += line.len() - added;
        }
        Ok(out)
    }
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let mut end = line.len();
    while end > 0 && matches!(line[end - 1], b'\n' | b'\r') {
        end -= 1;
    }
    &line[..end]
}

pub fn load_reference(path: &Path) -> Result<Reference> {
    let fh = std::fs::File::open(path)
        .map_err(|e| anyhow!("cannot open reference '{}': {}", path.display(), e))?;
    ReferenceReader::new(std::io::BufReader::new(fh)).read_all()
}
