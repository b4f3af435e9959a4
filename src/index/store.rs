//! 索引持久化。
//!
//! 当前格式（v1），整数均为小端：
//!
//! ```text
//! magic       8 字节 "SALCPIDX"
//! header_len  u64
//! header      bincode(IndexHeader)
//! rank        rank_len 个 word_bytes 宽的整数
//! lcp         lcp_len  个 word_bytes 宽的整数
//! ```
//!
//! 也可读取旧版裸格式：原生字节序的 u64 计数 + 该数量的 u64 逆置换，
//! 再接 u64 计数 + 该数量的 u64 LCP。所有读取都做边界检查，
//! 长度不符一律返回 [`IndexError::Corrupt`]。

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{IndexOpt, SuffixIndex};
use crate::error::{IndexError, Result};

pub const MAGIC: [u8; 8] = *b"SALCPIDX";
pub const FORMAT_VERSION: u32 = 1;
/// 写出时的元素宽度（字节）
pub const WORD_BYTES: u8 = 4;
const LEGACY_WORD_BYTES: usize = 8;
const CHUNK_WORDS: usize = 4096;

/// 构建来源信息，随索引一起保存。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub reference_file: Option<String>,
    pub build_args: Option<String>,
    pub build_timestamp: Option<String>,
}

impl IndexMeta {
    /// 以当前 UTC 时间作为构建时间戳。
    pub fn now(reference_file: Option<String>, build_args: Option<String>) -> Self {
        Self {
            reference_file,
            build_args,
            build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHeader {
    pub version: u32,
    pub word_bytes: u8,
    /// 构建时的查询窗口
    pub k: u64,
    pub reference_len: u64,
    pub reference_crc32: u32,
    pub rank_len: u64,
    pub lcp_len: u64,
    /// rank + lcp 负载的 CRC32
    pub payload_crc32: u32,
    pub meta: IndexMeta,
}

/// 索引的来源。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// 缓存缺失，重新构建并写入
    Built,
    /// 从 v1 格式加载
    Cached(Box<IndexHeader>),
    /// 从旧版裸格式加载
    Legacy,
}

/// 以 CHUNK_WORDS 为单位把整数数组转成小端字节块。
fn for_each_le_chunk<F>(words: &[u32], mut f: F) -> std::io::Result<()>
where
    F: FnMut(&[u8]) -> std::io::Result<()>,
{
    let mut buf = Vec::with_capacity(CHUNK_WORDS * 4);
    for chunk in words.chunks(CHUNK_WORDS) {
        buf.clear();
        for &w in chunk {
            buf.extend_from_slice(&w.to_le_bytes());
        }
        f(&buf)?;
    }
    Ok(())
}

fn payload_crc(rank: &[u32], lcp: &[u32]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = Vec::with_capacity(CHUNK_WORDS * 4);
    for chunk in rank.chunks(CHUNK_WORDS).chain(lcp.chunks(CHUNK_WORDS)) {
        buf.clear();
        for &w in chunk {
            buf.extend_from_slice(&w.to_le_bytes());
        }
        hasher.update(&buf);
    }
    hasher.finalize()
}

/// 把索引写入任意 writer。
pub fn write_to<W: Write>(index: &SuffixIndex, meta: &IndexMeta, w: &mut W) -> Result<()> {
    let header = IndexHeader {
        version: FORMAT_VERSION,
        word_bytes: WORD_BYTES,
        k: index.k() as u64,
        reference_len: index.len() as u64,
        reference_crc32: crc32fast::hash(index.text()),
        rank_len: index.rank().len() as u64,
        lcp_len: index.lcp().len() as u64,
        payload_crc32: payload_crc(index.rank(), index.lcp()),
        meta: meta.clone(),
    };
    let header_bytes = bincode::serialize(&header)?;
    w.write_all(&MAGIC)?;
    w.write_all(&(header_bytes.len() as u64).to_le_bytes())?;
    w.write_all(&header_bytes)?;
    for_each_le_chunk(index.rank(), |bytes| w.write_all(bytes))?;
    for_each_le_chunk(index.lcp(), |bytes| w.write_all(bytes))?;
    Ok(())
}

/// 写入文件：先写临时文件再重命名，避免留下半截缓存。
pub fn save(index: &SuffixIndex, meta: &IndexMeta, path: &Path) -> Result<()> {
    let tmp = tmp_path(path);
    let written = write_file(index, meta, &tmp).and_then(|()| Ok(std::fs::rename(&tmp, path)?));
    if let Err(e) = written {
        if let Err(rm) = std::fs::remove_file(&tmp) {
            debug!(path = %tmp.display(), error = %rm, "temporary index not removed");
        }
        return Err(e);
    }
    Ok(())
}

fn write_file(index: &SuffixIndex, meta: &IndexMeta, path: &Path) -> Result<()> {
    let f = std::fs::File::create(path)?;
    let mut w = std::io::BufWriter::new(f);
    write_to(index, meta, &mut w)?;
    w.flush()?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut s = path.as_os_str().to_owned();
    s.push(".tmp");
    PathBuf::from(s)
}

/// 带边界检查的字节游标。
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        if len > self.remaining() {
            return Err(IndexError::Corrupt(format!(
                "truncated {}: need {} bytes at offset {}, {} available",
                what,
                len,
                self.pos,
                self.remaining()
            )));
        }
        let out = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(out)
    }

    fn u64_le(&mut self, what: &str) -> Result<u64> {
        let b = self.take(8, what)?;
        Ok(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    fn u64_ne(&mut self, what: &str) -> Result<u64> {
        let b = self.take(8, what)?;
        Ok(u64::from_ne_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]))
    }

    /// 读取 `count` 个 `width` 字节宽的元素，返回原始字节。
    fn words(&mut self, count: u64, width: usize, what: &str) -> Result<&'a [u8]> {
        let len = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(width))
            .ok_or_else(|| IndexError::Corrupt(format!("{} count {} overflows", what, count)))?;
        self.take(len, what)
    }

    fn finish(&self) -> Result<()> {
        if self.remaining() != 0 {
            return Err(IndexError::Corrupt(format!(
                "{} trailing bytes after offset {}",
                self.remaining(),
                self.pos
            )));
        }
        Ok(())
    }
}

fn narrow(v: u64, what: &str) -> Result<u32> {
    u32::try_from(v).map_err(|_| IndexError::Corrupt(format!("{} value {} exceeds 32 bits", what, v)))
}

/// 按元素宽度（小端）解码。
fn decode_le(raw: &[u8], width: usize, what: &str) -> Result<Vec<u32>> {
    match width {
        4 => Ok(raw
            .chunks_exact(4)
            .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()),
        8 => raw
            .chunks_exact(8)
            .map(|b| narrow(u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]), what))
            .collect(),
        w => Err(IndexError::UnsupportedFormat(format!("element width {}", w))),
    }
}

fn decode_ne_u64(raw: &[u8], what: &str) -> Result<Vec<u32>> {
    raw.chunks_exact(8)
        .map(|b| narrow(u64::from_ne_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]), what))
        .collect()
}

fn check_reference(header: &IndexHeader, text: &[u8]) -> Result<()> {
    if header.reference_len != text.len() as u64 {
        return Err(IndexError::StaleIndex(format!(
            "index built for reference of length {}, current reference has {}",
            header.reference_len,
            text.len()
        )));
    }
    let crc = crc32fast::hash(text);
    if header.reference_crc32 != crc {
        return Err(IndexError::StaleIndex(format!(
            "reference checksum {:08x} does not match indexed {:08x}",
            crc, header.reference_crc32
        )));
    }
    Ok(())
}

/// 解码 v1 格式。
pub fn decode(bytes: &[u8], text: Vec<u8>, opt: &IndexOpt) -> Result<(SuffixIndex, IndexHeader)> {
    let mut rd = ByteReader::new(bytes);
    if rd.take(MAGIC.len(), "magic")? != &MAGIC[..] {
        return Err(IndexError::UnsupportedFormat("bad magic".into()));
    }
    let header_len = rd.u64_le("header length")?;
    let header_bytes = rd.words(header_len, 1, "header")?;
    let header: IndexHeader =
        bincode::deserialize(header_bytes).map_err(|e| IndexError::Corrupt(format!("header: {}", e)))?;
    if header.version != FORMAT_VERSION {
        return Err(IndexError::UnsupportedFormat(format!("version {}", header.version)));
    }
    let width = header.word_bytes as usize;
    if width != 4 && width != 8 {
        return Err(IndexError::UnsupportedFormat(format!("element width {}", width)));
    }

    let rank_raw = rd.words(header.rank_len, width, "rank array")?;
    let lcp_raw = rd.words(header.lcp_len, width, "LCP array")?;
    rd.finish()?;

    let rank = decode_le(rank_raw, width, "rank")?;
    let lcp = decode_le(lcp_raw, width, "LCP")?;
    let crc = payload_crc(&rank, &lcp);
    if crc != header.payload_crc32 {
        return Err(IndexError::Corrupt(format!(
            "payload checksum {:08x} does not match header {:08x}",
            crc, header.payload_crc32
        )));
    }
    check_reference(&header, &text)?;
    if header.k != opt.k as u64 {
        debug!(stored = header.k, requested = opt.k, "query window differs from build");
    }

    let index = SuffixIndex::from_parts(text, rank, lcp, opt)?;
    Ok((index, header))
}

/// 解码旧版裸格式（无 magic、无版本）。
pub fn decode_legacy(bytes: &[u8], text: Vec<u8>, opt: &IndexOpt) -> Result<SuffixIndex> {
    let mut rd = ByteReader::new(bytes);
    let rank_len = rd.u64_ne("rank count")?;
    let rank_raw = rd.words(rank_len, LEGACY_WORD_BYTES, "rank array")?;
    let lcp_len = rd.u64_ne("LCP count")?;
    let lcp_raw = rd.words(lcp_len, LEGACY_WORD_BYTES, "LCP array")?;
    rd.finish()?;

    let rank = decode_ne_u64(rank_raw, "rank")?;
    let lcp = decode_ne_u64(lcp_raw, "LCP")?;
    if rank.len() != text.len() {
        return Err(IndexError::StaleIndex(format!(
            "legacy index has {} suffixes, current reference has {}",
            rank.len(),
            text.len()
        )));
    }
    SuffixIndex::from_parts(text, rank, lcp, opt)
}

/// 自动识别格式并解码。
pub fn decode_any(bytes: &[u8], text: Vec<u8>, opt: &IndexOpt) -> Result<(SuffixIndex, Origin)> {
    if bytes.starts_with(&MAGIC) {
        let (index, header) = decode(bytes, text, opt)?;
        Ok((index, Origin::Cached(Box::new(header))))
    } else {
        warn!("index file has no magic header, reading legacy layout");
        Ok((decode_legacy(bytes, text, opt)?, Origin::Legacy))
    }
}

pub fn load(path: &Path, text: Vec<u8>, opt: &IndexOpt) -> Result<(SuffixIndex, Origin)> {
    let bytes = std::fs::read(path)?;
    decode_any(&bytes, text, opt)
}

/// 缓存文件存在则加载，不存在（仅限 NotFound）则构建并写入。
pub fn load_or_build(text: Vec<u8>, path: &Path, opt: &IndexOpt, meta: &IndexMeta) -> Result<(SuffixIndex, Origin)> {
    match std::fs::read(path) {
        Ok(bytes) => {
            info!(path = %path.display(), bytes = bytes.len(), "reading suffix array from file");
            let (index, origin) = decode_any(&bytes, text, opt)?;
            info!(size = index.len(), "loaded suffix array");
            Ok((index, origin))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(len = text.len(), "building suffix array");
            let index = SuffixIndex::build(text, opt)?;
            info!(path = %path.display(), "writing suffix array to file");
            save(&index, meta, path)?;
            info!(size = index.len(), "built suffix array");
            Ok((index, Origin::Built))
        }
        Err(e) => Err(e.into()),
    }
}
