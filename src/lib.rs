//! # sa-locate
//!
//! 基于后缀数组的参考序列精确 k-mer 定位。
//!
//! 核心是复用 LCP 边界的递归二分查找：区间两端与查询的公共前缀长度
//! 随递归一路传递，每次探测从 `min(lo_lcp, hi_lcp)` 处继续比较，
//! 而不是从头开始。
//!
//! - **索引构建**：后缀数组（倍增法）、逆置换、LCP（Kasai）、可选 RMQ
//! - **持久化**：带 magic / 版本 / 元素宽度 / 校验和的二进制格式，兼容旧版裸格式
//! - **查询**：两端特判 + 递归二分；结果不带"未找到"信号，需调用方校验
//!
//! ## 快速示例
//!
//! ```rust,no_run
//! use sa_locate::index::{IndexOpt, SuffixIndex};
//! use sa_locate::search::QueryService;
//!
//! let reference = b"ACGTACGTACGT".to_vec();
//! let index = SuffixIndex::build(reference, &IndexOpt { k: 4, build_rmq: false }).unwrap();
//! let svc = QueryService::new(&index);
//!
//! let located = svc.lookup(b"GTAC");
//! if located.is_exact() {
//!     println!("GTAC at offset {}", located.offset());
//! }
//! ```
//!
//! ## 模块说明
//!
//! - [`io`]：参考序列读取与规范化
//! - [`index`]：后缀数组 / LCP / RMQ 构建与持久化
//! - [`search`]：前缀匹配度量、秩定位、查询服务
//! - [`harness`]：随机查询基准测试
//! - [`util`]：字母表与随机数工具

pub mod error;
pub mod harness;
pub mod index;
pub mod io;
pub mod search;
pub mod util;

pub use error::IndexError;
pub use index::{IndexOpt, SuffixIndex};
pub use search::{Located, QueryService, RankWindow};
