use std::sync::LazyLock;

use regex::Regex;

static PAR2_STEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)(?:\.vol\d+[+-](\d+))?$").expect("valid par2 stem regex")
});

/// A par2 filename split into its collection base and recovery block count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParFilename {
    /// Lowercased base name shared by every file of one par set.
    pub base: String,
    /// Zero for the main (index) file.
    pub blocks: u32,
}

impl ParFilename {
    pub fn is_main(&self) -> bool {
        self.blocks == 0
    }
}

/// Parses `name.par2` or `name.volNN+MM.par2`.
///
/// Matching is case-insensitive and anything after the last `.par2` is
/// ignored, so poster junk such as `name.par2.1` still parses.
pub fn parse_par_filename(filename: &str) -> Option<ParFilename> {
    let lower = filename.to_lowercase();
    let end = lower.rfind(".par2")?;
    let caps = PAR2_STEM_RE.captures(&lower[..end])?;
    let base = caps.get(1)?.as_str().to_string();
    let blocks = match caps.get(2) {
        Some(count) => count.as_str().parse().ok()?,
        None => 0,
    };
    Some(ParFilename { base, blocks })
}

/// True when both names parse and belong to the same par set.
pub fn same_par_collection(a: &str, b: &str) -> bool {
    match (parse_par_filename(a), parse_par_filename(b)) {
        (Some(a), Some(b)) => a.base == b.base,
        _ => false,
    }
}
