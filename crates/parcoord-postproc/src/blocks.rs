//! Selection of paused par volumes to release when a repair job runs short
//! of recovery blocks.

use std::collections::HashMap;
use std::path::Path;

use parcoord_core::models::NzbInfo;
use parcoord_logging::LogLevel;

use crate::message::post_message;
use crate::parname::{ParFilename, parse_par_filename, same_par_collection};

/// Outcome of [`request_more_pars`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockRequest {
    /// Recovery blocks held by every candidate volume, released or not.
    /// Saturates, since block counts come from untrusted subjects.
    pub blocks_found: u32,
    /// Blocks of the volumes picked to cover the need; zero when unsatisfied.
    pub blocks_selected: u32,
    /// True when enough blocks were found and the selection was released.
    pub satisfied: bool,
}

/// How loosely a candidate's name must match the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParMatch {
    /// Same par set according to the parsed base name.
    Exact,
    /// Filename merely contains `<base>.par2` or `<base>.vol`; covers names
    /// with leftover subject text.
    Strict,
    /// Any par volume of the collection.
    Any,
}

#[derive(Debug, Clone, Copy)]
struct BlockCandidate {
    file_id: u32,
    blocks: u32,
}

/// Releases paused par volumes of `nzb` so that at least `blocks_needed`
/// recovery blocks become available.
///
/// Candidates are gathered in widening passes (exact set, loose name, any
/// set) until their total covers the need. Nothing is released when the
/// total falls short. Otherwise volumes are taken largest-fit first, then in
/// candidate order until the need is covered.
pub fn request_more_pars(nzb: &mut NzbInfo, par_filename: &str, blocks_needed: u32) -> BlockRequest {
    let hint = Path::new(par_filename)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(par_filename);
    let Some(main) = parse_par_filename(hint) else {
        post_message(
            nzb,
            LogLevel::Error,
            format!("Internal error: could not parse filename {hint}"),
        );
        return BlockRequest::default();
    };

    let mut candidates = Vec::new();
    let mut blocks_found: u32 = 0;
    for mode in [ParMatch::Exact, ParMatch::Strict, ParMatch::Any] {
        let added = find_pars(nzb, hint, &main, mode, &mut candidates);
        blocks_found = blocks_found.saturating_add(added);
        if blocks_found >= blocks_needed {
            break;
        }
    }

    let satisfied = blocks_found >= blocks_needed;
    let blocks_selected = if satisfied {
        release_blocks(nzb, candidates, blocks_needed)
    } else {
        0
    };

    tracing::debug!(
        nzb_id = nzb.id,
        needed = blocks_needed,
        found = blocks_found,
        selected = blocks_selected,
        satisfied,
        "par block request"
    );
    BlockRequest {
        blocks_found,
        blocks_selected,
        satisfied,
    }
}

/// Appends new candidates for `mode` and returns the blocks they add.
fn find_pars(
    nzb: &NzbInfo,
    hint: &str,
    main: &ParFilename,
    mode: ParMatch,
    candidates: &mut Vec<BlockCandidate>,
) -> u32 {
    let mut found: u32 = 0;
    for file in &nzb.files {
        let Some(parsed) = parse_par_filename(&file.filename) else {
            continue;
        };
        if parsed.blocks == 0 || candidates.iter().any(|c| c.file_id == file.id) {
            continue;
        }
        let matches = match mode {
            ParMatch::Exact => same_par_collection(&file.filename, hint),
            ParMatch::Strict => {
                let lower = file.filename.to_lowercase();
                lower.contains(&format!("{}.par2", main.base))
                    || lower.contains(&format!("{}.vol", main.base))
            }
            ParMatch::Any => true,
        };
        if matches {
            candidates.push(BlockCandidate {
                file_id: file.id,
                blocks: parsed.blocks,
            });
            found = found.saturating_add(parsed.blocks);
        }
    }
    found
}

/// Returns the blocks of every volume picked.
fn release_blocks(nzb: &mut NzbInfo, mut candidates: Vec<BlockCandidate>, blocks_needed: u32) -> u32 {
    let mut remaining = blocks_needed;
    let mut selected: u32 = 0;

    // Largest volume that still fits; exponential par sets land exactly.
    while remaining > 0 {
        let mut best: Option<usize> = None;
        for (index, candidate) in candidates.iter().enumerate() {
            if candidate.blocks <= remaining
                && best.is_none_or(|b| candidates[b].blocks < candidate.blocks)
            {
                best = Some(index);
            }
        }
        let Some(index) = best else {
            break;
        };
        let candidate = candidates.remove(index);
        unpause_par(nzb, candidate.file_id);
        remaining -= candidate.blocks;
        selected = selected.saturating_add(candidate.blocks);
    }

    // Nothing fits any more: overshoot with whatever is left, in order.
    for candidate in candidates {
        if remaining == 0 {
            break;
        }
        unpause_par(nzb, candidate.file_id);
        remaining = remaining.saturating_sub(candidate.blocks);
        selected = selected.saturating_add(candidate.blocks);
    }
    selected
}

fn unpause_par(nzb: &mut NzbInfo, file_id: u32) {
    let filename = match nzb.find_file_mut(file_id) {
        Some(file) if file.paused => {
            file.paused = false;
            file.extra_priority = true;
            file.filename.clone()
        }
        _ => return,
    };
    let text = format!("Unpausing {}/{filename} for par-recovery", nzb.name);
    post_message(nzb, LogLevel::Info, text);
}

/// Pauses the par volumes of `nzb` that are not needed for a first
/// verification and returns how many files changed.
///
/// Per par set the main file stays active and every volume is paused. Sets
/// without a main file keep their smallest volume so verification can start.
pub fn pause_extra_pars(nzb: &mut NzbInfo) -> usize {
    let mut sets: HashMap<String, (bool, Vec<(u32, u32)>)> = HashMap::new();
    for file in &nzb.files {
        let Some(parsed) = parse_par_filename(&file.filename) else {
            continue;
        };
        let is_main = parsed.is_main();
        let (has_main, volumes) = sets.entry(parsed.base).or_default();
        if is_main {
            *has_main = true;
        } else {
            volumes.push((file.id, parsed.blocks));
        }
    }

    let mut to_pause = Vec::new();
    for (has_main, volumes) in sets.into_values() {
        let keep = if has_main {
            None
        } else {
            volumes
                .iter()
                .min_by_key(|(_, blocks)| *blocks)
                .map(|(id, _)| *id)
        };
        to_pause.extend(volumes.into_iter().map(|(id, _)| id).filter(|id| Some(*id) != keep));
    }

    let mut paused = 0;
    for id in to_pause {
        if let Some(file) = nzb.find_file_mut(id)
            && !file.paused
        {
            file.paused = true;
            paused += 1;
        }
    }
    if paused > 0 {
        tracing::info!(nzb_id = nzb.id, nzb = %nzb.name, paused, "paused extra par files");
    }
    paused
}
