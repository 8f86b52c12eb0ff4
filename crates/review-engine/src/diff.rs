//! Line-based unified diff
//!
//! The edit script comes from Myers' O(ND) algorithm in its linear-space
//! form, run on the lines left after stripping the common prefix and suffix
//! and dropping lines that only one side contains. Changes are grouped into
//! hunks with [`CONTEXT_LINES`] lines of context on each side; hunks whose
//! context would overlap are merged.

use std::collections::{HashMap, HashSet};
use std::ops::{Index, IndexMut};

use shared_types::DiffLine;

/// Context lines kept around each change
pub const CONTEXT_LINES: usize = 3;

/// Edit steps one middle-snake search may take before the range it covers
/// is reported as a single replacement
pub const MAX_EDIT_COST: usize = 4096;

pub const ORIGINAL_LABEL: &str = "Original";
pub const MODIFIED_LABEL: &str = "Modified";

#[derive(Debug, Clone)]
pub struct DiffOptions {
    pub original_label: String,
    pub modified_label: String,
    pub context: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            original_label: ORIGINAL_LABEL.to_string(),
            modified_label: MODIFIED_LABEL.to_string(),
            context: CONTEXT_LINES,
        }
    }
}

/// Indices are 0-based positions in the original / modified line lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal(usize, usize),
    Delete(usize),
    Insert(usize),
}

/// Unified diff of `original` against `modified`; empty when the two have
/// identical lines
pub fn diff(original: &str, modified: &str) -> Vec<DiffLine> {
    diff_with_options(original, modified, &DiffOptions::default())
}

pub fn diff_with_options(original: &str, modified: &str, options: &DiffOptions) -> Vec<DiffLine> {
    let a = split_lines(original);
    let b = split_lines(modified);

    let edits = edit_script(&a, &b);
    let changes: Vec<usize> = edits
        .iter()
        .enumerate()
        .filter(|(_, edit)| !matches!(edit, Edit::Equal(..)))
        .map(|(index, _)| index)
        .collect();

    if changes.is_empty() {
        return Vec::new();
    }

    let mut output = vec![
        DiffLine::OriginalHeader {
            label: options.original_label.clone(),
        },
        DiffLine::ModifiedHeader {
            label: options.modified_label.clone(),
        },
    ];

    // Position in each document before edit k
    let mut positions = Vec::with_capacity(edits.len());
    let (mut i, mut j) = (0, 0);
    for edit in &edits {
        positions.push((i, j));
        match edit {
            Edit::Equal(..) => {
                i += 1;
                j += 1;
            }
            Edit::Delete(_) => i += 1,
            Edit::Insert(_) => j += 1,
        }
    }

    for (first, last) in group_changes(&changes, options.context) {
        let lo = first.saturating_sub(options.context);
        let hi = (last + options.context).min(edits.len() - 1);
        let window = &edits[lo..=hi];

        let original_len = window
            .iter()
            .filter(|edit| !matches!(edit, Edit::Insert(_)))
            .count();
        let modified_len = window
            .iter()
            .filter(|edit| !matches!(edit, Edit::Delete(_)))
            .count();
        let (start_i, start_j) = positions[lo];

        output.push(DiffLine::Hunk {
            original_start: start_i + 1,
            original_len,
            modified_start: start_j + 1,
            modified_len,
        });

        output.extend(window.iter().map(|edit| match *edit {
            Edit::Equal(i, j) => DiffLine::Context {
                text: a[i].to_string(),
                original_line: i + 1,
                modified_line: j + 1,
            },
            Edit::Delete(i) => DiffLine::Deletion {
                text: a[i].to_string(),
                original_line: i + 1,
            },
            Edit::Insert(j) => DiffLine::Addition {
                text: b[j].to_string(),
                modified_line: j + 1,
            },
        }));
    }

    output
}

/// Split on `\n`, `\r\n` and a bare `\r`; a final terminator does not start
/// an empty line
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut rest = text;

    while !rest.is_empty() {
        match rest.find(|c| c == '\n' || c == '\r') {
            Some(at) => {
                lines.push(&rest[..at]);
                let width = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
                rest = &rest[at + width..];
            }
            None => {
                lines.push(rest);
                break;
            }
        }
    }

    lines
}

/// Merge change positions whose separating run of equal lines is short enough
/// for the surrounding context to touch
fn group_changes(changes: &[usize], context: usize) -> Vec<(usize, usize)> {
    let mut groups: Vec<(usize, usize)> = Vec::new();

    for &change in changes {
        match groups.last_mut() {
            Some((_, last)) if change - *last - 1 <= 2 * context => *last = change,
            _ => groups.push((change, change)),
        }
    }

    groups
}

/// Edit script from the matched line pairs; deletions come before insertions
/// between two matches
fn edit_script(a: &[&str], b: &[&str]) -> Vec<Edit> {
    let mut edits = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);

    for (mi, mj) in matching_lines(a, b) {
        edits.extend((i..mi).map(Edit::Delete));
        edits.extend((j..mj).map(Edit::Insert));
        edits.push(Edit::Equal(mi, mj));
        i = mi + 1;
        j = mj + 1;
    }
    edits.extend((i..a.len()).map(Edit::Delete));
    edits.extend((j..b.len()).map(Edit::Insert));

    edits
}

/// Increasing `(original, modified)` index pairs of a longest common
/// subsequence of lines
fn matching_lines<'a>(a: &[&'a str], b: &[&'a str]) -> Vec<(usize, usize)> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let a_mid = &a[prefix..a.len() - suffix];
    let b_mid = &b[prefix..b.len() - suffix];

    let mut ids: HashMap<&'a str, u32> = HashMap::new();
    let a_ids = intern(&mut ids, a_mid);
    let b_ids = intern(&mut ids, b_mid);

    // A line missing from the other side can never be matched
    let in_a: HashSet<u32> = a_ids.iter().copied().collect();
    let in_b: HashSet<u32> = b_ids.iter().copied().collect();
    let a_keep: Vec<usize> = (0..a_ids.len()).filter(|&i| in_b.contains(&a_ids[i])).collect();
    let b_keep: Vec<usize> = (0..b_ids.len()).filter(|&j| in_a.contains(&b_ids[j])).collect();
    let a_seq: Vec<u32> = a_keep.iter().map(|&i| a_ids[i]).collect();
    let b_seq: Vec<u32> = b_keep.iter().map(|&j| b_ids[j]).collect();

    let mut found = Vec::new();
    let max_d = max_d(a_seq.len(), b_seq.len());
    let mut forward = Frontier::new(max_d);
    let mut backward = Frontier::new(max_d);
    conquer(&a_seq, &b_seq, 0, 0, &mut forward, &mut backward, &mut found);

    let mut matches: Vec<(usize, usize)> = (0..prefix).map(|k| (k, k)).collect();
    matches.extend(
        found
            .into_iter()
            .map(|(x, y)| (prefix + a_keep[x], prefix + b_keep[y])),
    );
    matches.extend((0..suffix).map(|k| (a.len() - suffix + k, b.len() - suffix + k)));

    matches
}

/// Map each line to a small integer id shared by equal lines
fn intern<'a>(ids: &mut HashMap<&'a str, u32>, lines: &[&'a str]) -> Vec<u32> {
    lines
        .iter()
        .map(|&line| {
            let next = ids.len() as u32;
            *ids.entry(line).or_insert(next)
        })
        .collect()
}

/// Furthest-reaching x per diagonal `k`, indexed from `-max_d` to `max_d`
struct Frontier {
    offset: isize,
    v: Vec<usize>,
}

impl Frontier {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d + 1],
        }
    }
}

impl Index<isize> for Frontier {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Frontier {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

fn max_d(n: usize, m: usize) -> usize {
    (n + m + 1) / 2 + 1
}

fn common_prefix_len(a: &[u32], b: &[u32]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix_len(a: &[u32], b: &[u32]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Linear-space Myers: split at a middle snake and recurse on both halves.
/// Offsets translate slice positions back to the full sequences.
fn conquer(
    a: &[u32],
    b: &[u32],
    a_off: usize,
    b_off: usize,
    forward: &mut Frontier,
    backward: &mut Frontier,
    out: &mut Vec<(usize, usize)>,
) {
    let prefix = common_prefix_len(a, b);
    out.extend((0..prefix).map(|k| (a_off + k, b_off + k)));
    let (a, b) = (&a[prefix..], &b[prefix..]);
    let (a_off, b_off) = (a_off + prefix, b_off + prefix);

    let suffix = common_suffix_len(a, b);
    let (a, b) = (&a[..a.len() - suffix], &b[..b.len() - suffix]);

    if !a.is_empty() && !b.is_empty() {
        match find_middle_snake(a, b, forward, backward) {
            Some((x, y)) if (x, y) != (0, 0) && (x, y) != (a.len(), b.len()) => {
                conquer(&a[..x], &b[..y], a_off, b_off, forward, backward, out);
                conquer(&a[x..], &b[y..], a_off + x, b_off + y, forward, backward, out);
            }
            // Too expensive: the whole range becomes one replacement
            _ => {}
        }
    }

    out.extend((0..suffix).map(|k| (a_off + a.len() + k, b_off + b.len() + k)));
}

/// Start of a snake on an optimal path through `a` x `b`, or `None` once
/// the search exceeds [`MAX_EDIT_COST`]
fn find_middle_snake(
    a: &[u32],
    b: &[u32],
    forward: &mut Frontier,
    backward: &mut Frontier,
) -> Option<(usize, usize)> {
    let (n, m) = (a.len(), b.len());
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;
    forward[1] = 0;
    backward[1] = 0;

    let limit = max_d(n, m).min(MAX_EDIT_COST) as isize;
    for d in 0..limit {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && forward[k - 1] < forward[k + 1]) {
                forward[k + 1]
            } else {
                forward[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix_len(&a[x..], &b[y..]);
            }
            forward[k] = x;

            if odd && (k - delta).abs() < d && forward[k] + backward[-(k - delta)] >= n {
                return Some((x0, y0));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && backward[k - 1] < backward[k + 1]) {
                backward[k + 1]
            } else {
                backward[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix_len(&a[..n - x], &b[..m - y]);
                x += advance;
                y += advance;
            }
            backward[k] = x;

            if !odd && (k - delta).abs() <= d && backward[k] + forward[-(k - delta)] >= n {
                return Some((n - x, m - y));
            }
        }
    }

    None
}
