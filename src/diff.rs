//! Round-trip equivalence checking between two markup strings.
//!
//! The codec's guarantee is semantic, not textual: markup that passes
//! through deserialize, normalize, and serialize comes back with the same
//! content but not necessarily the same bytes. This module diffs the two
//! strings and decides whether the differences are cosmetic (formatting
//! whitespace, repairs the normalizer is allowed to make) or a real loss
//! of author content. Callers gate saves on the `warn` flag.
//!
//! The decision errs toward warning. A deletion that matches no tolerance
//! rule warns even when it is probably harmless; a silent content loss is
//! the one unacceptable outcome.

/// Edit distance beyond which the diff gives up and reports the changed
/// region as one replacement. Bounds both time and trace memory.
const MYERS_BUDGET: usize = 1024;

/// Result of a semantic comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffOutcome {
    /// The full text with deletions wrapped in `[-..-]` and insertions
    /// in `[+..+]`.
    pub annotated: String,
    /// True when some deletion matched no tolerance rule.
    pub warn: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Equal,
    Delete,
    Insert,
}

#[derive(Debug)]
struct Run {
    op: Op,
    text: String,
}

/// Compare pre-edit and post-round-trip markup.
///
/// Insertions never warn: the serializer may add structure (a `tbody`
/// wrapper, a synthesized grid cell) without losing anything. Deletions
/// warn unless covered by a tolerance rule:
///
/// - whitespace between two tags,
/// - a `tbody` open or close tag where the round trip produced `thead`,
/// - a heading level above the supported band (`h4`/`h5`/`h6`) demoted
///   to `h3`.
///
/// The tag rewrites are handled by canonicalizing both strings before
/// the warn-side diff, so the decision does not depend on how the edit
/// script happens to align the differing characters.
pub fn semantic_diff(from: &str, to: &str) -> DiffOutcome {
    let annotated = render_annotated(&diff_runs(from, to));
    let warn = has_disallowed_deletion(&diff_runs(&canonicalize(from), &canonicalize(to)));
    DiffOutcome { annotated, warn }
}

/// Rewrite tag spellings the normalizer is allowed to change, so they
/// compare equal.
fn canonicalize(markup: &str) -> String {
    markup
        .replace("<tbody", "<thead")
        .replace("</tbody", "</thead")
        .replace("<h4", "<h3")
        .replace("<h5", "<h3")
        .replace("<h6", "<h3")
        .replace("</h4", "</h3")
        .replace("</h5", "</h3")
        .replace("</h6", "</h3")
}

fn has_disallowed_deletion(runs: &[Run]) -> bool {
    runs.iter()
        .enumerate()
        .any(|(index, run)| run.op == Op::Delete && !deletion_is_tolerable(runs, index))
}

/// Whitespace dropped between two tags (or at a document edge) carries
/// no content.
fn deletion_is_tolerable(runs: &[Run], index: usize) -> bool {
    if !runs[index].text.chars().all(|c| c.is_ascii_whitespace()) {
        return false;
    }
    let before = runs[..index]
        .iter()
        .rev()
        .find(|run| run.op == Op::Equal)
        .map(|run| run.text.as_str());
    let after = runs[index + 1..]
        .iter()
        .find(|run| run.op == Op::Equal)
        .map(|run| run.text.as_str());
    before.is_none_or(|text| text.ends_with('>'))
        && after.is_none_or(|text| text.starts_with('<'))
}

fn render_annotated(runs: &[Run]) -> String {
    let mut out = String::new();
    for run in runs {
        match run.op {
            Op::Equal => out.push_str(&run.text),
            Op::Delete => {
                out.push_str("[-");
                out.push_str(&run.text);
                out.push_str("-]");
            }
            Op::Insert => {
                out.push_str("[+");
                out.push_str(&run.text);
                out.push_str("+]");
            }
        }
    }
    out
}

/// Character-level edit script between two strings, coalesced into runs.
fn diff_runs(from: &str, to: &str) -> Vec<Run> {
    let a: Vec<char> = from.chars().collect();
    let b: Vec<char> = to.chars().collect();

    let prefix = a
        .iter()
        .zip(b.iter())
        .take_while(|(x, y)| x == y)
        .count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();
    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut runs = Vec::new();
    if prefix > 0 {
        push_run(&mut runs, Op::Equal, a[..prefix].iter().collect());
    }
    match (mid_a.is_empty(), mid_b.is_empty()) {
        (true, true) => {}
        (false, true) => push_run(&mut runs, Op::Delete, mid_a.iter().collect()),
        (true, false) => push_run(&mut runs, Op::Insert, mid_b.iter().collect()),
        (false, false) => match myers(mid_a, mid_b) {
            Some(ops) => coalesce(&mut runs, &ops),
            None => {
                // Too far apart to align affordably; report the whole
                // region as replaced.
                push_run(&mut runs, Op::Delete, mid_a.iter().collect());
                push_run(&mut runs, Op::Insert, mid_b.iter().collect());
            }
        },
    }
    if suffix > 0 {
        push_run(&mut runs, Op::Equal, a[a.len() - suffix..].iter().collect());
    }
    runs
}

fn push_run(runs: &mut Vec<Run>, op: Op, text: String) {
    if text.is_empty() {
        return;
    }
    if let Some(last) = runs.last_mut() {
        if last.op == op {
            last.text.push_str(&text);
            return;
        }
    }
    runs.push(Run { op, text });
}

fn coalesce(runs: &mut Vec<Run>, ops: &[CharOp]) {
    for op in ops {
        match op {
            CharOp::Keep(c) => push_char(runs, Op::Equal, *c),
            CharOp::Delete(c) => push_char(runs, Op::Delete, *c),
            CharOp::Insert(c) => push_char(runs, Op::Insert, *c),
        }
    }
}

fn push_char(runs: &mut Vec<Run>, op: Op, c: char) {
    if let Some(last) = runs.last_mut() {
        if last.op == op {
            last.text.push(c);
            return;
        }
    }
    runs.push(Run {
        op,
        text: c.to_string(),
    });
}

#[derive(Debug, Clone, Copy)]
enum CharOp {
    Keep(char),
    Delete(char),
    Insert(char),
}

/// Greedy shortest-edit-script search.
///
/// Returns `None` when the edit distance exceeds [`MYERS_BUDGET`]. The
/// trace keeps one window per depth (the reachable diagonal band), so
/// memory is bounded by the budget rather than the input length.
fn myers(a: &[char], b: &[char]) -> Option<Vec<CharOp>> {
    let n = a.len();
    let m = b.len();
    let max = n + m;
    let offset = max as isize;
    let mut v = vec![0usize; 2 * max + 1];
    let mut trace: Vec<Vec<usize>> = Vec::new();
    let mut found = None;

    'search: for d in 0..=max {
        if d > MYERS_BUDGET {
            return None;
        }
        let d_i = d as isize;
        trace.push(v[(offset - d_i) as usize..=(offset + d_i) as usize].to_vec());
        let mut k = -d_i;
        while k <= d_i {
            let ki = (k + offset) as usize;
            let mut x = if k == -d_i || (k != d_i && v[ki - 1] < v[ki + 1]) {
                v[ki + 1]
            } else {
                v[ki - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            while x < n && y < m && a[x] == b[y] {
                x += 1;
                y += 1;
            }
            v[ki] = x;
            if x >= n && y >= m {
                found = Some(d);
                break 'search;
            }
            k += 2;
        }
    }

    let found = found?;
    let mut ops: Vec<CharOp> = Vec::new();
    let mut x = n;
    let mut y = m;
    for d in (1..=found).rev() {
        let d_i = d as isize;
        let vd = &trace[d];
        let at = |k: isize| vd[(k + d_i) as usize];
        let k = x as isize - y as isize;
        let prev_k = if k == -d_i || (k != d_i && at(k - 1) < at(k + 1)) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = at(prev_k);
        let prev_y = (prev_x as isize - prev_k) as usize;
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            ops.push(CharOp::Keep(a[x]));
        }
        if x == prev_x {
            y -= 1;
            ops.push(CharOp::Insert(b[y]));
        } else {
            x -= 1;
            ops.push(CharOp::Delete(a[x]));
        }
        debug_assert_eq!(x, prev_x);
        debug_assert_eq!(y, prev_y);
    }
    while x > 0 {
        x -= 1;
        y -= 1;
        ops.push(CharOp::Keep(a[x]));
    }
    ops.reverse();
    Some(ops)
}
