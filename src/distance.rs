//! Distance searches for classical and CSS codes
//!
//! # Random window
//!
//! An upper bound from random information sets. Every step draws a random
//! column order, completes the Gauss–Jordan reduction of `H` in that order
//! and reads off one kernel vector per non-pivot column:
//!
//! ```text
//!  p     p  p          pivot columns marked with p
//! [1  a1       b1 ]   ->   [a1  1  a2 a3  0]
//! [   a2 1     b2 ]        [b1  0  b2 b3  1]
//! [   a3    1  b3 ]
//! ```
//!
//! The lightest non-trivial vector seen so far bounds the distance from above.
//!
//! # Connected cluster
//!
//! An exhaustive search for codewords up to a given weight. The support of a
//! codeword is grown one column at a time from its smallest position; each
//! new column is taken from the first check the partial vector violates, so
//! only clusters connected through the Tanner graph are visited. Weights are
//! tried in increasing order, so the first codeword found has minimum weight.

use std::borrow::Cow;

use rand::Rng;
use tracing::{debug, instrument, trace};

use crate::error::{Error, Result};
use crate::matrix::{CsrMatrix, Permutation};
use crate::params::{CodeContext, CodeMode, CodeParams, METHOD_CLUSTER, METHOD_RANDOM_WINDOW};

/// Options of a random-window run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RwOptions {
    /// Number of random information sets
    pub steps: usize,
    /// Stop as soon as a codeword of weight at most `wmin` is found
    pub wmin: usize,
    /// Only codewords lighter than `wmax` are of interest; 0 removes the bound
    pub wmax: usize,
}

impl Default for RwOptions {
    fn default() -> Self {
        Self {
            steps: 1,
            wmin: 1,
            wmax: 5,
        }
    }
}

impl From<&CodeParams> for RwOptions {
    fn from(p: &CodeParams) -> Self {
        Self {
            steps: p.steps,
            wmin: p.wmin,
            wmax: p.wmax,
        }
    }
}

/// Outcome of [`random_window_distance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceBound {
    /// All steps ran; the distance is at most this weight
    UpperBound(usize),
    /// Stopped early on a codeword of weight at most `wmin`
    EarlyTermination(usize),
    /// No non-trivial codeword below `wmax` was found
    NotFound,
}

impl DistanceBound {
    pub fn weight(&self) -> Option<usize> {
        match *self {
            DistanceBound::UpperBound(w) | DistanceBound::EarlyTermination(w) => Some(w),
            DistanceBound::NotFound => None,
        }
    }
}

/// Runs the random-window search on the code with parity checks `h`.
///
/// For a classical code pass `l = None`: every non-zero kernel vector is a
/// codeword. For a CSS code pass the logical operators; a kernel vector
/// counts only if it anticommutes with one of them (`L·e ≠ 0`).
#[instrument(level = "debug", skip_all, fields(n = h.n_cols(), steps = opts.steps))]
pub fn random_window_distance<R: Rng + ?Sized>(
    h: &CsrMatrix,
    l: Option<&CsrMatrix>,
    opts: &RwOptions,
    rng: &mut R,
) -> Result<DistanceBound> {
    let n = h.n_cols();
    let bound = if opts.wmax > 0 { opts.wmax } else { n + 1 };
    let mut min_w = bound;

    let mut mh = h.to_dense()?;
    let mut ee = Vec::with_capacity(n);
    let mut is_pivot = vec![false; n];

    for step in 0..opts.steps.max(1) {
        let perm = Permutation::random(n, rng);

        // Full row echelon form of H in the order given by perm
        let mut pivs = Vec::new();
        for &col in perm.as_slice() {
            if mh.gauss_one(col, pivs.len()) {
                pivs.push(col);
            }
        }
        is_pivot.fill(false);
        for &p in &pivs {
            is_pivot[p] = true;
        }

        let mht = mh.transpose();
        for col in (0..n).filter(|&c| !is_pivot[c]) {
            ee.clear();
            ee.push(col);
            let mut pos = 0;
            while ee.len() < min_w {
                let Some(j) = mht.next_one(col, pos) else {
                    break;
                };
                ee.push(pivs[j]);
                pos = j + 1;
            }
            if ee.len() >= min_w {
                continue;
            }

            ee.sort_unstable();
            debug_assert!(!h.sparse_syndrome_non_zero(&ee)?);

            let non_trivial = match l {
                Some(l) => l.sparse_syndrome_non_zero(&ee)?,
                None => true,
            };
            if non_trivial {
                min_w = ee.len();
                trace!(step, weight = min_w, "found codeword");
                if min_w <= opts.wmin {
                    debug!(weight = min_w, "early termination");
                    return Ok(DistanceBound::EarlyTermination(min_w));
                }
            }
        }

        if step % 1000 == 999 {
            debug!(round = step + 1, min_w, "random window progress");
        }
    }

    if min_w == bound {
        Ok(DistanceBound::NotFound)
    } else {
        Ok(DistanceBound::UpperBound(min_w))
    }
}

/// Options of a connected-cluster run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterOptions {
    /// Largest codeword weight searched; 0 searches up to the code length
    pub wmax: usize,
    /// Only grow clusters whose smallest position is this column
    pub start: Option<usize>,
}

impl Default for ClusterOptions {
    fn default() -> Self {
        Self {
            wmax: 5,
            start: None,
        }
    }
}

impl From<&CodeParams> for ClusterOptions {
    fn from(p: &CodeParams) -> Self {
        Self {
            wmax: p.wmax,
            start: usize::try_from(p.start).ok(),
        }
    }
}

/// Outcome of [`cluster_distance`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClusterBound {
    /// A non-trivial codeword of minimum weight, as sorted positions
    Found(Vec<usize>),
    /// No non-trivial codeword of weight up to this value exists
    NoneUpTo(usize),
}

impl ClusterBound {
    /// Smallest weight a non-trivial codeword can have
    pub fn lower_bound(&self) -> usize {
        match self {
            ClusterBound::Found(cw) => cw.len(),
            ClusterBound::NoneUpTo(w) => w + 1,
        }
    }
}

/// Runs the connected-cluster search on the code with parity checks `h`.
///
/// `l` plays the same role as in [`random_window_distance`]. With a `start`
/// column only clusters whose smallest position is `start` are grown, so
/// the result is then a statement about those clusters alone.
#[instrument(level = "debug", skip_all, fields(n = h.n_cols(), wmax = opts.wmax))]
pub fn cluster_distance(h: &CsrMatrix, l: Option<&CsrMatrix>, opts: &ClusterOptions) -> Result<ClusterBound> {
    let n = h.n_cols();
    if let Some(start) = opts.start {
        if start >= n {
            return Err(Error::InvalidParameter {
                arg: format!("start={}", start),
                reason: format!("must be below the code length {}", n),
            });
        }
    }
    let wmax = if opts.wmax == 0 { n } else { opts.wmax.min(n) };

    let h = compressed(h)?;
    let ht = h.transpose()?;
    let mut search = ClusterSearch {
        h: &h,
        ht: &ht,
        l,
        max_col_weight: ht.max_row_weight()?,
        err: Vec::with_capacity(wmax),
        syn: vec![Vec::new(); wmax + 1],
        min_syndrome: vec![usize::MAX; wmax + 1],
    };

    for w in 1..=wmax {
        let columns = match opts.start {
            Some(start) => start..=start,
            None => 0..=n - w,
        };
        trace!(w, "searching clusters");
        for first in columns {
            if search.from_column(first, w)? {
                let cw = search.err.clone();
                debug!(weight = cw.len(), "cluster codeword found");
                return Ok(ClusterBound::Found(cw));
            }
        }
    }

    for (w, &s) in search.min_syndrome.iter().enumerate().skip(1) {
        if s != usize::MAX {
            debug!(w, min_syndrome_weight = s, "cluster search");
        }
    }
    Ok(ClusterBound::NoneUpTo(wmax))
}

fn compressed(m: &CsrMatrix) -> Result<Cow<'_, CsrMatrix>> {
    if m.is_compressed() {
        return Ok(Cow::Borrowed(m));
    }
    let mut owned = m.clone();
    owned.compress()?;
    Ok(Cow::Owned(owned))
}

/// State of one depth-first cluster search
struct ClusterSearch<'a> {
    h: &'a CsrMatrix,
    /// Rows are the checks touching each column
    ht: &'a CsrMatrix,
    l: Option<&'a CsrMatrix>,
    max_col_weight: usize,
    /// Current support, sorted
    err: Vec<usize>,
    /// `syn[k]` is the syndrome of the first `k` columns added
    syn: Vec<Vec<usize>>,
    /// Lightest syndrome seen per support size
    min_syndrome: Vec<usize>,
}

impl ClusterSearch<'_> {
    /// Searches weight-`limit` codewords whose smallest position is `first`.
    fn from_column(&mut self, first: usize, limit: usize) -> Result<bool> {
        self.err.clear();
        self.err.push(first);
        let swei = self.extend_syndrome(0, first);
        if limit == 1 {
            return Ok(swei == 0 && self.is_non_trivial()?);
        }
        if swei == 0 {
            return Ok(false);
        }
        self.grow(first, limit)
    }

    fn grow(&mut self, first: usize, limit: usize) -> Result<bool> {
        let depth = self.err.len();
        let h = self.h;
        // First violated check; one of its columns must join the support
        let row = self.syn[depth][0];

        for &col in h.row(row) {
            if col <= first {
                continue;
            }
            let Err(pos) = self.err.binary_search(&col) else {
                continue;
            };
            self.err.insert(pos, col);
            let swei = self.extend_syndrome(depth, col);

            if self.err.len() < limit {
                // Each further column clears at most max_col_weight checks
                if swei > 0 && swei <= (limit - self.err.len()) * self.max_col_weight && self.grow(first, limit)? {
                    return Ok(true);
                }
            } else if swei == 0 && self.is_non_trivial()? {
                return Ok(true);
            }
            self.err.remove(pos);
        }
        Ok(false)
    }

    /// Sets `syn[depth + 1] = syn[depth] ^ checks(col)` and returns its weight.
    fn extend_syndrome(&mut self, depth: usize, col: usize) -> usize {
        let (lower, upper) = self.syn.split_at_mut(depth + 1);
        let out = &mut upper[0];
        symmetric_difference(out, &lower[depth], self.ht.row(col));
        let weight = out.len();
        let seen = &mut self.min_syndrome[depth + 1];
        *seen = (*seen).min(weight);
        weight
    }

    fn is_non_trivial(&self) -> Result<bool> {
        match self.l {
            Some(l) => l.sparse_syndrome_non_zero(&self.err),
            None => Ok(true),
        }
    }
}

/// Merges two ascending index lists, dropping the indices they share.
fn symmetric_difference(out: &mut Vec<usize>, x: &[usize], y: &[usize]) {
    out.clear();
    let (mut p, mut q) = (0, 0);
    while p < x.len() && q < y.len() {
        match x[p].cmp(&y[q]) {
            std::cmp::Ordering::Less => {
                out.push(x[p]);
                p += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(y[q]);
                q += 1;
            }
            std::cmp::Ordering::Equal => {
                p += 1;
                q += 1;
            }
        }
    }
    out.extend_from_slice(&x[p..]);
    out.extend_from_slice(&y[q..]);
}

/// Results of the searches selected by [`CodeParams::method`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceReport {
    pub random_window: Option<DistanceBound>,
    pub cluster: Option<ClusterBound>,
}

impl DistanceReport {
    /// Smallest weight a non-trivial codeword can have, when known
    pub fn lower(&self) -> Option<usize> {
        self.cluster.as_ref().map(ClusterBound::lower_bound)
    }

    /// Weight of the lightest non-trivial codeword found
    pub fn upper(&self) -> Option<usize> {
        let rw = self.random_window.and_then(|b| b.weight());
        let cc = match &self.cluster {
            Some(ClusterBound::Found(cw)) => Some(cw.len()),
            _ => None,
        };
        match (rw, cc) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Both bounds are known and agree
    pub fn is_exact(&self) -> bool {
        matches!((self.lower(), self.upper()), (Some(lo), Some(hi)) if lo >= hi)
    }
}

/// Runs the searches selected by the context's `method` bitmap.
///
/// When both run, the random window goes first and the cluster search only
/// looks below the weight it found.
pub fn estimate_distance<R: Rng + ?Sized>(ctx: &CodeContext, rng: &mut R) -> Result<DistanceReport> {
    let l = match ctx.mode {
        CodeMode::Classical => None,
        CodeMode::Css => ctx.l.as_ref(),
    };
    let method = ctx.params.method;

    let mut report = DistanceReport {
        random_window: None,
        cluster: None,
    };
    if method & METHOD_RANDOM_WINDOW != 0 {
        report.random_window = Some(random_window_distance(&ctx.h, l, &RwOptions::from(&ctx.params), rng)?);
    }
    if method & METHOD_CLUSTER != 0 {
        let mut opts = ClusterOptions::from(&ctx.params);
        if let Some(upper) = report.upper() {
            let below = upper - 1;
            opts.wmax = if opts.wmax == 0 { below } else { opts.wmax.min(below) };
            if below == 0 {
                report.cluster = Some(ClusterBound::NoneUpTo(0));
                return Ok(report);
            }
        }
        report.cluster = Some(cluster_distance(&ctx.h, l, &opts)?);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn repetition(n: usize) -> CsrMatrix {
        CsrMatrix::from_pairs(n - 1, n, (0..n - 1).flat_map(|i| [(i, i), (i, i + 1)])).unwrap()
    }

    #[test]
    fn test_repetition_code() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RwOptions {
            steps: 3,
            wmin: 1,
            wmax: 0,
        };
        let d = random_window_distance(&repetition(5), None, &opts, &mut rng).unwrap();
        assert_eq!(d, DistanceBound::UpperBound(5));
    }

    #[test]
    fn test_nothing_below_wmax() {
        let mut rng = StdRng::seed_from_u64(1);
        let opts = RwOptions {
            steps: 3,
            wmin: 1,
            wmax: 5,
        };
        let d = random_window_distance(&repetition(5), None, &opts, &mut rng).unwrap();
        assert_eq!(d, DistanceBound::NotFound);
        assert_eq!(d.weight(), None);
    }

    #[test]
    fn test_early_termination() {
        // Column 2 is never checked, so e_2 is a weight-one codeword
        let h = CsrMatrix::from_pairs(2, 3, [(0, 0), (0, 1), (1, 1)]).unwrap();
        let mut rng = StdRng::seed_from_u64(5);
        let opts = RwOptions {
            steps: 10,
            wmin: 1,
            wmax: 0,
        };
        let d = random_window_distance(&h, None, &opts, &mut rng).unwrap();
        assert_eq!(d, DistanceBound::EarlyTermination(1));
    }

    fn hamming() -> CsrMatrix {
        // Column j holds the binary digits of j + 1
        let pairs = (0..7usize).flat_map(|j| {
            (0..3usize)
                .filter(move |&r| ((j + 1) >> r) & 1 == 1)
                .map(move |r| (r, j))
        });
        CsrMatrix::from_pairs(3, 7, pairs).unwrap()
    }

    #[test]
    fn test_cluster_finds_minimum_weight() {
        let found = cluster_distance(&hamming(), None, &ClusterOptions::default()).unwrap();
        assert_eq!(found, ClusterBound::Found(vec![0, 1, 2]));
        assert_eq!(found.lower_bound(), 3);

        let rep = cluster_distance(&repetition(5), None, &ClusterOptions { wmax: 0, start: None }).unwrap();
        assert_eq!(rep, ClusterBound::Found(vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_cluster_exhausts_below_distance() {
        let opts = ClusterOptions { wmax: 2, start: None };
        let none = cluster_distance(&hamming(), None, &opts).unwrap();
        assert_eq!(none, ClusterBound::NoneUpTo(2));
        assert_eq!(none.lower_bound(), 3);
    }

    #[test]
    fn test_cluster_start_column() {
        // Columns 4, 5, 6 hold 5, 6, 7, which never cancel
        let opts = ClusterOptions { wmax: 3, start: Some(4) };
        assert_eq!(cluster_distance(&hamming(), None, &opts).unwrap(), ClusterBound::NoneUpTo(3));

        let opts = ClusterOptions { wmax: 3, start: Some(1) };
        assert_eq!(
            cluster_distance(&hamming(), None, &opts).unwrap(),
            ClusterBound::Found(vec![1, 3, 5])
        );

        let opts = ClusterOptions { wmax: 3, start: Some(7) };
        assert!(matches!(
            cluster_distance(&hamming(), None, &opts),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_cluster_skips_trivial_codewords() {
        // Steane code: Hx = Hz = Hamming checks, Lx = all ones
        let l = CsrMatrix::from_pairs(1, 7, (0..7).map(|j| (0, j))).unwrap();
        let opts = ClusterOptions { wmax: 7, start: None };
        let cw = match cluster_distance(&hamming(), Some(&l), &opts).unwrap() {
            ClusterBound::Found(cw) => cw,
            other => panic!("expected a codeword, got {:?}", other),
        };
        assert_eq!(cw.len(), 3);
        assert!(l.sparse_syndrome_non_zero(&cw).unwrap());

        // Only codewords through column 6 count; [0, 1, 2] and [0, 3, 4] are passed over
        let l6 = CsrMatrix::from_pairs(1, 7, [(0, 6)]).unwrap();
        assert_eq!(
            cluster_distance(&hamming(), Some(&l6), &opts).unwrap(),
            ClusterBound::Found(vec![0, 5, 6])
        );
    }

    #[test]
    fn test_report_bounds() {
        let interval = DistanceReport {
            random_window: Some(DistanceBound::UpperBound(7)),
            cluster: Some(ClusterBound::NoneUpTo(4)),
        };
        assert_eq!((interval.lower(), interval.upper()), (Some(5), Some(7)));
        assert!(!interval.is_exact());

        let closed = DistanceReport {
            random_window: Some(DistanceBound::UpperBound(5)),
            cluster: Some(ClusterBound::NoneUpTo(4)),
        };
        assert!(closed.is_exact());

        let rw_only = DistanceReport {
            random_window: Some(DistanceBound::NotFound),
            cluster: None,
        };
        assert_eq!((rw_only.lower(), rw_only.upper()), (None, None));
    }

    #[test]
    fn test_full_rank_has_no_codewords() {
        let mut rng = StdRng::seed_from_u64(2);
        let opts = RwOptions {
            steps: 2,
            wmin: 1,
            wmax: 0,
        };
        let d = random_window_distance(&CsrMatrix::identity(4), None, &opts, &mut rng).unwrap();
        assert_eq!(d, DistanceBound::NotFound);
    }
}
