//! Matrix Market coordinate files for binary matrices

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::matrix::CsrMatrix;

/// Entries reserved up front; the header's count is untrusted
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 20;

/// Reads a binary matrix in Matrix Market coordinate form from `path`.
///
/// With `transpose` set the stored matrix is transposed while reading.
pub fn mm_read<P: AsRef<Path>>(path: P, transpose: bool) -> Result<CsrMatrix> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mat = read_matrix_market(BufReader::new(file), transpose)?;
    debug!(
        path = %path.display(),
        rows = mat.n_rows(),
        cols = mat.n_cols(),
        nnz = mat.nnz(),
        "read matrix"
    );
    Ok(mat)
}

/// Reads a Matrix Market coordinate matrix from any buffered reader.
///
/// The `%%MatrixMarket` banner is optional. Values after the indices are
/// ignored; every listed position is a 1, and a position listed twice cancels.
pub fn read_matrix_market<R: BufRead>(reader: R, transpose: bool) -> Result<CsrMatrix> {
    let mut lines = reader.lines().enumerate().map(|(i, line)| (i + 1, line));
    let mut size: Option<(usize, usize, usize)> = None;

    while let Some((lineno, line)) = lines.next() {
        let line = line?;
        let trimmed = line.trim();
        if lineno == 1 && trimmed.starts_with("%%MatrixMarket") {
            check_banner(trimmed)?;
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }
        let fields = parse_fields(trimmed, lineno)?;
        if fields.len() != 3 {
            return Err(Error::parse(lineno, "expected `rows cols nnz`"));
        }
        size = Some((fields[0], fields[1], fields[2]));
        break;
    }

    let (n_rows, n_cols, nnz) = size.ok_or_else(|| Error::parse(0, "missing size line"))?;
    let mut pairs = Vec::with_capacity(nnz.min(MAX_PREALLOCATED_ENTRIES));
    let mut last_line = 0;

    while pairs.len() < nnz {
        let Some((lineno, line)) = lines.next() else {
            return Err(Error::parse(
                last_line,
                format!("expected {} entries, found {}", nnz, pairs.len()),
            ));
        };
        last_line = lineno;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('%') {
            continue;
        }

        let mut tokens = trimmed.split_whitespace();
        let row = parse_index(tokens.next(), n_rows, lineno)?;
        let col = parse_index(tokens.next(), n_cols, lineno)?;
        pairs.push(if transpose { (col, row) } else { (row, col) });
    }

    if transpose {
        CsrMatrix::from_pairs(n_cols, n_rows, pairs)
    } else {
        CsrMatrix::from_pairs(n_rows, n_cols, pairs)
    }
}

fn check_banner(banner: &str) -> Result<()> {
    let words: Vec<String> = banner.split_whitespace().map(str::to_lowercase).collect();
    let supported = words.len() == 5
        && words[1] == "matrix"
        && words[2] == "coordinate"
        && matches!(words[3].as_str(), "integer" | "pattern" | "real")
        && words[4] == "general";
    if supported {
        Ok(())
    } else {
        Err(Error::parse(1, format!("unsupported banner `{}`", banner)))
    }
}

fn parse_fields(line: &str, lineno: usize) -> Result<Vec<usize>> {
    line.split_whitespace()
        .map(|tok| {
            tok.parse::<usize>()
                .map_err(|_| Error::parse(lineno, format!("invalid number `{}`", tok)))
        })
        .collect()
}

/// Parses a one-indexed coordinate into a zero-based index below `bound`.
fn parse_index(token: Option<&str>, bound: usize, lineno: usize) -> Result<usize> {
    let token = token.ok_or_else(|| Error::parse(lineno, "expected `row col [value]`"))?;
    let index: usize = token
        .parse()
        .map_err(|_| Error::parse(lineno, format!("invalid index `{}`", token)))?;
    if index == 0 || index > bound {
        return Err(Error::parse(
            lineno,
            format!("index {} outside 1..={}", index, bound),
        ));
    }
    Ok(index - 1)
}

impl CsrMatrix {
    /// Writes the matrix in the `integer general` coordinate form.
    pub fn write_matrix_market<W: Write>(&self, w: &mut W) -> Result<()> {
        self.ensure_live()?;
        writeln!(w, "%%MatrixMarket matrix coordinate integer general")?;
        writeln!(w, "{} {} {}", self.n_rows(), self.n_cols(), self.nnz())?;
        for i in 0..self.n_rows() {
            for c in self.row_iter(i) {
                writeln!(w, "{} {} 1", i + 1, c + 1)?;
            }
        }
        Ok(())
    }

    /// Writes the matrix to a Matrix Market file at `path`.
    pub fn mm_write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut w = BufWriter::new(file);
        self.write_matrix_market(&mut w)?;
        w.flush()?;
        Ok(())
    }
}
