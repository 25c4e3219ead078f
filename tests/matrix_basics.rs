//! Basic tests for CSR construction, compression and layout changes

use gf2csr::{BitMatrix, CsrMatrix, DenseBinaryMatrix, Error, Permutation};

/// Create a tridiagonal binary matrix
fn create_tridiagonal_matrix(n: usize) -> CsrMatrix {
    let mut m = CsrMatrix::init(n, n, 3 * n).unwrap();
    for i in 0..n {
        let lo = i.saturating_sub(1);
        let hi = (i + 1).min(n - 1);
        let cols: Vec<usize> = (lo..=hi).collect();
        m.push_row(&cols).unwrap();
    }
    m
}

#[test]
fn test_incremental_build() {
    let m = create_tridiagonal_matrix(5);
    assert_eq!(m.n_rows(), 5);
    assert_eq!(m.n_cols(), 5);
    assert_eq!(m.nnz(), 13);
    assert_eq!(m.nzmax(), 15);
    assert_eq!(m.row(0), &[0, 1]);
    assert_eq!(m.row(2), &[1, 2, 3]);
    assert_eq!(m.row(4), &[3, 4]);
    assert!(m.is_compressed());
    assert_eq!(m.max_row_weight().unwrap(), 3);
}

#[test]
fn test_push_row_limits() {
    let mut m = CsrMatrix::init(2, 3, 2).unwrap();
    m.push_row(&[0]).unwrap();
    assert!(matches!(
        m.push_row(&[1, 2]),
        Err(Error::Allocation { requested: 3, capacity: 2 })
    ));
    assert!(matches!(
        m.push_row(&[3]),
        Err(Error::IndexOutOfRange { index: 3, bound: 3 })
    ));

    m.reserve(1).unwrap();
    m.push_row(&[1, 2]).unwrap();
    assert!(matches!(m.push_row(&[]), Err(Error::DimensionMismatch { .. })));
    assert_eq!(m.nnz(), 3);
}

#[test]
fn test_compress_merges_by_parity() {
    let mut m = CsrMatrix::init(3, 4, 10).unwrap();
    m.push_row(&[3, 1, 3]).unwrap();
    m.push_row(&[2, 2]).unwrap();
    m.push_row(&[0, 0, 0, 1]).unwrap();
    assert!(!m.is_compressed());

    m.compress().unwrap();
    assert!(m.is_compressed());
    assert_eq!(m.row(0), &[1]);
    assert!(m.row(1).is_empty());
    assert_eq!(m.row(2), &[0, 1]);
    assert_eq!(m.nnz(), 3);

    let before = m.clone();
    m.compress().unwrap();
    assert_eq!(m, before);
}

#[test]
fn test_transpose_involution() {
    let m = CsrMatrix::from_pairs(3, 5, [(0, 4), (1, 0), (1, 2), (2, 2), (2, 3)]).unwrap();
    let t = m.transpose().unwrap();
    assert_eq!((t.n_rows(), t.n_cols()), (5, 3));
    assert_eq!(t.row(2), &[1, 2]);
    assert_eq!(t.transpose().unwrap(), m);
}

#[test]
fn test_transpose_keeps_duplicates_of_uncompressed_source() {
    let mut m = CsrMatrix::init(2, 3, 5).unwrap();
    m.push_row(&[2, 0, 2]).unwrap();
    m.push_row(&[1, 2]).unwrap();
    assert!(!m.is_compressed());

    let t = m.transpose().unwrap();
    assert!(!t.is_compressed());
    assert_eq!(t.nnz(), 5);
    assert_eq!(t.row(2), &[0, 0, 1]);
    assert_eq!(t.to_dense().unwrap(), m.to_dense().unwrap().transpose());

    // A compressed source gives a compressed transpose
    let mut c = m.clone();
    c.compress().unwrap();
    assert!(c.transpose().unwrap().is_compressed());
}

#[test]
fn test_row_and_column_permutations() {
    let m = create_tridiagonal_matrix(4);
    let rev = Permutation::from_vec(vec![3, 2, 1, 0]).unwrap();

    let rows = m.apply_perm(&rev).unwrap();
    assert_eq!(rows.row(0), m.row(3));
    assert_eq!(rows.row(3), m.row(0));
    assert_eq!(rows.nnz(), m.nnz());

    let cols = m.apply_col_perm(&rev).unwrap();
    assert_eq!(cols.row(0), &[2, 3]);
    assert_eq!(cols.nnz(), m.nnz());

    // Relabeling by the inverse undoes the relabeling
    assert_eq!(cols.apply_col_perm(&rev.inverse()).unwrap(), m);

    assert!(matches!(
        m.apply_col_perm(&Permutation::identity(5)),
        Err(Error::DimensionMismatch { .. })
    ));
}

#[test]
fn test_dense_bridge() {
    let dense = BitMatrix::from_rows(&[[0u8, 0, 1, 1], [0, 0, 0, 0], [1, 0, 0, 1]]);
    let sparse = CsrMatrix::from_dense(&dense);
    assert_eq!(sparse.nnz(), dense.weight());
    assert_eq!(sparse.row(0), &[2, 3]);
    assert!(sparse.row(1).is_empty());
    assert_eq!(sparse.to_dense().unwrap(), dense);

    // Wide rows spanning several words
    let mut wide = BitMatrix::zeros(2, 130);
    wide.set(0, 0, true);
    wide.set(0, 64, true);
    wide.set(1, 129, true);
    let sparse = CsrMatrix::from_dense(&wide);
    assert_eq!(sparse.row(0), &[0, 64]);
    assert_eq!(sparse.row(1), &[129]);
}

#[test]
fn test_released_handle() {
    let mut m = create_tridiagonal_matrix(3);
    m.release().unwrap();
    assert!(m.is_released());

    assert!(matches!(m.release(), Err(Error::InvalidHandle)));
    assert!(matches!(m.compress(), Err(Error::InvalidHandle)));
    assert!(matches!(m.transpose(), Err(Error::InvalidHandle)));
    assert!(matches!(m.max_row_weight(), Err(Error::InvalidHandle)));
    assert!(matches!(m.to_dense(), Err(Error::InvalidHandle)));
    assert!(matches!(m.push_row(&[0]), Err(Error::InvalidHandle)));
    let mut out = Vec::new();
    assert!(matches!(m.write_out(&mut out), Err(Error::InvalidHandle)));
}

#[test]
fn test_listing_output() {
    let m = CsrMatrix::from_pairs(2, 3, [(0, 0), (0, 2), (1, 1)]).unwrap();

    let mut out = Vec::new();
    m.write_out(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "# binary CSR matrix (2 x 3) in Compressed Row Form: nzmax= 3, nz=3\n1: 1 3\n2: 2\n"
    );

    let mut grid = Vec::new();
    m.write_print(&mut grid, "M").unwrap();
    assert_eq!(String::from_utf8(grid).unwrap(), "M\n[1.1]\n[.1.]\n");
}

#[test]
fn test_syndromes() {
    let h = create_tridiagonal_matrix(4);
    let e = gf2csr::BitVec::from_ones(4, [1]);
    let s = h.syndrome(&e).unwrap();
    assert_eq!(s.iter_ones().collect::<Vec<_>>(), vec![0, 1, 2]);
    assert_eq!(h.syndrome_weight(&e).unwrap(), 3);
    assert!(h.sparse_syndrome_non_zero(&[1]).unwrap());

    // Rows 0 and 1 overlap {0, 1} twice, row 2 = {1, 2, 3} once
    assert!(h.sparse_syndrome_non_zero(&[0, 1]).unwrap());
    assert!(!h.sparse_syndrome_non_zero(&[]).unwrap());
    assert!(matches!(
        h.syndrome(&gf2csr::BitVec::zeros(3)),
        Err(Error::DimensionMismatch { .. })
    ));
}
