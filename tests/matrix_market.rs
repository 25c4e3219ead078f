//! Reading and writing Matrix Market files

use std::path::PathBuf;

use gf2csr::{mm_read, read_matrix_market, CsrMatrix, Error};

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data").join(name)
}

#[test]
fn test_identity_pattern_from_text() {
    let m = read_matrix_market("2 2 2\n1 1\n2 2\n".as_bytes(), false).unwrap();
    assert_eq!((m.n_rows(), m.n_cols()), (2, 2));
    assert_eq!(m.nnz(), 2);
    assert_eq!(m.row(0), &[0]);
    assert_eq!(m.row(1), &[1]);
}

#[test]
fn test_read_hamming_file() {
    let h = mm_read(data("hamming7.mtx"), false).unwrap();
    assert_eq!((h.n_rows(), h.n_cols()), (3, 7));
    assert_eq!(h.nnz(), 12);
    assert_eq!(h.row(0), &[0, 2, 4, 6]);
    assert_eq!(h.row(2), &[3, 4, 5, 6]);
    assert!(h.is_compressed());
    assert_eq!(h.max_row_weight().unwrap(), 4);

    let t = mm_read(data("hamming7.mtx"), true).unwrap();
    assert_eq!(t, h.transpose().unwrap());
}

#[test]
fn test_read_pattern_file() {
    let rep = mm_read(data("rep5.mtx"), false).unwrap();
    assert_eq!((rep.n_rows(), rep.n_cols()), (4, 5));
    assert_eq!(rep.row(3), &[3, 4]);
}

#[test]
fn test_missing_file_reports_path() {
    let path = data("does_not_exist.mtx");
    match mm_read(&path, false) {
        Err(Error::Io { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected an I/O error, got {:?}", other),
    }
}

#[test]
fn test_malformed_entry_line_number() {
    let text = "%%MatrixMarket matrix coordinate pattern general\n3 3 2\n1 1\n1 4\n";
    match read_matrix_market(text.as_bytes(), false) {
        Err(Error::Parse { line, .. }) => assert_eq!(line, 4),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_write_and_read_back_file() {
    let m = CsrMatrix::from_pairs(3, 3, [(0, 2), (1, 0), (1, 1), (2, 2)]).unwrap();
    let path = std::env::temp_dir().join(format!("gf2csr-mm-{}.mtx", std::process::id()));

    m.mm_write(&path).unwrap();
    let back = mm_read(&path, false).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(back, m);
}
