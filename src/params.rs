//! Run parameters and the loaded code they describe
//!
//! Parameters arrive as `key=value` words, mirroring the command line of the
//! distance driver. [`CodeContext::load`] then reads the matrices they name
//! and validates them as a classical or CSS code.

use std::path::PathBuf;
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::error::{Error, Result};
use crate::linalg::lx_for_css_code;
use crate::matrix::{mm_read, CsrMatrix};
use crate::multiply::csr_csr_mul_non_zero;

/// Usage text printed by the driver on `-h` / `--help`.
pub const USAGE: &str = "\
gf2csr: distance of a classical or quantum CSS code
\tusage: gf2csr parameter=value [...]

   Method:
\tmethod=[int]: bitmap for the method used (1)
\t\t1: random window (RW) algorithm. Options:
\t\t   steps=[int]: how many information sets to use (1)
\t\t   wmin=[int]:  minimum distance of interest (1)
\t\t   wmax=[int]:  only look for codewords below this weight, 0 for any (5)
\t\t2: connected cluster (CC) algorithm, exhaustive up to wmax. Options:
\t\t   wmax=[int]:  largest cluster weight, 0 for the code length (5)
\t\t   start=[int]: only clusters starting at this column, -1 for all (-1)
\t\t3: both; RW runs first and caps the CC search below its bound

   General parameters:
\tfinH=[str]: parity check matrix Hx
\tfinG=[str]: matrix Hz (quantum CSS code only)
\tfinL=[str]: matrix Lx (quantum CSS code only)
\t\t Either L=Lx or G=Hz matrix is required for a quantum CSS code
\tfin=[str]:  base name for input files (\"try\")
\t\t sets finH->\"${fin}Z.mtx\" finG->\"${fin}X.mtx\"
\tcss=[int]:  only 1 (CSS) is supported (1)
\tseed=[int]: rng seed, 0 for a seed from the OS (0)
\tdebug=[int]: bitmap of diagnostics (3)
\t\t first position assigns, later ones are XOR-ed, 0 clears
";

/// Whether the code is a single classical code or a CSS pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeMode {
    Classical,
    Css,
}

/// Random-window search.
pub const METHOD_RANDOM_WINDOW: u32 = 1;
/// Connected-cluster search.
pub const METHOD_CLUSTER: u32 = 2;

/// Parameters of one distance run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeParams {
    /// Bitmap of diagnostics
    pub debug: u32,
    /// Mode of the code; resolved from the supplied files by [`CodeContext::load`]
    pub mode: CodeMode,
    /// Only CSS codes are supported
    pub css: bool,
    /// Bitmap of methods, see [`METHOD_RANDOM_WINDOW`]
    pub method: u32,
    /// Number of random information sets
    pub steps: usize,
    /// Stop as soon as a codeword of at most this weight is found
    pub wmin: usize,
    /// Look only for codewords lighter than this; 0 removes the bound
    pub wmax: usize,
    /// Seed of the random generator; 0 draws one from the OS
    pub seed: u64,
    /// Start position for cluster search
    pub start: i64,
    /// Base name for `{fin}Z.mtx` / `{fin}X.mtx`
    pub fin: String,
    pub fin_h: Option<PathBuf>,
    pub fin_g: Option<PathBuf>,
    pub fin_l: Option<PathBuf>,
}

impl Default for CodeParams {
    fn default() -> Self {
        Self {
            debug: 3,
            mode: CodeMode::Css,
            css: true,
            method: METHOD_RANDOM_WINDOW,
            steps: 1,
            wmin: 1,
            wmax: 5,
            seed: 0,
            start: -1,
            fin: "try".to_string(),
            fin_h: None,
            fin_g: None,
            fin_l: None,
        }
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| Error::InvalidParameter {
        arg: format!("{}={}", key, value),
        reason: format!("`{}` is not a valid value for {}", value, key),
    })
}

impl CodeParams {
    /// Parses `key=value` words, not including the program name.
    ///
    /// File name keys (`fin`, `finH`, `finG`, `finL`) given with an empty value
    /// take the following word instead.
    pub fn from_args<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        if args.iter().any(|a| a == "-h" || a == "--help") {
            return Err(Error::HelpRequested);
        }

        let mut p = Self::default();
        let mut i = 0;
        while i < args.len() {
            let arg = &args[i];
            let Some((key, value)) = arg.split_once('=') else {
                return Err(unrecognized(arg));
            };

            match key {
                "debug" => {
                    let dbg: u32 = parse_value(key, value)?;
                    if dbg == 0 {
                        p.debug = 0;
                    } else if i == 0 {
                        p.debug = dbg;
                    } else {
                        p.debug ^= dbg;
                    }
                }
                "css" => p.css = parse_value::<i64>(key, value)? != 0,
                "method" => {
                    let method: u32 = parse_value(key, value)?;
                    if method == 0 || method > METHOD_RANDOM_WINDOW | METHOD_CLUSTER {
                        return Err(Error::InvalidParameter {
                            arg: arg.clone(),
                            reason: format!("unsupported method {}", method),
                        });
                    }
                    p.method = method;
                }
                "steps" => p.steps = parse_value::<i64>(key, value)?.max(1) as usize,
                "wmin" => p.wmin = parse_value::<i64>(key, value)?.max(0) as usize,
                "wmax" => p.wmax = parse_value::<i64>(key, value)?.max(0) as usize,
                "seed" => p.seed = parse_value(key, value)?,
                "start" => {
                    let start: i64 = parse_value(key, value)?;
                    if start < -1 {
                        return Err(Error::InvalidParameter {
                            arg: arg.clone(),
                            reason: "start must be a column or -1".to_string(),
                        });
                    }
                    p.start = start;
                }
                "fin" => {
                    if let Some(h) = &p.fin_h {
                        return Err(conflict(arg, "finH", h));
                    }
                    if let Some(g) = &p.fin_g {
                        return Err(conflict(arg, "finG", g));
                    }
                    p.fin = file_value(&args, &mut i, value)?;
                }
                "finH" => {
                    p.fin_h = Some(file_value(&args, &mut i, value)?.into());
                    p.fin.clear();
                }
                "finG" => {
                    p.fin_g = Some(file_value(&args, &mut i, value)?.into());
                    p.fin.clear();
                }
                "finL" => p.fin_l = Some(file_value(&args, &mut i, value)?.into()),
                _ => return Err(unrecognized(arg)),
            }
            debug!(%arg, "read parameter");
            i += 1;
        }
        Ok(p)
    }

    /// Fills in `fin_h` = `{fin}Z.mtx` and `fin_g` = `{fin}X.mtx` when no
    /// check matrix was named explicitly.
    pub fn resolve_files(&mut self) {
        if self.fin_h.is_none() {
            self.fin_g = Some(format!("{}X.mtx", self.fin).into());
            self.fin_h = Some(format!("{}Z.mtx", self.fin).into());
            debug!(fin = %self.fin, "derived input file names");
        }
    }

    /// Random generator for the run, seeded from `seed` or from the OS.
    pub fn rng(&self) -> StdRng {
        if self.seed == 0 {
            StdRng::from_entropy()
        } else {
            StdRng::seed_from_u64(self.seed)
        }
    }
}

fn unrecognized(arg: &str) -> Error {
    Error::InvalidParameter {
        arg: arg.to_string(),
        reason: "unrecognized parameter, try -h for options".to_string(),
    }
}

fn conflict(arg: &str, key: &str, path: &std::path::Path) -> Error {
    Error::InvalidParameter {
        arg: arg.to_string(),
        reason: format!("in conflict with {}={}", key, path.display()),
    }
}

/// Value of a file name key; an empty value takes the next word.
fn file_value(args: &[String], i: &mut usize, value: &str) -> Result<String> {
    if !value.is_empty() {
        return Ok(value.to_string());
    }
    match args.get(*i + 1) {
        Some(next) => {
            *i += 1;
            Ok(next.clone())
        }
        None => Err(Error::InvalidParameter {
            arg: args[*i].clone(),
            reason: "empty file name".to_string(),
        }),
    }
}

/// A loaded code: check matrix `h`, optionally the dual checks `g` and the
/// logical operators `l`
#[derive(Debug)]
pub struct CodeContext {
    pub params: CodeParams,
    pub mode: CodeMode,
    /// Code length
    pub n: usize,
    pub h: CsrMatrix,
    pub g: Option<CsrMatrix>,
    pub l: Option<CsrMatrix>,
}

impl CodeContext {
    /// Reads the matrices named by `params` and validates them.
    ///
    /// The code is CSS when `G` or `L` is given and classical otherwise. For
    /// a CSS code `H·Gᵀ` must vanish, and `L` is computed from `H` and `G`
    /// when it is not supplied.
    pub fn load(mut params: CodeParams) -> Result<Self> {
        if !params.css {
            return Err(Error::Unsupported("non-CSS codes".to_string()));
        }
        params.resolve_files();

        let fin_h = params.fin_h.clone().ok_or_else(|| Error::InvalidParameter {
            arg: "finH".to_string(),
            reason: "need a parity check matrix, use fin= or finH=".to_string(),
        })?;
        let h = mm_read(&fin_h, false)?;
        let n = h.n_cols();
        let g = params.fin_g.as_ref().map(|p| mm_read(p, false)).transpose()?;
        let mut l = params.fin_l.as_ref().map(|p| mm_read(p, false)).transpose()?;

        for other in g.iter().chain(l.iter()) {
            if other.n_cols() != n {
                return Err(Error::mismatch("CodeContext::load column count", n, other.n_cols()));
            }
        }

        let mode = if g.is_some() || l.is_some() {
            CodeMode::Css
        } else {
            CodeMode::Classical
        };
        params.mode = mode;

        if let Some(g) = &g {
            let overlap = csr_csr_mul_non_zero(&h, &g.transpose()?)?;
            if overlap.nnz() > 0 {
                return Err(Error::NotOrthogonal {
                    weight: overlap.nnz(),
                });
            }
            if l.is_none() {
                l = Some(lx_for_css_code(&h, g)?);
            }
        }

        debug!(
            ?mode,
            n,
            h_rows = h.n_rows(),
            g_rows = g.as_ref().map_or(0, |g| g.n_rows()),
            l_rows = l.as_ref().map_or(0, |l| l.n_rows()),
            "code loaded"
        );

        Ok(Self {
            params,
            mode,
            n,
            h,
            g,
            l,
        })
    }
}
