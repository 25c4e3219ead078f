use std::process::ExitCode;

use gf2csr::params::{USAGE, METHOD_CLUSTER, METHOD_RANDOM_WINDOW};
use gf2csr::{estimate_distance, ClusterBound, CodeContext, CodeParams, DistanceBound, Error};
use tracing_subscriber::EnvFilter;

fn run() -> gf2csr::Result<()> {
    let params = CodeParams::from_args(std::env::args().skip(1))?;
    let debug = params.debug;
    let ctx = CodeContext::load(params)?;
    let mut rng = ctx.params.rng();
    let report = estimate_distance(&ctx, &mut rng)?;
    let method = ctx.params.method;

    if debug & 1 != 0 {
        match &report.random_window {
            Some(DistanceBound::UpperBound(w)) => println!("### RW upper bound on the distance: {}", w),
            Some(DistanceBound::EarlyTermination(w)) => println!(
                "### RW found weight {} at or below wmin={} (early termination)",
                w, ctx.params.wmin
            ),
            Some(DistanceBound::NotFound) => println!("### no vectors below wmax={} found", ctx.params.wmax),
            None => {}
        }
        match &report.cluster {
            Some(ClusterBound::Found(cw)) => {
                println!("### Cluster (actual min-weight codeword found): dmin={}", cw.len())
            }
            Some(ClusterBound::NoneUpTo(w)) => {
                println!("### Cluster found no codewords of weight up to {}", w)
            }
            None => {}
        }
    }

    if method & METHOD_CLUSTER == 0 {
        match report.upper() {
            Some(d) => println!("RW algorithm upper bound for the distance d={}", d),
            None => println!("RW algorithm found no codeword below wmax={}", ctx.params.wmax),
        }
        return Ok(());
    }

    match (report.lower(), report.upper()) {
        (Some(d), Some(_)) if report.is_exact() => {
            if method & METHOD_RANDOM_WINDOW != 0 {
                println!("success  (two distance bounds coincide) d={}", d)
            } else {
                println!("success  (found min-weight codeword) d={}", d)
            }
        }
        (Some(lo), Some(hi)) => println!("distance in the interval (inclusive) {} to {}", lo, hi),
        (Some(lo), None) => println!(
            "cluster algorithm failed to find a codeword up to wmax={}",
            lo - 1
        ),
        (None, _) => {}
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::HelpRequested) => {
            print!("{}", USAGE);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
