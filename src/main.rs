use std::{process::ExitCode, time::Instant};

use log::info;

use tsp_exact_core::{
    Cost, CostType, Error, RequestBody, RequestDocument, Result, SolverOptions, logging,
    run_document,
};

const EXIT_UNSOLVED: u8 = 1;
const EXIT_BAD_INVOCATION: u8 = 2;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            match err {
                Error::InvalidOption(message) => eprintln!("{message}"),
                other => eprintln!("tsp-exact: {other}"),
            }
            ExitCode::from(EXIT_BAD_INVOCATION)
        }
    }
}

fn run() -> Result<ExitCode> {
    let now = Instant::now();
    let options = SolverOptions::from_args()?;
    logging::init_logger(&options)?;

    info!("options: {options}");

    let body = RequestBody::read(&options)?;
    let cost_type = body.cost_type(options.cost_type);
    info!("input: cost_type={cost_type}");

    let has_errors = match cost_type {
        CostType::Float => solve_document::<f64>(&body, &options)?,
        CostType::Int | CostType::Auto => solve_document::<i64>(&body, &options)?,
    };

    info!(
        "output: errors={has_errors} time={:.3}s",
        now.elapsed().as_secs_f32()
    );

    Ok(if has_errors {
        ExitCode::from(EXIT_UNSOLVED)
    } else {
        ExitCode::SUCCESS
    })
}

fn solve_document<C: Cost>(body: &RequestBody, options: &SolverOptions) -> Result<bool> {
    let document = RequestDocument::<C>::from_body(body, options);
    info!("input: items={}", document.len());

    let responses = run_document(document, options)?;
    responses.write(options)?;
    Ok(responses.has_errors())
}
