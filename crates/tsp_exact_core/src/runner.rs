use crate::{
    Cost, DistanceMatrix, Error, Request, RequestDocument, Response, ResponseDocument, Result,
    SolverOptions, Tour, solve, solve_batch,
};

/// Solves every valid request in `document` and pairs each item with its response.
///
/// Only a thread-pool failure aborts the whole document.
pub fn run_document<C: Cost>(
    document: RequestDocument<C>,
    options: &SolverOptions,
) -> Result<ResponseDocument<C>> {
    match document {
        RequestDocument::Single(request) => {
            let result = request.and_then(|Request { matrix }| {
                let tour = solve(&matrix)?;
                finish(&matrix, tour, options)
            });
            log_failure(0, &result);
            Ok(ResponseDocument::Single(Response::from_result(result)))
        }
        RequestDocument::Batch(requests) => {
            let (valid, positions): (Vec<DistanceMatrix<C>>, Vec<usize>) = requests
                .iter()
                .enumerate()
                .filter_map(|(idx, request)| {
                    request
                        .as_ref()
                        .ok()
                        .map(|request| (request.matrix.clone(), idx))
                })
                .unzip();

            let mut solved = solve_batch(&valid, options.threads)?
                .into_iter()
                .zip(&valid)
                .map(|(result, matrix)| result.and_then(|tour| finish(matrix, tour, options)))
                .zip(positions)
                .map(|(result, idx)| (idx, result))
                .peekable();

            let mut responses = Vec::with_capacity(requests.len());
            for (idx, request) in requests.into_iter().enumerate() {
                let result = match request {
                    Err(err) => Err(err),
                    Ok(_) => match solved.next_if(|(pos, _)| *pos == idx) {
                        Some((_, result)) => result,
                        None => Err(Error::other(format!("batch item {idx} was not solved"))),
                    },
                };
                log_failure(idx, &result);
                responses.push(Response::from_result(result));
            }

            Ok(ResponseDocument::Batch(responses))
        }
    }
}

fn finish<C: Cost>(
    matrix: &DistanceMatrix<C>,
    tour: Tour<C>,
    options: &SolverOptions,
) -> Result<Tour<C>> {
    if options.verify {
        tour.validate(matrix)?;
        let recomputed = tour.recompute_distance(matrix)?;
        if recomputed != tour.distance() {
            return Err(Error::invalid_data(format!(
                "tour distance {} does not match its legs {recomputed}",
                tour.distance()
            )));
        }
    }

    let metrics = tour.leg_metrics(matrix);
    log::info!(
        "result: n={} distance={} path={:?} legs={} longest={} avg={:.3}",
        tour.nodes(),
        tour.distance(),
        tour.path(),
        metrics.legs,
        metrics.longest,
        metrics.average
    );
    Ok(tour)
}

fn log_failure<C: Cost>(idx: usize, result: &Result<Tour<C>>) {
    if let Err(err) = result {
        log::warn!("result: idx={idx} kind={:?} err={err}", err.kind());
    }
}

#[cfg(test)]
mod tests {
    use super::run_document;
    use crate::{RequestDocument, ResponseDocument, SolverOptions};

    fn run(body: &str, options: &SolverOptions) -> ResponseDocument<i64> {
        let document = RequestDocument::<i64>::parse(body, options).expect("json");
        run_document(document, options).expect("run")
    }

    #[test]
    fn single_request_produces_tour_json() {
        let options = SolverOptions {
            verify: true,
            ..SolverOptions::default()
        };
        let response = run(
            r#"{"matrix": [[0,10,15,20],[10,0,35,25],[15,35,0,30],[20,25,30,0]]}"#,
            &options,
        );

        assert!(!response.has_errors());
        assert_eq!(
            response.to_json(false).expect("json"),
            r#"{"distance":80,"path":[0,2,3,1,0]}"#
        );
    }

    #[test]
    fn single_invalid_request_produces_error_json() {
        let response = run(r#"{"matrix": [[0,1],[1,0]]}"#, &SolverOptions::default());
        assert!(response.has_errors());
        assert_eq!(
            response.to_json(false).expect("json"),
            r#"{"error":"Need at least 3 locations"}"#
        );
    }

    #[test]
    fn batch_interleaves_validation_errors_and_tours_in_order() {
        let options = SolverOptions {
            threads: 2,
            verify: true,
            ..SolverOptions::default()
        };
        let response = run(
            r#"[
                {"matrix": [[0,1,1],[1,0,1],[1,1,0]]},
                {"nope": true},
                {"matrix": [[0,null,1],[null,0,null],[1,null,0]]},
                {"matrix": [[0,2,9],[9,0,2],[2,9,0]]}
            ]"#,
            &options,
        );

        assert!(response.has_errors());
        assert_eq!(
            response.to_json(false).expect("json"),
            concat!(
                r#"[{"distance":3,"path":[0,2,1,0]},"#,
                r#"{"error":"Invalid input: matrix must be provided and must be an array"},"#,
                r#"{"error":"No valid solution found"},"#,
                r#"{"distance":6,"path":[0,1,2,0]}]"#
            )
        );
    }

    #[test]
    fn empty_batch_produces_empty_array() {
        let response = run("[]", &SolverOptions::default());
        assert!(!response.has_errors());
        assert_eq!(response.to_json(false).expect("json"), "[]");
    }
}
