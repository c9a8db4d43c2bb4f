use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

use serde::Serialize;

use crate::{Cost, Error, ErrorKind, Result, SolverOptions, Tour};

/// JSON body for one solve: `{"distance", "path"}` or `{"error"}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response<C> {
    Solved(Tour<C>),
    Failed { error: String },
}

impl<C: Cost> Response<C> {
    pub fn from_result(result: Result<Tour<C>>) -> Self {
        match result {
            Ok(tour) => Self::Solved(tour),
            Err(err) => Self::Failed {
                error: error_message(&err),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Message shown to the caller for `err`.
pub fn error_message(err: &Error) -> String {
    match err.kind() {
        ErrorKind::Client | ErrorKind::NoSolution => err.to_string(),
        ErrorKind::Internal => format!("Internal server error: {err}"),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseDocument<C> {
    Single(Response<C>),
    Batch(Vec<Response<C>>),
}

impl<C: Cost> ResponseDocument<C> {
    pub fn has_errors(&self) -> bool {
        match self {
            Self::Single(response) => response.is_error(),
            Self::Batch(responses) => responses.iter().any(Response::is_error),
        }
    }

    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }

    /// Writes the document to `--output`, or stdout when unset.
    pub fn write(&self, options: &SolverOptions) -> Result<()> {
        let json = self.to_json(options.pretty)?;
        let mut out: Box<dyn Write> = match options.output_path() {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(BufWriter::new(io::stdout().lock())),
        };
        writeln!(out, "{json}")?;
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{Response, ResponseDocument, error_message};
    use crate::{Error, Tour};

    #[test]
    fn solved_response_exposes_distance_and_path() {
        let response = Response::from_result(Ok(Tour::new(80_i64, vec![0, 2, 3, 1, 0])));
        assert!(!response.is_error());
        assert_eq!(
            serde_json::to_string(&response).expect("json"),
            r#"{"distance":80,"path":[0,2,3,1,0]}"#
        );
    }

    #[test]
    fn client_errors_keep_their_message() {
        let response =
            Response::<i64>::from_result(Err(Error::invalid_input("Need at least 3 locations")));
        assert!(response.is_error());
        assert_eq!(
            serde_json::to_string(&response).expect("json"),
            r#"{"error":"Need at least 3 locations"}"#
        );
    }

    #[test]
    fn no_solution_and_internal_errors_are_worded_differently() {
        assert_eq!(error_message(&Error::NoSolution), "No valid solution found");
        assert_eq!(
            error_message(&Error::CostOverflow),
            "Internal server error: tour cost overflowed the matrix cost type"
        );
    }

    #[test]
    fn batch_documents_render_as_arrays() {
        let document = ResponseDocument::Batch(vec![
            Response::from_result(Ok(Tour::new(1.5_f64, vec![0, 1, 2, 0]))),
            Response::from_result(Err(Error::NoSolution)),
        ]);
        assert!(document.has_errors());
        assert_eq!(
            document.to_json(false).expect("json"),
            r#"[{"distance":1.5,"path":[0,1,2,0]},{"error":"No valid solution found"}]"#
        );
    }

    #[test]
    fn pretty_output_spans_lines() {
        let document =
            ResponseDocument::Single(Response::from_result(Ok(Tour::new(3_i64, vec![0, 1, 2, 0]))));
        assert!(!document.has_errors());
        assert!(document.to_json(true).expect("json").contains('\n'));
    }
}
