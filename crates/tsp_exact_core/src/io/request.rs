use std::{fs, io::Read};

use serde_json::Value;

use crate::{Cost, CostType, DistanceMatrix, Error, Result, SolverOptions};

const ERR_MATRIX_MISSING: &str = "Invalid input: matrix must be provided and must be an array";
const ERR_NOT_SQUARE: &str = "Invalid matrix format: must be a square matrix";

/// A validated solve request.
#[derive(Clone, Debug, PartialEq)]
pub struct Request<C> {
    pub matrix: DistanceMatrix<C>,
}

impl<C: Cost> Request<C> {
    /// Validates one `{"matrix": [[...], ...]}` object.
    ///
    /// `null` entries are absent edges. Diagonal entries are validated like any other.
    pub fn from_value(value: &Value, options: &SolverOptions) -> Result<Self> {
        let rows = value
            .get("matrix")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::invalid_input(ERR_MATRIX_MISSING))?;

        let n = rows.len();
        if n < options.min_nodes {
            return Err(Error::invalid_input(format!(
                "Need at least {} locations",
                options.min_nodes
            )));
        }
        if n > options.max_nodes {
            return Err(Error::invalid_input(format!(
                "Too many locations: {n} (max {})",
                options.max_nodes
            )));
        }

        let mut parsed = Vec::with_capacity(n);
        for row in rows {
            match row.as_array() {
                Some(cells) if cells.len() == n => parsed.push(cells),
                _ => return Err(Error::invalid_input(ERR_NOT_SQUARE)),
            }
        }

        let matrix = parsed
            .into_iter()
            .enumerate()
            .map(|(i, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(j, cell)| parse_cell(cell, i, j, options.allow_negative))
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()
            .and_then(DistanceMatrix::from_optional_rows)?;

        Ok(Self { matrix })
    }
}

fn parse_cell<C: Cost>(cell: &Value, i: usize, j: usize, allow_negative: bool) -> Result<Option<C>> {
    if cell.is_null() {
        return Ok(None);
    }

    let cost = C::deserialize(cell)
        .map_err(|_| Error::invalid_input(format!("Invalid matrix entry at [{i}][{j}]: {cell}")))?;

    if !allow_negative && cost.is_negative() {
        return Err(Error::invalid_input(format!(
            "Invalid matrix entry at [{i}][{j}]: negative cost {cell}"
        )));
    }

    Ok(Some(cost))
}

/// Raw JSON request body, parsed but not yet validated.
#[derive(Clone, Debug)]
pub struct RequestBody(Value);

impl RequestBody {
    /// Reads the body from `--input`, or stdin when unset.
    pub fn read(options: &SolverOptions) -> Result<Self> {
        let text = match options.input_path() {
            Some(path) => fs::read_to_string(path)?,
            None => {
                let mut text = String::new();
                std::io::stdin().read_to_string(&mut text)?;
                text
            }
        };
        Self::parse(&text)
    }

    /// Fails only when `text` is not JSON.
    pub fn parse(text: &str) -> Result<Self> {
        let value = serde_json::from_str(text)?;
        log::debug!("request: received bytes={}", text.len());
        Ok(Self(value))
    }

    /// Resolves `auto` against the matrices in the body: any entry that does
    /// not fit an `i64` selects float costs.
    pub fn cost_type(&self, requested: CostType) -> CostType {
        match requested {
            CostType::Auto if self.matrices().any(has_fractional_entry) => CostType::Float,
            CostType::Auto => CostType::Int,
            explicit => explicit,
        }
    }

    fn matrices(&self) -> impl Iterator<Item = &Value> {
        let items = match &self.0 {
            Value::Array(items) => items.as_slice(),
            single => std::slice::from_ref(single),
        };
        items.iter().filter_map(|item| item.get("matrix"))
    }
}

fn has_fractional_entry(matrix: &Value) -> bool {
    let Some(rows) = matrix.as_array() else {
        return false;
    };
    rows.iter()
        .filter_map(Value::as_array)
        .flatten()
        .any(|cell| matches!(cell, Value::Number(number) if !number.is_i64()))
}

/// A request body: one request object, or a JSON array of them.
///
/// Each item carries its own validation outcome so one bad matrix does not
/// fail the whole batch.
#[derive(Debug)]
pub enum RequestDocument<C> {
    Single(Result<Request<C>>),
    Batch(Vec<Result<Request<C>>>),
}

impl<C: Cost> RequestDocument<C> {
    /// Fails only when `text` is not JSON; validation failures stay per item.
    pub fn parse(text: &str, options: &SolverOptions) -> Result<Self> {
        RequestBody::parse(text).map(|body| Self::from_body(&body, options))
    }

    pub fn from_body(body: &RequestBody, options: &SolverOptions) -> Self {
        match &body.0 {
            Value::Array(items) => Self::Batch(
                items
                    .iter()
                    .map(|item| Request::from_value(item, options))
                    .collect(),
            ),
            other => Self::Single(Request::from_value(other, options)),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batch(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{Request, RequestBody, RequestDocument};
    use crate::{CostType, Error, SolverOptions};

    fn options() -> SolverOptions {
        SolverOptions::default()
    }

    fn reject(value: serde_json::Value) -> String {
        Request::<i64>::from_value(&value, &options())
            .expect_err("request should be rejected")
            .to_string()
    }

    #[test]
    fn accepts_square_numeric_matrix() {
        let request = Request::<i64>::from_value(
            &json!({"matrix": [[0, 1, 2], [1, 0, 3], [2, 3, 0]]}),
            &options(),
        )
        .expect("valid request");
        assert_eq!(request.matrix.len(), 3);
        assert_eq!(request.matrix.get(1, 2), Some(3));
    }

    #[test]
    fn missing_or_non_array_matrix_is_rejected() {
        let expected = "Invalid input: matrix must be provided and must be an array";
        assert_eq!(reject(json!({})), expected);
        assert_eq!(reject(json!({"matrix": "nope"})), expected);
        assert_eq!(reject(json!([1, 2, 3])), expected);
        assert_eq!(reject(json!(null)), expected);
    }

    #[test]
    fn fewer_than_three_locations_is_rejected() {
        assert_eq!(
            reject(json!({"matrix": [[0, 1], [1, 0]]})),
            "Need at least 3 locations"
        );
        assert_eq!(reject(json!({"matrix": []})), "Need at least 3 locations");
    }

    #[test]
    fn non_square_rows_are_rejected() {
        let expected = "Invalid matrix format: must be a square matrix";
        assert_eq!(
            reject(json!({"matrix": [[0, 1, 2], [1, 0], [2, 3, 0]]})),
            expected
        );
        assert_eq!(
            reject(json!({"matrix": [[0, 1, 2], 5, [2, 3, 0]]})),
            expected
        );
    }

    #[test]
    fn malformed_entries_are_rejected_with_position() {
        assert_eq!(
            reject(json!({"matrix": [[0, 1, 2], [1, 0, "x"], [2, 3, 0]]})),
            "Invalid matrix entry at [1][2]: \"x\""
        );
        assert_eq!(
            reject(json!({"matrix": [[0, 1.5, 2], [1, 0, 3], [2, 3, 0]]})),
            "Invalid matrix entry at [0][1]: 1.5"
        );
    }

    #[test]
    fn float_requests_accept_integers_and_fractions() {
        let request = Request::<f64>::from_value(
            &json!({"matrix": [[0, 1.5, 2], [1, 0, 3.25], [2, 3, 0]]}),
            &options(),
        )
        .expect("valid request");
        assert_eq!(request.matrix.get(0, 1), Some(1.5));
        assert_eq!(request.matrix.get(0, 2), Some(2.0));
    }

    #[test]
    fn null_entries_are_absent_edges() {
        let request = Request::<i64>::from_value(
            &json!({"matrix": [[0, null, 2], [1, 0, 3], [2, 3, 0]]}),
            &options(),
        )
        .expect("valid request");
        assert_eq!(request.matrix.get(0, 1), None);
    }

    #[test]
    fn negative_costs_follow_the_option() {
        let body = json!({"matrix": [[0, -1, 2], [1, 0, 3], [2, 3, 0]]});
        assert!(Request::<i64>::from_value(&body, &options()).is_ok());

        let strict = SolverOptions {
            allow_negative: false,
            ..options()
        };
        let err = Request::<i64>::from_value(&body, &strict).expect_err("negative rejected");
        assert_eq!(
            err.to_string(),
            "Invalid matrix entry at [0][1]: negative cost -1"
        );

        let fractional = json!({"matrix": [[0, 1, 2], [1, 0, -0.5], [2, 3, 0]]});
        let err = Request::<f64>::from_value(&fractional, &strict).expect_err("negative rejected");
        assert_eq!(
            err.to_string(),
            "Invalid matrix entry at [1][2]: negative cost -0.5"
        );
    }

    #[test]
    fn oversized_matrix_is_rejected() {
        let small = SolverOptions {
            max_nodes: 3,
            ..options()
        };
        let err = Request::<i64>::from_value(&json!({"matrix": vec![vec![1; 4]; 4]}), &small)
            .expect_err("too many nodes");
        assert_eq!(err.to_string(), "Too many locations: 4 (max 3)");
    }

    #[test]
    fn documents_can_be_single_or_batch() {
        let single = RequestDocument::<i64>::parse(
            r#"{"matrix": [[0, 1, 2], [1, 0, 3], [2, 3, 0]]}"#,
            &options(),
        )
        .expect("json");
        assert!(matches!(single, RequestDocument::Single(Ok(_))));
        assert_eq!(single.len(), 1);

        let batch = RequestDocument::<i64>::parse(
            r#"[{"matrix": [[0, 1, 2], [1, 0, 3], [2, 3, 0]]}, {"matrix": []}]"#,
            &options(),
        )
        .expect("json");
        let RequestDocument::Batch(items) = batch else {
            panic!("expected batch document");
        };
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(Error::InvalidInput(_))));
    }

    #[test]
    fn invalid_json_fails_the_document() {
        let err = RequestDocument::<i64>::parse("{matrix", &options()).expect_err("bad json");
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn auto_cost_type_follows_the_matrix_numbers() {
        let ints = RequestBody::parse(r#"{"matrix": [[0, 1, 2], [1, 0, 3], [2, 3, 0]]}"#)
            .expect("json");
        assert_eq!(ints.cost_type(CostType::Auto), CostType::Int);

        let batch = RequestBody::parse(
            r#"[{"matrix": [[0, 1], [1, 0]]}, {"matrix": [[0, 1.5], [null, 0]]}]"#,
        )
        .expect("json");
        assert_eq!(batch.cost_type(CostType::Auto), CostType::Float);

        let huge = RequestBody::parse(r#"{"matrix": [[0, 18446744073709551615], [1, 0]]}"#)
            .expect("json");
        assert_eq!(huge.cost_type(CostType::Auto), CostType::Float);
    }

    #[test]
    fn explicit_cost_type_is_kept() {
        let body = RequestBody::parse(r#"{"matrix": [[0, 1.5, 2], [1, 0, 3], [2, 3, 0]]}"#)
            .expect("json");
        assert_eq!(body.cost_type(CostType::Int), CostType::Int);
        assert_eq!(body.cost_type(CostType::Float), CostType::Float);

        let document = RequestDocument::<i64>::from_body(&body, &SolverOptions::default());
        assert!(matches!(document, RequestDocument::Single(Err(Error::InvalidInput(_)))));
    }
}
