//! Plain-text weight files.
//!
//! Each matrix is written row by row, one comma-separated line per row, in
//! layer order. The three shapes are fixed, so the file carries no header.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::num::ParseFloatError;
use std::path::Path;

use thiserror::Error;

use crate::linalg::Matrix;
use crate::model::DecisionModel;

#[derive(Debug, Error)]
pub enum WeightsError {
    #[error("weight file I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("layer {layer}: missing row {row}")]
    MissingRow { layer: usize, row: usize },
    #[error("layer {layer} row {row}: expected {expected} values, found {found}")]
    ShortRow { layer: usize, row: usize, expected: usize, found: usize },
    #[error("layer {layer} row {row} column {col}: `{value}` is not a number")]
    InvalidValue {
        layer: usize,
        row: usize,
        col: usize,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

pub fn write_file(model: &DecisionModel, path: &Path) -> Result<(), WeightsError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_to(model, &mut out)?;
    out.flush()?;
    Ok(())
}

pub fn read_file(path: &Path) -> Result<DecisionModel, WeightsError> {
    read_from(BufReader::new(File::open(path)?))
}

pub fn write_to(model: &DecisionModel, out: &mut impl Write) -> io::Result<()> {
    write_matrix(&model.theta1, out)?;
    write_matrix(&model.theta2, out)?;
    write_matrix(&model.theta3, out)
}

pub fn read_from(input: impl BufRead) -> Result<DecisionModel, WeightsError> {
    let mut lines = input.lines();
    let mut model = DecisionModel::default();
    read_matrix(&mut model.theta1, 0, &mut lines)?;
    read_matrix(&mut model.theta2, 1, &mut lines)?;
    read_matrix(&mut model.theta3, 2, &mut lines)?;
    Ok(model)
}

fn write_matrix<const R: usize, const C: usize>(m: &Matrix<R, C>, out: &mut impl Write) -> io::Result<()> {
    for row in m.rows() {
        let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    Ok(())
}

fn read_matrix<const R: usize, const C: usize>(
    m: &mut Matrix<R, C>,
    layer: usize,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> Result<(), WeightsError> {
    for row in 0..R {
        let line = lines.next().ok_or(WeightsError::MissingRow { layer, row })??;
        let fields: Vec<&str> = line.split(',').collect();
        // Extra trailing fields are tolerated.
        if fields.len() < C {
            return Err(WeightsError::ShortRow { layer, row, expected: C, found: fields.len() });
        }
        let dst = m.row_mut(row);
        for (col, raw) in fields.iter().take(C).enumerate() {
            let value = raw.trim();
            dst[col] = value.parse().map_err(|source| WeightsError::InvalidValue {
                layer,
                row,
                col,
                value: value.to_string(),
                source,
            })?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn encode(model: &DecisionModel) -> String {
        let mut buf = Vec::new();
        write_to(model, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn layout_is_one_line_per_row() {
        let text = encode(&DecisionModel::default());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 7 + 7 + 4);
        assert_eq!(lines[0].split(',').count(), 11);
        assert_eq!(lines[7].split(',').count(), 8);
        assert_eq!(lines[17].split(',').count(), 8);
    }

    #[test]
    fn round_trip_preserves_values() {
        let mut rng = SmallRng::seed_from_u64(21);
        let model = DecisionModel::random(&mut rng, 2.0);
        let back = read_from(encode(&model).as_bytes()).unwrap();
        for (r, c) in [(0, 0), (3, 5), (6, 10)] {
            assert_relative_eq!(back.theta1[(r, c)], model.theta1[(r, c)], epsilon = 1e-9);
        }
        for (r, c) in [(0, 0), (4, 2), (6, 7)] {
            assert_relative_eq!(back.theta2[(r, c)], model.theta2[(r, c)], epsilon = 1e-9);
        }
        for (r, c) in [(0, 0), (2, 3), (3, 7)] {
            assert_relative_eq!(back.theta3[(r, c)], model.theta3[(r, c)], epsilon = 1e-9);
        }
    }

    #[test]
    fn tolerates_spaces_and_extra_fields() {
        let mut text = String::new();
        for _ in 0..7 {
            text.push_str(" 1.5, 0,0,0,0,0,0,0,0,0,0, 99\n");
        }
        for _ in 0..11 {
            text.push_str("0,0,0,0,0,0,0,-2.25e-1\n");
        }
        let model = read_from(text.as_bytes()).unwrap();
        assert_eq!(model.theta1[(6, 0)], 1.5);
        assert_eq!(model.theta3[(3, 7)], -0.225);
    }

    #[test]
    fn short_row_is_reported() {
        let mut text = encode(&DecisionModel::default());
        text = text.replacen("0,0,0,0,0,0,0,0,0,0,0\n", "0,0,0\n", 1);
        match read_from(text.as_bytes()) {
            Err(WeightsError::ShortRow { layer: 0, row: 0, expected: 11, found: 3 }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_rows_are_reported() {
        let text: String = encode(&DecisionModel::default()).lines().take(10).map(|l| format!("{l}\n")).collect();
        match read_from(text.as_bytes()) {
            Err(WeightsError::MissingRow { layer: 1, row: 3 }) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_value_is_reported() {
        let text = encode(&DecisionModel::default()).replacen("0,0\n", "0,oops\n", 1);
        match read_from(text.as_bytes()) {
            Err(WeightsError::InvalidValue { layer: 0, row: 0, col: 10, value, .. }) => assert_eq!(value, "oops"),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
