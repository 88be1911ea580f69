use crate::analysis::types::CorrelationMatrix;
use crate::analysis::utility::pearson;
use crate::error::AnalysisError;
use crate::table::Table;

/// Pearson correlation between every pair of `columns`.
///
/// Each cell uses the rows where both columns hold a number. The diagonal is
/// always `1.0`; pairs with fewer than two rows or a constant side are `NaN`.
pub fn correlation_matrix(
    table: &Table,
    columns: &[String],
) -> Result<CorrelationMatrix, AnalysisError> {
    let indices = columns
        .iter()
        .map(|c| {
            table
                .column_index(c)
                .ok_or_else(|| AnalysisError::MissingColumn(c.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let n = indices.len();
    let mut values = vec![vec![f64::NAN; n]; n];

    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let pairs: Vec<(f64, f64)> = table
                .rows()
                .iter()
                .filter_map(|row| Some((row[indices[i]].as_f64()?, row[indices[j]].as_f64()?)))
                .collect();
            let r = pearson(&pairs);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Scalar;

    fn table() -> Table {
        Table::from_records((0..10).map(|i| {
            let x = i as f64;
            vec![
                ("x", Scalar::from(x)),
                ("double", Scalar::from(2.0 * x)),
                ("neg", Scalar::from(10.0 - x)),
                ("wobble", Scalar::from(((i * 7) % 5) as f64)),
                ("flat", Scalar::from(3.0)),
                ("gappy", if i % 2 == 0 { Scalar::from(x * x) } else { Scalar::Missing }),
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_matrix_is_symmetric_with_unit_diagonal() {
        let t = table();
        let m = correlation_matrix(&t, &t.numeric_columns()).unwrap();

        for i in 0..m.columns.len() {
            assert_eq!(m.values[i][i], 1.0);
            for j in 0..m.columns.len() {
                let (a, b) = (m.values[i][j], m.values[j][i]);
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
    }

    #[test]
    fn test_known_coefficients() {
        let t = table();
        let m = correlation_matrix(&t, &t.numeric_columns()).unwrap();

        assert!((m.get("x", "double").unwrap() - 1.0).abs() < 1e-12);
        assert!((m.get("x", "neg").unwrap() + 1.0).abs() < 1e-12);
        assert!(m.get("x", "flat").unwrap().is_nan());
        assert_eq!(m.get("flat", "flat"), Some(1.0));
    }

    #[test]
    fn test_pairwise_complete_rows() {
        let t = table();
        let m = correlation_matrix(&t, &["x".to_string(), "gappy".to_string()]).unwrap();
        let r = m.get("x", "gappy").unwrap();
        // x and x² over even x in 0..10 are strongly but not perfectly correlated.
        assert!(r > 0.9 && r < 1.0);
    }

    #[test]
    fn test_unknown_column() {
        let err = correlation_matrix(&table(), &["nope".to_string()]).unwrap_err();
        assert_eq!(err, AnalysisError::MissingColumn("nope".into()));
    }
}
