use polars::prelude::*;

use crate::error::Result;
use crate::schema::survey;

/// Label of a phylum's totals row, e.g. "Dinoflagellate" → "TOTAL DINOFLAGELLATES".
pub fn totals_label(phylum: &str) -> String {
    format!("TOTAL {}S", phylum.to_uppercase())
}

/// Names of every Float64 column of a frame, in order.
pub fn numeric_columns(frame: &DataFrame) -> Vec<String> {
    frame
        .get_columns()
        .iter()
        .filter(|c| c.dtype() == &DataType::Float64)
        .map(|c| c.name().to_string())
        .collect()
}

/// Per-phylum sums of every numeric column.
///
/// Groups keep the order in which each phylum first appears. The result has
/// the Phylum column (rewritten with [`totals_label`]) followed by the summed
/// columns. Nulls are skipped by the sum, and a group with no values at
/// all stays null instead of summing to zero.
pub fn phylum_totals(frame: &DataFrame) -> Result<DataFrame> {
    let numeric = numeric_columns(frame);
    let sums: Vec<Expr> = numeric
        .iter()
        .map(|c| {
            let c = c.as_str();
            when(col(c).count().gt(lit(0)))
                .then(col(c).sum())
                .otherwise(lit(NULL).cast(DataType::Float64))
                .alias(c)
        })
        .collect();

    let mut totals = frame
        .clone()
        .lazy()
        .group_by_stable([col(survey::PHYLUM)])
        .agg(sums)
        .collect()?;

    let labels: Vec<String> = totals
        .column(survey::PHYLUM)?
        .str()?
        .into_iter()
        .map(|p| totals_label(p.unwrap_or_default()))
        .collect();
    totals.with_column(Column::new(survey::PHYLUM.into(), labels))?;

    tracing::debug!(groups = totals.height(), columns = numeric.len(), "computed phylum totals");
    Ok(totals)
}

/// Read one f64 cell of a totals frame, treating nulls as zero.
pub fn total_value(totals: &DataFrame, column: &str, row: usize) -> Result<f64> {
    Ok(totals.column(column)?.f64()?.get(row).unwrap_or(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_upper_plural() {
        assert_eq!(totals_label("Dinoflagellate"), "TOTAL DINOFLAGELLATES");
        assert_eq!(totals_label("Ciliate"), "TOTAL CILIATES");
    }

    #[test]
    fn sums_follow_first_seen_order() {
        let df = DataFrame::new(vec![
            Column::new(survey::PHYLUM.into(), ["Zeta", "Alpha", "Zeta"]),
            Column::new(survey::SPECIES.into(), ["a", "b", "c"]),
            Column::new(survey::TOTAL.into(), [1.0, 2.0, 4.0]),
        ])
        .unwrap();

        let totals = phylum_totals(&df).unwrap();
        let phyla: Vec<&str> = totals
            .column(survey::PHYLUM)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .flatten()
            .collect();
        assert_eq!(phyla, vec!["TOTAL ZETAS", "TOTAL ALPHAS"]);
        assert_eq!(total_value(&totals, survey::TOTAL, 0).unwrap(), 5.0);
        assert_eq!(total_value(&totals, survey::TOTAL, 1).unwrap(), 2.0);
        assert!(totals.column(survey::SPECIES).is_err());
    }
}
