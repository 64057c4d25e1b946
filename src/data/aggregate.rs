use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray, UInt32Array,
};
use arrow::compute::kernels::numeric::{mul, sub};
use arrow::compute::kernels::partition::partition;
use arrow::compute::{and, filter, is_not_null, sort_to_indices, sum, take};
use arrow::datatypes::{Float64Type, Int64Type};
use arrow::error::ArrowError;

// ---------------------------------------------------------------------------
// Group-by mean
// ---------------------------------------------------------------------------

/// Mean of one metric for one category value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub key: String,
    pub mean: f64,
}

/// Sort rows by key, split them into runs of equal keys and average each run.
///
/// Rows with a null key or a null value are dropped first, so a key whose
/// values are all null produces no group. Returns one key per group (ascending)
/// alongside the group means.
fn grouped_means(
    keys: &dyn Array,
    values: &Float64Array,
) -> Result<(ArrayRef, Vec<f64>), ArrowError> {
    let valid = and(&is_not_null(keys)?, &is_not_null(values)?)?;
    let keys = filter(keys, &valid)?;
    let values = filter(values, &valid)?;
    if keys.is_empty() {
        return Ok((keys, Vec::new()));
    }

    let order = sort_to_indices(&keys, None, None)?;
    let keys = take(&keys, &order, None)?;
    let values = take(&values, &order, None)?;
    let values = values.as_primitive::<Float64Type>();

    let ranges = partition(&[keys.clone()])?.ranges();
    let firsts = UInt32Array::from(ranges.iter().map(|r| r.start as u32).collect::<Vec<_>>());
    let means = ranges
        .iter()
        .map(|r| sum(&values.slice(r.start, r.len())).unwrap_or(0.0) / r.len() as f64)
        .collect();

    Ok((take(&keys, &firsts, None)?, means))
}

/// Group `values` by textual `keys` and average each group, sorted by key.
pub fn group_mean(keys: &StringArray, values: &Float64Array) -> Result<Vec<GroupMean>, ArrowError> {
    let (keys, means) = grouped_means(keys, values)?;
    Ok(keys
        .as_string::<i32>()
        .iter()
        .zip(means)
        .map(|(key, mean)| GroupMean {
            key: key.unwrap_or_default().to_string(),
            mean,
        })
        .collect())
}

/// Same as [`group_mean`] with integer keys (years), sorted ascending.
pub fn group_mean_by_year(
    years: &Int64Array,
    values: &Float64Array,
) -> Result<Vec<(i64, f64)>, ArrowError> {
    let (years, means) = grouped_means(years, values)?;
    Ok(years
        .as_primitive::<Int64Type>()
        .values()
        .iter()
        .copied()
        .zip(means)
        .collect())
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Values minus their mean.
fn deviations(values: &ArrayRef) -> Result<ArrayRef, ArrowError> {
    let floats = values.as_primitive::<Float64Type>();
    let mean = sum(floats).unwrap_or(0.0) / floats.len() as f64;
    sub(values, &Float64Array::new_scalar(mean))
}

fn sum_of_products(a: &ArrayRef, b: &ArrayRef) -> Result<f64, ArrowError> {
    let products = mul(a, b)?;
    Ok(sum(products.as_primitive::<Float64Type>()).unwrap_or(0.0))
}

/// Pearson correlation over the rows where both series have a value.
///
/// NaN when fewer than two such rows exist or either side has zero variance.
pub fn pearson(xs: &Float64Array, ys: &Float64Array) -> Result<f64, ArrowError> {
    let both = and(&is_not_null(xs)?, &is_not_null(ys)?)?;
    let xs = filter(xs, &both)?;
    let ys = filter(ys, &both)?;
    if xs.len() < 2 {
        return Ok(f64::NAN);
    }

    let dx = deviations(&xs)?;
    let dy = deviations(&ys)?;
    let var_x = sum_of_products(&dx, &dx)?;
    let var_y = sum_of_products(&dy, &dy)?;
    if var_x == 0.0 || var_y == 0.0 {
        return Ok(f64::NAN);
    }
    let cov = sum_of_products(&dx, &dy)?;
    Ok((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Square, symmetric matrix of pairwise [`pearson`] coefficients.
pub fn correlation_matrix(series: &[Float64Array]) -> Result<Vec<Vec<f64>>, ArrowError> {
    let k = series.len();
    let mut matrix = vec![vec![f64::NAN; k]; k];
    for i in 0..k {
        for j in i..k {
            let r = pearson(&series[i], &series[j])?;
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    Ok(matrix)
}
