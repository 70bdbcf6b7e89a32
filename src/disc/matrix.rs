use std::ops::Index;

use ndarray::linalg::general_mat_vec_mul;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewMut1};

use crate::error::SpectralError;

/// Dense N x N matrix used for the spectral operators.
#[derive(Clone, Debug, PartialEq)]
pub struct SquareMatrix {
    data: Array2<f64>,
}

impl SquareMatrix {
    pub fn zeros(n: usize) -> Self {
        Self {
            data: Array2::zeros((n, n)),
        }
    }
    /// `value` on the diagonal, zero elsewhere.
    pub fn from_diagonal(n: usize, value: f64) -> Self {
        Self {
            data: Array2::eye(n) * value,
        }
    }
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SpectralError> {
        let n = rows.len();
        let mut data = Array2::zeros((n, n));
        for (i, row) in rows.iter().enumerate() {
            if row.len() != n {
                return Err(SpectralError::dimension_mismatch(n, row.len()));
            }
            for (j, &value) in row.iter().enumerate() {
                data[(i, j)] = value;
            }
        }
        Ok(Self { data })
    }
    pub fn from_array(data: Array2<f64>) -> Result<Self, SpectralError> {
        let (nrows, ncols) = data.dim();
        if nrows != ncols {
            return Err(SpectralError::dimension_mismatch(nrows, ncols));
        }
        Ok(Self { data })
    }
    pub fn extent(&self) -> usize {
        self.data.nrows()
    }
    pub fn view(&self) -> ArrayView2<f64> {
        self.data.view()
    }
    pub fn transpose(&self) -> Self {
        Self {
            data: self.data.t().to_owned(),
        }
    }
    pub fn dot_vec(&self, vec: ArrayView1<f64>) -> Result<Array1<f64>, SpectralError> {
        let mut result = Array1::zeros(self.extent());
        self.dot_vec_into(vec, result.view_mut())?;
        Ok(result)
    }
    /// Writes `self * vec` into `out` without allocating.
    pub fn dot_vec_into(
        &self,
        vec: ArrayView1<f64>,
        mut out: ArrayViewMut1<f64>,
    ) -> Result<(), SpectralError> {
        let n = self.extent();
        if vec.len() != n {
            return Err(SpectralError::dimension_mismatch(n, vec.len()));
        }
        if out.len() != n {
            return Err(SpectralError::dimension_mismatch(n, out.len()));
        }
        general_mat_vec_mul(1.0, &self.data, &vec, 0.0, &mut out);
        Ok(())
    }
    pub fn dot_mat(&self, other: &SquareMatrix) -> Result<SquareMatrix, SpectralError> {
        let n = self.extent();
        if other.extent() != n {
            return Err(SpectralError::dimension_mismatch(n, other.extent()));
        }
        let mut data = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                let mut sum = 0.0;
                for k in 0..n {
                    sum += self.data[(i, k)] * other.data[(k, j)];
                }
                data[(i, j)] = sum;
            }
        }
        Ok(SquareMatrix { data })
    }
    pub fn try_add(&self, other: &SquareMatrix) -> Result<SquareMatrix, SpectralError> {
        self.check_same_extent(other)?;
        Ok(SquareMatrix {
            data: &self.data + &other.data,
        })
    }
    pub fn try_sub(&self, other: &SquareMatrix) -> Result<SquareMatrix, SpectralError> {
        self.check_same_extent(other)?;
        Ok(SquareMatrix {
            data: &self.data - &other.data,
        })
    }
    fn check_same_extent(&self, other: &SquareMatrix) -> Result<(), SpectralError> {
        if self.extent() != other.extent() {
            return Err(SpectralError::dimension_mismatch(
                self.extent(),
                other.extent(),
            ));
        }
        Ok(())
    }
}

impl Index<(usize, usize)> for SquareMatrix {
    type Output = f64;
    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.data[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn test_diagonal_times_vector() {
        let m = SquareMatrix::from_diagonal(3, 2.0);
        let v = array![1.0, -2.0, 0.5];
        let result = m.dot_vec(v.view()).unwrap();
        assert_eq!(result, array![2.0, -4.0, 1.0]);
    }

    #[test]
    fn test_matrix_product_and_sums() {
        let a = SquareMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        let b = SquareMatrix::from_rows(&[vec![0.0, 1.0], vec![1.0, 0.0]]).unwrap();
        let ab = a.dot_mat(&b).unwrap();
        assert_relative_eq!(ab[(0, 0)], 2.0);
        assert_relative_eq!(ab[(0, 1)], 1.0);
        assert_relative_eq!(ab[(1, 0)], 4.0);
        assert_relative_eq!(ab[(1, 1)], 3.0);

        let sum = a.try_add(&b).unwrap();
        let diff = sum.try_sub(&b).unwrap();
        assert_eq!(diff, a);
        assert_eq!(a.transpose()[(0, 1)], 3.0);
        assert_eq!(SquareMatrix::zeros(2).try_add(&a).unwrap(), a);
    }

    #[test]
    fn test_dimension_mismatch() {
        let m = SquareMatrix::zeros(3);
        let v = array![1.0, 2.0];
        assert!(matches!(
            m.dot_vec(v.view()),
            Err(SpectralError::DimensionMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert!(m.dot_mat(&SquareMatrix::zeros(2)).is_err());
        assert!(m.try_sub(&SquareMatrix::zeros(4)).is_err());
        assert!(SquareMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0]]).is_err());
        assert!(SquareMatrix::from_array(Array2::zeros((2, 3))).is_err());
    }
}
