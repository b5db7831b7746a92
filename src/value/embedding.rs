use serde::{Deserialize, Serialize};

/// Fixed-length vector representation of a piece of text. The dimension is
/// decided by the embedding model; stores reject vectors whose length does
/// not match theirs.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Embedding(Vec<f32>);

impl From<Vec<f32>> for Embedding {
    fn from(value: Vec<f32>) -> Self {
        Self(value)
    }
}

impl From<Embedding> for Vec<f32> {
    fn from(value: Embedding) -> Self {
        value.0
    }
}

impl std::ops::Mul for &Embedding {
    type Output = f32;

    fn mul(self, rhs: Self) -> Self::Output {
        if self.len() != rhs.len() {
            panic!("Cannot dot-product two embeddings of different lengths");
        }

        self.0.iter().zip(rhs.0.iter()).map(|(x, y)| x * y).sum()
    }
}

impl Embedding {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn normalized(&self) -> Self {
        let magnitude = self.0.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude == 0.0 {
            return self.clone();
        }
        Self(self.0.iter().map(|x| x / magnitude).collect())
    }

    /// Cosine similarity against `rhs`. Zero vectors score 0 instead of NaN.
    pub fn cosine(&self, rhs: &Self) -> f32 {
        let denom = self.magnitude() * rhs.magnitude();
        if denom == 0.0 {
            return 0.0;
        }
        (self * rhs) / denom
    }

    fn magnitude(&self) -> f32 {
        self.0.iter().map(|x| x * x).sum::<f32>().sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_product() {
        let a = Embedding::from(vec![1.0, 2.0, 3.0]);
        let b = Embedding::from(vec![4.0, 5.0, 6.0]);
        assert_eq!(&a * &b, 32.0);
    }

    #[test]
    fn normalized_has_unit_magnitude() {
        let e = Embedding::from(vec![3.0, 4.0]).normalized();
        let magnitude = (&e * &e).sqrt();
        assert!((magnitude - 1.0).abs() < 1e-6);
    }

    #[test]
    fn normalizing_the_zero_vector_is_a_no_op() {
        let zero = Embedding::from(vec![0.0, 0.0]);
        assert_eq!(zero.normalized(), zero);
    }

    #[yare::parameterized(
        identical = { vec![0.5, 0.5], vec![0.5, 0.5], 1.0 },
        orthogonal = { vec![1.0, 0.0], vec![0.0, 1.0], 0.0 },
        opposite = { vec![1.0, 0.0], vec![-1.0, 0.0], -1.0 },
    )]
    fn cosine_similarity(a: Vec<f32>, b: Vec<f32>, expected: f32) {
        let got = Embedding::from(a).cosine(&Embedding::from(b));
        assert!((got - expected).abs() < 1e-6, "got {got}, expected {expected}");
    }

    #[test]
    fn cosine_with_zero_vector_is_zero() {
        let a = Embedding::from(vec![1.0, 2.0]);
        let zero = Embedding::from(vec![0.0, 0.0]);
        assert_eq!(a.cosine(&zero), 0.0);
    }

    #[test]
    fn serializes_as_a_bare_array() {
        let e = Embedding::from(vec![1.0, 2.0]);
        assert_eq!(serde_json::to_string(&e).unwrap(), "[1.0,2.0]");
    }
}
