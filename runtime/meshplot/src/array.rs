//! Numeric arrays, as they travel from a data file to the wire.
//!
//! [`Variable`] is the storage representation (a flat buffer plus a shape),
//! while [`NestedList`] is the transport representation: a tree of plain
//! numbers that serializes as nested arrays.

/// A plain number.
///
/// Integers and floats are kept apart, so that connectivity indices are encoded
/// as integers and field values as 64-bit floats.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl From<i64> for Number {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Number {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

/// A scalar or an arbitrarily nested sequence of numbers.
///
/// It serializes transparently: a scalar becomes a number, a list becomes an array.
///
/// ```rust
/// use meshplot::{NestedList, Number};
///
/// let triangles = NestedList::from(vec![vec![0, 1, 2], vec![1, 2, 3]]);
/// assert_eq!(
///     serde_json::to_string(&triangles).unwrap(),
///     "[[0,1,2],[1,2,3]]"
/// );
/// assert_eq!(NestedList::from(1.5), NestedList::Scalar(Number::Float(1.5)));
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum NestedList {
    Scalar(Number),
    List(Vec<NestedList>),
}

impl NestedList {
    /// The number of items at the outermost level.
    /// Scalars have no items.
    pub fn len(&self) -> usize {
        match self {
            NestedList::Scalar(_) => 0,
            NestedList::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Number> for NestedList {
    fn from(v: Number) -> Self {
        Self::Scalar(v)
    }
}

impl From<i64> for NestedList {
    fn from(v: i64) -> Self {
        Self::Scalar(v.into())
    }
}

impl From<f64> for NestedList {
    fn from(v: f64) -> Self {
        Self::Scalar(v.into())
    }
}

impl<T> From<Vec<T>> for NestedList
where
    T: Into<NestedList>,
{
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

/// A variable as it is stored on disk: a flat, row-major buffer and its shape.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Variable {
    /// The length of each dimension, outermost first.
    pub shape: Vec<usize>,
    /// The values, in row-major order.
    pub data: Vec<Number>,
}

/// The largest number of empty innermost lists a variable with no values can describe.
///
/// A shape with a zero dimension holds no values, but every dimension before
/// the zero still has to be materialised as nested lists.
const MAX_EMPTY_LISTS: usize = 1 << 20;

impl Variable {
    /// Pair a flat, row-major buffer with its shape.
    /// The two are only checked against each other by [`Variable::into_nested`].
    pub fn new(shape: Vec<usize>, data: Vec<Number>) -> Self {
        Self { shape, data }
    }

    /// The number of values implied by the shape, if it can be represented.
    fn expected_len(&self) -> Option<usize> {
        match self.shape.iter().position(|d| *d == 0) {
            Some(first_zero) => {
                let empty_lists = self.shape[..first_zero]
                    .iter()
                    .try_fold(1usize, |acc, d| acc.checked_mul(*d))?;
                (empty_lists <= MAX_EMPTY_LISTS).then_some(0)
            }
            None => self
                .shape
                .iter()
                .try_fold(1usize, |acc, d| acc.checked_mul(*d)),
        }
    }

    /// Convert the flat buffer into a [`NestedList`] with the variable's shape.
    ///
    /// A zero-dimensional variable becomes a scalar.
    /// It returns an error if the buffer length doesn't match the shape, or if
    /// the shape is too large to be materialised.
    ///
    /// ```rust
    /// use meshplot::{NestedList, Number, Variable};
    ///
    /// let coords = Variable::new(
    ///     vec![3, 2],
    ///     [0, 0, 1, 0, 0, 1].into_iter().map(Number::Int).collect(),
    /// );
    /// assert_eq!(
    ///     coords.into_nested().unwrap(),
    ///     NestedList::from(vec![vec![0, 0], vec![1, 0], vec![0, 1]])
    /// );
    /// ```
    pub fn into_nested(self) -> Result<NestedList, InconsistentShapeError> {
        let Some(expected) = self.expected_len() else {
            return Err(InconsistentShapeError::TooLarge { shape: self.shape });
        };
        if expected != self.data.len() {
            return Err(InconsistentShapeError::LengthMismatch {
                shape: self.shape,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(reshape(&self.shape, &self.data))
    }
}

/// `data.len()` must equal the product of `shape`.
fn reshape(shape: &[usize], data: &[Number]) -> NestedList {
    let Some((&dim, inner)) = shape.split_first() else {
        return NestedList::Scalar(data[0]);
    };
    if dim == 0 {
        return NestedList::List(Vec::new());
    }
    if data.is_empty() {
        // A zero further in: `chunks` can't split an empty buffer into `dim` empty pieces.
        return NestedList::List((0..dim).map(|_| reshape(inner, &[])).collect());
    }
    NestedList::List(
        data.chunks(data.len() / dim)
            .map(|chunk| reshape(inner, chunk))
            .collect(),
    )
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[non_exhaustive]
/// The error returned by [`Variable::into_nested`] when the buffer doesn't match the shape.
pub enum InconsistentShapeError {
    #[error(
        "A variable with shape {shape:?} must hold {expected} values, but it holds {actual} values"
    )]
    LengthMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
    #[error("A variable with shape {shape:?} is too large to be materialised")]
    TooLarge { shape: Vec<usize> },
}
