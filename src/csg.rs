//! Constructive solid geometry over [`ScalarField`]s.
//!
//! Values follow the density convention (positive inside), so union keeps the
//! larger value and intersection the smaller one.

use crate::{
    field::ScalarField,
    types::{Point, Sample, Value},
};

/// A binary combination of two field samples.
pub trait CsgOperation: Sync {
    /// Combines the values of operand A and operand B.
    fn combine_values(&self, a: Value, b: Value) -> Value;

    /// Combines two `(normal, value)` samples.
    fn combine_samples(&self, a: Sample, b: Sample) -> Sample;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Union;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Intersection;

/// Operand A with operand B carved out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Difference;

impl CsgOperation for Union {
    fn combine_values(&self, a: Value, b: Value) -> Value {
        a.max(b)
    }

    fn combine_samples(&self, a: Sample, b: Sample) -> Sample {
        if a.w > b.w { a } else { b }
    }
}

impl CsgOperation for Intersection {
    fn combine_values(&self, a: Value, b: Value) -> Value {
        a.min(b)
    }

    fn combine_samples(&self, a: Sample, b: Sample) -> Sample {
        if a.w < b.w { a } else { b }
    }
}

impl CsgOperation for Difference {
    fn combine_values(&self, a: Value, b: Value) -> Value {
        a.min(-b)
    }

    fn combine_samples(&self, a: Sample, b: Sample) -> Sample {
        Intersection.combine_samples(a, -b)
    }
}

/// Selects one of the built-in operations at runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CsgKind {
    #[default]
    Union,
    Intersection,
    Difference,
}

impl CsgOperation for CsgKind {
    fn combine_values(&self, a: Value, b: Value) -> Value {
        match self {
            Self::Union => Union.combine_values(a, b),
            Self::Intersection => Intersection.combine_values(a, b),
            Self::Difference => Difference.combine_values(a, b),
        }
    }

    fn combine_samples(&self, a: Sample, b: Sample) -> Sample {
        match self {
            Self::Union => Union.combine_samples(a, b),
            Self::Intersection => Intersection.combine_samples(a, b),
            Self::Difference => Difference.combine_samples(a, b),
        }
    }
}

/// A [`CsgOperation`] with its two operands bound, usable as a field itself.
///
/// Bind both operands once, then evaluate as many times as needed. An unbound
/// operand samples as `0.0` with a zero normal.
pub struct CsgOperationSource<'a, O: ?Sized> {
    operation: &'a O,
    a: Option<&'a dyn ScalarField>,
    b: Option<&'a dyn ScalarField>,
}

impl<'a, O: CsgOperation + ?Sized> CsgOperationSource<'a, O> {
    pub fn new(operation: &'a O) -> Self {
        Self {
            operation,
            a: None,
            b: None,
        }
    }

    pub fn bind_operand_a(&mut self, field: &'a dyn ScalarField) {
        self.a = Some(field);
    }

    pub fn bind_operand_b(&mut self, field: &'a dyn ScalarField) {
        self.b = Some(field);
    }

    /// Combined value at world `position`.
    #[inline]
    pub fn evaluate(&self, position: &Point) -> Value {
        let a = self.a.map_or(0.0, |f| f.value_at(position));
        let b = self.b.map_or(0.0, |f| f.value_at(position));
        self.operation.combine_values(a, b)
    }
}

impl<O: CsgOperation + ?Sized> ScalarField for CsgOperationSource<'_, O> {
    fn value_at(&self, position: &Point) -> Value {
        self.evaluate(position)
    }

    fn value_and_gradient_at(&self, position: &Point) -> Sample {
        let a = self
            .a
            .map_or_else(Sample::zeros, |f| f.value_and_gradient_at(position));
        let b = self
            .b
            .map_or_else(Sample::zeros, |f| f.value_and_gradient_at(position));
        self.operation.combine_samples(a, b)
    }
}
