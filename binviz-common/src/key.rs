use std::sync::Arc;

use crate::aggregate::{AggregateParameters, AggregateResult, MarginParameters};
use crate::attribute::Attribute;
use crate::bin::{Bin, HistogramResult};
use crate::transform::AxisTransform;

/// Location of one result inside a bin's flat result array. A negative
/// component marks a key that resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AggregateKey {
    pub parameter_index: i32,
    pub brush_index: i32,
}

impl AggregateKey {
    pub const NOT_FOUND: i32 = -1;

    pub fn not_found() -> Self {
        Self {
            parameter_index: Self::NOT_FOUND,
            brush_index: Self::NOT_FOUND,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.parameter_index < 0 || self.brush_index < 0
    }
}

/// Resolves axis transforms to keys for one result set
#[derive(Debug, Clone, Copy)]
pub struct AggregateKeyResolver<'a> {
    parameters: &'a [AggregateParameters],
    brush_count: usize,
}

impl<'a> AggregateKeyResolver<'a> {
    pub fn new(parameters: &'a [AggregateParameters], brush_count: usize) -> Self {
        Self {
            parameters,
            brush_count,
        }
    }

    pub fn for_result(result: &'a HistogramResult) -> Self {
        Self::new(&result.aggregate_parameters, result.brushes.len())
    }

    /// Key of the aggregate described by `transform` for one brush.
    ///
    /// Without `margin` the transform's own aggregate is looked up; with it,
    /// the margin-of-error companion is. The first parameter of the same
    /// kind wins.
    pub fn resolve(
        &self,
        distinct: Option<&Arc<Attribute>>,
        transform: &AxisTransform,
        brush_index: i32,
        margin: Option<&MarginParameters>,
    ) -> AggregateKey {
        let params = match margin {
            None => AggregateParameters::for_transform(transform, distinct),
            Some(template) => Some(AggregateParameters::margin_for(transform, template)),
        };
        let Some(params) = params else {
            return AggregateKey::not_found();
        };
        let parameter_index = self
            .parameters
            .iter()
            .position(|p| p.kind() == params.kind())
            .map(|i| i as i32)
            .unwrap_or(AggregateKey::NOT_FOUND);
        let brush_index = if brush_index < 0 {
            AggregateKey::NOT_FOUND
        } else {
            brush_index
        };
        AggregateKey {
            parameter_index,
            brush_index,
        }
    }

    /// Result stored at `key`, or `None` for sentinel keys and missing data
    pub fn get_result<'b>(&self, bin: &'b Bin, key: AggregateKey) -> Option<&'b AggregateResult> {
        if key.is_sentinel() {
            return None;
        }
        let brush = key.brush_index as usize;
        if brush >= self.brush_count {
            return None;
        }
        let offset = (key.parameter_index as usize)
            .checked_mul(self.brush_count)?
            .checked_add(brush)?;
        bin.results.get(offset).and_then(|r| r.as_ref())
    }

    /// Shorthand for the primary value of `transform` in `bin`
    pub fn value(
        &self,
        bin: &Bin,
        distinct: Option<&Arc<Attribute>>,
        transform: &AxisTransform,
        brush_index: i32,
    ) -> Option<f64> {
        let key = self.resolve(distinct, transform, brush_index, None);
        self.get_result(bin, key).and_then(|r| r.value())
    }

    /// Min and max of the primary value of `transform` across `bins`
    pub fn extent<'b>(
        &self,
        bins: impl IntoIterator<Item = &'b Bin>,
        distinct: Option<&Arc<Attribute>>,
        transform: &AxisTransform,
        brush_index: i32,
    ) -> Option<(f64, f64)> {
        let key = self.resolve(distinct, transform, brush_index, None);
        bins.into_iter()
            .filter_map(|bin| self.get_result(bin, key).and_then(|r| r.value()))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }
}
