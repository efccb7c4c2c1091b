//! Probability distributions
//!
//! An ordered set of (value, share) points where share is the cumulative
//! probability coordinate in `[0, 1]`, plus an optional average. Lookups in
//! both directions interpolate linearly between the bracketing points.

use crate::error::JelError;
use crate::operator::Operator;
use crate::value::Value;
use crate::JelResult;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DistributionPoint {
    pub value: Decimal,
    pub share: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    points: Vec<DistributionPoint>,
    average: Option<Decimal>,
}

impl Distribution {
    /// Build a distribution; points are sorted by share and every share
    /// must lie in `[0, 1]`
    pub fn new(
        points: Vec<(Decimal, Decimal)>,
        average: Option<Decimal>,
    ) -> JelResult<Self> {
        let mut points: Vec<DistributionPoint> = points
            .into_iter()
            .map(|(value, share)| {
                if share < Decimal::ZERO || share > Decimal::ONE {
                    Err(JelError::Construction(format!(
                        "Distribution share {} is outside [0, 1]",
                        share
                    )))
                } else {
                    Ok(DistributionPoint { value, share })
                }
            })
            .collect::<JelResult<_>>()?;
        points.sort_by(|a, b| a.share.cmp(&b.share));
        Ok(Distribution { points, average })
    }

    pub fn points(&self) -> &[DistributionPoint] {
        &self.points
    }

    pub fn average(&self) -> Option<Decimal> {
        self.average
    }

    pub fn min_value(&self) -> Option<Decimal> {
        self.points.iter().map(|p| p.value).min()
    }

    pub fn max_value(&self) -> Option<Decimal> {
        self.points.iter().map(|p| p.value).max()
    }

    /// The value at a cumulative share, by linear interpolation between the
    /// bracketing points. With fewer than two points the lone point's value
    /// or the average stands in; shares outside the covered span clamp to
    /// the nearest endpoint.
    pub fn get_value(&self, share: Decimal) -> Option<Decimal> {
        match self.points.len() {
            0 => self.average,
            1 => Some(self.points[0].value),
            _ => {
                let first = &self.points[0];
                let last = &self.points[self.points.len() - 1];
                if share <= first.share {
                    return Some(first.value);
                }
                if share >= last.share {
                    return Some(last.value);
                }
                for pair in self.points.windows(2) {
                    let (lo, hi) = (&pair[0], &pair[1]);
                    if share >= lo.share && share <= hi.share {
                        if hi.share == lo.share {
                            return Some(lo.value);
                        }
                        let t = (share - lo.share) / (hi.share - lo.share);
                        return Some(lo.value + (hi.value - lo.value) * t);
                    }
                }
                Some(last.value)
            }
        }
    }

    /// The cumulative share at a value: the inverse interpolation. Returns
    /// `None` when the value lies outside the span of the points.
    pub fn get_share(&self, value: Decimal) -> Option<Decimal> {
        let min = self.min_value()?;
        let max = self.max_value()?;
        if value < min || value > max {
            return None;
        }
        if self.points.len() == 1 {
            return Some(self.points[0].share);
        }
        for pair in self.points.windows(2) {
            let (lo, hi) = (&pair[0], &pair[1]);
            let (low, high) = if lo.value <= hi.value {
                (lo.value, hi.value)
            } else {
                (hi.value, lo.value)
            };
            if value >= low && value <= high {
                if hi.value == lo.value {
                    return Some(lo.share);
                }
                let t = (value - lo.value) / (hi.value - lo.value);
                return Some(lo.share + (hi.share - lo.share) * t);
            }
        }
        None
    }
}

pub fn op(operator: Operator, left: &Distribution, right: &Value) -> JelResult<Value> {
    match (operator, right) {
        (Operator::Equal, Value::Distribution(r)) => Ok(Value::lenient(left == r)),
        (Operator::NotEqual, Value::Distribution(r)) => Ok(Value::lenient(left != r)),
        (Operator::StrictEqual, Value::Distribution(r)) => Ok(Value::Boolean(left == r)),
        (Operator::StrictNotEqual, Value::Distribution(r)) => Ok(Value::Boolean(left != r)),
        _ => Err(JelError::unsupported(
            operator,
            format!("Distribution and {}", right.type_name()),
        )),
    }
}

pub fn single_op(operator: Operator, operand: &Distribution) -> JelResult<Value> {
    let result = match operator {
        Operator::Min => operand.min_value().map(Value::Number),
        Operator::Max => operand.max_value().map(Value::Number),
        Operator::Avg => operand.average().map(Value::Number),
        _ => return Err(JelError::unsupported(operator, "Distribution")),
    };
    Ok(result.unwrap_or(Value::Null))
}
