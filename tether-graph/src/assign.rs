//! Assignment of found objects into fields.
//!
//! A found object is assigned directly when its handle has the field's
//! type (sharing the `Arc` for references). Otherwise numbers may widen:
//! any integer into any integer field, any float into any float field,
//! with integer conversions range-checked. Nothing else converts.

use std::any::Any;
use std::sync::Arc;

use crate::object::Object;

/// Why a found object could not be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AssignError {
    /// Kinds do not match (including integer → float).
    Incompatible,
    /// Integer does not fit the field's width.
    OutOfRange,
}

pub(crate) fn reference<T: Send + Sync + 'static>(found: &Object) -> Result<Arc<T>, AssignError> {
    found.get::<T>().ok_or(AssignError::Incompatible)
}

pub(crate) fn interface<I: ?Sized + Send + Sync + 'static>(
    found: &Object,
) -> Result<Arc<I>, AssignError> {
    found.view::<I>().ok_or(AssignError::Incompatible)
}

pub(crate) fn value<F: Clone + 'static>(found: &Object) -> Result<F, AssignError> {
    if let Some(exact) = found.value::<F>() {
        return Ok(exact);
    }
    widen(found.handle())
}

/// Numeric fallback for a handle of a different numeric type.
fn widen<F: 'static>(found: &dyn Any) -> Result<F, AssignError> {
    if let Some(int) = integer(found) {
        return cast_integer(int);
    }
    if let Some(float) = float(found) {
        return cast_float(float);
    }
    Err(AssignError::Incompatible)
}

fn integer(found: &dyn Any) -> Option<i128> {
    macro_rules! probe {
        ($($t:ty),*) => {
            $(
                if let Some(v) = found.downcast_ref::<$t>() {
                    return i128::try_from(*v).ok();
                }
            )*
        };
    }
    probe!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
    None
}

fn float(found: &dyn Any) -> Option<f64> {
    if let Some(v) = found.downcast_ref::<f64>() {
        return Some(*v);
    }
    found.downcast_ref::<f32>().map(|v| f64::from(*v))
}

fn cast_integer<F: 'static>(int: i128) -> Result<F, AssignError> {
    let mut out: Option<F> = None;
    let slot: &mut dyn Any = &mut out;

    macro_rules! fill {
        ($($t:ty),*) => {
            $(
                if let Some(target) = slot.downcast_mut::<Option<$t>>() {
                    *target = Some(<$t>::try_from(int).map_err(|_| AssignError::OutOfRange)?);
                }
            )*
        };
    }
    fill!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

    out.ok_or(AssignError::Incompatible)
}

fn cast_float<F: 'static>(float: f64) -> Result<F, AssignError> {
    let mut out: Option<F> = None;
    let slot: &mut dyn Any = &mut out;

    if let Some(target) = slot.downcast_mut::<Option<f64>>() {
        *target = Some(float);
    } else if let Some(target) = slot.downcast_mut::<Option<f32>>() {
        *target = Some(float as f32);
    }

    out.ok_or(AssignError::Incompatible)
}
