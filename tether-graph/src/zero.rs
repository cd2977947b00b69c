//! Zero-value detection.
//!
//! Injection never overwrites a field that already holds something.
//! [`Zero`] tells the engine whether a field is still at its empty
//! state: `None`, `0`, `""`, an empty collection, or a struct whose
//! fields are all zero (`#[derive(Zero)]`).

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

/// Reports whether a value is still at its zero state.
pub trait Zero {
    fn is_zero(&self) -> bool;
}

macro_rules! numeric_zero {
    ($($t:ty => $zero:expr),* $(,)?) => {
        $(
            impl Zero for $t {
                #[inline]
                fn is_zero(&self) -> bool {
                    *self == $zero
                }
            }
        )*
    };
}

numeric_zero! {
    i8 => 0, i16 => 0, i32 => 0, i64 => 0, i128 => 0, isize => 0,
    u8 => 0, u16 => 0, u32 => 0, u64 => 0, u128 => 0, usize => 0,
    f32 => 0.0, f64 => 0.0,
    bool => false, char => '\0',
}

impl Zero for String {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl Zero for &'static str {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Zero for Option<T> {
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

/// A live `Arc` always points somewhere.
impl<T: ?Sized> Zero for Arc<T> {
    fn is_zero(&self) -> bool {
        false
    }
}

impl<T> Zero for Vec<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Zero for VecDeque<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Zero for HashMap<K, V, S> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T, S> Zero for HashSet<T, S> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Zero for BTreeMap<K, V> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Zero for BTreeSet<T> {
    fn is_zero(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Zero, const N: usize> Zero for [T; N] {
    fn is_zero(&self) -> bool {
        self.iter().all(Zero::is_zero)
    }
}

impl Zero for () {
    fn is_zero(&self) -> bool {
        true
    }
}
