//! Ready-made arbitraries.
//!
//! ```rust
//! use falsify::arbitraries;
//! use falsify::Arbitrary;
//!
//! let ages = arbitraries::integers::<u8>().between(0, 120);
//! let names = arbitraries::strings().alpha().of_min_length(1).of_max_length(10);
//! let people = arbitraries::lists(names).of_max_size(5);
//! let flags = arbitraries::of(vec!["on", "off"]).optional();
//! # let _ = (ages, people, flags);
//! ```

mod chars;
mod choices;
mod collections;
mod decimals;
mod integers;
mod recursion;
mod strings;

use crate::arbitrary::Arbitrary;
use crate::shrinkable::IntegralValue;

pub use chars::CharArbitrary;
pub use choices::{
    Choice, Create, Just, OneOf, Shuffle, booleans, create, frequency, frequency_of, just, of, one_of, shuffle,
};
pub use collections::{ListArbitrary, MapArbitrary, SetArbitrary};
pub use decimals::DecimalArbitrary;
pub use integers::{IntegerArbitrary, RandomDistribution};
pub use recursion::{Lazy, LazyOf, Supplier, lazy, lazy_of, recursive, recursive_between};
pub use strings::StringArbitrary;

/// Integers of type `T` over its full range, shrinking towards zero
pub fn integers<T: IntegralValue>() -> IntegerArbitrary<T> {
    IntegerArbitrary::new()
}

/// Decimals with two decimal places between minus and plus one billion
pub fn big_decimals() -> DecimalArbitrary {
    DecimalArbitrary::new()
}

/// Characters of the basic multilingual plane unless ranges are added
pub fn chars() -> CharArbitrary {
    CharArbitrary::new()
}

/// Strings of any characters of the basic multilingual plane unless characters are chosen
pub fn strings() -> StringArbitrary {
    StringArbitrary::new()
}

/// Lists of values from `element`
pub fn lists<A>(element: A) -> ListArbitrary<A::Value>
where
    A: Arbitrary + 'static,
    A::Value: PartialEq,
{
    element.list()
}

/// Sets of values from `element`
pub fn sets<A>(element: A) -> SetArbitrary<A::Value>
where
    A: Arbitrary + 'static,
    A::Value: Ord,
{
    element.set()
}

/// Maps with keys from `keys` and values from `values`
pub fn maps<K, V>(keys: K, values: V) -> MapArbitrary<K::Value, V::Value>
where
    K: Arbitrary + 'static,
    V: Arbitrary + 'static,
    K::Value: Ord,
    V::Value: PartialEq,
{
    MapArbitrary::new(keys.boxed(), values.boxed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::{BTreeMap, BTreeSet};

    #[test]
    fn test_factories() {
        let mut rng = StdRng::seed_from_u64(1);
        let list: Vec<u8> = lists(integers::<u8>()).of_size(3).sample(&mut rng).unwrap();
        assert_eq!(list.len(), 3);
        let set: BTreeSet<char> = sets(chars().numeric()).of_size(2).sample(&mut rng).unwrap();
        assert_eq!(set.len(), 2);
        let map: BTreeMap<bool, String> = maps(booleans(), strings()).of_size(2).sample(&mut rng).unwrap();
        assert_eq!(map.len(), 2);
        assert!(big_decimals().sample(&mut rng).is_ok());
    }
}
