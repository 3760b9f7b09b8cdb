//! Injectable randomness for reply selection and order ids
//!
//! The engine takes any `rand::Rng`, so tests can pass a seeded `StdRng` or a
//! `StepRng` and assert exact outputs.

use rand::seq::SliceRandom;
use rand::Rng;

/// Length of a generated order id
pub const ORDER_ID_LEN: usize = 9;

/// Characters an order id is drawn from (base 36, uppercase)
pub const ORDER_ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Pick one canned reply uniformly
///
/// Reply sets are non-empty constants; an empty set yields an empty string.
pub fn pick<R: Rng + ?Sized>(replies: &[&'static str], rng: &mut R) -> &'static str {
    replies.choose(rng).copied().unwrap_or_default()
}

/// Generate an uppercase alphanumeric order id of `ORDER_ID_LEN` characters
pub fn order_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..ORDER_ID_LEN)
        .map(|_| char::from(ORDER_ID_ALPHABET[rng.gen_range(0..ORDER_ID_ALPHABET.len())]))
        .collect()
}

/// True if `id` has the shape produced by [`order_id`]
#[cfg(test)]
pub fn is_order_id(id: &str) -> bool {
    id.len() == ORDER_ID_LEN && id.bytes().all(|b| ORDER_ID_ALPHABET.contains(&b))
}
