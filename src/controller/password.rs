//! Password generation for database master accounts.

use rand::seq::SliceRandom;
use rand::Rng;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
/// Special characters accepted by both RDS and Redis account APIs
const SPECIAL: &[u8] = b"!@#$%^&*()_+-=";

pub const PASSWORD_LENGTH: usize = 20;

/// Random password with at least one character of every class
#[must_use]
pub fn generate_password() -> String {
    let mut rng = rand::thread_rng();
    let classes = [LOWER, UPPER, DIGITS, SPECIAL];
    let all: Vec<u8> = classes.concat();

    let mut chars: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    while chars.len() < PASSWORD_LENGTH {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);
    chars.into_iter().map(char::from).collect()
}
