//! Prints a bcrypt hash suitable for `DELETE_PASSWORD_HASH`.

use bcrypt::{hash, DEFAULT_COST};
use std::env;

fn main() {
    let password = env::args().nth(1).unwrap_or_else(|| {
        eprintln!("Usage: cargo run --bin hash-password <DELETE_PASSWORD>");
        std::process::exit(1);
    });

    if password.is_empty() {
        eprintln!("Refusing to hash an empty password");
        std::process::exit(1);
    }

    match hash(&password, DEFAULT_COST) {
        Ok(hashed) => {
            println!("\nCost     : {}", DEFAULT_COST);
            println!("Hash     : {}\n", hashed);
            println!("# Paste this into your .env (and remove DELETE_PASSWORD):");
            println!("DELETE_PASSWORD_HASH={}", hashed);
        }
        Err(e) => {
            eprintln!("Error hashing password: {}", e);
            std::process::exit(1);
        }
    }
}
