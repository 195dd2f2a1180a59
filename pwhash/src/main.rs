use std::io::{self, BufRead};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use clap::Parser;

/// Produce (or check) the argon2 `password_hash` for the admin credential file.
///
/// - Hash: prints an argon2id PHC string for `--password` (or the first line of stdin)
/// - Verify: with `--verify <PHC>`, exits 0 when the password matches, 1 otherwise
///
/// Example:
///   pwhash --password 's3cret'
///   echo 's3cret' | pwhash --verify '$argon2id$v=19$...'
#[derive(Parser, Debug)]
#[command(name = "pwhash", version, about)]
struct Args {
    /// Password to hash. Read from stdin when omitted (keeps it out of shell history).
    #[arg(long)]
    password: Option<String>,

    /// Existing PHC string to check the password against instead of hashing.
    #[arg(long, value_name = "PHC")]
    verify: Option<String>,
}

fn read_password(arg: Option<String>) -> io::Result<String> {
    if let Some(p) = arg {
        return Ok(p);
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn hash(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

fn verify(password: &str, phc: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(phc)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let password = read_password(args.password)?;

    if password.is_empty() {
        return Err("password must not be empty".into());
    }

    match args.verify {
        Some(phc) => {
            if verify(&password, &phc)? {
                println!("ok");
            } else {
                eprintln!("password does not match");
                std::process::exit(1);
            }
        }
        None => println!("{}", hash(&password)?),
    }

    Ok(())
}
