#[cfg(feature = "ssr")]
use secret_santa::error::GiftError;
#[cfg(feature = "ssr")]
use secret_santa::{establish_connection, register_user};

#[cfg(feature = "ssr")]
fn main() {
    let names: Vec<String> = std::env::args().skip(1).collect();
    if names.is_empty() {
        eprintln!("Usage: add_user NAME...");
        std::process::exit(1);
    }

    let mut conn = establish_connection();
    for name in &names {
        match register_user(&mut conn, name) {
            Ok((user, code)) => println!("{}\t{code}", user.name),
            Err(GiftError::NameTaken(name)) => eprintln!("{name} is already registered, skipping."),
            Err(e) => {
                eprintln!("Failed to register {name}: {e}");
                std::process::exit(1);
            }
        }
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {
    println!("This binary requires the 'ssr' feature to be enabled.");
}
