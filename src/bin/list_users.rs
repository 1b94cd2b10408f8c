#[cfg(feature = "ssr")]
use secret_santa::{establish_connection, get_login_codes};

#[cfg(feature = "ssr")]
fn main() {
    let mut conn = establish_connection();
    let users = get_login_codes(&mut conn).expect("Failed to load users");
    if users.is_empty() {
        println!("No users.");
        return;
    }
    for (name, code) in users {
        println!("{name}\t{code}");
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {
    println!("This binary requires the 'ssr' feature to be enabled.");
}
