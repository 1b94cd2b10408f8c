#[cfg(feature = "ssr")]
use secret_santa::{establish_connection, get_all_participants, seed_participants};

#[cfg(feature = "ssr")]
fn main() {
    let names: Vec<String> = std::env::args().skip(1).collect();
    if names.is_empty() {
        eprintln!("Usage: seed_participants NAME...");
        std::process::exit(1);
    }

    let mut conn = establish_connection();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let added = seed_participants(&mut conn, &names).expect("Failed to seed participants");
    println!("Added {} participant(s).", added);

    let roster = get_all_participants(&mut conn).expect("Failed to load participants");
    for participant in roster {
        println!("  {} ({})", participant.name, participant.avatar_url);
    }
}

#[cfg(not(feature = "ssr"))]
fn main() {
    println!("This binary requires the 'ssr' feature to be enabled.");
}
