use authorized_keys::{AuthorizedKeys, ListMode};

fn main() {
    let store = AuthorizedKeys::for_current_user()
        .unwrap_or_else(|| AuthorizedKeys::new("/home/core/.ssh/authorized_keys"));
    println!("Inspecting '{}':", store.path().to_string_lossy());

    let keys = store
        .list_keys(ListMode::Fingerprints)
        .expect("unable to read authorized_keys");
    for (i, key) in keys.iter().enumerate() {
        println!(" * Key #{} -> {}", i + 1, key);
    }
}
