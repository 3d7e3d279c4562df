//! authorized-keys
//!
//! this library lists, adds and deletes entries of an OpenSSH
//! `authorized_keys` file, addressing each key by its trailing comment.
//! lines it does not understand are kept as they are.
//!
//! ```no_run
//! use authorized_keys::{AuthorizedKeys, ListMode};
//!
//! # fn main() -> authorized_keys::Result<()> {
//! let store = AuthorizedKeys::new("/home/core/.ssh/authorized_keys");
//! store.add_keys(["ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIBGr/hiKoT+ED6BGl0rYM8Ai96O/2lbnGM++zAbz578V core@build"])?;
//! for comment in store.list_keys(ListMode::CommentsOnly)? {
//!     println!("{}", comment);
//! }
//! store.delete_keys(["core@build"])?;
//! # Ok(())
//! # }
//! ```

mod errors;
mod line;
mod reader;
mod store;

pub use crate::errors::{AuthorizedKeysError, Result};
pub use crate::line::{is_key_type, KeyEntry, KeyLine};
pub use crate::store::{AuthorizedKeys, ListMode};

#[cfg(test)]
const TEST_RSA_DATA: &str = "AAAAB3NzaC1yc2EAAAADAQABAAABAQCcMCOEryBa8IkxXacjIawaQPp08hR5h7+4vZePZ7DByTG3tqKgZYRJ86BaR+4fmdikFoQjvLJVUmwniq3wixhkP7VLCbqip3YHzxXrzxkbPC3w3O1Bdmifwn9cb8RcZXfXncCsSu+h5XCtQ5BOi41Iit3d13gIe/rfXVDURmRanV6R7Voljxdjmp/zyReuzc2/w5SI6Boi4tmcUlxAI7sFuP1kA3pABDhPtc3TDgAcPUIBoDCoY8q2egI197UuvbgsW2qraUcuQxbMvJOMSFg2FQrE2bpEqC4CtBn7+HiJrkVOHjV7bvSv7jd1SuX5XqkwMCRtdMuRpJr7CyZoFL5n";
