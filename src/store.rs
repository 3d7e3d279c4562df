//! Read, list, add and delete operations over an `authorized_keys` file.
//!
//! Every operation reads the whole file, works on the parsed lines and,
//! when it mutates, writes the whole file back once. Nothing is cached
//! between calls; the file may be edited by hand in the meantime.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, trace};

use crate::errors::*;
use crate::line::KeyLine;

/// What [`AuthorizedKeys::list_keys`] emits for each commented key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListMode {
    /// Only the comment, e.g. `user@host`.
    CommentsOnly,
    /// The whole key line.
    FullLine,
    /// `<sha256 fingerprint> (<comment>)`.
    Fingerprints,
}

#[derive(Clone, Debug)]
pub struct AuthorizedKeys {
    path: PathBuf,
}

impl AuthorizedKeys {
    pub fn new<P: Into<PathBuf>>(path: P) -> AuthorizedKeys {
        AuthorizedKeys { path: path.into() }
    }

    /// `~/.ssh/authorized_keys` of the current user, if a home directory
    /// can be found.
    pub fn for_current_user() -> Option<AuthorizedKeys> {
        home::home_dir().map(|home| AuthorizedKeys::new(home.join(".ssh").join("authorized_keys")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the raw lines of the file. A missing file has no lines.
    pub fn read_authorised_keys(&self) -> Result<Vec<String>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!("{} does not exist", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let mut lines: Vec<String> = content.split('\n').map(str::to_owned).collect();
        if lines.last().map_or(false, |l| l.is_empty()) {
            lines.pop();
        }
        trace!("read {} lines from {}", lines.len(), self.path.display());
        Ok(lines)
    }

    /// Lists the commented keys in file order. Opaque and commentless
    /// lines are left out.
    pub fn list_keys(&self, mode: ListMode) -> Result<Vec<String>> {
        let mut listed = Vec::new();
        for line in self.read_authorised_keys()? {
            let parsed = KeyLine::parse(&line);
            let entry = match parsed.commented() {
                Some(entry) => entry,
                None => continue,
            };
            match mode {
                ListMode::CommentsOnly => listed.push(entry.comment.clone()),
                ListMode::FullLine => listed.push(entry.to_string()),
                ListMode::Fingerprints => match entry.fingerprint() {
                    Ok(fp) => listed.push(format!("{} ({})", fp, entry.comment)),
                    Err(e) => debug!("skipping key {:?} without fingerprint: {}", entry.comment, e),
                },
            }
        }
        Ok(listed)
    }

    /// Appends `keys` after the existing lines. Each key needs a comment
    /// that is not yet used in the file or earlier in `keys`. Either every
    /// key is added or the file is left alone.
    pub fn add_keys<I, S>(&self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lines = self.read_authorised_keys()?;
        let mut comments: HashSet<String> = lines
            .iter()
            .filter_map(|line| KeyLine::parse(line).comment().map(str::to_owned))
            .collect();

        let mut added = Vec::new();
        for key in keys {
            let parsed = KeyLine::parse(key.as_ref());
            let entry = parsed
                .commented()
                .ok_or(AuthorizedKeysError::MissingComment)?;
            if !comments.insert(entry.comment.clone()) {
                return Err(AuthorizedKeysError::DuplicateKey(entry.comment.clone()));
            }
            added.push(entry.to_string());
        }
        if added.is_empty() {
            return Ok(());
        }

        log_unrecognised(&lines);
        lines.extend(added);
        self.write_authorised_keys(&lines)
    }

    /// Removes the keys carrying the given comments. Fails without touching
    /// the file if a comment matches no key, or if no key entry would be
    /// left afterwards.
    pub fn delete_keys<I, S>(&self, comments: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = self.read_authorised_keys()?;
        let parsed: Vec<KeyLine> = lines.iter().map(|line| KeyLine::parse(line)).collect();

        let mut doomed = vec![false; lines.len()];
        for comment in comments {
            let comment = comment.as_ref();
            let found = parsed
                .iter()
                .enumerate()
                .position(|(i, line)| !doomed[i] && line.comment() == Some(comment))
                .ok_or_else(|| AuthorizedKeysError::KeyNotFound(comment.to_owned()))?;
            doomed[found] = true;
        }

        let remaining_keys = parsed
            .iter()
            .zip(&doomed)
            .filter(|(line, gone)| !**gone && line.entry().is_some())
            .count();
        if remaining_keys == 0 {
            return Err(AuthorizedKeysError::WouldDeleteAllKeys);
        }

        let kept: Vec<String> = lines
            .into_iter()
            .zip(doomed)
            .filter_map(|(line, gone)| if gone { None } else { Some(line) })
            .collect();
        log_unrecognised(&kept);
        self.write_authorised_keys(&kept)
    }

    /// Replaces the file with `lines` joined by newlines. The content goes
    /// to a sibling temporary file first and is renamed into place.
    fn write_authorised_keys(&self, lines: &[String]) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            create_dir(dir)?;
        }
        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "authorized_keys".into());
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let result = write_file(&tmp_path, lines.join("\n").as_bytes())
            .and_then(|()| fs::rename(&tmp_path, &self.path));
        if let Err(e) = result {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        debug!("wrote {} lines to {}", lines.len(), self.path.display());
        Ok(())
    }
}

fn log_unrecognised(lines: &[String]) {
    for line in lines {
        if KeyLine::parse(line).commented().is_none() {
            debug!("keeping unrecognised existing ssh key {:?}", line);
        }
    }
}

#[cfg(unix)]
fn create_dir(dir: &Path) -> io::Result<()> {
    use std::os::unix::fs::DirBuilderExt;
    fs::DirBuilder::new().recursive(true).mode(0o755).create(dir)
}

#[cfg(not(unix))]
fn create_dir(dir: &Path) -> io::Result<()> {
    fs::DirBuilder::new().recursive(true).create(dir)
}

/// Writes `content` to a fresh file at `path` with mode 0644. A file left
/// behind by an interrupted write is removed first so its mode can't leak.
fn write_file(path: &Path, content: &[u8]) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => return Err(e),
        _ => {}
    }
    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o644);
    }
    let mut file = options.open(path)?;
    // mode() above is still subject to the umask
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o644))?;
    }
    file.write_all(content)?;
    file.sync_all()
}
