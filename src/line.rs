//! Classification of single `authorized_keys` lines.
//!
//! A line is either a key entry (`<key-type> <base64-data> [comment]`) or
//! an opaque line which is carried through untouched. Options prefixes,
//! `#` comments and blank lines all end up opaque.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use md5::Md5;
use sha2::{Digest, Sha256};

use crate::errors::*;
use crate::reader::embedded_key_type;

const KEY_TYPE_PREFIXES: &[&str] = &["ssh-", "ecdsa-sha2-", "sk-ssh-", "sk-ecdsa-sha2-"];

/// Whether `token` looks like an OpenSSH public key algorithm name.
pub fn is_key_type(token: &str) -> bool {
    KEY_TYPE_PREFIXES
        .iter()
        .any(|prefix| token.len() > prefix.len() && token.starts_with(prefix))
}

/// A recognized key entry. The comment is empty when the line carries none.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyEntry {
    pub key_type: String,
    pub key_data: String,
    pub comment: String,
}

impl KeyEntry {
    /// The comment, if there is one to address this key by.
    pub fn comment(&self) -> Option<&str> {
        if self.comment.is_empty() {
            None
        } else {
            Some(&self.comment)
        }
    }

    /// Decodes the base64 key data, checking that the key type embedded in
    /// the blob agrees with the declared one.
    pub fn blob(&self) -> Result<Vec<u8>> {
        let blob = STANDARD.decode(&self.key_data)?;
        if embedded_key_type(&blob)? != self.key_type {
            return Err(AuthorizedKeysError::InvalidFormat);
        }
        Ok(blob)
    }

    /// The SHA256 fingerprint as printed by `ssh-keygen -l`,
    /// e.g. `SHA256:96eJ3PXgBcuIcwLllSxpHcv8Ewie6oev60Pkmu3pDE8`.
    pub fn fingerprint(&self) -> Result<String> {
        let digest = Sha256::digest(self.blob()?);
        Ok(format!("SHA256:{}", STANDARD_NO_PAD.encode(digest)))
    }

    /// The legacy MD5 fingerprint, colon separated hex pairs.
    pub fn fingerprint_md5(&self) -> Result<String> {
        let digest = Md5::digest(self.blob()?);
        let hex: Vec<String> = digest.iter().map(|b| format!("{:02x}", b)).collect();
        Ok(hex.join(":"))
    }
}

impl fmt::Display for KeyEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {}", self.key_type, self.key_data)?;
        if !self.comment.is_empty() {
            write!(f, " {}", self.comment)?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyLine {
    Entry(KeyEntry),
    Opaque(String),
}

impl KeyLine {
    pub fn parse(line: &str) -> KeyLine {
        let mut parts = line.split_whitespace();
        let (key_type, key_data) = match (parts.next(), parts.next()) {
            (Some(t), Some(d)) if is_key_type(t) => (t, d),
            _ => return KeyLine::Opaque(line.to_owned()),
        };
        let comment = parts.collect::<Vec<_>>().join(" ");
        KeyLine::Entry(KeyEntry {
            key_type: key_type.to_owned(),
            key_data: key_data.to_owned(),
            comment,
        })
    }

    pub fn entry(&self) -> Option<&KeyEntry> {
        match self {
            KeyLine::Entry(entry) => Some(entry),
            KeyLine::Opaque(_) => None,
        }
    }

    /// The entry, only when it carries a comment. Commentless entries can't
    /// be listed, added or deleted.
    pub fn commented(&self) -> Option<&KeyEntry> {
        self.entry().filter(|entry| entry.comment().is_some())
    }

    pub fn comment(&self) -> Option<&str> {
        self.entry().and_then(KeyEntry::comment)
    }
}

impl FromStr for KeyLine {
    type Err = Infallible;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        Ok(KeyLine::parse(line))
    }
}

impl fmt::Display for KeyLine {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            KeyLine::Entry(entry) => fmt::Display::fmt(entry, f),
            KeyLine::Opaque(raw) => f.write_str(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TEST_RSA_DATA;

    #[test]
    fn parse_commented_key() {
        let line = format!("ssh-rsa {} demos@anduin", TEST_RSA_DATA);
        let parsed = KeyLine::parse(&line);
        let entry = parsed.commented().unwrap();
        assert_eq!(entry.key_type, "ssh-rsa");
        assert_eq!(entry.key_data, TEST_RSA_DATA);
        assert_eq!(parsed.comment(), Some("demos@anduin"));
        assert_eq!(parsed.to_string(), line);
    }

    #[test]
    fn parse_multi_word_comment() {
        let line = format!("ssh-rsa {}   build  bot@ci ", TEST_RSA_DATA);
        let parsed: KeyLine = line.parse().unwrap();
        assert_eq!(parsed.comment(), Some("build bot@ci"));
        assert_eq!(
            parsed.to_string(),
            format!("ssh-rsa {} build bot@ci", TEST_RSA_DATA)
        );
    }

    #[test]
    fn parse_commentless_key() {
        let line = format!("ssh-rsa {}", TEST_RSA_DATA);
        let parsed = KeyLine::parse(&line);
        assert!(parsed.entry().is_some());
        assert!(parsed.commented().is_none());
        assert_eq!(parsed.comment(), None);
        assert_eq!(parsed.to_string(), line);
    }

    #[test]
    fn parse_opaque_lines() {
        for line in [
            "",
            "invalid-key",
            "# managed by provisioning",
            "keyA user@host",
            "ssh- AAAA user@host",
            "no-pty ssh-rsa AAAA user@host",
        ] {
            assert_eq!(KeyLine::parse(line), KeyLine::Opaque(line.to_owned()));
            assert_eq!(KeyLine::parse(line).to_string(), line);
        }
    }

    #[test]
    fn recognized_key_types() {
        for t in [
            "ssh-rsa",
            "ssh-dss",
            "ssh-ed25519",
            "ecdsa-sha2-nistp256",
            "sk-ssh-ed25519@openssh.com",
            "sk-ecdsa-sha2-nistp256@openssh.com",
            "ssh-rsa-cert-v01@openssh.com",
        ] {
            assert!(is_key_type(t), "{}", t);
        }
        assert!(!is_key_type("rsa"));
        assert!(!is_key_type("ssh-"));
    }

    #[test]
    fn fingerprints() {
        let line = format!("ssh-rsa {} demos@anduin", TEST_RSA_DATA);
        let parsed = KeyLine::parse(&line);
        let entry = parsed.entry().unwrap();
        assert_eq!(
            entry.fingerprint().unwrap(),
            "SHA256:96eJ3PXgBcuIcwLllSxpHcv8Ewie6oev60Pkmu3pDE8"
        );
        assert_eq!(
            entry.fingerprint_md5().unwrap(),
            "fb:a0:5b:a0:21:01:47:33:3b:8d:9e:14:1a:4c:db:6d"
        );
    }

    #[test]
    fn fingerprint_rejects_mismatched_type() {
        let line = format!("ssh-ed25519 {} demos@anduin", TEST_RSA_DATA);
        let parsed = KeyLine::parse(&line);
        assert!(matches!(
            parsed.entry().unwrap().fingerprint(),
            Err(AuthorizedKeysError::InvalidFormat)
        ));
    }

    #[test]
    fn fingerprint_rejects_bad_base64() {
        let parsed = KeyLine::parse("ssh-rsa not*base64 user@host");
        assert!(matches!(
            parsed.entry().unwrap().fingerprint(),
            Err(AuthorizedKeysError::Base64(_))
        ));
    }
}
