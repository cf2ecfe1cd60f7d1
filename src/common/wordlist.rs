use std::fs;
use std::io;
use std::path::Path;

use log::warn;

use crate::engine::CredentialPair;

/// Read a wordlist file: one token per line, blank lines and `#` comments
/// skipped. Invalid UTF-8 is read lossily rather than failing the run.
pub fn read_wordlist(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let raw = fs::read(path)?;
    let text = String::from_utf8_lossy(&raw);

    let mut entries = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if !line.is_empty() && !line.starts_with('#') {
            entries.push(line.to_string());
        }
    }
    Ok(entries)
}

/// Read a `username:password` pairs file, splitting on the first `:` only.
/// Malformed non-comment lines are skipped with a warning, not fatal.
pub fn read_pairs(path: impl AsRef<Path>) -> io::Result<Vec<CredentialPair>> {
    let raw = fs::read(path.as_ref())?;
    let text = String::from_utf8_lossy(&raw);

    let mut pairs = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split_once(':') {
            Some((username, password)) => pairs.push(CredentialPair::new(username, password)),
            None => warn!(
                "{}:{}: skipping malformed pair line: {}",
                path.as_ref().display(),
                number + 1,
                line
            ),
        }
    }
    Ok(pairs)
}

/// Bundled fallback wordlists, used when no list file is supplied.
pub const DEFAULT_USERS: &[&str] = &[
    "admin", "administrator", "root", "user", "test", "guest", "demo", "service", "operator",
    "manager", "support", "web", "www", "ftp", "mail", "backup",
];

pub const DEFAULT_PASSWORDS: &[&str] = &[
    "", "admin", "administrator", "password", "123456", "admin123", "root", "user", "test",
    "guest", "default", "changeme", "letmein", "welcome", "qwerty", "abc123", "12345",
    "password123", "pass", "secret",
];

pub fn default_users() -> Vec<String> {
    DEFAULT_USERS.iter().map(|s| s.to_string()).collect()
}

pub fn default_passwords() -> Vec<String> {
    DEFAULT_PASSWORDS.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn wordlist_skips_blanks_and_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.txt");
        std::fs::write(&path, "admin\n\n# comment\n  root  \n").unwrap();
        assert_eq!(read_wordlist(&path).unwrap(), vec!["admin", "root"]);
    }

    #[test]
    fn pairs_skip_comments_and_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "admin:admin\nroot:toor\n#comment\nmalformed_line\n").unwrap();
        drop(file);

        let pairs = read_pairs(&path).unwrap();
        assert_eq!(
            pairs,
            vec![
                CredentialPair::new("admin", "admin"),
                CredentialPair::new("root", "toor"),
            ]
        );
    }

    #[test]
    fn pairs_split_on_first_colon_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pairs.txt");
        std::fs::write(&path, "user:pa:ss:word\n").unwrap();
        assert_eq!(
            read_pairs(&path).unwrap(),
            vec![CredentialPair::new("user", "pa:ss:word")]
        );
    }
}
