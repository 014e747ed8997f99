//! Filesystem helpers for commands that write outside the block store.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};

/// Longest file name most filesystems accept, in bytes.
const MAX_NAME_BYTES: usize = 255;

const REPLACED: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Device names Windows refuses as file stems, in any case and with any
/// extension.
static RESERVED_STEMS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7",
        "COM8", "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
    ]
    .into_iter()
    .collect()
});

/// Turn an arbitrary string into a single safe path component.
///
/// Never fails. Separators, control characters and `<>:"/\|?*` become
/// `_`; trailing dots and spaces are trimmed; reserved device names get a
/// `_` prefix; the result is capped at 255 bytes and is never empty,
/// `.`, or `..`.
///
/// ```text
/// "report.pdf"     → "report.pdf"
/// "../etc/passwd"  → ".._etc_passwd"
/// "con.txt"        → "_con.txt"
/// "notes. . "      → "notes"
/// ""               → "_"
/// ```
pub fn clean_filename(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_control() || REPLACED.contains(&c) { '_' } else { c })
        .collect();

    trim_trailing(&mut out);

    let stem = out.split('.').next().unwrap_or_default();
    if RESERVED_STEMS.contains(stem.to_ascii_uppercase().as_str()) {
        out.insert(0, '_');
    }

    if out.len() > MAX_NAME_BYTES {
        let mut cut = MAX_NAME_BYTES;
        while !out.is_char_boundary(cut) {
            cut -= 1;
        }
        out.truncate(cut);
        // The cut may expose a dot or space.
        trim_trailing(&mut out);
    }

    if out.is_empty() {
        out.push('_');
    }
    out
}

fn trim_trailing(name: &mut String) {
    let keep = name.trim_end_matches(['.', ' ']).len();
    name.truncate(keep);
}

/// Make sure `dir` exists, is a directory, and accepts new files.
///
/// # Errors
///
/// Returns an error if the directory cannot be created, `dir` names
/// something other than a directory, or a probe file cannot be written.
pub fn ensure_writable(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let meta = fs::metadata(dir).with_context(|| format!("cannot stat {}", dir.display()))?;
    if !meta.is_dir() {
        bail!("{} is not a directory", dir.display());
    }

    let probe = dir.join(format!(".dagv-write-probe-{}", std::process::id()));
    fs::write(&probe, b"").with_context(|| format!("{} is not writable", dir.display()))?;
    let _ = fs::remove_file(&probe);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_names_pass_through() {
        assert_eq!(clean_filename("report.pdf"), "report.pdf");
        assert_eq!(clean_filename("日本語.txt"), "日本語.txt");
    }

    #[test]
    fn separators_and_reserved_chars_replaced() {
        assert_eq!(clean_filename("../etc/passwd"), ".._etc_passwd");
        assert_eq!(clean_filename("a<b>c:d\"e\\f|g?h*i"), "a_b_c_d_e_f_g_h_i");
        assert_eq!(clean_filename("tab\there\n"), "tab_here_");
    }

    #[test]
    fn trailing_dots_and_spaces_trimmed() {
        assert_eq!(clean_filename("notes. . "), "notes");
        assert_eq!(clean_filename("..."), "_");
        assert_eq!(clean_filename(".."), "_");
        assert_eq!(clean_filename("."), "_");
    }

    #[test]
    fn reserved_device_names_prefixed() {
        assert_eq!(clean_filename("CON"), "_CON");
        assert_eq!(clean_filename("con.txt"), "_con.txt");
        assert_eq!(clean_filename("Lpt9.tar.gz"), "_Lpt9.tar.gz");
        assert_eq!(clean_filename("CONSOLE"), "CONSOLE");
    }

    #[test]
    fn empty_becomes_placeholder() {
        assert_eq!(clean_filename(""), "_");
        assert_eq!(clean_filename("   "), "_");
    }

    #[test]
    fn long_names_capped_on_char_boundary() {
        let name = "é".repeat(200);
        let cleaned = clean_filename(&name);
        assert!(cleaned.len() <= MAX_NAME_BYTES);
        assert_eq!(cleaned.len(), 254);
        assert!(cleaned.chars().all(|c| c == 'é'));
    }

    #[test]
    fn ensure_writable_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        ensure_writable(&nested).unwrap();
        assert!(nested.is_dir());
        assert_eq!(fs::read_dir(&nested).unwrap().count(), 0);
    }

    #[test]
    fn ensure_writable_rejects_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain");
        fs::write(&file, b"x").unwrap();
        assert!(ensure_writable(&file).is_err());
    }
}
