//! External converters for formats without a parsed document model.
//!
//! Both run as subprocesses: `wvWare` renders legacy Word documents to HTML on
//! stdout, `pdf2htmlEX` writes one HTML file per PDF page.

use super::HtmlPage;
use super::config::LegacyConfig;
use crate::common::{Error, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const EXIT_PASSWORD_REQUIRED: i32 = 100;
const EXIT_WRONG_PASSWORD: i32 = 101;

const PAGE_PREFIX: &str = "page";
const PAGE_SUFFIX: &str = ".html";

fn run(program: &OsString, command: &mut Command) -> Result<Output> {
    command
        .output()
        .map_err(|e| Error::ConversionFailure(format!("cannot run {}: {}", program.to_string_lossy(), e)))
}

fn check_input(input: &Path) -> Result<()> {
    if !input.is_file() {
        return Err(Error::FileNotFound(input.display().to_string()));
    }
    Ok(())
}

fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if stderr.is_empty() {
        format!("exit status {}", output.status)
    } else {
        stderr.to_string()
    }
}

/// Legacy Word converter.
#[derive(Debug, Clone)]
pub struct LegacyConverter {
    program: OsString,
    args: Vec<OsString>,
}

impl LegacyConverter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &LegacyConfig) -> Self {
        Self::new(&config.wv_ware)
    }

    /// Arguments passed before the converter's own options.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Convert `input` into `out_dir/file_name` and return the written path.
    ///
    /// Nothing is left in `out_dir` when the conversion fails.
    pub fn convert(&self, input: &Path, out_dir: &Path, file_name: &str, password: Option<&str>) -> Result<PathBuf> {
        check_input(input)?;

        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(password) = password {
            command.arg("--password").arg(password);
        }
        command.arg(input);
        log::debug!("converting {} with {:?}", input.display(), self.program);
        let output = run(&self.program, &mut command)?;

        match output.status.code() {
            Some(0) => {},
            Some(EXIT_PASSWORD_REQUIRED) => return Err(Error::PasswordRequired),
            Some(EXIT_WRONG_PASSWORD) => return Err(Error::WrongPassword),
            _ => return Err(Error::ConversionFailure(stderr_message(&output))),
        }

        let path = out_dir.join(file_name);
        if let Err(e) = fs::write(&path, &output.stdout) {
            let _ = fs::remove_file(&path);
            return Err(Error::FileNotCreated(format!("{}: {}", path.display(), e)));
        }
        Ok(path)
    }
}

/// PDF converter writing split pages.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    program: OsString,
    args: Vec<OsString>,
}

impl PdfConverter {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn from_config(config: &LegacyConfig) -> Self {
        Self::new(&config.pdf2htmlex).with_args(&config.pdf2htmlex_args)
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Convert `input` into `out_dir` and return the pages in order.
    ///
    /// Fails unless at least one page was written and every page is
    /// non-empty.
    pub fn convert(&self, input: &Path, out_dir: &Path, file_name: &str, password: Option<&str>) -> Result<Vec<HtmlPage>> {
        check_input(input)?;

        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--dest-dir")
            .arg(out_dir)
            .args(["--split-pages", "1"])
            .arg("--page-filename")
            .arg(format!("{}%d{}", PAGE_PREFIX, PAGE_SUFFIX));
        if let Some(password) = password {
            command
                .arg("--owner-password")
                .arg(password)
                .arg("--user-password")
                .arg(password);
        }
        command.arg(input).arg(file_name);
        log::debug!("converting {} with {:?}", input.display(), self.program);
        let output = run(&self.program, &mut command)?;
        if !output.status.success() {
            return Err(Error::ConversionFailure(stderr_message(&output)));
        }

        let pages = collect_pages(out_dir)?;
        if pages.is_empty() {
            return Err(Error::ConversionFailure(format!(
                "no pages written to {}",
                out_dir.display()
            )));
        }
        for page in &pages {
            let size = fs::metadata(&page.path)?.len();
            if size == 0 {
                return Err(Error::ConversionFailure(format!("empty page {}", page.path.display())));
            }
        }
        Ok(pages)
    }
}

/// `page<N>.html` files of `dir`, ordered by page number.
fn collect_pages(dir: &Path) -> Result<Vec<HtmlPage>> {
    let mut numbered = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let number = name
            .strip_prefix(PAGE_PREFIX)
            .and_then(|rest| rest.strip_suffix(PAGE_SUFFIX))
            .and_then(|n| n.parse::<u32>().ok());
        if let Some(number) = number {
            numbered.push((number, entry.path()));
        }
    }
    numbered.sort_by_key(|(number, _)| *number);
    Ok(numbered
        .into_iter()
        .map(|(number, path)| HtmlPage {
            name: format!("{}{}", PAGE_PREFIX, number),
            path,
        })
        .collect())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    /// Converter running `script` through `sh`.
    fn script(dir: &Path, body: &str) -> OsString {
        let path = dir.join("converter.sh");
        fs::write(&path, body).unwrap();
        path.into_os_string()
    }

    const WV_WARE: &str = r#"
if [ "$1" = "--password" ]; then
  if [ "$2" != "secret" ]; then exit 101; fi
  shift 2
elif grep -q locked "$1"; then
  exit 100
fi
if grep -q broken "$1"; then echo "bad input" >&2; exit 3; fi
echo "<html>converted</html>"
"#;

    #[test]
    fn test_legacy_converter() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let converter = LegacyConverter::new("sh").with_args([script(dir.path(), WV_WARE)]);

        let input = dir.path().join("plain.doc");
        fs::write(&input, "plain").unwrap();
        let path = converter.convert(&input, &out, "document.html", None).unwrap();
        assert_eq!(path, out.join("document.html"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "<html>converted</html>\n");
        fs::remove_file(&path).unwrap();

        let locked = dir.path().join("locked.doc");
        fs::write(&locked, "locked").unwrap();
        assert!(matches!(
            converter.convert(&locked, &out, "document.html", None),
            Err(Error::PasswordRequired)
        ));
        assert!(matches!(
            converter.convert(&locked, &out, "document.html", Some("guess")),
            Err(Error::WrongPassword)
        ));
        assert!(!out.join("document.html").exists());
        assert!(converter.convert(&locked, &out, "document.html", Some("secret")).is_ok());

        let broken = dir.path().join("broken.doc");
        fs::write(&broken, "broken").unwrap();
        match converter.convert(&broken, &out, "other.html", None) {
            Err(Error::ConversionFailure(message)) => assert_eq!(message, "bad input"),
            other => panic!("unexpected {:?}", other),
        }
        assert!(!out.join("other.html").exists());

        assert!(matches!(
            converter.convert(&dir.path().join("missing.doc"), &out, "document.html", None),
            Err(Error::FileNotFound(_))
        ));
    }

    #[test]
    fn test_missing_program() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.doc");
        fs::write(&input, "x").unwrap();
        let converter = LegacyConverter::new(dir.path().join("no-such-converter"));
        assert!(matches!(
            converter.convert(&input, dir.path(), "document.html", None),
            Err(Error::ConversionFailure(_))
        ));
    }

    const PDF2HTMLEX: &str = r#"
while [ $# -gt 0 ]; do
  case "$1" in
    --dest-dir) dir="$2"; shift 2 ;;
    --user-password) password="$2"; shift 2 ;;
    *) last="$1"; shift ;;
  esac
done
echo "<html>main</html>" > "$dir/$last"
for n in 1 2 10; do echo "page $n" > "$dir/page$n.html"; done
if [ "$password" = "hollow" ]; then : > "$dir/page2.html"; fi
"#;

    #[test]
    fn test_pdf_converter_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.pdf");
        fs::write(&input, "%PDF-1.4").unwrap();
        let converter = PdfConverter::new("sh").with_args([script(dir.path(), PDF2HTMLEX)]);

        let out = dir.path().join("out");
        fs::create_dir(&out).unwrap();
        let pages = converter.convert(&input, &out, "document.html", None).unwrap();
        let names: Vec<&str> = pages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["page1", "page2", "page10"]);
        assert_eq!(fs::read_to_string(&pages[2].path).unwrap(), "page 10\n");
        assert!(out.join("document.html").is_file());

        let hollow = dir.path().join("hollow");
        fs::create_dir(&hollow).unwrap();
        assert!(matches!(
            converter.convert(&input, &hollow, "document.html", Some("hollow")),
            Err(Error::ConversionFailure(_))
        ));
    }

    #[test]
    fn test_pdf_converter_without_pages() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("a.pdf");
        fs::write(&input, "%PDF-1.4").unwrap();
        let converter = PdfConverter::new("sh").with_args([script(dir.path(), "exit 0\n")]);
        assert!(matches!(
            converter.convert(&input, dir.path(), "document.html", None),
            Err(Error::ConversionFailure(_))
        ));
    }
}
