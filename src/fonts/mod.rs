//! Font resolution for the PDF engine and the chart rasterizer.
//!
//! Both engines need real glyph metrics, so the fonts are located on disk
//! through a chain of [`FontSource`]s: an explicit directory (or the
//! `PITCH_REPORT_FONTS_DIR` environment variable), the bundled Roboto family in
//! `assets/fonts`, and finally common system families.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

use crate::error::{ReportError, Result};

/// Environment variable that overrides the font directory.
pub const FONTS_DIR_ENV: &str = "PITCH_REPORT_FONTS_DIR";

/// Name of the bundled font family.
pub const BUNDLED_FAMILY_NAME: &str = "Roboto";

/// File names of the four faces of a family. Missing italic faces fall back
/// to the upright ones.
#[derive(Clone, Copy, Debug)]
pub struct FaceNames {
    pub regular: &'static str,
    pub bold: &'static str,
    pub italic: &'static str,
    pub bold_italic: &'static str,
}

const ROBOTO: FaceNames = FaceNames {
    regular: "Roboto-Regular.ttf",
    bold: "Roboto-Bold.ttf",
    italic: "Roboto-Italic.ttf",
    bold_italic: "Roboto-BoldItalic.ttf",
};

const DEJAVU_SANS: FaceNames = FaceNames {
    regular: "DejaVuSans.ttf",
    bold: "DejaVuSans-Bold.ttf",
    italic: "DejaVuSans-Oblique.ttf",
    bold_italic: "DejaVuSans-BoldOblique.ttf",
};

const LIBERATION_SANS: FaceNames = FaceNames {
    regular: "LiberationSans-Regular.ttf",
    bold: "LiberationSans-Bold.ttf",
    italic: "LiberationSans-Italic.ttf",
    bold_italic: "LiberationSans-BoldItalic.ttf",
};

const SEGOE_UI: FaceNames = FaceNames {
    regular: "segoeui.ttf",
    bold: "segoeuib.ttf",
    italic: "segoeuii.ttf",
    bold_italic: "segoeuiz.ttf",
};

const ARIAL_WINDOWS: FaceNames = FaceNames {
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

const ARIAL_MACOS: FaceNames = FaceNames {
    regular: "Arial.ttf",
    bold: "Arial Bold.ttf",
    italic: "Arial Italic.ttf",
    bold_italic: "Arial Bold Italic.ttf",
};

/// Paths of a located font family.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FontFiles {
    pub family: String,
    pub regular: PathBuf,
    pub bold: PathBuf,
    pub italic: PathBuf,
    pub bold_italic: PathBuf,
}

impl FontFiles {
    /// Looks for `names` inside `directory`. Regular and bold faces are required.
    pub fn in_directory(family: &str, directory: &Path, names: &FaceNames) -> Option<Self> {
        let regular = directory.join(names.regular);
        let bold = directory.join(names.bold);
        if !regular.is_file() || !bold.is_file() {
            return None;
        }

        let italic = Some(directory.join(names.italic))
            .filter(|path| path.is_file())
            .unwrap_or_else(|| regular.clone());
        let bold_italic = Some(directory.join(names.bold_italic))
            .filter(|path| path.is_file())
            .unwrap_or_else(|| bold.clone());

        Some(Self {
            family: family.to_owned(),
            regular,
            bold,
            italic,
            bold_italic,
        })
    }

    /// Loads the four faces as a `genpdf` font family.
    ///
    /// Each face is parsed with `ab_glyph` first: `rusttype` panics on empty or
    /// truncated data instead of returning an error.
    pub fn load_family(&self) -> Result<FontFamily<FontData>> {
        let load = |path: &Path| {
            let bytes = fs::read(path).map_err(|err| {
                ReportError::Resource(format!("cannot read font file {}: {err}", path.display()))
            })?;
            if let Err(err) = ab_glyph::FontRef::try_from_slice(&bytes) {
                return Err(ReportError::Resource(format!(
                    "{} is not a usable TrueType font: {err}",
                    path.display()
                )));
            }
            FontData::new(bytes, None).map_err(|source| ReportError::FontLoad {
                family: format!("{} ({})", self.family, path.display()),
                source,
            })
        };

        Ok(FontFamily {
            regular: load(&self.regular)?,
            bold: load(&self.bold)?,
            italic: load(&self.italic)?,
            bold_italic: load(&self.bold_italic)?,
        })
    }

    /// Raw bytes of the regular face.
    pub fn regular_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.regular)?)
    }

    /// Raw bytes of the bold face.
    pub fn bold_bytes(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.bold)?)
    }
}

/// A place where a font family may be found.
pub trait FontSource {
    /// Human readable description used in logs and error messages.
    fn describe(&self) -> String;

    /// Returns the family files when every required face is present.
    fn locate(&self) -> Option<FontFiles>;

    /// Whether using this source means the bundled family was not available.
    fn is_fallback(&self) -> bool {
        false
    }
}

/// A directory holding the bundled family's files.
pub struct DirectorySource {
    directory: PathBuf,
}

impl DirectorySource {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl FontSource for DirectorySource {
    fn describe(&self) -> String {
        format!("{} in {}", BUNDLED_FAMILY_NAME, self.directory.display())
    }

    fn locate(&self) -> Option<FontFiles> {
        FontFiles::in_directory(BUNDLED_FAMILY_NAME, &self.directory, &ROBOTO)
    }
}

/// A font family installed on the system, searched in several directories.
pub struct SystemFamilySource {
    family: &'static str,
    names: FaceNames,
    directories: Vec<PathBuf>,
}

impl SystemFamilySource {
    pub fn new(family: &'static str, names: FaceNames, directories: Vec<PathBuf>) -> Self {
        Self {
            family,
            names,
            directories,
        }
    }
}

impl FontSource for SystemFamilySource {
    fn describe(&self) -> String {
        format!("system family {}", self.family)
    }

    fn locate(&self) -> Option<FontFiles> {
        self.directories
            .iter()
            .find_map(|directory| FontFiles::in_directory(self.family, directory, &self.names))
    }

    fn is_fallback(&self) -> bool {
        true
    }
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn windows_font_directories() -> Vec<PathBuf> {
    let mut directories: Vec<PathBuf> = ["WINDIR", "SystemRoot"]
        .iter()
        .filter_map(|var| env_path(var))
        .map(|root| root.join("Fonts"))
        .collect();
    directories.push(PathBuf::from(r"C:\Windows\Fonts"));
    directories.dedup();
    directories
}

fn bundled_directories() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            candidates.push(bin_dir.join("assets/fonts"));
        }
    }

    let manifest_candidate = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts");
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

/// An ordered chain of font sources; the first source that locates a family wins.
#[derive(Default)]
pub struct FontResolver {
    sources: Vec<Box<dyn FontSource>>,
}

impl FontResolver {
    /// Creates an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a source to the end of the chain.
    pub fn with_source(mut self, source: impl FontSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// The standard chain: `explicit` directory or [`FONTS_DIR_ENV`], the bundled
    /// directories, then DejaVu Sans, Liberation Sans, Segoe UI and Arial.
    pub fn standard(explicit: Option<&Path>) -> Self {
        let mut resolver = Self::new();

        let override_dir = explicit
            .map(Path::to_path_buf)
            .or_else(|| env_path(FONTS_DIR_ENV));
        if let Some(directory) = override_dir {
            resolver = resolver.with_source(DirectorySource::new(directory));
        }

        for directory in bundled_directories() {
            resolver = resolver.with_source(DirectorySource::new(directory));
        }

        let windows = windows_font_directories();
        resolver
            .with_source(SystemFamilySource::new(
                "DejaVu Sans",
                DEJAVU_SANS,
                vec![
                    PathBuf::from("/usr/share/fonts/truetype/dejavu"),
                    PathBuf::from("/usr/share/fonts/TTF"),
                    PathBuf::from("/usr/share/fonts/dejavu"),
                    PathBuf::from("/usr/share/fonts/dejavu-sans-fonts"),
                ],
            ))
            .with_source(SystemFamilySource::new(
                "Liberation Sans",
                LIBERATION_SANS,
                vec![
                    PathBuf::from("/usr/share/fonts/truetype/liberation"),
                    PathBuf::from("/usr/share/fonts/truetype/liberation2"),
                    PathBuf::from("/usr/share/fonts/liberation-sans"),
                    PathBuf::from("/usr/share/fonts/TTF"),
                ],
            ))
            .with_source(SystemFamilySource::new("Segoe UI", SEGOE_UI, windows.clone()))
            .with_source(SystemFamilySource::new("Arial", ARIAL_WINDOWS, windows))
            .with_source(SystemFamilySource::new(
                "Arial",
                ARIAL_MACOS,
                vec![
                    PathBuf::from("/System/Library/Fonts/Supplemental"),
                    PathBuf::from("/Library/Fonts"),
                ],
            ))
    }

    /// Walks the chain and returns the first family found.
    pub fn resolve(&self) -> Result<FontFiles> {
        let mut attempts = Vec::new();

        for source in &self.sources {
            let description = source.describe();
            match source.locate() {
                Some(files) => {
                    if source.is_fallback() {
                        warn!(
                            "Bundled fonts unavailable; falling back to {} ({})",
                            description,
                            files.regular.display()
                        );
                    } else {
                        debug!("using fonts from {description}");
                    }
                    return Ok(files);
                }
                None => {
                    debug!("no usable fonts: {description}");
                    attempts.push(description);
                }
            }
        }

        let summary = if attempts.is_empty() {
            "no font sources were configured".to_owned()
        } else {
            attempts.join(", ")
        };
        Err(ReportError::Resource(format!(
            "no usable font family found (checked: {summary}); \
             copy Roboto into assets/fonts or set {FONTS_DIR_ENV}"
        )))
    }
}

/// Resolves fonts through the standard chain.
pub fn resolve_fonts(explicit: Option<&Path>) -> Result<FontFiles> {
    FontResolver::standard(explicit).resolve()
}

/// Indicates whether the standard chain can find any font family.
pub fn default_fonts_available() -> bool {
    resolve_fonts(None).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    fn touch(directory: &Path, names: &[&str]) {
        for name in names {
            fs::write(directory.join(name), b"").unwrap();
        }
    }

    struct Fixed(Option<FontFiles>);

    impl FontSource for Fixed {
        fn describe(&self) -> String {
            "fixed".into()
        }

        fn locate(&self) -> Option<FontFiles> {
            self.0.clone()
        }
    }

    #[test]
    fn directory_source_finds_all_faces() {
        let dir = tempfile::tempdir().unwrap();
        touch(
            dir.path(),
            &[ROBOTO.regular, ROBOTO.bold, ROBOTO.italic, ROBOTO.bold_italic],
        );

        let files = DirectorySource::new(dir.path()).locate().unwrap();
        assert_eq!(files.family, BUNDLED_FAMILY_NAME);
        assert_eq!(files.italic, dir.path().join(ROBOTO.italic));
    }

    #[test]
    fn italic_faces_fall_back_to_upright() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &[DEJAVU_SANS.regular, DEJAVU_SANS.bold]);

        let files = FontFiles::in_directory("DejaVu Sans", dir.path(), &DEJAVU_SANS).unwrap();
        assert_eq!(files.italic, files.regular);
        assert_eq!(files.bold_italic, files.bold);
    }

    #[test]
    fn missing_bold_face_is_not_a_match() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &[ROBOTO.regular]);
        assert!(DirectorySource::new(dir.path()).locate().is_none());
    }

    #[test]
    fn first_matching_source_wins() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &[ROBOTO.regular, ROBOTO.bold]);

        let resolver = FontResolver::new()
            .with_source(Fixed(None))
            .with_source(DirectorySource::new(dir.path()))
            .with_source(Fixed(Some(FontFiles {
                family: "Other".into(),
                regular: PathBuf::from("a.ttf"),
                bold: PathBuf::from("b.ttf"),
                italic: PathBuf::from("a.ttf"),
                bold_italic: PathBuf::from("b.ttf"),
            })));

        assert_eq!(resolver.resolve().unwrap().family, BUNDLED_FAMILY_NAME);
    }

    #[test]
    fn empty_chain_is_a_resource_error() {
        let err = FontResolver::new().resolve().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Resource);
    }

    #[test]
    fn unreadable_font_is_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), &[ROBOTO.regular, ROBOTO.bold]);
        let files = DirectorySource::new(dir.path()).locate().unwrap();
        let err = files.load_family().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Resource);
    }

    #[test]
    fn truncated_font_is_a_resource_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ROBOTO.regular), b"\x00\x01\x00\x00\x00\x0c").unwrap();
        fs::write(dir.path().join(ROBOTO.bold), b"true").unwrap();
        let files = DirectorySource::new(dir.path()).locate().unwrap();

        let err = files.load_family().unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Resource);
        assert!(err.to_string().contains(ROBOTO.regular));
    }
}
