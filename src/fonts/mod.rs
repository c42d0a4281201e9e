//! Font loading utilities for the PDF serializer.
//!
//! `genpdf` needs TrueType files for every family it lays out.  The body family is searched in
//! the following order, and the first directory holding all four styles wins:
//!
//! 1. `PLAN_DOC_FONTS_DIR`
//! 2. `assets/fonts` next to the running executable
//! 3. `assets/fonts` inside this crate
//! 4. system fallbacks: Liberation Sans, then Windows Arial
//!
//! The monospace family used for task labels follows the same scheme with
//! `PLAN_DOC_MONO_FONTS_DIR` and is optional.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled body font family.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Roboto";

/// Name of the bundled monospace font family.
pub const DEFAULT_MONO_FAMILY_NAME: &str = "RobotoMono";

const FONTS_DIR_VAR: &str = "PLAN_DOC_FONTS_DIR";
const MONO_FONTS_DIR_VAR: &str = "PLAN_DOC_MONO_FONTS_DIR";

/// File names of the four styles of one family.
struct FamilyFiles {
    name: &'static str,
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl FamilyFiles {
    fn all(&self) -> [&'static str; 4] {
        [self.regular, self.bold, self.italic, self.bold_italic]
    }

    fn missing_in(&self, directory: &Path) -> Vec<&'static str> {
        self.all()
            .into_iter()
            .filter(|name| !directory.join(name).is_file())
            .collect()
    }
}

const ROBOTO: FamilyFiles = FamilyFiles {
    name: DEFAULT_FONT_FAMILY_NAME,
    regular: "Roboto-Regular.ttf",
    bold: "Roboto-Bold.ttf",
    italic: "Roboto-Italic.ttf",
    bold_italic: "Roboto-BoldItalic.ttf",
};

const ROBOTO_MONO: FamilyFiles = FamilyFiles {
    name: DEFAULT_MONO_FAMILY_NAME,
    regular: "RobotoMono-Regular.ttf",
    bold: "RobotoMono-Bold.ttf",
    italic: "RobotoMono-Italic.ttf",
    bold_italic: "RobotoMono-BoldItalic.ttf",
};

const LIBERATION_SANS: FamilyFiles = FamilyFiles {
    name: "Liberation Sans",
    regular: "LiberationSans-Regular.ttf",
    bold: "LiberationSans-Bold.ttf",
    italic: "LiberationSans-Italic.ttf",
    bold_italic: "LiberationSans-BoldItalic.ttf",
};

const LIBERATION_MONO: FamilyFiles = FamilyFiles {
    name: "Liberation Mono",
    regular: "LiberationMono-Regular.ttf",
    bold: "LiberationMono-Bold.ttf",
    italic: "LiberationMono-Italic.ttf",
    bold_italic: "LiberationMono-BoldItalic.ttf",
};

const WINDOWS_ARIAL: FamilyFiles = FamilyFiles {
    name: "Arial",
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

const WINDOWS_COURIER: FamilyFiles = FamilyFiles {
    name: "Courier New",
    regular: "cour.ttf",
    bold: "courbd.ttf",
    italic: "couri.ttf",
    bold_italic: "courbi.ttf",
};

const LIBERATION_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/liberation2",
    "/usr/share/fonts/liberation",
    "/usr/share/fonts/liberation-sans",
    "/usr/share/fonts/liberation-mono",
];

/// Returns the crate-relative directory that holds the bundled font files.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
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

fn bundled_directory_candidates(env_var: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(path) = env_path(env_var) {
        candidates.push(path);
    }

    if let Ok(current_exe) = env::current_exe() {
        if let Some(bin_dir) = current_exe.parent() {
            let candidate = bin_dir.join("assets/fonts");
            if !candidates.contains(&candidate) {
                candidates.push(candidate);
            }
        }
    }

    let manifest_candidate = bundled_fonts_source_dir();
    if !candidates.contains(&manifest_candidate) {
        candidates.push(manifest_candidate);
    }

    candidates
}

fn windows_font_directory() -> Option<PathBuf> {
    if let Some(path) = env_path("PLAN_DOC_WINDOWS_FONTS_DIR") {
        return Some(path);
    }

    #[cfg(windows)]
    {
        for var in ["WINDIR", "SystemRoot"] {
            if let Some(root) = env_path(var) {
                let candidate = root.join("Fonts");
                if candidate.is_dir() {
                    return Some(candidate);
                }
            }
        }
    }

    None
}

/// Ordered `(directory, family)` pairs to probe for a role.
fn search_plan(role: FontRole) -> Vec<(PathBuf, &'static FamilyFiles)> {
    let (env_var, bundled, system, windows) = match role {
        FontRole::Body => (FONTS_DIR_VAR, &ROBOTO, &LIBERATION_SANS, &WINDOWS_ARIAL),
        FontRole::Mono => (MONO_FONTS_DIR_VAR, &ROBOTO_MONO, &LIBERATION_MONO, &WINDOWS_COURIER),
    };

    let mut plan: Vec<(PathBuf, &'static FamilyFiles)> = bundled_directory_candidates(env_var)
        .into_iter()
        .map(|dir| (dir, bundled))
        .collect();
    plan.extend(LIBERATION_DIRS.iter().map(|dir| (PathBuf::from(dir), system)));
    if let Some(dir) = windows_font_directory() {
        plan.push((dir, windows));
    }
    plan
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FontRole {
    Body,
    Mono,
}

fn resolve_family(role: FontRole) -> Result<(PathBuf, &'static FamilyFiles), Error> {
    let mut attempts = Vec::new();

    for (directory, family) in search_plan(role) {
        if !directory.is_dir() {
            attempts.push(format!("{} (directory missing)", directory.display()));
            continue;
        }

        let missing = family.missing_in(&directory);
        if missing.is_empty() {
            debug!("Using '{}' fonts from {}", family.name, directory.display());
            return Ok((directory, family));
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            directory.display(),
            missing.join(", ")
        ));
    }

    Err(Error::new(
        format!(
            "Unable to locate {:?} font family. Checked: {}. See assets/fonts/README.md or set {}.",
            role,
            attempts.join(", "),
            match role {
                FontRole::Body => FONTS_DIR_VAR,
                FontRole::Mono => MONO_FONTS_DIR_VAR,
            }
        ),
        io::Error::new(io::ErrorKind::NotFound, "font family not found"),
    ))
}

fn load_font(directory: &Path, file: &str) -> Result<FontData, Error> {
    let path = directory.join(file);
    FontData::load(&path, None).map_err(|err| {
        Error::new(
            format!("Failed to load font {}: {}", path.display(), err),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn load_family(role: FontRole) -> Result<FontFamily<FontData>, Error> {
    let (directory, family) = resolve_family(role)?;
    Ok(FontFamily {
        regular: load_font(&directory, family.regular)?,
        bold: load_font(&directory, family.bold)?,
        italic: load_font(&directory, family.italic)?,
        bold_italic: load_font(&directory, family.bold_italic)?,
    })
}

/// Loads the body font family.
pub fn default_font_family() -> Result<FontFamily<FontData>, Error> {
    load_family(FontRole::Body)
}

/// Loads the monospace font family, returning `None` with a warning when it is unavailable.
pub fn monospace_font_family() -> Option<FontFamily<FontData>> {
    match load_family(FontRole::Mono) {
        Ok(family) => Some(family),
        Err(err) => {
            warn!("Monospace fonts unavailable ({}); task labels use the body font.", err);
            None
        }
    }
}

/// Indicates whether a body font family can be located on disk.
pub fn default_fonts_available() -> bool {
    resolve_family(FontRole::Body).is_ok()
}

/// Returns true when `err` signals missing font files rather than a layout failure.
pub fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}
