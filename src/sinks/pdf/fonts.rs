use crate::error::BookError;
use anyhow::{anyhow, Context, Result};
use owned_ttf_parser::{AsFaceRef, GlyphId, OwnedFace};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// The four faces a family provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub const ALL: [FontStyle; 4] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];

    pub fn of(bold: bool, italic: bool) -> FontStyle {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    /// Name of the font in a page's resource dictionary.
    pub fn resource_name(&self) -> &'static [u8] {
        match self {
            FontStyle::Regular => b"F1",
            FontStyle::Bold => b"F2",
            FontStyle::Italic => b"F3",
            FontStyle::BoldItalic => b"F4",
        }
    }
}

/// A glyph id and its horizontal advance in ems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glyph {
    pub id: u16,
    pub advance: f32,
}

/// What layout and embedding need from a font face.
///
/// Metrics are in ems so callers scale by their own font size.
pub trait Typeface: Send + Sync {
    fn name(&self) -> &str;

    /// The glyph for `ch`, or the face's missing glyph if it has none.
    fn glyph(&self, ch: char) -> Glyph;

    fn ascent(&self) -> f32;

    /// Negative below the baseline
    fn descent(&self) -> f32;

    fn cap_height(&self) -> f32;

    /// `[x_min, y_min, x_max, y_max]`
    fn bbox(&self) -> [f32; 4];

    fn is_italic(&self) -> bool;

    /// TrueType program to embed, if the face has one.
    fn program(&self) -> Option<&[u8]>;

    fn measure(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|ch| self.glyph(ch).advance).sum::<f32>() * size
    }
}

/// Regular, bold, italic and bold italic faces of one family.
///
/// Families that lack a variant reuse their regular face in its place.
pub struct FontFamily {
    pub regular: Box<dyn Typeface>,
    pub bold: Box<dyn Typeface>,
    pub italic: Box<dyn Typeface>,
    pub bold_italic: Box<dyn Typeface>,
}

impl FontFamily {
    pub fn face(&self, style: FontStyle) -> &dyn Typeface {
        match style {
            FontStyle::Regular => self.regular.as_ref(),
            FontStyle::Bold => self.bold.as_ref(),
            FontStyle::Italic => self.italic.as_ref(),
            FontStyle::BoldItalic => self.bold_italic.as_ref(),
        }
    }
}

/// Somewhere a serif family can be found.
pub trait FontProvider {
    fn family(&self) -> Result<FontFamily>;
}

/// A TrueType or OpenType face loaded from disk.
pub struct TrueTypeFace {
    name: String,
    data: Vec<u8>,
    face: OwnedFace,
    units_per_em: f32,
}

impl TrueTypeFace {
    pub fn load(path: &Path) -> Result<TrueTypeFace> {
        let data = std::fs::read(path)
            .with_context(|| format!("Failed to read font file: {}", path.display()))?;
        let face = OwnedFace::from_vec(data.clone(), 0)
            .map_err(|e| anyhow!("Failed to parse font file {}: {e}", path.display()))?;
        let units_per_em = face.as_face_ref().units_per_em() as f32;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Font".to_string());

        Ok(TrueTypeFace {
            name,
            data,
            face,
            units_per_em,
        })
    }

    fn em(&self, units: i16) -> f32 {
        units as f32 / self.units_per_em
    }
}

impl Typeface for TrueTypeFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn glyph(&self, ch: char) -> Glyph {
        let face = self.face.as_face_ref();
        let id = face.glyph_index(ch).unwrap_or(GlyphId(0));
        let advance = face.glyph_hor_advance(id).unwrap_or(0) as f32 / self.units_per_em;
        Glyph { id: id.0, advance }
    }

    fn ascent(&self) -> f32 {
        self.em(self.face.as_face_ref().ascender())
    }

    fn descent(&self) -> f32 {
        self.em(self.face.as_face_ref().descender())
    }

    fn cap_height(&self) -> f32 {
        let face = self.face.as_face_ref();
        face.capital_height()
            .map(|h| self.em(h))
            .unwrap_or_else(|| self.ascent() * 0.7)
    }

    fn bbox(&self) -> [f32; 4] {
        let rect = self.face.as_face_ref().global_bounding_box();
        [
            self.em(rect.x_min),
            self.em(rect.y_min),
            self.em(rect.x_max),
            self.em(rect.y_max),
        ]
    }

    fn is_italic(&self) -> bool {
        self.face.as_face_ref().is_italic()
    }

    fn program(&self) -> Option<&[u8]> {
        Some(&self.data)
    }
}

/// Known serif families, in order of preference, by the file names they install under.
struct SerifFamily {
    regular: &'static [&'static str],
    bold: &'static [&'static str],
    italic: &'static [&'static str],
    bold_italic: &'static [&'static str],
}

const SERIF_FAMILIES: &[SerifFamily] = &[
    SerifFamily {
        regular: &["DejaVuSerif.ttf"],
        bold: &["DejaVuSerif-Bold.ttf"],
        italic: &["DejaVuSerif-Italic.ttf"],
        bold_italic: &["DejaVuSerif-BoldItalic.ttf"],
    },
    SerifFamily {
        regular: &["LiberationSerif-Regular.ttf"],
        bold: &["LiberationSerif-Bold.ttf"],
        italic: &["LiberationSerif-Italic.ttf"],
        bold_italic: &["LiberationSerif-BoldItalic.ttf"],
    },
    SerifFamily {
        regular: &["NotoSerif-Regular.ttf"],
        bold: &["NotoSerif-Bold.ttf"],
        italic: &["NotoSerif-Italic.ttf"],
        bold_italic: &["NotoSerif-BoldItalic.ttf"],
    },
    SerifFamily {
        regular: &["Times New Roman.ttf", "times.ttf"],
        bold: &["Times New Roman Bold.ttf", "timesbd.ttf"],
        italic: &["Times New Roman Italic.ttf", "timesi.ttf"],
        bold_italic: &["Times New Roman Bold Italic.ttf", "timesbi.ttf"],
    },
    SerifFamily {
        regular: &["Georgia.ttf", "georgia.ttf"],
        bold: &["Georgia Bold.ttf", "georgiab.ttf"],
        italic: &["Georgia Italic.ttf", "georgiai.ttf"],
        bold_italic: &["Georgia Bold Italic.ttf", "georgiaz.ttf"],
    },
];

fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![
        PathBuf::from("/usr/share/fonts"),
        PathBuf::from("/usr/local/share/fonts"),
        PathBuf::from("/Library/Fonts"),
        PathBuf::from("/System/Library/Fonts"),
        PathBuf::from(r"C:\Windows\Fonts"),
    ];
    if let Some(home) = std::env::var_os("HOME") {
        let home = PathBuf::from(home);
        dirs.push(home.join(".fonts"));
        dirs.push(home.join(".local/share/fonts"));
        dirs.push(home.join("Library/Fonts"));
    }
    dirs
}

/// Serif fonts installed on this machine, or a family at an explicit base path.
///
/// An explicit path like `./fonts/MyFont` loads `MyFont-Regular.ttf`, `MyFont-Bold.ttf`,
/// `MyFont-Italic.ttf` and `MyFont-BoldItalic.ttf`; a path ending in `.ttf` is used as is.
pub struct SystemFonts {
    explicit: Option<String>,
    search_dirs: Vec<PathBuf>,
}

impl SystemFonts {
    pub fn new(explicit: Option<String>) -> SystemFonts {
        SystemFonts {
            explicit,
            search_dirs: default_font_dirs(),
        }
    }

    #[cfg(test)]
    pub fn with_search_dirs(mut self, search_dirs: Vec<PathBuf>) -> SystemFonts {
        self.search_dirs = search_dirs;
        self
    }

    /// Every font file under the search directories, keyed by lowercase file name.
    fn index(&self) -> HashMap<String, PathBuf> {
        let mut files = HashMap::new();
        for dir in self.search_dirs.iter().filter(|d| d.is_dir()) {
            let walker = ignore::WalkBuilder::new(dir)
                .standard_filters(false)
                .follow_links(true)
                .build();
            for entry in walker.filter_map(|e| e.ok()) {
                if !entry.file_type().is_some_and(|t| t.is_file()) {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().to_lowercase();
                if name.ends_with(".ttf") || name.ends_with(".otf") {
                    files.entry(name).or_insert_with(|| entry.path().to_path_buf());
                }
            }
        }
        files
    }

    fn load_installed(&self) -> Result<FontFamily> {
        let index = self.index();
        let find = |names: &[&str]| {
            names
                .iter()
                .find_map(|name| index.get(&name.to_lowercase()))
                .cloned()
        };

        for family in SERIF_FAMILIES {
            let Some(regular_path) = find(family.regular) else {
                continue;
            };
            log::info!("using installed font {}", regular_path.display());

            let variant = |names: &[&str]| -> Result<Box<dyn Typeface>> {
                let path = find(names).unwrap_or_else(|| {
                    log::warn!("no {} installed, using the regular face", names[0]);
                    regular_path.clone()
                });
                Ok(Box::new(TrueTypeFace::load(&path)?))
            };
            return Ok(FontFamily {
                regular: variant(family.regular)?,
                bold: variant(family.bold)?,
                italic: variant(family.italic)?,
                bold_italic: variant(family.bold_italic)?,
            });
        }

        Err(BookError::NoSerifFontAvailable {
            searched: self
                .search_dirs
                .iter()
                .map(|d| d.display().to_string())
                .collect(),
        }
        .into())
    }

    fn load_from_path(font_path: &str) -> Result<FontFamily> {
        let base = PathBuf::from(font_path);

        let regular_path = find_font_file(&base, &["Regular", "regular", ""])?;
        let regular = TrueTypeFace::load(&regular_path)?;

        // missing variants fall back to regular
        let bold = try_load_variant(&base, &["Bold", "bold"], &regular_path)?;
        let italic = try_load_variant(&base, &["Italic", "It", "italic", "it"], &regular_path)?;
        let bold_italic = try_load_variant(
            &base,
            &["BoldItalic", "BoldIt", "bolditalic", "boldit"],
            &regular_path,
        )?;

        Ok(FontFamily {
            regular: Box::new(regular),
            bold: Box::new(bold),
            italic: Box::new(italic),
            bold_italic: Box::new(bold_italic),
        })
    }
}

impl FontProvider for SystemFonts {
    fn family(&self) -> Result<FontFamily> {
        match &self.explicit {
            Some(path) => SystemFonts::load_from_path(path),
            None => self.load_installed(),
        }
    }
}

fn find_font_file(base: &Path, suffixes: &[&str]) -> Result<PathBuf> {
    if base
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("ttf") || e.eq_ignore_ascii_case("otf"))
    {
        if base.exists() {
            return Ok(base.to_path_buf());
        }
        return Err(anyhow!("Font file not found: {}", base.display()));
    }

    let candidates: Vec<PathBuf> = suffixes
        .iter()
        .map(|suffix| {
            if suffix.is_empty() {
                base.with_extension("ttf")
            } else {
                PathBuf::from(format!("{}-{}.ttf", base.display(), suffix))
            }
        })
        .collect();

    if let Some(found) = candidates.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }

    let tried: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
    Err(anyhow!(
        "Could not find font file. Tried: {}. \
        \nHint: name font files like MyFont-Regular.ttf, MyFont-Bold.ttf, etc.",
        tried.join(", ")
    ))
}

fn find_variant(base: &Path, suffixes: &[&str]) -> Option<PathBuf> {
    suffixes
        .iter()
        .map(|suffix| PathBuf::from(format!("{}-{}.ttf", base.display(), suffix)))
        .find(|p| p.exists())
}

fn try_load_variant(base: &Path, suffixes: &[&str], fallback: &Path) -> Result<TrueTypeFace> {
    // a single .ttf file has no siblings to look for
    if base.extension().is_some() {
        return TrueTypeFace::load(fallback);
    }
    match find_variant(base, suffixes) {
        Some(path) => TrueTypeFace::load(&path),
        None => {
            log::warn!(
                "no {}-{}.ttf found, using the regular face",
                base.display(),
                suffixes[0]
            );
            TrueTypeFace::load(fallback)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Every character is half an em wide.
    pub struct FixedFace {
        pub name: &'static str,
    }

    impl Typeface for FixedFace {
        fn name(&self) -> &str {
            self.name
        }

        fn glyph(&self, ch: char) -> Glyph {
            Glyph {
                id: (ch as u32 % 0xFFFF) as u16,
                advance: 0.5,
            }
        }

        fn ascent(&self) -> f32 {
            0.8
        }

        fn descent(&self) -> f32 {
            -0.2
        }

        fn cap_height(&self) -> f32 {
            0.7
        }

        fn bbox(&self) -> [f32; 4] {
            [0.0, -0.2, 0.5, 0.8]
        }

        fn is_italic(&self) -> bool {
            false
        }

        fn program(&self) -> Option<&[u8]> {
            None
        }
    }

    pub fn fixed_family() -> FontFamily {
        FontFamily {
            regular: Box::new(FixedFace { name: "Fixed" }),
            bold: Box::new(FixedFace { name: "Fixed-Bold" }),
            italic: Box::new(FixedFace {
                name: "Fixed-Italic",
            }),
            bold_italic: Box::new(FixedFace {
                name: "Fixed-BoldItalic",
            }),
        }
    }

    pub struct FixedFonts;

    impl FontProvider for FixedFonts {
        fn family(&self) -> Result<FontFamily> {
            Ok(fixed_family())
        }
    }
}
