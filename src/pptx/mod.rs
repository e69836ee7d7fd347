//! A minimal PresentationML (`.pptx`) writer.
//!
//! Supports exactly what a picture deck needs: create an empty
//! presentation, append blank slides, place pictures on them, save.
//!
//! ```rust,no_run
//! use pdf2pptx::pptx::{Presentation, SlideSize};
//!
//! # fn main() -> Result<(), pdf2pptx::Pdf2PptxError> {
//! let mut pres = Presentation::new(SlideSize::Standard);
//! pres.add_blank_slide()
//!     .add_full_bleed_picture("images/deck_01.jpeg".as_ref())?;
//! pres.save("deck.pptx".as_ref())?;
//! # Ok(())
//! # }
//! ```
//!
//! Sizes are in EMU (English Metric Units): 914 400 EMU = 1 inch.

mod package;
pub(crate) mod template;

use crate::error::Pdf2PptxError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{Seek, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// The first slide ID PowerPoint itself hands out.
const FIRST_SLIDE_ID: u32 = 256;

// ── Slide size ───────────────────────────────────────────────────────────

/// Canvas size shared by every slide of a presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlideSize {
    /// 10 × 7.5 in (4:3), the default of a new blank presentation.
    #[default]
    Standard,
    /// 13.333 × 7.5 in (16:9).
    Widescreen,
    /// Any size, in EMU.
    Custom { width_emu: i64, height_emu: i64 },
}

impl SlideSize {
    pub fn width_emu(&self) -> i64 {
        match self {
            SlideSize::Standard => 9_144_000,
            SlideSize::Widescreen => 12_192_000,
            SlideSize::Custom { width_emu, .. } => *width_emu,
        }
    }

    pub fn height_emu(&self) -> i64 {
        match self {
            SlideSize::Standard | SlideSize::Widescreen => 6_858_000,
            SlideSize::Custom { height_emu, .. } => *height_emu,
        }
    }
}

impl FromStr for SlideSize {
    type Err = String;

    /// Accepts `4:3`/`standard` and `16:9`/`widescreen`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4:3" | "standard" => Ok(SlideSize::Standard),
            "16:9" | "widescreen" => Ok(SlideSize::Widescreen),
            other => Err(format!(
                "unknown slide size '{other}' (expected 4:3 or 16:9)"
            )),
        }
    }
}

impl fmt::Display for SlideSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlideSize::Standard => f.write_str("4:3"),
            SlideSize::Widescreen => f.write_str("16:9"),
            SlideSize::Custom {
                width_emu,
                height_emu,
            } => write!(f, "{width_emu}x{height_emu} EMU"),
        }
    }
}

// ── Media ────────────────────────────────────────────────────────────────

/// Picture formats that can be embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl MediaFormat {
    /// Every format, in a stable order.
    pub const ALL: [MediaFormat; 4] = [
        MediaFormat::Png,
        MediaFormat::Jpeg,
        MediaFormat::Bmp,
        MediaFormat::Gif,
    ];

    /// Format for a file extension, ignoring ASCII case (`jpg` and `jpeg`
    /// are both JPEG).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(MediaFormat::Png),
            "jpg" | "jpeg" => Some(MediaFormat::Jpeg),
            "bmp" => Some(MediaFormat::Bmp),
            "gif" => Some(MediaFormat::Gif),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }

    /// Extension used for the part name inside the package.
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Png => "png",
            MediaFormat::Jpeg => "jpeg",
            MediaFormat::Bmp => "bmp",
            MediaFormat::Gif => "gif",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            MediaFormat::Png => "image/png",
            MediaFormat::Jpeg => "image/jpeg",
            MediaFormat::Bmp => "image/bmp",
            MediaFormat::Gif => "image/gif",
        }
    }
}

/// Where a picture's bytes come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PictureData {
    /// Read from disk while the package is written, so a deck never holds
    /// more than one image in memory.
    File(PathBuf),
    Bytes(Vec<u8>),
}

/// A picture placed on a slide.
#[derive(Debug, Clone)]
pub struct Picture {
    /// Source file name, kept as the picture's description.
    pub name: String,
    pub format: MediaFormat,
    pub data: PictureData,
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Picture {
    /// Reference an image file; the format comes from its extension.
    ///
    /// The file must exist now and still be readable when the presentation
    /// is saved.
    pub fn from_file(path: &Path, x: i64, y: i64, cx: i64, cy: i64) -> Result<Self, Pdf2PptxError> {
        let read_err = |source: std::io::Error| Pdf2PptxError::ImageReadFailed {
            path: path.to_path_buf(),
            source,
        };
        let format = MediaFormat::from_path(path).ok_or_else(|| {
            read_err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "unsupported image format (expected png, jpg, jpeg, bmp or gif)",
            ))
        })?;
        // Unreadable files fail here, not at save time.
        fs::File::open(path).map_err(read_err)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            name,
            format,
            data: PictureData::File(path.to_path_buf()),
            x,
            y,
            cx,
            cy,
        })
    }
}

// ── Slides ───────────────────────────────────────────────────────────────

/// One slide using the blank layout.
#[derive(Debug, Clone)]
pub struct Slide {
    id: u32,
    width: i64,
    height: i64,
    pictures: Vec<Picture>,
}

impl Slide {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn pictures(&self) -> &[Picture] {
        &self.pictures
    }

    pub fn add_picture(&mut self, picture: Picture) -> &mut Self {
        self.pictures.push(picture);
        self
    }

    /// Place `path` at (0,0) stretched to exactly the slide's width and height.
    pub fn add_full_bleed_picture(&mut self, path: &Path) -> Result<&mut Self, Pdf2PptxError> {
        let picture = Picture::from_file(path, 0, 0, self.width, self.height)?;
        Ok(self.add_picture(picture))
    }

    /// `slide{n}.xml`; `image_rel_ids[i]` is the relationship of picture `i`.
    pub(crate) fn to_xml(&self, image_rel_ids: &[String]) -> String {
        let mut xml = String::with_capacity(1024);
        xml.push_str(template::XML_DECL);
        xml.push_str(&format!(
            r#"<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}">"#,
            template::NS_A,
            template::NS_R,
            template::NS_P
        ));
        xml.push_str("<p:cSld><p:spTree>");
        xml.push_str(template::ROOT_GROUP);

        for (i, (pic, rel_id)) in self.pictures.iter().zip(image_rel_ids).enumerate() {
            // Shape ID 1 is the root group.
            let shape_id = i + 2;
            xml.push_str("<p:pic><p:nvPicPr>");
            xml.push_str(&format!(
                r#"<p:cNvPr id="{}" name="Picture {}" descr="{}"/>"#,
                shape_id,
                shape_id - 1,
                template::escape_xml(&pic.name)
            ));
            xml.push_str(r#"<p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr>"#);
            xml.push_str("<p:nvPr/></p:nvPicPr>");
            xml.push_str("<p:blipFill>");
            xml.push_str(&format!(r#"<a:blip r:embed="{rel_id}"/>"#));
            xml.push_str("<a:stretch><a:fillRect/></a:stretch>");
            xml.push_str("</p:blipFill>");
            xml.push_str("<p:spPr><a:xfrm>");
            xml.push_str(&format!(r#"<a:off x="{}" y="{}"/>"#, pic.x, pic.y));
            xml.push_str(&format!(r#"<a:ext cx="{}" cy="{}"/>"#, pic.cx, pic.cy));
            xml.push_str("</a:xfrm>");
            xml.push_str(r#"<a:prstGeom prst="rect"><a:avLst/></a:prstGeom>"#);
            xml.push_str("</p:spPr></p:pic>");
        }

        xml.push_str("</p:spTree></p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");
        xml
    }
}

// ── Presentation ─────────────────────────────────────────────────────────

/// An in-memory presentation.
#[derive(Debug, Clone)]
pub struct Presentation {
    size: SlideSize,
    title: Option<String>,
    slides: Vec<Slide>,
}

impl Default for Presentation {
    fn default() -> Self {
        Self::new(SlideSize::default())
    }
}

impl Presentation {
    /// An empty presentation with no slides.
    pub fn new(size: SlideSize) -> Self {
        Self {
            size,
            title: None,
            slides: Vec::new(),
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn slide_size(&self) -> SlideSize {
        self.size
    }

    pub fn slide_width(&self) -> i64 {
        self.size.width_emu()
    }

    pub fn slide_height(&self) -> i64 {
        self.size.height_emu()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Append a blank slide and return it.
    pub fn add_blank_slide(&mut self) -> &mut Slide {
        let id = FIRST_SLIDE_ID + self.slides.len() as u32;
        self.slides.push(Slide {
            id,
            width: self.size.width_emu(),
            height: self.size.height_emu(),
            pictures: Vec::new(),
        });
        let last = self.slides.len() - 1;
        &mut self.slides[last]
    }

    /// Serialise the package into any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> zip::result::ZipResult<W> {
        package::write_package(self, writer)
    }

    /// Save to `path` atomically: write a sibling temp file, then rename.
    pub fn save(&self, path: &Path) -> Result<(), Pdf2PptxError> {
        let write_err = |detail: String| Pdf2PptxError::PresentationWriteFailed {
            path: path.to_path_buf(),
            detail,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }

        let tmp_path = temp_path_for(path);
        let result = fs::File::create(&tmp_path)
            .map_err(|e| write_err(e.to_string()))
            .and_then(|file| {
                self.write_to(file)
                    .map_err(|e| write_err(e.to_string()))?
                    .sync_all()
                    .map_err(|e| write_err(e.to_string()))
            })
            .and_then(|()| fs::rename(&tmp_path, path).map_err(|e| write_err(e.to_string())));

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result?;

        debug!(
            "Saved presentation with {} slides → {}",
            self.slides.len(),
            path.display()
        );
        Ok(())
    }
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_size_is_ten_by_seven_and_a_half_inches() {
        assert_eq!(SlideSize::Standard.width_emu(), 10 * EMU_PER_INCH);
        assert_eq!(SlideSize::Standard.height_emu() * 10, 75 * EMU_PER_INCH);
    }

    #[test]
    fn slide_size_parses_aspect_ratios() {
        assert_eq!("16:9".parse::<SlideSize>().unwrap(), SlideSize::Widescreen);
        assert_eq!("Standard".parse::<SlideSize>().unwrap(), SlideSize::Standard);
        assert!("3:2".parse::<SlideSize>().is_err());
    }

    #[test]
    fn media_format_ignores_case() {
        assert_eq!(MediaFormat::from_extension("JPG"), Some(MediaFormat::Jpeg));
        assert_eq!(MediaFormat::from_extension("Png"), Some(MediaFormat::Png));
        assert_eq!(MediaFormat::from_extension("tiff"), None);
        assert_eq!(
            MediaFormat::from_path(Path::new("a/b/deck_01.JPEG")),
            Some(MediaFormat::Jpeg)
        );
        assert_eq!(MediaFormat::from_path(Path::new("README")), None);
    }

    #[test]
    fn slide_ids_start_at_256() {
        let mut pres = Presentation::default();
        assert_eq!(pres.add_blank_slide().id(), 256);
        assert_eq!(pres.add_blank_slide().id(), 257);
        assert_eq!(pres.slide_count(), 2);
    }

    #[test]
    fn full_bleed_picture_fills_the_canvas() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("page.png");
        std::fs::write(&img, b"\x89PNG").unwrap();

        let mut pres = Presentation::new(SlideSize::Widescreen);
        pres.add_blank_slide().add_full_bleed_picture(&img).unwrap();

        let pic = &pres.slides()[0].pictures()[0];
        assert_eq!((pic.x, pic.y), (0, 0));
        assert_eq!((pic.cx, pic.cy), (12_192_000, 6_858_000));
        assert_eq!(pic.name, "page.png");
        assert_eq!(pic.data, PictureData::File(img.clone()));
    }

    #[test]
    fn picture_files_are_read_when_saving() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("page.jpeg");
        std::fs::write(&img, b"first").unwrap();

        let mut pres = Presentation::default();
        pres.add_blank_slide().add_full_bleed_picture(&img).unwrap();
        std::fs::write(&img, b"rewritten before save").unwrap();

        let out = dir.path().join("deck.pptx");
        pres.save(&out).unwrap();

        let mut archive =
            zip::ZipArchive::new(std::io::Cursor::new(std::fs::read(&out).unwrap())).unwrap();
        let mut media = Vec::new();
        std::io::Read::read_to_end(
            &mut archive.by_name("ppt/media/image1.jpeg").unwrap(),
            &mut media,
        )
        .unwrap();
        assert_eq!(media, b"rewritten before save");
    }

    #[test]
    fn picture_file_removed_before_save_fails_the_save() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("page.jpeg");
        std::fs::write(&img, b"jpeg").unwrap();

        let mut pres = Presentation::default();
        pres.add_blank_slide().add_full_bleed_picture(&img).unwrap();
        std::fs::remove_file(&img).unwrap();

        let out = dir.path().join("deck.pptx");
        match pres.save(&out).unwrap_err() {
            Pdf2PptxError::PresentationWriteFailed { detail, .. } => {
                assert!(detail.contains("page.jpeg"), "detail: {detail}")
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!out.exists());
    }

    #[test]
    fn missing_picture_file_is_rejected_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let mut pres = Presentation::default();
        let err = pres
            .add_blank_slide()
            .add_full_bleed_picture(&dir.path().join("gone.jpeg"))
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::ImageReadFailed { .. }));
    }

    #[test]
    fn unsupported_picture_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let img = dir.path().join("page.tiff");
        std::fs::write(&img, b"II*\0").unwrap();
        let mut pres = Presentation::default();
        let err = pres
            .add_blank_slide()
            .add_full_bleed_picture(&img)
            .unwrap_err();
        assert!(matches!(err, Pdf2PptxError::ImageReadFailed { .. }));
    }

    #[test]
    fn slide_xml_places_picture() {
        let mut pres = Presentation::default();
        pres.add_blank_slide().add_picture(Picture {
            name: "a&b.jpeg".into(),
            format: MediaFormat::Jpeg,
            data: PictureData::Bytes(vec![0xFF, 0xD8]),
            x: 0,
            y: 0,
            cx: 9_144_000,
            cy: 6_858_000,
        });
        let xml = pres.slides()[0].to_xml(&["rId2".to_string()]);
        assert!(xml.contains(r#"<a:blip r:embed="rId2"/>"#));
        assert!(xml.contains(r#"<a:off x="0" y="0"/>"#));
        assert!(xml.contains(r#"<a:ext cx="9144000" cy="6858000"/>"#));
        assert!(xml.contains(r#"descr="a&amp;b.jpeg""#));
    }

    #[test]
    fn temp_path_is_a_sibling() {
        assert_eq!(
            temp_path_for(Path::new("/out/deck.pptx")),
            PathBuf::from("/out/deck.pptx.tmp")
        );
    }

    #[test]
    fn save_replaces_nothing_on_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A directory squatting on the target path makes the rename fail.
        let target = dir.path().join("deck.pptx");
        std::fs::create_dir(&target).unwrap();
        std::fs::write(target.join("keep"), b"x").unwrap();

        let err = Presentation::default().save(&target).unwrap_err();
        assert!(matches!(err, Pdf2PptxError::PresentationWriteFailed { .. }));
        assert!(target.join("keep").exists());
        assert!(!dir.path().join("deck.pptx.tmp").exists());
    }
}
