//! OPC packaging: lays the presentation's parts out in a zip archive.
//!
//! ```text
//! [Content_Types].xml
//! _rels/.rels
//! docProps/{core,app}.xml
//! ppt/presentation.xml            ppt/_rels/presentation.xml.rels
//! ppt/{presProps,viewProps,tableStyles}.xml
//! ppt/slideMasters/slideMaster1.xml (+ rels)
//! ppt/slideLayouts/slideLayout1.xml (+ rels)
//! ppt/theme/theme1.xml
//! ppt/slides/slide{n}.xml (+ rels)
//! ppt/media/image{n}.{ext}
//! ```

use super::template::*;
use super::{MediaFormat, PictureData, Presentation};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Seek, Write};
use std::path::Path;
use zip::result::ZipResult;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// presentation.xml.rels: rId1–rId5 are the fixed parts, slides follow.
const FIRST_SLIDE_REL: usize = 6;

struct Relationship {
    id: String,
    rel_type: &'static str,
    target: String,
}

fn rels_xml(rels: &[Relationship]) -> String {
    let mut xml = String::with_capacity(256 + rels.len() * 160);
    xml.push_str(XML_DECL);
    xml.push_str(
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for rel in rels {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
            rel.id, rel.rel_type, rel.target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

fn rel(id: impl Into<String>, rel_type: &'static str, target: impl Into<String>) -> Relationship {
    Relationship {
        id: id.into(),
        rel_type,
        target: target.into(),
    }
}

pub(super) fn write_package<W: Write + Seek>(pres: &Presentation, writer: W) -> ZipResult<W> {
    let mut zip = ZipWriter::new(writer);
    let xml_opts = FileOptions::default().compression_method(CompressionMethod::Deflated);
    // Page images are already compressed.
    let media_opts = FileOptions::default().compression_method(CompressionMethod::Stored);

    let put = |zip: &mut ZipWriter<W>, name: &str, body: &str| -> ZipResult<()> {
        zip.start_file(name, xml_opts)?;
        zip.write_all(body.as_bytes())?;
        Ok(())
    };

    put(&mut zip, "[Content_Types].xml", &content_types_xml(pres))?;
    put(
        &mut zip,
        "_rels/.rels",
        &rels_xml(&[
            rel("rId1", REL_OFFICE_DOCUMENT, "ppt/presentation.xml"),
            rel("rId2", REL_CORE_PROPS, "docProps/core.xml"),
            rel("rId3", REL_EXTENDED_PROPS, "docProps/app.xml"),
        ]),
    )?;
    put(&mut zip, "docProps/core.xml", &core_props_xml(pres))?;
    put(&mut zip, "docProps/app.xml", &app_props_xml(pres))?;

    // ── Presentation part ────────────────────────────────────────────────
    let slide_rel_ids: Vec<String> = (0..pres.slides.len())
        .map(|i| format!("rId{}", FIRST_SLIDE_REL + i))
        .collect();

    put(&mut zip, "ppt/presentation.xml", &presentation_xml(pres, &slide_rel_ids))?;

    let mut pres_rels = vec![
        rel("rId1", REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml"),
        rel("rId2", REL_PRES_PROPS, "presProps.xml"),
        rel("rId3", REL_VIEW_PROPS, "viewProps.xml"),
        rel("rId4", REL_THEME, "theme/theme1.xml"),
        rel("rId5", REL_TABLE_STYLES, "tableStyles.xml"),
    ];
    for (i, id) in slide_rel_ids.iter().enumerate() {
        pres_rels.push(rel(id.clone(), REL_SLIDE, format!("slides/slide{}.xml", i + 1)));
    }
    put(&mut zip, "ppt/_rels/presentation.xml.rels", &rels_xml(&pres_rels))?;

    put(&mut zip, "ppt/presProps.xml", &pres_props_xml())?;
    put(&mut zip, "ppt/viewProps.xml", &view_props_xml())?;
    put(&mut zip, "ppt/tableStyles.xml", &table_styles_xml())?;

    // ── Master, layout, theme ────────────────────────────────────────────
    put(&mut zip, "ppt/slideMasters/slideMaster1.xml", &slide_master_xml())?;
    put(
        &mut zip,
        "ppt/slideMasters/_rels/slideMaster1.xml.rels",
        &rels_xml(&[
            rel("rId1", REL_SLIDE_LAYOUT, "../slideLayouts/slideLayout1.xml"),
            rel("rId2", REL_THEME, "../theme/theme1.xml"),
        ]),
    )?;
    put(&mut zip, "ppt/slideLayouts/slideLayout1.xml", &slide_layout_xml())?;
    put(
        &mut zip,
        "ppt/slideLayouts/_rels/slideLayout1.xml.rels",
        &rels_xml(&[rel(
            "rId1",
            REL_SLIDE_MASTER,
            "../slideMasters/slideMaster1.xml",
        )]),
    )?;
    put(&mut zip, "ppt/theme/theme1.xml", &theme_xml())?;

    // ── Slides and media ─────────────────────────────────────────────────
    let mut media_index = 0usize;
    for (i, slide) in pres.slides.iter().enumerate() {
        let slide_num = i + 1;
        let mut rels = vec![rel(
            "rId1",
            REL_SLIDE_LAYOUT,
            "../slideLayouts/slideLayout1.xml",
        )];
        let mut image_rel_ids = Vec::with_capacity(slide.pictures.len());

        for (j, pic) in slide.pictures.iter().enumerate() {
            media_index += 1;
            let media_name = format!("image{}.{}", media_index, pic.format.extension());
            let rel_id = format!("rId{}", j + 2);

            zip.start_file(format!("ppt/media/{media_name}"), media_opts)?;
            match &pic.data {
                PictureData::Bytes(bytes) => zip.write_all(bytes)?,
                PictureData::File(path) => copy_media(path, &mut zip)?,
            }

            rels.push(rel(rel_id.clone(), REL_IMAGE, format!("../media/{media_name}")));
            image_rel_ids.push(rel_id);
        }

        put(
            &mut zip,
            &format!("ppt/slides/slide{slide_num}.xml"),
            &slide.to_xml(&image_rel_ids),
        )?;
        put(
            &mut zip,
            &format!("ppt/slides/_rels/slide{slide_num}.xml.rels"),
            &rels_xml(&rels),
        )?;
    }

    zip.finish()
}

/// Stream a picture file into the current zip entry.
fn copy_media<W: Write + Seek>(path: &Path, zip: &mut ZipWriter<W>) -> ZipResult<()> {
    let with_path = |e: io::Error| io::Error::new(e.kind(), format!("{}: {e}", path.display()));
    let mut file = File::open(path).map_err(with_path)?;
    io::copy(&mut file, zip).map_err(with_path)?;
    Ok(())
}

fn content_types_xml(pres: &Presentation) -> String {
    let used: BTreeSet<&'static str> = pres
        .slides
        .iter()
        .flat_map(|s| s.pictures.iter().map(|p| p.format.extension()))
        .collect();

    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
    );
    xml.push_str(
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
    );
    xml.push_str(r#"<Default Extension="xml" ContentType="application/xml"/>"#);
    for format in MediaFormat::ALL {
        if used.contains(format.extension()) {
            xml.push_str(&format!(
                r#"<Default Extension="{}" ContentType="{}"/>"#,
                format.extension(),
                format.content_type()
            ));
        }
    }

    let mut overrides = vec![
        ("/ppt/presentation.xml".to_string(), CT_PRESENTATION),
        ("/ppt/slideMasters/slideMaster1.xml".to_string(), CT_SLIDE_MASTER),
        ("/ppt/slideLayouts/slideLayout1.xml".to_string(), CT_SLIDE_LAYOUT),
        ("/ppt/theme/theme1.xml".to_string(), CT_THEME),
        ("/ppt/presProps.xml".to_string(), CT_PRES_PROPS),
        ("/ppt/viewProps.xml".to_string(), CT_VIEW_PROPS),
        ("/ppt/tableStyles.xml".to_string(), CT_TABLE_STYLES),
        ("/docProps/core.xml".to_string(), CT_CORE_PROPS),
        ("/docProps/app.xml".to_string(), CT_EXTENDED_PROPS),
    ];
    for i in 1..=pres.slides.len() {
        overrides.push((format!("/ppt/slides/slide{i}.xml"), CT_SLIDE));
    }
    for (part, content_type) in overrides {
        xml.push_str(&format!(
            r#"<Override PartName="{part}" ContentType="{content_type}"/>"#
        ));
    }

    xml.push_str("</Types>");
    xml
}

fn presentation_xml(pres: &Presentation, slide_rel_ids: &[String]) -> String {
    let mut xml = String::with_capacity(1024 + slide_rel_ids.len() * 48);
    xml.push_str(XML_DECL);
    xml.push_str(&format!(
        r#"<p:presentation xmlns:a="{NS_A}" xmlns:r="{NS_R}" xmlns:p="{NS_P}" saveSubsetFonts="1">"#
    ));
    xml.push_str(&format!(
        r#"<p:sldMasterIdLst><p:sldMasterId id="{SLIDE_MASTER_ID}" r:id="rId1"/></p:sldMasterIdLst>"#
    ));

    if !pres.slides.is_empty() {
        xml.push_str("<p:sldIdLst>");
        for (slide, rel_id) in pres.slides.iter().zip(slide_rel_ids) {
            xml.push_str(&format!(
                r#"<p:sldId id="{}" r:id="{}"/>"#,
                slide.id, rel_id
            ));
        }
        xml.push_str("</p:sldIdLst>");
    }

    xml.push_str(&format!(
        r#"<p:sldSz cx="{}" cy="{}"/>"#,
        pres.slide_width(),
        pres.slide_height()
    ));
    xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
    xml.push_str("</p:presentation>");
    xml
}

fn core_props_xml(pres: &Presentation) -> String {
    let mut xml = String::with_capacity(512);
    xml.push_str(XML_DECL);
    xml.push_str(concat!(
        r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
        r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
        r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#
    ));
    if let Some(title) = pres.title() {
        xml.push_str(&format!("<dc:title>{}</dc:title>", escape_xml(title)));
    }
    xml.push_str(concat!("<dc:creator>", env!("CARGO_PKG_NAME"), "</dc:creator>"));
    xml.push_str("<cp:revision>1</cp:revision>");
    xml.push_str("</cp:coreProperties>");
    xml
}

fn app_props_xml(pres: &Presentation) -> String {
    format!(
        concat!(
            "{decl}",
            r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" "#,
            r#"xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">"#,
            "<Application>{app}</Application><Slides>{slides}</Slides>",
            "</Properties>"
        ),
        decl = XML_DECL,
        app = env!("CARGO_PKG_NAME"),
        slides = pres.slides.len(),
    )
}

#[cfg(test)]
mod tests {
    use super::super::{Picture, SlideSize};
    use super::*;
    use std::io::{Cursor, Read};

    fn jpeg_picture(name: &str) -> Picture {
        Picture {
            name: name.to_string(),
            format: MediaFormat::Jpeg,
            data: PictureData::Bytes(vec![0xFF, 0xD8, 0xFF, 0xD9]),
            x: 0,
            y: 0,
            cx: 9_144_000,
            cy: 6_858_000,
        }
    }

    fn read_part(archive: &mut zip::ZipArchive<Cursor<Vec<u8>>>, name: &str) -> String {
        let mut s = String::new();
        archive
            .by_name(name)
            .unwrap_or_else(|_| panic!("missing part {name}"))
            .read_to_string(&mut s)
            .unwrap();
        s
    }

    fn package(pres: &Presentation) -> zip::ZipArchive<Cursor<Vec<u8>>> {
        let cursor = pres.write_to(Cursor::new(Vec::new())).unwrap();
        zip::ZipArchive::new(Cursor::new(cursor.into_inner())).unwrap()
    }

    #[test]
    fn empty_presentation_is_a_complete_package() {
        let mut archive = package(&Presentation::new(SlideSize::Standard));
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "ppt/presentation.xml",
            "ppt/_rels/presentation.xml.rels",
            "ppt/slideMasters/slideMaster1.xml",
            "ppt/slideLayouts/slideLayout1.xml",
            "ppt/theme/theme1.xml",
        ] {
            assert!(archive.by_name(part).is_ok(), "missing {part}");
        }
        let pres_xml = read_part(&mut archive, "ppt/presentation.xml");
        assert!(!pres_xml.contains("<p:sldIdLst>"));
        assert!(pres_xml.contains(r#"<p:sldSz cx="9144000" cy="6858000"/>"#));
    }

    #[test]
    fn slides_are_listed_and_related_in_order() {
        let mut pres = Presentation::default();
        pres.add_blank_slide().add_picture(jpeg_picture("deck_01.jpeg"));
        pres.add_blank_slide().add_picture(jpeg_picture("deck_02.jpeg"));
        let mut archive = package(&pres);

        let pres_xml = read_part(&mut archive, "ppt/presentation.xml");
        assert!(pres_xml.contains(
            r#"<p:sldIdLst><p:sldId id="256" r:id="rId6"/><p:sldId id="257" r:id="rId7"/></p:sldIdLst>"#
        ));

        let rels = read_part(&mut archive, "ppt/_rels/presentation.xml.rels");
        assert!(rels.contains(r#"Id="rId7""#) && rels.contains(r#"Target="slides/slide2.xml""#));

        let slide2_rels = read_part(&mut archive, "ppt/slides/_rels/slide2.xml.rels");
        assert!(slide2_rels.contains(r#"Target="../media/image2.jpeg""#));
        assert!(read_part(&mut archive, "ppt/slides/slide2.xml").contains("deck_02.jpeg"));
        assert!(archive.by_name("ppt/media/image2.jpeg").is_ok());
    }

    #[test]
    fn content_types_cover_used_media_only() {
        let mut pres = Presentation::default();
        pres.add_blank_slide().add_picture(jpeg_picture("a.jpeg"));
        let mut archive = package(&pres);
        let ct = read_part(&mut archive, "[Content_Types].xml");
        assert!(ct.contains(r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#));
        assert!(!ct.contains(r#"Extension="png""#));
        assert!(ct.contains(r#"PartName="/ppt/slides/slide1.xml""#));
    }

    #[test]
    fn core_props_carry_escaped_title() {
        let mut pres = Presentation::default();
        pres.set_title("Q&A deck");
        let mut archive = package(&pres);
        let core = read_part(&mut archive, "docProps/core.xml");
        assert!(core.contains("<dc:title>Q&amp;A deck</dc:title>"));
    }

    #[test]
    fn app_props_count_slides() {
        let mut pres = Presentation::default();
        pres.add_blank_slide();
        pres.add_blank_slide();
        let mut archive = package(&pres);
        assert!(read_part(&mut archive, "docProps/app.xml").contains("<Slides>2</Slides>"));
    }
}
