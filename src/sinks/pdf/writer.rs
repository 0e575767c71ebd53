//! PDF serialisation.
//!
//! Fonts are embedded whole as CID-keyed TrueType (`Identity-H`), so text is written as
//! big-endian glyph ids. A ToUnicode map per font keeps the text extractable and
//! searchable. Only glyphs actually shown get width entries.

use super::fonts::{FontFamily, FontStyle, Typeface};
use super::rendering::{Bookmark, Item, Pagination};
use crate::document::{ContentTree, CoverArt};
use crate::image_header::Dimensions;
use anyhow::Result;
use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::types::{CidFontType, FontFlags, SystemInfo, UnicodeCmap};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::collections::{BTreeMap, HashMap};

const COVER_IMAGE: Name<'static> = Name(b"Cover");
const COMPRESSION_LEVEL: u8 = 6;

const IDENTITY: SystemInfo = SystemInfo {
    registry: Str(b"Adobe"),
    ordering: Str(b"Identity"),
    supplement: 0,
};

/// Glyphs shown in one font: id to the character it came from and its advance in ems.
type GlyphUsage = BTreeMap<u16, (char, f32)>;

struct FontRefs {
    type0: Ref,
    cid: Ref,
    descriptor: Ref,
    to_unicode: Ref,
    program: Ref,
}

pub fn write(
    pagination: &Pagination,
    fonts: &FontFamily,
    tree: &ContentTree,
    cover: Option<&CoverArt>,
    page_size: Dimensions,
) -> Result<Vec<u8>> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let page_tree_id = alloc.bump();
    let info_id = alloc.bump();
    let page_ids: Vec<Ref> = pagination.pages.iter().map(|_| alloc.bump()).collect();
    let content_ids: Vec<Ref> = pagination.pages.iter().map(|_| alloc.bump()).collect();
    let font_refs: Vec<(FontStyle, FontRefs)> = FontStyle::ALL
        .iter()
        .map(|style| {
            (
                *style,
                FontRefs {
                    type0: alloc.bump(),
                    cid: alloc.bump(),
                    descriptor: alloc.bump(),
                    to_unicode: alloc.bump(),
                    program: alloc.bump(),
                },
            )
        })
        .collect();

    let cover_image = cover.and_then(decode_cover);
    let image_id = cover_image.as_ref().map(|_| alloc.bump());

    let mut pdf = Pdf::new();
    let mut usage: HashMap<FontStyle, GlyphUsage> = HashMap::new();

    for (page, content_id) in pagination.pages.iter().zip(&content_ids) {
        let mut content = Content::new();
        for item in &page.items {
            match item {
                Item::Text(run) => {
                    let face = fonts.face(run.style);
                    let glyphs = usage.entry(run.style).or_default();
                    let encoded = encode_text(face, &run.text, glyphs);
                    content.begin_text();
                    content.set_font(Name(run.style.resource_name()), run.size);
                    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, run.x, run.y]);
                    content.show(Str(&encoded));
                    content.end_text();
                }
                Item::Image {
                    x,
                    y,
                    width,
                    height,
                } => {
                    if image_id.is_some() {
                        content.save_state();
                        content.transform([*width, 0.0, 0.0, *height, *x, *y]);
                        content.x_object(COVER_IMAGE);
                        content.restore_state();
                    }
                }
            }
        }
        let data = compress_to_vec_zlib(&content.finish(), COMPRESSION_LEVEL);
        pdf.stream(*content_id, &data).filter(Filter::FlateDecode);
    }

    for (page_id, content_id) in page_ids.iter().zip(&content_ids) {
        let mut page = pdf.page(*page_id);
        page.media_box(Rect::new(0.0, 0.0, page_size.width, page_size.height));
        page.parent(page_tree_id);
        page.contents(*content_id);
        let mut resources = page.resources();
        {
            let mut font_dict = resources.fonts();
            for (style, refs) in &font_refs {
                font_dict.pair(Name(style.resource_name()), refs.type0);
            }
        }
        if let Some(image_id) = image_id {
            resources.x_objects().pair(COVER_IMAGE, image_id);
        }
        resources.finish();
        page.finish();
    }

    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    let empty = GlyphUsage::new();
    for (style, refs) in &font_refs {
        let glyphs = usage.get(style).unwrap_or(&empty);
        write_font(&mut pdf, fonts.face(*style), refs, glyphs);
    }

    if let (Some(id), Some(image)) = (image_id, &cover_image) {
        let data = compress_to_vec_zlib(image.as_raw(), COMPRESSION_LEVEL);
        let mut xobject = pdf.image_xobject(id, &data);
        xobject.filter(Filter::FlateDecode);
        xobject.width(image.width() as i32);
        xobject.height(image.height() as i32);
        xobject.color_space().device_rgb();
        xobject.bits_per_component(8);
        xobject.finish();
    }

    let outline_id = write_outline(&mut pdf, &mut alloc, &pagination.bookmarks, &page_ids);

    let mut info = pdf.document_info(info_id);
    if let Some(title) = &tree.title {
        info.title(TextStr(title));
    }
    if let Some(author) = &tree.author {
        info.author(TextStr(author));
    }
    info.creator(TextStr(concat!("bindery v", env!("CARGO_PKG_VERSION"))));
    info.finish();

    let mut catalog = pdf.catalog(catalog_id);
    catalog.pages(page_tree_id);
    catalog.lang(TextStr(&tree.language));
    if let Some(outline_id) = outline_id {
        catalog.outlines(outline_id);
    }
    catalog.finish();

    Ok(pdf.finish())
}

/// Glyph ids for `text` as big-endian pairs, recording each glyph used.
fn encode_text(face: &dyn Typeface, text: &str, usage: &mut GlyphUsage) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(text.len() * 2);
    for ch in text.chars() {
        let glyph = face.glyph(ch);
        encoded.extend_from_slice(&glyph.id.to_be_bytes());
        usage.entry(glyph.id).or_insert((ch, glyph.advance));
    }
    encoded
}

/// PDF names can't hold spaces or delimiters; keep it to plain ASCII.
fn base_font_name(face: &dyn Typeface) -> String {
    let name: String = face
        .name()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();
    if name.is_empty() {
        "Font".to_string()
    } else {
        name
    }
}

fn write_font(pdf: &mut Pdf, face: &dyn Typeface, refs: &FontRefs, glyphs: &GlyphUsage) {
    let name = base_font_name(face);
    let base_font = Name(name.as_bytes());

    pdf.type0_font(refs.type0)
        .base_font(base_font)
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(refs.cid)
        .to_unicode(refs.to_unicode);

    let mut cid = pdf.cid_font(refs.cid);
    cid.subtype(CidFontType::Type2);
    cid.base_font(base_font);
    cid.system_info(IDENTITY);
    cid.font_descriptor(refs.descriptor);
    cid.default_width(0.0);
    cid.cid_to_gid_map_predefined(Name(b"Identity"));
    {
        let mut widths = cid.widths();
        for (id, (_, advance)) in glyphs {
            widths.consecutive(*id, [advance * 1000.0]);
        }
    }
    cid.finish();

    let mut flags = FontFlags::SERIF | FontFlags::NON_SYMBOLIC;
    if face.is_italic() {
        flags |= FontFlags::ITALIC;
    }
    let [x_min, y_min, x_max, y_max] = face.bbox();
    let mut descriptor = pdf.font_descriptor(refs.descriptor);
    descriptor
        .name(base_font)
        .flags(flags)
        .bbox(Rect::new(
            x_min * 1000.0,
            y_min * 1000.0,
            x_max * 1000.0,
            y_max * 1000.0,
        ))
        .italic_angle(if face.is_italic() { -12.0 } else { 0.0 })
        .ascent(face.ascent() * 1000.0)
        .descent(face.descent() * 1000.0)
        .cap_height(face.cap_height() * 1000.0)
        .stem_v(80.0);
    if face.program().is_some() {
        descriptor.font_file2(refs.program);
    }
    descriptor.finish();

    if let Some(program) = face.program() {
        let data = compress_to_vec_zlib(program, COMPRESSION_LEVEL);
        pdf.stream(refs.program, &data)
            .filter(Filter::FlateDecode)
            .pair(Name(b"Length1"), program.len() as i32);
    }

    let mut cmap = UnicodeCmap::new(Name(b"Custom"), IDENTITY);
    for (id, (ch, _)) in glyphs {
        if *id != 0 {
            cmap.pair(*id, *ch);
        }
    }
    pdf.cmap(refs.to_unicode, &cmap.finish());
}

fn write_outline(
    pdf: &mut Pdf,
    alloc: &mut Ref,
    bookmarks: &[Bookmark],
    page_ids: &[Ref],
) -> Option<Ref> {
    if bookmarks.is_empty() {
        return None;
    }
    let outline_id = alloc.bump();
    let item_ids: Vec<Ref> = bookmarks.iter().map(|_| alloc.bump()).collect();

    pdf.outline(outline_id)
        .first(item_ids[0])
        .last(item_ids[item_ids.len() - 1])
        .count(item_ids.len() as i32);

    for (i, bookmark) in bookmarks.iter().enumerate() {
        let mut item = pdf.outline_item(item_ids[i]);
        item.parent(outline_id).title(TextStr(&bookmark.title));
        if i > 0 {
            item.prev(item_ids[i - 1]);
        }
        if i + 1 < item_ids.len() {
            item.next(item_ids[i + 1]);
        }
        item.dest()
            .page(page_ids[bookmark.page_index])
            .xyz(0.0, bookmark.top, None);
        item.finish();
    }

    Some(outline_id)
}

/// Decode the cover to raw RGB. A cover that can't be decoded leaves its page blank.
fn decode_cover(art: &CoverArt) -> Option<image::RgbImage> {
    match image::load_from_memory(&art.bytes) {
        Ok(decoded) => Some(decoded.to_rgb8()),
        Err(e) => {
            log::warn!("could not decode cover image, leaving the cover page blank: {e}");
            None
        }
    }
}
