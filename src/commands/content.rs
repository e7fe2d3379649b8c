use super::{lengths, target_grid};
use crate::dispatch::{DataContext, Dispatcher, missing};
use crate::error::PublishError;
use crate::rules::RuleElement;
use crate::sequence::{Content, Item, Paragraph, Sequence, from_value, sequence_text};
use crate::typesetter::TextFormat;
use gridpress_layout::{PAGE_AREA, SizeRequest, resolve_size};
use gridpress_resource::image_size;
use gridpress_types::{BoxContent, ContentBox, Size};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::rc::Rc;

pub(crate) fn handle_value<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    if let Some(select) = rule.attribute("select") {
        return Ok(from_value(d.evaluate(select, ctx)?));
    }
    if rule.elements().next().is_some() {
        return d.execute_children(rule, ctx);
    }
    let text = rule.text();
    Ok(if text.is_empty() {
        Vec::new()
    } else {
        vec![Item::String(text)]
    })
}

pub(crate) fn handle_copy_of<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let select = d.required_raw(rule, "select")?;
    Ok(from_value(d.evaluate(select, ctx)?))
}

pub(crate) fn handle_paragraph<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let items = d.execute_children(rule, ctx)?;
    let paragraph = Paragraph::new(sequence_text(&items));
    Ok(vec![Item::Content(Content::Paragraph(paragraph))])
}

/// Paragraph items stay paragraphs; runs of other text between them form one each.
fn collect_paragraphs(items: Sequence<'_, '_>) -> Vec<Paragraph> {
    let mut paragraphs = Vec::new();
    let mut loose = String::new();
    for item in items {
        match item {
            Item::Content(Content::Paragraph(p)) => {
                if !loose.is_empty() {
                    paragraphs.push(Paragraph::new(std::mem::take(&mut loose)));
                }
                paragraphs.push(p);
            }
            Item::Content(Content::Box(_)) => warn!("A box inside a text block is ignored"),
            other => loose.push_str(&other.to_text()),
        }
    }
    if !loose.is_empty() {
        paragraphs.push(Paragraph::new(loose));
    }
    paragraphs
}

/// `Textblock width? fontsize? leading?`: sets its contents into a text box.
pub(crate) fn handle_textblock<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let font_size = d.length_attribute(rule, "fontsize", ctx)?;
    let leading = d.length_attribute(rule, "leading", ctx)?;
    let base = d.format;
    let format = match (font_size, leading) {
        (None, None) => base,
        (Some(size), None) => TextFormat {
            font_size: size,
            leading: size * base.leading / base.font_size,
        },
        (size, Some(leading)) => TextFormat {
            font_size: size.unwrap_or(base.font_size),
            leading,
        },
    };

    let paragraphs = collect_paragraphs(d.execute_children(rule, ctx)?);
    let [requested] = lengths(d, rule, ctx, [("width", true)])?;
    let width = match requested {
        Some(width) => width,
        None => {
            let grid = target_grid(d, rule, ctx)?;
            grid.width(grid.frame_width(PAGE_AREA)?)
        }
    };
    let content = d.typesetter.to_box(&paragraphs, width, &format)?;
    debug!(
        "Text block of {} paragraph(s): {:.2}pt x {:.2}pt",
        paragraphs.len(),
        content.width(),
        content.height()
    );
    Ok(vec![Item::Content(Content::Box(content))])
}

/// `Image file ...`: an image box sized from its natural size and the constraints.
pub(crate) fn handle_image<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let file = d.required_attribute(rule, "file", ctx)?;
    let natural_width = d.length_attribute(rule, "naturalwidth", ctx)?;
    let natural_height = d.length_attribute(rule, "naturalheight", ctx)?;
    let (source, natural) = match (natural_width, natural_height) {
        (Some(w), Some(h)) => {
            let source = d
                .finder
                .find_file(&file)
                .unwrap_or_else(|| PathBuf::from(&file));
            (source, Size::new(w, h))
        }
        _ => {
            let source = d.finder.require_file(&file)?;
            let size = image_size(&source)?;
            let natural = Size::new(
                natural_width.unwrap_or(size.width),
                natural_height.unwrap_or(size.height),
            );
            (source, natural)
        }
    };

    let [width, height, min_width, max_width, min_height, max_height] = lengths(
        d,
        rule,
        ctx,
        [
            ("width", true),
            ("height", false),
            ("minwidth", true),
            ("maxwidth", true),
            ("minheight", false),
            ("maxheight", false),
        ],
    )?;
    let mut request = SizeRequest::new(natural);
    request.width = width;
    request.height = height;
    request.min_width = min_width.unwrap_or(0.0);
    request.max_width = max_width.unwrap_or(f64::INFINITY);
    request.min_height = min_height.unwrap_or(0.0);
    request.max_height = max_height.unwrap_or(f64::INFINITY);
    request.stretch = d.bool_attribute(rule, "stretch", ctx, false)?;
    let size = resolve_size(&request);
    debug!(
        "Image '{}' natural {:.2}x{:.2}pt, placed {:.2}x{:.2}pt",
        source.display(),
        natural.width,
        natural.height,
        size.width,
        size.height
    );
    let content = ContentBox::new(size, BoxContent::Image { source });
    Ok(vec![Item::Content(Content::Box(content))])
}

/// `Box width height background?`: a filled rectangle.
pub(crate) fn handle_box<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let color = d.attribute(rule, "background", ctx)?;
    let [width, height] = lengths(d, rule, ctx, [("width", true), ("height", false)])?;
    let width = width.ok_or_else(|| missing(rule, "width"))?;
    let height = height.ok_or_else(|| missing(rule, "height"))?;
    let content = ContentBox::new(Size::new(width, height), BoxContent::Filled { color });
    Ok(vec![Item::Content(Content::Box(content))])
}

/// `Message select?`: logs text from the rules.
pub(crate) fn handle_message<'a, 'input>(
    d: &mut Dispatcher<'_, 'a, 'input>,
    rule: &Rc<RuleElement>,
    ctx: DataContext<'a, 'input>,
) -> Result<Sequence<'a, 'input>, PublishError> {
    let text = match rule.attribute("select") {
        Some(select) => d.evaluate(select, ctx)?.to_string(),
        None if rule.elements().next().is_some() => sequence_text(&d.execute_children(rule, ctx)?),
        None => rule.text(),
    };
    info!("Message: {}", text.trim());
    Ok(Vec::new())
}
